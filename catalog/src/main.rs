use anyhow::Context;

use catalog::{config::Config, observability::init_tracing, server::Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = Config::path();
    let config = Config::load_from(path.clone()).context("loading configuration")?;

    init_tracing(&config.service)?;

    if path.exists() {
        tracing::info!(path = %path.display(), "configuration loaded from file");
    } else {
        tracing::info!(path = %path.display(), "configuration file not found, using defaults and environment");
    }

    Server::new(config).run().await?;

    Ok(())
}
