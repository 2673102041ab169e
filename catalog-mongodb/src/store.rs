use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, doc, oid::ObjectId};
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};
use catalog_core::{
    backend::{StoreBackend, StoreBackendBuilder, Update},
    error::{StoreError, StoreResult},
    id::ID_FIELD,
    query::Query,
};

use crate::query::MongoQueryTranslator;


#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    /// Strips any `_id` so writes can never change a document's identifier.
    fn prepare_document(&self, document: Document) -> Document {
        document
            .into_iter()
            .filter(|(key, _)| key != ID_FIELD)
            .collect()
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_document(&self, document: Document, collection: &str) -> StoreResult<ObjectId> {
        self.get_collection(collection)
            .insert_one(self.prepare_document(document))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::InvalidDocument("Inserted id is not an ObjectId".into()))
    }

    async fn get_document(&self, id: &ObjectId, collection: &str) -> StoreResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(doc! { ID_FIELD: *id })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        let mut options = FindOptions::default();

        options.projection = MongoQueryTranslator::projection(&query.projection);

        if let Some(sort) = &query.sort {
            options.sort = Some(MongoQueryTranslator::sort(sort));
        }

        self.get_collection(collection)
            .find(MongoQueryTranslator::filter(query.filter.as_ref())?)
            .with_options(options)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn update_document(
        &self,
        id: &ObjectId,
        update: Update,
        collection: &str,
    ) -> StoreResult<bool> {
        let collection = self.get_collection(collection);
        let filter = doc! { ID_FIELD: *id };

        let result = match update {
            Update::Replace(document) => collection
                .replace_one(filter, self.prepare_document(document))
                .await,
            Update::Merge(document) => collection
                .update_one(filter, doc! { "$set": self.prepare_document(document) })
                .await,
        }
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(result.matched_count > 0)
    }

    async fn delete_document(&self, id: &ObjectId, collection: &str) -> StoreResult<bool> {
        Ok(
            self.get_collection(collection)
                .delete_one(doc! { ID_FIELD: *id })
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?
                .deleted_count > 0
        )
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn shutdown(&self) -> StoreResult<()> {
        self.client.clone().shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
    app_name: Option<String>,
    server_selection_timeout: Option<Duration>,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
            app_name: None,
            server_selection_timeout: None,
        }
    }

    /// Name reported to the server in its connection logs.
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// How long an operation waits for a reachable server before failing.
    pub fn server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    /// Parses the connection string and creates a client. No connection is made
    /// until the first operation; use [`StoreBackend::ping`] to check reachability.
    async fn build(self) -> StoreResult<Self::Backend> {
        let mut options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;

        if self.app_name.is_some() {
            options.app_name = self.app_name;
        }
        if self.server_selection_timeout.is_some() {
            options.server_selection_timeout = self.server_selection_timeout;
        }

        Ok(MongoDbStore::new(
            Client::with_options(options)
                .map_err(|e| StoreError::Initialization(e.to_string()))?,
            self.database,
        ))
    }
}
