//! The resource operation handler.
//!
//! Each request maps to one [`ResourceOperation`]. The handler validates the operation's
//! input, issues exactly one store call through its [`Collection`], and reports an
//! [`Outcome`] or a [`ResourceError`].
//!
//! Identifiers are always validated before the store is touched: a malformed id never
//! reaches the backend.

use bson::{Bson, Document, oid::ObjectId};

use crate::{
    backend::Update,
    collection::Collection,
    document::Resource,
    error::{ResourceError, ResourceResult},
    id::{ID_FIELD, parse_id},
    translate::{CATEGORY_FIELD, PRICE_FIELD, QueryParams, translate},
};

pub const NAME_FIELD: &str = "name";

/// One request against the resource collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceOperation {
    List(QueryParams),
    Get { id: String },
    Create { payload: Document },
    FullUpdate { id: String, payload: Document },
    PartialUpdate { id: String, payload: Document },
    Delete { id: String },
}

/// What a successful operation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Listed(Vec<Resource>),
    Found(Resource),
    Created(ObjectId),
    Updated(ObjectId),
    Deleted(ObjectId),
}

/// Executes resource operations against a single collection.
#[derive(Debug, Clone)]
pub struct ResourceHandler {
    collection: Collection,
}

impl ResourceHandler {
    pub fn new(collection: Collection) -> Self {
        Self { collection }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Dispatches an operation to the matching method.
    pub async fn execute(&self, operation: ResourceOperation) -> ResourceResult<Outcome> {
        match operation {
            ResourceOperation::List(params) => self.list(&params).await.map(Outcome::Listed),
            ResourceOperation::Get { id } => self.get(&id).await.map(Outcome::Found),
            ResourceOperation::Create { payload } => self.create(payload).await.map(Outcome::Created),
            ResourceOperation::FullUpdate { id, payload } => {
                self.replace(&id, payload).await.map(Outcome::Updated)
            }
            ResourceOperation::PartialUpdate { id, payload } => {
                self.merge(&id, payload).await.map(Outcome::Updated)
            }
            ResourceOperation::Delete { id } => self.delete(&id).await.map(Outcome::Deleted),
        }
    }

    /// Lists resources matching the query parameters.
    pub async fn list(&self, params: &QueryParams) -> ResourceResult<Vec<Resource>> {
        let query = translate(params)?;
        tracing::debug!(collection = self.collection.name(), ?query, "listing resources");

        Ok(self.collection.query(query).await?)
    }

    /// Fetches a single resource.
    pub async fn get(&self, id: &str) -> ResourceResult<Resource> {
        let oid = parse_id(id)?;

        self.collection
            .get(&oid)
            .await?
            .ok_or_else(|| ResourceError::NotFound(oid.to_hex()))
    }

    /// Creates a resource from the three core fields of `payload`.
    ///
    /// Fields other than `name`, `price` and `category` are not stored.
    pub async fn create(&self, payload: Document) -> ResourceResult<ObjectId> {
        let document = core_fields(&payload)?;
        let oid = self.collection.insert(document).await?;
        tracing::info!(collection = self.collection.name(), id = %oid, "resource created");

        Ok(oid)
    }

    /// Replaces a resource with the three core fields of `payload`.
    ///
    /// Previously stored fields outside the core three are dropped.
    pub async fn replace(&self, id: &str, payload: Document) -> ResourceResult<ObjectId> {
        let oid = parse_id(id)?;
        let document = core_fields(&payload)?;

        self.apply(oid, Update::Replace(document)).await
    }

    /// Merges the supplied fields into a resource.
    ///
    /// The core fields are not re-validated; only the supplied subset changes.
    pub async fn merge(&self, id: &str, payload: Document) -> ResourceResult<ObjectId> {
        let oid = parse_id(id)?;
        let document = merge_fields(payload)?;

        self.apply(oid, Update::Merge(document)).await
    }

    /// Deletes a resource.
    pub async fn delete(&self, id: &str) -> ResourceResult<ObjectId> {
        let oid = parse_id(id)?;

        if !self.collection.delete(&oid).await? {
            return Err(ResourceError::NotFound(oid.to_hex()));
        }
        tracing::info!(collection = self.collection.name(), id = %oid, "resource deleted");

        Ok(oid)
    }

    async fn apply(&self, oid: ObjectId, update: Update) -> ResourceResult<ObjectId> {
        if !self.collection.update(&oid, update).await? {
            return Err(ResourceError::NotFound(oid.to_hex()));
        }
        tracing::info!(collection = self.collection.name(), id = %oid, "resource updated");

        Ok(oid)
    }
}

/// Extracts `name`, `price` and `category`, rejecting the payload if any is missing.
///
/// `price` only has to be present and non-null: zero is a valid price.
fn core_fields(payload: &Document) -> ResourceResult<Document> {
    let mut missing = Vec::new();
    let mut document = Document::new();

    for field in [NAME_FIELD, PRICE_FIELD, CATEGORY_FIELD] {
        match payload.get(field) {
            Some(value) if is_present(field, value) => {
                document.insert(field, value.clone());
            }
            _ => missing.push(field),
        }
    }

    if !missing.is_empty() {
        return Err(ResourceError::MissingFields(missing));
    }

    Ok(document)
}

fn is_present(field: &str, value: &Bson) -> bool {
    match (field, value) {
        (_, Bson::Null | Bson::Undefined) => false,
        (PRICE_FIELD, _) => true,
        (_, Bson::String(text)) => !text.is_empty(),
        _ => false,
    }
}

fn merge_fields(payload: Document) -> ResourceResult<Document> {
    if payload.is_empty() {
        return Err(ResourceError::EmptyPayload);
    }

    if let Some(key) = payload.keys().find(|key| !is_mergeable(key)) {
        return Err(ResourceError::InvalidPayload(format!("field {key:?} cannot be updated")));
    }

    Ok(payload)
}

/// Keys the store would treat as the identifier, an operator or a path are refused.
fn is_mergeable(key: &str) -> bool {
    key != ID_FIELD && !key.is_empty() && !key.starts_with('$') && !key.contains(['.', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::StoreBackend,
        error::{StoreError, StoreResult},
        query::Query,
    };
    use async_trait::async_trait;
    use bson::doc;
    use std::{
        collections::BTreeMap,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    /// A map-backed store that counts every call it receives.
    #[derive(Debug, Default)]
    struct RecordingStore {
        calls: AtomicUsize,
        documents: Mutex<BTreeMap<ObjectId, Document>>,
    }

    impl RecordingStore {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn record(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl StoreBackend for RecordingStore {
        async fn insert_document(&self, mut document: Document, _: &str) -> StoreResult<ObjectId> {
            self.record();
            let oid = ObjectId::new();
            document.insert(ID_FIELD, oid);
            self.documents.lock().unwrap().insert(oid, document);
            Ok(oid)
        }

        async fn get_document(&self, id: &ObjectId, _: &str) -> StoreResult<Option<Document>> {
            self.record();
            Ok(self.documents.lock().unwrap().get(id).cloned())
        }

        async fn query_documents(&self, _: Query, _: &str) -> StoreResult<Vec<Document>> {
            self.record();
            Ok(self.documents.lock().unwrap().values().cloned().collect())
        }

        async fn update_document(&self, id: &ObjectId, update: Update, _: &str) -> StoreResult<bool> {
            self.record();
            let mut documents = self.documents.lock().unwrap();
            let Some(existing) = documents.get_mut(id) else {
                return Ok(false);
            };
            match update {
                Update::Replace(fields) => {
                    *existing = doc! { ID_FIELD: *id };
                    existing.extend(fields);
                }
                Update::Merge(fields) => existing.extend(fields),
            }
            Ok(true)
        }

        async fn delete_document(&self, id: &ObjectId, _: &str) -> StoreResult<bool> {
            self.record();
            Ok(self.documents.lock().unwrap().remove(id).is_some())
        }

        async fn ping(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    /// A store that never answers.
    #[derive(Debug)]
    struct StalledStore;

    #[async_trait]
    impl StoreBackend for StalledStore {
        async fn insert_document(&self, _: Document, _: &str) -> StoreResult<ObjectId> {
            std::future::pending().await
        }

        async fn get_document(&self, _: &ObjectId, _: &str) -> StoreResult<Option<Document>> {
            std::future::pending().await
        }

        async fn query_documents(&self, _: Query, _: &str) -> StoreResult<Vec<Document>> {
            std::future::pending().await
        }

        async fn update_document(&self, _: &ObjectId, _: Update, _: &str) -> StoreResult<bool> {
            std::future::pending().await
        }

        async fn delete_document(&self, _: &ObjectId, _: &str) -> StoreResult<bool> {
            std::future::pending().await
        }

        async fn ping(&self) -> StoreResult<()> {
            Err(StoreError::Backend("unreachable".into()))
        }
    }

    fn handler() -> (ResourceHandler, Arc<RecordingStore>) {
        let store = Arc::new(RecordingStore::default());
        let handler = ResourceHandler::new(Collection::new(store.clone(), "products"));
        (handler, store)
    }

    fn pen() -> Document {
        doc! { "name": "Pen", "price": 1.5, "category": "office" }
    }

    #[tokio::test]
    async fn malformed_ids_never_reach_the_store() {
        let (handler, store) = handler();

        let operations = [
            ResourceOperation::Get { id: "abc".into() },
            ResourceOperation::FullUpdate { id: "123".into(), payload: pen() },
            ResourceOperation::PartialUpdate { id: "zzzzzzzzzzzzzzzzzzzzzzzz".into(), payload: doc! { "price": 2 } },
            ResourceOperation::Delete { id: "507f1f77bcf86cd79943901".into() },
        ];

        for operation in operations {
            let result = handler.execute(operation).await;
            assert!(matches!(result, Err(ResourceError::InvalidIdentifier(_))), "{result:?}");
        }

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (handler, _) = handler();

        let oid = handler.create(pen()).await.unwrap();
        let stored = handler.get(&oid.to_hex()).await.unwrap();

        assert_eq!(stored.get_object_id(ID_FIELD).unwrap(), oid);
        assert_eq!(stored.get_str("name").unwrap(), "Pen");
        assert_eq!(stored.get_f64("price").unwrap(), 1.5);
        assert_eq!(stored.get_str("category").unwrap(), "office");
    }

    #[tokio::test]
    async fn create_keeps_only_core_fields() {
        let (handler, _) = handler();

        let mut payload = pen();
        payload.insert("stock", 10);
        payload.insert(ID_FIELD, "client-chosen");

        let oid = handler.create(payload).await.unwrap();
        let stored = handler.get(&oid.to_hex()).await.unwrap();

        assert!(!stored.contains_key("stock"));
        assert_eq!(stored.get_object_id(ID_FIELD).unwrap(), oid);
    }

    #[tokio::test]
    async fn zero_price_is_present() {
        let (handler, _) = handler();

        let oid = handler
            .create(doc! { "name": "Sample", "price": 0, "category": "free" })
            .await
            .unwrap();

        handler
            .replace(&oid.to_hex(), doc! { "name": "Sample", "price": 0.0, "category": "free" })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_fields_are_reported_without_a_store_call() {
        let (handler, store) = handler();

        let cases = [
            (doc! {}, vec!["name", "price", "category"]),
            (doc! { "name": "", "price": 1, "category": "office" }, vec!["name"]),
            (doc! { "name": "Pen", "price": Bson::Null, "category": "office" }, vec!["price"]),
            (doc! { "name": "Pen", "price": 1, "category": "" }, vec!["category"]),
            (doc! { "name": 5, "price": 1, "category": "office" }, vec!["name"]),
        ];

        for (payload, missing) in cases {
            assert_eq!(handler.create(payload).await, Err(ResourceError::MissingFields(missing)));
        }

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn replace_requires_core_fields_after_id_check() {
        let (handler, store) = handler();
        let oid = handler.create(pen()).await.unwrap();

        let result = handler.replace(&oid.to_hex(), doc! { "name": "Pencil" }).await;

        assert_eq!(result, Err(ResourceError::MissingFields(vec!["price", "category"])));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn replace_drops_extra_fields_and_keeps_the_id() {
        let (handler, _) = handler();
        let oid = handler.create(pen()).await.unwrap();
        handler.merge(&oid.to_hex(), doc! { "stock": 3 }).await.unwrap();

        handler
            .replace(&oid.to_hex(), doc! { "name": "Pencil", "price": 0.5, "category": "office", "color": "red" })
            .await
            .unwrap();

        let stored = handler.get(&oid.to_hex()).await.unwrap();
        assert_eq!(stored.get_object_id(ID_FIELD).unwrap(), oid);
        assert_eq!(stored.get_str("name").unwrap(), "Pencil");
        assert!(!stored.contains_key("stock"));
        assert!(!stored.contains_key("color"));
    }

    #[tokio::test]
    async fn merge_changes_only_supplied_fields() {
        let (handler, _) = handler();
        let oid = handler.create(pen()).await.unwrap();

        handler.merge(&oid.to_hex(), doc! { "price": 2 }).await.unwrap();

        let stored = handler.get(&oid.to_hex()).await.unwrap();
        assert_eq!(stored.get_i32("price").unwrap(), 2);
        assert_eq!(stored.get_str("name").unwrap(), "Pen");
        assert_eq!(stored.get_str("category").unwrap(), "office");
    }

    #[tokio::test]
    async fn empty_merge_is_rejected() {
        let (handler, store) = handler();
        let oid = ObjectId::new();

        assert_eq!(handler.merge(&oid.to_hex(), doc! {}).await, Err(ResourceError::EmptyPayload));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn merge_refuses_identifier_and_operator_keys() {
        let (handler, store) = handler();
        let oid = ObjectId::new().to_hex();

        for payload in [
            doc! { "_id": "x" },
            doc! { "$set": { "price": 0 } },
            doc! { "dimensions.length": 4 },
            doc! { "price": 1, "": 2 },
        ] {
            assert!(matches!(
                handler.merge(&oid, payload).await,
                Err(ResourceError::InvalidPayload(_)),
            ));
        }

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn absent_resources_are_not_found() {
        let (handler, _) = handler();
        let id = ObjectId::new().to_hex();

        assert!(matches!(handler.get(&id).await, Err(ResourceError::NotFound(_))));
        assert!(matches!(handler.replace(&id, pen()).await, Err(ResourceError::NotFound(_))));
        assert!(matches!(handler.merge(&id, doc! { "price": 2 }).await, Err(ResourceError::NotFound(_))));
        assert!(matches!(handler.delete(&id).await, Err(ResourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (handler, _) = handler();
        let oid = handler.create(pen()).await.unwrap();

        assert_eq!(handler.delete(&oid.to_hex()).await, Ok(oid));
        assert_eq!(
            handler.get(&oid.to_hex()).await,
            Err(ResourceError::NotFound(oid.to_hex())),
        );
    }

    #[tokio::test]
    async fn invalid_min_price_is_rejected_before_the_store() {
        let (handler, store) = handler();
        let params = QueryParams { min_price: Some("abc".into()), ..Default::default() };

        assert!(matches!(handler.list(&params).await, Err(ResourceError::InvalidQuery(_))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn execute_dispatches_every_operation() {
        let (handler, _) = handler();

        let Outcome::Created(oid) = handler
            .execute(ResourceOperation::Create { payload: pen() })
            .await
            .unwrap()
        else {
            panic!("expected a created outcome");
        };
        let id = oid.to_hex();

        assert!(matches!(
            handler.execute(ResourceOperation::List(QueryParams::default())).await,
            Ok(Outcome::Listed(resources)) if resources.len() == 1,
        ));
        assert!(matches!(
            handler.execute(ResourceOperation::Get { id: id.clone() }).await,
            Ok(Outcome::Found(_)),
        ));
        assert_eq!(
            handler.execute(ResourceOperation::PartialUpdate { id: id.clone(), payload: doc! { "stock": 1 } }).await,
            Ok(Outcome::Updated(oid)),
        );
        assert_eq!(
            handler.execute(ResourceOperation::FullUpdate { id: id.clone(), payload: pen() }).await,
            Ok(Outcome::Updated(oid)),
        );
        assert_eq!(
            handler.execute(ResourceOperation::Delete { id }).await,
            Ok(Outcome::Deleted(oid)),
        );
    }

    #[tokio::test]
    async fn stalled_store_times_out_as_unavailable() {
        let handler = ResourceHandler::new(
            Collection::new(Arc::new(StalledStore), "products").with_timeout(Duration::from_millis(20)),
        );

        let result = handler.get(&ObjectId::new().to_hex()).await;

        assert!(matches!(result, Err(ResourceError::DependencyUnavailable(_))), "{result:?}");
    }
}
