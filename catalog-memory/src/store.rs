//! In-memory storage implementation for the resource service.
//!
//! This module provides a simple in-memory backend that stores documents as BSON in
//! ordered maps with async-safe read-write locks.

use std::{collections::{BTreeMap, HashMap}, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document, oid::ObjectId};

use catalog_core::{
    backend::{StoreBackend, StoreBackendBuilder, Update},
    error::StoreResult,
    id::ID_FIELD,
    query::{Projection, Query, SortDirection},
};

use crate::evaluator::{DocumentEvaluator, Comparable};

type StoreMap = HashMap<String, CollectionMap>;

/// Documents of one collection, ordered by an insertion sequence number and indexed by
/// identifier. Listing order never depends on how identifiers compare.
#[derive(Default, Debug)]
struct CollectionMap {
    documents: BTreeMap<u64, Document>,
    index: HashMap<ObjectId, u64>,
    next: u64,
}

impl CollectionMap {
    fn insert(&mut self, id: ObjectId, document: Document) {
        let position = self.next;
        self.next += 1;

        if let Some(previous) = self.index.insert(id, position) {
            self.documents.remove(&previous);
        }
        self.documents.insert(position, document);
    }

    fn get(&self, id: &ObjectId) -> Option<&Document> {
        self.index
            .get(id)
            .and_then(|position| self.documents.get(position))
    }

    fn get_mut(&mut self, id: &ObjectId) -> Option<&mut Document> {
        self.index
            .get(id)
            .and_then(|position| self.documents.get_mut(position))
    }

    fn remove(&mut self, id: &ObjectId) -> Option<Document> {
        let position = self.index.remove(id)?;

        self.documents.remove(&position)
    }

    fn values(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }
}


/// Thread-safe in-memory document storage backend.
///
/// This struct implements the [`StoreBackend`] trait to provide a fully functional
/// document store that operates entirely in memory using async-aware read-write locks.
/// Every document carries its identifier under `_id`, exactly as MongoDB stores it.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing
/// it to be safely shared across async tasks. Multiple clones of the same instance
/// share the same underlying data. Each write holds the lock for its whole duration,
/// which gives single-document atomicity.
///
/// # Performance
///
/// Queries scan all documents in a collection (no indexing).
///
/// # Example
///
/// ```ignore
/// use catalog_memory::InMemoryStore;
/// use catalog_core::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let id = store.insert_document(doc! { "name": "Pen", "price": 1.5 }, "products").await?;
/// let pen = store.get_document(&id, "products").await?;
/// assert!(pen.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// The main storage map: collection_name -> documents in insertion order
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    ///
    /// ```ignore
    /// use catalog_memory::InMemoryStore;
    ///
    /// let store = InMemoryStore::builder().build().await?;
    /// ```
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }
}

/// Keeps only the projected fields, in stored order. `_id` survives only when named.
fn project(document: Document, projection: &Projection) -> Document {
    if projection.is_empty() {
        return document;
    }

    document
        .into_iter()
        .filter(|(key, _)| projection.includes(key))
        .collect()
}

/// Builds a stored document: the identifier first, then every other field.
fn with_id(id: ObjectId, fields: Document) -> Document {
    let mut document = Document::new();
    document.insert(ID_FIELD, id);

    for (key, value) in fields {
        if key != ID_FIELD {
            document.insert(key, value);
        }
    }

    document
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_document(&self, document: Document, collection: &str) -> StoreResult<ObjectId> {
        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        let id = ObjectId::new();
        collection_map.insert(id, with_id(id, document));

        Ok(id)
    }

    async fn get_document(&self, id: &ObjectId, collection: &str) -> StoreResult<Option<Document>> {
        Ok(
            self.store
                .read()
                .await
                .get(collection)
                .and_then(|collection_map| collection_map.get(id))
                .cloned()
        )
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let collection_map = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let mut documents = collection_map
            .values()
            .filter(|doc| DocumentEvaluator::matches(doc, query.filter.as_ref()))
            .cloned()
            .collect::<Vec<_>>();

        // Stable, so equal keys keep insertion order
        if let Some(sort) = &query.sort {
            documents.sort_by(|a, b| {
                let left = a.get(&sort.field).map(Comparable::from).unwrap_or(Comparable::Null);
                let right = b.get(&sort.field).map(Comparable::from).unwrap_or(Comparable::Null);

                match sort.direction {
                    SortDirection::Asc => left.sort_cmp(&right),
                    SortDirection::Desc => right.sort_cmp(&left),
                }
            });
        }

        Ok(
            documents
                .into_iter()
                .map(|doc| project(doc, &query.projection))
                .collect()
        )
    }

    async fn update_document(
        &self,
        id: &ObjectId,
        update: Update,
        collection: &str,
    ) -> StoreResult<bool> {
        let mut store = self.store.write().await;
        let Some(existing) = store
            .get_mut(collection)
            .and_then(|collection_map| collection_map.get_mut(id))
        else {
            return Ok(false);
        };

        match update {
            Update::Replace(fields) => *existing = with_id(*id, fields),
            Update::Merge(fields) => {
                for (key, value) in fields {
                    if key != ID_FIELD {
                        existing.insert(key, value);
                    }
                }
            },
        }

        Ok(true)
    }

    async fn delete_document(&self, id: &ObjectId, collection: &str) -> StoreResult<bool> {
        Ok(
            self.store
                .write()
                .await
                .get_mut(collection)
                .is_some_and(|collection_map| collection_map.remove(id).is_some())
        )
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
///
/// Optionally seeds the store with documents, which is handy for demos and tests.
///
/// # Example
///
/// ```ignore
/// use catalog_memory::InMemoryStore;
/// use catalog_core::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder()
///     .seed("products", bson::doc! { "name": "Pen", "price": 1.5, "category": "office" })
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    seed: Vec<(String, Document)>,
}

impl InMemoryStoreBuilder {
    /// Adds a document that will be present when the store is built.
    pub fn seed(mut self, collection: impl Into<String>, document: Document) -> Self {
        self.seed.push((collection.into(), document));
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] holding the seeded documents.
    async fn build(self) -> StoreResult<Self::Backend> {
        let store = InMemoryStore::new();

        for (collection, document) in self.seed {
            store.insert_document(document, &collection).await?;
        }

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use catalog_core::query::Filter;

    const PRODUCTS: &str = "products";

    async fn seeded() -> InMemoryStore {
        InMemoryStore::builder()
            .seed(PRODUCTS, doc! { "name": "Pen", "price": 1.5, "category": "office" })
            .seed(PRODUCTS, doc! { "name": "Mug", "price": 8, "category": "kitchen" })
            .seed(PRODUCTS, doc! { "name": "Stapler", "price": 8.0, "category": "office" })
            .seed(PRODUCTS, doc! { "name": "Desk", "price": 120, "category": "office" })
            .build()
            .await
            .unwrap()
    }

    fn names(documents: &[Document]) -> Vec<&str> {
        documents
            .iter()
            .map(|doc| doc.get_str("name").unwrap())
            .collect()
    }

    #[tokio::test]
    async fn insert_assigns_identifier_and_ignores_supplied_one() {
        let store = InMemoryStore::new();
        let supplied = ObjectId::new();

        let id = store
            .insert_document(doc! { "_id": supplied, "name": "Pen" }, PRODUCTS)
            .await
            .unwrap();

        assert_ne!(id, supplied);

        let stored = store.get_document(&id, PRODUCTS).await.unwrap().unwrap();
        assert_eq!(stored, doc! { "_id": id, "name": "Pen" });
        assert!(store.get_document(&supplied, PRODUCTS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_collection_is_empty() {
        let store = InMemoryStore::new();

        assert!(store.query_documents(Query::new(), "nothing").await.unwrap().is_empty());
        assert!(store.get_document(&ObjectId::new(), "nothing").await.unwrap().is_none());
        assert!(!store.delete_document(&ObjectId::new(), "nothing").await.unwrap());
    }

    #[tokio::test]
    async fn query_without_filter_returns_insertion_order() {
        let store = seeded().await;

        let all = store.query_documents(Query::new(), PRODUCTS).await.unwrap();

        assert_eq!(names(&all), vec!["Pen", "Mug", "Stapler", "Desk"]);
    }

    #[test]
    fn collection_order_follows_insertion_not_identifiers() {
        let mut collection = CollectionMap::default();
        let later = ObjectId::from_bytes([0xff; 12]);
        let earlier = ObjectId::from_bytes([0x00; 12]);

        collection.insert(later, doc! { "name": "first" });
        collection.insert(earlier, doc! { "name": "second" });

        let order = collection.values().map(|doc| doc.get_str("name").unwrap()).collect::<Vec<_>>();
        assert_eq!(order, vec!["first", "second"]);

        assert_eq!(collection.remove(&later), Some(doc! { "name": "first" }));
        assert!(collection.get(&later).is_none());
        assert_eq!(collection.get(&earlier), Some(&doc! { "name": "second" }));
    }

    #[tokio::test]
    async fn deleted_documents_leave_remaining_order_intact() {
        let store = InMemoryStore::new();
        let pen = store.insert_document(doc! { "name": "Pen" }, PRODUCTS).await.unwrap();
        store.insert_document(doc! { "name": "Mug" }, PRODUCTS).await.unwrap();

        assert!(store.delete_document(&pen, PRODUCTS).await.unwrap());
        store.insert_document(doc! { "name": "Desk" }, PRODUCTS).await.unwrap();

        let all = store.query_documents(Query::new(), PRODUCTS).await.unwrap();
        assert_eq!(names(&all), vec!["Mug", "Desk"]);
    }

    #[tokio::test]
    async fn query_filters_by_category_and_price() {
        let store = seeded().await;
        let query = Query::builder()
            .filter(Filter::eq("category", "office"))
            .filter(Filter::gte("price", 8.0))
            .build();

        let found = store.query_documents(query, PRODUCTS).await.unwrap();

        assert_eq!(names(&found), vec!["Stapler", "Desk"]);
    }

    #[tokio::test]
    async fn sort_is_stable_for_equal_prices() {
        let store = seeded().await;
        let query = Query::builder().sort("price", SortDirection::Asc).build();

        let sorted = store.query_documents(query, PRODUCTS).await.unwrap();

        assert_eq!(names(&sorted), vec!["Pen", "Mug", "Stapler", "Desk"]);

        let query = Query::builder().sort("price", SortDirection::Desc).build();
        let sorted = store.query_documents(query, PRODUCTS).await.unwrap();

        assert_eq!(names(&sorted), vec!["Desk", "Mug", "Stapler", "Pen"]);
    }

    #[tokio::test]
    async fn projection_drops_identifier_unless_named() {
        let store = seeded().await;

        let query = Query::builder().project(["name", "unknown"]).build();
        let projected = store.query_documents(query, PRODUCTS).await.unwrap();

        assert_eq!(projected[0], doc! { "name": "Pen" });

        let query = Query::builder().project(["_id", "price"]).build();
        let projected = store.query_documents(query, PRODUCTS).await.unwrap();

        assert!(projected[0].get_object_id("_id").is_ok());
        assert_eq!(projected[0].get("price"), Some(&Bson::Double(1.5)));
        assert_eq!(projected[0].len(), 2);
    }

    #[tokio::test]
    async fn sort_applies_before_projection() {
        let store = seeded().await;
        let query = Query::builder()
            .project(["name"])
            .sort("price", SortDirection::Desc)
            .build();

        let found = store.query_documents(query, PRODUCTS).await.unwrap();

        assert_eq!(names(&found), vec!["Desk", "Mug", "Stapler", "Pen"]);
        assert!(found.iter().all(|doc| doc.len() == 1));
    }

    #[tokio::test]
    async fn replace_keeps_identifier_and_drops_other_fields() {
        let store = InMemoryStore::new();
        let id = store
            .insert_document(doc! { "name": "Pen", "price": 1.5, "color": "blue" }, PRODUCTS)
            .await
            .unwrap();

        let matched = store
            .update_document(&id, Update::Replace(doc! { "_id": ObjectId::new(), "name": "Pencil" }), PRODUCTS)
            .await
            .unwrap();

        assert!(matched);
        assert_eq!(
            store.get_document(&id, PRODUCTS).await.unwrap(),
            Some(doc! { "_id": id, "name": "Pencil" }),
        );
    }

    #[tokio::test]
    async fn merge_sets_only_supplied_fields() {
        let store = InMemoryStore::new();
        let id = store
            .insert_document(doc! { "name": "Pen", "price": 1.5 }, PRODUCTS)
            .await
            .unwrap();

        store
            .update_document(&id, Update::Merge(doc! { "price": 2, "color": "red" }), PRODUCTS)
            .await
            .unwrap();

        assert_eq!(
            store.get_document(&id, PRODUCTS).await.unwrap(),
            Some(doc! { "_id": id, "name": "Pen", "price": 2, "color": "red" }),
        );
    }

    #[tokio::test]
    async fn writes_report_missing_documents() {
        let store = seeded().await;
        let missing = ObjectId::new();

        assert!(!store.update_document(&missing, Update::Merge(doc! { "a": 1 }), PRODUCTS).await.unwrap());
        assert!(!store.delete_document(&missing, PRODUCTS).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_document_once() {
        let store = InMemoryStore::new();
        let id = store.insert_document(doc! { "name": "Pen" }, PRODUCTS).await.unwrap();

        assert!(store.delete_document(&id, PRODUCTS).await.unwrap());
        assert!(!store.delete_document(&id, PRODUCTS).await.unwrap());
        assert!(store.get_document(&id, PRODUCTS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryStore::new();
        let clone = store.clone();

        let id = store.insert_document(doc! { "name": "Pen" }, PRODUCTS).await.unwrap();

        assert!(clone.get_document(&id, PRODUCTS).await.unwrap().is_some());
    }
}
