//! In-memory remote store implementation
//!
//! Backs the [`RemoteStore`] contract with per-user, per-collection document
//! maps. Used by tests and local development; it also exercises the exact
//! merge/query semantics the real store collaborator is expected to provide:
//! server-assigned ids, shallow-merge updates where `null` clears a field, and
//! equality/order/limit queries with insertion-order ties.

use async_trait::async_trait;
use bridge_traits::store::{Document, OrderDirection, QueryOptions, RemoteStore, UserId};
use bridge_traits::StoreError;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

type Collection = Vec<(String, Document)>;

/// In-memory [`RemoteStore`].
///
/// Supports failure injection (`set_offline`) and per-collection query
/// counters so tests can assert on fetch coalescing and cache bypass.
#[derive(Default)]
pub struct MemoryRemoteStore {
    // (user, collection) -> insertion-ordered documents
    data: Mutex<HashMap<(String, String), Collection>>,
    query_counts: Mutex<HashMap<String, u64>>,
    offline: AtomicBool,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Number of collection queries issued against `collection` so far.
    pub async fn query_count(&self, collection: &str) -> u64 {
        self.query_counts
            .lock()
            .await
            .get(collection)
            .copied()
            .unwrap_or(0)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            Err(StoreError::Unavailable("store offline".to_string()))
        } else {
            Ok(())
        }
    }

    fn key(user_id: &UserId, collection: &str) -> (String, String) {
        (user_id.as_str().to_string(), collection.to_string())
    }
}

/// Orders two JSON values for `order_by`: numbers numerically, strings
/// lexicographically, anything else by serialized form. Missing fields sort
/// first ascending.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn get(
        &self,
        collection: &str,
        user_id: &UserId,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.check_online()?;
        let data = self.data.lock().await;
        Ok(data
            .get(&Self::key(user_id, collection))
            .and_then(|docs| docs.iter().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn query(
        &self,
        collection: &str,
        user_id: &UserId,
        options: &QueryOptions,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_online()?;
        *self
            .query_counts
            .lock()
            .await
            .entry(collection.to_string())
            .or_insert(0) += 1;

        let data = self.data.lock().await;
        let mut docs: Vec<Document> = data
            .get(&Self::key(user_id, collection))
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default();

        if let Some(filter) = &options.filter {
            docs.retain(|doc| doc.get(&filter.field) == Some(&filter.value));
        }

        if let Some(field) = &options.order_by {
            // Stable sort keeps insertion order for ties.
            docs.sort_by(|a, b| {
                let ord = compare_values(a.get(field), b.get(field));
                match options.direction {
                    OrderDirection::Ascending => ord,
                    OrderDirection::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = options.limit {
            docs.truncate(limit);
        }

        debug!(collection, user = %user_id, results = docs.len(), "memory store query");
        Ok(docs)
    }

    async fn insert(
        &self,
        collection: &str,
        user_id: &UserId,
        mut fields: Document,
    ) -> Result<Document, StoreError> {
        self.check_online()?;
        let id = Uuid::new_v4().to_string();
        fields.insert("id".to_string(), Value::String(id.clone()));

        let mut data = self.data.lock().await;
        data.entry(Self::key(user_id, collection))
            .or_default()
            .push((id, fields.clone()));
        Ok(fields)
    }

    async fn update(
        &self,
        collection: &str,
        user_id: &UserId,
        id: &str,
        patch: Document,
    ) -> Result<(), StoreError> {
        self.check_online()?;
        let mut data = self.data.lock().await;
        let docs = data
            .get_mut(&Self::key(user_id, collection))
            .ok_or_else(|| StoreError::Unavailable(format!("no such document: {id}")))?;
        let doc = docs
            .iter_mut()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, doc)| doc)
            .ok_or_else(|| StoreError::Unavailable(format!("no such document: {id}")))?;

        for (field, value) in patch {
            if value.is_null() {
                doc.remove(&field);
            } else {
                doc.insert(field, value);
            }
        }
        Ok(())
    }

    async fn delete(
        &self,
        collection: &str,
        user_id: &UserId,
        id: &str,
    ) -> Result<(), StoreError> {
        self.check_online()?;
        let mut data = self.data.lock().await;
        if let Some(docs) = data.get_mut(&Self::key(user_id, collection)) {
            docs.retain(|(doc_id, _)| doc_id != id);
        }
        Ok(())
    }

    async fn count(&self, collection: &str, user_id: &UserId) -> Result<u64, StoreError> {
        self.check_online()?;
        let data = self.data.lock().await;
        Ok(data
            .get(&Self::key(user_id, collection))
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::store::FieldFilter;
    use serde_json::json;

    fn doc(pairs: &[(&str, Value)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn insert_assigns_id() {
        let store = MemoryRemoteStore::new();
        let user = UserId::new("u1");

        let created = store
            .insert("books", &user, doc(&[("title", json!("Dune"))]))
            .await
            .unwrap();

        let id = created.get("id").and_then(Value::as_str).unwrap();
        assert!(!id.is_empty());
        let fetched = store.get("books", &user, id).await.unwrap().unwrap();
        assert_eq!(fetched.get("title"), Some(&json!("Dune")));
    }

    #[tokio::test]
    async fn update_merges_and_null_clears() {
        let store = MemoryRemoteStore::new();
        let user = UserId::new("u1");
        let created = store
            .insert(
                "books",
                &user,
                doc(&[("title", json!("Dune")), ("rating", json!(4))]),
            )
            .await
            .unwrap();
        let id = created.get("id").and_then(Value::as_str).unwrap();

        store
            .update(
                "books",
                &user,
                id,
                doc(&[("rating", Value::Null), ("author", json!("Herbert"))]),
            )
            .await
            .unwrap();

        let fetched = store.get("books", &user, id).await.unwrap().unwrap();
        assert_eq!(fetched.get("title"), Some(&json!("Dune")));
        assert_eq!(fetched.get("author"), Some(&json!("Herbert")));
        assert!(fetched.get("rating").is_none());
    }

    #[tokio::test]
    async fn query_filters_orders_and_limits() {
        let store = MemoryRemoteStore::new();
        let user = UserId::new("u1");
        for (title, pos) in [("a", 3), ("b", 1), ("c", 2)] {
            store
                .insert(
                    "books",
                    &user,
                    doc(&[
                        ("title", json!(title)),
                        ("position", json!(pos)),
                        ("seriesId", json!("s1")),
                    ]),
                )
                .await
                .unwrap();
        }

        let opts = QueryOptions::filtered(FieldFilter::equals("seriesId", "s1"))
            .with_order("position", OrderDirection::Ascending)
            .with_limit(2);
        let docs = store.query("books", &user, &opts).await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].get("title"), Some(&json!("b")));
        assert_eq!(docs[1].get("title"), Some(&json!("c")));
        assert_eq!(store.query_count("books").await, 1);
    }

    #[tokio::test]
    async fn user_partitions_are_isolated() {
        let store = MemoryRemoteStore::new();
        store
            .insert("books", &UserId::new("u1"), doc(&[("title", json!("x"))]))
            .await
            .unwrap();

        assert_eq!(store.count("books", &UserId::new("u2")).await.unwrap(), 0);
        assert_eq!(store.count("books", &UserId::new("u1")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn offline_store_fails_every_operation() {
        let store = MemoryRemoteStore::new();
        let user = UserId::new("u1");
        store.set_offline(true);

        let err = store
            .query("books", &user, &QueryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.get("books", &user, "x").await.is_err());
        assert!(store.count("books", &user).await.is_err());
    }
}
