//! Remote Document Store Abstraction
//!
//! The application's data lives in a remote, per-user document store accessed
//! over the network. This trait is the contract the sync layer consumes; the
//! wire protocol and persistence guarantees behind it belong to the host
//! integration, not to this workspace.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::StoreError;

/// A raw entity as stored in one collection: field name to JSON value.
///
/// Inserted documents always come back carrying a store-assigned `id` field
/// (string). Field names are camelCase on the wire; an optional `deletedAt`
/// timestamp (unix millis) marks a soft-deleted entity.
pub type Document = serde_json::Map<String, Value>;

/// Identifier scoping every store access to one user's partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

/// Equality filter on a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Options for a bounded collection query.
///
/// Ties under `order_by` are broken by natural store order, which callers
/// must treat as unspecified.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub filter: Option<FieldFilter>,
    pub order_by: Option<String>,
    pub direction: OrderDirection,
    pub limit: Option<usize>,
}

impl QueryOptions {
    pub fn filtered(filter: FieldFilter) -> Self {
        Self {
            filter: Some(filter),
            ..Default::default()
        }
    }

    pub fn with_order(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some(field.into());
        self.direction = direction;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Per-collection CRUD and query primitives, each scoped by a collection
/// name and a [`UserId`].
///
/// # Update semantics
///
/// `update` performs a shallow merge: a field present in the patch fully
/// replaces the prior value, `Value::Null` clears the field, and omitted
/// fields are untouched.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::store::{RemoteStore, QueryOptions, UserId};
///
/// async fn load_books(store: &dyn RemoteStore, user: &UserId) -> Result<(), StoreError> {
///     let docs = store.query("books", user, &QueryOptions::default()).await?;
///     println!("{} books", docs.len());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Point fetch of one document by id.
    ///
    /// Returns `Ok(None)` if the document does not exist.
    async fn get(
        &self,
        collection: &str,
        user_id: &UserId,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Filtered/ordered/limited query over one collection.
    async fn query(
        &self,
        collection: &str,
        user_id: &UserId,
        options: &QueryOptions,
    ) -> Result<Vec<Document>, StoreError>;

    /// Insert a new document. The store assigns the id and returns the
    /// created document with `id` populated.
    async fn insert(
        &self,
        collection: &str,
        user_id: &UserId,
        fields: Document,
    ) -> Result<Document, StoreError>;

    /// Shallow-merge `patch` into an existing document.
    async fn update(
        &self,
        collection: &str,
        user_id: &UserId,
        id: &str,
        patch: Document,
    ) -> Result<(), StoreError>;

    /// Physically delete a document.
    async fn delete(&self, collection: &str, user_id: &UserId, id: &str)
        -> Result<(), StoreError>;

    /// Lightweight count of documents in a collection.
    async fn count(&self, collection: &str, user_id: &UserId) -> Result<u64, StoreError>;
}
