//! Domain models for the personal library
//!
//! Typed views over the remote store's JSON documents. Field names are
//! camelCase on the wire; timestamps are unix milliseconds.

use crate::error::{LibraryError, Result};
use bridge_traits::store::Document;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Entity contract
// =============================================================================

/// A uniquely identified record in one collection of the remote store.
///
/// The store assigns `id` on insert; models round-trip through
/// [`Document`] via serde.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Collection name this entity type lives in.
    const COLLECTION: &'static str;

    /// Store-assigned identifier.
    fn id(&self) -> &str;
}

/// Entities that support soft deletion via a `deletedAt` timestamp.
pub trait SoftDeletable: Entity {
    /// Unix milliseconds, set when the entity was soft-deleted.
    fn deleted_at(&self) -> Option<i64>;

    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Serialize a value into a store document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value).map_err(LibraryError::decode)? {
        Value::Object(map) => Ok(map),
        other => Err(LibraryError::Decode(format!(
            "expected JSON object, got {}",
            other
        ))),
    }
}

/// Deserialize a store document into a typed entity.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    serde_json::from_value(Value::Object(doc)).map_err(LibraryError::decode)
}

// =============================================================================
// Book
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_position: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Unix milliseconds when the book entered the library.
    #[serde(default)]
    pub added_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

impl Entity for Book {
    const COLLECTION: &'static str = "books";

    fn id(&self) -> &str {
        &self.id
    }
}

impl SoftDeletable for Book {
    fn deleted_at(&self) -> Option<i64> {
        self.deleted_at
    }
}

/// Fields for creating a book; the store assigns the id.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    pub genre_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub added_at: i64,
}

// =============================================================================
// Genre
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: String,
    pub name: String,
    /// Number of non-deleted books tagged with this genre. Maintained by
    /// clamped increments; lost updates under concurrent writers are a
    /// documented limitation.
    #[serde(default)]
    pub book_count: u32,
}

impl Entity for Genre {
    const COLLECTION: &'static str = "genres";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGenre {
    pub name: String,
    pub book_count: u32,
}

// =============================================================================
// Wishlist
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub added_at: i64,
    /// Set when the item was bought and promoted out of the wishlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchased_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

impl Entity for WishlistItem {
    const COLLECTION: &'static str = "wishlist";

    fn id(&self) -> &str {
        &self.id
    }
}

impl SoftDeletable for WishlistItem {
    fn deleted_at(&self) -> Option<i64> {
        self.deleted_at
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWishlistItem {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub added_at: i64,
}
