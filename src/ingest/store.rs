//! Persistence contract between handlers and the storage collaborator
//!
//! Handlers see exactly two operations: point lookup by (kind, id) and
//! idempotent upsert by id. No deletes, no range queries, no transaction
//! API. Commit boundaries belong to the storage collaborator, which must
//! provide read-your-writes within one event's processing and crash-safe
//! commit of an event's writes before the next event for that chain.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by an [`EntityStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("failed to encode {kind} entity `{id}`: {source}")]
    Encode {
        kind: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {kind} entity `{id}`: {source}")]
    Decode {
        kind: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A persisted entity record.
///
/// `KIND` names the entity's default table; the composite `id()` is its
/// sole primary key. Projectors that namespace tables per token override the
/// kind at the call site via [`EntityStoreExt::set_entity_in`].
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// Narrow get/set persistence contract handed to handlers.
///
/// `set` is an idempotent upsert: re-delivering an event with the same
/// composite IDs overwrites rows with identical content instead of
/// duplicating them.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Point lookup. `None` when no row with this id exists.
    async fn get(&self, kind: &str, id: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Idempotent upsert by id.
    async fn set(&self, kind: &str, id: &str, value: serde_json::Value) -> Result<(), StoreError>;
}

/// Typed wrappers over the raw [`EntityStore`] value interface.
#[async_trait]
pub trait EntityStoreExt: EntityStore {
    async fn get_entity<T>(&self, id: &str) -> Result<Option<T>, StoreError>
    where
        T: Entity + 'static,
    {
        self.get_entity_in::<T>(T::KIND, id).await
    }

    async fn set_entity<T>(&self, entity: &T) -> Result<(), StoreError>
    where
        T: Entity + 'static,
    {
        self.set_entity_in(T::KIND, entity).await
    }

    /// Typed lookup under an explicit kind (scoped table namespaces).
    async fn get_entity_in<T>(&self, kind: &str, id: &str) -> Result<Option<T>, StoreError>
    where
        T: Entity + 'static,
    {
        match self.get(kind, id).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    kind: kind.to_string(),
                    id: id.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Typed upsert under an explicit kind (scoped table namespaces).
    async fn set_entity_in<T>(&self, kind: &str, entity: &T) -> Result<(), StoreError>
    where
        T: Entity + 'static,
    {
        let value = serde_json::to_value(entity).map_err(|source| StoreError::Encode {
            kind: kind.to_string(),
            id: entity.id().to_string(),
            source,
        })?;
        self.set(kind, entity.id(), value).await
    }
}

impl<S: EntityStore + ?Sized> EntityStoreExt for S {}
