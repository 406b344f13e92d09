//! Persistence gateway abstraction.
//!
//! The todo list never talks to storage directly. Every write goes through a
//! [`PersistenceGateway`] injected via the environment, and the reducer treats
//! each call as fire-and-forget: failures are logged and reported back as an
//! action, but local state is never rolled back. Writes pass through a
//! [`WriteQueue`] so the gateway applies them in dispatch order.
//!
//! # Implementations
//!
//! - [`InMemoryGateway`]: process-local storage, the default
//! - [`JsonFileGateway`]: a single JSON document on disk
//! - [`crate::mocks::RecordingGateway`]: records every call for tests

use crate::types::{TodoId, TodoItem};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

mod json_file;
mod memory;
mod queue;

pub use json_file::JsonFileGateway;
pub use memory::InMemoryGateway;
pub use queue::{Write, WriteQueue};

/// Boxed future returned by gateway operations
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// Errors that can occur during gateway operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The item does not exist in storage.
    #[error("Todo not found: {0}")]
    NotFound(TodoId),

    /// Reading or writing the backing storage failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The backend refused or could not be reached.
    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for GatewayError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Partial update of a stored item
///
/// Fields left as `None` keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New completion flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl TodoPatch {
    /// Applies the set fields to `item`
    pub fn apply(self, item: &mut TodoItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(is_completed) = self.is_completed {
            item.is_completed = is_completed;
        }
    }
}

/// Durable storage for todo items.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures instead of using `async fn` so the gateway
/// can live behind `Arc<dyn PersistenceGateway>` and be captured by effects.
pub trait PersistenceGateway: Send + Sync {
    /// Insert or replace an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn save(&self, item: TodoItem) -> GatewayFuture<'_, ()>;

    /// Merge `patch` into a stored item, returning the updated item.
    ///
    /// The default reads the item, applies the patch and saves it back.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no item has this id, or another
    /// error if the backend rejects the read or the write.
    fn patch(&self, id: TodoId, patch: TodoPatch) -> GatewayFuture<'_, TodoItem> {
        Box::pin(async move {
            let mut item = self.find(id).await?.ok_or(GatewayError::NotFound(id))?;
            patch.apply(&mut item);
            self.save(item.clone()).await?;
            Ok(item)
        })
    }

    /// Remove an item.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no item has this id, or another
    /// error if the backend rejects the write.
    fn delete(&self, id: TodoId) -> GatewayFuture<'_, ()>;

    /// Look up a single item.
    ///
    /// Missing items are `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn find(&self, id: TodoId) -> GatewayFuture<'_, Option<TodoItem>>;

    /// Every saved, not deleted item.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn find_all(&self) -> GatewayFuture<'_, Vec<TodoItem>>;

    /// Finish a batch of writes.
    ///
    /// Backends that write through immediately keep the default no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be made durable.
    fn commit(&self) -> GatewayFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}
