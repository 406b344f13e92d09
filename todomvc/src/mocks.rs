//! Test doubles for the persistence gateway.
//!
//! [`RecordingGateway`] stores items like [`InMemoryGateway`] and additionally
//! records every call, so tests can assert how many saves a batch produced.

use crate::gateway::{GatewayError, GatewayFuture, InMemoryGateway, PersistenceGateway};
use crate::types::{TodoId, TodoItem};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call made against a [`RecordingGateway`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    /// `save` with the item as passed
    Save(TodoItem),
    /// `delete` of an id
    Delete(TodoId),
    /// `find` of an id
    Find(TodoId),
    /// `find_all`
    FindAll,
    /// `commit`
    Commit,
}

/// Gateway recording every call, optionally failing all of them
///
/// Clones share storage, the call log and the failure switch.
///
/// # Example
///
/// ```
/// use todomvc::gateway::PersistenceGateway;
/// use todomvc::mocks::{GatewayCall, RecordingGateway};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = RecordingGateway::new();
/// gateway.commit().await?;
/// assert_eq!(gateway.calls(), vec![GatewayCall::Commit]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecordingGateway {
    storage: InMemoryGateway,
    calls: Arc<Mutex<Vec<GatewayCall>>>,
    failure: Arc<Mutex<Option<GatewayError>>>,
}

// Test state stays usable after a panicking test thread
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordingGateway {
    /// Create an empty recording gateway
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway whose storage starts with `items`
    #[must_use]
    pub fn with_items(items: Vec<TodoItem>) -> Self {
        Self {
            storage: InMemoryGateway::with_items(items),
            ..Self::default()
        }
    }

    /// Make every following call fail with `error`
    pub fn fail_with(&self, error: GatewayError) {
        *lock(&self.failure) = Some(error);
    }

    /// Make following calls succeed again
    pub fn succeed(&self) {
        *lock(&self.failure) = None;
    }

    /// Every call so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        lock(&self.calls).clone()
    }

    /// Forget recorded calls, keeping storage
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Items passed to `save`, in call order
    #[must_use]
    pub fn saves(&self) -> Vec<TodoItem> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                GatewayCall::Save(item) => Some(item.clone()),
                _ => None,
            })
            .collect()
    }

    /// Ids passed to `delete`, in call order
    #[must_use]
    pub fn deletes(&self) -> Vec<TodoId> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                GatewayCall::Delete(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Number of `commit` calls
    #[must_use]
    pub fn commits(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| matches!(call, GatewayCall::Commit))
            .count()
    }

    /// What is currently stored
    #[must_use]
    pub fn stored(&self) -> Vec<TodoItem> {
        self.storage.snapshot()
    }

    fn record(&self, call: GatewayCall) -> Result<(), GatewayError> {
        lock(&self.calls).push(call);
        lock(&self.failure).clone().map_or(Ok(()), Err)
    }
}

impl PersistenceGateway for RecordingGateway {
    fn save(&self, item: TodoItem) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            self.record(GatewayCall::Save(item.clone()))?;
            self.storage.save(item).await
        })
    }

    fn delete(&self, id: TodoId) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            self.record(GatewayCall::Delete(id))?;
            self.storage.delete(id).await
        })
    }

    fn find(&self, id: TodoId) -> GatewayFuture<'_, Option<TodoItem>> {
        Box::pin(async move {
            self.record(GatewayCall::Find(id))?;
            self.storage.find(id).await
        })
    }

    fn find_all(&self) -> GatewayFuture<'_, Vec<TodoItem>> {
        Box::pin(async move {
            self.record(GatewayCall::FindAll)?;
            self.storage.find_all().await
        })
    }

    fn commit(&self) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            self.record(GatewayCall::Commit)?;
            self.storage.commit().await
        })
    }
}
