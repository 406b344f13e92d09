//! Process-local gateway.

use super::{GatewayError, GatewayFuture, PersistenceGateway};
use crate::types::{TodoId, TodoItem};
use std::sync::{Arc, Mutex, PoisonError};

/// In-memory gateway keeping items in insertion order.
///
/// Clones share the same storage, so a test can keep a handle and inspect
/// what the application saved.
///
/// # Example
///
/// ```
/// use todomvc::gateway::{InMemoryGateway, PersistenceGateway};
/// use todomvc::types::{TodoId, TodoItem};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = InMemoryGateway::new();
/// let item = TodoItem::new(TodoId::new(), "Buy milk".into(), chrono::Utc::now());
///
/// gateway.save(item.clone()).await?;
/// assert_eq!(gateway.find(item.id).await?, Some(item));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryGateway {
    items: Arc<Mutex<Vec<TodoItem>>>,
}

impl InMemoryGateway {
    /// Create an empty gateway
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway pre-seeded with `items`
    #[must_use]
    pub fn with_items(items: Vec<TodoItem>) -> Self {
        Self {
            items: Arc::new(Mutex::new(items)),
        }
    }

    /// Number of stored items
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns true if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every stored item
    #[must_use]
    pub fn snapshot(&self) -> Vec<TodoItem> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with_items_mut<T>(
        &self,
        f: impl FnOnce(&mut Vec<TodoItem>) -> Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| GatewayError::Unavailable("in-memory store lock poisoned".to_string()))?;
        f(&mut items)
    }
}

impl PersistenceGateway for InMemoryGateway {
    fn save(&self, item: TodoItem) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            self.with_items_mut(|items| {
                if let Some(existing) = items.iter_mut().find(|existing| existing.id == item.id) {
                    *existing = item;
                } else {
                    items.push(item);
                }
                Ok(())
            })
        })
    }

    fn delete(&self, id: TodoId) -> GatewayFuture<'_, ()> {
        Box::pin(async move {
            self.with_items_mut(|items| {
                let index = items
                    .iter()
                    .position(|item| item.id == id)
                    .ok_or(GatewayError::NotFound(id))?;
                items.remove(index);
                Ok(())
            })
        })
    }

    fn find(&self, id: TodoId) -> GatewayFuture<'_, Option<TodoItem>> {
        Box::pin(async move {
            self.with_items_mut(|items| Ok(items.iter().find(|item| item.id == id).cloned()))
        })
    }

    fn find_all(&self) -> GatewayFuture<'_, Vec<TodoItem>> {
        Box::pin(async move { self.with_items_mut(|items| Ok(items.clone())) })
    }
}
