//! Dependencies injected into the todo reducer.

use crate::gateway::{PersistenceGateway, WriteQueue};
use std::sync::Arc;
use todomvc_core::environment::Clock;

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for creation timestamps
    pub clock: Arc<dyn Clock>,
    /// Where items are persisted, in dispatch order
    pub writes: WriteQueue,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment` writing to `gateway`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            clock,
            writes: WriteQueue::new(gateway),
        }
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}
