//! The application object.
//!
//! [`TodoApp`] is constructed once at startup and owns the store. Controllers
//! borrow it; nothing is kept in globals.

use crate::actions::TodoAction;
use crate::config::{Config, StorageBackend};
use crate::controller::{ItemController, ListController};
use crate::environment::TodoEnvironment;
use crate::error::AppError;
use crate::filter::Filter;
use crate::gateway::{InMemoryGateway, JsonFileGateway, PersistenceGateway, WriteQueue};
use crate::reducer::TodoReducer;
use crate::types::{TodoId, TodoItem, TodoState};
use crate::view::ListView;
use std::sync::Arc;
use std::time::Duration;
use todomvc_core::environment::{Clock, SystemClock};
use todomvc_runtime::Store;
use tokio::sync::broadcast;

/// Store specialized to the todo list
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Running todo application
#[derive(Clone)]
pub struct TodoApp {
    store: TodoStore,
    writes: WriteQueue,
    settle_timeout: Duration,
}

impl TodoApp {
    /// Create an empty application persisting through `gateway`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, gateway: Arc<dyn PersistenceGateway>) -> Self {
        let environment = TodoEnvironment::new(clock, gateway);
        let writes = environment.writes.clone();
        Self {
            store: Store::new(TodoState::new(), TodoReducer::new(), environment),
            writes,
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
        }
    }

    /// Create an application with the gateway selected by `config`
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let gateway: Arc<dyn PersistenceGateway> = match config.storage {
            StorageBackend::Memory => Arc::new(InMemoryGateway::new()),
            StorageBackend::File => Arc::new(JsonFileGateway::new(&config.data_path)),
        };
        tracing::info!(storage = ?config.storage, "Creating todo application");

        Self::new(Arc::new(SystemClock), gateway).with_settle_timeout(config.settle_timeout)
    }

    /// Replace how long [`settle`](Self::settle) waits
    #[must_use]
    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Replace the collection with everything the gateway holds
    ///
    /// Returns the number of loaded items. A failing gateway leaves the
    /// collection empty and sets [`last_error`](Self::last_error).
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down or loading does not
    /// finish within the settle timeout.
    pub async fn load(&self) -> Result<usize, AppError> {
        self.store.send(TodoAction::Load).await?;
        self.settle().await?;
        Ok(self.store.state(|s| s.collection.len()).await)
    }

    /// Controller for list-wide operations
    #[must_use]
    pub fn list(&self) -> ListController<'_> {
        ListController::new(&self.store)
    }

    /// Controller for a single item
    #[must_use]
    pub fn item(&self, id: TodoId) -> ItemController<'_> {
        ItemController::new(&self.store, id)
    }

    /// Switch the navigation state
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn navigate(&self, filter: Filter) -> Result<(), AppError> {
        self.store.send(TodoAction::SetFilter { filter }).await?;
        Ok(())
    }

    /// Switch the navigation state by route name (`""`, `all`, `active`, `completed`)
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Filter`] for an unknown route, or an error if the
    /// store is shutting down.
    pub async fn navigate_to(&self, route: &str) -> Result<(), AppError> {
        let filter = route.trim_start_matches('/').parse()?;
        self.navigate(filter).await
    }

    /// Current navigation state
    pub async fn filter(&self) -> Filter {
        self.store.state(|s| s.filter).await
    }

    /// Snapshot of the list for rendering
    pub async fn view(&self) -> ListView {
        self.store.state(ListView::from_state).await
    }

    /// Every item in creation order, ignoring the navigation state
    pub async fn todos(&self) -> Vec<TodoItem> {
        self.store.state(|s| s.collection.items().to_vec()).await
    }

    /// Read an item from the gateway once queued writes have landed
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`] if the backend cannot be read.
    pub async fn fetch(&self, id: TodoId) -> Result<Option<TodoItem>, AppError> {
        Ok(self.writes.find(id).await?)
    }

    /// Last persistence failure reported by an effect
    pub async fn last_error(&self) -> Option<String> {
        self.store.state(|s| s.last_error.clone()).await
    }

    /// Notified of every action the store reduces
    ///
    /// Rebuild the [`ListView`] on each message to keep a rendering in sync.
    /// [`TodoAction::is_feedback`] tells user gestures from effect results.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TodoAction> {
        self.store.subscribe_actions()
    }

    /// Wait until every pending save, delete and load has finished
    ///
    /// # Errors
    ///
    /// Returns an error if effects are still running after the settle timeout.
    pub async fn settle(&self) -> Result<(), AppError> {
        Ok(self.store.settle(self.settle_timeout).await?)
    }

    /// Stop accepting gestures and wait for pending persistence
    ///
    /// # Errors
    ///
    /// Returns an error if effects are still running after the settle timeout.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        Ok(self.store.shutdown(self.settle_timeout).await?)
    }
}

impl std::fmt::Debug for TodoApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoApp")
            .field("settle_timeout", &self.settle_timeout)
            .finish_non_exhaustive()
    }
}
