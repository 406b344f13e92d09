//! TodoMVC list model built on a reducer and a store.
//!
//! The crate keeps every rule of a TodoMVC list in one pure reducer:
//!
//! - An ordered collection with derived counts
//! - All / active / completed filter views
//! - List gestures (create, clear completed, toggle all)
//! - Per-item viewing/editing state machine where a blank title deletes
//! - Coalesced persistence through an injectable [`gateway::PersistenceGateway`]
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use todomvc::gateway::InMemoryGateway;
//! use todomvc::TodoApp;
//! use todomvc_core::environment::SystemClock;
//!
//! # async fn example() -> Result<(), todomvc::AppError> {
//! let app = TodoApp::new(Arc::new(SystemClock), Arc::new(InMemoryGateway::new()));
//!
//! let Some(id) = app.list().create("Buy milk").await? else {
//!     return Ok(());
//! };
//! app.item(id).set_completed(true).await?;
//! app.settle().await?;
//!
//! assert_eq!(app.list().remaining_formatted().await, "<strong>0</strong> items left");
//! assert!(app.list().all_are_done().await);
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod app;
pub mod collection;
pub mod config;
pub mod controller;
pub mod environment;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod mocks;
pub mod reducer;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use actions::TodoAction;
pub use app::{TodoApp, TodoStore};
pub use collection::TodoCollection;
pub use config::Config;
pub use environment::TodoEnvironment;
pub use error::AppError;
pub use filter::Filter;
pub use reducer::TodoReducer;
pub use types::{EditState, TodoId, TodoItem, TodoState};
pub use view::{ItemView, ListView};
