//! Application-level error type.

use crate::config::ConfigError;
use crate::filter::ParseFilterError;
use crate::gateway::GatewayError;
use thiserror::Error;
use todomvc_runtime::StoreError;

/// Errors surfaced by [`crate::app::TodoApp`] and the controllers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The store rejected an action or timed out
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A direct gateway read failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A route did not name a filter
    #[error(transparent)]
    Filter(#[from] ParseFilterError),
}
