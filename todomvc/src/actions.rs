//! Actions accepted by the todo reducer.
//!
//! User gestures arrive through the controllers; lifecycle and feedback
//! actions are produced by effects.

use crate::filter::Filter;
use crate::types::{TodoId, TodoItem};

/// Every input to [`crate::reducer::TodoReducer`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Navigation ==========
    /// Select which items are listed
    SetFilter {
        /// New navigation state
        filter: Filter,
    },

    // ========== List controller ==========
    /// Update the pending "new todo" title
    SetNewTitle {
        /// Text currently typed into the field
        title: String,
    },

    /// Create a todo from the pending title
    ///
    /// Ignored if the pending title is blank.
    CreateTodo {
        /// Identifier for the new item
        id: TodoId,
    },

    /// Delete every completed item
    ClearCompleted,

    /// Force every item's completion flag
    SetAllCompleted {
        /// Value written to every item
        completed: bool,
    },

    // ========== Item controller ==========
    /// Switch an item from viewing to editing
    BeginEdit {
        /// Item to edit
        id: TodoId,
    },

    /// Replace an item's title
    SetTitle {
        /// Item to retitle
        id: TodoId,
        /// New title, blank deletes the item while editing
        title: String,
    },

    /// Leave edit mode (blur or enter)
    AcceptChanges {
        /// Item being edited
        id: TodoId,
    },

    /// Set an item's completion flag
    SetCompleted {
        /// Item to update
        id: TodoId,
        /// New value
        completed: bool,
    },

    /// Delete a single item, whatever its edit state
    DeleteTodo {
        /// Item to delete
        id: TodoId,
    },

    // ========== Lifecycle ==========
    /// Fetch every stored item from the gateway
    Load,

    /// Items returned by the gateway
    Loaded {
        /// Stored items, in any order
        todos: Vec<TodoItem>,
    },

    /// Save every item in the dirty batch
    Flush,

    // ========== Feedback ==========
    /// A gateway call failed
    PersistenceFailed {
        /// Gateway operation that failed
        operation: &'static str,
        /// Error message
        error: String,
    },
}

impl TodoAction {
    /// Returns true for actions that come from effects rather than users
    #[must_use]
    pub const fn is_feedback(&self) -> bool {
        matches!(
            self,
            Self::Loaded { .. } | Self::Flush | Self::PersistenceFailed { .. }
        )
    }
}
