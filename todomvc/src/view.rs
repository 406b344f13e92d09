//! Read models handed to a presentation layer.
//!
//! Views are snapshots computed from [`TodoState`]; rebuilding one after each
//! action is how derived values stay consistent with the collection.

use crate::filter::Filter;
use crate::types::{TodoId, TodoItem, TodoState};
use serde::Serialize;

/// Footer text for `remaining` open items
///
/// ```
/// use todomvc::view::format_remaining;
///
/// assert_eq!(format_remaining(1), "<strong>1</strong> item left");
/// assert_eq!(format_remaining(2), "<strong>2</strong> items left");
/// ```
#[must_use]
pub fn format_remaining(remaining: usize) -> String {
    let noun = if remaining == 1 { "item" } else { "items" };
    format!("<strong>{remaining}</strong> {noun} left")
}

/// One rendered row
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    /// Item id, for routing gestures back
    pub id: TodoId,
    /// Current title
    pub title: String,
    /// Completion flag
    pub is_completed: bool,
    /// Whether the row shows an input
    pub is_editing: bool,
}

impl ItemView {
    /// Builds the row for `item`
    #[must_use]
    pub fn new(item: &TodoItem, state: &TodoState) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            is_completed: item.is_completed,
            is_editing: state.is_editing(&item.id),
        }
    }
}

/// The whole list as a presentation layer needs it
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    /// Navigation state the items were selected with
    pub filter: Filter,
    /// Items visible under `filter`, in creation order
    pub items: Vec<ItemView>,
    /// Footer text, see [`format_remaining`]
    pub remaining_formatted: String,
    /// Whether "clear completed" applies
    pub has_completed: bool,
    /// State of the "toggle all" checkbox
    pub all_completed: bool,
}

impl ListView {
    /// Snapshot of `state`
    #[must_use]
    pub fn from_state(state: &TodoState) -> Self {
        let collection = &state.collection;
        Self {
            filter: state.filter,
            items: state.visible().map(|item| ItemView::new(item, state)).collect(),
            remaining_formatted: format_remaining(collection.remaining_count()),
            has_completed: collection.has_completed(),
            all_completed: collection.all_completed(),
        }
    }
}
