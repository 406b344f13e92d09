//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of items that can be created,
//! edited, completed and deleted. Everything the presentation layer shows is
//! derived from [`TodoState`].

use crate::collection::TodoCollection;
use crate::filter::Filter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Unique identifier for a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a new random `TodoId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TodoId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique identifier, fixed at creation
    pub id: TodoId,
    /// Title of the todo, never blank once stored
    pub title: String,
    /// Whether the todo is completed
    #[serde(default)]
    pub is_completed: bool,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    /// Creates a new, not yet completed todo item
    #[must_use]
    pub const fn new(id: TodoId, title: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            is_completed: false,
            created_at,
        }
    }
}

/// Returns true when a title has nothing but whitespace
#[must_use]
pub fn is_blank(title: &str) -> bool {
    title.trim().is_empty()
}

/// Edit mode of a single item
///
/// Items start in `Viewing` and cycle between the two states for as long as
/// they exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditState {
    /// Title shown read-only
    #[default]
    Viewing,
    /// Title bound to an input
    Editing,
}

/// Application state for the todo list
///
/// Constructed once at startup and owned by the store; controllers and views
/// only read it through the store.
#[derive(Clone, Debug, Default)]
pub struct TodoState {
    /// All todos in creation order
    pub collection: TodoCollection,
    /// Pending title typed into the "new todo" field
    pub new_title: String,
    /// Current navigation state
    pub filter: Filter,
    /// Items currently in edit mode
    pub editing: HashSet<TodoId>,
    /// Last persistence failure, if any
    pub last_error: Option<String>,
}

impl TodoState {
    /// Creates a new empty todo state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Edit mode of the item with `id`
    #[must_use]
    pub fn edit_state(&self, id: &TodoId) -> EditState {
        if self.editing.contains(id) {
            EditState::Editing
        } else {
            EditState::Viewing
        }
    }

    /// Returns true if the item with `id` is in edit mode
    #[must_use]
    pub fn is_editing(&self, id: &TodoId) -> bool {
        self.edit_state(id) == EditState::Editing
    }

    /// Items visible under the current navigation state
    pub fn visible(&self) -> impl Iterator<Item = &TodoItem> + '_ {
        self.collection.filtered(self.filter)
    }
}
