//! The authoritative, ordered list of todo items.
//!
//! Besides membership and the derived counts, the collection tracks which
//! items changed since the last save (the dirty batch) and whether a flush of
//! that batch is already scheduled. Saves are coalesced through it: however
//! many field edits land in one batch, each touched item is saved once.

use crate::filter::Filter;
use crate::types::{TodoId, TodoItem};

/// Ordered collection of todo items with a coalescing dirty batch
#[derive(Clone, Debug, Default)]
pub struct TodoCollection {
    items: Vec<TodoItem>,
    dirty: Vec<TodoId>,
    flush_scheduled: bool,
}

impl TodoCollection {
    /// Creates an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in creation order
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Iterates items in creation order
    pub fn iter(&self) -> std::slice::Iter<'_, TodoItem> {
        self.items.iter()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn contains(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    fn get_mut(&mut self, id: &TodoId) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|item| item.id == *id)
    }

    /// Appends an item
    ///
    /// Returns false, leaving the collection untouched, if the id is taken.
    pub fn insert(&mut self, item: TodoItem) -> bool {
        if self.contains(&item.id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Removes an item, dropping any pending save for it
    pub fn remove(&mut self, id: &TodoId) -> Option<TodoItem> {
        let index = self.items.iter().position(|item| item.id == *id)?;
        self.dirty.retain(|dirty| dirty != id);
        Some(self.items.remove(index))
    }

    /// Removes every item matching `predicate`, keeping the order of the rest
    ///
    /// Returns the removed items in their former order.
    pub fn remove_where<P>(&mut self, mut predicate: P) -> Vec<TodoItem>
    where
        P: FnMut(&TodoItem) -> bool,
    {
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.items).into_iter().partition(|item| predicate(item));
        self.items = kept;
        self.dirty
            .retain(|id| !removed.iter().any(|item| item.id == *id));
        removed
    }

    /// Sets an item's title
    ///
    /// Returns true only if the item exists and the title actually changed.
    pub fn set_title(&mut self, id: &TodoId, title: &str) -> bool {
        match self.get_mut(id) {
            Some(item) if item.title != title => {
                title.clone_into(&mut item.title);
                true
            },
            _ => false,
        }
    }

    /// Sets an item's completion flag
    ///
    /// Returns true only if the item exists and the flag actually changed.
    pub fn set_completed(&mut self, id: &TodoId, completed: bool) -> bool {
        match self.get_mut(id) {
            Some(item) if item.is_completed != completed => {
                item.is_completed = completed;
                true
            },
            _ => false,
        }
    }

    /// Forces every item's completion flag to `completed`
    ///
    /// Returns the ids of the items that changed.
    pub fn set_all_completed(&mut self, completed: bool) -> Vec<TodoId> {
        self.items
            .iter_mut()
            .filter(|item| item.is_completed != completed)
            .map(|item| {
                item.is_completed = completed;
                item.id
            })
            .collect()
    }

    /// Adds an item to the dirty batch
    ///
    /// Returns true when the caller must schedule a flush: this is the first
    /// mark since the last flush.
    pub fn mark_dirty(&mut self, id: TodoId) -> bool {
        if !self.dirty.contains(&id) {
            self.dirty.push(id);
        }
        if self.flush_scheduled {
            false
        } else {
            self.flush_scheduled = true;
            true
        }
    }

    /// Drains the dirty batch
    ///
    /// Returns snapshots of the dirty items that still exist, in the order
    /// they were first marked, and allows the next mark to schedule a flush.
    pub fn take_dirty(&mut self) -> Vec<TodoItem> {
        self.flush_scheduled = false;
        std::mem::take(&mut self.dirty)
            .into_iter()
            .filter_map(|id| self.get(&id).cloned())
            .collect()
    }

    /// Ids waiting for the next flush
    #[must_use]
    pub fn dirty_ids(&self) -> &[TodoId] {
        &self.dirty
    }

    /// Returns true while a flush is scheduled and not yet run
    #[must_use]
    pub const fn is_flush_scheduled(&self) -> bool {
        self.flush_scheduled
    }

    /// Replaces every item, e.g. with what the gateway loaded
    ///
    /// Items are ordered by creation time (ties keep their given order) and
    /// duplicate ids keep their first occurrence. The dirty batch is dropped.
    pub fn replace_all(&mut self, mut todos: Vec<TodoItem>) {
        todos.sort_by_key(|item| item.created_at);
        self.items.clear();
        for item in todos {
            self.insert(item);
        }
        self.dirty.clear();
        self.flush_scheduled = false;
    }

    /// Number of items not yet completed
    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_completed).count()
    }

    /// Number of completed items
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_completed).count()
    }

    /// Returns true if at least one item is completed
    #[must_use]
    pub fn has_completed(&self) -> bool {
        self.items.iter().any(|item| item.is_completed)
    }

    /// Returns true iff the collection is non-empty and every item is completed
    #[must_use]
    pub fn all_completed(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| item.is_completed)
    }

    /// Items visible through `filter`, in creation order
    pub fn filtered(&self, filter: Filter) -> impl Iterator<Item = &TodoItem> + '_ {
        self.items.iter().filter(move |item| filter.matches(item))
    }
}

impl<'a> IntoIterator for &'a TodoCollection {
    type Item = &'a TodoItem;
    type IntoIter = std::slice::Iter<'a, TodoItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
