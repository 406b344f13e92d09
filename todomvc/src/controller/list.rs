//! Controller for the list as a whole.

use crate::actions::TodoAction;
use crate::app::TodoStore;
use crate::error::AppError;
use crate::filter::Filter;
use crate::types::{TodoId, TodoItem};
use crate::view::format_remaining;

/// List-wide operations: creation, bulk completion, clearing
#[derive(Clone, Copy)]
pub struct ListController<'a> {
    store: &'a TodoStore,
}

impl<'a> ListController<'a> {
    pub(crate) const fn new(store: &'a TodoStore) -> Self {
        Self { store }
    }

    /// Update the pending "new todo" title
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn set_new_title(&self, title: impl Into<String>) -> Result<(), AppError> {
        let title = title.into();
        self.store.send(TodoAction::SetNewTitle { title }).await?;
        Ok(())
    }

    /// The pending "new todo" title
    pub async fn new_title(&self) -> String {
        self.store.state(|s| s.new_title.clone()).await
    }

    /// Create an item from the pending title
    ///
    /// Returns the new id, or `None` when the pending title is blank; the
    /// field is then left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn create_todo(&self) -> Result<Option<TodoId>, AppError> {
        let id = TodoId::new();
        self.store.send(TodoAction::CreateTodo { id }).await?;
        Ok(self.created(id).await)
    }

    /// Type `title` into the field and submit it, as one gesture
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn create(&self, title: impl Into<String>) -> Result<Option<TodoId>, AppError> {
        let id = TodoId::new();
        self.store
            .send_batch([
                TodoAction::SetNewTitle {
                    title: title.into(),
                },
                TodoAction::CreateTodo { id },
            ])
            .await?;
        Ok(self.created(id).await)
    }

    async fn created(&self, id: TodoId) -> Option<TodoId> {
        self.store
            .state(|s| s.collection.contains(&id))
            .await
            .then_some(id)
    }

    /// Delete every completed item
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn clear_completed(&self) -> Result<(), AppError> {
        self.store.send(TodoAction::ClearCompleted).await?;
        Ok(())
    }

    /// Number of open items
    pub async fn remaining(&self) -> usize {
        self.store.state(|s| s.collection.remaining_count()).await
    }

    /// Number of completed items
    pub async fn completed(&self) -> usize {
        self.store.state(|s| s.collection.completed_count()).await
    }

    /// Whether any item is completed
    pub async fn has_completed(&self) -> bool {
        self.store.state(|s| s.collection.has_completed()).await
    }

    /// Footer text such as `<strong>2</strong> items left`
    pub async fn remaining_formatted(&self) -> String {
        format_remaining(self.remaining().await)
    }

    /// True iff there is at least one item and all are completed
    pub async fn all_are_done(&self) -> bool {
        self.store.state(|s| s.collection.all_completed()).await
    }

    /// Force every item's completion flag to `done`
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn set_all_are_done(&self, done: bool) -> Result<(), AppError> {
        self.store
            .send(TodoAction::SetAllCompleted { completed: done })
            .await?;
        Ok(())
    }

    /// Items selected by `filter`, in creation order
    pub async fn filtered(&self, filter: Filter) -> Vec<TodoItem> {
        self.store
            .state(|s| s.collection.filtered(filter).cloned().collect())
            .await
    }

    /// Items selected by the current navigation state
    pub async fn visible(&self) -> Vec<TodoItem> {
        self.store.state(|s| s.visible().cloned().collect()).await
    }
}

impl std::fmt::Debug for ListController<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListController").finish_non_exhaustive()
    }
}
