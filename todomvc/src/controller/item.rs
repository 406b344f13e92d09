//! Controller for a single todo item.

use crate::actions::TodoAction;
use crate::app::TodoStore;
use crate::error::AppError;
use crate::types::{EditState, TodoId, TodoItem};
use crate::view::ItemView;

/// Operations on one item, including its viewing/editing state machine
///
/// Gestures on an item that no longer exists are ignored.
#[derive(Clone, Copy)]
pub struct ItemController<'a> {
    store: &'a TodoStore,
    id: TodoId,
}

impl<'a> ItemController<'a> {
    pub(crate) const fn new(store: &'a TodoStore, id: TodoId) -> Self {
        Self { store, id }
    }

    /// Id of the controlled item
    #[must_use]
    pub const fn id(&self) -> TodoId {
        self.id
    }

    async fn send(&self, action: TodoAction) -> Result<(), AppError> {
        self.store.send(action).await?;
        Ok(())
    }

    /// `viewing → editing`
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn begin_edit(&self) -> Result<(), AppError> {
        self.send(TodoAction::BeginEdit { id: self.id }).await
    }

    /// Update the bound title
    ///
    /// While editing, a blank title deletes the item.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn set_title(&self, title: impl Into<String>) -> Result<(), AppError> {
        self.send(TodoAction::SetTitle {
            id: self.id,
            title: title.into(),
        })
        .await
    }

    /// `editing → viewing` on blur or enter
    ///
    /// Deletes the item if its title is blank at that point.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn accept_changes(&self) -> Result<(), AppError> {
        self.send(TodoAction::AcceptChanges { id: self.id }).await
    }

    /// Set the title and leave edit mode, as one gesture
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn commit_title(&self, title: impl Into<String>) -> Result<(), AppError> {
        self.store
            .send_batch([
                TodoAction::SetTitle {
                    id: self.id,
                    title: title.into(),
                },
                TodoAction::AcceptChanges { id: self.id },
            ])
            .await?;
        Ok(())
    }

    /// Set the completion flag
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn set_completed(&self, completed: bool) -> Result<(), AppError> {
        self.send(TodoAction::SetCompleted {
            id: self.id,
            completed,
        })
        .await
    }

    /// Flip the completion flag
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn toggle(&self) -> Result<(), AppError> {
        match self.item().await {
            Some(item) => self.set_completed(!item.is_completed).await,
            None => Ok(()),
        }
    }

    /// Delete the item, whatever its edit state
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn remove_todo(&self) -> Result<(), AppError> {
        self.send(TodoAction::DeleteTodo { id: self.id }).await
    }

    /// Current edit state
    pub async fn edit_state(&self) -> EditState {
        let id = self.id;
        self.store.state(move |s| s.edit_state(&id)).await
    }

    /// Whether the item is in edit mode
    pub async fn is_editing(&self) -> bool {
        self.edit_state().await == EditState::Editing
    }

    /// The item, if it still exists
    pub async fn item(&self) -> Option<TodoItem> {
        let id = self.id;
        self.store.state(move |s| s.collection.get(&id).cloned()).await
    }

    /// The rendered row, if the item still exists
    pub async fn view(&self) -> Option<ItemView> {
        let id = self.id;
        self.store
            .state(move |s| s.collection.get(&id).map(|item| ItemView::new(item, s)))
            .await
    }
}

impl std::fmt::Debug for ItemController<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemController").field("id", &self.id).finish_non_exhaustive()
    }
}
