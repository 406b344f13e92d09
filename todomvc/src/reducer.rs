//! Reducer logic for the todo list.
//!
//! Every rule lives here: blank titles are rejected on create, blank titles
//! delete an item while it is edited, and field changes are collected into a
//! dirty batch that is flushed with one save per item.

use crate::actions::TodoAction;
use crate::environment::TodoEnvironment;
use crate::gateway::{GatewayError, Write};
use crate::types::{TodoId, TodoItem, TodoState, is_blank};
use todomvc_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};

type Effects = SmallVec<[Effect<TodoAction>; 4]>;

/// Reducer for the todo list
#[derive(Clone, Copy, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    // ========== List controller ==========

    fn create_todo(state: &mut TodoState, id: TodoId, env: &TodoEnvironment) -> Effects {
        if is_blank(&state.new_title) {
            tracing::debug!("Ignoring create with blank title");
            return SmallVec::new();
        }

        if state.collection.contains(&id) {
            tracing::warn!(%id, "Ignoring create with duplicate id");
            return SmallVec::new();
        }

        let item = TodoItem::new(id, state.new_title.trim().to_string(), env.clock.now());
        state.collection.insert(item.clone());
        state.new_title.clear();

        tracing::debug!(%id, "Created todo");
        smallvec![Self::save(env, item)]
    }

    fn clear_completed(state: &mut TodoState, env: &TodoEnvironment) -> Effects {
        let removed = state.collection.remove_where(|item| item.is_completed);
        if removed.is_empty() {
            return SmallVec::new();
        }

        for item in &removed {
            state.editing.remove(&item.id);
        }
        tracing::debug!(count = removed.len(), "Cleared completed todos");

        let mut steps: Vec<_> = removed
            .iter()
            .map(|item| Self::delete(env, item.id))
            .collect();
        steps.push(Self::commit(env));

        smallvec![Effect::chain(steps)]
    }

    // ========== Item controller ==========

    fn set_title(
        state: &mut TodoState,
        id: TodoId,
        title: &str,
        env: &TodoEnvironment,
    ) -> Effects {
        if !state.collection.contains(&id) {
            tracing::debug!(%id, "Ignoring title change for unknown todo");
            return SmallVec::new();
        }

        if is_blank(title) {
            if state.is_editing(&id) {
                return Self::delete_todo(state, id, env);
            }
            tracing::debug!(%id, "Ignoring blank title outside edit mode");
            return SmallVec::new();
        }

        if state.collection.set_title(&id, title) {
            Self::mark_dirty(state, [id])
        } else {
            SmallVec::new()
        }
    }

    fn accept_changes(state: &mut TodoState, id: TodoId, env: &TodoEnvironment) -> Effects {
        if !state.editing.remove(&id) {
            return SmallVec::new();
        }

        let Some(title) = state.collection.get(&id).map(|item| item.title.clone()) else {
            return SmallVec::new();
        };

        if is_blank(&title) {
            return Self::delete_todo(state, id, env);
        }

        if state.collection.set_title(&id, title.trim()) {
            Self::mark_dirty(state, [id])
        } else {
            SmallVec::new()
        }
    }

    fn delete_todo(state: &mut TodoState, id: TodoId, env: &TodoEnvironment) -> Effects {
        state.editing.remove(&id);

        if state.collection.remove(&id).is_none() {
            tracing::debug!(%id, "Ignoring delete of unknown todo");
            return SmallVec::new();
        }

        tracing::debug!(%id, "Deleted todo");
        smallvec![Self::delete(env, id)]
    }

    // ========== Lifecycle ==========

    fn loaded(state: &mut TodoState, todos: Vec<TodoItem>) {
        let total = todos.len();
        let todos: Vec<_> = todos.into_iter().filter(|item| !is_blank(&item.title)).collect();
        if todos.len() < total {
            tracing::warn!(skipped = total - todos.len(), "Skipped stored todos with blank titles");
        }

        state.collection.replace_all(todos);
        state.editing.clear();
        tracing::info!(count = state.collection.len(), "Loaded todos");
    }

    fn flush(state: &mut TodoState, env: &TodoEnvironment) -> Effects {
        let items = state.collection.take_dirty();
        if items.is_empty() {
            return SmallVec::new();
        }

        tracing::debug!(count = items.len(), "Flushing dirty todos");
        smallvec![Effect::merge(
            items.into_iter().map(|item| Self::save(env, item)).collect()
        )]
    }

    // ========== Effects ==========

    /// Adds `ids` to the dirty batch, scheduling a flush on the first mark
    fn mark_dirty<I>(state: &mut TodoState, ids: I) -> Effects
    where
        I: IntoIterator<Item = TodoId>,
    {
        let mut schedule = false;
        for id in ids {
            schedule |= state.collection.mark_dirty(id);
        }

        if schedule {
            smallvec![Effect::future(async { Some(TodoAction::Flush) })]
        } else {
            SmallVec::new()
        }
    }

    fn save(env: &TodoEnvironment, item: TodoItem) -> Effect<TodoAction> {
        Self::write(env, Write::Save(item))
    }

    fn delete(env: &TodoEnvironment, id: TodoId) -> Effect<TodoAction> {
        Self::write(env, Write::Delete(id))
    }

    fn commit(env: &TodoEnvironment) -> Effect<TodoAction> {
        Self::write(env, Write::Commit)
    }

    /// Takes the write's place in the queue now, while the state lock is held
    fn write(env: &TodoEnvironment, write: Write) -> Effect<TodoAction> {
        let operation = write.operation();
        let done = env.writes.enqueue(write);
        Effect::future(async move {
            match done.await {
                Ok(()) => {
                    tracing::trace!(operation, "Gateway write applied");
                    None
                },
                Err(error) => Some(Self::failed(operation, &error)),
            }
        })
    }

    fn load(env: &TodoEnvironment) -> Effect<TodoAction> {
        let writes = env.writes.clone();
        Effect::future(async move {
            match writes.find_all().await {
                Ok(todos) => Some(TodoAction::Loaded { todos }),
                Err(error) => Some(Self::failed("find_all", &error)),
            }
        })
    }

    fn failed(operation: &'static str, error: &GatewayError) -> TodoAction {
        tracing::warn!(operation, %error, "Persistence call failed");
        TodoAction::PersistenceFailed {
            operation,
            error: error.to_string(),
        }
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::SetFilter { filter } => {
                state.filter = filter;
                SmallVec::new()
            },
            TodoAction::SetNewTitle { title } => {
                state.new_title = title;
                SmallVec::new()
            },
            TodoAction::CreateTodo { id } => Self::create_todo(state, id, env),
            TodoAction::ClearCompleted => Self::clear_completed(state, env),
            TodoAction::SetAllCompleted { completed } => {
                let changed = state.collection.set_all_completed(completed);
                Self::mark_dirty(state, changed)
            },

            TodoAction::BeginEdit { id } => {
                if state.collection.contains(&id) {
                    state.editing.insert(id);
                }
                SmallVec::new()
            },
            TodoAction::SetTitle { id, title } => Self::set_title(state, id, &title, env),
            TodoAction::AcceptChanges { id } => Self::accept_changes(state, id, env),
            TodoAction::SetCompleted { id, completed } => {
                if state.collection.set_completed(&id, completed) {
                    Self::mark_dirty(state, [id])
                } else {
                    SmallVec::new()
                }
            },
            TodoAction::DeleteTodo { id } => Self::delete_todo(state, id, env),

            TodoAction::Load => smallvec![Self::load(env)],
            TodoAction::Loaded { todos } => {
                Self::loaded(state, todos);
                SmallVec::new()
            },
            TodoAction::Flush => Self::flush(state, env),

            TodoAction::PersistenceFailed { operation, error } => {
                state.last_error = Some(format!("{operation} failed: {error}"));
                SmallVec::new()
            },
        }
    }
}
