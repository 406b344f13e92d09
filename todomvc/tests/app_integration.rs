//! Integration tests driving [`TodoApp`] through its controllers
//!
//! Persistence is observed through a [`RecordingGateway`], so these tests
//! check both the list model and the exact gateway traffic it produces.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use todomvc::gateway::{GatewayError, JsonFileGateway};
use todomvc::mocks::{GatewayCall, RecordingGateway};
use todomvc::{AppError, Filter, TodoAction, TodoApp, TodoId, TodoItem};
use todomvc_core::environment::Clock;
use todomvc_runtime::StoreError;
use todomvc_testing::stepping_clock;

// ============================================================================
// Fixtures
// ============================================================================

fn app_with(gateway: &RecordingGateway) -> TodoApp {
    TodoApp::new(Arc::new(stepping_clock()), Arc::new(gateway.clone()))
        .with_settle_timeout(Duration::from_secs(2))
}

/// Creates the given items, completing those flagged, and forgets the
/// resulting gateway traffic.
async fn seeded(gateway: &RecordingGateway, items: &[(&str, bool)]) -> (TodoApp, Vec<TodoId>) {
    let app = app_with(gateway);
    let mut ids = Vec::new();
    for (title, done) in items {
        let id = app.list().create(*title).await.unwrap().unwrap();
        if *done {
            app.item(id).set_completed(true).await.unwrap();
        }
        ids.push(id);
    }
    app.settle().await.unwrap();
    gateway.clear_calls();
    (app, ids)
}

/// Stored items by id, compared with what the list holds
async fn assert_gateway_matches_list(app: &TodoApp, gateway: &RecordingGateway) {
    let mut stored = gateway.stored();
    let mut listed = app.todos().await;
    stored.sort_by_key(|item| item.id);
    listed.sort_by_key(|item| item.id);
    assert_eq!(stored, listed);
}

// ============================================================================
// List controller
// ============================================================================

#[tokio::test]
async fn create_appends_item_and_saves_it() {
    let gateway = RecordingGateway::new();
    let app = app_with(&gateway);

    app.list().set_new_title("Buy milk").await.unwrap();
    let id = app.list().create_todo().await.unwrap().unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.list().new_title().await, "");
    let todos = app.todos().await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, id);
    assert!(!todos[0].is_completed);
    assert_eq!(gateway.calls(), vec![GatewayCall::Save(todos[0].clone())]);
}

#[tokio::test]
async fn whitespace_title_leaves_collection_and_field_unchanged() {
    let gateway = RecordingGateway::new();
    let app = app_with(&gateway);

    app.list().set_new_title("   ").await.unwrap();
    assert_eq!(app.list().create_todo().await.unwrap(), None);
    app.settle().await.unwrap();

    assert!(app.todos().await.is_empty());
    assert_eq!(app.list().new_title().await, "   ");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn toggle_all_on_mixed_list_completes_everything() {
    let gateway = RecordingGateway::new();
    let (app, _) = seeded(&gateway, &[("a", false), ("b", false), ("c", true)]).await;

    app.list().set_all_are_done(true).await.unwrap();
    app.settle().await.unwrap();

    let list = app.list();
    assert_eq!(list.completed().await, 3);
    assert_eq!(list.remaining().await, 0);
    assert!(list.all_are_done().await);

    // Only the two items that changed are saved, each once
    let saved: HashSet<_> = gateway.saves().iter().map(|item| item.id).collect();
    assert_eq!(gateway.saves().len(), 2);
    assert_eq!(saved.len(), 2);
}

#[tokio::test]
async fn toggle_all_off_reopens_everything() {
    let gateway = RecordingGateway::new();
    let (app, _) = seeded(&gateway, &[("a", true), ("b", true)]).await;

    app.list().set_all_are_done(false).await.unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.list().remaining().await, 2);
    assert!(!app.list().all_are_done().await);
    assert!(!app.list().has_completed().await);
}

#[tokio::test]
async fn remaining_formatted_pluralizes() {
    let gateway = RecordingGateway::new();
    let (app, ids) = seeded(&gateway, &[("a", false), ("b", false)]).await;

    assert_eq!(
        app.list().remaining_formatted().await,
        "<strong>2</strong> items left"
    );

    app.item(ids[0]).toggle().await.unwrap();
    assert_eq!(
        app.list().remaining_formatted().await,
        "<strong>1</strong> item left"
    );
}

#[tokio::test]
async fn clear_completed_keeps_only_active_items() {
    let gateway = RecordingGateway::new();
    let (app, ids) = seeded(&gateway, &[("done", true), ("open", false), ("also", true)]).await;

    app.list().clear_completed().await.unwrap();
    app.settle().await.unwrap();

    let todos = app.todos().await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, ids[1]);
    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::Delete(ids[0]),
            GatewayCall::Delete(ids[2]),
            GatewayCall::Commit,
        ]
    );
    assert_eq!(gateway.stored(), todos);
}

// ============================================================================
// Coalesced saves
// ============================================================================

#[tokio::test]
async fn field_changes_in_one_batch_save_each_item_once() {
    let gateway = RecordingGateway::new();
    let (app, ids) = seeded(&gateway, &[("a", false), ("b", false)]).await;

    app.store()
        .send_batch([
            TodoAction::SetCompleted {
                id: ids[0],
                completed: true,
            },
            TodoAction::SetTitle {
                id: ids[0],
                title: "a renamed".to_string(),
            },
            TodoAction::SetCompleted {
                id: ids[1],
                completed: true,
            },
            TodoAction::SetTitle {
                id: ids[0],
                title: "a final".to_string(),
            },
        ])
        .await
        .unwrap();
    app.settle().await.unwrap();

    let saves = gateway.saves();
    assert_eq!(saves.len(), 2);
    let first = saves.iter().find(|item| item.id == ids[0]).unwrap();
    assert_eq!(first.title, "a final");
    assert!(first.is_completed);
    assert!(saves.iter().any(|item| item.id == ids[1] && item.is_completed));
}

#[tokio::test]
async fn later_batches_schedule_a_new_flush() {
    let gateway = RecordingGateway::new();
    let (app, ids) = seeded(&gateway, &[("a", false)]).await;

    app.item(ids[0]).set_completed(true).await.unwrap();
    app.settle().await.unwrap();
    app.item(ids[0]).set_completed(false).await.unwrap();
    app.settle().await.unwrap();

    let saves = gateway.saves();
    assert_eq!(saves.len(), 2);
    assert!(saves[0].is_completed);
    assert!(!saves[1].is_completed);
}

// ============================================================================
// Item controller
// ============================================================================

#[tokio::test]
async fn edit_cycle_returns_to_viewing() {
    let gateway = RecordingGateway::new();
    let (app, ids) = seeded(&gateway, &[("draft", false)]).await;
    let item = app.item(ids[0]);

    assert!(!item.is_editing().await);
    item.begin_edit().await.unwrap();
    assert!(item.is_editing().await);
    assert!(item.view().await.unwrap().is_editing);

    item.commit_title("final").await.unwrap();
    app.settle().await.unwrap();

    assert!(!item.is_editing().await);
    assert_eq!(item.item().await.unwrap().title, "final");
    assert_eq!(gateway.saves().len(), 1);

    // The cycle can start again
    item.begin_edit().await.unwrap();
    assert!(item.is_editing().await);
}

#[tokio::test]
async fn emptying_title_while_editing_removes_the_item() {
    let gateway = RecordingGateway::new();
    let (app, ids) = seeded(&gateway, &[("a", false), ("b", false)]).await;
    let item = app.item(ids[0]);

    item.begin_edit().await.unwrap();
    item.set_title("").await.unwrap();
    app.settle().await.unwrap();

    assert!(item.item().await.is_none());
    assert!(!item.is_editing().await);
    assert!(app.todos().await.iter().all(|todo| !todo.title.is_empty()));
    assert_eq!(gateway.calls(), vec![GatewayCall::Delete(ids[0])]);
}

#[tokio::test]
async fn accepting_a_blank_title_removes_the_item() {
    let gateway = RecordingGateway::new();
    let (app, ids) = seeded(&gateway, &[("a", false)]).await;
    let item = app.item(ids[0]);

    item.begin_edit().await.unwrap();
    item.commit_title("   ").await.unwrap();
    app.settle().await.unwrap();

    assert!(app.todos().await.is_empty());
    assert_eq!(gateway.deletes(), vec![ids[0]]);
}

#[tokio::test]
async fn remove_todo_works_in_any_state() {
    let gateway = RecordingGateway::new();
    let (app, ids) = seeded(&gateway, &[("viewing", false), ("editing", false)]).await;

    app.item(ids[0]).remove_todo().await.unwrap();
    app.item(ids[1]).begin_edit().await.unwrap();
    app.item(ids[1]).remove_todo().await.unwrap();
    app.settle().await.unwrap();

    assert!(app.todos().await.is_empty());
    let deleted: HashSet<_> = gateway.deletes().into_iter().collect();
    assert_eq!(deleted, ids.into_iter().collect());
}

#[tokio::test]
async fn gestures_on_missing_items_are_ignored() {
    let gateway = RecordingGateway::new();
    let app = app_with(&gateway);
    let ghost = app.item(TodoId::new());

    ghost.begin_edit().await.unwrap();
    ghost.set_completed(true).await.unwrap();
    ghost.toggle().await.unwrap();
    ghost.remove_todo().await.unwrap();
    app.settle().await.unwrap();

    assert!(!ghost.is_editing().await);
    assert!(ghost.view().await.is_none());
    assert!(gateway.calls().is_empty());
}

// ============================================================================
// Filter views and navigation
// ============================================================================

#[tokio::test]
async fn filter_views_partition_the_collection() {
    let gateway = RecordingGateway::new();
    let (app, _) = seeded(&gateway, &[("a", true), ("b", false), ("c", true)]).await;
    let list = app.list();

    let all = list.filtered(Filter::All).await;
    let active = list.filtered(Filter::Active).await;
    let completed = list.filtered(Filter::Completed).await;

    assert!(active.iter().all(|item| !item.is_completed));
    assert!(completed.iter().all(|item| item.is_completed));
    assert_eq!(all.len(), active.len() + completed.len());
}

#[tokio::test]
async fn navigation_selects_the_rendered_view() {
    let gateway = RecordingGateway::new();
    let (app, _) = seeded(&gateway, &[("done", true), ("open", false)]).await;

    app.navigate_to("/active").await.unwrap();
    assert_eq!(app.filter().await, Filter::Active);
    let view = app.view().await;
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].title, "open");
    assert!(view.has_completed);

    app.navigate_to("").await.unwrap();
    assert_eq!(app.list().visible().await.len(), 2);

    let error = app.navigate_to("/archived").await.unwrap_err();
    assert!(matches!(error, AppError::Filter(_)));
    assert_eq!(app.filter().await, Filter::All);
}

#[tokio::test]
async fn effect_results_are_flagged_as_feedback() {
    let gateway = RecordingGateway::new();
    let (app, ids) = seeded(&gateway, &[("a", false)]).await;
    let mut changes = app.subscribe();

    app.item(ids[0]).toggle().await.unwrap();
    app.settle().await.unwrap();

    let first = changes.recv().await.unwrap();
    assert!(matches!(first, TodoAction::SetCompleted { .. }));
    assert!(!first.is_feedback());

    let second = changes.recv().await.unwrap();
    assert_eq!(second, TodoAction::Flush);
    assert!(second.is_feedback());
}

#[tokio::test]
async fn subscribers_observe_every_change() {
    let gateway = RecordingGateway::new();
    let app = app_with(&gateway);
    let mut changes = app.subscribe();

    app.list().create("watched").await.unwrap();
    app.settle().await.unwrap();

    assert!(matches!(
        changes.recv().await.unwrap(),
        TodoAction::SetNewTitle { .. }
    ));
    assert!(matches!(
        changes.recv().await.unwrap(),
        TodoAction::CreateTodo { .. }
    ));
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn delete_right_after_create_leaves_nothing_stored() {
    let gateway = RecordingGateway::new();
    let app = app_with(&gateway);

    for round in 0..200 {
        let id = app.list().create(format!("short lived {round}")).await.unwrap().unwrap();
        app.item(id).remove_todo().await.unwrap();
    }
    app.settle().await.unwrap();

    assert!(app.todos().await.is_empty());
    assert!(gateway.stored().is_empty());
    assert!(app.last_error().await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn delete_right_after_toggle_leaves_nothing_stored() {
    let gateway = RecordingGateway::new();
    let app = app_with(&gateway);

    for round in 0..200 {
        let id = app.list().create(format!("toggled {round}")).await.unwrap().unwrap();
        app.settle().await.unwrap();

        app.item(id).set_completed(true).await.unwrap();
        tokio::task::yield_now().await;
        app.item(id).remove_todo().await.unwrap();
    }
    app.settle().await.unwrap();

    assert!(app.todos().await.is_empty());
    assert!(gateway.stored().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unsettled_gestures_store_the_latest_state() {
    let gateway = RecordingGateway::new();
    let app = app_with(&gateway);

    for round in 0..50 {
        let kept = app.list().create(format!("kept {round}")).await.unwrap().unwrap();
        let gone = app.list().create(format!("gone {round}")).await.unwrap().unwrap();
        app.item(kept).toggle().await.unwrap();
        app.item(kept).begin_edit().await.unwrap();
        app.item(kept).commit_title(format!("renamed {round}")).await.unwrap();
        app.item(kept).toggle().await.unwrap();
        app.item(gone).set_completed(true).await.unwrap();
        if round % 2 == 0 {
            app.list().clear_completed().await.unwrap();
        } else {
            app.item(gone).remove_todo().await.unwrap();
        }
    }
    app.settle().await.unwrap();

    assert_eq!(app.todos().await.len(), 50);
    assert_gateway_matches_list(&app, &gateway).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn writes_reach_the_gateway_in_gesture_order() {
    let gateway = RecordingGateway::new();
    let app = app_with(&gateway);

    let id = app.list().create("ordered").await.unwrap().unwrap();
    app.item(id).remove_todo().await.unwrap();
    app.settle().await.unwrap();

    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[0], GatewayCall::Save(item) if item.id == id));
    assert_eq!(calls[1], GatewayCall::Delete(id));
}

#[tokio::test]
async fn load_restores_stored_items_in_creation_order() {
    let clock = stepping_clock();
    let first = TodoItem::new(TodoId::new(), "first".to_string(), clock.now());
    let second = TodoItem::new(TodoId::new(), "second".to_string(), clock.now());
    let gateway = RecordingGateway::with_items(vec![second.clone(), first.clone()]);
    let app = app_with(&gateway);

    assert_eq!(app.load().await.unwrap(), 2);
    assert_eq!(app.todos().await, vec![first, second]);
    assert_eq!(gateway.calls(), vec![GatewayCall::FindAll]);
}

#[tokio::test]
async fn failed_writes_are_reported_without_rollback() {
    let gateway = RecordingGateway::new();
    gateway.fail_with(GatewayError::Unavailable("offline".to_string()));
    let app = app_with(&gateway);

    let id = app.list().create("kept locally").await.unwrap().unwrap();
    app.settle().await.unwrap();

    assert_eq!(app.todos().await.len(), 1);
    assert!(app.last_error().await.unwrap().contains("offline"));
    assert_eq!(gateway.saves().len(), 1);
    assert!(gateway.stored().is_empty());
    assert!(app.item(id).item().await.is_some());
}

#[tokio::test]
async fn failed_load_leaves_an_empty_list() {
    let gateway = RecordingGateway::new();
    gateway.fail_with(GatewayError::Io("disk gone".to_string()));
    let app = app_with(&gateway);

    assert_eq!(app.load().await.unwrap(), 0);
    assert!(app.last_error().await.unwrap().starts_with("find_all failed"));
}

#[tokio::test]
async fn fetch_reads_through_the_gateway() {
    let gateway = RecordingGateway::new();
    let (app, ids) = seeded(&gateway, &[("stored", false)]).await;

    let fetched = app.fetch(ids[0]).await.unwrap().unwrap();
    assert_eq!(fetched.title, "stored");
    assert_eq!(app.fetch(TodoId::new()).await.unwrap(), None);
}

#[tokio::test]
async fn json_file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.json");

    {
        let app = TodoApp::new(Arc::new(stepping_clock()), Arc::new(JsonFileGateway::new(&path)));
        let keep = app.list().create("keep").await.unwrap().unwrap();
        let gone = app.list().create("gone").await.unwrap().unwrap();
        app.settle().await.unwrap();

        app.item(keep).set_completed(true).await.unwrap();
        app.item(gone).remove_todo().await.unwrap();
        app.shutdown().await.unwrap();
    }

    let app = TodoApp::new(Arc::new(stepping_clock()), Arc::new(JsonFileGateway::new(&path)));
    assert_eq!(app.load().await.unwrap(), 1);

    let todos = app.todos().await;
    assert_eq!(todos[0].title, "keep");
    assert!(todos[0].is_completed);
}

#[tokio::test]
async fn shutdown_rejects_new_gestures() {
    let gateway = RecordingGateway::new();
    let app = app_with(&gateway);
    app.shutdown().await.unwrap();

    let error = app.list().create("too late").await.unwrap_err();
    assert_eq!(error, AppError::Store(StoreError::ShutdownInProgress));
}
