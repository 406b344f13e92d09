//! Property tests for the list invariants
//!
//! Arbitrary gesture sequences are reduced directly; effects are dropped
//! unexecuted since only the local model is under test here.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use todomvc::mocks::RecordingGateway;
use todomvc::types::is_blank;
use todomvc::{Filter, TodoAction, TodoEnvironment, TodoId, TodoReducer, TodoState};
use todomvc_core::reducer::Reducer;
use todomvc_testing::stepping_clock;

#[derive(Clone, Debug)]
enum Gesture {
    Create(String),
    Toggle(usize),
    Delete(usize),
    Edit(usize, String),
    Accept(usize),
    ClearCompleted,
    SetAll(bool),
    Navigate(Filter),
}

fn title() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,8}",
        "[ ]{0,3}",
        "[ ]{0,2}[a-z]{1,4}[ ]{0,2}",
    ]
}

fn gesture() -> impl Strategy<Value = Gesture> {
    prop_oneof![
        3 => title().prop_map(Gesture::Create),
        3 => any::<usize>().prop_map(Gesture::Toggle),
        1 => any::<usize>().prop_map(Gesture::Delete),
        2 => (any::<usize>(), title()).prop_map(|(i, t)| Gesture::Edit(i, t)),
        1 => any::<usize>().prop_map(Gesture::Accept),
        1 => Just(Gesture::ClearCompleted),
        1 => any::<bool>().prop_map(Gesture::SetAll),
        1 => prop::sample::select(Filter::ALL.to_vec()).prop_map(Gesture::Navigate),
    ]
}

fn pick(state: &TodoState, index: usize) -> Option<TodoId> {
    let items = state.collection.items();
    (!items.is_empty()).then(|| items[index % items.len()].id)
}

fn actions_for(state: &TodoState, gesture: Gesture) -> Vec<TodoAction> {
    match gesture {
        Gesture::Create(title) => vec![
            TodoAction::SetNewTitle { title },
            TodoAction::CreateTodo { id: TodoId::new() },
        ],
        Gesture::Toggle(i) => pick(state, i)
            .map(|id| {
                let completed = !state.collection.get(&id).unwrap().is_completed;
                vec![TodoAction::SetCompleted { id, completed }]
            })
            .unwrap_or_default(),
        Gesture::Delete(i) => pick(state, i)
            .map(|id| vec![TodoAction::DeleteTodo { id }])
            .unwrap_or_default(),
        Gesture::Edit(i, title) => pick(state, i)
            .map(|id| {
                vec![
                    TodoAction::BeginEdit { id },
                    TodoAction::SetTitle { id, title },
                ]
            })
            .unwrap_or_default(),
        Gesture::Accept(i) => pick(state, i)
            .map(|id| vec![TodoAction::AcceptChanges { id }])
            .unwrap_or_default(),
        Gesture::ClearCompleted => vec![TodoAction::ClearCompleted],
        Gesture::SetAll(completed) => vec![TodoAction::SetAllCompleted { completed }],
        Gesture::Navigate(filter) => vec![TodoAction::SetFilter { filter }],
    }
}

fn check_invariants(state: &TodoState) {
    let collection = &state.collection;

    assert_eq!(
        collection.remaining_count() + collection.completed_count(),
        collection.len()
    );
    assert_eq!(collection.has_completed(), collection.completed_count() > 0);
    assert_eq!(
        collection.all_completed(),
        !collection.is_empty() && collection.remaining_count() == 0
    );

    let active: Vec<_> = collection.filtered(Filter::Active).collect();
    let completed: Vec<_> = collection.filtered(Filter::Completed).collect();
    assert!(active.iter().all(|item| !item.is_completed));
    assert!(completed.iter().all(|item| item.is_completed));
    assert_eq!(
        collection.filtered(Filter::All).count(),
        active.len() + completed.len()
    );

    let ids: HashSet<_> = collection.iter().map(|item| item.id).collect();
    assert_eq!(ids.len(), collection.len());
    assert!(collection.iter().all(|item| !is_blank(&item.title)));
    assert!(state.editing.iter().all(|id| ids.contains(id)));
    assert!(collection.dirty_ids().iter().all(|id| ids.contains(id)));
}

proptest! {
    #[test]
    fn invariants_hold_for_any_gesture_sequence(gestures in prop::collection::vec(gesture(), 0..40)) {
        let env = TodoEnvironment::new(
            Arc::new(stepping_clock()),
            Arc::new(RecordingGateway::new()),
        );
        let reducer = TodoReducer::new();
        let mut state = TodoState::new();

        for gesture in gestures {
            for action in actions_for(&state, gesture) {
                drop(reducer.reduce(&mut state, action, &env));
            }
            check_invariants(&state);
        }
    }

    #[test]
    fn creates_with_visible_titles_all_land(titles in prop::collection::vec("[a-z]{1,8}", 0..20)) {
        let env = TodoEnvironment::new(
            Arc::new(stepping_clock()),
            Arc::new(RecordingGateway::new()),
        );
        let reducer = TodoReducer::new();
        let mut state = TodoState::new();

        for title in &titles {
            for action in actions_for(&state, Gesture::Create(title.clone())) {
                drop(reducer.reduce(&mut state, action, &env));
            }
        }

        prop_assert_eq!(state.collection.len(), titles.len());
        prop_assert_eq!(state.collection.remaining_count(), titles.len());
        let stored: Vec<_> = state.collection.iter().map(|item| item.title.clone()).collect();
        prop_assert_eq!(stored, titles);
    }

    #[test]
    fn blank_creates_change_nothing(blank in "[ \t]{0,5}") {
        let env = TodoEnvironment::new(
            Arc::new(stepping_clock()),
            Arc::new(RecordingGateway::new()),
        );
        let mut state = TodoState::new();

        for action in actions_for(&state, Gesture::Create(blank.clone())) {
            let effects = TodoReducer.reduce(&mut state, action, &env);
            prop_assert!(effects.is_empty());
        }

        prop_assert!(state.collection.is_empty());
        prop_assert_eq!(state.new_title, blank);
    }
}
