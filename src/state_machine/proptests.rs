//! Property tests for the conversation transition function

use super::effect::Effect;
use super::event::{Command, Event};
use super::state::{ConvState, TaskDraft};
use super::transition::transition;
use crate::db::TaskRef;
use proptest::prelude::*;

fn arb_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::Idle),
        Just(ConvState::AwaitingTaskName),
        "[a-zA-Z0-9 ]{1,40}".prop_map(|name| ConvState::AwaitingPomoCount {
            draft: TaskDraft { name }
        }),
        Just(ConvState::AwaitingTaskSelection),
        (1i64..10_000).prop_map(|id| ConvState::AwaitingDurationSelection { task: TaskRef(id) }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        ".{0,60}".prop_map(|body| Event::Text { body }),
        ".{0,30}".prop_map(|value| Event::Selection { value }),
    ]
}

proptest! {
    /// The transition function is total: no (state, event) pair panics.
    #[test]
    fn transition_is_total(state in arb_state(), event in arb_event()) {
        let _ = transition(&state, event);
    }

    /// Every transition answers the user with at least one effect.
    #[test]
    fn transition_always_responds(state in arb_state(), event in arb_event()) {
        let result = transition(&state, event);
        prop_assert!(!result.effects.is_empty());
    }

    /// The timer vocabulary never disturbs the conversation state.
    #[test]
    fn timer_vocabulary_preserves_state(state in arb_state(), cmd_ix in 0usize..3) {
        let cmd = [Command::Pause, Command::Resume, Command::Remaining][cmd_ix];
        let result = transition(&state, Event::Selection { value: cmd.value().to_string() });
        prop_assert_eq!(result.new_state, state);
    }

    /// Non-numeric text at the count prompt never consumes the draft.
    #[test]
    fn junk_count_keeps_draft(name in "[a-zA-Z ]{1,30}", junk in "[a-zA-Z ]{1,20}") {
        let state = ConvState::AwaitingPomoCount { draft: TaskDraft { name } };
        let result = transition(&state, Event::Text { body: junk });
        prop_assert_eq!(result.new_state, state);
        let created = result.effects.iter().any(|e| matches!(e, Effect::CreateTask { .. }));
        prop_assert!(!created);
    }

    /// A task is only ever created from the count prompt, with the draft's
    /// name and a positive count.
    #[test]
    fn create_task_requires_positive_count(state in arb_state(), count in 0u32..50) {
        let result = transition(&state, Event::Text { body: count.to_string() });
        for effect in &result.effects {
            if let Effect::CreateTask { name, required } = effect {
                prop_assert!(*required > 0);
                match &state {
                    ConvState::AwaitingPomoCount { draft } => prop_assert_eq!(name, &draft.name),
                    other => prop_assert!(false, "CreateTask out of {other:?}"),
                }
            }
        }
    }

    /// Timers only start from the duration prompt, against the selected task.
    #[test]
    fn start_timer_requires_selected_task(state in arb_state(), minutes in 1u64..120) {
        let result = transition(&state, Event::Selection { value: minutes.to_string() });
        for effect in &result.effects {
            if let Effect::StartTimer { task, duration } = effect {
                prop_assert_eq!(*duration, std::time::Duration::from_secs(minutes * 60));
                match &state {
                    ConvState::AwaitingDurationSelection { task: selected } => {
                        prop_assert_eq!(task, selected);
                    }
                    other => prop_assert!(false, "StartTimer out of {other:?}"),
                }
                // A started timer always detaches the conversation.
                prop_assert_eq!(&result.new_state, &ConvState::Idle);
            }
        }
    }
}
