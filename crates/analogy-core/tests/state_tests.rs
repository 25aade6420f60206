use analogy_core::{allowed_transitions, is_allowed, validate_transition, PipelineError, PipelineState, RunTrace};
use proptest::prelude::*;

#[test]
fn test_happy_path_is_legal() {
    let mut trace = RunTrace::new();
    for state in [
        PipelineState::Aligning,
        PipelineState::OntologyCheck,
        PipelineState::Validating,
        PipelineState::Accepted,
        PipelineState::Synthesizing,
        PipelineState::Done,
    ] {
        trace.advance(state).unwrap();
    }
    assert!(trace.current().is_terminal());
}

#[test]
fn test_refinement_cycle() {
    assert!(validate_transition(PipelineState::Validating, PipelineState::Refining).is_ok());
    assert!(validate_transition(PipelineState::Refining, PipelineState::Aligning).is_ok());

    // Refinement never skips the ontology gate or the validator
    assert!(validate_transition(PipelineState::Refining, PipelineState::Validating).is_err());
    assert!(validate_transition(PipelineState::Aligning, PipelineState::Validating).is_err());
    assert!(validate_transition(PipelineState::Refining, PipelineState::Synthesizing).is_err());
}

#[test]
fn test_terminal_states_are_final() {
    for state in [PipelineState::Done, PipelineState::Failed] {
        assert!(allowed_transitions(state).is_empty());
        assert_eq!(
            validate_transition(state, PipelineState::Aligning),
            Err(PipelineError::IllegalTransition {
                from: state,
                to: PipelineState::Aligning
            })
        );
    }
}

#[test]
fn test_failed_reachable_from_every_live_state() {
    for state in PipelineState::ALL.into_iter().filter(|s| !s.is_terminal()) {
        assert!(is_allowed(state, PipelineState::Failed), "{state} cannot fail");
    }
}

proptest! {
    #[test]
    fn prop_validate_agrees_with_allowed(
        from in prop::sample::select(PipelineState::ALL.to_vec()),
        to in prop::sample::select(PipelineState::ALL.to_vec()),
    ) {
        let res = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }

    #[test]
    fn prop_trace_only_records_legal_steps(
        steps in prop::collection::vec(prop::sample::select(PipelineState::ALL.to_vec()), 0..20),
    ) {
        let mut trace = RunTrace::new();
        for to in steps {
            let before = trace.current();
            let res = trace.advance(to);
            prop_assert_eq!(res.is_ok(), is_allowed(before, to));
        }
        for t in trace.transitions() {
            prop_assert!(is_allowed(t.from, t.to));
        }
    }
}
