//! Frame navigation: block skipping, jumps, loops and the branch store

use super::{bare, ins};
use crate::vm::branch::{BranchOutcome, BranchState};
use crate::vm::frames::Frame;
use crate::vm::instructions::{program, Instruction};
use crate::vm::opcode::EventCode;
use proptest::prelude::*;

fn frame_with_indents(indents: &[usize]) -> Frame {
    let list: Vec<Instruction> = indents
        .iter()
        .map(|i| bare(EventCode::Comment, *i))
        .collect();
    Frame::new(program(list), 0, 1, 0)
}

#[cfg(test)]
mod skip_branch_tests {
    use super::*;

    #[test]
    fn test_skips_nested_block() {
        let mut frame = frame_with_indents(&[0, 1, 2, 1, 0, 1]);
        frame.skip_branch();
        assert_eq!(frame.cursor, 3);
        assert_eq!(frame.program[frame.cursor + 1].indent, 0);
    }

    #[test]
    fn test_never_skips_sibling() {
        let mut frame = frame_with_indents(&[1, 1, 2]);
        frame.indent = 1;
        frame.skip_branch();
        assert_eq!(frame.cursor, 0);
    }

    #[test]
    fn test_stops_at_end_of_program() {
        let mut frame = frame_with_indents(&[0, 1, 1]);
        frame.skip_branch();
        assert_eq!(frame.cursor, 2);
    }

    proptest! {
        #[test]
        fn prop_skip_lands_before_first_shallower(
            indents in prop::collection::vec(0usize..5, 1..40),
            start in 0usize..40,
        ) {
            let start = start % indents.len();
            let mut frame = frame_with_indents(&indents);
            frame.cursor = start;
            frame.indent = indents[start];
            frame.skip_branch();

            for skipped in &indents[start + 1..=frame.cursor] {
                prop_assert!(*skipped > indents[start]);
            }
            if let Some(next) = indents.get(frame.cursor + 1) {
                prop_assert!(*next <= indents[start]);
            }
        }
    }
}

#[cfg(test)]
mod jump_tests {
    use super::*;

    #[test]
    fn test_jump_clears_crossed_indents_only() {
        let mut frame = frame_with_indents(&[0, 1, 2, 2, 1, 0, 0]);
        for indent in 0..4 {
            frame.branch.set(indent, BranchOutcome::Bool(true));
        }
        frame.cursor = 4;
        frame.indent = 1;
        frame.jump_to(2);

        assert_eq!(frame.cursor, 2);
        assert_eq!(frame.branch.get(1), None);
        assert_eq!(frame.branch.get(2), None);
        assert_eq!(frame.branch.get(0), Some(BranchOutcome::Bool(true)));
        assert_eq!(frame.branch.get(3), Some(BranchOutcome::Bool(true)));
    }

    #[test]
    fn test_jump_within_same_indent_keeps_outcomes() {
        let mut frame = frame_with_indents(&[0, 0, 0, 0]);
        frame.branch.set(0, BranchOutcome::Int(2));
        frame.cursor = 3;
        frame.jump_to(0);
        assert_eq!(frame.branch.int(0), Some(2));
    }

    #[test]
    fn test_find_label_first_match_wins() {
        let label = |name: &str, indent| ins(EventCode::Label, indent, vec![name.into()]);
        let frame = Frame::new(
            program(vec![
                bare(EventCode::Comment, 0),
                label("top", 1),
                label("top", 0),
                label("end", 0),
            ]),
            0,
            1,
            0,
        );
        assert_eq!(frame.find_label("top"), Some(1));
        assert_eq!(frame.find_label("end"), Some(3));
        assert_eq!(frame.find_label("missing"), None);
    }
}

#[cfg(test)]
mod loop_tests {
    use super::*;

    fn nested_loops() -> Frame {
        // 0 Loop
        // 1   Loop
        // 2     Break Loop
        // 3   Repeat Above
        // 4   Comment
        // 5 Repeat Above
        Frame::new(
            program(vec![
                bare(EventCode::Loop, 0),
                bare(EventCode::Loop, 1),
                bare(EventCode::BreakLoop, 2),
                bare(EventCode::RepeatAbove, 1),
                bare(EventCode::Comment, 1),
                bare(EventCode::RepeatAbove, 0),
            ]),
            0,
            1,
            0,
        )
    }

    #[test]
    fn test_break_exits_innermost_loop() {
        let mut frame = nested_loops();
        frame.cursor = 2;
        frame.break_loop();
        assert_eq!(frame.cursor, 3);
    }

    #[test]
    fn test_break_skips_nested_loop() {
        let mut frame = Frame::new(
            program(vec![
                bare(EventCode::Loop, 0),
                bare(EventCode::BreakLoop, 1),
                bare(EventCode::Loop, 1),
                bare(EventCode::RepeatAbove, 1),
                bare(EventCode::RepeatAbove, 0),
            ]),
            0,
            1,
            0,
        );
        frame.cursor = 1;
        frame.break_loop();
        assert_eq!(frame.cursor, 4);
    }

    #[test]
    fn test_repeat_returns_to_matching_loop() {
        let mut frame = nested_loops();
        frame.cursor = 5;
        frame.rewind_to_loop();
        assert_eq!(frame.cursor, 0);

        frame.cursor = 3;
        frame.rewind_to_loop();
        assert_eq!(frame.cursor, 1);
    }
}

#[cfg(test)]
mod branch_state_tests {
    use super::*;

    #[test]
    fn test_unset_slots_are_empty() {
        let state = BranchState::new();
        assert_eq!(state.get(5), None);
        assert!(!state.is_false(0));
    }

    #[test]
    fn test_else_only_on_exact_false() {
        let mut state = BranchState::new();
        state.set(2, BranchOutcome::Bool(false));
        assert!(state.is_false(2));
        state.set(2, BranchOutcome::Int(0));
        assert!(!state.is_false(2));
        state.clear(2);
        assert!(!state.is_false(2));
    }

    #[test]
    fn test_int_outcome() {
        let mut state = BranchState::new();
        state.set(1, BranchOutcome::Int(-2));
        assert_eq!(state.int(1), Some(-2));
        assert_eq!(state.int(0), None);
    }
}
