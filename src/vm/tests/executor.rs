//! Interpreter loop: scenarios, suspension, call depth, watchdog

use super::{add_var, bare, if_var, ins, run, set_var, text};
use crate::runtime::collaborators::CharacterId;
use crate::runtime::database::{CommonEvent, Database};
use crate::runtime::value::Value;
use crate::runtime::headless::HeadlessHost;
use crate::util::config::InterpreterConfig;
use crate::vm::errors::InterpreterError;
use crate::vm::executor::Interpreter;
use crate::vm::instructions::{program, Instruction};
use crate::vm::opcode::EventCode;
use crate::vm::wait::WaitMode;

fn call_common(
    indent: usize,
    id: i64,
) -> Instruction {
    ins(EventCode::CommonEvent, indent, vec![id.into()])
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_if_else_runs_exactly_one_block() {
        let mut host = HeadlessHost::default();
        let mut list = vec![set_var(0, 1, 5), if_var(0, 1, 0, 5)];
        list.extend(text(1, "yes"));
        list.push(bare(EventCode::Else, 0));
        list.extend(text(1, "no"));
        list.push(bare(EventCode::BranchEnd, 0));
        run(&mut host, list);
        assert_eq!(host.message.pages, vec!["yes".to_string()]);
    }

    #[test]
    fn test_else_block_when_condition_false() {
        let mut host = HeadlessHost::default();
        let mut list = vec![set_var(0, 1, 4), if_var(0, 1, 0, 5)];
        list.extend(text(1, "yes"));
        list.push(bare(EventCode::Else, 0));
        list.extend(text(1, "no"));
        list.push(bare(EventCode::BranchEnd, 0));
        run(&mut host, list);
        assert_eq!(host.message.pages, vec!["no".to_string()]);
    }

    #[test]
    fn test_loop_breaks_after_three_passes() {
        let mut host = HeadlessHost::default();
        run(
            &mut host,
            vec![
                bare(EventCode::Loop, 0),
                add_var(1, 2, 1),
                if_var(1, 2, 1, 3),
                bare(EventCode::BreakLoop, 2),
                bare(EventCode::RepeatAbove, 1),
            ],
        );
        assert_eq!(host.state.variables.int(2), 3);
    }

    #[test]
    fn test_inner_break_resumes_outer_loop() {
        let mut host = HeadlessHost::default();
        run(
            &mut host,
            vec![
                bare(EventCode::Loop, 0),
                add_var(1, 1, 1),
                bare(EventCode::Loop, 1),
                add_var(2, 2, 1),
                bare(EventCode::BreakLoop, 2),
                bare(EventCode::RepeatAbove, 1),
                if_var(1, 1, 1, 2),
                bare(EventCode::BreakLoop, 2),
                bare(EventCode::BranchEnd, 1),
                bare(EventCode::RepeatAbove, 0),
            ],
        );
        assert_eq!(host.state.variables.int(1), 2);
        assert_eq!(host.state.variables.int(2), 2);
    }

    #[test]
    fn test_exit_stops_program() {
        let mut host = HeadlessHost::default();
        run(
            &mut host,
            vec![
                set_var(0, 1, 1),
                bare(EventCode::ExitEventProcessing, 0),
                set_var(0, 1, 2),
            ],
        );
        assert_eq!(host.state.variables.int(1), 1);
    }

    #[test]
    fn test_jump_to_label_skips_ahead() {
        let mut host = HeadlessHost::default();
        run(
            &mut host,
            vec![
                ins(EventCode::JumpToLabel, 0, vec!["end".into()]),
                set_var(0, 1, 99),
                ins(EventCode::Label, 0, vec!["end".into()]),
                add_var(0, 2, 1),
            ],
        );
        assert_eq!(host.state.variables.int(1), 0);
        assert_eq!(host.state.variables.int(2), 1);
    }

    #[test]
    fn test_unknown_codes_are_skipped() {
        let mut host = HeadlessHost::default();
        run(
            &mut host,
            vec![
                Instruction {
                    code: 356,
                    indent: 0,
                    parameters: vec!["PluginCommand arg".into()],
                },
                Instruction {
                    code: 9999,
                    indent: 0,
                    parameters: Vec::new(),
                },
                set_var(0, 3, 7),
            ],
        );
        assert_eq!(host.state.variables.int(3), 7);
    }
}

#[cfg(test)]
mod suspension_tests {
    use super::*;

    #[test]
    fn test_busy_message_blocks_dispatch() {
        let mut host = HeadlessHost::default();
        let mut list = text(0, "hello");
        list.push(set_var(0, 1, 1));
        let mut interpreter = Interpreter::default();
        interpreter.setup(program(list), 0, 1);

        interpreter.update(&mut host.world()).unwrap();
        assert_eq!(interpreter.frames()[0].wait.mode(), WaitMode::Message);
        assert_eq!(host.state.variables.int(1), 0);

        host.message.force_busy = true;
        host.tick();
        for _ in 0..3 {
            let cursor = interpreter.cursor();
            interpreter.update(&mut host.world()).unwrap();
            assert_eq!(interpreter.cursor(), cursor);
            host.tick();
        }
        assert_eq!(host.state.variables.int(1), 0);

        host.message.force_busy = false;
        interpreter.update(&mut host.world()).unwrap();
        assert_eq!(host.state.variables.int(1), 1);
        assert!(!interpreter.is_running());
    }

    #[test]
    fn test_show_text_waits_for_free_window() {
        let mut host = HeadlessHost::default();
        host.message.force_busy = true;
        let mut interpreter = Interpreter::default();
        interpreter.setup(program(text(0, "later")), 0, 1);
        interpreter.update(&mut host.world()).unwrap();
        assert_eq!(interpreter.cursor(), Some(0));
        assert!(host.message.pages.is_empty());
    }

    #[test]
    fn test_wait_counts_down_frames() {
        let mut host = HeadlessHost::default();
        let mut interpreter = Interpreter::default();
        interpreter.setup(
            program(vec![
                ins(EventCode::Wait, 0, vec![3.into()]),
                set_var(0, 1, 1),
            ]),
            0,
            1,
        );
        // The countdown starts in the frame that ran Wait
        for _ in 0..3 {
            interpreter.update(&mut host.world()).unwrap();
            host.tick();
            assert_eq!(host.state.variables.int(1), 0);
        }
        interpreter.update(&mut host.world()).unwrap();
        assert_eq!(host.state.variables.int(1), 1);
    }

    #[test]
    fn test_scene_change_suspends() {
        let mut host = HeadlessHost::default();
        let mut interpreter = Interpreter::default();
        interpreter.setup(
            program(vec![bare(EventCode::OpenMenuScreen, 0), set_var(0, 1, 1)]),
            0,
            1,
        );
        interpreter.update(&mut host.world()).unwrap();
        assert_eq!(host.state.variables.int(1), 0);
        host.tick();
        interpreter.update(&mut host.world()).unwrap();
        assert_eq!(host.state.variables.int(1), 1);
    }

    fn on_map(host: &mut HeadlessHost) {
        host.map.events.insert(3);
    }

    fn in_battle(host: &mut HeadlessHost) {
        host.battle.in_battle = true;
    }

    #[test]
    fn test_pending_operations_hold_the_cursor() {
        let route: Value = serde_json::from_str(r#"{"list": [{"code": 0}], "wait": true}"#).unwrap();
        let event = CharacterId::Event(3);
        let cases: Vec<(Instruction, fn(&mut HeadlessHost), WaitMode)> = vec![
            (
                ins(
                    EventCode::ScrollMap,
                    0,
                    vec![2.into(), 3.into(), 4.into(), true.into()],
                ),
                on_map,
                WaitMode::Scroll,
            ),
            (
                ins(EventCode::SetMovementRoute, 0, vec![0.into(), route]),
                on_map,
                WaitMode::Route(event),
            ),
            (
                ins(
                    EventCode::ShowAnimation,
                    0,
                    vec![0.into(), 1.into(), true.into()],
                ),
                on_map,
                WaitMode::Animation(event),
            ),
            (
                ins(
                    EventCode::ShowBalloonIcon,
                    0,
                    vec![0.into(), 1.into(), true.into()],
                ),
                on_map,
                WaitMode::Balloon(event),
            ),
            (bare(EventCode::GatherFollowers, 0), on_map, WaitMode::Gather),
            (
                ins(
                    EventCode::ForceAction,
                    0,
                    vec![1.into(), 1.into(), 1.into(), (-1).into()],
                ),
                in_battle,
                WaitMode::Action,
            ),
            (
                ins(EventCode::PlayMovie, 0, vec!["Opening".into()]),
                on_map,
                WaitMode::Video,
            ),
        ];

        for (command, prepare, mode) in cases {
            let name = format!("{:?}", command.event_code());
            let mut host = HeadlessHost::default();
            prepare(&mut host);
            host.hold = true;
            let mut interpreter = Interpreter::default();
            interpreter.setup(program(vec![command, set_var(0, 1, 1)]), 3, 1);

            interpreter.update(&mut host.world()).unwrap();
            assert_eq!(interpreter.frames()[0].wait.mode(), mode, "{}", name);
            for _ in 0..3 {
                host.tick();
                interpreter.update(&mut host.world()).unwrap();
                assert_eq!(interpreter.cursor(), Some(1), "{}", name);
                assert_eq!(host.state.variables.int(1), 0, "{}", name);
            }

            host.hold = false;
            host.tick();
            interpreter.update(&mut host.world()).unwrap();
            assert_eq!(host.state.variables.int(1), 1, "{}", name);
            assert!(!interpreter.is_running(), "{}", name);
        }
    }
}

#[cfg(test)]
mod call_depth_tests {
    use super::*;

    #[test]
    fn test_self_calling_event_overflows_at_limit() {
        let mut database = Database::new();
        database.add_common_event(CommonEvent::new(
            1,
            "recurse",
            vec![add_var(0, 1, 1), call_common(0, 1)],
        ));
        let mut host = HeadlessHost::new(database);
        let mut interpreter = Interpreter::default();
        assert!(interpreter.setup_common_event(&host.database, 1, 1));

        let err = interpreter.update(&mut host.world()).unwrap_err();
        assert_eq!(
            err,
            InterpreterError::CallDepthOverflow {
                depth: 100,
                limit: 100
            }
        );
        // Levels 0..=99 ran; level 100 never started
        assert_eq!(host.state.variables.int(1), 100);
        assert!(!interpreter.is_running());
    }

    #[test]
    fn test_chain_of_hundred_is_accepted() {
        let mut database = Database::new();
        for id in 1..=100 {
            let mut list = vec![add_var(0, 1, 1)];
            if id < 100 {
                list.push(call_common(0, id + 1));
            }
            database.add_common_event(CommonEvent::new(id as u32, "", list));
        }
        let mut host = HeadlessHost::new(database);
        let mut interpreter = Interpreter::default();
        interpreter.setup_common_event(&host.database, 1, 1);
        host.run(&mut interpreter, 10).unwrap();
        assert_eq!(host.state.variables.int(1), 100);
        assert!(!interpreter.is_running());
    }

    #[test]
    fn test_configured_depth_limit() {
        let mut database = Database::new();
        database.add_common_event(CommonEvent::new(1, "", vec![call_common(0, 1)]));
        let mut host = HeadlessHost::new(database);
        let config = InterpreterConfig {
            max_call_depth: 3,
            ..Default::default()
        };
        let mut interpreter = Interpreter::new(config);
        interpreter.setup(program(vec![call_common(0, 1)]), 0, 1);
        let err = interpreter.update(&mut host.world()).unwrap_err();
        assert!(matches!(
            err,
            InterpreterError::CallDepthOverflow { depth: 3, .. }
        ));
    }

    #[test]
    fn test_parent_resumes_after_child() {
        let mut database = Database::new();
        database.add_common_event(CommonEvent::new(1, "", text(0, "child")));
        let mut host = HeadlessHost::new(database);
        let mut list = vec![call_common(0, 1)];
        list.extend(text(0, "parent"));
        run(&mut host, list);
        assert_eq!(host.message.pages, vec!["child", "parent"]);
    }

    #[test]
    fn test_missing_common_event_is_noop() {
        let mut host = HeadlessHost::default();
        run(&mut host, vec![call_common(0, 42), set_var(0, 1, 1)]);
        assert_eq!(host.state.variables.int(1), 1);
    }
}

#[cfg(test)]
mod watchdog_tests {
    use super::*;

    #[test]
    fn test_yields_after_freeze_limit() {
        let mut host = HeadlessHost::default();
        let list: Vec<Instruction> = (0..150_000).map(|_| add_var(0, 1, 1)).collect();
        let mut interpreter = Interpreter::default();
        interpreter.setup(program(list), 0, 1);

        interpreter.update(&mut host.world()).unwrap();
        assert_eq!(interpreter.cursor(), Some(100_000));
        assert_eq!(host.state.variables.int(1), 100_000);

        host.tick();
        interpreter.update(&mut host.world()).unwrap();
        assert_eq!(host.state.variables.int(1), 150_000);
        assert!(!interpreter.is_running());
    }

    #[test]
    fn test_same_frame_allows_single_step() {
        let mut host = HeadlessHost::default();
        let list: Vec<Instruction> = (0..10).map(|_| add_var(0, 1, 1)).collect();
        let config = InterpreterConfig {
            freeze_limit: 4,
            ..Default::default()
        };
        let mut interpreter = Interpreter::new(config);
        interpreter.setup(program(list), 0, 1);
        interpreter.update(&mut host.world()).unwrap();
        interpreter.update(&mut host.world()).unwrap();
        assert_eq!(host.state.variables.int(1), 5);
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;

    #[test]
    fn test_interpreter_survives_serde() {
        let mut host = HeadlessHost::default();
        let mut list = vec![if_var(0, 1, 0, 0)];
        list.extend(text(1, "a"));
        list.extend(text(1, "b"));
        let mut interpreter = Interpreter::default();
        interpreter.setup(program(list), 3, 1);
        interpreter.update(&mut host.world()).unwrap();

        let json = serde_json::to_string(&interpreter).unwrap();
        let mut restored: Interpreter = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.cursor(), interpreter.cursor());
        assert_eq!(restored.event_id(), 3);

        host.run(&mut restored, 100).unwrap();
        assert_eq!(host.message.pages, vec!["a", "b"]);
    }

    #[test]
    fn test_clear_abandons_execution() {
        let mut interpreter = Interpreter::default();
        interpreter.setup(program(text(0, "x")), 0, 1);
        assert!(interpreter.is_running());
        assert_eq!(interpreter.depth(), 1);
        interpreter.clear();
        assert!(!interpreter.is_running());
        assert_eq!(interpreter.cursor(), None);
    }
}
