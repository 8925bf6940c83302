//! Static program checks and dumps

use eventvm::runtime::value::Value;
use eventvm::vm::{EventCode, Instruction};
use eventvm::{check_program, dump_program};

fn ins(
    code: i32,
    indent: usize,
    parameters: Vec<Value>,
) -> Instruction {
    Instruction {
        code,
        indent,
        parameters,
    }
}

#[test]
fn test_clean_program() {
    let program = vec![
        ins(EventCode::Loop as i32, 0, vec![]),
        ins(EventCode::BreakLoop as i32, 1, vec![]),
        ins(EventCode::End as i32, 1, vec![]),
        ins(EventCode::RepeatAbove as i32, 0, vec![]),
    ];
    let report = check_program(&program);
    assert!(report.is_clean(), "{:?}", report);
    assert_eq!(report.instructions, 4);
}

#[test]
fn test_unknown_codes_are_reported() {
    let program = vec![
        ins(356, 0, vec!["PluginCommand".into()]),
        ins(EventCode::Wait as i32, 0, vec![1.into()]),
        ins(9000, 0, vec![]),
    ];
    let report = check_program(&program);
    assert_eq!(report.unknown_codes, vec![(0, 356), (2, 9000)]);
    assert!(report.problems.is_empty());
}

#[test]
fn test_structure_problems() {
    let program = vec![
        ins(EventCode::Loop as i32, 0, vec![]),
        ins(EventCode::Wait as i32, 2, vec![1.into()]),
        ins(EventCode::RepeatAbove as i32, 0, vec![]),
        ins(EventCode::RepeatAbove as i32, 0, vec![]),
        ins(EventCode::Loop as i32, 0, vec![]),
    ];
    let report = check_program(&program);
    assert!(!report.is_clean());
    assert_eq!(report.problems.len(), 3, "{:?}", report.problems);
    assert!(report.problems[0].contains("indent jumps from 0 to 2"));
    assert!(report.problems[1].contains("Repeat Above without a Loop"));
    assert!(report.problems[2].contains("never repeated"));
}

#[test]
fn test_dump_program() {
    let program = vec![
        ins(EventCode::ConditionalBranch as i32, 0, vec![0.into(), 1.into(), 0.into()]),
        ins(EventCode::ShowText as i32, 1, vec!["Actor1".into(), 2.into()]),
        ins(777, 1, vec![]),
    ];
    let dump = dump_program(&program);
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines[0], "[   0] ConditionalBranch (111) [0, 1, 0]");
    assert_eq!(lines[1], "[   1]   ShowText (101) [Actor1, 2]");
    assert_eq!(lines[2], "[   2]   Unknown(777) (777) []");
}
