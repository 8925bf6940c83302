//! VM 模块测试
//!
//! Shared program builders live here; each file covers one area.

pub mod executor;
pub mod frames;
pub mod opcode;
pub mod prefetch;

use crate::runtime::headless::HeadlessHost;
use crate::runtime::value::Value;
use crate::vm::executor::Interpreter;
use crate::vm::instructions::{program, Instruction};
use crate::vm::opcode::EventCode;

pub(crate) fn ins(
    code: EventCode,
    indent: usize,
    parameters: Vec<Value>,
) -> Instruction {
    Instruction::new(code, indent, parameters)
}

/// Show Text with a single line
pub(crate) fn text(
    indent: usize,
    line: &str,
) -> Vec<Instruction> {
    vec![
        ins(
            EventCode::ShowText,
            indent,
            vec!["".into(), 0.into(), 0.into(), 2.into()],
        ),
        ins(EventCode::TextLine, indent, vec![line.into()]),
    ]
}

/// Control Variables: `v[id] = value`
pub(crate) fn set_var(
    indent: usize,
    id: i64,
    value: i64,
) -> Instruction {
    ins(
        EventCode::ControlVariables,
        indent,
        vec![id.into(), id.into(), 0.into(), 0.into(), value.into()],
    )
}

/// Control Variables: `v[id] += value`
pub(crate) fn add_var(
    indent: usize,
    id: i64,
    value: i64,
) -> Instruction {
    ins(
        EventCode::ControlVariables,
        indent,
        vec![id.into(), id.into(), 1.into(), 0.into(), value.into()],
    )
}

/// Conditional Branch on `v[id] <op> value`
pub(crate) fn if_var(
    indent: usize,
    id: i64,
    operator: i64,
    value: i64,
) -> Instruction {
    ins(
        EventCode::ConditionalBranch,
        indent,
        vec![1.into(), id.into(), 0.into(), value.into(), operator.into()],
    )
}

pub(crate) fn bare(
    code: EventCode,
    indent: usize,
) -> Instruction {
    ins(code, indent, Vec::new())
}

/// Set up `instructions` on map 1 and run them to completion on `host`
pub(crate) fn run(
    host: &mut HeadlessHost,
    instructions: Vec<Instruction>,
) -> Interpreter {
    let mut interpreter = Interpreter::default();
    interpreter.setup(program(instructions), 0, host.map.map_id);
    host.run(&mut interpreter, 1_000).unwrap();
    assert!(!interpreter.is_running(), "program did not finish");
    interpreter
}
