//! Saving an interpreter mid-run and resuming it

use eventvm::runtime::headless::HeadlessHost;
use eventvm::runtime::value::Value;
use eventvm::vm::{program, EventCode, Instruction, Interpreter};

fn ins(
    code: EventCode,
    indent: usize,
    parameters: Vec<Value>,
) -> Instruction {
    Instruction::new(code, indent, parameters)
}

#[test]
fn test_resume_after_serialization() {
    let mut host = HeadlessHost::default();
    let mut interpreter = Interpreter::default();
    interpreter.setup(
        program(vec![
            ins(EventCode::ControlVariables, 0, vec![1.into(), 1.into(), 0.into(), 0.into(), 7.into()]),
            ins(EventCode::Wait, 0, vec![5.into()]),
            ins(EventCode::ControlVariables, 0, vec![2.into(), 2.into(), 0.into(), 0.into(), 9.into()]),
        ]),
        0,
        1,
    );
    interpreter.update(&mut host.world()).unwrap();
    host.tick();
    assert_eq!(host.state.variables.int(1), 7);

    let saved = serde_json::to_string(&interpreter).unwrap();
    drop(interpreter);
    let mut restored: Interpreter = serde_json::from_str(&saved).unwrap();
    assert_eq!(restored.cursor(), Some(2));

    let ticks = host.run(&mut restored, 100).unwrap();
    assert_eq!(host.state.variables.int(2), 9);
    // Four countdown frames remained when the interpreter was saved
    assert_eq!(ticks, 5);
}
