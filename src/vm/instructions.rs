//! Event instructions

use crate::runtime::value::Value;
use crate::vm::opcode::EventCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A program: an immutable, shareable instruction list
pub type Program = Arc<[Instruction]>;

/// One event command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Content code
    pub code: i32,
    /// Block nesting depth
    #[serde(default)]
    pub indent: usize,
    /// Operands
    #[serde(default)]
    pub parameters: Vec<Value>,
}

impl Instruction {
    /// Create a new instruction
    pub fn new(
        code: EventCode,
        indent: usize,
        parameters: Vec<Value>,
    ) -> Self {
        Self {
            code: code as i32,
            indent,
            parameters,
        }
    }

    /// Known command code, if any
    pub fn event_code(&self) -> Option<EventCode> {
        EventCode::try_from(self.code).ok()
    }

    /// Whether this instruction carries the given code
    pub fn is(
        &self,
        code: EventCode,
    ) -> bool {
        self.code == code as i32
    }

    /// Operand at index, `Null` when missing
    pub fn param(
        &self,
        index: usize,
    ) -> &Value {
        static NULL: Value = Value::Null;
        self.parameters.get(index).unwrap_or(&NULL)
    }

    /// Integer operand
    pub fn int(
        &self,
        index: usize,
    ) -> i64 {
        self.param(index).as_int()
    }

    /// String operand
    pub fn str(
        &self,
        index: usize,
    ) -> &str {
        self.param(index).as_str()
    }

    /// Boolean operand
    pub fn flag(
        &self,
        index: usize,
    ) -> bool {
        self.param(index).as_bool()
    }

    /// Number of operands present
    pub fn param_count(&self) -> usize {
        self.parameters.len()
    }
}

/// Build a program from a list of instructions
pub fn program(instructions: Vec<Instruction>) -> Program {
    Arc::from(instructions)
}
