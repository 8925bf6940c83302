//! Event interpreter
//!
//! Flat, indent-structured instruction lists executed one host frame at a
//! time over an explicit call stack.

pub use dispatch::{CommandContext, CommandTable, Handler};
pub use errors::{InterpreterError, InterpreterResult};
pub use executor::Interpreter;
pub use frames::{Frame, PendingInput};
pub use instructions::{program, Instruction, Program};
pub use opcode::{code_name, EventCode};
pub use wait::{WaitCoordinator, WaitMode};

pub mod branch;
mod commands;
pub mod dispatch;
pub mod errors;
pub mod executor;
pub mod frames;
pub mod instructions;
pub mod opcode;
pub mod prefetch;
pub mod wait;
pub mod watchdog;

#[cfg(test)]
mod tests;
