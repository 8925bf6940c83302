//! Interpreter errors

use thiserror::Error;

/// Interpreter result
pub type InterpreterResult<T> = Result<T, InterpreterError>;

/// Errors that escape `Interpreter::update`.
///
/// Everything else a command can get wrong (missing ids, bad scripts,
/// division by zero) is recovered inside the command itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpreterError {
    #[error("Common event calls exceeded the limit: depth {depth} (limit {limit})")]
    CallDepthOverflow {
        /// Depth the rejected child would have had
        depth: usize,
        /// Configured maximum
        limit: usize,
    },
}
