//! Call frames
//!
//! One frame per level of the call stack. The root frame runs the program the
//! interpreter was set up with; each Common Event call pushes another. Frames
//! are plain data so an in-flight interpreter can be saved.

use crate::runtime::collaborators::MessageInput;
use crate::runtime::world::World;
use crate::vm::branch::{BranchOutcome, BranchState};
use crate::vm::instructions::{Instruction, Program};
use crate::vm::opcode::EventCode;
use crate::vm::wait::WaitCoordinator;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a deferred result from a collaborator should be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingInput {
    /// Choice index into the branch store
    Choice { indent: usize },
    /// Number input into a variable
    Number { variable_id: i64 },
    /// Selected item into a variable
    Item { variable_id: i64 },
    /// Battle result into the branch store
    Battle { indent: usize },
}

/// Call frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Program being executed
    pub program: Program,
    /// Index of the current instruction
    pub cursor: usize,
    /// Indent of the instruction being executed
    pub indent: usize,
    /// Event that owns this program, 0 for none
    pub event_id: u32,
    /// Map the frame was started on
    pub map_id: u32,
    /// Call depth, 0 for the root frame
    pub depth: usize,
    pub branch: BranchState,
    pub wait: WaitCoordinator,
    pub pending: Option<PendingInput>,
}

impl Frame {
    /// Create a new frame
    pub fn new(
        program: Program,
        event_id: u32,
        map_id: u32,
        depth: usize,
    ) -> Self {
        Self {
            program,
            cursor: 0,
            indent: 0,
            event_id,
            map_id,
            depth,
            branch: BranchState::new(),
            wait: WaitCoordinator::new(),
            pending: None,
        }
    }

    /// Instruction under the cursor
    pub fn current(&self) -> Option<&Instruction> {
        self.program.get(self.cursor)
    }

    /// Code of the instruction after the cursor, 0 past the end
    pub fn next_code(&self) -> i32 {
        self.program
            .get(self.cursor + 1)
            .map(|ins| ins.code)
            .unwrap_or(0)
    }

    /// Whether the cursor ran past the end of the program
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.program.len()
    }

    /// Advance past the block nested under the current instruction.
    /// Leaves the cursor on the last nested instruction, so the usual
    /// post-dispatch increment lands on the next sibling.
    pub fn skip_branch(&mut self) {
        while let Some(next) = self.program.get(self.cursor + 1) {
            if next.indent > self.indent {
                self.cursor += 1;
            } else {
                break;
            }
        }
    }

    /// Reposition the cursor, invalidating every branch outcome whose block
    /// boundary lies between the old and new position
    pub fn jump_to(
        &mut self,
        index: usize,
    ) {
        let last = self.program.len().saturating_sub(1);
        let start = index.min(self.cursor).min(last);
        let end = index.max(self.cursor).min(last);
        let mut indent = self.indent;
        for ins in self.program.iter().take(end + 1).skip(start) {
            if ins.indent != indent {
                self.branch.clear(indent);
                indent = ins.indent;
            }
        }
        self.cursor = index;
    }

    /// Index of the first Label instruction named `name`
    pub fn find_label(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.program
            .iter()
            .position(|ins| ins.is(EventCode::Label) && ins.str(0) == name)
    }

    /// Walk back to the Loop this Repeat Above closes.
    /// Nested loops are matched by pairing Loop / Repeat Above instructions.
    pub fn rewind_to_loop(&mut self) {
        let mut depth = 0usize;
        let mut i = self.cursor;
        while i > 0 {
            i -= 1;
            let ins = &self.program[i];
            if ins.is(EventCode::RepeatAbove) {
                depth += 1;
            } else if ins.is(EventCode::Loop) {
                if depth == 0 {
                    self.cursor = i;
                    return;
                }
                depth -= 1;
            }
        }
    }

    /// Scan forward to the Repeat Above closing the innermost enclosing loop
    pub fn break_loop(&mut self) {
        let mut depth = 0usize;
        while self.cursor + 1 < self.program.len() {
            self.cursor += 1;
            let ins = &self.program[self.cursor];
            if ins.is(EventCode::Loop) {
                depth += 1;
            }
            if ins.is(EventCode::RepeatAbove) {
                if depth > 0 {
                    depth -= 1;
                } else {
                    break;
                }
            }
        }
    }

    /// Pull a deferred result from its collaborator, if it has arrived
    pub fn resolve_pending(
        &mut self,
        world: &mut World<'_>,
    ) {
        let Some(pending) = self.pending else {
            return;
        };
        match pending {
            PendingInput::Battle { indent } => {
                if let Some(result) = world.battle.take_result() {
                    debug!("battle result {:?} at indent {}", result, indent);
                    self.branch.set(indent, BranchOutcome::Int(result as i64));
                    self.pending = None;
                }
            }
            _ => {
                let Some(input) = world.message.take_input() else {
                    return;
                };
                match (pending, input) {
                    (PendingInput::Choice { indent }, MessageInput::Choice(n)) => {
                        self.branch.set(indent, BranchOutcome::Int(n));
                    }
                    (PendingInput::Number { variable_id }, MessageInput::Number(n))
                    | (PendingInput::Item { variable_id }, MessageInput::Item(n)) => {
                        world.state.variables.set_value(variable_id, n.into());
                    }
                    (expected, got) => {
                        debug!("discarding input {:?} while expecting {:?}", got, expected);
                    }
                }
                self.pending = None;
            }
        }
    }
}
