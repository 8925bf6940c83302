//! Static command dispatch
//!
//! The table maps content codes to handler functions and is built once, on
//! first use. Unknown codes resolve to a no-op handler.

use crate::runtime::collaborators::CharacterId;
use crate::runtime::world::World;
use crate::util::config::InterpreterConfig;
use crate::vm::commands;
use crate::vm::frames::Frame;
use crate::vm::instructions::{Instruction, Program};
use crate::vm::opcode::EventCode;
use crate::vm::wait::WaitMode;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::trace;

/// A command handler. Returns true when the cursor should advance; false
/// leaves the cursor where the handler put it and ends this tick.
pub type Handler = fn(&mut CommandContext<'_, '_>, &Instruction) -> bool;

/// Request to push a child frame, filled in by Common Event
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub program: Program,
    pub event_id: u32,
}

/// What a handler sees while it runs
pub struct CommandContext<'a, 'w> {
    pub frame: &'a mut Frame,
    pub world: &'a mut World<'w>,
    pub config: &'a InterpreterConfig,
    pub(crate) call: Option<CallRequest>,
}

impl<'a, 'w> CommandContext<'a, 'w> {
    pub fn new(
        frame: &'a mut Frame,
        world: &'a mut World<'w>,
        config: &'a InterpreterConfig,
    ) -> Self {
        Self {
            frame,
            world,
            config,
            call: None,
        }
    }

    /// Whether the player is still on the map the frame started on
    pub fn is_on_current_map(&self) -> bool {
        self.frame.map_id == self.world.map.map_id()
    }

    /// Resolve a character operand: -1 player, 0 this event, >0 event id.
    /// Characters are unavailable during battle and off the originating map.
    pub fn character(
        &self,
        param: i64,
    ) -> Option<CharacterId> {
        if self.world.in_battle() {
            return None;
        }
        if param < 0 {
            return Some(CharacterId::Player);
        }
        if !self.is_on_current_map() {
            return None;
        }
        let id = if param > 0 {
            u32::try_from(param).ok()?
        } else {
            self.frame.event_id
        };
        (id > 0 && self.world.map.has_event(id)).then_some(CharacterId::Event(id))
    }

    pub fn variable(
        &self,
        id: i64,
    ) -> i64 {
        self.world.state.variables.int(id)
    }

    /// Constant-or-variable operand, negated for "decrease" operations
    pub fn operate_value(
        &self,
        operation: i64,
        operand_type: i64,
        operand: i64,
    ) -> i64 {
        let value = if operand_type == 0 {
            operand
        } else {
            self.variable(operand)
        };
        if operation == 0 {
            value
        } else {
            value.saturating_neg()
        }
    }

    /// Actor ids addressed by a fixed-or-variable actor operand; 0 means the whole party
    pub fn actor_targets(
        &self,
        by_variable: i64,
        operand: i64,
    ) -> Vec<u32> {
        let id = if by_variable == 0 {
            operand
        } else {
            self.variable(operand)
        };
        if id == 0 {
            return self.world.state.party.members.clone();
        }
        match u32::try_from(id) {
            Ok(id) if self.world.state.actors.contains_key(&id) => vec![id],
            _ => Vec::new(),
        }
    }

    pub fn wait(
        &mut self,
        frames: i64,
    ) {
        self.frame.wait.wait(frames);
    }

    pub fn set_wait_mode(
        &mut self,
        mode: WaitMode,
    ) {
        self.frame.wait.set_mode(mode);
    }

    pub fn skip_branch(&mut self) {
        self.frame.skip_branch();
    }

    pub fn next_code(&self) -> i32 {
        self.frame.next_code()
    }

    /// Move onto the next instruction and return it (continuation lines)
    pub fn take_next(&mut self) -> Option<Instruction> {
        let next = self.frame.program.get(self.frame.cursor + 1)?.clone();
        self.frame.cursor += 1;
        Some(next)
    }

    /// Request a child frame running `program`
    pub fn call(
        &mut self,
        program: Program,
        event_id: u32,
    ) {
        self.call = Some(CallRequest { program, event_id });
    }
}

/// Code → handler table
pub struct CommandTable {
    handlers: HashMap<i32, Handler>,
}

static TABLE: Lazy<CommandTable> = Lazy::new(CommandTable::build);

impl CommandTable {
    /// The process-wide table
    pub fn global() -> &'static CommandTable {
        &TABLE
    }

    fn build() -> Self {
        let mut table = Self {
            handlers: HashMap::with_capacity(EventCode::ALL.len()),
        };
        commands::register_all(&mut table);
        table
    }

    /// Install a handler
    pub fn register(
        &mut self,
        code: EventCode,
        handler: Handler,
    ) {
        self.handlers.insert(code as i32, handler);
    }

    /// Handler for `code`; unknown codes get the no-op handler
    pub fn handler(
        &self,
        code: i32,
    ) -> Handler {
        match self.handlers.get(&code) {
            Some(handler) => *handler,
            None => {
                trace!("no handler for code {}", code);
                noop
            }
        }
    }

    pub fn is_registered(
        &self,
        code: i32,
    ) -> bool {
        self.handlers.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Handler for block markers, comments and unknown codes
pub fn noop(
    _ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    true
}
