//! Event interpreter
//!
//! 协作式、按帧驱动的事件指令解释器。
//!
//! The host calls [`Interpreter::update`] once per frame. Each call runs the
//! top frame of the call stack until it suspends (frame countdown, wait mode,
//! scene change, a handler declining to advance), the freeze watchdog trips,
//! or the stack empties. Nothing ever blocks; suspension is an early return.

use crate::runtime::database::Database;
use crate::runtime::world::World;
use crate::util::config::InterpreterConfig;
use crate::vm::dispatch::{CallRequest, CommandContext, CommandTable};
use crate::vm::errors::{InterpreterError, InterpreterResult};
use crate::vm::frames::Frame;
use crate::vm::instructions::Program;
use crate::vm::opcode::code_name;
use crate::vm::prefetch;
use crate::vm::watchdog::FreezeWatchdog;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, trace};

static NEXT_RESERVATION: AtomicU64 = AtomicU64::new(1);

/// Event interpreter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interpreter {
    /// 配置
    config: InterpreterConfig,
    /// 调用栈，栈顶为当前执行的帧
    frames: Vec<Frame>,
    /// 防止单帧内无限执行
    watchdog: FreezeWatchdog,
    /// Image reservation id for prefetch requests
    reservation_id: u64,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(InterpreterConfig::default())
    }
}

impl Interpreter {
    /// Create an idle interpreter
    pub fn new(config: InterpreterConfig) -> Self {
        let watchdog = FreezeWatchdog::new(config.freeze_limit);
        Self {
            config,
            frames: Vec::new(),
            watchdog,
            reservation_id: NEXT_RESERVATION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Start running `program` on behalf of `event_id` (0 for none) on `map_id`.
    /// Any previous execution is discarded.
    pub fn setup(
        &mut self,
        program: Program,
        event_id: u32,
        map_id: u32,
    ) {
        debug!(
            "setup: {} instructions, event {}, map {}",
            program.len(),
            event_id,
            map_id
        );
        self.frames.clear();
        self.frames.push(Frame::new(program, event_id, map_id, 0));
    }

    /// Like [`setup`](Self::setup), but first issues image prefetch requests
    /// for the program and every common event it statically calls
    pub fn setup_with_prefetch(
        &mut self,
        program: Program,
        event_id: u32,
        world: &mut World<'_>,
    ) {
        prefetch::prefetch(&program, world.database, world.images, self.reservation_id);
        let map_id = world.map.map_id();
        self.setup(program, event_id, map_id);
    }

    /// Start a common event by id. Returns false when the id is unknown.
    pub fn setup_common_event(
        &mut self,
        database: &Database,
        common_event_id: i64,
        map_id: u32,
    ) -> bool {
        match database.common_event(common_event_id) {
            Some(event) => {
                self.setup(Arc::clone(&event.list), 0, map_id);
                true
            }
            None => false,
        }
    }

    /// Whether any frame is still executing
    pub fn is_running(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Abandon execution
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Number of frames on the call stack
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Call stack, root first
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Cursor of the top frame
    pub fn cursor(&self) -> Option<usize> {
        self.frames.last().map(|f| f.cursor)
    }

    /// Event id of the root frame
    pub fn event_id(&self) -> u32 {
        self.frames.first().map(|f| f.event_id).unwrap_or(0)
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Skip the block under the top frame's current instruction
    pub fn skip_branch(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.skip_branch();
        }
    }

    /// Reposition the top frame's cursor, invalidating crossed branch outcomes
    pub fn jump_to(
        &mut self,
        index: usize,
    ) {
        if let Some(frame) = self.frames.last_mut() {
            frame.jump_to(index);
        }
    }

    /// Advance execution by one host frame
    pub fn update(
        &mut self,
        world: &mut World<'_>,
    ) -> InterpreterResult<()> {
        while let Some(frame) = self.frames.last_mut() {
            frame.resolve_pending(world);
            if frame.wait.update(world) {
                return Ok(());
            }
            if world.scene.is_scene_changing() {
                return Ok(());
            }
            if frame.is_finished() {
                self.terminate_top();
                continue;
            }

            let (advance, call) = Self::execute_command(frame, world, &self.config);
            if let Some(call) = call {
                self.push_child(call, world)?;
            }
            if !advance {
                return Ok(());
            }
            if self.watchdog.tick(world.frame_count) {
                trace!(
                    "freeze watchdog: yielding after {} commands",
                    self.watchdog.count()
                );
                return Ok(());
            }
        }
        Ok(())
    }

    /// Dispatch the instruction under the cursor
    fn execute_command(
        frame: &mut Frame,
        world: &mut World<'_>,
        config: &InterpreterConfig,
    ) -> (bool, Option<CallRequest>) {
        let program = Arc::clone(&frame.program);
        let ins = &program[frame.cursor];
        frame.indent = ins.indent;

        if config.trace_commands {
            debug!(
                "[depth {}] {:>4} {}{} {:?}",
                frame.depth,
                frame.cursor,
                "  ".repeat(ins.indent),
                code_name(ins.code),
                ins.parameters
            );
        }

        let handler = CommandTable::global().handler(ins.code);
        let mut ctx = CommandContext::new(frame, world, config);
        let advance = handler(&mut ctx, ins);
        let call = ctx.call.take();
        if advance {
            frame.cursor += 1;
        }
        (advance, call)
    }

    /// Push a child frame for a Common Event call
    fn push_child(
        &mut self,
        call: CallRequest,
        world: &mut World<'_>,
    ) -> InterpreterResult<()> {
        let depth = self.frames.last().map(|f| f.depth + 1).unwrap_or(0);
        if depth >= self.config.max_call_depth {
            error!(
                "common event calls exceeded the limit ({})",
                self.config.max_call_depth
            );
            self.frames.clear();
            return Err(InterpreterError::CallDepthOverflow {
                depth,
                limit: self.config.max_call_depth,
            });
        }
        prefetch::prefetch(
            &call.program,
            world.database,
            world.images,
            self.reservation_id,
        );
        debug!("call depth {}: {} instructions", depth, call.program.len());
        let map_id = world.map.map_id();
        self.frames
            .push(Frame::new(call.program, call.event_id, map_id, depth));
        Ok(())
    }

    fn terminate_top(&mut self) {
        if let Some(frame) = self.frames.pop() {
            debug!("frame at depth {} finished", frame.depth);
        }
    }
}
