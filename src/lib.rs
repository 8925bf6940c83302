//! eventvm - event command interpreter for 2D RPG runtimes
//!
//! Content authored in an editor arrives as flat lists of instructions whose
//! blocks are expressed by indentation. The [`Interpreter`](vm::Interpreter)
//! runs such a list cooperatively: the host calls `update` once per frame and
//! the interpreter executes commands until something has to be waited for.
//!
//! # Example
//!
//! ```no_run
//! use eventvm::runtime::headless::HeadlessHost;
//! use eventvm::vm::{program, EventCode, Instruction, Interpreter};
//!
//! let mut host = HeadlessHost::default();
//! let mut interpreter = Interpreter::default();
//! interpreter.setup(
//!     program(vec![
//!         Instruction::new(EventCode::ShowText, 0, vec!["".into(), 0.into(), 0.into(), 2.into()]),
//!         Instruction::new(EventCode::TextLine, 0, vec!["Hello!".into()]),
//!     ]),
//!     0,
//!     1,
//! );
//! host.run(&mut interpreter, 60).unwrap();
//! assert_eq!(host.message.pages, vec!["Hello!".to_string()]);
//! ```

#![warn(rust_2018_idioms)]

pub mod runtime;
pub mod util;
pub mod vm;

pub use anyhow::{Context, Result};

use crate::runtime::database::{CommonEvent, Database};
use crate::runtime::headless::HeadlessHost;
use crate::runtime::state::GameState;
use crate::util::config::InterpreterConfig;
use crate::vm::{code_name, EventCode, Instruction, Interpreter, Program};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "eventvm";

/// A self-contained content bundle: a program plus what it needs to run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Bundle {
    pub program: Vec<Instruction>,
    pub common_events: Vec<CommonEvent>,
    pub database: Database,
    pub state: GameState,
    /// Event that owns the program
    pub event_id: u32,
}

impl Bundle {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid bundle JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to parse: {}", path.display()))
    }

    /// Database with the bundle's common events merged in
    pub fn merged_database(&self) -> Database {
        let mut database = self.database.clone();
        for event in &self.common_events {
            database.add_common_event(event.clone());
        }
        database
    }

    pub fn program(&self) -> Program {
        Arc::from(self.program.clone())
    }
}

/// Outcome of a headless run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub ticks: usize,
    /// Whether the program ran to completion within the tick budget
    pub finished: bool,
    /// Text of every message window shown, in order
    pub pages: Vec<String>,
    pub state: GameState,
}

/// Run a bundle on the headless host for at most `max_ticks` frames
pub fn run_bundle(
    bundle: &Bundle,
    config: InterpreterConfig,
    max_ticks: usize,
) -> Result<RunReport> {
    let mut host = HeadlessHost::new(bundle.merged_database());
    host.state = bundle.state.clone();
    let mut interpreter = Interpreter::new(config);
    interpreter.setup_with_prefetch(bundle.program(), bundle.event_id, &mut host.world());
    debug!("running {} instructions", bundle.program.len());
    let ticks = host.run(&mut interpreter, max_ticks)?;
    info!("finished after {} ticks", ticks);
    Ok(RunReport {
        ticks,
        finished: !interpreter.is_running(),
        pages: host.message.pages,
        state: host.state,
    })
}

/// Load a bundle file and run it
pub fn run_file(
    path: &Path,
    config: InterpreterConfig,
    max_ticks: usize,
) -> Result<RunReport> {
    let bundle = Bundle::load(path)?;
    run_bundle(&bundle, config, max_ticks)
}

/// Static problems found in a program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub instructions: usize,
    /// (index, code) of every code without a handler
    pub unknown_codes: Vec<(usize, i32)>,
    /// Human-readable structure problems
    pub problems: Vec<String>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.unknown_codes.is_empty() && self.problems.is_empty()
    }
}

/// Look for unknown codes, indent jumps and unpaired loops
pub fn check_program(program: &[Instruction]) -> CheckReport {
    let mut report = CheckReport {
        instructions: program.len(),
        ..Default::default()
    };
    let mut previous_indent = 0usize;
    let mut open_loops = Vec::new();
    for (i, ins) in program.iter().enumerate() {
        let Some(code) = ins.event_code() else {
            report.unknown_codes.push((i, ins.code));
            previous_indent = ins.indent;
            continue;
        };
        if ins.indent > previous_indent + 1 {
            report.problems.push(format!(
                "#{}: indent jumps from {} to {}",
                i, previous_indent, ins.indent
            ));
        }
        match code {
            EventCode::Loop => open_loops.push(i),
            EventCode::RepeatAbove => {
                if open_loops.pop().is_none() {
                    report
                        .problems
                        .push(format!("#{}: Repeat Above without a Loop", i));
                }
            }
            _ => {}
        }
        previous_indent = ins.indent;
    }
    for i in open_loops {
        report
            .problems
            .push(format!("#{}: Loop is never repeated", i));
    }
    report
}

/// Render a program one instruction per line, indented like the editor shows it
pub fn dump_program(program: &[Instruction]) -> String {
    let mut out = String::new();
    for (i, ins) in program.iter().enumerate() {
        let params: Vec<String> = ins.parameters.iter().map(|p| p.to_string()).collect();
        let _ = writeln!(
            out,
            "[{:4}] {}{} ({}) [{}]",
            i,
            "  ".repeat(ins.indent),
            code_name(ins.code),
            ins.code,
            params.join(", ")
        );
    }
    out
}
