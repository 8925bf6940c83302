//! Script command

use crate::vm::dispatch::{CommandContext, CommandTable};
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;
use tracing::warn;

pub(super) fn register(table: &mut CommandTable) {
    table.register(EventCode::Script, script);
}

/// Join the first line with its continuation lines and run the result as
/// statements. A failing script is logged and skipped.
fn script(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let mut source = format!("{}\n", ins.str(0));
    while ctx.next_code() == EventCode::ScriptLine as i32 {
        if let Some(line) = ctx.take_next() {
            source.push_str(line.str(0));
            source.push('\n');
        }
    }
    if let Err(e) = ctx.world.evaluator.execute(&source, ctx.world.state) {
        warn!("script failed: {}", e);
    }
    true
}
