//! Message window commands
//!
//! Show Text absorbs its text lines and an immediately following choice,
//! number input or item selection so they share one window. Every command here
//! declines to advance while the window is still busy.

use crate::runtime::collaborators::{ChoiceSettings, MessageSettings};
use crate::vm::dispatch::{CommandContext, CommandTable};
use crate::vm::frames::PendingInput;
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;
use crate::vm::wait::WaitMode;

pub(super) fn register(table: &mut CommandTable) {
    table.register(EventCode::ShowText, show_text);
    table.register(EventCode::ShowChoices, show_choices);
    table.register(EventCode::InputNumber, input_number);
    table.register(EventCode::SelectItem, select_item);
    table.register(EventCode::ShowScrollingText, show_scrolling_text);
}

fn show_text(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.message.is_busy() {
        return false;
    }
    ctx.world.message.begin(MessageSettings {
        face_name: ins.str(0).to_string(),
        face_index: ins.int(1),
        background: ins.int(2),
        position: ins.int(3),
        speaker: ins.str(4).to_string(),
    });
    while ctx.next_code() == EventCode::TextLine as i32 {
        if let Some(line) = ctx.take_next() {
            ctx.world.message.add(line.str(0));
        }
    }
    let next = ctx.next_code();
    if next == EventCode::ShowChoices as i32 {
        if let Some(choices) = ctx.take_next() {
            setup_choices(ctx, &choices);
        }
    } else if next == EventCode::InputNumber as i32 {
        if let Some(input) = ctx.take_next() {
            setup_number_input(ctx, &input);
        }
    } else if next == EventCode::SelectItem as i32 {
        if let Some(select) = ctx.take_next() {
            setup_item_choice(ctx, &select);
        }
    }
    ctx.set_wait_mode(WaitMode::Message);
    true
}

fn show_choices(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.message.is_busy() {
        return false;
    }
    setup_choices(ctx, ins);
    ctx.set_wait_mode(WaitMode::Message);
    true
}

fn setup_choices(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) {
    let choices: Vec<String> = ins
        .param(0)
        .as_list()
        .iter()
        .map(|c| c.as_str().to_string())
        .collect();
    let cancel = ins.int(1);
    let count = ins.param_count();
    let settings = ChoiceSettings {
        cancel_type: if cancel < choices.len() as i64 { cancel } else { -2 },
        choices,
        default_type: if count > 2 { ins.int(2) } else { 0 },
        position: if count > 3 { ins.int(3) } else { 2 },
        background: if count > 4 { ins.int(4) } else { 0 },
    };
    ctx.world.message.set_choices(settings);
    ctx.frame.pending = Some(PendingInput::Choice {
        indent: ctx.frame.indent,
    });
}

fn input_number(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.message.is_busy() {
        return false;
    }
    setup_number_input(ctx, ins);
    ctx.set_wait_mode(WaitMode::Message);
    true
}

fn setup_number_input(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) {
    ctx.world.message.set_number_input(ins.int(1));
    ctx.frame.pending = Some(PendingInput::Number {
        variable_id: ins.int(0),
    });
}

fn select_item(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.message.is_busy() {
        return false;
    }
    setup_item_choice(ctx, ins);
    ctx.set_wait_mode(WaitMode::Message);
    true
}

fn setup_item_choice(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) {
    // Default to key items when the content omits the type
    let item_type = if ins.param_count() > 1 { ins.int(1) } else { 2 };
    ctx.world.message.set_item_choice(item_type);
    ctx.frame.pending = Some(PendingInput::Item {
        variable_id: ins.int(0),
    });
}

fn show_scrolling_text(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.message.is_busy() {
        return false;
    }
    ctx.world.message.set_scroll(ins.int(0), ins.flag(1));
    while ctx.next_code() == EventCode::ScrollingTextLine as i32 {
        if let Some(line) = ctx.take_next() {
            ctx.world.message.add(line.str(0));
        }
    }
    ctx.set_wait_mode(WaitMode::Message);
    true
}
