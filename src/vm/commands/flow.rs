//! Flow control: branches, loops, labels, common events

use crate::runtime::collaborators::{CharacterInfo, Vehicle};
use crate::runtime::state::ItemKind;
use crate::vm::branch::BranchOutcome;
use crate::vm::dispatch::{CommandContext, CommandTable};
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;
use std::sync::Arc;
use tracing::{debug, warn};

pub(super) fn register(table: &mut CommandTable) {
    table.register(EventCode::Skip, skip);
    table.register(EventCode::ConditionalBranch, conditional_branch);
    table.register(EventCode::Else, else_branch);
    table.register(EventCode::Loop, loop_start);
    table.register(EventCode::RepeatAbove, repeat_above);
    table.register(EventCode::BreakLoop, break_loop);
    table.register(EventCode::ExitEventProcessing, exit_event);
    table.register(EventCode::CommonEvent, common_event);
    table.register(EventCode::JumpToLabel, jump_to_label);
    table.register(EventCode::WhenChoice, when_choice);
    table.register(EventCode::WhenCancel, when_cancel);
    table.register(EventCode::IfWin, if_win);
    table.register(EventCode::IfEscape, if_escape);
    table.register(EventCode::IfLose, if_lose);
}

fn skip(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.skip_branch();
    true
}

fn conditional_branch(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let result = evaluate_condition(ctx, ins);
    let indent = ctx.frame.indent;
    ctx.frame.branch.set(indent, BranchOutcome::Bool(result));
    if !result {
        ctx.skip_branch();
    }
    true
}

fn else_branch(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    if !ctx.frame.branch.is_false(ctx.frame.indent) {
        ctx.skip_branch();
    }
    true
}

fn loop_start(
    _ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    true
}

fn repeat_above(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.frame.rewind_to_loop();
    true
}

fn break_loop(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.frame.break_loop();
    true
}

fn exit_event(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.frame.cursor = ctx.frame.program.len();
    true
}

fn common_event(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let id = ins.int(0);
    match ctx.world.database.common_event(id) {
        Some(event) => {
            let program = Arc::clone(&event.list);
            let event_id = if ctx.is_on_current_map() {
                ctx.frame.event_id
            } else {
                0
            };
            ctx.call(program, event_id);
        }
        None => warn!("common event {} does not exist", id),
    }
    true
}

fn jump_to_label(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let name = ins.str(0);
    match ctx.frame.find_label(name) {
        Some(index) => ctx.frame.jump_to(index),
        None => debug!("label '{}' not found", name),
    }
    true
}

fn when_choice(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.frame.branch.int(ctx.frame.indent) != Some(ins.int(0)) {
        ctx.skip_branch();
    }
    true
}

fn when_cancel(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    match ctx.frame.branch.int(ctx.frame.indent) {
        Some(n) if n < 0 => {}
        _ => ctx.skip_branch(),
    }
    true
}

fn battle_branch(
    ctx: &mut CommandContext<'_, '_>,
    expected: i64,
) -> bool {
    if ctx.frame.branch.int(ctx.frame.indent) != Some(expected) {
        ctx.skip_branch();
    }
    true
}

fn if_win(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    battle_branch(ctx, 0)
}

fn if_escape(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    battle_branch(ctx, 1)
}

fn if_lose(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    battle_branch(ctx, 2)
}

/// Compare two integers with a content comparison operator
pub(super) fn compare(
    lhs: i64,
    rhs: i64,
    operator: i64,
) -> bool {
    match operator {
        0 => lhs == rhs,
        1 => lhs >= rhs,
        2 => lhs <= rhs,
        3 => lhs > rhs,
        4 => lhs < rhs,
        5 => lhs != rhs,
        _ => false,
    }
}

fn evaluate_condition(
    ctx: &CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let state = &*ctx.world.state;
    match ins.int(0) {
        // Switch
        0 => state.switches.value(ins.int(1)) == (ins.int(2) == 0),
        // Variable
        1 => {
            let lhs = state.variables.int(ins.int(1));
            let rhs = if ins.int(2) == 0 {
                ins.int(3)
            } else {
                state.variables.int(ins.int(3))
            };
            compare(lhs, rhs, ins.int(4))
        }
        // Self switch
        2 => {
            ctx.frame.event_id > 0
                && state.self_switches.value(ctx.frame.map_id, ctx.frame.event_id, ins.str(1))
                    == (ins.int(2) == 0)
        }
        // Timer
        3 => {
            state.timer.working
                && if ins.int(1) == 0 {
                    state.timer.seconds() >= ins.int(2)
                } else {
                    state.timer.seconds() <= ins.int(2)
                }
        }
        // Actor
        4 => {
            let Some(actor) = u32::try_from(ins.int(1)).ok().and_then(|id| state.actor(id)) else {
                return false;
            };
            let n = ins.int(3);
            match ins.int(2) {
                0 => state.party.members.contains(&actor.id),
                1 => actor.name == ins.str(3),
                2 => actor.class_id == n,
                3 => actor.has_skill(n),
                4 | 5 => actor.has_equip(n),
                6 => actor.has_state(n),
                _ => false,
            }
        }
        // Enemy
        5 => {
            if ins.int(2) == 0 {
                ctx.world.battle.is_enemy_appeared(ins.int(1))
            } else {
                ctx.world.battle.enemy_has_state(ins.int(1), ins.int(3))
            }
        }
        // Character direction
        6 => ctx
            .character(ins.int(1))
            .map(|ch| ctx.world.map.character_info(ch, CharacterInfo::Direction) == ins.int(2))
            .unwrap_or(false),
        // Gold
        7 => {
            let gold = state.party.gold;
            match ins.int(2) {
                0 => gold >= ins.int(1),
                1 => gold <= ins.int(1),
                2 => gold < ins.int(1),
                _ => false,
            }
        }
        // Item
        8 => state.party.num_items(ItemKind::Item, ins.int(1)) > 0,
        // Weapon / armor, optionally counting equipped copies
        9 | 10 => {
            let kind = if ins.int(0) == 9 {
                ItemKind::Weapon
            } else {
                ItemKind::Armor
            };
            if ins.flag(2) {
                state.item_count_with_equips(kind, ins.int(1)) > 0
            } else {
                state.party.num_items(kind, ins.int(1)) > 0
            }
        }
        // Button
        11 => ctx.world.input.is_pressed(ins.str(1)),
        // Script
        12 => match ctx.world.evaluator.evaluate(ins.str(1), state) {
            Ok(value) => value.as_bool(),
            Err(e) => {
                warn!("conditional branch script '{}' failed: {}", ins.str(1), e);
                false
            }
        },
        // Vehicle
        13 => match (ctx.world.map.player_vehicle(), Vehicle::from_index(ins.int(1))) {
            (Some(riding), Some(wanted)) => riding == wanted,
            _ => false,
        },
        other => {
            debug!("unknown condition type {}", other);
            false
        }
    }
}
