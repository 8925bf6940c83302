//! Switches, variables, timer, gold, inventory and party membership

use crate::runtime::collaborators::CharacterInfo;
use crate::runtime::expr::EvalError;
use crate::runtime::state::{Actor, ItemKind};
use crate::runtime::value::Value;
use crate::vm::dispatch::{CommandContext, CommandTable};
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;
use rand::Rng;
use tracing::{debug, warn};

pub(super) fn register(table: &mut CommandTable) {
    table.register(EventCode::ControlSwitches, control_switches);
    table.register(EventCode::ControlVariables, control_variables);
    table.register(EventCode::ControlSelfSwitch, control_self_switch);
    table.register(EventCode::ControlTimer, control_timer);
    table.register(EventCode::ChangeGold, change_gold);
    table.register(EventCode::ChangeItems, change_items);
    table.register(EventCode::ChangeWeapons, change_weapons);
    table.register(EventCode::ChangeArmors, change_armors);
    table.register(EventCode::ChangePartyMember, change_party_member);
}

fn control_switches(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let value = ins.int(2) == 0;
    for id in ins.int(0)..=ins.int(1) {
        ctx.world.state.switches.set_value(id, value);
    }
    true
}

fn control_variables(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let (start, end) = (ins.int(0), ins.int(1));
    let operation = ins.int(2);
    match ins.int(3) {
        // Random: a fresh roll per variable in the range
        2 => {
            let min = ins.int(4);
            let span = i128::from(ins.int(5)) - i128::from(min) + 1;
            let span = span.clamp(1, i128::from(i64::MAX)) as i64;
            for id in start..=end {
                let value = min.saturating_add(ctx.world.rng.random_range(0..span));
                operate_variable(ctx, id, operation, Value::Int(value));
            }
        }
        operand_type => {
            let value = match operand_type {
                0 => Value::Int(ins.int(4)),
                1 => ctx.world.state.variables.value(ins.int(4)),
                3 => Value::Int(game_data(ctx, ins.int(4), ins.int(5), ins.int(6))),
                4 => match ctx.world.evaluator.evaluate(ins.str(4), ctx.world.state) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!("variable script '{}' failed: {}", ins.str(4), e);
                        Value::Int(0)
                    }
                },
                other => {
                    debug!("unknown variable operand type {}", other);
                    Value::Int(0)
                }
            };
            for id in start..=end {
                operate_variable(ctx, id, operation, value.clone());
            }
        }
    }
    true
}

/// Apply one of set / add / sub / mul / div / mod to a variable.
/// Arithmetic failures store 0.
fn operate_variable(
    ctx: &mut CommandContext<'_, '_>,
    variable_id: i64,
    operation: i64,
    value: Value,
) {
    let variables = &mut ctx.world.state.variables;
    if operation == 0 {
        variables.set_value(variable_id, value);
        return;
    }
    let current = variables.value(variable_id);
    let result = match (&current, &value) {
        (Value::Str(_), _) | (_, Value::Str(_)) if operation == 1 => {
            Ok(Value::Str(format!("{}{}", current, value)))
        }
        _ => arithmetic(current.as_int(), value.as_int(), operation).map(Value::Int),
    };
    match result {
        Ok(v) => variables.set_value(variable_id, v),
        Err(e) => {
            warn!("variable {} operation failed: {}", variable_id, e);
            variables.set_value(variable_id, Value::Int(0));
        }
    }
}

fn arithmetic(
    lhs: i64,
    rhs: i64,
    operation: i64,
) -> Result<i64, EvalError> {
    let overflow = || EvalError::Type("integer overflow".to_string());
    match operation {
        1 => lhs.checked_add(rhs).ok_or_else(overflow),
        2 => lhs.checked_sub(rhs).ok_or_else(overflow),
        3 => lhs.checked_mul(rhs).ok_or_else(overflow),
        4 => {
            if rhs == 0 {
                return Err(EvalError::DivisionByZero);
            }
            let quotient = lhs.checked_div(rhs).ok_or_else(overflow)?;
            // floor toward negative infinity
            if lhs % rhs != 0 && (lhs < 0) != (rhs < 0) {
                Ok(quotient - 1)
            } else {
                Ok(quotient)
            }
        }
        5 => {
            if rhs == 0 {
                return Err(EvalError::DivisionByZero);
            }
            lhs.checked_rem(rhs).ok_or_else(overflow)
        }
        _ => Ok(rhs),
    }
}

/// Game data operand of Control Variables
fn game_data(
    ctx: &CommandContext<'_, '_>,
    kind: i64,
    param1: i64,
    param2: i64,
) -> i64 {
    let state = &*ctx.world.state;
    match kind {
        0 => state.party.num_items(ItemKind::Item, param1),
        1 => state.party.num_items(ItemKind::Weapon, param1),
        2 => state.party.num_items(ItemKind::Armor, param1),
        3 => {
            let Some(actor) = u32::try_from(param1).ok().and_then(|id| state.actor(id)) else {
                return 0;
            };
            match param2 {
                0 => actor.level,
                1 => actor.exp,
                2 => actor.hp,
                3 => actor.mp,
                4..=11 => actor.param((param2 - 4) as usize),
                12 => actor.tp,
                _ => 0,
            }
        }
        4 => ctx.world.battle.enemy_param(param1, param2),
        5 => {
            let info = match param2 {
                0 => CharacterInfo::X,
                1 => CharacterInfo::Y,
                2 => CharacterInfo::Direction,
                3 => CharacterInfo::ScreenX,
                4 => CharacterInfo::ScreenY,
                _ => return 0,
            };
            ctx.character(param1)
                .map(|ch| ctx.world.map.character_info(ch, info))
                .unwrap_or(0)
        }
        6 => usize::try_from(param1)
            .map(|index| state.member_id(index))
            .unwrap_or(0),
        7 => match param1 {
            0 => ctx.world.map.map_id() as i64,
            1 => state.party.members.len() as i64,
            2 => state.party.gold,
            3 => state.party.steps,
            4 => state.system.playtime_seconds,
            5 => state.timer.seconds(),
            6 => state.system.save_count,
            7 => state.system.battle_count,
            8 => state.system.win_count,
            9 => state.system.escape_count,
            _ => 0,
        },
        _ => 0,
    }
}

fn control_self_switch(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.frame.event_id > 0 {
        let (map_id, event_id) = (ctx.frame.map_id, ctx.frame.event_id);
        ctx.world
            .state
            .self_switches
            .set_value(map_id, event_id, ins.str(0), ins.int(1) == 0);
    }
    true
}

fn control_timer(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let timer = &mut ctx.world.state.timer;
    if ins.int(0) == 0 {
        timer.start(ins.int(1).saturating_mul(60));
    } else {
        timer.stop();
    }
    true
}

fn change_gold(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let value = ctx.operate_value(ins.int(0), ins.int(1), ins.int(2));
    ctx.world.state.party.gain_gold(value);
    true
}

fn change_items(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if !ctx.world.database.has_item(ins.int(0)) {
        warn!("item {} does not exist", ins.int(0));
        return true;
    }
    let value = ctx.operate_value(ins.int(1), ins.int(2), ins.int(3));
    ctx.world
        .state
        .party
        .gain_item(ItemKind::Item, ins.int(0), value);
    true
}

/// Weapons and armors: a removal may also strip equipped copies
fn change_equipment_items(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
    kind: ItemKind,
) -> bool {
    let id = ins.int(0);
    let exists = match kind {
        ItemKind::Weapon => ctx.world.database.has_weapon(id),
        _ => ctx.world.database.has_armor(id),
    };
    if !exists {
        warn!("{:?} {} does not exist", kind, id);
        return true;
    }
    let value = ctx.operate_value(ins.int(1), ins.int(2), ins.int(3));
    let state = &mut *ctx.world.state;
    state.party.gain_item(kind, id, value);
    if value < 0 && ins.flag(4) {
        let held = state.party.num_items(kind, id);
        let mut missing = value.saturating_neg().saturating_sub(held);
        let members = state.party.members.clone();
        for member in members {
            let Some(actor) = state.actor_mut(member) else {
                continue;
            };
            for slot in actor.equips.iter_mut() {
                if missing > 0 && *slot == id {
                    *slot = 0;
                    missing -= 1;
                }
            }
        }
    }
    true
}

fn change_weapons(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    change_equipment_items(ctx, ins, ItemKind::Weapon)
}

fn change_armors(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    change_equipment_items(ctx, ins, ItemKind::Armor)
}

fn change_party_member(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let Ok(actor_id) = u32::try_from(ins.int(0)) else {
        return true;
    };
    if !ctx.world.database.has_actor(ins.int(0)) {
        warn!("actor {} does not exist", actor_id);
        return true;
    }
    let state = &mut *ctx.world.state;
    if ins.int(1) == 0 {
        let fresh = ins.flag(2) || !state.actors.contains_key(&actor_id);
        if fresh {
            let name = state
                .actor(actor_id)
                .map(|a| a.name.clone())
                .unwrap_or_default();
            state.actors.insert(actor_id, Actor::new(actor_id, &name));
        }
        state.party.add_actor(actor_id);
    } else {
        state.party.remove_actor(actor_id);
    }
    true
}
