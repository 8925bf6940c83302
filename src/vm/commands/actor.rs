//! Actor commands

use crate::runtime::collaborators::Vehicle;
use crate::runtime::state::{Actor, PARAM_COUNT};
use crate::vm::dispatch::{CommandContext, CommandTable};
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;
use tracing::warn;

pub(super) fn register(table: &mut CommandTable) {
    table.register(EventCode::ChangeHp, change_hp);
    table.register(EventCode::ChangeMp, change_mp);
    table.register(EventCode::ChangeTp, change_tp);
    table.register(EventCode::ChangeState, change_state);
    table.register(EventCode::RecoverAll, recover_all);
    table.register(EventCode::ChangeExp, change_exp);
    table.register(EventCode::ChangeLevel, change_level);
    table.register(EventCode::ChangeParameter, change_parameter);
    table.register(EventCode::ChangeSkill, change_skill);
    table.register(EventCode::ChangeEquipment, change_equipment);
    table.register(EventCode::ChangeName, change_name);
    table.register(EventCode::ChangeClass, change_class);
    table.register(EventCode::ChangeActorImages, change_actor_images);
    table.register(EventCode::ChangeVehicleImage, change_vehicle_image);
    table.register(EventCode::ChangeNickname, change_nickname);
    table.register(EventCode::ChangeProfile, change_profile);
}

/// Run `f` on every actor addressed by operands 0 and 1
fn each_actor(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
    mut f: impl FnMut(&mut Actor),
) -> bool {
    for id in ctx.actor_targets(ins.int(0), ins.int(1)) {
        if let Some(actor) = ctx.world.state.actor_mut(id) {
            f(actor);
        }
    }
    true
}

/// Run `f` on the actor named by operand 0
fn with_actor(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
    f: impl FnOnce(&mut Actor),
) -> bool {
    match u32::try_from(ins.int(0))
        .ok()
        .and_then(|id| ctx.world.state.actor_mut(id))
    {
        Some(actor) => f(actor),
        None => warn!("actor {} does not exist", ins.int(0)),
    }
    true
}

fn change_hp(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let value = ctx.operate_value(ins.int(2), ins.int(3), ins.int(4));
    let allow_death = ins.flag(5);
    each_actor(ctx, ins, |actor| actor.gain_hp(value, allow_death))
}

fn change_mp(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let value = ctx.operate_value(ins.int(2), ins.int(3), ins.int(4));
    each_actor(ctx, ins, |actor| actor.gain_mp(value))
}

fn change_tp(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let value = ctx.operate_value(ins.int(2), ins.int(3), ins.int(4));
    each_actor(ctx, ins, |actor| actor.gain_tp(value))
}

fn change_state(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let add = ins.int(2) == 0;
    let state_id = ins.int(3);
    each_actor(ctx, ins, |actor| {
        if add {
            actor.add_state(state_id);
        } else {
            actor.remove_state(state_id);
        }
    })
}

fn recover_all(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    each_actor(ctx, ins, Actor::recover_all)
}

fn change_exp(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let value = ctx.operate_value(ins.int(2), ins.int(3), ins.int(4));
    let max_level = ctx.world.database.max_level;
    each_actor(ctx, ins, |actor| {
        let exp = actor.exp.saturating_add(value);
        actor.change_exp(exp, max_level);
    })
}

fn change_level(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let value = ctx.operate_value(ins.int(2), ins.int(3), ins.int(4));
    let max_level = ctx.world.database.max_level;
    each_actor(ctx, ins, |actor| {
        let level = actor.level.saturating_add(value);
        actor.change_level(level, max_level);
    })
}

fn change_parameter(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let Some(index) = usize::try_from(ins.int(2)).ok().filter(|i| *i < PARAM_COUNT) else {
        warn!("parameter {} does not exist", ins.int(2));
        return true;
    };
    let value = ctx.operate_value(ins.int(3), ins.int(4), ins.int(5));
    each_actor(ctx, ins, |actor| {
        actor.param_plus[index] = actor.param_plus[index].saturating_add(value);
        actor.hp = actor.hp.min(actor.mhp());
        actor.mp = actor.mp.min(actor.mmp());
    })
}

fn change_skill(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let learn = ins.int(2) == 0;
    let skill_id = ins.int(3);
    each_actor(ctx, ins, |actor| {
        if learn {
            actor.learn_skill(skill_id);
        } else {
            actor.forget_skill(skill_id);
        }
    })
}

/// Operand 1 is the equipment type; slots are numbered from type 1
fn change_equipment(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let slot = usize::try_from(ins.int(1).saturating_sub(1)).unwrap_or(0);
    let item_id = ins.int(2);
    with_actor(ctx, ins, |actor| actor.change_equip(slot, item_id))
}

fn change_name(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let name = ins.str(1).to_string();
    with_actor(ctx, ins, |actor| actor.name = name)
}

fn change_nickname(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let nickname = ins.str(1).to_string();
    with_actor(ctx, ins, |actor| actor.nickname = nickname)
}

fn change_profile(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let profile = ins.str(1).to_string();
    with_actor(ctx, ins, |actor| actor.profile = profile)
}

/// Operand 2 keeps the current experience instead of the level
fn change_class(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let class_id = ins.int(1);
    let keep_exp = ins.flag(2);
    let max_level = ctx.world.database.max_level;
    with_actor(ctx, ins, |actor| {
        actor.class_id = class_id;
        if keep_exp {
            let exp = actor.exp;
            actor.change_exp(exp, max_level);
        } else {
            let level = actor.level;
            actor.change_level(level, max_level);
        }
    })
}

fn change_actor_images(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let character = (ins.str(1).to_string(), ins.int(2));
    let face = (ins.str(3).to_string(), ins.int(4));
    let battler = ins.str(5).to_string();
    with_actor(ctx, ins, |actor| {
        actor.character_image = character;
        actor.face_image = face;
        actor.battler_image = battler;
    })
}

fn change_vehicle_image(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    match Vehicle::from_index(ins.int(0)) {
        Some(vehicle) => ctx
            .world
            .map
            .set_vehicle_image(vehicle, ins.str(1), ins.int(2)),
        None => warn!("vehicle {} does not exist", ins.int(0)),
    }
    true
}
