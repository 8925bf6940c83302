//! Battle, troop and scene commands

use crate::runtime::collaborators::{Battler, EnemyOp, SceneRequest, ShopGood};
use crate::vm::dispatch::{CommandContext, CommandTable};
use crate::vm::frames::PendingInput;
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;
use crate::vm::wait::WaitMode;
use tracing::{debug, warn};

pub(super) fn register(table: &mut CommandTable) {
    table.register(EventCode::BattleProcessing, battle_processing);
    table.register(EventCode::ShopProcessing, shop_processing);
    table.register(EventCode::NameInputProcessing, name_input_processing);
    table.register(EventCode::ChangeEnemyHp, change_enemy_hp);
    table.register(EventCode::ChangeEnemyMp, change_enemy_mp);
    table.register(EventCode::ChangeEnemyTp, change_enemy_tp);
    table.register(EventCode::ChangeEnemyState, change_enemy_state);
    table.register(EventCode::EnemyRecoverAll, enemy_recover_all);
    table.register(EventCode::EnemyAppear, enemy_appear);
    table.register(EventCode::EnemyTransform, enemy_transform);
    table.register(EventCode::ShowBattleAnimation, show_battle_animation);
    table.register(EventCode::ForceAction, force_action);
    table.register(EventCode::AbortBattle, abort_battle);
    table.register(EventCode::OpenMenuScreen, open_menu_screen);
    table.register(EventCode::OpenSaveScreen, open_save_screen);
    table.register(EventCode::GameOver, game_over);
    table.register(EventCode::ReturnToTitleScreen, return_to_title_screen);
}

/// Start a battle and record where its outcome goes.
/// The If Win / If Escape / If Lose blocks read it from the branch store.
fn battle_processing(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.in_battle() {
        return true;
    }
    let troop_id = match ins.int(0) {
        0 => ins.int(1),
        1 => ctx.variable(ins.int(1)),
        _ => ctx.world.map.encounter_troop_id(),
    };
    if !ctx.world.database.has_troop(troop_id) {
        warn!("troop {} does not exist", troop_id);
        return true;
    }
    debug!("battle with troop {}", troop_id);
    ctx.world.battle.setup(troop_id, ins.flag(2), ins.flag(3));
    if ins.int(0) == 2 {
        ctx.world.map.make_encounter_count();
    }
    ctx.frame.pending = Some(PendingInput::Battle {
        indent: ctx.frame.indent,
    });
    ctx.world.scene.push(SceneRequest::Battle);
    true
}

fn shop_processing(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.in_battle() {
        return true;
    }
    let good = |i: &Instruction| ShopGood {
        item_type: i.int(0),
        item_id: i.int(1),
        price_type: i.int(2),
        price: i.int(3),
    };
    let mut goods = vec![good(ins)];
    while ctx.next_code() == EventCode::ShopItem as i32 {
        if let Some(line) = ctx.take_next() {
            goods.push(good(&line));
        }
    }
    ctx.world.scene.push(SceneRequest::Shop {
        goods,
        purchase_only: ins.flag(4),
    });
    true
}

fn name_input_processing(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.in_battle() {
        return true;
    }
    if !ctx.world.database.has_actor(ins.int(0)) {
        warn!("actor {} does not exist", ins.int(0));
        return true;
    }
    ctx.world.scene.push(SceneRequest::NameInput {
        actor_id: ins.int(0),
        max_length: ins.int(1),
    });
    true
}

/// Apply `op` to the addressed enemy; outside battle there is no troop
fn enemy_op(
    ctx: &mut CommandContext<'_, '_>,
    index: i64,
    op: EnemyOp,
) -> bool {
    if ctx.world.in_battle() {
        ctx.world.battle.enemy_op(index, op);
    }
    true
}

fn change_enemy_hp(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let value = ctx.operate_value(ins.int(1), ins.int(2), ins.int(3));
    let op = EnemyOp::Hp {
        value,
        allow_death: ins.flag(4),
    };
    enemy_op(ctx, ins.int(0), op)
}

fn change_enemy_mp(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let value = ctx.operate_value(ins.int(1), ins.int(2), ins.int(3));
    enemy_op(ctx, ins.int(0), EnemyOp::Mp(value))
}

fn change_enemy_tp(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let value = ctx.operate_value(ins.int(1), ins.int(2), ins.int(3));
    enemy_op(ctx, ins.int(0), EnemyOp::Tp(value))
}

fn change_enemy_state(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let op = if ins.int(1) == 0 {
        EnemyOp::AddState(ins.int(2))
    } else {
        EnemyOp::RemoveState(ins.int(2))
    };
    enemy_op(ctx, ins.int(0), op)
}

fn enemy_recover_all(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    enemy_op(ctx, ins.int(0), EnemyOp::RecoverAll)
}

fn enemy_appear(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    enemy_op(ctx, ins.int(0), EnemyOp::Appear)
}

fn enemy_transform(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    enemy_op(ctx, ins.int(0), EnemyOp::Transform(ins.int(1)))
}

fn show_battle_animation(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let index = if ins.flag(2) { -1 } else { ins.int(0) };
    enemy_op(ctx, index, EnemyOp::Animation(ins.int(1)))
}

fn force_action(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if !ctx.world.in_battle() {
        return true;
    }
    let subject = if ins.int(0) == 0 {
        Battler::Enemy(ins.int(1))
    } else {
        Battler::Actor(ins.int(1))
    };
    ctx.world
        .battle
        .force_action(subject, ins.int(2), ins.int(3));
    ctx.set_wait_mode(WaitMode::Action);
    true
}

fn abort_battle(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    if ctx.world.in_battle() {
        ctx.world.battle.abort();
    }
    true
}

fn open_menu_screen(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    if !ctx.world.in_battle() {
        ctx.world.scene.push(SceneRequest::Menu);
    }
    true
}

fn open_save_screen(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    if !ctx.world.in_battle() {
        ctx.world.scene.push(SceneRequest::Save);
    }
    true
}

fn game_over(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.world.scene.goto(SceneRequest::GameOver);
    true
}

fn return_to_title_screen(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.world.scene.goto(SceneRequest::Title);
    true
}
