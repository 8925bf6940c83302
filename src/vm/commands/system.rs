//! System settings: access toggles, window color, battle and vehicle music

use super::tone;
use crate::runtime::state::AudioFile;
use crate::vm::dispatch::{CommandContext, CommandTable};
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;

pub(super) fn register(table: &mut CommandTable) {
    table.register(EventCode::ChangeBattleBgm, change_battle_bgm);
    table.register(EventCode::ChangeVictoryMe, change_victory_me);
    table.register(EventCode::ChangeSaveAccess, change_save_access);
    table.register(EventCode::ChangeMenuAccess, change_menu_access);
    table.register(EventCode::ChangeEncounter, change_encounter);
    table.register(EventCode::ChangeFormationAccess, change_formation_access);
    table.register(EventCode::ChangeWindowColor, change_window_color);
    table.register(EventCode::ChangeDefeatMe, change_defeat_me);
    table.register(EventCode::ChangeVehicleBgm, change_vehicle_bgm);
}

fn change_battle_bgm(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.state.system.battle_bgm = Some(AudioFile::from_value(ins.param(0)));
    true
}

fn change_victory_me(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.state.system.victory_me = Some(AudioFile::from_value(ins.param(0)));
    true
}

fn change_defeat_me(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.state.system.defeat_me = Some(AudioFile::from_value(ins.param(0)));
    true
}

fn change_vehicle_bgm(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world
        .state
        .system
        .vehicle_bgm
        .insert(ins.int(0), AudioFile::from_value(ins.param(1)));
    true
}

// Access toggles: operand 0 disables, anything else enables

fn change_save_access(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.state.system.save_enabled = ins.int(0) != 0;
    true
}

fn change_menu_access(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.state.system.menu_enabled = ins.int(0) != 0;
    true
}

fn change_encounter(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.state.system.encounter_enabled = ins.int(0) != 0;
    true
}

fn change_formation_access(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.state.system.formation_enabled = ins.int(0) != 0;
    true
}

fn change_window_color(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.state.system.window_tone = tone(ins.param(0));
    true
}
