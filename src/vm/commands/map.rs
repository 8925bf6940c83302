//! Map, character and vehicle commands

use crate::runtime::collaborators::{CharacterInfo, ImageKind, Vehicle};
use crate::vm::dispatch::{CommandContext, CommandTable};
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;
use crate::vm::wait::WaitMode;
use tracing::{debug, warn};

pub(super) fn register(table: &mut CommandTable) {
    table.register(EventCode::TransferPlayer, transfer_player);
    table.register(EventCode::SetVehicleLocation, set_vehicle_location);
    table.register(EventCode::SetEventLocation, set_event_location);
    table.register(EventCode::ScrollMap, scroll_map);
    table.register(EventCode::SetMovementRoute, set_movement_route);
    table.register(EventCode::GetOnOffVehicle, get_on_off_vehicle);
    table.register(EventCode::ChangeTransparency, change_transparency);
    table.register(EventCode::ShowAnimation, show_animation);
    table.register(EventCode::ShowBalloonIcon, show_balloon_icon);
    table.register(EventCode::EraseEvent, erase_event);
    table.register(EventCode::ChangePlayerFollowers, change_player_followers);
    table.register(EventCode::GatherFollowers, gather_followers);
    table.register(EventCode::ChangeMapNameDisplay, change_map_name_display);
    table.register(EventCode::ChangeTileset, change_tileset);
    table.register(EventCode::ChangeBattleBackground, change_battle_background);
    table.register(EventCode::ChangeParallax, change_parallax);
    table.register(EventCode::GetLocationInfo, get_location_info);
}

/// Direct-or-variable designation of a map position
fn designated(
    ctx: &CommandContext<'_, '_>,
    by_variable: bool,
    a: i64,
    b: i64,
    c: i64,
) -> (i64, i64, i64) {
    if by_variable {
        (ctx.variable(a), ctx.variable(b), ctx.variable(c))
    } else {
        (a, b, c)
    }
}

fn transfer_player(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.in_battle() || ctx.world.message.is_busy() {
        return false;
    }
    let (map_id, x, y) = designated(ctx, ins.int(0) != 0, ins.int(1), ins.int(2), ins.int(3));
    debug!("transfer to map {} ({}, {})", map_id, x, y);
    ctx.world
        .map
        .reserve_transfer(map_id, x, y, ins.int(4), ins.int(5));
    ctx.set_wait_mode(WaitMode::Transfer);
    true
}

fn set_vehicle_location(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let (map_id, x, y) = designated(ctx, ins.int(1) != 0, ins.int(2), ins.int(3), ins.int(4));
    match Vehicle::from_index(ins.int(0)) {
        Some(vehicle) => ctx.world.map.set_vehicle_location(vehicle, map_id, x, y),
        None => warn!("vehicle {} does not exist", ins.int(0)),
    }
    true
}

fn set_event_location(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let Some(character) = ctx.character(ins.int(0)) else {
        return true;
    };
    match ins.int(1) {
        0 => ctx.world.map.locate(character, ins.int(2), ins.int(3)),
        1 => {
            let (x, y) = (ctx.variable(ins.int(2)), ctx.variable(ins.int(3)));
            ctx.world.map.locate(character, x, y);
        }
        _ => {
            // Exchange positions with another character
            if let Some(other) = ctx.character(ins.int(2)) {
                let map = &mut *ctx.world.map;
                let (x, y) = (
                    map.character_info(character, CharacterInfo::X),
                    map.character_info(character, CharacterInfo::Y),
                );
                let (ox, oy) = (
                    map.character_info(other, CharacterInfo::X),
                    map.character_info(other, CharacterInfo::Y),
                );
                map.locate(other, x, y);
                map.locate(character, ox, oy);
            }
        }
    }
    if ins.int(4) > 0 {
        ctx.world.map.set_direction(character, ins.int(4));
    }
    true
}

fn scroll_map(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.in_battle() {
        return true;
    }
    if ctx.world.map.is_scrolling() {
        return false;
    }
    ctx.world
        .map
        .start_scroll(ins.int(0), ins.int(1), ins.int(2));
    if ins.flag(3) {
        ctx.set_wait_mode(WaitMode::Scroll);
    }
    true
}

fn set_movement_route(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if let Some(character) = ctx.character(ins.int(0)) {
        let route = ins.param(1);
        ctx.world.map.force_move_route(character, route);
        if route.field("wait").as_bool() {
            ctx.set_wait_mode(WaitMode::Route(character));
        }
    }
    true
}

fn get_on_off_vehicle(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.world.map.get_on_off_vehicle();
    true
}

fn change_transparency(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.map.set_transparent(ins.int(0) == 0);
    true
}

fn show_animation(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if let Some(character) = ctx.character(ins.int(0)) {
        ctx.world.map.request_animation(character, ins.int(1));
        if ins.flag(2) {
            ctx.set_wait_mode(WaitMode::Animation(character));
        }
    }
    true
}

fn show_balloon_icon(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if let Some(character) = ctx.character(ins.int(0)) {
        ctx.world.map.request_balloon(character, ins.int(1));
        if ins.flag(2) {
            ctx.set_wait_mode(WaitMode::Balloon(character));
        }
    }
    true
}

fn erase_event(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    let event_id = ctx.frame.event_id;
    if event_id > 0 && ctx.is_on_current_map() {
        ctx.world.map.erase_event(event_id);
    }
    true
}

fn change_player_followers(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.map.set_followers_visible(ins.int(0) == 0);
    true
}

fn gather_followers(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.world.map.gather_followers();
    ctx.set_wait_mode(WaitMode::Gather);
    true
}

fn change_map_name_display(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.state.system.map_name_display = ins.int(0) == 0;
    true
}

/// Holds the cursor until the tileset's images are loaded, then switches
fn change_tileset(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let database = ctx.world.database;
    let Some(tileset) = database.tileset(ins.int(0)) else {
        warn!("tileset {} does not exist", ins.int(0));
        return true;
    };
    for name in tileset.tileset_names.iter().filter(|n| !n.is_empty()) {
        ctx.world.images.request(ImageKind::Tileset, name, 0);
    }
    if !ctx.world.images.is_ready() {
        ctx.set_wait_mode(WaitMode::ImageLoad);
        return false;
    }
    ctx.world.map.change_tileset(ins.int(0));
    true
}

fn change_battle_background(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.map.change_battleback(ins.str(0), ins.str(1));
    true
}

fn change_parallax(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.map.change_parallax(
        ins.str(0),
        ins.flag(1),
        ins.flag(2),
        ins.int(3),
        ins.int(4),
    );
    true
}

fn get_location_info(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let (x, y) = match ins.int(2) {
        0 => (ins.int(3), ins.int(4)),
        1 => (ctx.variable(ins.int(3)), ctx.variable(ins.int(4))),
        _ => match ctx.character(ins.int(3)) {
            Some(character) => (
                ctx.world.map.character_info(character, CharacterInfo::X),
                ctx.world.map.character_info(character, CharacterInfo::Y),
            ),
            None => (0, 0),
        },
    };
    let value = ctx.world.map.location_info(ins.int(1), x, y);
    ctx.world.state.variables.set_value(ins.int(0), value.into());
    true
}
