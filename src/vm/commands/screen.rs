//! Screen effects, pictures and plain waits

use super::tone;
use crate::runtime::collaborators::Picture;
use crate::vm::dispatch::{CommandContext, CommandTable};
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;

pub(super) fn register(table: &mut CommandTable) {
    table.register(EventCode::FadeoutScreen, fadeout_screen);
    table.register(EventCode::FadeinScreen, fadein_screen);
    table.register(EventCode::TintScreen, tint_screen);
    table.register(EventCode::FlashScreen, flash_screen);
    table.register(EventCode::ShakeScreen, shake_screen);
    table.register(EventCode::Wait, wait);
    table.register(EventCode::ShowPicture, show_picture);
    table.register(EventCode::MovePicture, move_picture);
    table.register(EventCode::RotatePicture, rotate_picture);
    table.register(EventCode::TintPicture, tint_picture);
    table.register(EventCode::ErasePicture, erase_picture);
    table.register(EventCode::SetWeatherEffect, set_weather_effect);
}

fn fadeout_screen(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    if ctx.world.message.is_busy() {
        return false;
    }
    let speed = ctx.config.fade_speed;
    ctx.world.screen.start_fade_out(speed);
    ctx.wait(speed);
    true
}

fn fadein_screen(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    if ctx.world.message.is_busy() {
        return false;
    }
    let speed = ctx.config.fade_speed;
    ctx.world.screen.start_fade_in(speed);
    ctx.wait(speed);
    true
}

fn tint_screen(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.screen.start_tint(tone(ins.param(0)), ins.int(1));
    if ins.flag(2) {
        ctx.wait(ins.int(1));
    }
    true
}

fn flash_screen(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.screen.start_flash(tone(ins.param(0)), ins.int(1));
    if ins.flag(2) {
        ctx.wait(ins.int(1));
    }
    true
}

fn shake_screen(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world
        .screen
        .start_shake(ins.int(0), ins.int(1), ins.int(2));
    if ins.flag(3) {
        ctx.wait(ins.int(2));
    }
    true
}

fn wait(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.wait(ins.int(0));
    true
}

/// Picture placement from operands 2..=9: origin, designation, x, y, scale, opacity, blend
fn picture(
    ctx: &CommandContext<'_, '_>,
    ins: &Instruction,
) -> Picture {
    let (x, y) = if ins.int(3) == 0 {
        (ins.int(4), ins.int(5))
    } else {
        (ctx.variable(ins.int(4)), ctx.variable(ins.int(5)))
    };
    Picture {
        id: ins.int(0),
        name: ins.str(1).to_string(),
        origin: ins.int(2),
        x,
        y,
        scale_x: ins.int(6),
        scale_y: ins.int(7),
        opacity: ins.int(8),
        blend_mode: ins.int(9),
    }
}

fn show_picture(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let picture = picture(ctx, ins);
    ctx.world.screen.show_picture(picture);
    true
}

fn move_picture(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    let mut target = picture(ctx, ins);
    target.name.clear();
    let duration = ins.int(10);
    ctx.world
        .screen
        .move_picture(target, duration, ins.int(12));
    if ins.flag(11) {
        ctx.wait(duration);
    }
    true
}

fn rotate_picture(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.screen.rotate_picture(ins.int(0), ins.int(1));
    true
}

fn tint_picture(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world
        .screen
        .tint_picture(ins.int(0), tone(ins.param(1)), ins.int(2));
    if ins.flag(3) {
        ctx.wait(ins.int(2));
    }
    true
}

fn erase_picture(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.screen.erase_picture(ins.int(0));
    true
}

fn set_weather_effect(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.in_battle() {
        return true;
    }
    ctx.world
        .screen
        .change_weather(ins.str(0), ins.int(1), ins.int(2));
    if ins.flag(3) {
        ctx.wait(ins.int(2));
    }
    true
}
