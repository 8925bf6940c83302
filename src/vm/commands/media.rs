//! Audio and movie playback

use crate::runtime::state::AudioFile;
use crate::vm::dispatch::{CommandContext, CommandTable};
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;
use crate::vm::wait::WaitMode;

pub(super) fn register(table: &mut CommandTable) {
    table.register(EventCode::PlayBgm, play_bgm);
    table.register(EventCode::FadeoutBgm, fadeout_bgm);
    table.register(EventCode::SaveBgm, save_bgm);
    table.register(EventCode::ResumeBgm, resume_bgm);
    table.register(EventCode::PlayBgs, play_bgs);
    table.register(EventCode::FadeoutBgs, fadeout_bgs);
    table.register(EventCode::PlayMe, play_me);
    table.register(EventCode::PlaySe, play_se);
    table.register(EventCode::StopSe, stop_se);
    table.register(EventCode::PlayMovie, play_movie);
}

fn play_bgm(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.media.play_bgm(&AudioFile::from_value(ins.param(0)));
    true
}

fn fadeout_bgm(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.media.fade_out_bgm(ins.int(0));
    true
}

fn save_bgm(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.world.media.save_bgm();
    true
}

fn resume_bgm(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.world.media.replay_bgm();
    true
}

fn play_bgs(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.media.play_bgs(&AudioFile::from_value(ins.param(0)));
    true
}

fn fadeout_bgs(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.media.fade_out_bgs(ins.int(0));
    true
}

fn play_me(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.media.play_me(&AudioFile::from_value(ins.param(0)));
    true
}

fn play_se(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    ctx.world.media.play_se(&AudioFile::from_value(ins.param(0)));
    true
}

fn stop_se(
    ctx: &mut CommandContext<'_, '_>,
    _ins: &Instruction,
) -> bool {
    ctx.world.media.stop_se();
    true
}

fn play_movie(
    ctx: &mut CommandContext<'_, '_>,
    ins: &Instruction,
) -> bool {
    if ctx.world.message.is_busy() {
        return false;
    }
    let name = ins.str(0);
    if !name.is_empty() {
        ctx.world.media.play_movie(name);
        ctx.set_wait_mode(WaitMode::Video);
    }
    true
}
