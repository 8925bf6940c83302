//! Wait coordination
//!
//! A frame may be suspended by a frame countdown or by a wait mode. Each wait
//! mode maps to exactly one collaborator predicate and is polled every tick
//! until the predicate reports false. No mode can fail.

use crate::runtime::collaborators::CharacterId;
use crate::runtime::world::World;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Suspension reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaitMode {
    #[default]
    None,
    /// Message window busy
    Message,
    /// Player transfer pending
    Transfer,
    /// Map scrolling
    Scroll,
    /// Character executing a forced move route
    Route(CharacterId),
    /// Animation playing on a character
    Animation(CharacterId),
    /// Balloon icon playing on a character
    Balloon(CharacterId),
    /// Followers gathering
    Gather,
    /// Forced battle action pending
    Action,
    /// Movie playing
    Video,
    /// Images still loading
    ImageLoad,
}

impl WaitMode {
    /// Whether the collaborator behind this mode is still busy
    pub fn is_waiting(
        &self,
        world: &World<'_>,
    ) -> bool {
        match *self {
            WaitMode::None => false,
            WaitMode::Message => world.message.is_busy(),
            WaitMode::Transfer => world.map.is_transferring(),
            WaitMode::Scroll => world.map.is_scrolling(),
            WaitMode::Route(ch) => world.map.is_move_route_forcing(ch),
            WaitMode::Animation(ch) => world.map.is_animation_playing(ch),
            WaitMode::Balloon(ch) => world.map.is_balloon_playing(ch),
            WaitMode::Gather => world.map.are_followers_gathering(),
            WaitMode::Action => world.battle.is_action_forced(),
            WaitMode::Video => world.media.is_movie_playing(),
            WaitMode::ImageLoad => !world.images.is_ready(),
        }
    }
}

/// Frame countdown plus wait mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitCoordinator {
    counter: u32,
    mode: WaitMode,
}

impl WaitCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend for `frames` ticks
    pub fn wait(
        &mut self,
        frames: i64,
    ) {
        self.counter = frames.clamp(0, u32::MAX as i64) as u32;
    }

    pub fn set_mode(
        &mut self,
        mode: WaitMode,
    ) {
        self.mode = mode;
    }

    pub fn mode(&self) -> WaitMode {
        self.mode
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Poll the countdown, then the wait mode. Returns true while suspended.
    pub fn update(
        &mut self,
        world: &World<'_>,
    ) -> bool {
        if self.counter > 0 {
            self.counter -= 1;
            return true;
        }
        if self.mode == WaitMode::None {
            return false;
        }
        if self.mode.is_waiting(world) {
            trace!("waiting on {:?}", self.mode);
            return true;
        }
        self.mode = WaitMode::None;
        false
    }
}
