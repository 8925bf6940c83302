//! The mutable context threaded through every command handler

use crate::runtime::collaborators::{
    BattleSystem, ImageService, InputState, MapSystem, MediaSystem, MessageSystem, SceneDriver,
    ScreenSystem,
};
use crate::runtime::database::Database;
use crate::runtime::expr::ExpressionEvaluator;
use crate::runtime::state::GameState;
use rand::RngCore;

/// Everything a handler may touch during one tick.
///
/// Built by the host right before `Interpreter::update` and dropped right
/// after, so the interpreter never holds on to a subsystem between ticks.
pub struct World<'a> {
    pub state: &'a mut GameState,
    pub database: &'a Database,
    pub message: &'a mut dyn MessageSystem,
    pub map: &'a mut dyn MapSystem,
    pub screen: &'a mut dyn ScreenSystem,
    pub media: &'a mut dyn MediaSystem,
    pub battle: &'a mut dyn BattleSystem,
    pub scene: &'a mut dyn SceneDriver,
    pub images: &'a mut dyn ImageService,
    pub input: &'a dyn InputState,
    pub evaluator: &'a dyn ExpressionEvaluator,
    pub rng: &'a mut dyn RngCore,
    /// Host frame counter, incremented once per tick
    pub frame_count: u64,
}

impl World<'_> {
    /// Whether the party is fighting
    pub fn in_battle(&self) -> bool {
        self.battle.in_battle()
    }
}
