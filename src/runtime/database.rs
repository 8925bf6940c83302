//! Read-only content database
//!
//! Only the parts the interpreter resolves ids against: common events, troops,
//! tilesets, and the id ranges of actors, items, weapons and armors.

use crate::vm::instructions::{Instruction, Program};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A named, reusable instruction list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonEvent {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub list: Program,
}

impl CommonEvent {
    pub fn new(
        id: u32,
        name: &str,
        list: Vec<Instruction>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            list: Arc::from(list),
        }
    }
}

/// Tileset entry: the image files it needs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tileset {
    #[serde(default)]
    pub tileset_names: Vec<String>,
}

/// Content database
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Database {
    pub common_events: BTreeMap<u32, CommonEvent>,
    /// Troop ids that exist
    pub troops: Vec<u32>,
    pub tilesets: BTreeMap<u32, Tileset>,
    /// Highest valid actor id
    pub actor_count: u32,
    pub item_count: u32,
    pub weapon_count: u32,
    pub armor_count: u32,
    pub max_level: i64,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            common_events: BTreeMap::new(),
            troops: Vec::new(),
            tilesets: BTreeMap::new(),
            actor_count: 0,
            item_count: 0,
            weapon_count: 0,
            armor_count: 0,
            max_level: 99,
        }
    }
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a common event
    pub fn add_common_event(
        &mut self,
        event: CommonEvent,
    ) {
        self.common_events.insert(event.id, event);
    }

    pub fn common_event(
        &self,
        id: i64,
    ) -> Option<&CommonEvent> {
        u32::try_from(id)
            .ok()
            .and_then(|id| self.common_events.get(&id))
    }

    pub fn has_troop(
        &self,
        id: i64,
    ) -> bool {
        u32::try_from(id).map(|id| self.troops.contains(&id)).unwrap_or(false)
    }

    pub fn tileset(
        &self,
        id: i64,
    ) -> Option<&Tileset> {
        u32::try_from(id).ok().and_then(|id| self.tilesets.get(&id))
    }

    fn in_range(
        id: i64,
        count: u32,
    ) -> bool {
        id > 0 && id <= count as i64
    }

    pub fn has_actor(
        &self,
        id: i64,
    ) -> bool {
        Self::in_range(id, self.actor_count)
    }

    pub fn has_item(
        &self,
        id: i64,
    ) -> bool {
        Self::in_range(id, self.item_count)
    }

    pub fn has_weapon(
        &self,
        id: i64,
    ) -> bool {
        Self::in_range(id, self.weapon_count)
    }

    pub fn has_armor(
        &self,
        id: i64,
    ) -> bool {
        Self::in_range(id, self.armor_count)
    }
}
