//! Persistent game-state containers
//!
//! Plain data only: everything here serialises with serde so a save system can
//! store it next to an in-flight interpreter.

use crate::runtime::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of basic parameters (mhp, mmp, atk, def, mat, mdf, agi, luk)
pub const PARAM_COUNT: usize = 8;

/// Kind of inventory item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Item,
    Weapon,
    Armor,
}

/// Audio file reference as stored in content (`{name, volume, pitch, pan}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AudioFile {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_volume")]
    pub volume: i64,
    #[serde(default = "default_pitch")]
    pub pitch: i64,
    #[serde(default)]
    pub pan: i64,
}

fn default_volume() -> i64 {
    90
}

fn default_pitch() -> i64 {
    100
}

impl AudioFile {
    /// Read an audio record out of an operand, tolerating missing fields
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: value.field("name").as_str().to_string(),
            volume: match value.field("volume") {
                Value::Null => default_volume(),
                v => v.as_int(),
            },
            pitch: match value.field("pitch") {
                Value::Null => default_pitch(),
                v => v.as_int(),
            },
            pan: value.field("pan").as_int(),
        }
    }
}

/// Switch store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Switches {
    data: BTreeMap<i64, bool>,
}

impl Switches {
    pub fn value(
        &self,
        id: i64,
    ) -> bool {
        self.data.get(&id).copied().unwrap_or(false)
    }

    pub fn set_value(
        &mut self,
        id: i64,
        value: bool,
    ) {
        if id > 0 {
            self.data.insert(id, value);
        }
    }
}

/// Variable store. Numeric writes are floored to integers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Variables {
    data: BTreeMap<i64, Value>,
}

impl Variables {
    pub fn value(
        &self,
        id: i64,
    ) -> Value {
        self.data.get(&id).cloned().unwrap_or(Value::Int(0))
    }

    /// Integer view of a variable
    pub fn int(
        &self,
        id: i64,
    ) -> i64 {
        self.value(id).as_int()
    }

    pub fn set_value(
        &mut self,
        id: i64,
        value: Value,
    ) {
        if id > 0 {
            self.data.insert(id, value.normalized());
        }
    }
}

/// Self switches, keyed by `"map,event,letter"`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelfSwitches {
    data: BTreeMap<String, bool>,
}

impl SelfSwitches {
    fn key(
        map_id: u32,
        event_id: u32,
        letter: &str,
    ) -> String {
        format!("{},{},{}", map_id, event_id, letter)
    }

    pub fn value(
        &self,
        map_id: u32,
        event_id: u32,
        letter: &str,
    ) -> bool {
        self.data
            .get(&Self::key(map_id, event_id, letter))
            .copied()
            .unwrap_or(false)
    }

    pub fn set_value(
        &mut self,
        map_id: u32,
        event_id: u32,
        letter: &str,
        value: bool,
    ) {
        self.data.insert(Self::key(map_id, event_id, letter), value);
    }
}

/// Countdown timer. The host decrements `frames` while working.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timer {
    pub working: bool,
    pub frames: i64,
}

impl Timer {
    pub fn start(
        &mut self,
        frames: i64,
    ) {
        self.frames = frames;
        self.working = true;
    }

    pub fn stop(&mut self) {
        self.working = false;
    }

    pub fn seconds(&self) -> i64 {
        self.frames / 60
    }
}

/// An actor's mutable state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default = "default_level")]
    pub level: i64,
    #[serde(default)]
    pub exp: i64,
    #[serde(default)]
    pub class_id: i64,
    #[serde(default)]
    pub hp: i64,
    #[serde(default)]
    pub mp: i64,
    #[serde(default)]
    pub tp: i64,
    /// Base parameters (mhp, mmp, atk, def, mat, mdf, agi, luk)
    #[serde(default = "default_params")]
    pub params: [i64; PARAM_COUNT],
    /// Parameter bonuses from event commands
    #[serde(default)]
    pub param_plus: [i64; PARAM_COUNT],
    #[serde(default)]
    pub states: Vec<i64>,
    #[serde(default)]
    pub skills: Vec<i64>,
    /// Equipped item id per equipment slot (0 = empty)
    #[serde(default)]
    pub equips: Vec<i64>,
    #[serde(default)]
    pub character_image: (String, i64),
    #[serde(default)]
    pub face_image: (String, i64),
    #[serde(default)]
    pub battler_image: String,
}

fn default_level() -> i64 {
    1
}

fn default_params() -> [i64; PARAM_COUNT] {
    [100, 10, 10, 10, 10, 10, 10, 10]
}

/// State id conventionally meaning "knocked out"
pub const DEATH_STATE_ID: i64 = 1;

impl Actor {
    /// Create an actor at full health
    pub fn new(
        id: u32,
        name: &str,
    ) -> Self {
        let params = default_params();
        Self {
            id,
            name: name.to_string(),
            nickname: String::new(),
            profile: String::new(),
            level: 1,
            exp: 0,
            class_id: 1,
            hp: params[0],
            mp: params[1],
            tp: 0,
            params,
            param_plus: [0; PARAM_COUNT],
            states: Vec::new(),
            skills: Vec::new(),
            equips: Vec::new(),
            character_image: (String::new(), 0),
            face_image: (String::new(), 0),
            battler_image: String::new(),
        }
    }

    /// Effective parameter value
    pub fn param(
        &self,
        index: usize,
    ) -> i64 {
        match (self.params.get(index), self.param_plus.get(index)) {
            (Some(base), Some(plus)) => {
                base.saturating_add(*plus).max(if index < 2 { 1 } else { 0 })
            }
            _ => 0,
        }
    }

    pub fn mhp(&self) -> i64 {
        self.param(0)
    }

    pub fn mmp(&self) -> i64 {
        self.param(1)
    }

    pub fn is_dead(&self) -> bool {
        self.states.contains(&DEATH_STATE_ID)
    }

    pub fn has_state(
        &self,
        state_id: i64,
    ) -> bool {
        self.states.contains(&state_id)
    }

    pub fn add_state(
        &mut self,
        state_id: i64,
    ) {
        if !self.has_state(state_id) {
            self.states.push(state_id);
        }
        if state_id == DEATH_STATE_ID {
            self.hp = 0;
        }
    }

    pub fn remove_state(
        &mut self,
        state_id: i64,
    ) {
        self.states.retain(|s| *s != state_id);
        if state_id == DEATH_STATE_ID && self.hp == 0 {
            self.hp = 1;
        }
    }

    /// Change HP; without `allow_death` the actor keeps at least 1 HP
    pub fn gain_hp(
        &mut self,
        value: i64,
        allow_death: bool,
    ) {
        if self.is_dead() {
            return;
        }
        let floor = if allow_death { 0 } else { 1 };
        let mut hp = self.hp.saturating_add(value).clamp(0, self.mhp());
        if value < 0 && hp < floor {
            hp = floor;
        }
        self.hp = hp;
        if self.hp == 0 {
            self.add_state(DEATH_STATE_ID);
        }
    }

    pub fn gain_mp(
        &mut self,
        value: i64,
    ) {
        self.mp = self.mp.saturating_add(value).clamp(0, self.mmp());
    }

    pub fn gain_tp(
        &mut self,
        value: i64,
    ) {
        self.tp = self.tp.saturating_add(value).clamp(0, 100);
    }

    pub fn recover_all(&mut self) {
        self.states.clear();
        self.hp = self.mhp();
        self.mp = self.mmp();
    }

    pub fn has_skill(
        &self,
        skill_id: i64,
    ) -> bool {
        self.skills.contains(&skill_id)
    }

    pub fn learn_skill(
        &mut self,
        skill_id: i64,
    ) {
        if !self.has_skill(skill_id) {
            self.skills.push(skill_id);
            self.skills.sort_unstable();
        }
    }

    pub fn forget_skill(
        &mut self,
        skill_id: i64,
    ) {
        self.skills.retain(|s| *s != skill_id);
    }

    /// Experience needed to reach `level`
    pub fn exp_for_level(level: i64) -> i64 {
        let n = level.saturating_sub(1).max(0);
        n.saturating_mul(n)
            .saturating_mul(10)
            .saturating_add(n.saturating_mul(20))
    }

    /// Set total experience, adjusting level to match
    pub fn change_exp(
        &mut self,
        exp: i64,
        max_level: i64,
    ) {
        self.exp = exp.max(0);
        while self.level < max_level && self.exp >= Self::exp_for_level(self.level + 1) {
            self.level += 1;
        }
        while self.level > 1 && self.exp < Self::exp_for_level(self.level) {
            self.level -= 1;
        }
    }

    pub fn change_level(
        &mut self,
        level: i64,
        max_level: i64,
    ) {
        self.level = level.clamp(1, max_level);
        self.exp = Self::exp_for_level(self.level);
    }

    pub fn has_equip(
        &self,
        item_id: i64,
    ) -> bool {
        item_id > 0 && self.equips.contains(&item_id)
    }

    pub fn change_equip(
        &mut self,
        slot: usize,
        item_id: i64,
    ) {
        if slot >= self.equips.len() {
            self.equips.resize(slot + 1, 0);
        }
        self.equips[slot] = item_id;
    }
}

/// Party: members, gold and inventory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Party {
    pub members: Vec<u32>,
    pub gold: i64,
    pub steps: i64,
    pub items: BTreeMap<i64, i64>,
    pub weapons: BTreeMap<i64, i64>,
    pub armors: BTreeMap<i64, i64>,
}

/// Maximum gold the party can carry
pub const MAX_GOLD: i64 = 99_999_999;
/// Maximum stack of a single item
pub const MAX_ITEMS: i64 = 99;

impl Party {
    fn container(
        &self,
        kind: ItemKind,
    ) -> &BTreeMap<i64, i64> {
        match kind {
            ItemKind::Item => &self.items,
            ItemKind::Weapon => &self.weapons,
            ItemKind::Armor => &self.armors,
        }
    }

    fn container_mut(
        &mut self,
        kind: ItemKind,
    ) -> &mut BTreeMap<i64, i64> {
        match kind {
            ItemKind::Item => &mut self.items,
            ItemKind::Weapon => &mut self.weapons,
            ItemKind::Armor => &mut self.armors,
        }
    }

    pub fn num_items(
        &self,
        kind: ItemKind,
        id: i64,
    ) -> i64 {
        self.container(kind).get(&id).copied().unwrap_or(0)
    }

    pub fn gain_item(
        &mut self,
        kind: ItemKind,
        id: i64,
        amount: i64,
    ) {
        let count = self.num_items(kind, id).saturating_add(amount).clamp(0, MAX_ITEMS);
        let container = self.container_mut(kind);
        if count == 0 {
            container.remove(&id);
        } else {
            container.insert(id, count);
        }
    }

    pub fn gain_gold(
        &mut self,
        amount: i64,
    ) {
        self.gold = self.gold.saturating_add(amount).clamp(0, MAX_GOLD);
    }

    pub fn add_actor(
        &mut self,
        actor_id: u32,
    ) {
        if !self.members.contains(&actor_id) {
            self.members.push(actor_id);
        }
    }

    pub fn remove_actor(
        &mut self,
        actor_id: u32,
    ) {
        self.members.retain(|a| *a != actor_id);
    }
}

/// System-wide toggles and settings driven by events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemFlags {
    pub save_enabled: bool,
    pub menu_enabled: bool,
    pub encounter_enabled: bool,
    pub formation_enabled: bool,
    pub map_name_display: bool,
    pub window_tone: [i64; 4],
    pub battle_bgm: Option<AudioFile>,
    pub victory_me: Option<AudioFile>,
    pub defeat_me: Option<AudioFile>,
    pub vehicle_bgm: BTreeMap<i64, AudioFile>,
    pub save_count: i64,
    pub battle_count: i64,
    pub win_count: i64,
    pub escape_count: i64,
    pub playtime_seconds: i64,
}

impl Default for SystemFlags {
    fn default() -> Self {
        Self {
            save_enabled: true,
            menu_enabled: true,
            encounter_enabled: true,
            formation_enabled: true,
            map_name_display: true,
            window_tone: [0; 4],
            battle_bgm: None,
            victory_me: None,
            defeat_me: None,
            vehicle_bgm: BTreeMap::new(),
            save_count: 0,
            battle_count: 0,
            win_count: 0,
            escape_count: 0,
            playtime_seconds: 0,
        }
    }
}

/// Aggregate of all game-state containers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub switches: Switches,
    pub variables: Variables,
    pub self_switches: SelfSwitches,
    pub timer: Timer,
    pub party: Party,
    pub actors: BTreeMap<u32, Actor>,
    pub system: SystemFlags,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor(
        &self,
        id: u32,
    ) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn actor_mut(
        &mut self,
        id: u32,
    ) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Actor id of the party member at `index`
    pub fn member_id(
        &self,
        index: usize,
    ) -> i64 {
        self.party.members.get(index).map(|id| *id as i64).unwrap_or(0)
    }

    /// Count of an item including equipped copies across the party
    pub fn item_count_with_equips(
        &self,
        kind: ItemKind,
        id: i64,
    ) -> i64 {
        let held = self.party.num_items(kind, id);
        if kind == ItemKind::Item {
            return held;
        }
        let equipped = self
            .party
            .members
            .iter()
            .filter_map(|m| self.actors.get(m))
            .map(|a| a.equips.iter().filter(|e| **e == id).count() as i64)
            .sum::<i64>();
        held + equipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_floor_numbers() {
        let mut vars = Variables::default();
        vars.set_value(3, Value::Float(7.8));
        assert_eq!(vars.value(3), Value::Int(7));
        assert_eq!(vars.int(99), 0);
        vars.set_value(0, Value::Int(5));
        assert_eq!(vars.int(0), 0);
    }

    #[test]
    fn test_actor_hp_without_death() {
        let mut actor = Actor::new(1, "Reid");
        actor.gain_hp(-1000, false);
        assert_eq!(actor.hp, 1);
        assert!(!actor.is_dead());
        actor.gain_hp(-1000, true);
        assert_eq!(actor.hp, 0);
        assert!(actor.is_dead());
        actor.recover_all();
        assert_eq!(actor.hp, actor.mhp());
    }

    #[test]
    fn test_exp_level_roundtrip() {
        let mut actor = Actor::new(1, "Priscilla");
        actor.change_level(5, 99);
        assert_eq!(actor.exp, Actor::exp_for_level(5));
        actor.change_exp(Actor::exp_for_level(7) + 1, 99);
        assert_eq!(actor.level, 7);
        actor.change_exp(0, 99);
        assert_eq!(actor.level, 1);
    }

    #[test]
    fn test_party_inventory_clamps() {
        let mut party = Party::default();
        party.gain_item(ItemKind::Item, 1, 150);
        assert_eq!(party.num_items(ItemKind::Item, 1), MAX_ITEMS);
        party.gain_item(ItemKind::Item, 1, -200);
        assert_eq!(party.num_items(ItemKind::Item, 1), 0);
        party.gain_gold(-5);
        assert_eq!(party.gold, 0);
    }

    #[test]
    fn test_gains_saturate_at_extremes() {
        let mut party = Party::default();
        party.gain_gold(10);
        party.gain_gold(i64::MAX);
        assert_eq!(party.gold, MAX_GOLD);
        party.gain_gold(i64::MIN);
        assert_eq!(party.gold, 0);
        party.gain_item(ItemKind::Item, 1, 5);
        party.gain_item(ItemKind::Item, 1, i64::MAX);
        assert_eq!(party.num_items(ItemKind::Item, 1), MAX_ITEMS);

        let mut actor = Actor::new(1, "Reid");
        actor.gain_hp(-1, false);
        actor.gain_hp(i64::MAX, false);
        assert_eq!(actor.hp, actor.mhp());
        actor.gain_hp(i64::MIN, true);
        assert_eq!(actor.hp, 0);
        actor.recover_all();
        actor.gain_mp(i64::MAX);
        assert_eq!(actor.mp, actor.mmp());
        actor.gain_tp(i64::MAX);
        assert_eq!(actor.tp, 100);
        assert_eq!(Actor::exp_for_level(i64::MAX), i64::MAX);
    }
}
