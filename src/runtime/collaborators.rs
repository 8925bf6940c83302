//! Collaborator interfaces
//!
//! The interpreter never owns a subsystem. It borrows each one through the
//! [`World`](crate::runtime::world::World) for the duration of a tick and talks
//! to it through the traits below.

use crate::runtime::state::AudioFile;
use crate::runtime::value::Value;
use serde::{Deserialize, Serialize};

/// A map character reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterId {
    Player,
    Event(u32),
}

/// Message window presentation settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageSettings {
    pub face_name: String,
    pub face_index: i64,
    pub background: i64,
    pub position: i64,
    pub speaker: String,
}

/// Choice window setup
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChoiceSettings {
    pub choices: Vec<String>,
    pub default_type: i64,
    /// Index of the cancel choice, -1 disallows cancel, -2 cancels to a branch
    pub cancel_type: i64,
    pub position: i64,
    pub background: i64,
}

/// Player input collected by the message system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageInput {
    /// Chosen index, or -2 for the cancel branch
    Choice(i64),
    Number(i64),
    /// Selected item id, 0 when cancelled
    Item(i64),
}

/// Message window
pub trait MessageSystem {
    /// Whether any message, choice or input is still on screen
    fn is_busy(&self) -> bool;
    fn has_text(&self) -> bool;
    fn begin(
        &mut self,
        settings: MessageSettings,
    );
    fn add(
        &mut self,
        line: &str,
    );
    fn set_scroll(
        &mut self,
        speed: i64,
        no_fast: bool,
    );
    fn set_choices(
        &mut self,
        settings: ChoiceSettings,
    );
    fn set_number_input(
        &mut self,
        digits: i64,
    );
    fn set_item_choice(
        &mut self,
        item_type: i64,
    );
    /// Take the input the player gave, if any
    fn take_input(&mut self) -> Option<MessageInput>;
}

/// Vehicle kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vehicle {
    Boat,
    Ship,
    Airship,
}

impl Vehicle {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Vehicle::Boat),
            1 => Some(Vehicle::Ship),
            2 => Some(Vehicle::Airship),
            _ => None,
        }
    }
}

/// Per-character readable attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterInfo {
    X,
    Y,
    Direction,
    ScreenX,
    ScreenY,
}

/// Map, characters and player
pub trait MapSystem {
    fn map_id(&self) -> u32;
    fn has_event(
        &self,
        event_id: u32,
    ) -> bool;
    fn is_scrolling(&self) -> bool;
    fn start_scroll(
        &mut self,
        direction: i64,
        distance: i64,
        speed: i64,
    );
    fn is_transferring(&self) -> bool;
    fn reserve_transfer(
        &mut self,
        map_id: i64,
        x: i64,
        y: i64,
        direction: i64,
        fade: i64,
    );
    fn set_vehicle_location(
        &mut self,
        vehicle: Vehicle,
        map_id: i64,
        x: i64,
        y: i64,
    );
    fn locate(
        &mut self,
        character: CharacterId,
        x: i64,
        y: i64,
    );
    fn set_direction(
        &mut self,
        character: CharacterId,
        direction: i64,
    );
    fn character_info(
        &self,
        character: CharacterId,
        info: CharacterInfo,
    ) -> i64;
    fn force_move_route(
        &mut self,
        character: CharacterId,
        route: &Value,
    );
    fn is_move_route_forcing(
        &self,
        character: CharacterId,
    ) -> bool;
    fn request_animation(
        &mut self,
        character: CharacterId,
        animation_id: i64,
    );
    fn is_animation_playing(
        &self,
        character: CharacterId,
    ) -> bool;
    fn request_balloon(
        &mut self,
        character: CharacterId,
        balloon_id: i64,
    );
    fn is_balloon_playing(
        &self,
        character: CharacterId,
    ) -> bool;
    fn erase_event(
        &mut self,
        event_id: u32,
    );
    fn get_on_off_vehicle(&mut self);
    /// Vehicle the player is riding
    fn player_vehicle(&self) -> Option<Vehicle>;
    fn set_vehicle_image(
        &mut self,
        vehicle: Vehicle,
        name: &str,
        index: i64,
    );
    fn set_transparent(
        &mut self,
        transparent: bool,
    );
    fn set_followers_visible(
        &mut self,
        visible: bool,
    );
    fn gather_followers(&mut self);
    fn are_followers_gathering(&self) -> bool;
    fn change_tileset(
        &mut self,
        tileset_id: i64,
    );
    fn change_battleback(
        &mut self,
        name1: &str,
        name2: &str,
    );
    fn change_parallax(
        &mut self,
        name: &str,
        loop_x: bool,
        loop_y: bool,
        sx: i64,
        sy: i64,
    );
    /// Tile query for Get Location Info (terrain tag, event id, layers, region)
    fn location_info(
        &self,
        info_type: i64,
        x: i64,
        y: i64,
    ) -> i64;
    /// Troop for a random encounter at the player's position, 0 if none
    fn encounter_troop_id(&self) -> i64;
    fn make_encounter_count(&mut self);
}

/// Screen effects and pictures
pub trait ScreenSystem {
    fn start_fade_out(
        &mut self,
        duration: i64,
    );
    fn start_fade_in(
        &mut self,
        duration: i64,
    );
    fn start_tint(
        &mut self,
        tone: [i64; 4],
        duration: i64,
    );
    fn start_flash(
        &mut self,
        color: [i64; 4],
        duration: i64,
    );
    fn start_shake(
        &mut self,
        power: i64,
        speed: i64,
        duration: i64,
    );
    fn change_weather(
        &mut self,
        kind: &str,
        power: i64,
        duration: i64,
    );
    fn show_picture(
        &mut self,
        picture: Picture,
    );
    fn move_picture(
        &mut self,
        picture: Picture,
        duration: i64,
        easing: i64,
    );
    fn rotate_picture(
        &mut self,
        picture_id: i64,
        speed: i64,
    );
    fn tint_picture(
        &mut self,
        picture_id: i64,
        tone: [i64; 4],
        duration: i64,
    );
    fn erase_picture(
        &mut self,
        picture_id: i64,
    );
}

/// Picture placement shared by Show Picture and Move Picture
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Picture {
    pub id: i64,
    /// Empty for Move Picture
    pub name: String,
    pub origin: i64,
    pub x: i64,
    pub y: i64,
    pub scale_x: i64,
    pub scale_y: i64,
    pub opacity: i64,
    pub blend_mode: i64,
}

/// Audio and video playback
pub trait MediaSystem {
    fn play_bgm(
        &mut self,
        audio: &AudioFile,
    );
    fn fade_out_bgm(
        &mut self,
        seconds: i64,
    );
    fn save_bgm(&mut self);
    fn replay_bgm(&mut self);
    fn play_bgs(
        &mut self,
        audio: &AudioFile,
    );
    fn fade_out_bgs(
        &mut self,
        seconds: i64,
    );
    fn play_me(
        &mut self,
        audio: &AudioFile,
    );
    fn play_se(
        &mut self,
        audio: &AudioFile,
    );
    fn stop_se(&mut self);
    fn play_movie(
        &mut self,
        name: &str,
    );
    fn is_movie_playing(&self) -> bool;
}

/// Battle outcome reported back to the event that started it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleResult {
    Win = 0,
    Escape = 1,
    Lose = 2,
}

/// Operation on a troop member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyOp {
    Hp { value: i64, allow_death: bool },
    Mp(i64),
    Tp(i64),
    AddState(i64),
    RemoveState(i64),
    RecoverAll,
    Appear,
    Transform(i64),
    Animation(i64),
}

/// Subject of a forced battle action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Battler {
    Enemy(i64),
    Actor(i64),
}

/// Battle manager
pub trait BattleSystem {
    fn in_battle(&self) -> bool;
    fn setup(
        &mut self,
        troop_id: i64,
        can_escape: bool,
        can_lose: bool,
    );
    fn abort(&mut self);
    fn force_action(
        &mut self,
        subject: Battler,
        skill_id: i64,
        target_index: i64,
    );
    fn is_action_forced(&self) -> bool;
    /// Apply an operation to the enemy at `index`; -1 targets the whole troop
    fn enemy_op(
        &mut self,
        index: i64,
        op: EnemyOp,
    );
    fn is_enemy_appeared(
        &self,
        index: i64,
    ) -> bool;
    fn enemy_has_state(
        &self,
        index: i64,
        state_id: i64,
    ) -> bool;
    /// Enemy attribute for variable operands: 0 hp, 1 mp, 2..=9 params, 10 tp
    fn enemy_param(
        &self,
        index: i64,
        param: i64,
    ) -> i64;
    fn take_result(&mut self) -> Option<BattleResult>;
}

/// Shop stock entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopGood {
    pub item_type: i64,
    pub item_id: i64,
    pub price_type: i64,
    pub price: i64,
}

/// Scene to push or switch to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneRequest {
    Battle,
    Shop {
        goods: Vec<ShopGood>,
        purchase_only: bool,
    },
    NameInput {
        actor_id: i64,
        max_length: i64,
    },
    Menu,
    Save,
    GameOver,
    Title,
}

/// Scene stack driver
pub trait SceneDriver {
    fn push(
        &mut self,
        scene: SceneRequest,
    );
    fn goto(
        &mut self,
        scene: SceneRequest,
    );
    fn is_scene_changing(&self) -> bool;
}

/// Image folders a prefetch request can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageKind {
    Face,
    Picture,
    Character,
    Battler,
    Tileset,
    Battleback1,
    Battleback2,
    Parallax,
}

/// Image loader with reservation support
pub trait ImageService {
    fn request(
        &mut self,
        kind: ImageKind,
        name: &str,
        reservation_id: u64,
    );
    fn is_ready(&self) -> bool;
}

/// Button state
pub trait InputState {
    fn is_pressed(
        &self,
        button: &str,
    ) -> bool;
}
