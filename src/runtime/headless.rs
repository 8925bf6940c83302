//! Headless host
//!
//! In-memory collaborators that record what the interpreter asked of them and
//! settle every long-running operation on the next [`HeadlessHost::tick`]. Used
//! by the CLI to run content bundles without a game engine, and by tests.

use crate::runtime::collaborators::{
    BattleResult, BattleSystem, Battler, CharacterId, CharacterInfo, ChoiceSettings, EnemyOp,
    ImageKind, ImageService, InputState, MapSystem, MediaSystem, MessageInput, MessageSettings,
    MessageSystem, Picture, SceneDriver, SceneRequest, ScreenSystem, Vehicle,
};
use crate::runtime::database::Database;
use crate::runtime::expr::SandboxEvaluator;
use crate::runtime::state::{AudioFile, GameState};
use crate::runtime::value::Value;
use crate::runtime::world::World;
use crate::vm::errors::InterpreterResult;
use crate::vm::executor::Interpreter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::trace;

/// Input the message window is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    Choice { default: i64 },
    Number,
    Item,
}

/// Message window that closes on the next tick
#[derive(Debug, Default)]
pub struct HeadlessMessage {
    /// Every finished window, lines joined with `\n`
    pub pages: Vec<String>,
    /// Every choice window shown
    pub choices: Vec<ChoiceSettings>,
    /// Answers handed out in order; when empty the default is used
    pub scripted_inputs: VecDeque<MessageInput>,
    /// Keep reporting busy regardless of content
    pub force_busy: bool,
    current: Option<Vec<String>>,
    awaiting: Option<Awaiting>,
    input: Option<MessageInput>,
}

impl HeadlessMessage {
    fn tick(&mut self) {
        if let Some(lines) = self.current.take() {
            self.pages.push(lines.join("\n"));
        }
        if let Some(awaiting) = self.awaiting.take() {
            let default = match awaiting {
                Awaiting::Choice { default } => MessageInput::Choice(default),
                Awaiting::Number => MessageInput::Number(0),
                Awaiting::Item => MessageInput::Item(0),
            };
            self.input = Some(self.scripted_inputs.pop_front().unwrap_or(default));
        }
    }
}

impl MessageSystem for HeadlessMessage {
    fn is_busy(&self) -> bool {
        self.force_busy || self.current.is_some() || self.awaiting.is_some()
    }

    fn has_text(&self) -> bool {
        self.current.is_some()
    }

    fn begin(
        &mut self,
        _settings: MessageSettings,
    ) {
        self.current = Some(Vec::new());
    }

    fn add(
        &mut self,
        line: &str,
    ) {
        self.current.get_or_insert_with(Vec::new).push(line.to_string());
    }

    fn set_scroll(
        &mut self,
        _speed: i64,
        _no_fast: bool,
    ) {
        self.current = Some(Vec::new());
    }

    fn set_choices(
        &mut self,
        settings: ChoiceSettings,
    ) {
        self.awaiting = Some(Awaiting::Choice {
            default: settings.default_type,
        });
        self.choices.push(settings);
    }

    fn set_number_input(
        &mut self,
        _digits: i64,
    ) {
        self.awaiting = Some(Awaiting::Number);
    }

    fn set_item_choice(
        &mut self,
        _item_type: i64,
    ) {
        self.awaiting = Some(Awaiting::Item);
    }

    fn take_input(&mut self) -> Option<MessageInput> {
        self.input.take()
    }
}

/// A single map with a fixed set of events
#[derive(Debug)]
pub struct HeadlessMap {
    pub map_id: u32,
    pub events: BTreeSet<u32>,
    pub erased: Vec<u32>,
    /// Character positions and directions
    pub characters: HashMap<CharacterId, (i64, i64, i64)>,
    pub vehicle: Option<Vehicle>,
    pub encounter_troop: i64,
    pub tileset_id: i64,
    /// Every call that has no dedicated field, formatted for inspection
    pub log: Vec<String>,
    transfer: Option<u32>,
    scrolling: bool,
    gathering: bool,
    routes: HashSet<CharacterId>,
    animations: HashSet<CharacterId>,
    balloons: HashSet<CharacterId>,
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self {
            map_id: 1,
            events: BTreeSet::new(),
            erased: Vec::new(),
            characters: HashMap::new(),
            vehicle: None,
            encounter_troop: 0,
            tileset_id: 0,
            log: Vec::new(),
            transfer: None,
            scrolling: false,
            gathering: false,
            routes: HashSet::new(),
            animations: HashSet::new(),
            balloons: HashSet::new(),
        }
    }
}

impl HeadlessMap {
    fn tick(&mut self) {
        if let Some(map_id) = self.transfer.take() {
            self.map_id = map_id;
        }
        self.scrolling = false;
        self.gathering = false;
        self.routes.clear();
        self.animations.clear();
        self.balloons.clear();
    }
}

impl MapSystem for HeadlessMap {
    fn map_id(&self) -> u32 {
        self.map_id
    }

    fn has_event(
        &self,
        event_id: u32,
    ) -> bool {
        self.events.contains(&event_id) && !self.erased.contains(&event_id)
    }

    fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    fn start_scroll(
        &mut self,
        direction: i64,
        distance: i64,
        speed: i64,
    ) {
        self.log
            .push(format!("scroll {} {} {}", direction, distance, speed));
        self.scrolling = true;
    }

    fn is_transferring(&self) -> bool {
        self.transfer.is_some()
    }

    fn reserve_transfer(
        &mut self,
        map_id: i64,
        x: i64,
        y: i64,
        direction: i64,
        _fade: i64,
    ) {
        self.characters
            .insert(CharacterId::Player, (x, y, direction));
        self.transfer = Some(u32::try_from(map_id).unwrap_or(self.map_id));
    }

    fn set_vehicle_location(
        &mut self,
        vehicle: Vehicle,
        map_id: i64,
        x: i64,
        y: i64,
    ) {
        self.log
            .push(format!("vehicle {:?} at {} ({}, {})", vehicle, map_id, x, y));
    }

    fn locate(
        &mut self,
        character: CharacterId,
        x: i64,
        y: i64,
    ) {
        let entry = self.characters.entry(character).or_insert((0, 0, 2));
        entry.0 = x;
        entry.1 = y;
    }

    fn set_direction(
        &mut self,
        character: CharacterId,
        direction: i64,
    ) {
        self.characters.entry(character).or_insert((0, 0, 2)).2 = direction;
    }

    fn character_info(
        &self,
        character: CharacterId,
        info: CharacterInfo,
    ) -> i64 {
        let (x, y, direction) = self
            .characters
            .get(&character)
            .copied()
            .unwrap_or((0, 0, 2));
        match info {
            CharacterInfo::X => x,
            CharacterInfo::Y => y,
            CharacterInfo::Direction => direction,
            CharacterInfo::ScreenX => x * 48 + 24,
            CharacterInfo::ScreenY => y * 48 + 48,
        }
    }

    fn force_move_route(
        &mut self,
        character: CharacterId,
        route: &Value,
    ) {
        self.log.push(format!(
            "route {:?} ({} steps)",
            character,
            route.field("list").as_list().len()
        ));
        self.routes.insert(character);
    }

    fn is_move_route_forcing(
        &self,
        character: CharacterId,
    ) -> bool {
        self.routes.contains(&character)
    }

    fn request_animation(
        &mut self,
        character: CharacterId,
        animation_id: i64,
    ) {
        self.log
            .push(format!("animation {} on {:?}", animation_id, character));
        self.animations.insert(character);
    }

    fn is_animation_playing(
        &self,
        character: CharacterId,
    ) -> bool {
        self.animations.contains(&character)
    }

    fn request_balloon(
        &mut self,
        character: CharacterId,
        balloon_id: i64,
    ) {
        self.log
            .push(format!("balloon {} on {:?}", balloon_id, character));
        self.balloons.insert(character);
    }

    fn is_balloon_playing(
        &self,
        character: CharacterId,
    ) -> bool {
        self.balloons.contains(&character)
    }

    fn erase_event(
        &mut self,
        event_id: u32,
    ) {
        self.erased.push(event_id);
    }

    fn get_on_off_vehicle(&mut self) {
        self.vehicle = match self.vehicle {
            Some(_) => None,
            None => Some(Vehicle::Boat),
        };
    }

    fn player_vehicle(&self) -> Option<Vehicle> {
        self.vehicle
    }

    fn set_vehicle_image(
        &mut self,
        vehicle: Vehicle,
        name: &str,
        index: i64,
    ) {
        self.log
            .push(format!("vehicle image {:?} {} {}", vehicle, name, index));
    }

    fn set_transparent(
        &mut self,
        transparent: bool,
    ) {
        self.log.push(format!("transparent {}", transparent));
    }

    fn set_followers_visible(
        &mut self,
        visible: bool,
    ) {
        self.log.push(format!("followers {}", visible));
    }

    fn gather_followers(&mut self) {
        self.gathering = true;
    }

    fn are_followers_gathering(&self) -> bool {
        self.gathering
    }

    fn change_tileset(
        &mut self,
        tileset_id: i64,
    ) {
        self.tileset_id = tileset_id;
    }

    fn change_battleback(
        &mut self,
        name1: &str,
        name2: &str,
    ) {
        self.log.push(format!("battleback {} {}", name1, name2));
    }

    fn change_parallax(
        &mut self,
        name: &str,
        _loop_x: bool,
        _loop_y: bool,
        _sx: i64,
        _sy: i64,
    ) {
        self.log.push(format!("parallax {}", name));
    }

    fn location_info(
        &self,
        _info_type: i64,
        _x: i64,
        _y: i64,
    ) -> i64 {
        0
    }

    fn encounter_troop_id(&self) -> i64 {
        self.encounter_troop
    }

    fn make_encounter_count(&mut self) {}
}

/// Screen that only records
#[derive(Debug, Default)]
pub struct HeadlessScreen {
    pub log: Vec<String>,
    pub pictures: HashMap<i64, Picture>,
}

impl ScreenSystem for HeadlessScreen {
    fn start_fade_out(
        &mut self,
        duration: i64,
    ) {
        self.log.push(format!("fade out {}", duration));
    }

    fn start_fade_in(
        &mut self,
        duration: i64,
    ) {
        self.log.push(format!("fade in {}", duration));
    }

    fn start_tint(
        &mut self,
        tone: [i64; 4],
        duration: i64,
    ) {
        self.log.push(format!("tint {:?} {}", tone, duration));
    }

    fn start_flash(
        &mut self,
        color: [i64; 4],
        duration: i64,
    ) {
        self.log.push(format!("flash {:?} {}", color, duration));
    }

    fn start_shake(
        &mut self,
        power: i64,
        speed: i64,
        duration: i64,
    ) {
        self.log
            .push(format!("shake {} {} {}", power, speed, duration));
    }

    fn change_weather(
        &mut self,
        kind: &str,
        power: i64,
        duration: i64,
    ) {
        self.log
            .push(format!("weather {} {} {}", kind, power, duration));
    }

    fn show_picture(
        &mut self,
        picture: Picture,
    ) {
        self.pictures.insert(picture.id, picture);
    }

    fn move_picture(
        &mut self,
        picture: Picture,
        duration: i64,
        _easing: i64,
    ) {
        self.log
            .push(format!("move picture {} over {}", picture.id, duration));
        if let Some(current) = self.pictures.get_mut(&picture.id) {
            current.x = picture.x;
            current.y = picture.y;
            current.scale_x = picture.scale_x;
            current.scale_y = picture.scale_y;
            current.opacity = picture.opacity;
        }
    }

    fn rotate_picture(
        &mut self,
        picture_id: i64,
        speed: i64,
    ) {
        self.log
            .push(format!("rotate picture {} {}", picture_id, speed));
    }

    fn tint_picture(
        &mut self,
        picture_id: i64,
        tone: [i64; 4],
        duration: i64,
    ) {
        self.log
            .push(format!("tint picture {} {:?} {}", picture_id, tone, duration));
    }

    fn erase_picture(
        &mut self,
        picture_id: i64,
    ) {
        self.pictures.remove(&picture_id);
    }
}

/// Audio that only records
#[derive(Debug, Default)]
pub struct HeadlessMedia {
    pub log: Vec<String>,
    pub bgm: Option<AudioFile>,
    saved_bgm: Option<AudioFile>,
    movie: bool,
}

impl MediaSystem for HeadlessMedia {
    fn play_bgm(
        &mut self,
        audio: &AudioFile,
    ) {
        self.bgm = Some(audio.clone());
    }

    fn fade_out_bgm(
        &mut self,
        _seconds: i64,
    ) {
        self.bgm = None;
    }

    fn save_bgm(&mut self) {
        self.saved_bgm = self.bgm.clone();
    }

    fn replay_bgm(&mut self) {
        self.bgm = self.saved_bgm.clone();
    }

    fn play_bgs(
        &mut self,
        audio: &AudioFile,
    ) {
        self.log.push(format!("bgs {}", audio.name));
    }

    fn fade_out_bgs(
        &mut self,
        seconds: i64,
    ) {
        self.log.push(format!("fade bgs {}", seconds));
    }

    fn play_me(
        &mut self,
        audio: &AudioFile,
    ) {
        self.log.push(format!("me {}", audio.name));
    }

    fn play_se(
        &mut self,
        audio: &AudioFile,
    ) {
        self.log.push(format!("se {}", audio.name));
    }

    fn stop_se(&mut self) {
        self.log.push("stop se".to_string());
    }

    fn play_movie(
        &mut self,
        name: &str,
    ) {
        self.log.push(format!("movie {}", name));
        self.movie = true;
    }

    fn is_movie_playing(&self) -> bool {
        self.movie
    }
}

/// Battles end on the next tick with a preset result
#[derive(Debug)]
pub struct HeadlessBattle {
    pub in_battle: bool,
    pub troop_id: i64,
    /// Result reported when the current battle ends
    pub outcome: BattleResult,
    pub log: Vec<String>,
    result: Option<BattleResult>,
    action_forced: bool,
}

impl Default for HeadlessBattle {
    fn default() -> Self {
        Self {
            in_battle: false,
            troop_id: 0,
            outcome: BattleResult::Win,
            log: Vec::new(),
            result: None,
            action_forced: false,
        }
    }
}

impl HeadlessBattle {
    fn tick(&mut self) {
        self.action_forced = false;
        if self.in_battle && self.troop_id > 0 {
            self.in_battle = false;
            self.troop_id = 0;
            self.result = Some(self.outcome);
        }
    }
}

impl BattleSystem for HeadlessBattle {
    fn in_battle(&self) -> bool {
        self.in_battle
    }

    fn setup(
        &mut self,
        troop_id: i64,
        _can_escape: bool,
        _can_lose: bool,
    ) {
        self.troop_id = troop_id;
        self.in_battle = true;
    }

    fn abort(&mut self) {
        self.log.push("abort".to_string());
        self.result = Some(BattleResult::Escape);
        self.in_battle = false;
        self.troop_id = 0;
    }

    fn force_action(
        &mut self,
        subject: Battler,
        skill_id: i64,
        target_index: i64,
    ) {
        self.log.push(format!(
            "force {:?} skill {} on {}",
            subject, skill_id, target_index
        ));
        self.action_forced = true;
    }

    fn is_action_forced(&self) -> bool {
        self.action_forced
    }

    fn enemy_op(
        &mut self,
        index: i64,
        op: EnemyOp,
    ) {
        self.log.push(format!("enemy {} {:?}", index, op));
    }

    fn is_enemy_appeared(
        &self,
        _index: i64,
    ) -> bool {
        self.in_battle
    }

    fn enemy_has_state(
        &self,
        _index: i64,
        _state_id: i64,
    ) -> bool {
        false
    }

    fn enemy_param(
        &self,
        _index: i64,
        _param: i64,
    ) -> i64 {
        0
    }

    fn take_result(&mut self) -> Option<BattleResult> {
        self.result.take()
    }
}

/// Scene stack whose transitions finish on the next tick
#[derive(Debug, Default)]
pub struct HeadlessScene {
    pub pushed: Vec<SceneRequest>,
    pub current: Option<SceneRequest>,
    changing: bool,
}

impl SceneDriver for HeadlessScene {
    fn push(
        &mut self,
        scene: SceneRequest,
    ) {
        self.pushed.push(scene);
        self.changing = true;
    }

    fn goto(
        &mut self,
        scene: SceneRequest,
    ) {
        self.current = Some(scene);
        self.changing = true;
    }

    fn is_scene_changing(&self) -> bool {
        self.changing
    }
}

/// Image loader that finishes every request on the next tick
#[derive(Debug, Default)]
pub struct HeadlessImages {
    /// Every request, in order
    pub requested: Vec<(ImageKind, String, u64)>,
    loading: Vec<(ImageKind, String)>,
    loaded: HashSet<(ImageKind, String)>,
}

impl HeadlessImages {
    fn tick(&mut self) {
        self.loaded.extend(self.loading.drain(..));
    }
}

impl ImageService for HeadlessImages {
    fn request(
        &mut self,
        kind: ImageKind,
        name: &str,
        reservation_id: u64,
    ) {
        self.requested
            .push((kind, name.to_string(), reservation_id));
        let key = (kind, name.to_string());
        if !self.loaded.contains(&key) {
            self.loading.push(key);
        }
    }

    fn is_ready(&self) -> bool {
        self.loading.is_empty()
    }
}

/// Buttons held down for the whole run
#[derive(Debug, Default)]
pub struct HeadlessInput {
    pub pressed: HashSet<String>,
}

impl InputState for HeadlessInput {
    fn is_pressed(
        &self,
        button: &str,
    ) -> bool {
        self.pressed.contains(button)
    }
}

/// Owns one of every collaborator plus game state
pub struct HeadlessHost {
    pub state: GameState,
    pub database: Database,
    pub message: HeadlessMessage,
    pub map: HeadlessMap,
    pub screen: HeadlessScreen,
    pub media: HeadlessMedia,
    pub battle: HeadlessBattle,
    pub scene: HeadlessScene,
    pub images: HeadlessImages,
    pub input: HeadlessInput,
    pub evaluator: SandboxEvaluator,
    pub rng: StdRng,
    pub frame_count: u64,
    /// While set, map, battle and movie operations stay pending across ticks
    pub hold: bool,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new(Database::default())
    }
}

impl HeadlessHost {
    pub fn new(database: Database) -> Self {
        Self::with_seed(database, 0)
    }

    /// Host with a fixed random seed
    pub fn with_seed(
        database: Database,
        seed: u64,
    ) -> Self {
        Self {
            state: GameState::default(),
            database,
            message: HeadlessMessage::default(),
            map: HeadlessMap::default(),
            screen: HeadlessScreen::default(),
            media: HeadlessMedia::default(),
            battle: HeadlessBattle::default(),
            scene: HeadlessScene::default(),
            images: HeadlessImages::default(),
            input: HeadlessInput::default(),
            evaluator: SandboxEvaluator,
            rng: StdRng::seed_from_u64(seed),
            frame_count: 0,
            hold: false,
        }
    }

    /// Borrow everything as a [`World`] for one interpreter update
    pub fn world(&mut self) -> World<'_> {
        World {
            state: &mut self.state,
            database: &self.database,
            message: &mut self.message,
            map: &mut self.map,
            screen: &mut self.screen,
            media: &mut self.media,
            battle: &mut self.battle,
            scene: &mut self.scene,
            images: &mut self.images,
            input: &self.input,
            evaluator: &self.evaluator,
            rng: &mut self.rng,
            frame_count: self.frame_count,
        }
    }

    /// End the host frame: settle pending operations and advance the counter
    pub fn tick(&mut self) {
        self.message.tick();
        if !self.hold {
            self.map.tick();
            self.battle.tick();
            self.media.movie = false;
        }
        self.scene.changing = false;
        self.images.tick();
        if self.state.timer.working && self.state.timer.frames > 0 {
            self.state.timer.frames -= 1;
        }
        self.frame_count += 1;
    }

    /// Update `interpreter` once per tick until it stops or `max_ticks` pass.
    /// Returns the number of ticks used.
    pub fn run(
        &mut self,
        interpreter: &mut Interpreter,
        max_ticks: usize,
    ) -> InterpreterResult<usize> {
        let mut ticks = 0;
        while interpreter.is_running() && ticks < max_ticks {
            interpreter.update(&mut self.world())?;
            self.tick();
            ticks += 1;
        }
        trace!("headless run finished after {} ticks", ticks);
        Ok(ticks)
    }
}
