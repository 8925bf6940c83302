//! Event command codes
//!
//! Codes are the integers stored in content files. The enumeration is closed:
//! anything not listed here dispatches to the no-op handler.
//!
//! Code space:
//! - 0xx/1xx：flow control, messages, state mutation, system toggles
//! - 2xx：map, characters, screen, pictures, audio/video
//! - 3xx：battle, scenes, actors, enemies, script
//! - 4xx/5xx/6xx：continuation lines and block markers owned by a 1xx/2xx/3xx head

use std::fmt;

macro_rules! event_codes {
    ($( $(#[$meta:meta])* $name:ident = $code:literal, )*) => {
        /// Event command code
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum EventCode {
            $( $(#[$meta])* $name = $code, )*
        }

        impl EventCode {
            /// Every known code, in declaration order
            pub const ALL: &'static [EventCode] = &[$(EventCode::$name,)*];

            /// Command name for logs and dumps
            pub fn name(&self) -> &'static str {
                match self {
                    $( EventCode::$name => stringify!($name), )*
                }
            }
        }

        impl TryFrom<i32> for EventCode {
            type Error = ();

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    $( $code => Ok(EventCode::$name), )*
                    _ => Err(()),
                }
            }
        }
    };
}

event_codes! {
    /// Block terminator / empty line
    End = 0,

    // =====================
    // Messages
    // =====================
    /// Show Text: face name, face index, background, position, speaker
    ShowText = 101,
    /// Show Choices: choices, cancel type, default, position, background
    ShowChoices = 102,
    /// Input Number: variable id, digits
    InputNumber = 103,
    /// Select Item: variable id, item type
    SelectItem = 104,
    /// Show Scrolling Text: speed, no-fast
    ShowScrollingText = 105,
    /// Comment head
    Comment = 108,
    /// Skip the block below
    Skip = 109,
    /// Show Text continuation line
    TextLine = 401,
    /// When [choice n]
    WhenChoice = 402,
    /// When Cancel
    WhenCancel = 403,
    /// End of choices block
    ChoicesEnd = 404,
    /// Scrolling text line
    ScrollingTextLine = 405,
    /// Comment continuation line
    CommentLine = 408,

    // =====================
    // Flow control
    // =====================
    /// Conditional Branch
    ConditionalBranch = 111,
    /// Else
    Else = 411,
    /// End of conditional block
    BranchEnd = 412,
    /// Loop
    Loop = 112,
    /// Repeat Above
    RepeatAbove = 413,
    /// Break Loop
    BreakLoop = 113,
    /// Exit Event Processing
    ExitEventProcessing = 115,
    /// Common Event
    CommonEvent = 117,
    /// Label
    Label = 118,
    /// Jump to Label
    JumpToLabel = 119,

    // =====================
    // Game state
    // =====================
    ControlSwitches = 121,
    ControlVariables = 122,
    ControlSelfSwitch = 123,
    ControlTimer = 124,
    ChangeGold = 125,
    ChangeItems = 126,
    ChangeWeapons = 127,
    ChangeArmors = 128,
    ChangePartyMember = 129,
    ChangeBattleBgm = 132,
    ChangeVictoryMe = 133,
    ChangeSaveAccess = 134,
    ChangeMenuAccess = 135,
    ChangeEncounter = 136,
    ChangeFormationAccess = 137,
    ChangeWindowColor = 138,
    ChangeDefeatMe = 139,
    ChangeVehicleBgm = 140,

    // =====================
    // Map and characters
    // =====================
    TransferPlayer = 201,
    SetVehicleLocation = 202,
    SetEventLocation = 203,
    ScrollMap = 204,
    SetMovementRoute = 205,
    /// Move route continuation line (editor display only)
    MovementRouteLine = 505,
    GetOnOffVehicle = 206,
    ChangeTransparency = 211,
    ShowAnimation = 212,
    ShowBalloonIcon = 213,
    EraseEvent = 214,
    ChangePlayerFollowers = 216,
    GatherFollowers = 217,

    // =====================
    // Screen and pictures
    // =====================
    FadeoutScreen = 221,
    FadeinScreen = 222,
    TintScreen = 223,
    FlashScreen = 224,
    ShakeScreen = 225,
    Wait = 230,
    ShowPicture = 231,
    MovePicture = 232,
    RotatePicture = 233,
    TintPicture = 234,
    ErasePicture = 235,
    SetWeatherEffect = 236,

    // =====================
    // Audio and video
    // =====================
    PlayBgm = 241,
    FadeoutBgm = 242,
    SaveBgm = 243,
    ResumeBgm = 244,
    PlayBgs = 245,
    FadeoutBgs = 246,
    PlayMe = 249,
    PlaySe = 250,
    StopSe = 251,
    PlayMovie = 261,

    // =====================
    // Map settings
    // =====================
    ChangeMapNameDisplay = 281,
    ChangeTileset = 282,
    ChangeBattleBackground = 283,
    ChangeParallax = 284,
    GetLocationInfo = 285,

    // =====================
    // Battle and scenes
    // =====================
    BattleProcessing = 301,
    IfWin = 601,
    IfEscape = 602,
    IfLose = 603,
    BattleEnd = 604,
    ShopProcessing = 302,
    ShopItem = 605,
    NameInputProcessing = 303,
    OpenMenuScreen = 351,
    OpenSaveScreen = 352,
    GameOver = 353,
    ReturnToTitleScreen = 354,

    // =====================
    // Actors
    // =====================
    ChangeHp = 311,
    ChangeMp = 312,
    ChangeState = 313,
    RecoverAll = 314,
    ChangeExp = 315,
    ChangeLevel = 316,
    ChangeParameter = 317,
    ChangeSkill = 318,
    ChangeEquipment = 319,
    ChangeName = 320,
    ChangeClass = 321,
    ChangeActorImages = 322,
    ChangeVehicleImage = 323,
    ChangeNickname = 324,
    ChangeProfile = 325,
    ChangeTp = 326,

    // =====================
    // Enemies
    // =====================
    ChangeEnemyHp = 331,
    ChangeEnemyMp = 332,
    ChangeEnemyState = 333,
    EnemyRecoverAll = 334,
    EnemyAppear = 335,
    EnemyTransform = 336,
    ShowBattleAnimation = 337,
    ForceAction = 339,
    AbortBattle = 340,
    ChangeEnemyTp = 342,

    // =====================
    // Script
    // =====================
    Script = 355,
    ScriptLine = 655,
}

impl EventCode {
    /// Whether the code opens an indented block that its handler may skip
    pub fn opens_block(&self) -> bool {
        matches!(
            self,
            EventCode::ConditionalBranch
                | EventCode::Else
                | EventCode::Loop
                | EventCode::WhenChoice
                | EventCode::WhenCancel
                | EventCode::IfWin
                | EventCode::IfEscape
                | EventCode::IfLose
                | EventCode::Skip
        )
    }

    /// Whether the code is a continuation line consumed by the command above it
    pub fn is_continuation(&self) -> bool {
        matches!(
            self,
            EventCode::TextLine
                | EventCode::ScrollingTextLine
                | EventCode::CommentLine
                | EventCode::MovementRouteLine
                | EventCode::ShopItem
                | EventCode::ScriptLine
        )
    }
}

impl fmt::Display for EventCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Display name for a raw code, including unknown ones
pub fn code_name(code: i32) -> String {
    EventCode::try_from(code)
        .map(|c| c.name().to_string())
        .unwrap_or_else(|_| format!("Unknown({})", code))
}
