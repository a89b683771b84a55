//! Application state - single source of truth

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;

use crate::creation::{AdventureType, CreationCatalog, CreationForm};

/// Gold the inn charges; the server does the deduction.
pub const REST_COST: i64 = 20;

/// Encounters in a normal campaign before the boss
pub const ENCOUNTERS_PER_CAMPAIGN: u32 = 5;

/// Oldest messages are dropped past this many entries
pub const LOG_CAPACITY: usize = 200;

/// Spinner frame interval while a command is in flight
pub const SPINNER_TICK_MS: u64 = 120;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

pub const WELCOME_MESSAGE: &str = "Welcome, adventurer! What would you like to do?";

// ============================================================================
// Server projections (read-only copies)
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub fn labelled(&self) -> [(&'static str, i32); 6] {
        [
            ("STR", self.strength),
            ("DEX", self.dexterity),
            ("CON", self.constitution),
            ("INT", self.intelligence),
            ("WIS", self.wisdom),
            ("CHA", self.charisma),
        ]
    }
}

/// The player's character as last reported by the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CharacterSheet {
    pub name: String,
    pub level: u32,
    pub experience: u32,
    pub hp: i32,
    pub max_hp: i32,
    pub gold: i64,
    pub stats: AbilityScores,
    pub race: Option<String>,
    pub class: Option<String>,
}

impl Default for CharacterSheet {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: 1,
            experience: 0,
            hp: 0,
            max_hp: 0,
            gold: 0,
            stats: AbilityScores::default(),
            race: None,
            class: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InventoryItem {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Enemy {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    #[serde(default)]
    pub ac: i32,
    #[serde(default)]
    pub level: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShopItem {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub description: Option<String>,
}

/// Extra standing tracked by the Upside Down campaign
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UpsideDownStatus {
    pub vecna_power: i64,
    pub vecna_favor: i64,
    pub missions_completed: u32,
    pub captured_people: u32,
    pub hawkins_resources: u32,
}

/// Last `/api/game-state` reply
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GameSnapshot {
    pub character: CharacterSheet,
    pub inventory: Vec<InventoryItem>,
    pub encounters_completed: u32,
    /// Goes negative once more encounters are won than the campaign needs
    pub encounters_remaining: Option<i32>,
    /// Only set when the reply's status carried `vecna_power`
    pub upside_down: Option<UpsideDownStatus>,
}

// ============================================================================
// UI state
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Screen {
    #[default]
    Start,
    CharacterCreation,
    Game,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CombatView {
    pub enemy: Enemy,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShopView {
    pub gold: i64,
    pub items: Vec<ShopItem>,
    pub selected: usize,
}

impl ShopView {
    pub fn selected_item(&self) -> Option<&ShopItem> {
        self.items.get(self.selected)
    }
}

/// At most one overlay covers the game screen
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum Overlay {
    Combat(CombatView),
    Shop(ShopView),
}

/// The three standard game-screen commands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ActionButton {
    Encounter,
    Shop,
    Rest,
}

impl ActionButton {
    pub const ALL: [ActionButton; 3] = [ActionButton::Encounter, ActionButton::Shop, ActionButton::Rest];
}

/// The single game command currently awaiting a server reply
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PendingRequest {
    CreateCharacter,
    Encounter,
    Combat,
    Shop,
    Purchase,
    Rest,
    NewGame,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum MessageKind {
    #[default]
    Info,
    Combat,
    Success,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LogMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl LogMessage {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    #[debug(section = "Screen", label = "Current", debug_fmt)]
    pub screen: Screen,

    #[debug(section = "Screen", label = "Overlay", debug_fmt)]
    pub overlay: Option<Overlay>,

    #[debug(section = "Screen", label = "Confirm new game")]
    pub confirm_new_game: bool,

    /// Races/classes lifecycle: Empty → Loading → Loaded/Failed
    #[debug(section = "Creation", label = "Catalog", debug_fmt)]
    pub catalog: DataResource<CreationCatalog>,

    #[debug(section = "Creation", label = "Form", debug_fmt)]
    pub form: CreationForm,

    #[debug(section = "Game", label = "Adventure", debug_fmt)]
    pub adventure: AdventureType,

    #[debug(section = "Game", label = "Snapshot", debug_fmt)]
    pub game: Option<GameSnapshot>,

    #[debug(section = "Game", label = "Pending", debug_fmt)]
    pub pending: Option<PendingRequest>,

    /// Last game-state refresh failed; the sheet shows older numbers
    #[debug(section = "Game", label = "Sheet stale")]
    pub sheet_stale: bool,

    #[debug(skip)]
    pub log: Vec<LogMessage>,

    /// Lines scrolled up from the newest message
    #[debug(skip)]
    pub log_scroll: u16,

    #[debug(skip)]
    pub tick_count: u32,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            screen: Screen::Start,
            overlay: None,
            confirm_new_game: false,
            catalog: DataResource::Empty,
            form: CreationForm::default(),
            adventure: AdventureType::Normal,
            game: None,
            pending: None,
            sheet_stale: false,
            log: vec![LogMessage::new(MessageKind::Info, WELCOME_MESSAGE)],
            log_scroll: 0,
            tick_count: 0,
        }
    }
}

impl AppState {
    pub fn is_upside_down(&self) -> bool {
        self.adventure == AdventureType::UpsideDown
    }

    pub fn character(&self) -> Option<&CharacterSheet> {
        self.game.as_ref().map(|g| &g.character)
    }

    /// Whether the encounter/shop/rest commands are shown at all
    pub fn actions_visible(&self) -> bool {
        self.screen == Screen::Game && !self.is_upside_down()
    }

    /// Whether a standard command may be issued right now.
    ///
    /// Combat blocks all three; the shop blocks everything but the shop
    /// itself, so visiting again refreshes the stock.
    pub fn action_enabled(&self, button: ActionButton) -> bool {
        if !self.actions_visible() || self.confirm_new_game {
            return false;
        }
        match &self.overlay {
            None => true,
            Some(Overlay::Combat(_)) => false,
            Some(Overlay::Shop(_)) => button == ActionButton::Shop,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn combat(&self) -> Option<&CombatView> {
        match &self.overlay {
            Some(Overlay::Combat(view)) => Some(view),
            _ => None,
        }
    }

    pub fn shop(&self) -> Option<&ShopView> {
        match &self.overlay {
            Some(Overlay::Shop(view)) => Some(view),
            _ => None,
        }
    }

    pub fn shop_mut(&mut self) -> Option<&mut ShopView> {
        match &mut self.overlay {
            Some(Overlay::Shop(view)) => Some(view),
            _ => None,
        }
    }

    pub fn in_combat(&self) -> bool {
        self.combat().is_some()
    }

    pub fn push_message(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.log.push(LogMessage::new(kind, text));
        if self.log.len() > LOG_CAPACITY {
            let excess = self.log.len() - LOG_CAPACITY;
            self.log.drain(..excess);
        }
        self.log_scroll = 0;
    }

    pub fn reset_log(&mut self) {
        self.log = vec![LogMessage::new(MessageKind::Info, WELCOME_MESSAGE)];
        self.log_scroll = 0;
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.tick_count as usize % SPINNER_FRAMES.len()]
    }
}
