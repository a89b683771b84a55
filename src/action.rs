//! Actions - every user intent and every async result

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::api::{
    CombatCommand, CombatOutcome, CreatedCharacter, EncounterStarted, Purchase, RequestFailure,
    RestOutcome, ShopStock,
};
use crate::creation::{CreationCatalog, CreationField};
use crate::state::GameSnapshot;

/// Application actions with automatic category inference
#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Catalog category =====
    /// Intent: load races and classes
    CatalogFetch,

    CatalogDidLoad(CreationCatalog),

    CatalogDidError(String),

    // ===== Creation category =====
    /// Start screen → creation form
    CreationOpen,

    /// Creation form → start screen
    CreationCancel,

    CreationFocus(CreationField),

    CreationNameChange(String),

    CreationSelectRace(String),

    CreationSelectClass(String),

    /// Flip between the two adventure types
    CreationToggleAdventure,

    /// Validate locally, then post the character
    CreationSubmit,

    // ===== Character category =====
    CharacterDidCreate(CreatedCharacter),

    CharacterDidError(RequestFailure),

    // ===== GameState category =====
    /// Intent: refresh the character sheet (read-only, never gated)
    GameStateRefresh {
        announce: bool,
    },

    GameStateDidLoad {
        snapshot: GameSnapshot,
        announce: bool,
    },

    GameStateDidError(RequestFailure),

    /// Interval refresh; only acts while an Upside Down game is idle
    UpsideDownPoll,

    // ===== Encounter category =====
    EncounterStart,

    EncounterDidStart(EncounterStarted),

    EncounterDidError(RequestFailure),

    // ===== Combat category =====
    CombatAct(CombatCommand),

    CombatDidResolve(CombatOutcome),

    CombatDidError(RequestFailure),

    // ===== Shop category =====
    /// Open the shop, or refresh it when already open
    ShopVisit,

    ShopDidOpen(ShopStock),

    ShopDidError(RequestFailure),

    ShopSelect(usize),

    /// Buy the selected item
    ShopBuy,

    ShopDidBuy {
        item: String,
        purchase: Purchase,
    },

    ShopBuyDidError(RequestFailure),

    ShopClose,

    // ===== Rest category =====
    Rest,

    RestDidComplete(RestOutcome),

    RestDidError(RequestFailure),

    // ===== NewGame category =====
    /// Ask for confirmation before abandoning the run
    NewGameRequest,

    NewGameCancel,

    NewGameConfirm,

    NewGameDidComplete,

    NewGameDidError(RequestFailure),

    // ===== UI category =====
    /// Positive scrolls toward older messages
    UiScrollLog(i16),

    /// Force a re-render (for cursor movement, etc.)
    Render,

    // ===== Uncategorized (global) =====
    /// Periodic tick for the busy spinner
    Tick,

    /// Exit the application
    Quit,
}
