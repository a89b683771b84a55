//! Game server API client
//!
//! Every consequential decision (combat, shop stock, resting, character
//! creation) is made by the server. This module only knows the endpoints
//! and the shape of their JSON replies.

use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use reqwest::{Method, Url};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::creation::{AdventureType, ClassInfo, CreationCatalog, RaceInfo};
use crate::state::{
    CharacterSheet, Enemy, GameSnapshot, InventoryItem, ShopItem, UpsideDownStatus,
};

/// Shown when the server answers `success: false` without saying why
const DEFAULT_REFUSAL: &str = "The server refused the request";

// ============================================================================
// Errors
// ============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(String),
    #[error("invalid item name {0:?}")]
    InvalidItemName(String),
    #[error("invalid server url {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },
}

/// Which of the two failure classes a request ended in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FailureKind {
    /// Network, timeout, or unreadable reply
    Transport,
    /// The server understood the request and said no
    Rejected,
}

/// Serializable summary of an [`ApiError`], carried by result actions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RequestFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestFailure {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Rejected,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            message: message.into(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.kind == FailureKind::Rejected
    }
}

impl From<ApiError> for RequestFailure {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Rejected(message) => RequestFailure::rejected(message),
            ApiError::InvalidItemName(name) => {
                RequestFailure::rejected(format!("invalid item name {name:?}"))
            }
            other => RequestFailure::transport(other.to_string()),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Shop item name, checked before it becomes a URL path segment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemName(String);

impl ItemName {
    pub const MAX_LEN: usize = 64;

    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let invalid = raw.trim().is_empty()
            || raw.chars().count() > Self::MAX_LEN
            || raw.chars().any(|c| c == '/' || c == '\\' || c.is_control());
        if invalid {
            return Err(ApiError::InvalidItemName(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn path_segment(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every endpoint the client talks to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    CharacterCreation,
    CreateCharacter,
    GameState,
    StartEncounter,
    CombatAction,
    VisitShop,
    BuyItem(ItemName),
    Rest,
    NewGame,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::CharacterCreation | Endpoint::GameState => Method::GET,
            _ => Method::POST,
        }
    }

    /// Path relative to the server base url
    pub fn path(&self) -> String {
        match self {
            Endpoint::CharacterCreation => "api/character-creation".to_string(),
            Endpoint::CreateCharacter => "api/create-character".to_string(),
            Endpoint::GameState => "api/game-state".to_string(),
            Endpoint::StartEncounter => "api/start-encounter".to_string(),
            Endpoint::CombatAction => "api/combat-action".to_string(),
            Endpoint::VisitShop => "api/visit-shop".to_string(),
            Endpoint::BuyItem(item) => format!("api/buy-item/{}", item.path_segment()),
            Endpoint::Rest => "api/rest".to_string(),
            Endpoint::NewGame => "api/new-game".to_string(),
        }
    }
}

/// Body of `POST /api/create-character`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CharacterRequest {
    pub name: String,
    pub race: String,
    pub class: String,
    pub adventure_type: AdventureType,
}

/// The four things a player can do on their combat turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CombatCommand {
    Attack,
    Defend,
    UseItem,
    Flee,
}

impl CombatCommand {
    pub const ALL: [CombatCommand; 4] = [
        CombatCommand::Attack,
        CombatCommand::Defend,
        CombatCommand::UseItem,
        CombatCommand::Flee,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CombatCommand::Attack => "Attack",
            CombatCommand::Defend => "Defend",
            CombatCommand::UseItem => "Use Item",
            CombatCommand::Flee => "Flee",
        }
    }
}

#[derive(Serialize)]
struct CombatActionBody {
    action: CombatCommand,
}

// ============================================================================
// Replies
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreationOptionsReply {
    races: IndexMap<String, RaceInfo>,
    classes: IndexMap<String, ClassInfo>,
    #[serde(default)]
    race_class_mapping: Option<IndexMap<String, Vec<String>>>,
}

impl From<CreationOptionsReply> for CreationCatalog {
    fn from(reply: CreationOptionsReply) -> Self {
        CreationCatalog {
            races: reply.races,
            classes: reply.classes,
            race_class_mapping: reply.race_class_mapping.unwrap_or_default(),
        }
    }
}

/// Reply to a successful character creation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreatedCharacter {
    pub character: CharacterSheet,
    #[serde(default)]
    pub adventure_type: Option<AdventureType>,
}

#[derive(Debug, Deserialize)]
struct GameStateReply {
    character: CharacterSheet,
    #[serde(default)]
    inventory: Vec<InventoryItem>,
    #[serde(default)]
    encounters_completed: u32,
    #[serde(default)]
    encounters_remaining: Option<i32>,
    #[serde(default)]
    status: Option<StatusReply>,
}

/// The `status` object differs per campaign; only the Upside Down one is
/// rendered, and only when it carries `vecna_power`.
#[derive(Debug, Default, Deserialize)]
struct StatusReply {
    vecna_power: Option<i64>,
    vecna_favor: Option<i64>,
    missions_completed: Option<u32>,
    captured_people: Option<u32>,
    hawkins_resources: Option<u32>,
}

impl StatusReply {
    fn into_upside_down(self) -> Option<UpsideDownStatus> {
        let vecna_power = self.vecna_power?;
        Some(UpsideDownStatus {
            vecna_power,
            vecna_favor: self.vecna_favor.unwrap_or_default(),
            missions_completed: self.missions_completed.unwrap_or_default(),
            captured_people: self.captured_people.unwrap_or_default(),
            hawkins_resources: self.hawkins_resources.unwrap_or_default(),
        })
    }
}

impl From<GameStateReply> for GameSnapshot {
    fn from(reply: GameStateReply) -> Self {
        GameSnapshot {
            character: reply.character,
            inventory: reply.inventory,
            encounters_completed: reply.encounters_completed,
            encounters_remaining: reply.encounters_remaining,
            upside_down: reply.status.and_then(StatusReply::into_upside_down),
        }
    }
}

/// Reply to `POST /api/start-encounter`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncounterStarted {
    pub message: String,
    pub enemy: Enemy,
}

/// Reply to `POST /api/combat-action`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CombatOutcome {
    pub message: String,
    pub combat_over: bool,
    pub victory: bool,
    pub reward_xp: u32,
    pub reward_gold: u32,
    pub player_hp: Option<i32>,
    pub player_max_hp: Option<i32>,
    pub enemy_hp: Option<i32>,
    pub enemy_max_hp: Option<i32>,
}

/// Reply to `POST /api/visit-shop`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShopStock {
    #[serde(default)]
    pub gold: i64,
    #[serde(default)]
    pub items: Vec<ShopItem>,
}

/// Reply to a successful `POST /api/buy-item/:item`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Purchase {
    #[serde(default)]
    pub gold: Option<i64>,
}

/// Reply to a successful `POST /api/rest`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RestOutcome {
    pub message: Option<String>,
    pub hp: Option<i32>,
    pub max_hp: Option<i32>,
    pub gold: Option<i64>,
}

/// Decode a reply body.
///
/// The server signals refusals in the body (often alongside HTTP 400), so
/// the status code is not consulted: an `error` string or `success: false`
/// becomes [`ApiError::Rejected`], anything else must match `T`.
pub fn decode_reply<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value = serde_json::from_str(body)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(ApiError::Rejected(error.to_string()));
    }
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_REFUSAL);
        return Err(ApiError::Rejected(message.to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

// ============================================================================
// Client
// ============================================================================

/// Parse the configured server url and make it usable as a join base
pub fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let base_error = |reason: String| ApiError::BaseUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw.trim()).map_err(|e| base_error(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(base_error("expected an http(s) url".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// HTTP client for one game server.
///
/// Cheap to clone; clones share the connection pool and cookie jar.
#[derive(Clone, Debug)]
pub struct GameClient {
    http: reqwest::Client,
    base: Url,
}

impl GameClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = parse_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn endpoint_url(&self, endpoint: &Endpoint) -> Result<Url, ApiError> {
        self.base
            .join(&endpoint.path())
            .map_err(|e| ApiError::BaseUrl {
                url: self.base.to_string(),
                reason: e.to_string(),
            })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let text = self.send(&endpoint, body).await?;
        decode_reply(&text)
    }

    async fn send(&self, endpoint: &Endpoint, body: Option<Value>) -> Result<String, ApiError> {
        let url = self.endpoint_url(endpoint)?;
        let method = endpoint.method();
        tracing::debug!(%method, %url, "game api request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(%status, bytes = text.len(), "game api reply");
        Ok(text)
    }

    pub async fn creation_options(&self) -> Result<CreationCatalog, ApiError> {
        let reply: CreationOptionsReply = self.call(Endpoint::CharacterCreation, None).await?;
        Ok(reply.into())
    }

    pub async fn create_character(
        &self,
        request: &CharacterRequest,
    ) -> Result<CreatedCharacter, ApiError> {
        let body = serde_json::to_value(request)?;
        self.call(Endpoint::CreateCharacter, Some(body)).await
    }

    pub async fn game_state(&self) -> Result<GameSnapshot, ApiError> {
        let reply: GameStateReply = self.call(Endpoint::GameState, None).await?;
        Ok(reply.into())
    }

    pub async fn start_encounter(&self) -> Result<EncounterStarted, ApiError> {
        self.call(Endpoint::StartEncounter, None).await
    }

    pub async fn combat_action(&self, action: CombatCommand) -> Result<CombatOutcome, ApiError> {
        let body = serde_json::to_value(CombatActionBody { action })?;
        self.call(Endpoint::CombatAction, Some(body)).await
    }

    pub async fn visit_shop(&self) -> Result<ShopStock, ApiError> {
        self.call(Endpoint::VisitShop, None).await
    }

    pub async fn buy_item(&self, item: &ItemName) -> Result<Purchase, ApiError> {
        self.call(Endpoint::BuyItem(item.clone()), None).await
    }

    pub async fn rest(&self) -> Result<RestOutcome, ApiError> {
        self.call(Endpoint::Rest, None).await
    }

    /// Any reply counts as acknowledged; the body has no contract.
    pub async fn new_game(&self) -> Result<(), ApiError> {
        self.send(&Endpoint::NewGame, None).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_is_a_rejection() {
        let result: Result<EncounterStarted, _> = decode_reply(r#"{"error": "No active game"}"#);
        assert!(matches!(result, Err(ApiError::Rejected(msg)) if msg == "No active game"));
    }

    #[test]
    fn success_false_uses_message_then_default() {
        let result: Result<RestOutcome, _> =
            decode_reply(r#"{"success": false, "message": "You need 20 gold to rest"}"#);
        assert!(matches!(result, Err(ApiError::Rejected(msg)) if msg == "You need 20 gold to rest"));

        let result: Result<Purchase, _> = decode_reply(r#"{"success": false}"#);
        assert!(matches!(result, Err(ApiError::Rejected(msg)) if msg == DEFAULT_REFUSAL));
    }

    #[test]
    fn success_false_prefers_error_text() {
        let result: Result<Purchase, _> =
            decode_reply(r#"{"success": false, "error": "Not enough gold"}"#);
        assert!(matches!(result, Err(ApiError::Rejected(msg)) if msg == "Not enough gold"));
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let result: Result<ShopStock, _> = decode_reply("<html>500</html>");
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn rejection_maps_to_rejected_failure() {
        let failure = RequestFailure::from(ApiError::Rejected("Invalid race".into()));
        assert_eq!(failure, RequestFailure::rejected("Invalid race"));

        let failure = RequestFailure::from(ApiError::InvalidItemName("a/b".into()));
        assert!(failure.is_rejected());
    }

    #[test]
    fn item_name_rejects_path_tricks() {
        assert!(ItemName::parse("Health Potion").is_ok());
        assert!(ItemName::parse("").is_err());
        assert!(ItemName::parse("   ").is_err());
        assert!(ItemName::parse("../rest").is_err());
        assert!(ItemName::parse("a\\b").is_err());
        assert!(ItemName::parse("tab\there").is_err());
        assert!(ItemName::parse(&"x".repeat(ItemName::MAX_LEN + 1)).is_err());
    }

    #[test]
    fn buy_item_path_is_percent_encoded() {
        let item = ItemName::parse("Health Potion?").expect("valid name");
        assert_eq!(
            Endpoint::BuyItem(item).path(),
            "api/buy-item/Health%20Potion%3F"
        );
    }

    #[test]
    fn endpoint_methods() {
        assert_eq!(Endpoint::GameState.method(), Method::GET);
        assert_eq!(Endpoint::CharacterCreation.method(), Method::GET);
        assert_eq!(Endpoint::Rest.method(), Method::POST);
        assert_eq!(Endpoint::NewGame.method(), Method::POST);
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        let client = GameClient::new("http://localhost:5000/game", Duration::from_secs(1))
            .expect("client");
        let url = client.endpoint_url(&Endpoint::Rest).expect("url");
        assert_eq!(url.as_str(), "http://localhost:5000/game/api/rest");
    }

    #[test]
    fn base_url_must_be_http() {
        assert!(matches!(
            parse_base_url("ftp://example.com"),
            Err(ApiError::BaseUrl { .. })
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ApiError::BaseUrl { .. })
        ));
    }

    #[test]
    fn combat_command_wire_names() {
        let body = serde_json::to_value(CombatActionBody {
            action: CombatCommand::UseItem,
        })
        .expect("serialize");
        assert_eq!(body, serde_json::json!({ "action": "useitem" }));
    }

    #[test]
    fn status_without_vecna_power_is_dropped() {
        let reply: GameStateReply = decode_reply(
            r#"{
                "character": {"name": "Max", "level": 1, "hp": 10, "max_hp": 10,
                              "gold": 50, "experience": 0, "stats": {}},
                "inventory": [],
                "encounters_completed": 2,
                "status": {"encounters_completed": 2, "boss_defeated": false}
            }"#,
        )
        .expect("decode");
        let snapshot = GameSnapshot::from(reply);
        assert_eq!(snapshot.encounters_completed, 2);
        assert!(snapshot.upside_down.is_none());
    }

    #[test]
    fn encounters_remaining_may_go_negative() {
        let reply: GameStateReply = decode_reply(
            r#"{
                "character": {"name": "Max", "level": 4, "hp": 30, "max_hp": 30,
                              "gold": 210, "experience": 900, "stats": {}},
                "inventory": [],
                "encounters_completed": 6,
                "encounters_remaining": -1,
                "status": {"encounters_completed": 6, "boss_defeated": false}
            }"#,
        )
        .expect("decode");
        let snapshot = GameSnapshot::from(reply);
        assert_eq!(snapshot.encounters_completed, 6);
        assert_eq!(snapshot.encounters_remaining, Some(-1));
        assert_eq!(snapshot.character.gold, 210);
    }

    #[test]
    fn decode_failure_is_a_transport_failure() {
        let error = decode_reply::<GameStateReply>(r#"{"character": "nope"}"#)
            .expect_err("malformed character");
        assert!(matches!(error, ApiError::Decode(_)));
        let failure = RequestFailure::from(error);
        assert_eq!(failure.kind, FailureKind::Transport);
        assert!(!failure.is_rejected());
    }
}
