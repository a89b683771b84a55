//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::api::{ItemName, RequestFailure};
use crate::creation::{AdventureType, CreationField, CreationForm, CreationProblem};
use crate::effect::Effect;
use crate::state::{
    ActionButton, AppState, CombatView, GameSnapshot, MessageKind, Overlay, PendingRequest,
    Screen, ShopView, ENCOUNTERS_PER_CAMPAIGN, REST_COST,
};

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Catalog actions =====
        Action::CatalogFetch => {
            if state.catalog.is_loading() {
                return DispatchResult::unchanged();
            }
            state.catalog = DataResource::Loading;
            DispatchResult::changed_with(Effect::LoadCatalog)
        }

        Action::CatalogDidLoad(catalog) => {
            state.catalog = DataResource::Loaded(catalog);
            DispatchResult::changed()
        }

        Action::CatalogDidError(msg) => {
            if state.screen == Screen::CharacterCreation {
                state.form.error = Some(format!("Could not load races and classes: {msg}"));
            }
            state.catalog = DataResource::Failed(msg);
            DispatchResult::changed()
        }

        // ===== Creation actions =====
        Action::CreationOpen => {
            if state.screen != Screen::Start {
                return DispatchResult::unchanged();
            }
            state.screen = Screen::CharacterCreation;
            state.form = CreationForm::default();
            if state.catalog.is_failed() || state.catalog.is_empty() {
                state.catalog = DataResource::Loading;
                return DispatchResult::changed_with(Effect::LoadCatalog);
            }
            DispatchResult::changed()
        }

        Action::CreationCancel => {
            if state.screen != Screen::CharacterCreation || state.is_busy() {
                return DispatchResult::unchanged();
            }
            state.screen = Screen::Start;
            DispatchResult::changed()
        }

        Action::CreationFocus(field) => {
            if state.screen != Screen::CharacterCreation || state.form.focus == field {
                return DispatchResult::unchanged();
            }
            state.form.focus = field;
            DispatchResult::changed()
        }

        Action::CreationNameChange(name) => {
            if state.screen != Screen::CharacterCreation {
                return DispatchResult::unchanged();
            }
            state.form.name = name;
            state.form.error = None;
            DispatchResult::changed()
        }

        Action::CreationSelectRace(race) => {
            let Some(catalog) = state.catalog.data() else {
                return DispatchResult::unchanged();
            };
            if state.screen != Screen::CharacterCreation
                || !state.form.select_race(catalog, &race)
            {
                return DispatchResult::unchanged();
            }
            state.form.error = None;
            DispatchResult::changed()
        }

        Action::CreationSelectClass(class) => {
            let Some(catalog) = state.catalog.data() else {
                return DispatchResult::unchanged();
            };
            if state.screen != Screen::CharacterCreation
                || !state.form.select_class(catalog, &class)
            {
                return DispatchResult::unchanged();
            }
            state.form.error = None;
            DispatchResult::changed()
        }

        Action::CreationToggleAdventure => {
            if state.screen != Screen::CharacterCreation {
                return DispatchResult::unchanged();
            }
            state.form.adventure = state.form.adventure.toggle();
            DispatchResult::changed()
        }

        Action::CreationSubmit => {
            if state.screen != Screen::CharacterCreation || state.is_busy() {
                return DispatchResult::unchanged();
            }
            let Some(catalog) = state.catalog.data() else {
                state.form.error = Some("Races and classes are still loading".to_string());
                return DispatchResult::changed();
            };
            match state.form.validate(catalog) {
                Ok(request) => {
                    state.form.error = None;
                    state.pending = Some(PendingRequest::CreateCharacter);
                    DispatchResult::changed_with(Effect::CreateCharacter(request))
                }
                Err(problem) => {
                    state.form.focus = field_for(&problem);
                    state.form.error = Some(problem.to_string());
                    DispatchResult::changed()
                }
            }
        }

        // ===== Character actions =====
        Action::CharacterDidCreate(created) => {
            state.pending = None;
            let adventure = created.adventure_type.unwrap_or(state.form.adventure);
            let name = created.character.name.clone();
            state.adventure = adventure;
            state.game = Some(GameSnapshot {
                character: created.character,
                ..Default::default()
            });
            state.overlay = None;
            state.confirm_new_game = false;
            state.sheet_stale = false;
            state.screen = Screen::Game;
            let welcome = match adventure {
                AdventureType::Normal => format!("Welcome, {name}! Your adventure begins!"),
                AdventureType::UpsideDown => {
                    format!("Welcome to the Upside Down, {name}! Vecna awaits your service...")
                }
            };
            state.push_message(MessageKind::Info, welcome);
            DispatchResult::changed_with(Effect::FetchGameState { announce: true })
        }

        Action::CharacterDidError(failure) => {
            state.pending = None;
            state.form.error = Some(failure_text(&failure, "Error creating character"));
            DispatchResult::changed()
        }

        // ===== Game state actions =====
        Action::GameStateRefresh { announce } => {
            if state.screen != Screen::Game {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(Effect::FetchGameState { announce })
        }

        Action::GameStateDidLoad { snapshot, announce } => {
            if state.screen != Screen::Game {
                return DispatchResult::unchanged();
            }
            let completed = snapshot.encounters_completed;
            state.game = Some(snapshot);
            state.sheet_stale = false;
            if announce && !state.is_upside_down() {
                state.push_message(
                    MessageKind::Info,
                    format!("Encounters completed: {completed}/{ENCOUNTERS_PER_CAMPAIGN}"),
                );
            }
            DispatchResult::changed()
        }

        Action::GameStateDidError(_) => {
            if state.screen != Screen::Game || state.sheet_stale {
                return DispatchResult::unchanged();
            }
            state.sheet_stale = true;
            DispatchResult::changed()
        }

        Action::UpsideDownPoll => {
            if state.screen != Screen::Game || !state.is_upside_down() || state.is_busy() {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(Effect::FetchGameState { announce: false })
        }

        // ===== Encounter actions =====
        Action::EncounterStart => {
            if state.is_busy() || !state.action_enabled(ActionButton::Encounter) {
                return DispatchResult::unchanged();
            }
            state.pending = Some(PendingRequest::Encounter);
            DispatchResult::changed_with(Effect::StartEncounter)
        }

        Action::EncounterDidStart(started) => {
            state.pending = None;
            state.push_message(MessageKind::Info, started.message);
            state.overlay = Some(Overlay::Combat(CombatView {
                enemy: started.enemy,
            }));
            DispatchResult::changed()
        }

        Action::EncounterDidError(failure) => {
            state.pending = None;
            let kind = if failure.is_rejected() {
                MessageKind::Info
            } else {
                MessageKind::Combat
            };
            state.push_message(kind, failure_text(&failure, "Error starting encounter"));
            DispatchResult::changed()
        }

        // ===== Combat actions =====
        Action::CombatAct(command) => {
            if state.is_busy() || state.confirm_new_game || !state.in_combat() {
                return DispatchResult::unchanged();
            }
            state.pending = Some(PendingRequest::Combat);
            DispatchResult::changed_with(Effect::Combat(command))
        }

        Action::CombatDidResolve(outcome) => {
            state.pending = None;
            state.push_message(MessageKind::Combat, outcome.message.clone());

            if let Some(Overlay::Combat(view)) = state.overlay.as_mut() {
                if let Some(hp) = outcome.enemy_hp {
                    view.enemy.hp = hp;
                }
                if let Some(max_hp) = outcome.enemy_max_hp {
                    view.enemy.max_hp = max_hp;
                }
            }
            if let Some(game) = state.game.as_mut() {
                if let Some(hp) = outcome.player_hp {
                    game.character.hp = hp;
                }
                if let Some(max_hp) = outcome.player_max_hp {
                    game.character.max_hp = max_hp;
                }
            }

            if outcome.combat_over {
                if state.in_combat() {
                    state.overlay = None;
                }
                if outcome.victory {
                    state.push_message(
                        MessageKind::Success,
                        format!(
                            "Victory! You earned {} XP and {} gold!",
                            outcome.reward_xp, outcome.reward_gold
                        ),
                    );
                } else if !outcome.player_hp.is_some_and(|hp| hp <= 0) {
                    state.push_message(MessageKind::Info, "You fled from combat!");
                }
            }
            DispatchResult::changed_with(Effect::FetchGameState { announce: true })
        }

        Action::CombatDidError(failure) => {
            state.pending = None;
            state.push_message(
                MessageKind::Combat,
                failure_text(&failure, "Error executing action"),
            );
            DispatchResult::changed()
        }

        // ===== Shop actions =====
        Action::ShopVisit => {
            if state.is_busy() || !state.action_enabled(ActionButton::Shop) {
                return DispatchResult::unchanged();
            }
            state.pending = Some(PendingRequest::Shop);
            DispatchResult::changed_with(Effect::VisitShop)
        }

        Action::ShopDidOpen(stock) => {
            state.pending = None;
            if state.screen != Screen::Game || state.in_combat() {
                return DispatchResult::changed();
            }
            state.push_message(
                MessageKind::Info,
                format!("Welcome to the shop! You have {} gold.", stock.gold),
            );
            let previous = state.shop().map(|shop| shop.selected).unwrap_or(0);
            let selected = previous.min(stock.items.len().saturating_sub(1));
            state.overlay = Some(Overlay::Shop(ShopView {
                gold: stock.gold,
                items: stock.items,
                selected,
            }));
            DispatchResult::changed()
        }

        Action::ShopDidError(failure) => {
            state.pending = None;
            state.push_message(MessageKind::Info, failure_text(&failure, "Error visiting shop"));
            DispatchResult::changed()
        }

        Action::ShopSelect(index) => match state.shop_mut() {
            Some(shop) if index < shop.items.len() && index != shop.selected => {
                shop.selected = index;
                DispatchResult::changed()
            }
            _ => DispatchResult::unchanged(),
        },

        Action::ShopBuy => {
            if state.is_busy() || state.confirm_new_game {
                return DispatchResult::unchanged();
            }
            let Some(item) = state.shop().and_then(|shop| shop.selected_item()) else {
                return DispatchResult::unchanged();
            };
            match ItemName::parse(&item.name) {
                Ok(name) => {
                    state.pending = Some(PendingRequest::Purchase);
                    DispatchResult::changed_with(Effect::BuyItem(name))
                }
                Err(error) => {
                    state.push_message(MessageKind::Info, format!("Error: {error}"));
                    DispatchResult::changed()
                }
            }
        }

        Action::ShopDidBuy { item, purchase } => {
            state.pending = None;
            state.push_message(MessageKind::Success, format!("You bought {item}!"));
            if let Some(gold) = purchase.gold {
                if let Some(shop) = state.shop_mut() {
                    shop.gold = gold;
                }
                if let Some(game) = state.game.as_mut() {
                    game.character.gold = gold;
                }
            }
            DispatchResult::changed_with(Effect::FetchGameState { announce: true })
        }

        Action::ShopBuyDidError(failure) => {
            state.pending = None;
            state.push_message(MessageKind::Info, failure_text(&failure, "Error buying item"));
            DispatchResult::changed()
        }

        Action::ShopClose => {
            if state.shop().is_none() {
                return DispatchResult::unchanged();
            }
            state.overlay = None;
            state.push_message(MessageKind::Info, "You left the shop.");
            DispatchResult::changed()
        }

        // ===== Rest actions =====
        Action::Rest => {
            if state.is_busy() || !state.action_enabled(ActionButton::Rest) {
                return DispatchResult::unchanged();
            }
            state.pending = Some(PendingRequest::Rest);
            DispatchResult::changed_with(Effect::Rest)
        }

        Action::RestDidComplete(outcome) => {
            state.pending = None;
            state.push_message(
                MessageKind::Success,
                "You rested at the inn and restored all HP!",
            );
            state.push_message(MessageKind::Info, format!("Gold spent: {REST_COST}g"));
            if let Some(game) = state.game.as_mut() {
                if let Some(hp) = outcome.hp {
                    game.character.hp = hp;
                }
                if let Some(max_hp) = outcome.max_hp {
                    game.character.max_hp = max_hp;
                }
                if let Some(gold) = outcome.gold {
                    game.character.gold = gold;
                }
            }
            DispatchResult::changed_with(Effect::FetchGameState { announce: true })
        }

        Action::RestDidError(failure) => {
            state.pending = None;
            state.push_message(MessageKind::Info, failure_text(&failure, "Error resting at inn"));
            DispatchResult::changed()
        }

        // ===== New game actions =====
        Action::NewGameRequest => {
            if state.screen != Screen::Game || state.confirm_new_game {
                return DispatchResult::unchanged();
            }
            state.confirm_new_game = true;
            DispatchResult::changed()
        }

        Action::NewGameCancel => {
            if !state.confirm_new_game {
                return DispatchResult::unchanged();
            }
            state.confirm_new_game = false;
            DispatchResult::changed()
        }

        Action::NewGameConfirm => {
            if !state.confirm_new_game || state.is_busy() {
                return DispatchResult::unchanged();
            }
            state.confirm_new_game = false;
            state.pending = Some(PendingRequest::NewGame);
            DispatchResult::changed_with(Effect::NewGame)
        }

        Action::NewGameDidComplete => {
            state.pending = None;
            state.screen = Screen::Start;
            state.overlay = None;
            state.game = None;
            state.sheet_stale = false;
            state.adventure = AdventureType::Normal;
            state.form = CreationForm::default();
            state.reset_log();
            DispatchResult::changed()
        }

        Action::NewGameDidError(failure) => {
            state.pending = None;
            state.push_message(
                MessageKind::Info,
                failure_text(&failure, "Error starting new game"),
            );
            DispatchResult::changed()
        }

        // ===== UI actions =====
        Action::UiScrollLog(delta) => {
            let max = state.log.len().saturating_sub(1);
            let current = usize::from(state.log_scroll);
            let next = if delta >= 0 {
                current.saturating_add(delta.unsigned_abs() as usize).min(max)
            } else {
                current.saturating_sub(delta.unsigned_abs() as usize)
            };
            let next = u16::try_from(next).unwrap_or(u16::MAX);
            if next == state.log_scroll {
                return DispatchResult::unchanged();
            }
            state.log_scroll = next;
            DispatchResult::changed()
        }

        Action::Render => DispatchResult::changed(),

        // ===== Global actions =====
        Action::Tick => {
            if state.is_busy() {
                state.tick_count = state.tick_count.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// `Error: {msg}` for server refusals, the flow's generic text otherwise
fn failure_text(failure: &RequestFailure, generic: &str) -> String {
    if failure.is_rejected() {
        format!("Error: {}", failure.message)
    } else {
        generic.to_string()
    }
}

fn field_for(problem: &CreationProblem) -> CreationField {
    match problem {
        CreationProblem::MissingName => CreationField::Name,
        CreationProblem::MissingRace | CreationProblem::UnknownRace(_) => CreationField::Race,
        CreationProblem::MissingClass | CreationProblem::ClassNotPermitted { .. } => {
            CreationField::Class
        }
    }
}
