//! Reducer and component key handling through TestHarness / EffectStore

use adventure_tui::{
    action::Action,
    api::{CombatCommand, RequestFailure},
    components::{Component, GameScreen, GameScreenProps, StartScreen, StartScreenProps},
    creation::CreationCatalog,
    effect::Effect,
    reducer::reducer,
    state::{AppState, CombatView, Enemy, GameSnapshot, Overlay, Screen},
};
use tui_dispatch::testing::*;
use tui_dispatch::{EffectStore, NumericComponentId, assert_emitted, assert_not_emitted};

fn in_game() -> AppState {
    AppState {
        screen: Screen::Game,
        game: Some(GameSnapshot::default()),
        ..Default::default()
    }
}

#[test]
fn test_reducer_catalog_fetch() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    assert!(store.state().catalog.is_empty());

    let result = store.dispatch(Action::CatalogFetch);
    assert!(result.changed, "State should change");
    assert!(store.state().catalog.is_loading());
    assert_eq!(result.effects.len(), 1);
    assert!(matches!(result.effects[0], Effect::LoadCatalog));

    // A second fetch while loading is a no-op
    let result = store.dispatch(Action::CatalogFetch);
    assert!(!result.changed);
    assert!(result.effects.is_empty());
}

#[test]
fn test_reducer_catalog_load() {
    let mut store = EffectStore::new(AppState::default(), reducer);

    store.dispatch(Action::CatalogFetch);
    store.dispatch(Action::CatalogDidLoad(CreationCatalog::default()));

    assert!(store.state().catalog.is_loaded());
}

#[test]
fn test_start_screen_keys() {
    let mut harness = TestHarness::<AppState, Action>::default();
    let mut component = StartScreen;

    let actions = harness.send_keys::<NumericComponentId, _, _>("c q", |state, event| {
        let props = StartScreenProps {
            state,
            is_focused: true,
        };
        component
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });

    actions.assert_count(2);
    actions.assert_first(Action::CreationOpen);
}

#[test]
fn test_game_screen_ignores_when_unfocused() {
    let mut harness = TestHarness::<AppState, Action>::new(in_game());
    let mut component = GameScreen;

    let actions = harness.send_keys::<NumericComponentId, _, _>("e s r n", |state, event| {
        let props = GameScreenProps {
            state,
            is_focused: false,
        };
        component
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });

    actions.assert_empty();
}

#[test]
fn test_combat_keys_map_to_commands() {
    let mut state = in_game();
    state.overlay = Some(Overlay::Combat(CombatView {
        enemy: Enemy {
            name: "Demogorgon".into(),
            hp: 30,
            max_hp: 30,
            ac: 15,
            level: 3,
        },
    }));
    let mut harness = TestHarness::<AppState, Action>::new(state);
    let mut component = GameScreen;

    let actions = harness.send_keys::<NumericComponentId, _, _>("a d u f", |state, event| {
        let props = GameScreenProps {
            state,
            is_focused: true,
        };
        component
            .handle_event(&event.kind, props)
            .into_iter()
            .collect::<Vec<_>>()
    });

    assert_eq!(
        actions,
        CombatCommand::ALL
            .iter()
            .map(|c| Action::CombatAct(*c))
            .collect::<Vec<_>>()
    );
    assert_not_emitted!(actions, Action::EncounterStart);
}

#[test]
fn test_action_categories() {
    let did_load = Action::CatalogDidLoad(CreationCatalog::default());
    let scroll = Action::UiScrollLog(1);
    let tick = Action::Tick;

    assert_eq!(did_load.category(), Some("catalog_did"));
    assert_eq!(scroll.category(), Some("ui"));
    assert_eq!(tick.category(), None);

    assert!(did_load.is_catalog_did());
    assert!(scroll.is_ui());
}

#[test]
fn test_harness_emit_and_drain() {
    let mut harness = TestHarness::<(), Action>::new(());

    harness.emit(Action::EncounterStart);
    harness.emit(Action::CombatAct(CombatCommand::Attack));
    harness.emit(Action::CombatDidError(RequestFailure::transport("timeout")));

    let actions = harness.drain_emitted();
    actions.assert_count(3);
    assert_emitted!(actions, Action::CombatAct(CombatCommand::Attack));
    assert_emitted!(actions, Action::CombatDidError(_));
    assert_not_emitted!(actions, Action::Quit);
}
