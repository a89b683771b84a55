//! Adventure TUI - terminal client for the Dungeons & Adventures game server

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use adventure_tui::action::Action;
use adventure_tui::api::{ApiError, FailureKind, GameClient, RequestFailure};
use adventure_tui::components::{
    Component, ConfirmDialog, ConfirmDialogProps, CreationFormProps, CreationFormView, GameScreen,
    GameScreenProps, ShopOverlay, ShopOverlayProps, StartScreen, StartScreenProps,
};
use adventure_tui::config::{Args, RuntimeConfig, SERVER_ENV};
use adventure_tui::effect::Effect;
use adventure_tui::reducer::reducer;
use adventure_tui::state::{AppState, SPINNER_TICK_MS, Screen};
use adventure_tui::telemetry::init_file_telemetry;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{DebugRunOutput, DebugSession, DebugSessionError, ReplayItem};

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum AdventureComponentId {
    Start,
    Creation,
    Game,
    Shop,
    Confirm,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum AdventureContext {
    Main,
    Form,
    Modal,
}

impl EventRoutingState<AdventureComponentId, AdventureContext> for AppState {
    fn focused(&self) -> Option<AdventureComponentId> {
        if let Some(id) = self.modal() {
            return Some(id);
        }
        Some(match self.screen {
            Screen::Start => AdventureComponentId::Start,
            Screen::CharacterCreation => AdventureComponentId::Creation,
            Screen::Game => AdventureComponentId::Game,
        })
    }

    fn modal(&self) -> Option<AdventureComponentId> {
        if self.confirm_new_game {
            Some(AdventureComponentId::Confirm)
        } else if self.shop().is_some() {
            Some(AdventureComponentId::Shop)
        } else {
            None
        }
    }

    fn binding_context(&self, id: AdventureComponentId) -> AdventureContext {
        match id {
            AdventureComponentId::Start | AdventureComponentId::Game => AdventureContext::Main,
            AdventureComponentId::Creation => AdventureContext::Form,
            AdventureComponentId::Shop | AdventureComponentId::Confirm => AdventureContext::Modal,
        }
    }

    fn default_context(&self) -> AdventureContext {
        AdventureContext::Main
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        server,
        timeout,
        poll_interval,
        log_file,
        debug: debug_args,
    } = Args::parse();

    let config = RuntimeConfig::resolve(
        server,
        std::env::var(SERVER_ENV).ok(),
        timeout,
        poll_interval,
        log_file,
    )
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    init_file_telemetry(&config.log_file)?;
    tracing::info!(server = %config.server, "starting adventure client");

    let client = GameClient::new(&config.server, config.timeout).map_err(api_error)?;

    let debug = DebugSession::new(debug_args);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let state = debug
        .load_state_or_else_async(|| async { Ok::<AppState, io::Error>(AppState::default()) })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &debug,
        store,
        Arc::new(client),
        config.poll_interval,
        replay_actions,
    )
    .await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    tracing::info!("adventure client stopped");
    Ok(())
}

struct AdventureUi {
    start: StartScreen,
    creation: CreationFormView,
    game: GameScreen,
    shop: ShopOverlay,
    confirm: ConfirmDialog,
}

impl AdventureUi {
    fn new() -> Self {
        Self {
            start: StartScreen,
            creation: CreationFormView::new(),
            game: GameScreen,
            shop: ShopOverlay::new(),
            confirm: ConfirmDialog::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<AdventureComponentId>,
    ) {
        let base_focused = render_ctx.is_focused() && state.modal().is_none();

        for id in [
            AdventureComponentId::Start,
            AdventureComponentId::Creation,
            AdventureComponentId::Game,
            AdventureComponentId::Shop,
            AdventureComponentId::Confirm,
        ] {
            event_ctx.component_areas.remove(&id);
        }

        self.creation
            .set_open(state.screen == Screen::CharacterCreation);
        match state.screen {
            Screen::Start => {
                event_ctx.set_component_area(AdventureComponentId::Start, area);
                self.start.render(
                    frame,
                    area,
                    StartScreenProps {
                        state,
                        is_focused: base_focused,
                    },
                );
            }
            Screen::CharacterCreation => {
                event_ctx.set_component_area(AdventureComponentId::Creation, area);
                self.creation.render(
                    frame,
                    area,
                    CreationFormProps {
                        state,
                        is_focused: base_focused,
                    },
                );
            }
            Screen::Game => {
                event_ctx.set_component_area(AdventureComponentId::Game, area);
                self.game.render(
                    frame,
                    area,
                    GameScreenProps {
                        state,
                        is_focused: base_focused,
                    },
                );
            }
        }

        if let Some(shop) = state.shop() {
            event_ctx.set_component_area(AdventureComponentId::Shop, ShopOverlay::modal_area(area));
            self.shop.render(
                frame,
                area,
                ShopOverlayProps {
                    shop,
                    is_busy: state.is_busy(),
                    is_focused: render_ctx.is_focused() && !state.confirm_new_game,
                    on_select: Action::ShopSelect,
                },
            );
        }

        if state.confirm_new_game {
            event_ctx.set_component_area(
                AdventureComponentId::Confirm,
                ConfirmDialog::modal_area(area),
            );
            self.confirm.render(
                frame,
                area,
                ConfirmDialogProps {
                    title: "New Game",
                    message: "Abandon this character and start over?",
                    is_focused: render_ctx.is_focused(),
                },
            );
        }
    }

    fn handle_start_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let props = StartScreenProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self.start.handle_event(event, props).into_iter().collect();
        respond(actions)
    }

    fn handle_creation_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        self.creation
            .set_open(state.screen == Screen::CharacterCreation);
        let props = CreationFormProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self
            .creation
            .handle_event(event, props)
            .into_iter()
            .collect();
        respond(actions)
    }

    fn handle_game_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let props = GameScreenProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self.game.handle_event(event, props).into_iter().collect();
        respond(actions)
    }

    fn handle_shop_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let Some(shop) = state.shop() else {
            return HandlerResponse::ignored();
        };
        let props = ShopOverlayProps {
            shop,
            is_busy: state.is_busy(),
            is_focused: true,
            on_select: Action::ShopSelect,
        };
        let mut actions: Vec<_> = self.shop.handle_event(event, props).into_iter().collect();
        // Log scrolling, refresh and new game stay reachable behind the shop
        if actions.is_empty() {
            actions = self.handle_game_event(event, state).actions;
        }
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }

    fn handle_confirm_event(
        &mut self,
        event: &EventKind,
        _state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = ConfirmDialogProps {
            title: "New Game",
            message: "",
            is_focused: true,
        };
        let actions: Vec<_> = self
            .confirm
            .handle_event(event, props)
            .into_iter()
            .collect();
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn respond(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

fn api_error(error: ApiError) -> io::Error {
    io::Error::other(format!("could not build game client: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    client: Arc<GameClient>,
    poll_interval: Duration,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(AdventureUi::new()));
    let mut bus: EventBus<AppState, Action, AdventureComponentId, AdventureContext> =
        EventBus::new();
    let keybindings: Keybindings<AdventureContext> = Keybindings::new();

    let ui_start = Rc::clone(&ui);
    bus.register(AdventureComponentId::Start, move |event, state| {
        ui_start.borrow_mut().handle_start_event(&event.kind, state)
    });

    let ui_creation = Rc::clone(&ui);
    bus.register(AdventureComponentId::Creation, move |event, state| {
        ui_creation
            .borrow_mut()
            .handle_creation_event(&event.kind, state)
    });

    let ui_game = Rc::clone(&ui);
    bus.register(AdventureComponentId::Game, move |event, state| {
        ui_game.borrow_mut().handle_game_event(&event.kind, state)
    });

    let ui_shop = Rc::clone(&ui);
    bus.register(AdventureComponentId::Shop, move |event, state| {
        ui_shop.borrow_mut().handle_shop_event(&event.kind, state)
    });

    let ui_confirm = Rc::clone(&ui);
    bus.register(AdventureComponentId::Confirm, move |event, state| {
        ui_confirm
            .borrow_mut()
            .handle_confirm_event(&event.kind, state)
    });

    // Re-render on terminal resize (no action needed, just redraw)
    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::CatalogFetch),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(SPINNER_TICK_MS),
                    || Action::Tick,
                );

                runtime
                    .subscriptions()
                    .interval("upside_down_poll", poll_interval, || {
                        Action::UpsideDownPoll
                    });
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            move |effect, ctx| handle_effect(effect, ctx, Arc::clone(&client)),
        )
        .await
}

fn failure(context: &str, error: ApiError) -> RequestFailure {
    let failure = RequestFailure::from(error);
    match failure.kind {
        FailureKind::Transport => {
            tracing::warn!(request = context, error = %failure.message, "request failed")
        }
        FailureKind::Rejected => {
            tracing::info!(request = context, reason = %failure.message, "server refused")
        }
    }
    failure
}

/// Handle effects by spawning tasks
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>, client: Arc<GameClient>) {
    let key = effect.task_key();
    match effect {
        Effect::LoadCatalog => {
            ctx.tasks().spawn(key, async move {
                match client.creation_options().await {
                    Ok(catalog) => Action::CatalogDidLoad(catalog),
                    Err(e) => {
                        tracing::warn!(error = %e, "could not load creation options");
                        Action::CatalogDidError(e.to_string())
                    }
                }
            });
        }
        Effect::CreateCharacter(request) => {
            ctx.tasks().spawn(key, async move {
                match client.create_character(&request).await {
                    Ok(created) => Action::CharacterDidCreate(created),
                    Err(e) => Action::CharacterDidError(failure("create_character", e)),
                }
            });
        }
        Effect::FetchGameState { announce } => {
            ctx.tasks().spawn(key, async move {
                match client.game_state().await {
                    Ok(snapshot) => Action::GameStateDidLoad { snapshot, announce },
                    Err(e) => Action::GameStateDidError(failure("game_state", e)),
                }
            });
        }
        Effect::StartEncounter => {
            ctx.tasks().spawn(key, async move {
                match client.start_encounter().await {
                    Ok(started) => Action::EncounterDidStart(started),
                    Err(e) => Action::EncounterDidError(failure("encounter", e)),
                }
            });
        }
        Effect::Combat(command) => {
            ctx.tasks().spawn(key, async move {
                match client.combat_action(command).await {
                    Ok(outcome) => Action::CombatDidResolve(outcome),
                    Err(e) => Action::CombatDidError(failure("combat", e)),
                }
            });
        }
        Effect::VisitShop => {
            ctx.tasks().spawn(key, async move {
                match client.visit_shop().await {
                    Ok(stock) => Action::ShopDidOpen(stock),
                    Err(e) => Action::ShopDidError(failure("shop", e)),
                }
            });
        }
        Effect::BuyItem(item) => {
            ctx.tasks().spawn(key, async move {
                match client.buy_item(&item).await {
                    Ok(purchase) => Action::ShopDidBuy {
                        item: item.to_string(),
                        purchase,
                    },
                    Err(e) => Action::ShopBuyDidError(failure("buy", e)),
                }
            });
        }
        Effect::Rest => {
            ctx.tasks().spawn(key, async move {
                match client.rest().await {
                    Ok(outcome) => Action::RestDidComplete(outcome),
                    Err(e) => Action::RestDidError(failure("rest", e)),
                }
            });
        }
        Effect::NewGame => {
            ctx.tasks().spawn(key, async move {
                match client.new_game().await {
                    Ok(()) => Action::NewGameDidComplete,
                    Err(e) => Action::NewGameDidError(failure("new_game", e)),
                }
            });
        }
    }
}
