use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{
    ACCENT, ACCENT_GOLD, ACCENT_RED, CharacterSheetPanel, CharacterSheetProps, Component,
    MessageLog, MessageLogProps, TEXT_DIM, TEXT_MAIN, UPSIDE_DOWN, panel_block,
};
use crate::action::Action;
use crate::api::CombatCommand;
use crate::state::{ActionButton, AppState, CombatView, UpsideDownStatus};

/// Messages scrolled per PageUp/PageDown
const LOG_PAGE: i16 = 5;

pub struct GameScreenProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Main game screen: character sheet, encounter panel, actions, log
#[derive(Default)]
pub struct GameScreen;

fn combat_key(code: KeyCode) -> Option<CombatCommand> {
    match code {
        KeyCode::Char('a') | KeyCode::Char('1') => Some(CombatCommand::Attack),
        KeyCode::Char('d') | KeyCode::Char('2') => Some(CombatCommand::Defend),
        KeyCode::Char('u') | KeyCode::Char('3') => Some(CombatCommand::UseItem),
        KeyCode::Char('f') | KeyCode::Char('4') => Some(CombatCommand::Flee),
        _ => None,
    }
}

fn command_key(command: CombatCommand) -> char {
    match command {
        CombatCommand::Attack => 'a',
        CombatCommand::Defend => 'd',
        CombatCommand::UseItem => 'u',
        CombatCommand::Flee => 'f',
    }
}

fn button_label(button: ActionButton) -> (&'static str, &'static str) {
    match button {
        ActionButton::Encounter => ("e", "Encounter"),
        ActionButton::Shop => ("s", "Shop"),
        ActionButton::Rest => ("r", "Rest (20g)"),
    }
}

impl Component<Action> for GameScreen {
    type Props<'a> = GameScreenProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        let EventKind::Key(key) = event else {
            return None;
        };

        let state = props.state;
        if state.in_combat() {
            if let Some(command) = combat_key(key.code) {
                return Some(Action::CombatAct(command));
            }
        }

        match key.code {
            KeyCode::Char('e') if state.action_enabled(ActionButton::Encounter) => {
                Some(Action::EncounterStart)
            }
            KeyCode::Char('s') if state.action_enabled(ActionButton::Shop) => {
                Some(Action::ShopVisit)
            }
            KeyCode::Char('r') if state.action_enabled(ActionButton::Rest) => Some(Action::Rest),
            KeyCode::Char('n') => Some(Action::NewGameRequest),
            KeyCode::Char('g') => Some(Action::GameStateRefresh { announce: false }),
            KeyCode::PageUp => Some(Action::UiScrollLog(LOG_PAGE)),
            KeyCode::PageDown => Some(Action::UiScrollLog(-LOG_PAGE)),
            KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let [sheet_area, right] =
            Layout::horizontal([Constraint::Length(34), Constraint::Min(30)]).areas(chunks[0]);

        let mut sheet = CharacterSheetPanel;
        sheet.render(
            frame,
            sheet_area,
            CharacterSheetProps {
                game: state.game.as_ref(),
                show_progress: !state.is_upside_down(),
            },
        );

        let panel_height = if state.in_combat() || state.is_upside_down() {
            7
        } else {
            0
        };
        let [panel_area, actions_area, log_area] = Layout::vertical([
            Constraint::Length(panel_height),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .areas(right);

        if let Some(combat) = state.combat() {
            render_combat(frame, panel_area, combat, props.is_focused && !state.is_busy());
        } else if state.is_upside_down() {
            let status = state.game.as_ref().and_then(|g| g.upside_down.as_ref());
            render_upside_down(frame, panel_area, status);
        }

        render_actions(frame, actions_area, state);

        let mut log = MessageLog;
        log.render(
            frame,
            log_area,
            MessageLogProps {
                messages: &state.log,
                scroll: state.log_scroll,
                is_focused: false,
            },
        );

        let (busy, busy_color) = if state.is_busy() {
            (
                format!("{} waiting for the server", state.spinner()),
                ACCENT_GOLD,
            )
        } else if state.sheet_stale {
            ("sheet out of date, g to retry".to_string(), ACCENT_RED)
        } else {
            (String::new(), ACCENT_GOLD)
        };
        let busy_items = [StatusBarItem::span(Span::styled(
            busy.as_str(),
            Style::default().fg(busy_color),
        ))];
        let hints: Vec<StatusBarHint> = if state.in_combat() {
            vec![
                StatusBarHint::new("a/d/u/f", "combat"),
                StatusBarHint::new("g", "refresh"),
                StatusBarHint::new("pgup/pgdn", "log"),
                StatusBarHint::new("n", "new game"),
                StatusBarHint::new("q", "quit"),
            ]
        } else {
            vec![
                StatusBarHint::new("g", "refresh"),
                StatusBarHint::new("pgup/pgdn", "log"),
                StatusBarHint::new("n", "new game"),
                StatusBarHint::new("q", "quit"),
            ]
        };
        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[1],
            StatusBarProps {
                left: StatusBarSection::items(&busy_items),
                center: StatusBarSection::hints(&hints),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

fn render_actions(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel_block("Actions", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = Vec::new();
    if state.actions_visible() {
        for button in ActionButton::ALL {
            let (key, label) = button_label(button);
            let style = if state.action_enabled(button) && !state.is_busy() {
                Style::default().fg(TEXT_MAIN)
            } else {
                Style::default().fg(TEXT_DIM).add_modifier(Modifier::CROSSED_OUT)
            };
            spans.push(Span::styled(format!("[{key}] "), Style::default().fg(ACCENT)));
            spans.push(Span::styled(label, style));
            spans.push(Span::raw("   "));
        }
    }
    spans.push(Span::styled("[n] ", Style::default().fg(ACCENT)));
    spans.push(Span::styled("New Game", Style::default().fg(TEXT_MAIN)));
    frame.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_combat(frame: &mut Frame, area: Rect, combat: &CombatView, commands_live: bool) {
    let enemy = &combat.enemy;
    let title = format!("Combat: {}", enemy.name);
    let block = panel_block(&title, true).border_style(Style::default().fg(ACCENT_RED));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(1), // HP gauge
        Constraint::Length(1), // AC / level
        Constraint::Length(1), // spacer
        Constraint::Min(1),    // Commands
    ])
    .split(inner);

    let ratio = if enemy.max_hp > 0 {
        (f64::from(enemy.hp) / f64::from(enemy.max_hp)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(ACCENT_RED))
            .ratio(ratio)
            .label(format!("HP {}/{}", enemy.hp, enemy.max_hp)),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("AC ", Style::default().fg(TEXT_DIM)),
            Span::styled(enemy.ac.to_string(), Style::default().fg(TEXT_MAIN)),
            Span::styled("   Level ", Style::default().fg(TEXT_DIM)),
            Span::styled(enemy.level.to_string(), Style::default().fg(TEXT_MAIN)),
        ])),
        rows[1],
    );

    let command_style = if commands_live {
        Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    };
    let mut spans = Vec::new();
    for command in CombatCommand::ALL {
        spans.push(Span::styled(
            format!("[{}] ", command_key(command)),
            Style::default().fg(ACCENT),
        ));
        spans.push(Span::styled(command.label(), command_style));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[3]);
}

fn render_upside_down(frame: &mut Frame, area: Rect, status: Option<&UpsideDownStatus>) {
    let block = panel_block("The Upside Down", false).border_style(Style::default().fg(UPSIDE_DOWN));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(status) = status else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "Waiting for word from the Upside Down...",
                Style::default().fg(TEXT_DIM),
            )),
            inner,
        );
        return;
    };

    let row = |label: &str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!("{label:<20}"), Style::default().fg(TEXT_DIM)),
            Span::styled(value, Style::default().fg(color)),
        ])
    };
    let lines = vec![
        row("Vecna's Power", status.vecna_power.to_string(), UPSIDE_DOWN),
        row("Vecna's Favor", status.vecna_favor.to_string(), UPSIDE_DOWN),
        row("Missions Completed", status.missions_completed.to_string(), ACCENT_GOLD),
        row("Captured People", status.captured_people.to_string(), ACCENT_RED),
        row("Hawkins Resources", status.hawkins_resources.to_string(), ACCENT),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creation::AdventureType;
    use crate::state::{Enemy, GameSnapshot, Overlay, Screen, ShopView};
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tui_dispatch::testing::*;

    fn in_game() -> AppState {
        AppState {
            screen: Screen::Game,
            game: Some(GameSnapshot::default()),
            ..Default::default()
        }
    }

    fn actions_for(state: &AppState, k: &str) -> Vec<Action> {
        let mut component = GameScreen;
        component
            .handle_event(
                &EventKind::Key(key(k)),
                GameScreenProps {
                    state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect()
    }

    #[test]
    fn test_main_keys() {
        let state = in_game();
        actions_for(&state, "e").assert_first(Action::EncounterStart);
        actions_for(&state, "s").assert_first(Action::ShopVisit);
        actions_for(&state, "r").assert_first(Action::Rest);
        actions_for(&state, "n").assert_first(Action::NewGameRequest);
        actions_for(&state, "g").assert_first(Action::GameStateRefresh { announce: false });
    }

    #[test]
    fn test_stale_sheet_hint() {
        let mut state = in_game();
        state.sheet_stale = true;

        let mut render = RenderHarness::new(100, 30);
        let mut component = GameScreen;
        let output = render.render_to_string_plain(|frame| {
            component.render(
                frame,
                frame.area(),
                GameScreenProps {
                    state: &state,
                    is_focused: true,
                },
            );
        });
        assert!(output.contains("sheet out of date"), "{output}");
    }

    #[test]
    fn test_combat_keys_replace_main_actions() {
        let mut state = in_game();
        state.overlay = Some(Overlay::Combat(CombatView {
            enemy: Enemy::default(),
        }));
        actions_for(&state, "a").assert_first(Action::CombatAct(CombatCommand::Attack));
        actions_for(&state, "3").assert_first(Action::CombatAct(CombatCommand::UseItem));
        actions_for(&state, "e").assert_empty();
        actions_for(&state, "r").assert_empty();
    }

    #[test]
    fn test_shop_open_only_allows_shop_refresh() {
        let mut state = in_game();
        state.overlay = Some(Overlay::Shop(ShopView::default()));
        actions_for(&state, "s").assert_first(Action::ShopVisit);
        actions_for(&state, "e").assert_empty();
        actions_for(&state, "n").assert_first(Action::NewGameRequest);
        actions_for(&state, "g").assert_first(Action::GameStateRefresh { announce: false });

        let mut component = GameScreen;
        let scrolled: Vec<_> = component
            .handle_event(
                &EventKind::Key(KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE)),
                GameScreenProps {
                    state: &state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect();
        scrolled.assert_first(Action::UiScrollLog(LOG_PAGE));
    }

    #[test]
    fn test_upside_down_hides_standard_actions() {
        let mut state = in_game();
        state.adventure = AdventureType::UpsideDown;
        actions_for(&state, "e").assert_empty();
        actions_for(&state, "s").assert_empty();

        let mut render = RenderHarness::new(100, 30);
        let mut component = GameScreen;
        let output = render.render_to_string_plain(|frame| {
            component.render(
                frame,
                frame.area(),
                GameScreenProps {
                    state: &state,
                    is_focused: true,
                },
            );
        });
        assert!(!output.contains("[e] Encounter"), "{output}");
        assert!(output.contains("Waiting for word"), "{output}");
    }
}
