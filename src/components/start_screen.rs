use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::{DataResource, EventKind};
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{ACCENT, ACCENT_GOLD, ACCENT_RED, Component, TEXT_DIM};
use crate::action::Action;
use crate::state::AppState;

pub struct StartScreenProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Title screen with the create-character prompt
#[derive(Default)]
pub struct StartScreen;

impl Component<Action> for StartScreen {
    type Props<'a> = StartScreenProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Enter | KeyCode::Char('c') => Some(Action::CreationOpen),
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let [body] = Layout::vertical([Constraint::Length(8)])
            .flex(Flex::Center)
            .areas(chunks[0]);

        let catalog_line = match &props.state.catalog {
            DataResource::Loading => Line::from(Span::styled(
                "Loading races and classes...",
                Style::default().fg(TEXT_DIM),
            )),
            DataResource::Failed(error) => Line::from(Span::styled(
                format!("Could not reach the game server: {error}"),
                Style::default().fg(ACCENT_RED),
            )),
            _ => Line::default(),
        };

        let lines = vec![
            Line::from(Span::styled(
                "Dungeons & Adventures",
                Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(
                props
                    .state
                    .log
                    .last()
                    .map(|m| m.text.as_str())
                    .unwrap_or_default()
                    .to_string(),
                Style::default().fg(TEXT_DIM),
            )),
            Line::default(),
            Line::from(Span::styled(
                "[ Create Character ]",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            catalog_line,
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[1],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("enter", "create character"),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}
