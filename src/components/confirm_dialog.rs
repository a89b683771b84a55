use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{Modal, ModalBehavior, ModalProps, centered_rect};

use super::{ACCENT, ACCENT_RED, Component, TEXT_DIM, TEXT_MAIN, modal_style};
use crate::action::Action;

pub struct ConfirmDialogProps<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub is_focused: bool,
}

/// Yes/no prompt shown before discarding the current character
pub struct ConfirmDialog {
    modal: Modal,
}

impl Default for ConfirmDialog {
    fn default() -> Self {
        Self {
            modal: Modal::new(),
        }
    }
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modal_area(area: Rect) -> Rect {
        centered_rect(48, 8, area)
    }
}

impl Component<Action> for ConfirmDialog {
    type Props<'a> = ConfirmDialogProps<'a>;

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
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    Some(Action::NewGameConfirm)
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    Some(Action::NewGameCancel)
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if area.width < 20 || area.height < 6 {
            return;
        }

        let modal_area = Self::modal_area(area);
        let mut render_content = |frame: &mut Frame, content_area: Rect| {
            let chunks = Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(content_area);

            frame.render_widget(
                Paragraph::new(Span::styled(
                    props.title,
                    Style::default().fg(ACCENT_RED).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center),
                chunks[0],
            );
            frame.render_widget(
                Paragraph::new(Span::styled(props.message, Style::default().fg(TEXT_MAIN)))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                chunks[1],
            );
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("[y]", Style::default().fg(ACCENT)),
                    Span::styled(" yes   ", Style::default().fg(TEXT_DIM)),
                    Span::styled("[n]", Style::default().fg(ACCENT)),
                    Span::styled(" no", Style::default().fg(TEXT_DIM)),
                ]))
                .alignment(Alignment::Center),
                chunks[2],
            );
        };

        self.modal.render(
            frame,
            area,
            ModalProps {
                is_open: true,
                is_focused: props.is_focused,
                area: modal_area,
                style: modal_style(ACCENT_RED),
                behavior: ModalBehavior::default(),
                on_close: || Action::NewGameCancel,
                render_content: &mut render_content,
            },
        );
    }
}
