use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::{ACCENT, ACCENT_GOLD, ACCENT_RED, Component, TEXT_DIM, TEXT_MAIN, panel_block, wrap_text};
use crate::action::Action;
use crate::state::{LogMessage, MessageKind};

pub struct MessageLogProps<'a> {
    pub messages: &'a [LogMessage],
    /// Number of newest messages hidden below the view
    pub scroll: u16,
    pub is_focused: bool,
}

/// Adventure log, newest message at the bottom
#[derive(Default)]
pub struct MessageLog;

fn kind_style(kind: MessageKind) -> Style {
    match kind {
        MessageKind::Info => Style::default().fg(TEXT_MAIN),
        MessageKind::Combat => Style::default().fg(ACCENT_RED),
        MessageKind::Success => Style::default()
            .fg(ACCENT_GOLD)
            .add_modifier(Modifier::BOLD),
    }
}

impl Component<Action> for MessageLog {
    type Props<'a> = MessageLogProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let title = if props.scroll > 0 {
            format!("Log (+{} newer)", props.scroll)
        } else {
            "Log".to_string()
        };
        let block = panel_block(&title, props.is_focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let visible = props
            .messages
            .len()
            .saturating_sub(usize::from(props.scroll));
        let width = inner.width.saturating_sub(2) as usize;

        let mut lines: Vec<Line> = Vec::new();
        for message in &props.messages[..visible] {
            let style = kind_style(message.kind);
            for (idx, chunk) in wrap_text(&message.text, width).into_iter().enumerate() {
                let marker = if idx == 0 { "> " } else { "  " };
                lines.push(Line::from(vec![
                    Span::styled(marker, Style::default().fg(TEXT_DIM)),
                    Span::styled(chunk, style),
                ]));
            }
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "Nothing has happened yet.",
                Style::default().fg(ACCENT),
            )));
        }

        // Bottom-align: skip whatever does not fit above the newest line
        let skip = lines.len().saturating_sub(inner.height as usize);
        let lines: Vec<Line> = lines.into_iter().skip(skip).collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui_dispatch::testing::*;

    fn messages() -> Vec<LogMessage> {
        vec![
            LogMessage::new(MessageKind::Info, "first entry"),
            LogMessage::new(MessageKind::Combat, "second entry"),
            LogMessage::new(MessageKind::Success, "third entry"),
        ]
    }

    #[test]
    fn test_render_shows_newest_messages() {
        let mut render = RenderHarness::new(40, 4);
        let mut component = MessageLog;
        let messages = messages();

        let output = render.render_to_string_plain(|frame| {
            let props = MessageLogProps {
                messages: &messages,
                scroll: 0,
                is_focused: false,
            };
            component.render(frame, frame.area(), props);
        });

        assert!(output.contains("second entry"));
        assert!(output.contains("third entry"));
        assert!(!output.contains("first entry"));
    }

    #[test]
    fn test_scroll_hides_newest() {
        let mut render = RenderHarness::new(40, 6);
        let mut component = MessageLog;
        let messages = messages();

        let output = render.render_to_string_plain(|frame| {
            let props = MessageLogProps {
                messages: &messages,
                scroll: 1,
                is_focused: false,
            };
            component.render(frame, frame.area(), props);
        });

        assert!(output.contains("first entry"));
        assert!(!output.contains("third entry"));
        assert!(output.contains("+1 newer"));
    }
}
