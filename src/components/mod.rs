pub mod character_sheet;
pub mod confirm_dialog;
pub mod creation_form;
pub mod game_screen;
pub mod message_log;
pub mod shop_overlay;
pub mod start_screen;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use character_sheet::{CharacterSheetPanel, CharacterSheetProps};
pub use confirm_dialog::{ConfirmDialog, ConfirmDialogProps};
pub use creation_form::{CreationFormView, CreationFormProps};
pub use game_screen::{GameScreen, GameScreenProps};
pub use message_log::{MessageLog, MessageLogProps};
pub use shop_overlay::{ShopOverlay, ShopOverlayProps};
pub use start_screen::{StartScreen, StartScreenProps};

use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Borders};
use tui_dispatch_components::{BaseStyle, BorderStyle, ModalStyle, Padding};

pub(crate) const PANEL_BG: Color = Color::Rgb(26, 28, 32);
pub(crate) const TEXT_MAIN: Color = Color::Rgb(232, 232, 232);
pub(crate) const TEXT_DIM: Color = Color::Rgb(140, 140, 140);
pub(crate) const ACCENT: Color = Color::Rgb(126, 200, 180);
pub(crate) const ACCENT_GOLD: Color = Color::Rgb(222, 196, 120);
pub(crate) const ACCENT_RED: Color = Color::Rgb(204, 90, 90);
pub(crate) const UPSIDE_DOWN: Color = Color::Rgb(170, 110, 200);

fn panel_border_style() -> BorderStyle {
    BorderStyle {
        borders: Borders::ALL,
        style: Style::default().fg(TEXT_DIM),
        focused_style: Some(Style::default().fg(ACCENT)),
    }
}

pub(crate) fn panel_block<'a>(title: &'a str, is_focused: bool) -> Block<'a> {
    let border = panel_border_style();
    Block::default()
        .title(title)
        .borders(border.borders)
        .border_style(border.style_for_focus(is_focused))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(PANEL_BG))
}

pub(crate) fn modal_style(accent: Color) -> ModalStyle {
    ModalStyle {
        dim_factor: 0.6,
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(accent)),
            }),
            padding: Padding::all(1),
            bg: Some(PANEL_BG),
            fg: None,
        },
    }
}

/// Word-wrap to `width` columns, splitting words longer than a line
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for raw in text.lines() {
        if raw.trim().is_empty() {
            out.push(String::new());
            continue;
        }
        let mut line = String::new();
        for word in raw.split_whitespace() {
            let word_len = word.chars().count();
            let line_len = line.chars().count();
            if !line.is_empty() && line_len + 1 + word_len <= width {
                line.push(' ');
                line.push_str(word);
                continue;
            }
            if !line.is_empty() {
                out.push(std::mem::take(&mut line));
            }
            if word_len <= width {
                line.push_str(word);
            } else {
                let chars: Vec<char> = word.chars().collect();
                let mut chunks = chars.chunks(width).map(|c| c.iter().collect::<String>());
                let last = chunks.next_back().unwrap_or_default();
                out.extend(chunks);
                line = last;
            }
        }
        if !line.is_empty() {
            out.push(line);
        }
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::wrap_text;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("You hit the Demodog for 5 damage", 12),
            vec!["You hit the", "Demodog for", "5 damage"]
        );
    }

    #[test]
    fn splits_long_words() {
        assert_eq!(wrap_text("abcdefgh ij", 3), vec!["abc", "def", "gh", "ij"]);
    }

    #[test]
    fn empty_text_is_one_blank_line() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
