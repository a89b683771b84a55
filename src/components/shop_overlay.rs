use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Modal, ModalBehavior, ModalProps, Padding, ScrollbarStyle, SelectList,
    SelectListBehavior, SelectListProps, SelectListStyle, SelectionStyle, centered_rect,
};

use super::{ACCENT, ACCENT_GOLD, Component, TEXT_DIM, TEXT_MAIN, modal_style};
use crate::action::Action;
use crate::state::{ShopItem, ShopView};

pub struct ShopOverlayProps<'a> {
    pub shop: &'a ShopView,
    pub is_busy: bool,
    pub is_focused: bool,
    pub on_select: fn(usize) -> Action,
}

/// Shop modal: item list, gold, buy/close
pub struct ShopOverlay {
    list: SelectList,
    modal: Modal,
}

impl Default for ShopOverlay {
    fn default() -> Self {
        Self {
            list: SelectList::new(),
            modal: Modal::new(),
        }
    }
}

impl ShopOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modal_area(area: Rect) -> Rect {
        centered_rect(60, 18, area)
    }

    fn item_lines(items: &[ShopItem]) -> Vec<Line<'static>> {
        items
            .iter()
            .map(|item| {
                let mut spans = vec![Span::styled(
                    format!("{:<22}", item.name),
                    Style::default().fg(TEXT_MAIN),
                )];
                spans.push(Span::styled(
                    format!("{:<10}", item.kind),
                    Style::default().fg(TEXT_DIM),
                ));
                spans.push(Span::styled(
                    format!("{:>4} gold", item.value),
                    Style::default().fg(ACCENT_GOLD),
                ));
                Line::from(spans)
            })
            .collect()
    }

    fn list_style() -> SelectListStyle {
        SelectListStyle {
            base: BaseStyle {
                border: None,
                padding: Padding::xy(1, 0),
                bg: None,
                fg: None,
            },
            selection: SelectionStyle::default(),
            scrollbar: ScrollbarStyle::default(),
        }
    }
}

impl Component<Action> for ShopOverlay {
    type Props<'a> = ShopOverlayProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        let EventKind::Key(key) = event else {
            return Vec::new();
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('x') => vec![Action::ShopClose],
            KeyCode::Enter | KeyCode::Char('b') => vec![Action::ShopBuy],
            KeyCode::Char('s') => vec![Action::ShopVisit],
            KeyCode::Char('q') => vec![Action::Quit],
            KeyCode::Up | KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('k') => {
                if props.shop.items.is_empty() {
                    return Vec::new();
                }
                let items = Self::item_lines(&props.shop.items);
                let list_props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: props.shop.selected,
                    is_focused: true,
                    style: Self::list_style(),
                    behavior: SelectListBehavior::default(),
                    on_select: props.on_select,
                    render_item: &|item| item.clone(),
                };
                self.list
                    .handle_event(event, list_props)
                    .into_iter()
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if area.width < 30 || area.height < 10 {
            return;
        }

        let ShopOverlay { list, modal } = self;
        let shop = props.shop;
        let modal_area = Self::modal_area(area);
        let mut render_content = |frame: &mut Frame, content_area: Rect| {
            let chunks = Layout::vertical([
                Constraint::Length(1), // Gold
                Constraint::Length(1), // spacer
                Constraint::Min(3),    // Items
                Constraint::Length(2), // Description
                Constraint::Length(1), // Hints
            ])
            .split(content_area);

            let mut header = vec![
                Span::styled("Gold: ", Style::default().fg(TEXT_DIM)),
                Span::styled(
                    shop.gold.to_string(),
                    Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
                ),
            ];
            if props.is_busy {
                header.push(Span::styled("   working...", Style::default().fg(TEXT_DIM)));
            }
            frame.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

            if shop.items.is_empty() {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        "The shelves are empty.",
                        Style::default().fg(TEXT_DIM),
                    )),
                    chunks[2],
                );
            } else {
                let items = Self::item_lines(&shop.items);
                let list_props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: shop.selected,
                    is_focused: props.is_focused,
                    style: Self::list_style(),
                    behavior: SelectListBehavior::default(),
                    on_select: props.on_select,
                    render_item: &|item| item.clone(),
                };
                list.render(frame, chunks[2], list_props);
            }

            let description = shop
                .selected_item()
                .and_then(|item| item.description.clone())
                .unwrap_or_default();
            frame.render_widget(
                Paragraph::new(Span::styled(description, Style::default().fg(TEXT_DIM)))
                    .wrap(Wrap { trim: true }),
                chunks[3],
            );

            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("enter", Style::default().fg(ACCENT)),
                    Span::styled(" buy  ", Style::default().fg(TEXT_DIM)),
                    Span::styled("s", Style::default().fg(ACCENT)),
                    Span::styled(" restock  ", Style::default().fg(TEXT_DIM)),
                    Span::styled("esc", Style::default().fg(ACCENT)),
                    Span::styled(" back to town", Style::default().fg(TEXT_DIM)),
                ])),
                chunks[4],
            );
        };

        modal.render(
            frame,
            area,
            ModalProps {
                is_open: true,
                is_focused: props.is_focused,
                area: modal_area,
                style: modal_style(ACCENT_GOLD),
                behavior: ModalBehavior::default(),
                on_close: || Action::ShopClose,
                render_content: &mut render_content,
            },
        );
    }
}
