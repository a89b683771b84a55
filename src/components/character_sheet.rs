use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
};

use super::{ACCENT, ACCENT_GOLD, ACCENT_RED, Component, TEXT_DIM, TEXT_MAIN, panel_block};
use crate::action::Action;
use crate::state::{ENCOUNTERS_PER_CAMPAIGN, GameSnapshot};

pub struct CharacterSheetProps<'a> {
    pub game: Option<&'a GameSnapshot>,
    /// Hide campaign progress (the Upside Down tracks missions instead)
    pub show_progress: bool,
}

/// Character stats, HP bar, and inventory
#[derive(Default)]
pub struct CharacterSheetPanel;

fn label_value(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<8}"), Style::default().fg(TEXT_DIM)),
        Span::styled(value, Style::default().fg(TEXT_MAIN)),
    ])
}

impl Component<Action> for CharacterSheetPanel {
    type Props<'a> = CharacterSheetProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let block = panel_block("Character", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(game) = props.game else {
            frame.render_widget(
                Paragraph::new(Span::styled("No character", Style::default().fg(TEXT_DIM))),
                inner,
            );
            return;
        };
        let sheet = &game.character;

        let chunks = Layout::vertical([
            Constraint::Length(1), // Name
            Constraint::Length(1), // HP gauge
            Constraint::Length(4), // Level, XP, gold, progress
            Constraint::Length(4), // Stats
            Constraint::Min(1),    // Inventory
        ])
        .split(inner);

        let mut title = vec![Span::styled(
            sheet.name.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )];
        if let (Some(race), Some(class)) = (&sheet.race, &sheet.class) {
            title.push(Span::styled(
                format!("  {race} {class}"),
                Style::default().fg(TEXT_DIM),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(title)), chunks[0]);

        let ratio = if sheet.max_hp > 0 {
            (f64::from(sheet.hp) / f64::from(sheet.max_hp)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let hp_color = if ratio <= 0.25 { ACCENT_RED } else { ACCENT };
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(hp_color))
                .ratio(ratio)
                .label(format!("HP {}/{}", sheet.hp, sheet.max_hp)),
            chunks[1],
        );

        let mut info = vec![
            label_value("Level", sheet.level.to_string()),
            label_value("XP", sheet.experience.to_string()),
            Line::from(vec![
                Span::styled(format!("{:<8}", "Gold"), Style::default().fg(TEXT_DIM)),
                Span::styled(sheet.gold.to_string(), Style::default().fg(ACCENT_GOLD)),
            ]),
        ];
        if props.show_progress {
            info.push(label_value(
                "Battles",
                format!("{}/{}", game.encounters_completed, ENCOUNTERS_PER_CAMPAIGN),
            ));
        }
        frame.render_widget(Paragraph::new(info), chunks[2]);

        let stats = sheet.stats.labelled();
        let stat_lines: Vec<Line> = stats
            .chunks(2)
            .map(|pair| {
                let spans: Vec<Span> = pair
                    .iter()
                    .flat_map(|(label, score)| {
                        [
                            Span::styled(format!("{label} "), Style::default().fg(TEXT_DIM)),
                            Span::styled(format!("{score:>2}    "), Style::default().fg(TEXT_MAIN)),
                        ]
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();
        frame.render_widget(Paragraph::new(stat_lines), chunks[3]);

        let mut inventory = vec![Line::from(Span::styled(
            "Inventory",
            Style::default().fg(TEXT_DIM).add_modifier(Modifier::UNDERLINED),
        ))];
        if game.inventory.is_empty() {
            inventory.push(Line::from(Span::styled("(empty)", Style::default().fg(TEXT_DIM))));
        }
        for item in &game.inventory {
            let text = if item.kind.is_empty() {
                item.name.clone()
            } else {
                format!("{} ({})", item.name, item.kind)
            };
            inventory.push(Line::from(text));
        }
        frame.render_widget(Paragraph::new(inventory), chunks[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AbilityScores, CharacterSheet, InventoryItem};
    use tui_dispatch::testing::*;

    fn snapshot() -> GameSnapshot {
        GameSnapshot {
            character: CharacterSheet {
                name: "Dustin".into(),
                level: 2,
                experience: 120,
                hp: 14,
                max_hp: 18,
                gold: 35,
                stats: AbilityScores {
                    strength: 10,
                    dexterity: 12,
                    constitution: 13,
                    intelligence: 17,
                    wisdom: 11,
                    charisma: 14,
                },
                ..Default::default()
            },
            inventory: vec![InventoryItem {
                name: "Health Potion".into(),
                kind: "potion".into(),
                value: Some(25),
            }],
            encounters_completed: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_sheet() {
        let mut render = RenderHarness::new(36, 20);
        let mut component = CharacterSheetPanel;
        let game = snapshot();

        let output = render.render_to_string_plain(|frame| {
            let props = CharacterSheetProps {
                game: Some(&game),
                show_progress: true,
            };
            component.render(frame, frame.area(), props);
        });

        assert!(output.contains("Dustin"), "{output}");
        assert!(output.contains("HP 14/18"), "{output}");
        assert!(output.contains("Battles 2/5"), "{output}");
        assert!(output.contains("INT 17"), "{output}");
        assert!(output.contains("Health Potion (potion)"), "{output}");
    }

    #[test]
    fn test_render_without_character() {
        let mut render = RenderHarness::new(30, 6);
        let mut component = CharacterSheetPanel;

        let output = render.render_to_string_plain(|frame| {
            let props = CharacterSheetProps {
                game: None,
                show_progress: true,
            };
            component.render(frame, frame.area(), props);
        });

        assert!(output.contains("No character"));
    }
}
