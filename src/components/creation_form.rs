use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarProps, StatusBarSection,
    StatusBarStyle, TextInput, TextInputProps, TextInputStyle,
};

use super::{ACCENT, ACCENT_GOLD, ACCENT_RED, Component, TEXT_DIM, TEXT_MAIN, panel_block};
use crate::action::Action;
use crate::creation::{CreationCatalog, CreationField, CreationForm};
use crate::state::AppState;

pub struct CreationFormProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Character creation form: name, race, class, adventure type
pub struct CreationFormView {
    input: TextInput,
    was_open: bool,
}

impl Default for CreationFormView {
    fn default() -> Self {
        Self {
            input: TextInput::new(),
            was_open: false,
        }
    }
}

impl CreationFormView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the name cursor whenever the form is reopened
    pub fn set_open(&mut self, is_open: bool) {
        if is_open && !self.was_open {
            self.input = TextInput::new();
        }
        self.was_open = is_open;
    }
}

fn input_style() -> TextInputStyle {
    TextInputStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: Some(Color::Rgb(50, 50, 60)),
            fg: None,
        },
        placeholder_style: None,
        cursor_style: None,
    }
}

fn option_actions(
    form: &CreationForm,
    catalog: Option<&CreationCatalog>,
    forward: bool,
) -> Vec<Action> {
    match form.focus {
        CreationField::Race => catalog
            .and_then(|c| c.step_race(form.race.as_deref(), forward))
            .map(Action::CreationSelectRace)
            .into_iter()
            .collect(),
        CreationField::Class => catalog
            .and_then(|c| c.step_class(form.race.as_deref(), form.class.as_deref(), forward))
            .map(Action::CreationSelectClass)
            .into_iter()
            .collect(),
        CreationField::Adventure => vec![Action::CreationToggleAdventure],
        CreationField::Name | CreationField::Submit => Vec::new(),
    }
}

fn label(text: &str, focused: bool) -> Span<'static> {
    let (marker, style) = if focused {
        ("> ", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
    } else {
        ("  ", Style::default().fg(TEXT_DIM))
    };
    Span::styled(format!("{marker}{text:<10}"), style)
}

fn selector_line(text: &str, value: Option<&str>, focused: bool) -> Line<'static> {
    let value = match value {
        Some(v) if focused => format!("< {v} >"),
        Some(v) => v.to_string(),
        None if focused => "< choose >".to_string(),
        None => "-".to_string(),
    };
    Line::from(vec![
        label(text, focused),
        Span::styled(value, Style::default().fg(TEXT_MAIN)),
    ])
}

fn description_line(text: Option<String>) -> Line<'static> {
    Line::from(Span::styled(
        format!("            {}", text.unwrap_or_default()),
        Style::default().fg(TEXT_DIM),
    ))
}

impl Component<Action> for CreationFormView {
    type Props<'a> = CreationFormProps<'a>;

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

        let form = &props.state.form;
        match key.code {
            KeyCode::Esc => return vec![Action::CreationCancel],
            KeyCode::Tab | KeyCode::Down => return vec![Action::CreationFocus(form.focus.next())],
            KeyCode::BackTab | KeyCode::Up => {
                return vec![Action::CreationFocus(form.focus.prev())];
            }
            KeyCode::Enter => return vec![Action::CreationSubmit],
            _ => {}
        }

        let catalog = props.state.catalog.data();
        match (form.focus, key.code) {
            (CreationField::Name, _) => {
                let input_props = TextInputProps {
                    value: &form.name,
                    placeholder: "Enter your name...",
                    is_focused: true,
                    style: input_style(),
                    on_change: Action::CreationNameChange,
                    on_submit: |_| Action::CreationSubmit,
                    on_cursor_move: Some(|_| Action::Render),
                };
                self.input
                    .handle_event(event, input_props)
                    .into_iter()
                    .collect()
            }
            (_, KeyCode::Left) => option_actions(form, catalog, false),
            (_, KeyCode::Right) => option_actions(form, catalog, true),
            (CreationField::Adventure, KeyCode::Char(' ')) => {
                vec![Action::CreationToggleAdventure]
            }
            (CreationField::Submit, KeyCode::Char(' ')) => vec![Action::CreationSubmit],
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Form
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let block = panel_block("Create Your Character", props.is_focused);
        let inner = block.inner(chunks[0]).inner(Margin::new(1, 1));
        frame.render_widget(block, chunks[0]);

        let rows = Layout::vertical([
            Constraint::Length(1), // Name label + input
            Constraint::Length(1), // spacer
            Constraint::Length(2), // Race
            Constraint::Length(2), // Class
            Constraint::Length(2), // Adventure
            Constraint::Length(1), // spacer
            Constraint::Length(1), // Submit
            Constraint::Length(1), // spacer
            Constraint::Min(1),    // Status
        ])
        .split(inner);

        let state = props.state;
        let form = &state.form;
        let catalog = state.catalog.data();
        let focus = |field: CreationField| props.is_focused && form.focus == field;

        let [name_label, name_input] =
            Layout::horizontal([Constraint::Length(12), Constraint::Max(32)]).areas(rows[0]);
        frame.render_widget(
            Paragraph::new(Line::from(label("Name", focus(CreationField::Name)))),
            name_label,
        );
        let input_props = TextInputProps {
            value: &form.name,
            placeholder: "Enter your name...",
            is_focused: focus(CreationField::Name),
            style: input_style(),
            on_change: Action::CreationNameChange,
            on_submit: |_| Action::CreationSubmit,
            on_cursor_move: Some(|_| Action::Render),
        };
        self.input.render(frame, name_input, input_props);

        let race_name = form
            .race
            .as_deref()
            .map(|r| catalog.map(|c| c.race_name(r)).unwrap_or(r));
        frame.render_widget(
            Paragraph::new(vec![
                selector_line("Race", race_name, focus(CreationField::Race)),
                description_line(
                    form.race
                        .as_deref()
                        .and_then(|r| catalog.and_then(|c| c.race_description(r))),
                ),
            ]),
            rows[2],
        );

        let class_name = form
            .class
            .as_deref()
            .map(|k| catalog.map(|c| c.class_name(k)).unwrap_or(k));
        frame.render_widget(
            Paragraph::new(vec![
                selector_line("Class", class_name, focus(CreationField::Class)),
                description_line(
                    form.class
                        .as_deref()
                        .and_then(|k| catalog.and_then(|c| c.class_description(k))),
                ),
            ]),
            rows[3],
        );

        frame.render_widget(
            Paragraph::new(vec![
                selector_line(
                    "Adventure",
                    Some(form.adventure.label()),
                    focus(CreationField::Adventure),
                ),
                description_line(Some(form.adventure.description().to_string())),
            ]),
            rows[4],
        );

        let submit_style = if focus(CreationField::Submit) {
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(ACCENT_GOLD)
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw("  "),
                Span::styled("[ Begin Adventure ]", submit_style),
            ])),
            rows[6],
        );

        let status = if state.is_busy() {
            Line::from(Span::styled(
                format!("{} Creating character...", state.spinner()),
                Style::default().fg(TEXT_DIM),
            ))
        } else if let Some(error) = &form.error {
            Line::from(Span::styled(error.clone(), Style::default().fg(ACCENT_RED)))
        } else if state.catalog.is_loading() {
            Line::from(Span::styled(
                format!("{} Loading races and classes...", state.spinner()),
                Style::default().fg(TEXT_DIM),
            ))
        } else {
            Line::default()
        };
        frame.render_widget(Paragraph::new(status), rows[8]);

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[1],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("tab", "next field"),
                    StatusBarHint::new("\u{2190}/\u{2192}", "choose"),
                    StatusBarHint::new("enter", "begin"),
                    StatusBarHint::new("esc", "back"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creation::{ClassInfo, RaceInfo};
    use crate::state::Screen;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tui_dispatch::DataResource;
    use tui_dispatch::testing::*;

    fn press(code: KeyCode) -> EventKind {
        EventKind::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn state_on(field: CreationField) -> AppState {
        let mut catalog = CreationCatalog::default();
        for race in ["Human", "Hawkins Resident"] {
            catalog.races.insert(
                race.into(),
                RaceInfo {
                    name: race.into(),
                    ability: "Brave".into(),
                },
            );
        }
        for class in ["Fighter", "Cleric"] {
            catalog.classes.insert(
                class.into(),
                ClassInfo {
                    name: class.into(),
                    hit_die: 10,
                    primary_stats: vec!["strength".into()],
                },
            );
        }
        let mut state = AppState {
            screen: Screen::CharacterCreation,
            catalog: DataResource::Loaded(catalog),
            ..Default::default()
        };
        state.form.focus = field;
        state
    }

    fn events(component: &mut CreationFormView, state: &AppState, event: EventKind) -> Vec<Action> {
        component
            .handle_event(
                &event,
                CreationFormProps {
                    state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect()
    }

    #[test]
    fn test_tab_moves_focus() {
        let mut component = CreationFormView::new();
        let state = state_on(CreationField::Name);
        let actions = events(&mut component, &state, press(KeyCode::Tab));
        actions.assert_first(Action::CreationFocus(CreationField::Race));
    }

    #[test]
    fn test_right_cycles_race() {
        let mut component = CreationFormView::new();
        let state = state_on(CreationField::Race);
        let actions = events(&mut component, &state, press(KeyCode::Right));
        actions.assert_first(Action::CreationSelectRace("Human".into()));
    }

    #[test]
    fn test_left_on_adventure_toggles() {
        let mut component = CreationFormView::new();
        let state = state_on(CreationField::Adventure);
        let actions = events(&mut component, &state, press(KeyCode::Left));
        actions.assert_first(Action::CreationToggleAdventure);
    }

    #[test]
    fn test_typing_changes_name() {
        let mut component = CreationFormView::new();
        let state = state_on(CreationField::Name);
        let actions = events(&mut component, &state, EventKind::Key(key("m")));
        actions.assert_first(Action::CreationNameChange("m".into()));
    }

    #[test]
    fn test_escape_cancels() {
        let mut component = CreationFormView::new();
        let state = state_on(CreationField::Class);
        let actions = events(&mut component, &state, press(KeyCode::Esc));
        actions.assert_first(Action::CreationCancel);
    }

    #[test]
    fn test_render_shows_descriptions_and_error() {
        let mut render = RenderHarness::new(80, 20);
        let mut component = CreationFormView::new();
        let mut state = state_on(CreationField::Race);
        state.form.race = Some("Human".into());
        state.form.error = Some("Name cannot be empty".into());

        let output = render.render_to_string_plain(|frame| {
            component.render(
                frame,
                frame.area(),
                CreationFormProps {
                    state: &state,
                    is_focused: true,
                },
            );
        });

        assert!(output.contains("< Human >"), "{output}");
        assert!(output.contains("Special Ability: Brave"), "{output}");
        assert!(output.contains("Fight to save Hawkins"), "{output}");
        assert!(output.contains("Name cannot be empty"), "{output}");
    }
}
