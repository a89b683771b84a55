//! Character creation rules: the race/class catalog and the creation form

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::api::CharacterRequest;

/// A playable race as listed by the server
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RaceInfo {
    pub name: String,
    #[serde(default)]
    pub ability: String,
}

/// A character class as listed by the server
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassInfo {
    pub name: String,
    #[serde(default)]
    pub hit_die: u32,
    #[serde(default)]
    pub primary_stats: Vec<String>,
}

/// Races, classes, and the race → permitted classes restriction.
///
/// Maps keep the order the server sent them in, which is also the order
/// options are offered in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreationCatalog {
    pub races: IndexMap<String, RaceInfo>,
    pub classes: IndexMap<String, ClassInfo>,
    /// Races missing from this map may pick any class.
    #[serde(default)]
    pub race_class_mapping: IndexMap<String, Vec<String>>,
}

impl CreationCatalog {
    pub fn race_ids(&self) -> Vec<&str> {
        self.races.keys().map(String::as_str).collect()
    }

    pub fn has_race(&self, race: &str) -> bool {
        self.races.contains_key(race)
    }

    /// The restricted class list for a race, if it has one
    pub fn restriction(&self, race: &str) -> Option<&[String]> {
        self.race_class_mapping.get(race).map(Vec::as_slice)
    }

    /// Class ids offered for the given race, in order.
    ///
    /// Restricted ids the catalog does not know are skipped.
    pub fn permitted_classes(&self, race: Option<&str>) -> Vec<&str> {
        match race.and_then(|r| self.restriction(r)) {
            Some(allowed) => allowed
                .iter()
                .filter(|id| self.classes.contains_key(id.as_str()))
                .map(String::as_str)
                .collect(),
            None => self.classes.keys().map(String::as_str).collect(),
        }
    }

    pub fn is_class_permitted(&self, race: Option<&str>, class: &str) -> bool {
        self.permitted_classes(race).contains(&class)
    }

    pub fn race_name<'a>(&'a self, race: &'a str) -> &'a str {
        self.races.get(race).map(|r| r.name.as_str()).unwrap_or(race)
    }

    pub fn class_name<'a>(&'a self, class: &'a str) -> &'a str {
        self.classes.get(class).map(|c| c.name.as_str()).unwrap_or(class)
    }

    pub fn race_description(&self, race: &str) -> Option<String> {
        let info = self.races.get(race)?;
        let desc = format!("Special Ability: {}", info.ability);
        match self.restriction(race).and_then(|allowed| allowed.first()) {
            Some(required) => Some(format!(
                "{desc} (You must be a {})",
                self.class_name(required)
            )),
            None => Some(desc),
        }
    }

    pub fn class_description(&self, class: &str) -> Option<String> {
        let info = self.classes.get(class)?;
        Some(format!(
            "Hit Die: d{}, Primary Stats: {}",
            info.hit_die,
            info.primary_stats.join(", ")
        ))
    }

    /// Race after `current` when cycling forward (or before it when not)
    pub fn step_race(&self, current: Option<&str>, forward: bool) -> Option<String> {
        step_option(&self.race_ids(), current, forward).map(str::to_string)
    }

    /// Permitted class after `current` for the given race
    pub fn step_class(
        &self,
        race: Option<&str>,
        current: Option<&str>,
        forward: bool,
    ) -> Option<String> {
        step_option(&self.permitted_classes(race), current, forward).map(str::to_string)
    }
}

fn step_option<'a>(options: &[&'a str], current: Option<&str>, forward: bool) -> Option<&'a str> {
    if options.is_empty() {
        return None;
    }
    let last = options.len() - 1;
    let index = match current.and_then(|c| options.iter().position(|o| *o == c)) {
        Some(i) if forward => {
            if i >= last {
                0
            } else {
                i + 1
            }
        }
        Some(i) => i.checked_sub(1).unwrap_or(last),
        None if forward => 0,
        None => last,
    };
    options.get(index).copied()
}

/// Campaign mode chosen at creation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdventureType {
    #[default]
    Normal,
    UpsideDown,
}

impl AdventureType {
    pub fn toggle(&self) -> Self {
        match self {
            AdventureType::Normal => AdventureType::UpsideDown,
            AdventureType::UpsideDown => AdventureType::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdventureType::Normal => "Save Hawkins",
            AdventureType::UpsideDown => "The Upside Down",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AdventureType::Normal => "Fight to save Hawkins from the Upside Down",
            AdventureType::UpsideDown => "Serve Vecna in the Upside Down and rise to power!",
        }
    }
}

/// Focusable rows of the creation form, top to bottom
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CreationField {
    #[default]
    Name,
    Race,
    Class,
    Adventure,
    Submit,
}

impl CreationField {
    pub const ALL: [CreationField; 5] = [
        CreationField::Name,
        CreationField::Race,
        CreationField::Class,
        CreationField::Adventure,
        CreationField::Submit,
    ];

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Reasons a creation form cannot be submitted yet
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CreationProblem {
    #[error("Name cannot be empty")]
    MissingName,
    #[error("Choose a race")]
    MissingRace,
    #[error("Unknown race: {0}")]
    UnknownRace(String),
    #[error("Choose a class")]
    MissingClass,
    #[error("{race} cannot be a {class}")]
    ClassNotPermitted { race: String, class: String },
}

/// Values entered on the creation screen
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CreationForm {
    pub name: String,
    pub race: Option<String>,
    pub class: Option<String>,
    pub adventure: AdventureType,
    pub focus: CreationField,
    pub error: Option<String>,
}

impl CreationForm {
    /// Select a race and drop the class if the race no longer allows it.
    ///
    /// Returns false when the race is unknown.
    pub fn select_race(&mut self, catalog: &CreationCatalog, race: &str) -> bool {
        if !catalog.has_race(race) {
            return false;
        }
        self.race = Some(race.to_string());
        if let Some(class) = self.class.as_deref() {
            if !catalog.is_class_permitted(self.race.as_deref(), class) {
                self.class = None;
            }
        }
        true
    }

    /// Select a class if the current race permits it
    pub fn select_class(&mut self, catalog: &CreationCatalog, class: &str) -> bool {
        if !catalog.is_class_permitted(self.race.as_deref(), class) {
            return false;
        }
        self.class = Some(class.to_string());
        true
    }

    pub fn validate(&self, catalog: &CreationCatalog) -> Result<CharacterRequest, CreationProblem> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CreationProblem::MissingName);
        }
        let race = self.race.as_deref().ok_or(CreationProblem::MissingRace)?;
        if !catalog.has_race(race) {
            return Err(CreationProblem::UnknownRace(race.to_string()));
        }
        let class = self.class.as_deref().ok_or(CreationProblem::MissingClass)?;
        if !catalog.is_class_permitted(Some(race), class) {
            return Err(CreationProblem::ClassNotPermitted {
                race: catalog.race_name(race).to_string(),
                class: catalog.class_name(class).to_string(),
            });
        }
        Ok(CharacterRequest {
            name: name.to_string(),
            race: race.to_string(),
            class: class.to_string(),
            adventure_type: self.adventure,
        })
    }
}
