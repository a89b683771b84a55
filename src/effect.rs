//! Effects - side effects declared by the reducer

use std::sync::atomic::{AtomicU64, Ordering};

use tui_dispatch::TaskKey;

use crate::api::{CharacterRequest, CombatCommand, ItemName};

static ANNOUNCED_REFRESHES: AtomicU64 = AtomicU64::new(0);

/// Server calls requested by the reducer
#[derive(Debug, Clone)]
pub enum Effect {
    LoadCatalog,
    CreateCharacter(CharacterRequest),
    /// `announce` is echoed back so the reducer knows whether to log progress
    FetchGameState { announce: bool },
    StartEncounter,
    Combat(CombatCommand),
    VisitShop,
    BuyItem(ItemName),
    Rest,
    NewGame,
}

impl Effect {
    /// Task slot for the request.
    ///
    /// Spawning into an occupied slot cancels the task already there. Silent
    /// refreshes share one slot; each announced refresh gets its own so its
    /// progress line is always logged.
    pub fn task_key(&self) -> TaskKey {
        match self {
            Effect::LoadCatalog => TaskKey::new("catalog"),
            Effect::CreateCharacter(_) => TaskKey::new("create_character"),
            Effect::FetchGameState { announce: false } => TaskKey::new("game_state"),
            Effect::FetchGameState { announce: true } => {
                let n = ANNOUNCED_REFRESHES.fetch_add(1, Ordering::Relaxed);
                TaskKey::new(format!("game_state_announce_{n}"))
            }
            Effect::StartEncounter => TaskKey::new("encounter"),
            Effect::Combat(_) => TaskKey::new("combat"),
            Effect::VisitShop => TaskKey::new("shop"),
            Effect::BuyItem(_) => TaskKey::new("buy"),
            Effect::Rest => TaskKey::new("rest"),
            Effect::NewGame => TaskKey::new("new_game"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announced_refreshes_never_share_a_slot() {
        let first = Effect::FetchGameState { announce: true }.task_key();
        let second = Effect::FetchGameState { announce: true }.task_key();
        let silent = Effect::FetchGameState { announce: false }.task_key();

        assert_ne!(first, second);
        assert_ne!(first, silent);
        assert_ne!(second, silent);
    }

    #[test]
    fn silent_refreshes_replace_each_other() {
        assert_eq!(
            Effect::FetchGameState { announce: false }.task_key(),
            Effect::FetchGameState { announce: false }.task_key()
        );
        assert_eq!(Effect::Rest.task_key().name(), "rest");
    }
}
