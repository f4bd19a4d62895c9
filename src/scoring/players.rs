use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::ball::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Batter,
    Bowler,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlayerSlot {
    Striker,
    NonStriker,
    Bowler,
}

impl PlayerSlot {
    pub fn role(self) -> Role {
        match self {
            PlayerSlot::Striker | PlayerSlot::NonStriker => Role::Batter,
            PlayerSlot::Bowler => Role::Bowler,
        }
    }
}

/// Players selected for the next delivery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePlayers {
    pub striker: Option<PlayerId>,
    pub non_striker: Option<PlayerId>,
    pub bowler: Option<PlayerId>,
}

impl ActivePlayers {
    /// Empty slots in prompt order: striker, non-striker, bowler
    pub fn missing_slots(&self) -> Vec<PlayerSlot> {
        PlayerSlot::iter()
            .filter(|slot| self.get(*slot).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.striker.is_some() && self.non_striker.is_some() && self.bowler.is_some()
    }

    pub fn get(&self, slot: PlayerSlot) -> Option<&PlayerId> {
        match slot {
            PlayerSlot::Striker => self.striker.as_ref(),
            PlayerSlot::NonStriker => self.non_striker.as_ref(),
            PlayerSlot::Bowler => self.bowler.as_ref(),
        }
    }

    pub fn is_batting(&self, player_id: &str) -> bool {
        self.striker.as_deref() == Some(player_id) || self.non_striker.as_deref() == Some(player_id)
    }

    pub fn swap_strike(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A partial update of the active slots; `None` leaves a slot unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSelection {
    #[serde(default)]
    pub striker: Option<PlayerId>,
    #[serde(default)]
    pub non_striker: Option<PlayerId>,
    #[serde(default)]
    pub bowler: Option<PlayerId>,
}

impl PlayerSelection {
    pub fn all(striker: &str, non_striker: &str, bowler: &str) -> Self {
        Self {
            striker: Some(striker.to_string()),
            non_striker: Some(non_striker.to_string()),
            bowler: Some(bowler.to_string()),
        }
    }

    pub fn bowler(bowler: &str) -> Self {
        Self {
            bowler: Some(bowler.to_string()),
            ..Self::default()
        }
    }

    pub fn striker(striker: &str) -> Self {
        Self {
            striker: Some(striker.to_string()),
            ..Self::default()
        }
    }

    pub fn non_striker(non_striker: &str) -> Self {
        Self {
            non_striker: Some(non_striker.to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.striker.is_none() && self.non_striker.is_none() && self.bowler.is_none()
    }

    /// Selected ids paired with the slot they fill
    pub fn entries(&self) -> impl Iterator<Item = (PlayerSlot, &PlayerId)> {
        [
            (PlayerSlot::Striker, self.striker.as_ref()),
            (PlayerSlot::NonStriker, self.non_striker.as_ref()),
            (PlayerSlot::Bowler, self.bowler.as_ref()),
        ]
        .into_iter()
        .filter_map(|(slot, id)| id.map(|id| (slot, id)))
    }
}
