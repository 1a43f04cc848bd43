//! Tunable rules for a game.

use crate::character::MAX_LEVEL;
use crate::dice::{DiceTray, RandomRoller};
use serde::{Deserialize, Serialize};

/// Rules knobs for a [`GameEngine`](crate::game::GameEngine).
///
/// `GameConfig::default()` gives the standard game. Missing fields fall back
/// to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Node a new game starts on.
    pub start_node_id: String,

    /// Gold a new character starts with.
    pub starting_gold: u32,

    /// Added to hit die + CON modifier for level-1 HP.
    pub starting_hp_bonus: i32,

    /// Level cap.
    pub max_level: u32,

    /// Seed for the random roller; `None` seeds from entropy.
    pub seed: Option<u64>,

    /// How many rolls the dice tray remembers.
    pub roll_history: usize,
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_node(mut self, node_id: impl Into<String>) -> Self {
        self.start_node_id = node_id.into();
        self
    }

    pub fn with_starting_gold(mut self, gold: u32) -> Self {
        self.starting_gold = gold;
        self
    }

    pub fn with_starting_hp_bonus(mut self, bonus: i32) -> Self {
        self.starting_hp_bonus = bonus;
        self
    }

    pub fn with_max_level(mut self, level: u32) -> Self {
        self.max_level = level.clamp(1, MAX_LEVEL);
        self
    }

    /// The level cap in force. A deserialized `max_level` outside
    /// `1..=MAX_LEVEL` is pulled back into range.
    pub fn level_cap(&self) -> u32 {
        self.max_level.clamp(1, MAX_LEVEL)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_roll_history(mut self, len: usize) -> Self {
        self.roll_history = len;
        self
    }

    /// A roller honouring `seed`.
    pub fn roller(&self) -> RandomRoller {
        match self.seed {
            Some(seed) => RandomRoller::seeded(seed),
            None => RandomRoller::from_entropy(),
        }
    }

    /// A dice tray keeping `roll_history` results.
    pub fn dice_tray(&self) -> DiceTray {
        DiceTray::new(self.roll_history)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_node_id: "start".to_string(),
            starting_gold: 10,
            starting_hp_bonus: 4,
            max_level: MAX_LEVEL,
            seed: None,
            roll_history: 20,
        }
    }
}
