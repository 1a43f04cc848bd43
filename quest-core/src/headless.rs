//! Headless game interface for programmatic use.
//!
//! This module provides a simplified interface for playing without any UI.
//! It's designed for:
//! - Automated playthrough tests
//! - Bots and scripted sessions
//!
//! Unlike [`GameEngine`], a [`HeadlessGame`] owns its state and roller, and
//! sequences the enemy's reply after each player action.
//!
//! # Example
//!
//! ```
//! use quest_core::headless::{HeadlessConfig, HeadlessGame};
//!
//! let config = HeadlessConfig::quick_start("Thorin").with_seed(7);
//! let mut game = HeadlessGame::new(config)?;
//!
//! let response = game.choose(0)?;
//! println!("{}", response.narrative);
//! println!("HP: {}/{}", game.current_hp(), game.max_hp());
//! # Ok::<(), quest_core::game::EngineError>(())
//! ```

use crate::character::{CharacterClass, Race};
use crate::character_builder::create_character_with;
use crate::combat::{CombatAction, CombatOutcome};
use crate::config::GameConfig;
use crate::dice::{RandomRoller, Roller};
use crate::game::{EngineError, GameEngine, GameState};
use crate::items;
use crate::story::StoryNode;

/// Configuration for a headless game.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Character name.
    pub name: String,
    /// Character race.
    pub race: Race,
    /// Character class.
    pub class: CharacterClass,
    /// Rules and seed.
    pub game: GameConfig,
}

impl HeadlessConfig {
    /// Human Warrior with standard rules.
    pub fn quick_start(name: impl Into<String>) -> Self {
        Self::custom(name, Race::Human, CharacterClass::Warrior)
    }

    pub fn custom(name: impl Into<String>, race: Race, class: CharacterClass) -> Self {
        Self {
            name: name.into(),
            race,
            class,
            game: GameConfig::default(),
        }
    }

    /// Seed the roller for a reproducible game.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.game.seed = Some(seed);
        self
    }

    pub fn with_game_config(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }
}

/// What one action produced.
#[derive(Debug, Clone)]
pub struct GameResponse {
    /// Narration produced by the action, one line per entry joined by newlines.
    pub narrative: String,
    /// Whether a fight is active (including one that just ended).
    pub in_combat: bool,
    /// Whether the player may act in the fight.
    pub is_player_turn: bool,
    pub current_hp: i32,
    pub max_hp: i32,
    pub node_id: String,
}

/// An entry in the game transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    /// What the player did.
    pub action: String,
    /// What came of it.
    pub narration: String,
    /// Turn number.
    pub turn: usize,
}

/// A game that can be controlled programmatically.
pub struct HeadlessGame<R: Roller = RandomRoller> {
    engine: GameEngine,
    state: GameState,
    roller: R,
    transcript: Vec<TranscriptEntry>,
}

impl HeadlessGame<RandomRoller> {
    /// Create a game whose roller follows the config's seed.
    pub fn new(config: HeadlessConfig) -> Result<Self, EngineError> {
        let roller = config.game.roller();
        Self::with_roller(config, roller)
    }
}

impl<R: Roller> HeadlessGame<R> {
    /// Create a game driven by a specific roller.
    pub fn with_roller(config: HeadlessConfig, roller: R) -> Result<Self, EngineError> {
        let engine = GameEngine::with_config(config.game.clone())?;
        let character = create_character_with(config.name, config.race, config.class, &config.game);
        let state = engine.new_game(character)?;
        Ok(Self {
            engine,
            state,
            roller,
            transcript: Vec::new(),
        })
    }

    // ========================================================================
    // Story actions
    // ========================================================================

    /// Take the `index`th choice of the current node.
    pub fn choose(&mut self, index: usize) -> Result<GameResponse, EngineError> {
        let label = self
            .current_node()
            .and_then(|n| n.choices.get(index))
            .map(|c| c.text.clone())
            .unwrap_or_else(|| format!("choice {index}"));
        let log_before = self.state.log.len();
        let node_before = self.state.current_node_id.clone();

        self.state = self.engine.choose(&self.state, index, &mut self.roller)?;

        let mut lines: Vec<String> = self.state.log[log_before..].to_vec();
        if self.state.current_node_id != node_before {
            if let Some(node) = self.current_node() {
                lines.push(format!("== {} ==", node.title));
                lines.push(node.text.clone());
            }
        }
        if let Some(combat) = &self.state.combat {
            lines.extend(combat.log.iter().cloned());
        }
        Ok(self.record(label, lines))
    }

    /// Choice texts of the current node, with whether each can be taken.
    pub fn choices(&self) -> Vec<(String, bool)> {
        self.current_node()
            .map(|node| {
                node.choices
                    .iter()
                    .map(|c| (c.text.clone(), self.engine.can_make_choice(&self.state, c)))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ========================================================================
    // Combat actions
    // ========================================================================

    pub fn attack(&mut self) -> GameResponse {
        self.combat_action("Attack", CombatAction::Attack)
    }

    pub fn defend(&mut self) -> GameResponse {
        self.combat_action("Defend", CombatAction::Defend)
    }

    pub fn flee(&mut self) -> GameResponse {
        self.combat_action("Flee", CombatAction::Flee)
    }

    /// Use a carried item by id.
    pub fn use_item(&mut self, item_id: &str) -> GameResponse {
        let carried = self.state.character.find_item(item_id).cloned();
        match carried {
            Some(item) => {
                let label = format!("Use {}", item.name);
                self.combat_action(&label, CombatAction::UseItem(item))
            }
            None => {
                let line = match items::get_item(item_id) {
                    Some(item) => format!("You don't have {}.", item.name),
                    None => format!("There is no such item: {item_id}."),
                };
                self.record(format!("Use {item_id}"), vec![line])
            }
        }
    }

    /// Player action, then the enemy's reply if the fight goes on.
    fn combat_action(&mut self, label: &str, action: CombatAction) -> GameResponse {
        let Some(combat) = &self.state.combat else {
            return self.record(label.to_string(), vec!["You are not in a fight.".to_string()]);
        };
        let log_before = combat.log.len();

        self.state = self
            .engine
            .combat_action(&self.state, action, &mut self.roller);
        if self.state.combat.as_ref().is_some_and(|c| c.is_enemy_turn()) {
            self.state = self.engine.combat_enemy_turn(&self.state, &mut self.roller);
        }

        let lines = self
            .state
            .combat
            .as_ref()
            .map(|c| c.log_since(log_before).to_vec())
            .unwrap_or_default();
        self.record(label.to_string(), lines)
    }

    /// Close a finished fight and return to the story.
    pub fn end_combat(&mut self) -> GameResponse {
        let log_before = self.state.log.len();
        let node_before = self.state.current_node_id.clone();
        self.state = self.engine.end_combat(&self.state, &mut self.roller);

        let mut lines: Vec<String> = self.state.log[log_before..].to_vec();
        if self.state.current_node_id != node_before {
            if let Some(node) = self.current_node() {
                lines.push(format!("== {} ==", node.title));
                lines.push(node.text.clone());
            }
        }
        self.record("Continue".to_string(), lines)
    }

    /// Face the current node's enemy again, e.g. after fleeing.
    pub fn engage(&mut self) -> GameResponse {
        self.state = self.engine.check_combat_trigger(&self.state);
        let lines = self
            .state
            .combat
            .as_ref()
            .map(|c| c.log.clone())
            .unwrap_or_else(|| vec!["There is nothing to fight here.".to_string()]);
        self.record("Engage".to_string(), lines)
    }

    /// Fight until the encounter ends, attacking every turn.
    pub fn fight_it_out(&mut self) -> CombatOutcome {
        while self.combat_outcome() == Some(CombatOutcome::Ongoing) {
            self.attack();
        }
        let outcome = self.combat_outcome().unwrap_or(CombatOutcome::Ongoing);
        self.end_combat();
        outcome
    }

    fn record(&mut self, action: String, lines: Vec<String>) -> GameResponse {
        let narrative = lines.join("\n");
        self.transcript.push(TranscriptEntry {
            action,
            narration: narrative.clone(),
            turn: self.transcript.len() + 1,
        });

        let character = &self.state.character;
        GameResponse {
            narrative,
            in_combat: self.state.in_combat(),
            is_player_turn: self
                .state
                .combat
                .as_ref()
                .map_or(true, |c| c.can_player_act()),
            current_hp: character.current_hp,
            max_hp: character.max_hp,
            node_id: self.state.current_node_id.clone(),
        }
    }

    // ========================================================================
    // Game State Queries
    // ========================================================================

    pub fn current_hp(&self) -> i32 {
        self.state.character.current_hp
    }

    pub fn max_hp(&self) -> i32 {
        self.state.character.max_hp
    }

    pub fn in_combat(&self) -> bool {
        self.state.in_combat()
    }

    pub fn combat_outcome(&self) -> Option<CombatOutcome> {
        self.state.combat.as_ref().map(|c| c.outcome())
    }

    pub fn current_node(&self) -> Option<&StoryNode> {
        self.engine.current_node(&self.state)
    }

    pub fn is_game_over(&self) -> bool {
        self.engine.is_game_over(&self.state)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Get the transcript of all actions.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Get the last narration, if any.
    pub fn last_response(&self) -> Option<&str> {
        self.transcript.last().map(|e| e.narration.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRoller;

    #[test]
    fn test_quick_start_config() {
        let config = HeadlessConfig::quick_start("Thorin");
        assert_eq!(config.name, "Thorin");
        assert_eq!(config.race, Race::Human);
        assert_eq!(config.class, CharacterClass::Warrior);
        assert!(config.game.seed.is_none());
    }

    #[test]
    fn test_custom_config() {
        let config = HeadlessConfig::custom("Lirael", Race::Elf, CharacterClass::Mage).with_seed(9);
        assert_eq!(config.race, Race::Elf);
        assert_eq!(config.class, CharacterClass::Mage);
        assert_eq!(config.game.seed, Some(9));
    }

    #[test]
    fn test_new_game_starts_at_start() {
        let game = HeadlessGame::new(HeadlessConfig::quick_start("Thorin").with_seed(1))
            .expect("builtin graph is valid");
        assert_eq!(game.current_node().map(|n| n.id.as_str()), Some("start"));
        assert_eq!(game.current_hp(), 16);
        assert_eq!(game.choices().len(), 3);
        assert!(game.transcript().is_empty());
    }

    #[test]
    fn test_choose_records_transcript() {
        let mut game = HeadlessGame::with_roller(
            HeadlessConfig::quick_start("Thorin"),
            ScriptedRoller::default(),
        )
        .expect("builtin graph is valid");
        let response = game.choose(0).expect("valid choice");
        assert_eq!(response.node_id, "tavern_bar");
        assert!(response.narrative.contains("At the Bar"));
        assert_eq!(game.transcript().len(), 1);
        assert_eq!(game.transcript()[0].turn, 1);
    }

    #[test]
    fn test_combat_action_chains_enemy_turn() {
        let mut game = HeadlessGame::with_roller(
            HeadlessConfig::quick_start("Thorin"),
            ScriptedRoller::default(),
        )
        .expect("builtin graph is valid");
        game.choose(0).expect("to the bar");

        // Straight into the forest's goblin ambush
        game.state.current_node_id = "forest_main_path".to_string();
        game.engage();
        assert!(game.in_combat());

        // Miss, then the goblin hits for 2
        game.roller.push([3, 15, 2]);
        let response = game.attack();
        assert!(response.is_player_turn);
        assert_eq!(response.current_hp, 14);
        assert_eq!(game.state().combat.as_ref().map(|c| c.round), Some(2));
    }

    #[test]
    fn test_actions_outside_combat() {
        let mut game = HeadlessGame::with_roller(
            HeadlessConfig::quick_start("Thorin"),
            ScriptedRoller::default(),
        )
        .expect("builtin graph is valid");
        let response = game.attack();
        assert!(response.narrative.contains("not in a fight"));
        let response = game.use_item("dragon_egg");
        assert!(response.narrative.contains("no such item"));
    }
}
