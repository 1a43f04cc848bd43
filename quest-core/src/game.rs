//! Game state and the engine that moves it forward.
//!
//! [`GameState`] is the single unit of truth. Every [`GameEngine`] operation
//! takes a snapshot and returns a new one; nothing is mutated in place.
//! Randomness comes from the caller's [`Roller`].

use crate::character::{Character, LevelUp};
use crate::combat::{CombatAction, CombatEngine, CombatOutcome, CombatRound, CombatState};
use crate::config::GameConfig;
use crate::dice::{self, Roller};
use crate::enemies::{self, Enemy};
use crate::items::{self, Item, ItemType};
use crate::story::{StoryChoice, StoryError, StoryGraph, StoryNode};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the engine's convenience operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Story node not found: {0}")]
    NodeNotFound(String),

    #[error("Choice {index} out of range ({available} available)")]
    ChoiceOutOfRange { index: usize, available: usize },

    #[error("A combat is in progress")]
    CombatInProgress,

    #[error(transparent)]
    Story(#[from] StoryError),
}

/// Everything about a running game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub character: Character,
    pub current_node_id: String,
    pub visited_nodes: BTreeSet<String>,
    pub combat: Option<CombatState>,
    pub started: bool,
    /// Narration outside combat, append-only.
    pub log: Vec<String>,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl GameState {
    /// A fresh state on `start_node_id`, which counts as visited.
    pub fn new(character: Character, start_node_id: impl Into<String>) -> Self {
        let start = start_node_id.into();
        let mut visited_nodes = BTreeSet::new();
        visited_nodes.insert(start.clone());
        Self {
            character,
            current_node_id: start,
            visited_nodes,
            combat: None,
            started: true,
            log: Vec::new(),
            flags: BTreeMap::new(),
        }
    }

    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }

    pub fn has_visited(&self, node_id: &str) -> bool {
        self.visited_nodes.contains(node_id)
    }

    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.flags.insert(key.into(), value);
    }

    /// A flag's value; unset flags read as false.
    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    fn move_to(&mut self, node_id: &str) {
        self.current_node_id = node_id.to_string();
        self.visited_nodes.insert(node_id.to_string());
    }

    fn apply_round(&mut self, round: CombatRound) {
        self.character = round.character;
        self.combat = Some(round.combat);
    }
}

/// Runs a story graph under a [`GameConfig`].
#[derive(Debug, Clone)]
pub struct GameEngine {
    graph: Cow<'static, StoryGraph>,
    config: GameConfig,
    combat: CombatEngine,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEngine {
    /// The built-in adventure with standard rules.
    pub fn new() -> Self {
        Self {
            graph: Cow::Borrowed(StoryGraph::builtin()),
            config: GameConfig::default(),
            combat: CombatEngine::new(),
        }
    }

    /// The built-in adventure with custom rules.
    pub fn with_config(config: GameConfig) -> Result<Self, EngineError> {
        Self::build(Cow::Borrowed(StoryGraph::builtin()), config)
    }

    /// A custom story graph, validated from the configured start node.
    pub fn with_graph(graph: StoryGraph, config: GameConfig) -> Result<Self, EngineError> {
        Self::build(Cow::Owned(graph), config)
    }

    fn build(graph: Cow<'static, StoryGraph>, config: GameConfig) -> Result<Self, EngineError> {
        graph.validate(&config.start_node_id)?;
        Ok(Self {
            graph,
            config,
            combat: CombatEngine::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    // ========================================================================
    // Story
    // ========================================================================

    pub fn lookup_node(&self, id: &str) -> Option<&StoryNode> {
        self.graph.get(id)
    }

    pub fn current_node(&self, state: &GameState) -> Option<&StoryNode> {
        self.lookup_node(&state.current_node_id)
    }

    /// Start a game at the configured start node.
    pub fn new_game(&self, character: Character) -> Result<GameState, EngineError> {
        let start = &self.config.start_node_id;
        let node = self
            .lookup_node(start)
            .ok_or_else(|| EngineError::NodeNotFound(start.clone()))?;

        let mut state = GameState::new(character, start.clone());
        state.log.push(format!(
            "{} the {} {} sets out: {}",
            state.character.name, state.character.race, state.character.class, node.title
        ));
        info!(character = %state.character.name, start = %start, "new game");

        Ok(self.check_combat_trigger(&state))
    }

    /// Whether the character carries what the choice requires.
    pub fn can_make_choice(&self, state: &GameState, choice: &StoryChoice) -> bool {
        choice
            .required_item
            .as_deref()
            .map_or(true, |id| state.character.has_item(id))
    }

    /// Pick the `index`th choice of the current node, then start combat if
    /// the destination is an encounter.
    pub fn choose<R: Roller + ?Sized>(
        &self,
        state: &GameState,
        index: usize,
        rng: &mut R,
    ) -> Result<GameState, EngineError> {
        if state.in_combat() {
            return Err(EngineError::CombatInProgress);
        }
        let node = self
            .current_node(state)
            .ok_or_else(|| EngineError::NodeNotFound(state.current_node_id.clone()))?;
        let choice = node.choices.get(index).ok_or(EngineError::ChoiceOutOfRange {
            index,
            available: node.choices.len(),
        })?;

        let next = self.resolve_choice(state, choice, rng);
        Ok(self.check_combat_trigger(&next))
    }

    /// Apply a choice: item gate, skill check, rewards, level-ups, then move.
    ///
    /// A missing required item leaves the state where it is with a log line.
    /// A failed check moves to the fail node (or the normal target when there
    /// is none) and grants nothing.
    pub fn resolve_choice<R: Roller + ?Sized>(
        &self,
        state: &GameState,
        choice: &StoryChoice,
        rng: &mut R,
    ) -> GameState {
        let mut state = state.clone();

        if !self.can_make_choice(&state, choice) {
            state
                .log
                .push("You need a particular item to do that.".to_string());
            debug!(item = ?choice.required_item, "choice blocked by missing item");
            return state;
        }

        if let Some(check) = choice.skill_check {
            let modifier = state.character.skill_modifier(check.skill);
            let roll = dice::roll_d20(rng, modifier);
            state
                .log
                .push(format!("{} check (DC {}): {roll}", check.skill, check.dc));
            debug!(skill = %check.skill, dc = check.dc, total = roll.total, "skill check");

            if !roll.meets_or_beats(check.dc) {
                state.log.push("Failed!".to_string());
                let target = choice
                    .fail_node_id
                    .as_deref()
                    .unwrap_or(&choice.next_node_id);
                self.warn_if_absent(target);
                state.move_to(target);
                return state;
            }
            state.log.push("Success!".to_string());
        }

        let character = &mut state.character;
        if choice.grant_xp > 0 {
            character.experience += choice.grant_xp;
            state.log.push(format!("+{} XP", choice.grant_xp));
        }
        if choice.grant_gold > 0 {
            character.gold += choice.grant_gold;
            state.log.push(format!("+{} gold", choice.grant_gold));
        }
        if let Some(id) = &choice.grant_item {
            match items::get_item(id) {
                Some(item) => {
                    let name = item.name.clone();
                    let equipped = character.receive_item(item);
                    state.log.push(format!("Received {name}."));
                    if equipped {
                        state.log.push(format!("Equipped {name}."));
                    }
                }
                None => warn!(item = %id, "choice grants unknown item"),
            }
        }
        if choice.heal_amount > 0 {
            if choice.is_full_heal() {
                character.heal_full();
                state.log.push("Fully healed!".to_string());
            } else {
                character.heal(choice.heal_amount);
                state.log.push(format!("Healed {} HP.", choice.heal_amount));
            }
        }

        let level_ups = character.level_up(rng, self.config.level_cap());
        log_level_ups(&mut state.log, &level_ups);

        self.warn_if_absent(&choice.next_node_id);
        state.move_to(&choice.next_node_id);
        debug!(node = %state.current_node_id, "choice resolved");
        state
    }

    /// Start combat if the current node is an encounter and none is active.
    pub fn check_combat_trigger(&self, state: &GameState) -> GameState {
        if state.in_combat() {
            return state.clone();
        }
        let Some(enemy_id) = self.current_node(state).and_then(|n| n.enemy.as_deref()) else {
            return state.clone();
        };
        match enemies::get_enemy(enemy_id) {
            Some(enemy) => self.start_combat(state, enemy),
            None => {
                warn!(enemy = %enemy_id, node = %state.current_node_id, "unknown enemy");
                state.clone()
            }
        }
    }

    // ========================================================================
    // Combat
    // ========================================================================

    pub fn start_combat(&self, state: &GameState, enemy: Enemy) -> GameState {
        let mut state = state.clone();
        state.log.push(format!("A fight with {}!", enemy.name));
        state.combat = Some(self.combat.start(enemy));
        state
    }

    /// Resolve a player action. No combat: state unchanged.
    pub fn combat_action<R: Roller + ?Sized>(
        &self,
        state: &GameState,
        action: CombatAction,
        rng: &mut R,
    ) -> GameState {
        let Some(combat) = &state.combat else {
            return state.clone();
        };
        let round = self.combat.resolve(combat, &state.character, action, rng);
        let mut state = state.clone();
        state.apply_round(round);
        state
    }

    pub fn combat_attack<R: Roller + ?Sized>(&self, state: &GameState, rng: &mut R) -> GameState {
        self.combat_action(state, CombatAction::Attack, rng)
    }

    pub fn combat_defend<R: Roller + ?Sized>(&self, state: &GameState, rng: &mut R) -> GameState {
        self.combat_action(state, CombatAction::Defend, rng)
    }

    pub fn combat_use_item<R: Roller + ?Sized>(
        &self,
        state: &GameState,
        item: &Item,
        rng: &mut R,
    ) -> GameState {
        self.combat_action(state, CombatAction::UseItem(item.clone()), rng)
    }

    pub fn combat_flee<R: Roller + ?Sized>(&self, state: &GameState, rng: &mut R) -> GameState {
        self.combat_action(state, CombatAction::Flee, rng)
    }

    /// The enemy's reply. Call when the state shows the enemy's turn.
    pub fn combat_enemy_turn<R: Roller + ?Sized>(
        &self,
        state: &GameState,
        rng: &mut R,
    ) -> GameState {
        let Some(combat) = &state.combat else {
            return state.clone();
        };
        let round = self.combat.enemy_turn(combat, &state.character, rng);
        let mut state = state.clone();
        state.apply_round(round);
        state
    }

    /// Fold a finished fight back into the story.
    ///
    /// Victory follows the current node's post-combat id when it has one.
    /// Level-ups earned in the fight happen here. Defeat and flight stay on
    /// the current node.
    pub fn end_combat<R: Roller + ?Sized>(&self, state: &GameState, rng: &mut R) -> GameState {
        let Some(combat) = &state.combat else {
            return state.clone();
        };
        let mut state = state.clone();
        let outcome = combat.outcome();
        let summary = match outcome {
            CombatOutcome::Victory => format!("You defeated {}.", combat.enemy.name),
            CombatOutcome::Defeat => format!("You fell to {}.", combat.enemy.name),
            CombatOutcome::Fled => format!("You escaped from {}.", combat.enemy.name),
            CombatOutcome::Ongoing => format!("You broke off the fight with {}.", combat.enemy.name),
        };
        state.log.push(summary);

        if outcome == CombatOutcome::Victory {
            let after = self
                .current_node(&state)
                .and_then(|n| n.post_combat_node_id.clone());
            if let Some(after) = after {
                self.warn_if_absent(&after);
                state.move_to(&after);
            }
        }

        let level_ups = state.character.level_up(rng, self.config.level_cap());
        log_level_ups(&mut state.log, &level_ups);

        info!(
            outcome = ?outcome,
            node = %state.current_node_id,
            hp = state.character.current_hp,
            "combat ended"
        );
        state.combat = None;
        state
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    /// Equip a carried weapon or armor. Anything else: unchanged.
    pub fn equip_item(&self, character: &Character, item: &Item) -> Character {
        let mut character = character.clone();
        character.equip(item);
        character
    }

    /// Use an item outside combat. Non-consumables do nothing. Potions heal
    /// like in combat; other consumables are simply used up.
    pub fn use_item<R: Roller + ?Sized>(
        &self,
        character: &Character,
        item: &Item,
        rng: &mut R,
    ) -> Character {
        if !item.consumable || !character.has_item(&item.id) {
            return character.clone();
        }
        let mut character = character.clone();
        if item.item_type == ItemType::Potion && item.heal_amount > 0 {
            let healed = character.heal(item.heal_dice().roll(rng));
            debug!(item = %item.id, healed, "potion used");
        }
        character.remove_item(&item.id);
        character
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// An ending was reached or the character is down.
    pub fn is_game_over(&self, state: &GameState) -> bool {
        state.character.current_hp <= 0
            || self.current_node(state).map_or(false, |n| n.is_ending)
    }

    fn warn_if_absent(&self, node_id: &str) {
        if !self.graph.contains(node_id) {
            warn!(node = %node_id, "moved to a node that does not exist");
        }
    }
}

fn log_level_ups(log: &mut Vec<String>, level_ups: &[LevelUp]) {
    for step in level_ups {
        info!(level = step.new_level, hp_gain = step.hp_gain, "level up");
        log.push(format!(
            "LEVEL UP! You are now level {}! (+{} HP)",
            step.new_level, step.hp_gain
        ));
    }
}
