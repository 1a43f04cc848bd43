//! Testing utilities for the rules engine.
//!
//! This module provides tools for deterministic tests:
//! - `ScriptedRoller` for exact control over every die face
//! - `TestHarness` for scripted game scenarios
//! - Assertion helpers for verifying game state

use crate::character::{Character, CharacterClass, Race};
use crate::character_builder::create_character;
use crate::dice::Roller;
use crate::game::{EngineError, GameEngine, GameState};
use crate::items;
use std::collections::VecDeque;

/// A roller that returns scripted faces in order.
///
/// Panics if the script runs out or a face does not fit the die, so a test
/// fails at the roll that went wrong instead of somewhere downstream.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    faces: VecDeque<u32>,
    rolled: usize,
}

impl ScriptedRoller {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            rolled: 0,
        }
    }

    /// Queue more faces after the current script.
    pub fn push(&mut self, faces: impl IntoIterator<Item = u32>) {
        self.faces.extend(faces);
    }

    /// Faces not yet rolled.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }

    /// Faces rolled so far.
    pub fn rolled(&self) -> usize {
        self.rolled
    }
}

impl Roller for ScriptedRoller {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let Some(face) = self.faces.pop_front() else {
            panic!(
                "ScriptedRoller exhausted after {} rolls (asked for a d{sides})",
                self.rolled
            );
        };
        assert!(
            (1..=sides).contains(&face),
            "ScriptedRoller face {face} does not fit a d{sides} (roll #{})",
            self.rolled + 1
        );
        self.rolled += 1;
        face
    }
}

/// A level-1 Human Warrior with the standard kit.
///
/// STR 17, DEX 13, CON 15, INT 9, WIS 11, CHA 11; 16 HP, AC 15,
/// attack +5, damage +3, longsword (d8).
pub fn sample_warrior() -> Character {
    create_character("Test Hero", Race::Human, CharacterClass::Warrior)
}

/// A test harness for running scripted game scenarios.
pub struct TestHarness {
    pub engine: GameEngine,
    pub state: GameState,
    pub dice: ScriptedRoller,
}

impl TestHarness {
    /// Built-in adventure, sample warrior, at the start node.
    pub fn new() -> Self {
        Self::with_character(sample_warrior())
    }

    pub fn with_character(character: Character) -> Self {
        let engine = GameEngine::new();
        let start = engine.config().start_node_id.clone();
        let state = GameState::new(character, start);
        Self {
            engine,
            state,
            dice: ScriptedRoller::default(),
        }
    }

    /// Jump to a node, starting its encounter if it has one.
    pub fn at_node(mut self, node_id: &str) -> Self {
        self.state.current_node_id = node_id.to_string();
        self.state.visited_nodes.insert(node_id.to_string());
        self.state = self.engine.check_combat_trigger(&self.state);
        self
    }

    /// Queue die faces for the next operations.
    pub fn script(&mut self, faces: impl IntoIterator<Item = u32>) -> &mut Self {
        self.dice.push(faces);
        self
    }

    pub fn choose(&mut self, index: usize) -> Result<&GameState, EngineError> {
        self.state = self.engine.choose(&self.state, index, &mut self.dice)?;
        Ok(&self.state)
    }

    pub fn attack(&mut self) -> &GameState {
        self.state = self.engine.combat_attack(&self.state, &mut self.dice);
        &self.state
    }

    pub fn defend(&mut self) -> &GameState {
        self.state = self.engine.combat_defend(&self.state, &mut self.dice);
        &self.state
    }

    pub fn flee(&mut self) -> &GameState {
        self.state = self.engine.combat_flee(&self.state, &mut self.dice);
        &self.state
    }

    /// Use a catalog item by id in combat.
    pub fn use_item(&mut self, item_id: &str) -> &GameState {
        if let Some(item) = items::get_item(item_id) {
            self.state = self.engine.combat_use_item(&self.state, &item, &mut self.dice);
        }
        &self.state
    }

    pub fn enemy_turn(&mut self) -> &GameState {
        self.state = self.engine.combat_enemy_turn(&self.state, &mut self.dice);
        &self.state
    }

    pub fn end_combat(&mut self) -> &GameState {
        self.state = self.engine.end_combat(&self.state, &mut self.dice);
        &self.state
    }

    pub fn player_hp(&self) -> (i32, i32) {
        let c = &self.state.character;
        (c.current_hp, c.max_hp)
    }

    pub fn enemy_hp(&self) -> Option<i32> {
        self.state.combat.as_ref().map(|c| c.enemy_current_hp)
    }

    pub fn in_combat(&self) -> bool {
        self.state.in_combat()
    }

    pub fn current_node_id(&self) -> &str {
        &self.state.current_node_id
    }

    pub fn last_log(&self) -> Option<&str> {
        self.state.log.last().map(String::as_str)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert player HP is at expected values.
#[track_caller]
pub fn assert_hp(harness: &TestHarness, current: i32, max: i32) {
    let (actual_current, actual_max) = harness.player_hp();
    assert_eq!(
        (actual_current, actual_max),
        (current, max),
        "Expected HP {current}/{max}, got {actual_current}/{actual_max}"
    );
}

/// Assert player is in combat.
#[track_caller]
pub fn assert_in_combat(harness: &TestHarness) {
    assert!(harness.in_combat(), "Expected to be in combat");
}

/// Assert player is NOT in combat.
#[track_caller]
pub fn assert_not_in_combat(harness: &TestHarness) {
    assert!(!harness.in_combat(), "Expected to NOT be in combat");
}

/// Assert the current story node.
#[track_caller]
pub fn assert_at_node(harness: &TestHarness, node_id: &str) {
    assert_eq!(
        harness.current_node_id(),
        node_id,
        "Expected to be at node '{node_id}'"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_roller_in_order() {
        let mut dice = ScriptedRoller::new([3, 20, 1]);
        assert_eq!(dice.roll_die(6), 3);
        assert_eq!(dice.roll_die(20), 20);
        assert_eq!(dice.remaining(), 1);
        assert_eq!(dice.roll_multiple(1, 4), vec![1]);
        assert_eq!(dice.rolled(), 3);
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn test_scripted_roller_exhausted() {
        let mut dice = ScriptedRoller::new([4]);
        dice.roll_die(6);
        dice.roll_die(6);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_scripted_roller_rejects_impossible_face() {
        let mut dice = ScriptedRoller::new([7]);
        dice.roll_die(6);
    }

    #[test]
    fn test_sample_warrior() {
        let c = sample_warrior();
        assert_eq!(c.max_hp, 16);
        assert_eq!(c.armor_class(), 15);
        assert_eq!(c.attack_bonus(), 5);
        assert_eq!(c.damage_bonus(), 3);
    }

    #[test]
    fn test_harness_story_flow() {
        let mut harness = TestHarness::new();
        assert_at_node(&harness, "start");
        harness.choose(0).expect("valid choice");
        assert_at_node(&harness, "tavern_bar");
        assert_not_in_combat(&harness);
    }

    #[test]
    fn test_harness_combat_flow() {
        let mut harness = TestHarness::new().at_node("forest_main_path");
        assert_in_combat(&harness);
        assert_eq!(harness.enemy_hp(), Some(12));

        // Hit for 8 + 3, goblin misses
        harness.script([15, 8, 2]);
        harness.attack();
        assert_eq!(harness.enemy_hp(), Some(1));
        harness.enemy_turn();
        assert_hp(&harness, 16, 16);

        harness.script([15, 1]);
        harness.attack();
        harness.end_combat();
        assert_not_in_combat(&harness);
        assert_at_node(&harness, "forest_after_goblin");
        assert_eq!(harness.dice.remaining(), 0);
    }
}
