//! Combat scenarios against the built-in encounters, driven by scripted dice.
//!
//! The sample warrior has AC 15, attack +5, damage d8+3 and 16 HP.

use quest_core::combat::CombatOutcome;
use quest_core::items;
use quest_core::testing::{
    assert_at_node, assert_hp, assert_in_combat, assert_not_in_combat, TestHarness,
};

fn outcome(harness: &TestHarness) -> Option<CombatOutcome> {
    harness.state.combat.as_ref().map(|c| c.outcome())
}

// =============================================================================
// Winning and losing
// =============================================================================

#[test]
fn test_critical_hit_wins_and_pays_out() {
    let mut harness = TestHarness::new().at_node("forest_main_path");
    assert_in_combat(&harness);

    // Natural 20: (5 + 3) doubled takes the goblin's 12 HP
    harness.script([20, 5]);
    harness.attack();
    assert_eq!(outcome(&harness), Some(CombatOutcome::Victory));
    assert_eq!(harness.enemy_hp(), Some(0));
    assert_eq!(harness.state.character.experience, 25);
    assert_eq!(harness.state.character.gold, 15);

    harness.end_combat();
    assert_not_in_combat(&harness);
    assert_at_node(&harness, "forest_after_goblin");
    assert_eq!(harness.state.character.level, 1);
    assert_eq!(harness.dice.remaining(), 0);
}

#[test]
fn test_defeat_ends_the_game() {
    let mut harness = TestHarness::new().at_node("forest_main_path");
    harness.state.character.current_hp = 1;

    // Miss, then the goblin hits for 3
    harness.script([2, 15, 3]);
    harness.attack();
    harness.enemy_turn();
    assert_hp(&harness, 0, 16);
    assert_eq!(outcome(&harness), Some(CombatOutcome::Defeat));

    // Nothing more can happen in a finished fight
    let before = harness.state.clone();
    harness.attack();
    assert_eq!(harness.state, before);

    harness.end_combat();
    assert_at_node(&harness, "forest_main_path");
    assert!(harness.engine.is_game_over(&harness.state));
}

// =============================================================================
// Defend, items and flight
// =============================================================================

#[test]
fn test_defend_lasts_one_enemy_turn() {
    let mut harness = TestHarness::new().at_node("forest_main_path");

    // 12 + 3 misses AC 17 while defending
    harness.script([12]);
    harness.defend();
    harness.enemy_turn();
    assert_hp(&harness, 16, 16);
    assert_eq!(
        harness.state.combat.as_ref().map(|c| c.player_defending),
        Some(false)
    );

    // The same roll hits AC 15
    harness.script([2, 12, 1]);
    harness.attack();
    harness.enemy_turn();
    assert_hp(&harness, 15, 16);
}

#[test]
fn test_potion_heals_and_is_used_up() {
    let mut harness = TestHarness::new().at_node("forest_main_path");
    harness.state.character.current_hp = 5;

    // 2d4+2 = 1 + 2 + 2, then the goblin misses
    harness.script([1, 2, 2]);
    harness.use_item("health_potion");
    assert_hp(&harness, 10, 16);
    assert!(!harness.state.character.has_item("health_potion"));

    harness.enemy_turn();
    assert_hp(&harness, 10, 16);
    assert!(harness.state.combat.as_ref().is_some_and(|c| c.can_player_act()));
}

#[test]
fn test_item_not_carried_is_refused() {
    let mut harness = TestHarness::new().at_node("forest_main_path");
    harness.use_item("greater_health_potion");
    let combat = harness.state.combat.as_ref().expect("still fighting");
    assert!(combat.can_player_act());
    assert!(combat
        .log
        .last()
        .is_some_and(|line| line.contains("don't have")));
}

#[test]
fn test_scroll_finishes_a_wounded_enemy() {
    let mut harness = TestHarness::new().at_node("dungeon_skeleton_room");
    harness.state.character.add_item(items::scroll_of_fireball());
    if let Some(combat) = harness.state.combat.as_mut() {
        combat.enemy_current_hp = 5;
    }

    harness.script([2, 2, 2]);
    harness.use_item("scroll_fireball");
    assert_eq!(outcome(&harness), Some(CombatOutcome::Victory));
    assert!(!harness.state.character.has_item("scroll_fireball"));
    assert_eq!(harness.state.character.experience, 50);

    harness.end_combat();
    assert_at_node(&harness, "dungeon_skeleton_loot");
}

#[test]
fn test_failed_flee_then_escape_and_reengage() {
    let mut harness = TestHarness::new().at_node("forest_main_path");

    // 5 + DEX 1 falls short of 12; goblin misses
    harness.script([5, 2]);
    harness.flee();
    assert_eq!(outcome(&harness), Some(CombatOutcome::Ongoing));
    harness.enemy_turn();

    harness.script([15]);
    harness.flee();
    assert_eq!(outcome(&harness), Some(CombatOutcome::Fled));

    harness.end_combat();
    assert_not_in_combat(&harness);
    assert_at_node(&harness, "forest_main_path");

    // Facing the same node again starts a fresh fight
    harness.state = harness.engine.check_combat_trigger(&harness.state);
    assert_in_combat(&harness);
    assert_eq!(harness.enemy_hp(), Some(12));
}

// =============================================================================
// Special abilities
// =============================================================================

#[test]
fn test_shaman_casts_once_from_round_two() {
    let mut harness = TestHarness::new().at_node("forest_rescue_fight");

    // Round 1: both miss
    harness.script([2, 2]);
    harness.attack();
    harness.enemy_turn();
    assert_hp(&harness, 16, 16);

    // Round 2: 2d4 = 6, WIS save 5 fails DC 12
    harness.script([2, 3, 3, 5]);
    harness.attack();
    harness.enemy_turn();
    assert_hp(&harness, 10, 16);
    assert_eq!(
        harness.state.combat.as_ref().map(|c| c.special_used),
        Some(true)
    );

    // Round 3: back to an ordinary attack, which misses
    harness.script([2, 2]);
    harness.attack();
    harness.enemy_turn();
    assert_hp(&harness, 10, 16);
    assert_eq!(harness.dice.remaining(), 0);
}

#[test]
fn test_successful_save_halves_special_damage() {
    let mut harness = TestHarness::new().at_node("forest_rescue_fight");
    if let Some(combat) = harness.state.combat.as_mut() {
        combat.round = 2;
    }

    // 2d4 = 7, save 15 beats DC 12: 3 damage
    harness.script([2, 4, 3, 15]);
    harness.attack();
    harness.enemy_turn();
    assert_hp(&harness, 13, 16);
}
