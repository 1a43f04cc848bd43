//! Rules engine for Dungeon Quest, a single-player fantasy adventure.
//!
//! This crate provides:
//! - Dice rolling with an injectable [`Roller`]
//! - Characters, classes, races and the item and enemy catalogs
//! - Turn-based combat against a single enemy
//! - A branching story graph with skill checks, rewards and encounters
//! - A headless driver for scripted play
//!
//! Every game operation takes a [`GameState`] snapshot and returns a new one.
//!
//! # Quick Start
//!
//! ```
//! use quest_core::{create_character, CharacterClass, GameEngine, Race, RandomRoller};
//!
//! let engine = GameEngine::new();
//! let hero = create_character("Thorin", Race::Dwarf, CharacterClass::Warrior);
//! let mut rng = RandomRoller::seeded(42);
//!
//! let state = engine.new_game(hero)?;
//! let state = engine.choose(&state, 0, &mut rng)?;
//! println!("{}", engine.current_node(&state).map_or("", |n| n.title.as_str()));
//! # Ok::<(), quest_core::EngineError>(())
//! ```

pub mod character;
pub mod character_builder;
pub mod class_data;
pub mod combat;
pub mod config;
pub mod dice;
pub mod enemies;
pub mod game;
pub mod headless;
pub mod items;
pub mod story;
pub mod story_data;
pub mod testing;

// Primary public API
pub use character::{Ability, Character, CharacterClass, Race, SkillType, Stats};
pub use character_builder::{create_character, BuilderError, CharacterBuilder};
pub use combat::{CombatAction, CombatEngine, CombatOutcome, CombatState};
pub use config::GameConfig;
pub use dice::{DicePool, DieType, RandomRoller, RollResult, Roller};
pub use enemies::Enemy;
pub use game::{EngineError, GameEngine, GameState};
pub use headless::{HeadlessConfig, HeadlessGame};
pub use items::{Item, ItemType};
pub use story::{StoryChoice, StoryError, StoryGraph, StoryNode};
pub use testing::{ScriptedRoller, TestHarness};
