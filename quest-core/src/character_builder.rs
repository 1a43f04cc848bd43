//! Character creation.
//!
//! [`create_character`] applies the standard rules; [`CharacterBuilder`]
//! allows overriding the starting gold and kit.

use crate::character::{Ability, Character, CharacterClass, Race};
use crate::config::GameConfig;
use crate::items::{self, Item, ItemType};
use tracing::info;

/// Create a level-1 character with the standard rules.
///
/// Stats are the class base plus the racial bonus. Max HP is the hit die
/// maximum plus CON modifier plus the starting bonus. The class starter kit
/// is carried, its first weapon and first armor are equipped, and the
/// character starts with 10 gold.
pub fn create_character(name: impl Into<String>, race: Race, class: CharacterClass) -> Character {
    create_character_with(name, race, class, &GameConfig::default())
}

/// [`create_character`] with configurable starting gold and HP bonus.
pub fn create_character_with(
    name: impl Into<String>,
    race: Race,
    class: CharacterClass,
    config: &GameConfig,
) -> Character {
    assemble(
        name.into(),
        race,
        class,
        config.starting_gold,
        config.starting_hp_bonus,
        items::starter_items(class),
    )
}

fn assemble(
    name: String,
    race: Race,
    class: CharacterClass,
    gold: u32,
    hp_bonus: i32,
    kit: Vec<Item>,
) -> Character {
    let class_data = class.data();
    let stats = class_data.base_stats + race.data().stat_bonus;
    let max_hp = class_data.hit_die.sides() as i32 + stats.modifier(Ability::Constitution) + hp_bonus;

    let mut character = Character::new(name, race, class, stats, max_hp);
    character.equipped_weapon = kit
        .iter()
        .find(|i| i.item_type == ItemType::Weapon)
        .cloned();
    character.equipped_armor = kit
        .iter()
        .find(|i| i.item_type == ItemType::Armor)
        .cloned();
    character.inventory = kit;
    character.gold = gold;

    info!(
        name = %character.name,
        race = %race,
        class = %class,
        max_hp = character.max_hp,
        "character created"
    );
    character
}

/// Fluent character creation.
#[derive(Debug, Clone, Default)]
pub struct CharacterBuilder {
    name: Option<String>,
    race: Option<Race>,
    class: Option<CharacterClass>,
    config: GameConfig,
    gold: Option<u32>,
    starting_items: Option<Vec<Item>>,
}

/// Error from character building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    MissingName,
    MissingRace,
    MissingClass,
}

impl std::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderError::MissingName => write!(f, "Character name is required"),
            BuilderError::MissingRace => write!(f, "Race selection is required"),
            BuilderError::MissingClass => write!(f, "Class selection is required"),
        }
    }
}

impl std::error::Error for BuilderError {}

impl CharacterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn race(mut self, race: Race) -> Self {
        self.race = Some(race);
        self
    }

    pub fn class(mut self, class: CharacterClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Take starting gold and HP bonus from a config.
    pub fn config(mut self, config: &GameConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Override starting gold.
    pub fn gold(mut self, gold: u32) -> Self {
        self.gold = Some(gold);
        self
    }

    /// Replace the class starter kit.
    pub fn starting_items(mut self, items: Vec<Item>) -> Self {
        self.starting_items = Some(items);
        self
    }

    pub fn build(self) -> Result<Character, BuilderError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(BuilderError::MissingName)?;
        let race = self.race.ok_or(BuilderError::MissingRace)?;
        let class = self.class.ok_or(BuilderError::MissingClass)?;

        let kit = self
            .starting_items
            .unwrap_or_else(|| items::starter_items(class));
        let gold = self.gold.unwrap_or(self.config.starting_gold);

        Ok(assemble(
            name,
            race,
            class,
            gold,
            self.config.starting_hp_bonus,
            kit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Stats;

    #[test]
    fn test_create_warrior() {
        let c = create_character("Brunhild", Race::Dwarf, CharacterClass::Warrior);
        assert_eq!(c.level, 1);
        assert_eq!(c.experience, 0);
        // 16+1 STR, 14+2 CON
        assert_eq!(c.stats, Stats::new(17, 12, 16, 8, 10, 10));
        // d10 + CON 3 + 4
        assert_eq!(c.max_hp, 17);
        assert_eq!(c.current_hp, c.max_hp);
        assert_eq!(c.gold, 10);
        assert_eq!(c.equipped_weapon.as_ref().map(|w| w.id.as_str()), Some("longsword"));
        assert_eq!(c.equipped_armor.as_ref().map(|a| a.id.as_str()), Some("chainmail"));
        assert_eq!(c.inventory.len(), 3);
    }

    #[test]
    fn test_create_elf_mage() {
        let c = create_character("Lirael", Race::Elf, CharacterClass::Mage);
        assert_eq!(c.stats.dexterity, 14);
        assert_eq!(c.stats.wisdom, 15);
        // d6 + CON 0 + 4
        assert_eq!(c.max_hp, 10);
        // 10 + DEX 2 + robe 1
        assert_eq!(c.armor_class(), 13);
        // INT 16 -> 3, + proficiency 2
        assert_eq!(c.attack_bonus(), 5);
    }

    #[test]
    fn test_config_changes_gold_and_hp() {
        let config = GameConfig::new()
            .with_starting_gold(0)
            .with_starting_hp_bonus(0);
        let c = create_character_with("Pip", Race::Halfling, CharacterClass::Rogue, &config);
        assert_eq!(c.gold, 0);
        // d8 + CON 1
        assert_eq!(c.max_hp, 9);
    }

    #[test]
    fn test_builder_matches_create_character() {
        let built = CharacterBuilder::new()
            .name("Ash")
            .race(Race::Human)
            .class(CharacterClass::Ranger)
            .build()
            .expect("complete builder");
        assert_eq!(built, create_character("Ash", Race::Human, CharacterClass::Ranger));
    }

    #[test]
    fn test_builder_overrides() {
        let c = CharacterBuilder::new()
            .name("  Wren  ")
            .race(Race::Elf)
            .class(CharacterClass::Rogue)
            .gold(250)
            .starting_items(vec![items::rusty_sword()])
            .build()
            .expect("complete builder");
        assert_eq!(c.name, "Wren");
        assert_eq!(c.gold, 250);
        assert_eq!(c.weapon_damage(), 4);
        assert!(c.equipped_armor.is_none());
    }

    #[test]
    fn test_builder_errors() {
        let missing_name = CharacterBuilder::new()
            .name("   ")
            .race(Race::Human)
            .class(CharacterClass::Mage)
            .build();
        assert_eq!(missing_name, Err(BuilderError::MissingName));

        let missing_race = CharacterBuilder::new()
            .name("Vex")
            .class(CharacterClass::Mage)
            .build();
        assert_eq!(missing_race, Err(BuilderError::MissingRace));

        let missing_class = CharacterBuilder::new().name("Vex").race(Race::Human).build();
        assert_eq!(missing_class, Err(BuilderError::MissingClass));
        assert_eq!(
            BuilderError::MissingClass.to_string(),
            "Class selection is required"
        );
    }
}
