//! Item model and the built-in item catalog.
//!
//! Story nodes, enemy loot tables and starting kits all refer to items by
//! id; [`get_item`] resolves an id to a fresh copy.

use crate::character::{CharacterClass, Stats};
use crate::dice::DicePool;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Healing for potions with `heal_amount` below [`GREATER_HEAL_THRESHOLD`].
pub const MINOR_HEAL_DICE: DicePool = DicePool::new(2, 4, 2);

/// Healing for potions at or above [`GREATER_HEAL_THRESHOLD`].
pub const GREATER_HEAL_DICE: DicePool = DicePool::new(4, 4, 4);

pub const GREATER_HEAL_THRESHOLD: i32 = 20;

/// Damage of any attack scroll read in combat.
pub const SCROLL_DAMAGE_DICE: DicePool = DicePool::new(3, 6, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Armor,
    Potion,
    Ring,
    Scroll,
    QuestItem,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemType::Weapon => "Weapon",
            ItemType::Armor => "Armor",
            ItemType::Potion => "Potion",
            ItemType::Ring => "Ring",
            ItemType::Scroll => "Scroll",
            ItemType::QuestItem => "Quest Item",
        };
        write!(f, "{name}")
    }
}

/// An item. Which numeric fields matter depends on `item_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: String,
    pub item_type: ItemType,
    /// Weapon damage die (sides), or fixed damage for scrolls.
    #[serde(default)]
    pub damage: u32,
    #[serde(default)]
    pub armor_bonus: i32,
    #[serde(default)]
    pub heal_amount: i32,
    /// Stat bonuses. Carried as data; no rule reads them yet.
    #[serde(default = "Stats::zero")]
    pub stat_bonus: Stats,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub consumable: bool,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            item_type,
            damage: 0,
            armor_bonus: 0,
            heal_amount: 0,
            stat_bonus: Stats::zero(),
            value: 0,
            consumable: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_armor_bonus(mut self, bonus: i32) -> Self {
        self.armor_bonus = bonus;
        self
    }

    pub fn with_healing(mut self, amount: i32) -> Self {
        self.heal_amount = amount;
        self
    }

    pub fn with_stat_bonus(mut self, bonus: Stats) -> Self {
        self.stat_bonus = bonus;
        self
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    pub fn consumable(mut self) -> Self {
        self.consumable = true;
        self
    }

    /// Dice rolled when this potion is drunk in combat.
    pub fn heal_dice(&self) -> DicePool {
        if self.heal_amount >= GREATER_HEAL_THRESHOLD {
            GREATER_HEAL_DICE
        } else {
            MINOR_HEAL_DICE
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item_type {
            ItemType::Weapon => write!(f, "{} (d{})", self.name, self.damage),
            ItemType::Armor | ItemType::Ring if self.armor_bonus != 0 => {
                write!(f, "{} (AC {:+})", self.name, self.armor_bonus)
            }
            ItemType::Potion => write!(f, "{} (heals {})", self.name, self.heal_amount),
            _ => write!(f, "{}", self.name),
        }
    }
}

// ============================================================================
// Weapons
// ============================================================================

pub fn rusty_sword() -> Item {
    Item::new("rusty_sword", "Rusty Sword", ItemType::Weapon)
        .with_description("Pitted and dull, but better than bare hands.")
        .with_damage(4)
        .with_value(5)
}

pub fn longsword() -> Item {
    Item::new("longsword", "Longsword", ItemType::Weapon)
        .with_description("A well-balanced blade.")
        .with_damage(8)
        .with_value(15)
}

pub fn staff() -> Item {
    Item::new("staff", "Staff", ItemType::Weapon)
        .with_description("Oak, carved with faded runes.")
        .with_damage(6)
        .with_value(10)
}

pub fn dagger() -> Item {
    Item::new("dagger", "Dagger", ItemType::Weapon)
        .with_description("Small and easy to hide.")
        .with_damage(4)
        .with_value(2)
}

pub fn longbow() -> Item {
    Item::new("longbow", "Longbow", ItemType::Weapon)
        .with_description("Yew, strung tight.")
        .with_damage(8)
        .with_value(15)
}

pub fn flame_sword() -> Item {
    Item::new("fire_sword", "Flame Sword", ItemType::Weapon)
        .with_description("The blade never stops smouldering.")
        .with_damage(12)
        .with_value(100)
}

// ============================================================================
// Armor and rings
// ============================================================================

pub fn leather_armor() -> Item {
    Item::new("leather_armor", "Leather Armor", ItemType::Armor)
        .with_description("Boiled leather, light and quiet.")
        .with_armor_bonus(2)
        .with_value(10)
}

pub fn chainmail() -> Item {
    Item::new("chainmail", "Chainmail", ItemType::Armor)
        .with_description("Heavy interlocking rings.")
        .with_armor_bonus(4)
        .with_value(30)
}

pub fn mage_robe() -> Item {
    Item::new("mage_robe", "Mage Robe", ItemType::Armor)
        .with_description("Embroidered with protective sigils.")
        .with_armor_bonus(1)
        .with_stat_bonus(Stats::new(0, 0, 0, 1, 0, 0))
        .with_value(20)
}

pub fn ring_of_strength() -> Item {
    Item::new("ring_strength", "Ring of Strength", ItemType::Ring)
        .with_description("Heavy gold that makes the wearer feel heavier still.")
        .with_stat_bonus(Stats::new(2, 0, 0, 0, 0, 0))
        .with_value(50)
}

pub fn amulet_of_protection() -> Item {
    Item::new("amulet_protection", "Amulet of Protection", ItemType::Ring)
        .with_description("Turns aside the worst of a blow.")
        .with_armor_bonus(1)
        .with_value(40)
}

// ============================================================================
// Consumables
// ============================================================================

pub fn health_potion() -> Item {
    Item::new("health_potion", "Health Potion", ItemType::Potion)
        .with_description("Tastes of copper and mint.")
        .with_healing(10)
        .with_value(5)
        .consumable()
}

pub fn greater_health_potion() -> Item {
    Item::new("greater_health_potion", "Greater Health Potion", ItemType::Potion)
        .with_description("Glows faintly red.")
        .with_healing(20)
        .with_value(15)
        .consumable()
}

pub fn scroll_of_fireball() -> Item {
    Item::new("scroll_fireball", "Scroll of Fireball", ItemType::Scroll)
        .with_description("Warm to the touch. Read once.")
        .with_damage(18)
        .with_value(25)
        .consumable()
}

// ============================================================================
// Quest items
// ============================================================================

pub fn mysterious_key() -> Item {
    Item::new("mysterious_key", "Mysterious Key", ItemType::QuestItem)
        .with_description("Black iron, cold no matter how long it is held.")
}

lazy_static::lazy_static! {
    /// Every item the built-in adventure can hand out.
    pub static ref ITEMS: Vec<Item> = vec![
        rusty_sword(),
        longsword(),
        staff(),
        dagger(),
        longbow(),
        flame_sword(),
        leather_armor(),
        chainmail(),
        mage_robe(),
        ring_of_strength(),
        amulet_of_protection(),
        health_potion(),
        greater_health_potion(),
        scroll_of_fireball(),
        mysterious_key(),
    ];
}

/// Look up a catalog item by id.
pub fn get_item(id: &str) -> Option<Item> {
    ITEMS.iter().find(|i| i.id == id).cloned()
}

/// Starting kit for a class. The first weapon and armor are equipped.
pub fn starter_items(class: CharacterClass) -> Vec<Item> {
    match class {
        CharacterClass::Warrior => vec![longsword(), chainmail(), health_potion()],
        CharacterClass::Mage => vec![staff(), mage_robe(), health_potion(), health_potion()],
        CharacterClass::Rogue => vec![
            dagger(),
            leather_armor(),
            health_potion(),
            health_potion(),
        ],
        CharacterClass::Ranger => vec![longbow(), leather_armor(), health_potion()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_item() {
        let sword = get_item("fire_sword").expect("catalog has fire_sword");
        assert_eq!(sword.name, "Flame Sword");
        assert_eq!(sword.damage, 12);
        assert!(get_item("vorpal_blade").is_none());
    }

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<&str> = ITEMS.iter().map(|i| i.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), ITEMS.len());
    }

    #[test]
    fn test_heal_dice_by_strength() {
        assert_eq!(health_potion().heal_dice(), MINOR_HEAL_DICE);
        assert_eq!(greater_health_potion().heal_dice(), GREATER_HEAL_DICE);
    }

    #[test]
    fn test_consumables() {
        assert!(health_potion().consumable);
        assert!(scroll_of_fireball().consumable);
        assert!(!longsword().consumable);
        assert!(!mysterious_key().consumable);
    }

    #[test]
    fn test_starter_items() {
        let mage = starter_items(CharacterClass::Mage);
        assert_eq!(mage.len(), 4);
        assert_eq!(mage[0].id, "staff");
        assert_eq!(
            mage.iter().filter(|i| i.id == "health_potion").count(),
            2
        );

        for class in CharacterClass::all() {
            let kit = starter_items(*class);
            assert!(kit.iter().any(|i| i.item_type == ItemType::Weapon));
            assert!(kit.iter().any(|i| i.item_type == ItemType::Armor));
        }
    }

    #[test]
    fn test_item_display() {
        assert_eq!(longsword().to_string(), "Longsword (d8)");
        assert_eq!(chainmail().to_string(), "Chainmail (AC +4)");
        assert_eq!(health_potion().to_string(), "Health Potion (heals 10)");
        assert_eq!(mysterious_key().to_string(), "Mysterious Key");
    }

    #[test]
    fn test_item_json_defaults() {
        let item: Item =
            serde_json::from_str(r#"{"id":"rope","name":"Rope","description":"","item_type":"QuestItem"}"#)
                .expect("valid item json");
        assert_eq!(item.damage, 0);
        assert!(item.stat_bonus.is_zero());
        assert!(!item.consumable);
    }
}
