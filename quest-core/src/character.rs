//! Player character model and derived-stat rules.
//!
//! A [`Character`] stores only base values (stats, level, equipment,
//! inventory). Armor class, attack and damage bonuses, skill modifiers and
//! XP thresholds are always computed on demand, so they can never drift out
//! of sync with the equipment that feeds them.

use crate::dice::Roller;
use crate::items::{Item, ItemType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Highest level a character can reach.
pub const MAX_LEVEL: u32 = 10;

/// Armor class before dexterity and equipment.
pub const BASE_ARMOR_CLASS: i32 = 10;

/// Damage die used when no weapon is equipped.
pub const UNARMED_DAMAGE: u32 = 2;

// ============================================================================
// Abilities
// ============================================================================

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Ability scores. Also used for racial and item bonuses, which is why the
/// fields are signed and the type adds component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Stats {
    pub const fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    /// All zeroes, for bonus blocks.
    pub const fn zero() -> Self {
        Self::new(0, 0, 0, 0, 0, 0)
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        // Floor division: 8-9 = -1, 10-11 = 0, 12-13 = +1
        (self.get(ability) - 10).div_euclid(2)
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

impl Add for Stats {
    type Output = Stats;

    fn add(self, other: Stats) -> Stats {
        Stats::new(
            self.strength + other.strength,
            self.dexterity + other.dexterity,
            self.constitution + other.constitution,
            self.intelligence + other.intelligence,
            self.wisdom + other.wisdom,
            self.charisma + other.charisma,
        )
    }
}

// ============================================================================
// Skills
// ============================================================================

/// Checks a story choice can call for: the raw abilities plus four skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillType {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
    Perception,
    Stealth,
    Persuasion,
    Arcana,
}

impl SkillType {
    pub fn ability(&self) -> Ability {
        match self {
            SkillType::Strength => Ability::Strength,
            SkillType::Dexterity | SkillType::Stealth => Ability::Dexterity,
            SkillType::Constitution => Ability::Constitution,
            SkillType::Intelligence | SkillType::Arcana => Ability::Intelligence,
            SkillType::Wisdom | SkillType::Perception => Ability::Wisdom,
            SkillType::Charisma | SkillType::Persuasion => Ability::Charisma,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SkillType::Strength => "Strength",
            SkillType::Dexterity => "Dexterity",
            SkillType::Constitution => "Constitution",
            SkillType::Intelligence => "Intelligence",
            SkillType::Wisdom => "Wisdom",
            SkillType::Charisma => "Charisma",
            SkillType::Perception => "Perception",
            SkillType::Stealth => "Stealth",
            SkillType::Persuasion => "Persuasion",
            SkillType::Arcana => "Arcana",
        }
    }
}

impl fmt::Display for SkillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Class and race
// ============================================================================

/// Playable classes. Per-class numbers live in `class_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Mage,
    Rogue,
    Ranger,
}

impl CharacterClass {
    pub fn all() -> &'static [CharacterClass] {
        &[
            CharacterClass::Warrior,
            CharacterClass::Mage,
            CharacterClass::Rogue,
            CharacterClass::Ranger,
        ]
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data().name)
    }
}

/// Playable races.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Halfling,
}

impl Race {
    pub fn all() -> &'static [Race] {
        &[Race::Human, Race::Elf, Race::Dwarf, Race::Halfling]
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data().name)
    }
}

// ============================================================================
// Character
// ============================================================================

/// One step of the level-up loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub new_level: u32,
    pub hp_gain: i32,
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub race: Race,
    pub class: CharacterClass,
    pub level: u32,
    pub experience: u32,
    pub max_hp: i32,
    pub current_hp: i32,
    pub stats: Stats,
    pub base_armor_class: i32,
    pub inventory: Vec<Item>,
    pub equipped_weapon: Option<Item>,
    pub equipped_armor: Option<Item>,
    pub gold: u32,
}

impl Character {
    /// A bare level-1 character with full HP and nothing carried.
    pub fn new(
        name: impl Into<String>,
        race: Race,
        class: CharacterClass,
        stats: Stats,
        max_hp: i32,
    ) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            name: name.into(),
            race,
            class,
            level: 1,
            experience: 0,
            max_hp,
            current_hp: max_hp,
            stats,
            base_armor_class: BASE_ARMOR_CLASS,
            inventory: Vec::new(),
            equipped_weapon: None,
            equipped_armor: None,
            gold: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Derived stats
    // ------------------------------------------------------------------------

    /// Base AC + DEX modifier + worn armor + every ring carried.
    ///
    /// Rings work from the pack; they never need to be equipped.
    pub fn armor_class(&self) -> i32 {
        let armor = self
            .equipped_armor
            .as_ref()
            .map(|a| a.armor_bonus)
            .unwrap_or(0);
        let rings: i32 = self
            .inventory
            .iter()
            .filter(|i| i.item_type == ItemType::Ring)
            .map(|i| i.armor_bonus)
            .sum();
        self.base_armor_class + self.stats.modifier(Ability::Dexterity) + armor + rings
    }

    pub fn proficiency_bonus(&self) -> i32 {
        (self.level / 4) as i32 + 2
    }

    /// Modifier of the class's primary ability.
    pub fn primary_modifier(&self) -> i32 {
        self.stats.modifier(self.class.data().primary_ability)
    }

    pub fn attack_bonus(&self) -> i32 {
        self.primary_modifier() + self.proficiency_bonus()
    }

    pub fn damage_bonus(&self) -> i32 {
        self.primary_modifier()
    }

    pub fn weapon_damage(&self) -> u32 {
        self.equipped_weapon
            .as_ref()
            .map(|w| w.damage)
            .unwrap_or(UNARMED_DAMAGE)
    }

    pub fn xp_to_next_level(&self) -> u32 {
        self.level * 100
    }

    pub fn is_proficient(&self, skill: SkillType) -> bool {
        self.class.data().proficient_skills.contains(&skill)
    }

    pub fn skill_modifier(&self, skill: SkillType) -> i32 {
        let base = self.stats.modifier(skill.ability());
        if self.is_proficient(skill) {
            base + self.proficiency_bonus()
        } else {
            base
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hp <= 0
    }

    // ------------------------------------------------------------------------
    // Hit points
    // ------------------------------------------------------------------------

    /// Apply damage, clamping at 0. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let old = self.current_hp;
        self.current_hp = (self.current_hp - amount.max(0)).max(0);
        old - self.current_hp
    }

    /// Heal, clamping at max HP. Returns the HP actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let old = self.current_hp;
        self.current_hp = (self.current_hp + amount.max(0)).min(self.max_hp);
        self.current_hp - old
    }

    pub fn heal_full(&mut self) -> i32 {
        let old = self.current_hp;
        self.current_hp = self.max_hp;
        self.current_hp - old
    }

    // ------------------------------------------------------------------------
    // Inventory
    // ------------------------------------------------------------------------

    pub fn has_item(&self, item_id: &str) -> bool {
        self.inventory.iter().any(|i| i.id == item_id)
    }

    pub fn count_item(&self, item_id: &str) -> usize {
        self.inventory.iter().filter(|i| i.id == item_id).count()
    }

    pub fn find_item(&self, item_id: &str) -> Option<&Item> {
        self.inventory.iter().find(|i| i.id == item_id)
    }

    pub fn add_item(&mut self, item: Item) {
        self.inventory.push(item);
    }

    /// Remove one carried instance with this id. Returns false if none.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        match self.inventory.iter().position(|i| i.id == item_id) {
            Some(idx) => {
                self.inventory.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Add an item and equip it when it beats the current weapon (by damage)
    /// or armor (by armor bonus). Returns true if it was equipped.
    pub fn receive_item(&mut self, item: Item) -> bool {
        let upgrade = match item.item_type {
            ItemType::Weapon => {
                let current = self.equipped_weapon.as_ref().map(|w| w.damage).unwrap_or(0);
                item.damage > current
            }
            ItemType::Armor => {
                let current = self
                    .equipped_armor
                    .as_ref()
                    .map(|a| a.armor_bonus)
                    .unwrap_or(0);
                item.armor_bonus > current
            }
            _ => false,
        };

        if upgrade {
            match item.item_type {
                ItemType::Weapon => self.equipped_weapon = Some(item.clone()),
                _ => self.equipped_armor = Some(item.clone()),
            }
        }
        self.inventory.push(item);
        upgrade
    }

    /// Equip a carried weapon or armor. Other item types, and items the
    /// character does not carry, are ignored.
    pub fn equip(&mut self, item: &Item) -> bool {
        if !self.has_item(&item.id) {
            return false;
        }
        match item.item_type {
            ItemType::Weapon => {
                self.equipped_weapon = Some(item.clone());
                true
            }
            ItemType::Armor => {
                self.equipped_armor = Some(item.clone());
                true
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------------
    // Experience
    // ------------------------------------------------------------------------

    /// Level up while XP covers the threshold, up to `max_level`.
    ///
    /// Each step spends the threshold of the level being left and gains
    /// `max(1, hit die + CON)` HP. XP past the cap is kept.
    pub fn level_up<R: Roller + ?Sized>(&mut self, rng: &mut R, max_level: u32) -> Vec<LevelUp> {
        let mut steps = Vec::new();
        let hit_die = self.class.data().hit_die.sides();
        let con_mod = self.stats.modifier(Ability::Constitution);

        while self.experience >= self.xp_to_next_level() && self.level < max_level {
            self.experience -= self.xp_to_next_level();
            self.level += 1;
            let hp_gain = (rng.roll_die(hit_die) as i32 + con_mod).max(1);
            self.max_hp += hp_gain;
            self.current_hp += hp_gain;
            steps.push(LevelUp {
                new_level: self.level,
                hp_gain,
            });
        }

        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items;
    use crate::testing::{sample_warrior, ScriptedRoller};

    #[test]
    fn test_modifier_floors() {
        let stats = Stats::new(16, 12, 9, 8, 10, 3);
        assert_eq!(stats.modifier(Ability::Strength), 3);
        assert_eq!(stats.modifier(Ability::Dexterity), 1);
        assert_eq!(stats.modifier(Ability::Constitution), -1);
        assert_eq!(stats.modifier(Ability::Intelligence), -1);
        assert_eq!(stats.modifier(Ability::Wisdom), 0);
        assert_eq!(stats.modifier(Ability::Charisma), -4);
    }

    #[test]
    fn test_stats_add() {
        let total = Stats::new(16, 12, 14, 8, 10, 10) + Stats::new(1, 0, 2, 0, 0, 0);
        assert_eq!(total, Stats::new(17, 12, 16, 8, 10, 10));
    }

    #[test]
    fn test_armor_class_counts_rings_in_pack() {
        let mut c = sample_warrior();
        c.equipped_armor = None;
        c.inventory.clear();
        // DEX 13 -> +1
        assert_eq!(c.armor_class(), 11);

        c.add_item(items::chainmail());
        assert!(c.equip(&items::chainmail()));
        assert_eq!(c.armor_class(), 15);

        c.add_item(items::amulet_of_protection());
        assert_eq!(c.armor_class(), 16);
    }

    #[test]
    fn test_attack_bonus_scales_with_level() {
        let mut c = sample_warrior();
        assert_eq!(c.attack_bonus(), 5);
        assert_eq!(c.damage_bonus(), 3);
        c.level = 4;
        assert_eq!(c.attack_bonus(), 6);
        c.level = 8;
        assert_eq!(c.attack_bonus(), 7);
        assert_eq!(c.damage_bonus(), 3);
    }

    #[test]
    fn test_unarmed_damage() {
        let mut c = sample_warrior();
        assert_eq!(c.weapon_damage(), 8);
        c.equipped_weapon = None;
        assert_eq!(c.weapon_damage(), UNARMED_DAMAGE);
    }

    #[test]
    fn test_skill_modifier_uses_class_proficiency() {
        let c = sample_warrior();
        // Proficient: STR 17 -> +3, plus proficiency 2
        assert_eq!(c.skill_modifier(SkillType::Strength), 5);
        // Not proficient: WIS 11 -> 0
        assert_eq!(c.skill_modifier(SkillType::Perception), 0);
    }

    #[test]
    fn test_hp_clamps() {
        let mut c = sample_warrior();
        let max = c.max_hp;
        assert_eq!(c.heal(50), 0);
        assert_eq!(c.current_hp, max);

        let lost = c.take_damage(max + 30);
        assert_eq!(lost, max);
        assert_eq!(c.current_hp, 0);
        assert!(c.is_defeated());

        c.heal(3);
        assert_eq!(c.current_hp, 3);
        c.heal_full();
        assert_eq!(c.current_hp, max);
    }

    #[test]
    fn test_remove_item_takes_one_instance() {
        let mut c = sample_warrior();
        c.add_item(items::health_potion());
        let before = c.count_item("health_potion");
        assert!(c.remove_item("health_potion"));
        assert_eq!(c.count_item("health_potion"), before - 1);
        assert!(!c.remove_item("no_such_item"));
    }

    #[test]
    fn test_receive_item_auto_equips_better_weapon() {
        let mut c = sample_warrior();
        c.equipped_weapon = Some(items::dagger());

        assert!(c.receive_item(items::longsword()));
        assert_eq!(c.weapon_damage(), 8);

        let mut stick = items::dagger();
        stick.damage = 2;
        assert!(!c.receive_item(stick));
        assert_eq!(c.weapon_damage(), 8);
    }

    #[test]
    fn test_receive_item_auto_equips_better_armor() {
        let mut c = sample_warrior();
        c.equipped_armor = Some(items::leather_armor());
        assert!(c.receive_item(items::chainmail()));
        assert_eq!(c.equipped_armor.as_ref().map(|a| a.id.as_str()), Some("chainmail"));
        assert!(!c.receive_item(items::mage_robe()));
    }

    #[test]
    fn test_equip_requires_carried_gear() {
        let mut c = sample_warrior();
        assert!(!c.equip(&items::flame_sword()));
        assert!(!c.equip(&items::health_potion()));
        c.add_item(items::dagger());
        assert!(c.equip(&items::dagger()));
        assert_eq!(c.weapon_damage(), 4);
    }

    #[test]
    fn test_level_up_exact_threshold_once() {
        let mut c = sample_warrior();
        c.experience = 100;
        let mut dice = ScriptedRoller::new([6]);
        let steps = c.level_up(&mut dice, MAX_LEVEL);
        assert_eq!(steps.len(), 1);
        assert_eq!(c.level, 2);
        assert_eq!(c.experience, 0);

        // Nothing new to spend: no further level-ups, no dice consumed
        let steps = c.level_up(&mut dice, MAX_LEVEL);
        assert!(steps.is_empty());
        assert_eq!(c.level, 2);
    }

    #[test]
    fn test_level_up_loops_through_thresholds() {
        let mut c = sample_warrior();
        let max_before = c.max_hp;
        c.experience = 350;
        // Warrior d10, CON 15 -> +2. Spends 100, then 200
        let mut dice = ScriptedRoller::new([5, 1]);
        let steps = c.level_up(&mut dice, MAX_LEVEL);

        assert_eq!(c.level, 3);
        assert_eq!(c.experience, 50);
        assert_eq!(
            steps,
            vec![
                LevelUp { new_level: 2, hp_gain: 7 },
                LevelUp { new_level: 3, hp_gain: 3 },
            ]
        );
        assert_eq!(c.max_hp, max_before + 10);
        assert!(c.current_hp <= c.max_hp);
    }

    #[test]
    fn test_level_up_hp_gain_at_least_one() {
        let mut c = sample_warrior();
        c.stats.constitution = 3; // -4
        c.experience = 100;
        let mut dice = ScriptedRoller::new([1]);
        let steps = c.level_up(&mut dice, MAX_LEVEL);
        assert_eq!(steps[0].hp_gain, 1);
    }

    #[test]
    fn test_level_cap_keeps_experience() {
        let mut c = sample_warrior();
        c.level = 9;
        c.experience = 2000;
        let mut dice = ScriptedRoller::new([4]);
        let steps = c.level_up(&mut dice, MAX_LEVEL);
        assert_eq!(steps.len(), 1);
        assert_eq!(c.level, MAX_LEVEL);
        assert_eq!(c.experience, 1100);

        assert!(c.level_up(&mut dice, MAX_LEVEL).is_empty());
        assert_eq!(c.experience, 1100);
    }
}
