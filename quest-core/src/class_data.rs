//! Class and race tables for character creation.
//!
//! Hit dice, starting stats, primary abilities and skill proficiencies for
//! the four classes, plus the racial stat bonuses.

use crate::character::{Ability, CharacterClass, Race, SkillType, Stats};
use crate::dice::DieType;

/// Class-specific data for character creation.
pub struct ClassData {
    pub name: &'static str,
    pub description: &'static str,
    /// Die rolled for HP on each level-up; its maximum is level-1 HP.
    pub hit_die: DieType,
    /// Stats before racial bonuses.
    pub base_stats: Stats,
    /// Ability behind attack and damage bonuses.
    pub primary_ability: Ability,
    pub proficient_skills: &'static [SkillType],
}

impl CharacterClass {
    /// Get class data for character creation.
    pub fn data(&self) -> ClassData {
        match self {
            CharacterClass::Warrior => ClassData {
                name: "Warrior",
                description: "A hardened fighter who trusts steel and stamina.",
                hit_die: DieType::D10,
                base_stats: Stats::new(16, 12, 14, 8, 10, 10),
                primary_ability: Ability::Strength,
                proficient_skills: &[SkillType::Strength, SkillType::Constitution],
            },
            CharacterClass::Mage => ClassData {
                name: "Mage",
                description: "A scholar of the arcane, fragile but learned.",
                hit_die: DieType::D6,
                base_stats: Stats::new(8, 12, 10, 16, 14, 10),
                primary_ability: Ability::Intelligence,
                proficient_skills: &[SkillType::Intelligence, SkillType::Arcana],
            },
            CharacterClass::Rogue => ClassData {
                name: "Rogue",
                description: "Quick hands, quicker tongue.",
                hit_die: DieType::D8,
                base_stats: Stats::new(10, 16, 12, 12, 10, 14),
                primary_ability: Ability::Dexterity,
                proficient_skills: &[
                    SkillType::Dexterity,
                    SkillType::Stealth,
                    SkillType::Persuasion,
                ],
            },
            CharacterClass::Ranger => ClassData {
                name: "Ranger",
                description: "A tracker at home in the wilds.",
                hit_die: DieType::D10,
                base_stats: Stats::new(12, 14, 12, 10, 16, 8),
                primary_ability: Ability::Dexterity,
                proficient_skills: &[
                    SkillType::Wisdom,
                    SkillType::Perception,
                    SkillType::Dexterity,
                ],
            },
        }
    }
}

/// Race-specific data for character creation.
pub struct RaceData {
    pub name: &'static str,
    pub description: &'static str,
    /// Added to the class's base stats.
    pub stat_bonus: Stats,
}

impl Race {
    pub fn data(&self) -> RaceData {
        match self {
            Race::Human => RaceData {
                name: "Human",
                description: "Adaptable and ambitious.",
                stat_bonus: Stats::new(1, 1, 1, 1, 1, 1),
            },
            Race::Elf => RaceData {
                name: "Elf",
                description: "Graceful and perceptive.",
                stat_bonus: Stats::new(0, 2, 0, 0, 1, 0),
            },
            Race::Dwarf => RaceData {
                name: "Dwarf",
                description: "Stout and stubborn.",
                stat_bonus: Stats::new(1, 0, 2, 0, 0, 0),
            },
            Race::Halfling => RaceData {
                name: "Halfling",
                description: "Small, nimble and lucky.",
                stat_bonus: Stats::new(0, 2, 0, 0, 0, 1),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_classes_have_data() {
        for class in CharacterClass::all() {
            let data = class.data();
            assert!(!data.name.is_empty());
            assert!(!data.proficient_skills.is_empty());
        }
    }

    #[test]
    fn test_hit_dice() {
        assert_eq!(CharacterClass::Warrior.data().hit_die, DieType::D10);
        assert_eq!(CharacterClass::Mage.data().hit_die, DieType::D6);
        assert_eq!(CharacterClass::Rogue.data().hit_die, DieType::D8);
        assert_eq!(CharacterClass::Ranger.data().hit_die, DieType::D10);
    }

    #[test]
    fn test_primary_ability_is_highest_base_stat_for_warrior_and_mage() {
        let warrior = CharacterClass::Warrior.data();
        assert_eq!(warrior.base_stats.get(warrior.primary_ability), 16);
        let mage = CharacterClass::Mage.data();
        assert_eq!(mage.base_stats.get(mage.primary_ability), 16);
    }

    #[test]
    fn test_racial_bonuses() {
        assert_eq!(Race::Human.data().stat_bonus, Stats::new(1, 1, 1, 1, 1, 1));
        assert_eq!(Race::Elf.data().stat_bonus.dexterity, 2);
        assert_eq!(Race::Dwarf.data().stat_bonus.constitution, 2);
        assert_eq!(Race::Halfling.data().stat_bonus.charisma, 1);
    }
}
