//! Enemy catalog and special-ability table.
//!
//! Enemies are read-only templates. A fight copies the template into its
//! [`CombatState`](crate::combat::CombatState) and tracks the enemy's current
//! HP there.

use crate::character::Ability;
use crate::dice::DicePool;
use serde::{Deserialize, Serialize};

/// An enemy template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub max_hp: i32,
    pub armor_class: i32,
    pub attack_bonus: i32,
    /// Damage die (sides) for normal attacks.
    pub damage: u32,
    pub xp_reward: u32,
    pub gold_reward: u32,
    /// Item ids handed over on defeat.
    #[serde(default)]
    pub loot: Vec<String>,
    /// Narration for the special ability, if the enemy has one.
    #[serde(default)]
    pub special_ability: Option<String>,
}

impl Enemy {
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_hp: i32, armor_class: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            max_hp,
            armor_class,
            attack_bonus: 0,
            damage: 4,
            xp_reward: 0,
            gold_reward: 0,
            loot: Vec::new(),
            special_ability: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attack(mut self, attack_bonus: i32, damage: u32) -> Self {
        self.attack_bonus = attack_bonus;
        self.damage = damage;
        self
    }

    pub fn with_rewards(mut self, xp: u32, gold: u32) -> Self {
        self.xp_reward = xp;
        self.gold_reward = gold;
        self
    }

    pub fn with_loot(mut self, item_id: impl Into<String>) -> Self {
        self.loot.push(item_id.into());
        self
    }

    pub fn with_special(mut self, narration: impl Into<String>) -> Self {
        self.special_ability = Some(narration.into());
        self
    }

    pub fn has_special(&self) -> bool {
        self.special_ability.is_some()
    }

    /// The mechanics behind this enemy's special ability, if it has one.
    pub fn special(&self) -> Option<SpecialAbility> {
        self.special_ability
            .as_ref()
            .map(|_| special_ability_for(&self.id))
    }

    /// DC of the saving throw against this enemy's special ability.
    pub fn save_dc(&self) -> i32 {
        10 + self.attack_bonus.div_euclid(2)
    }
}

// ============================================================================
// Special abilities
// ============================================================================

/// What a special ability does, keyed by enemy id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAbility {
    pub damage: DicePool,
    /// HP the enemy restores to itself (clamped to its max).
    pub self_heal: i32,
    /// Ability the player saves with; success halves the damage.
    pub save: Ability,
}

impl SpecialAbility {
    fn new(damage: DicePool) -> Self {
        Self {
            damage,
            self_heal: 0,
            save: Ability::Wisdom,
        }
    }

    fn with_self_heal(mut self, amount: i32) -> Self {
        self.self_heal = amount;
        self
    }
}

/// Special-ability mechanics for an enemy id. Unknown ids get 2d6.
pub fn special_ability_for(enemy_id: &str) -> SpecialAbility {
    match enemy_id {
        "goblin_shaman" | "giant_spider" => SpecialAbility::new(DicePool::new(2, 4, 0)),
        "dark_mage" => SpecialAbility::new(DicePool::new(3, 6, 0)),
        "necromancer" => SpecialAbility::new(DicePool::new(2, 6, 0)).with_self_heal(10),
        "dragon" => SpecialAbility::new(DicePool::new(4, 6, 0)),
        _ => SpecialAbility::new(DicePool::new(2, 6, 0)),
    }
}

// ============================================================================
// Catalog
// ============================================================================

lazy_static::lazy_static! {
    pub static ref ENEMIES: Vec<Enemy> = vec![
        Enemy::new("goblin", "Goblin", 12, 12)
            .with_description("A wiry green creature with a notched blade.")
            .with_attack(3, 4)
            .with_rewards(25, 5),
        Enemy::new("goblin_shaman", "Goblin Shaman", 15, 11)
            .with_description("Bones and feathers rattle on its staff.")
            .with_attack(4, 6)
            .with_rewards(50, 10)
            .with_special("The shaman hurls a bolt of crackling green fire!"),
        Enemy::new("skeleton", "Skeleton", 18, 13)
            .with_description("Old bones held together by older magic.")
            .with_attack(4, 6)
            .with_rewards(50, 8),
        Enemy::new("giant_spider", "Giant Spider", 22, 12)
            .with_description("Eight eyes glint in the dark.")
            .with_attack(5, 7)
            .with_rewards(75, 0)
            .with_special("The spider spits a gout of burning venom!"),
        Enemy::new("orc", "Orc Berserker", 30, 13)
            .with_description("Scarred, snarling and very large.")
            .with_attack(5, 9)
            .with_rewards(100, 15)
            .with_loot("health_potion"),
        Enemy::new("dark_mage", "Dark Mage", 35, 14)
            .with_description("A robed figure wreathed in shadow.")
            .with_attack(6, 10)
            .with_rewards(150, 25)
            .with_loot("scroll_fireball")
            .with_special("The mage unleashes a wave of shadow!"),
        Enemy::new("necromancer", "Necromancer", 55, 15)
            .with_description("Master of the crypt, pale as the dead it commands.")
            .with_attack(7, 12)
            .with_rewards(300, 100)
            .with_loot("fire_sword")
            .with_loot("greater_health_potion")
            .with_special("The necromancer drains your life force to mend itself!"),
        Enemy::new("dragon", "Dragon", 80, 17)
            .with_description("Scales like shields, breath like a furnace.")
            .with_attack(9, 15)
            .with_rewards(500, 500)
            .with_loot("fire_sword")
            .with_loot("ring_strength")
            .with_loot("greater_health_potion")
            .with_special("The dragon breathes a torrent of fire!"),
    ];
}

/// Look up an enemy template by id.
pub fn get_enemy(id: &str) -> Option<Enemy> {
    ENEMIES.iter().find(|e| e.id == id).cloned()
}
