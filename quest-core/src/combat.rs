//! Turn-based combat against a single enemy.
//!
//! The pipeline mirrors the rest of the engine:
//! 1. The caller picks a [`CombatAction`] for the player
//! 2. [`CombatEngine`] resolves it against the current [`CombatState`]
//! 3. A new state and character come back in a [`CombatRound`]
//!
//! The engine never chains the enemy's reply onto a player action. When the
//! returned state says it is the enemy's turn, the caller invokes
//! [`CombatEngine::enemy_turn`] as a separate step.

use crate::character::{Ability, Character};
use crate::dice::{self, Roller};
use crate::enemies::{Enemy, SpecialAbility};
use crate::items::{self, Item, ItemType};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// DC of a flee attempt.
pub const FLEE_DC: i32 = 12;

/// AC bonus while defending.
pub const DEFEND_BONUS: i32 = 2;

/// A fight in progress (or just finished).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    pub enemy: Enemy,
    pub enemy_current_hp: i32,
    pub is_player_turn: bool,
    /// Narration, append-only.
    pub log: Vec<String>,
    pub round: u32,
    pub is_over: bool,
    pub player_won: bool,
    /// Grants +2 AC against the next enemy attack only.
    pub player_defending: bool,
    pub special_used: bool,
    #[serde(default)]
    pub fled: bool,
}

/// How a fight stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    Ongoing,
    Victory,
    Defeat,
    Fled,
}

impl CombatState {
    pub fn new(enemy: Enemy) -> Self {
        let log = vec![
            format!("Combat begins: {}!", enemy.name),
            enemy.description.clone(),
        ];
        Self {
            enemy_current_hp: enemy.max_hp,
            enemy,
            is_player_turn: true,
            log,
            round: 1,
            is_over: false,
            player_won: false,
            player_defending: false,
            special_used: false,
            fled: false,
        }
    }

    pub fn outcome(&self) -> CombatOutcome {
        if !self.is_over {
            CombatOutcome::Ongoing
        } else if self.player_won {
            CombatOutcome::Victory
        } else if self.fled {
            CombatOutcome::Fled
        } else {
            CombatOutcome::Defeat
        }
    }

    pub fn can_player_act(&self) -> bool {
        self.is_player_turn && !self.is_over
    }

    pub fn is_enemy_turn(&self) -> bool {
        !self.is_player_turn && !self.is_over
    }

    /// Whether the enemy's special ability fires on its next turn.
    pub fn special_ready(&self) -> bool {
        !self.special_used
            && self.enemy.has_special()
            && (self.round >= 2 || self.enemy_current_hp < self.enemy.max_hp / 2)
    }

    /// Log lines appended since the log had `since` entries.
    pub fn log_since(&self, since: usize) -> &[String] {
        &self.log[since.min(self.log.len())..]
    }
}

/// A player's choice on their turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatAction {
    Attack,
    Defend,
    UseItem(Item),
    Flee,
}

/// Result of resolving one action: the updated fight and character.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatRound {
    pub combat: CombatState,
    pub character: Character,
}

impl CombatRound {
    fn unchanged(combat: &CombatState, character: &Character) -> Self {
        Self {
            combat: combat.clone(),
            character: character.clone(),
        }
    }
}

/// Resolves combat actions. Stateless; all state lives in [`CombatState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatEngine;

impl CombatEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn start(&self, enemy: Enemy) -> CombatState {
        info!(enemy = %enemy.id, hp = enemy.max_hp, "combat started");
        CombatState::new(enemy)
    }

    /// Resolve a player action.
    pub fn resolve<R: Roller + ?Sized>(
        &self,
        combat: &CombatState,
        character: &Character,
        action: CombatAction,
        rng: &mut R,
    ) -> CombatRound {
        match action {
            CombatAction::Attack => self.player_attack(combat, character, rng),
            CombatAction::Defend => self.player_defend(combat, character),
            CombatAction::UseItem(item) => self.player_use_item(combat, character, &item, rng),
            CombatAction::Flee => self.player_flee(combat, character, rng),
        }
    }

    // ========================================================================
    // Player actions
    // ========================================================================

    pub fn player_attack<R: Roller + ?Sized>(
        &self,
        combat: &CombatState,
        character: &Character,
        rng: &mut R,
    ) -> CombatRound {
        if !combat.can_player_act() {
            return CombatRound::unchanged(combat, character);
        }

        let mut combat = combat.clone();
        let mut character = character.clone();
        let enemy_ac = combat.enemy.armor_class;
        let roll = dice::roll_d20(rng, character.attack_bonus());

        combat.log.push(format!("--- Round {}: Your attack ---", combat.round));
        combat
            .log
            .push(format!("Attack roll: {roll} vs AC {enemy_ac}"));

        if roll.is_critical_fail() {
            combat
                .log
                .push("Critical fail! You stumble and miss completely.".to_string());
        } else if roll.is_critical() {
            let damage =
                dice::roll_damage(rng, character.weapon_damage(), character.damage_bonus()) * 2;
            combat.enemy_current_hp = (combat.enemy_current_hp - damage).max(0);
            combat
                .log
                .push(format!("CRITICAL HIT! You deal {damage} damage (doubled)!"));
        } else if roll.meets_or_beats(enemy_ac) {
            let damage =
                dice::roll_damage(rng, character.weapon_damage(), character.damage_bonus());
            combat.enemy_current_hp = (combat.enemy_current_hp - damage).max(0);
            combat.log.push(format!("Hit! You deal {damage} damage."));
        } else {
            combat.log.push("Miss! Your attack goes wide.".to_string());
        }

        debug!(
            roll = roll.total,
            natural = roll.natural_roll,
            enemy_hp = combat.enemy_current_hp,
            "player attack"
        );

        combat.log.push(format!(
            "{}: {}/{} HP",
            combat.enemy.name, combat.enemy_current_hp, combat.enemy.max_hp
        ));

        let won = combat.enemy_current_hp <= 0;
        if won {
            award_victory(&mut combat, &mut character);
        }
        combat.is_over = won;
        combat.player_won = won;
        combat.is_player_turn = won;
        combat.player_defending = false;

        CombatRound { combat, character }
    }

    pub fn player_defend(&self, combat: &CombatState, character: &Character) -> CombatRound {
        if !combat.can_player_act() {
            return CombatRound::unchanged(combat, character);
        }

        let mut combat = combat.clone();
        combat.log.push(format!("--- Round {}: Defend ---", combat.round));
        combat
            .log
            .push(format!("You raise your guard. (+{DEFEND_BONUS} AC this round)"));
        combat.player_defending = true;
        combat.is_player_turn = false;
        debug!(round = combat.round, "player defends");

        CombatRound {
            combat,
            character: character.clone(),
        }
    }

    /// Drink a potion or read a scroll. Anything else is refused without
    /// spending the turn.
    pub fn player_use_item<R: Roller + ?Sized>(
        &self,
        combat: &CombatState,
        character: &Character,
        item: &Item,
        rng: &mut R,
    ) -> CombatRound {
        if !combat.can_player_act() {
            return CombatRound::unchanged(combat, character);
        }

        let mut combat = combat.clone();
        let mut character = character.clone();
        combat.log.push(format!("--- Round {}: Item ---", combat.round));

        let usable = matches!(item.item_type, ItemType::Potion | ItemType::Scroll);
        if !usable {
            combat
                .log
                .push(format!("You can't use {} in combat.", item.name));
            return CombatRound { combat, character };
        }
        if !character.has_item(&item.id) {
            combat
                .log
                .push(format!("You don't have {} with you.", item.name));
            return CombatRound { combat, character };
        }

        match item.item_type {
            ItemType::Scroll => {
                let damage = items::SCROLL_DAMAGE_DICE.roll(rng);
                combat.enemy_current_hp = (combat.enemy_current_hp - damage).max(0);
                character.remove_item(&item.id);
                combat
                    .log
                    .push(format!("You read {}! {damage} damage!", item.name));
                debug!(damage, enemy_hp = combat.enemy_current_hp, "scroll used");

                let won = combat.enemy_current_hp <= 0;
                if won {
                    award_victory(&mut combat, &mut character);
                }
                combat.is_over = won;
                combat.player_won = won;
                combat.is_player_turn = won;
                // The defending flag is left as it was.
            }
            _ => {
                let healed = item.heal_dice().roll(rng);
                let before = character.current_hp;
                character.heal(healed);
                character.remove_item(&item.id);
                combat
                    .log
                    .push(format!("You drink {} and heal {healed} HP!", item.name));
                combat.log.push(format!(
                    "HP: {before} -> {}/{}",
                    character.current_hp, character.max_hp
                ));
                debug!(healed, hp = character.current_hp, "potion used");

                combat.is_player_turn = false;
                combat.player_defending = false;
            }
        }

        CombatRound { combat, character }
    }

    pub fn player_flee<R: Roller + ?Sized>(
        &self,
        combat: &CombatState,
        character: &Character,
        rng: &mut R,
    ) -> CombatRound {
        if !combat.can_player_act() {
            return CombatRound::unchanged(combat, character);
        }

        let mut combat = combat.clone();
        let roll = dice::roll_d20(rng, character.stats.modifier(Ability::Dexterity));
        combat.log.push("--- Flee attempt ---".to_string());
        combat
            .log
            .push(format!("Dexterity check: {roll} vs DC {FLEE_DC}"));

        if roll.meets_or_beats(FLEE_DC) {
            combat.log.push("You escape the fight!".to_string());
            combat.is_over = true;
            combat.player_won = false;
            combat.fled = true;
            info!(enemy = %combat.enemy.id, "player fled");
        } else {
            combat
                .log
                .push("Escape failed! The enemy blocks your way.".to_string());
            combat.is_player_turn = false;
            combat.player_defending = false;
            debug!(roll = roll.total, "flee failed");
        }

        CombatRound {
            combat,
            character: character.clone(),
        }
    }

    // ========================================================================
    // Enemy turn
    // ========================================================================

    /// The enemy acts: its special ability if ready, otherwise an attack.
    pub fn enemy_turn<R: Roller + ?Sized>(
        &self,
        combat: &CombatState,
        character: &Character,
        rng: &mut R,
    ) -> CombatRound {
        if !combat.is_enemy_turn() {
            return CombatRound::unchanged(combat, character);
        }

        let mut combat = combat.clone();
        let mut character = character.clone();
        combat.log.push(String::new());
        combat
            .log
            .push(format!("--- {} attacks! ---", combat.enemy.name));

        match combat.special_ready().then(|| combat.enemy.special()).flatten() {
            Some(special) => self.enemy_special(&mut combat, &mut character, special, rng),
            None => self.enemy_attack(&mut combat, &mut character, rng),
        }

        combat.log.push(format!(
            "Your HP: {}/{}",
            character.current_hp, character.max_hp
        ));

        let defeated = character.current_hp <= 0;
        if defeated {
            combat.log.push(String::new());
            combat.log.push("You have been defeated...".to_string());
            info!(enemy = %combat.enemy.id, "player defeated");
        }
        combat.is_over = defeated;
        combat.player_won = false;
        combat.is_player_turn = !defeated;
        combat.round += 1;
        combat.player_defending = false;

        CombatRound { combat, character }
    }

    fn enemy_special<R: Roller + ?Sized>(
        &self,
        combat: &mut CombatState,
        character: &mut Character,
        special: SpecialAbility,
        rng: &mut R,
    ) {
        let enemy = &combat.enemy;
        combat
            .log
            .push(format!("{} uses a special ability!", enemy.name));
        if let Some(narration) = &enemy.special_ability {
            combat.log.push(narration.clone());
        }

        let damage = special.damage.roll(rng);
        let dc = enemy.save_dc();
        let save = dice::roll_d20(rng, character.stats.modifier(special.save));

        let taken = if save.meets_or_beats(dc) {
            let half = damage / 2;
            combat
                .log
                .push(format!("Saving throw: {save} vs DC {dc}, success! Half damage: {half}"));
            half
        } else {
            combat
                .log
                .push(format!("Saving throw: {save} vs DC {dc}, failed! Full damage: {damage}"));
            damage
        };
        character.take_damage(taken);

        if special.self_heal > 0 {
            combat.enemy_current_hp = (combat.enemy_current_hp + special.self_heal).min(combat.enemy.max_hp);
            combat.log.push(format!(
                "{} heals {} HP!",
                combat.enemy.name, special.self_heal
            ));
        }
        combat.special_used = true;

        debug!(
            enemy = %combat.enemy.id,
            damage,
            taken,
            save = save.total,
            "enemy special ability"
        );
    }

    fn enemy_attack<R: Roller + ?Sized>(
        &self,
        combat: &mut CombatState,
        character: &mut Character,
        rng: &mut R,
    ) {
        let defense = if combat.player_defending { DEFEND_BONUS } else { 0 };
        let effective_ac = character.armor_class() + defense;
        let roll = dice::roll_d20(rng, combat.enemy.attack_bonus);
        let name = combat.enemy.name.clone();

        combat
            .log
            .push(format!("Attack roll: {roll} vs your AC {effective_ac}"));

        if roll.is_critical_fail() {
            combat.log.push(format!("Critical fail! {name} stumbles."));
        } else if roll.is_critical() {
            let damage = dice::roll_damage(rng, combat.enemy.damage, 0) * 2;
            character.take_damage(damage);
            combat
                .log
                .push(format!("CRITICAL HIT! {name} deals {damage} damage!"));
        } else if roll.meets_or_beats(effective_ac) {
            let damage = dice::roll_damage(rng, combat.enemy.damage, 0);
            character.take_damage(damage);
            combat.log.push(format!("Hit! {name} deals {damage} damage."));
        } else {
            combat.log.push(format!("{name} misses!"));
        }

        debug!(
            roll = roll.total,
            natural = roll.natural_roll,
            effective_ac,
            hp = character.current_hp,
            "enemy attack"
        );
    }
}

/// Hand over the enemy's XP, gold and loot. Level-ups wait for the end of
/// the encounter.
fn award_victory(combat: &mut CombatState, character: &mut Character) {
    let enemy = &combat.enemy;
    character.experience += enemy.xp_reward;
    character.gold += enemy.gold_reward;

    let mut looted = Vec::new();
    for id in &enemy.loot {
        match items::get_item(id) {
            Some(item) => {
                looted.push(item.name.clone());
                character.add_item(item);
            }
            None => warn!(item = %id, enemy = %enemy.id, "loot refers to unknown item"),
        }
    }

    combat.log.push(String::new());
    combat.log.push(format!("{} is defeated!", enemy.name));
    combat.log.push(format!(
        "You gain {} XP and {} gold!",
        enemy.xp_reward, enemy.gold_reward
    ));
    if !looted.is_empty() {
        combat.log.push(format!("Loot: {}", looted.join(", ")));
    }
    info!(
        enemy = %enemy.id,
        xp = enemy.xp_reward,
        gold = enemy.gold_reward,
        "enemy defeated"
    );
}
