//! Dice rolling for the rules engine.
//!
//! Every random draw goes through the [`Roller`] trait, so combat and story
//! resolution can be replayed from a seed or from a scripted sequence of die
//! faces. On top of the raw roller sit the roll helpers used by the rules:
//! d20 checks with a modifier, damage rolls floored at 1, and [`DicePool`]
//! expressions in `XdY+Z` notation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
    #[error("Too many dice: {0}")]
    TooManyDice(u32),
}

/// Largest dice count a pool may roll.
pub const MAX_DICE: u32 = 100;
/// Largest die a pool may use.
pub const MAX_SIDES: u32 = 1000;

/// Standard die types offered by the dice tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieType {
    pub fn sides(&self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
            DieType::D100 => 100,
        }
    }

    pub fn all() -> &'static [DieType] {
        &[
            DieType::D4,
            DieType::D6,
            DieType::D8,
            DieType::D10,
            DieType::D12,
            DieType::D20,
            DieType::D100,
        ]
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

// ============================================================================
// Randomness
// ============================================================================

/// Source of die faces.
pub trait Roller {
    /// Roll a single die, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Roll `count` dice of the same size.
    fn roll_multiple(&mut self, count: u32, sides: u32) -> Vec<u32> {
        (0..count).map(|_| self.roll_die(sides)).collect()
    }
}

impl<R: Roller + ?Sized> Roller for &mut R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

impl<R: Roller + ?Sized> Roller for Box<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

/// A [`Roller`] backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomRoller<R = StdRng> {
    rng: R,
}

impl RandomRoller<StdRng> {
    /// Seed from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic roller; the same seed replays the same rolls.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomRoller<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Roller for RandomRoller<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        // A zero-sided die still yields a face.
        self.rng.gen_range(1..=sides.max(1))
    }
}

// ============================================================================
// Roll results
// ============================================================================

/// Result of rolling one die and adding a modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub natural_roll: u32,
    pub sides: u32,
    pub modifier: i32,
    pub total: i32,
}

impl RollResult {
    pub fn new(natural_roll: u32, sides: u32, modifier: i32) -> Self {
        Self {
            natural_roll,
            sides,
            modifier,
            total: natural_roll as i32 + modifier,
        }
    }

    /// Natural 20 on a d20. Other die sizes never crit.
    pub fn is_critical(&self) -> bool {
        self.sides == 20 && self.natural_roll == 20
    }

    /// Natural 1 on a d20.
    pub fn is_critical_fail(&self) -> bool {
        self.sides == 20 && self.natural_roll == 1
    }

    /// Check if the roll meets or exceeds a DC.
    pub fn meets_or_beats(&self, dc: i32) -> bool {
        self.total >= dc
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            0 => write!(f, "{}", self.natural_roll),
            m if m > 0 => write!(f, "{} +{} = {}", self.natural_roll, m, self.total),
            m => write!(f, "{} {} = {}", self.natural_roll, m, self.total),
        }
    }
}

/// Roll a die of any size and add a modifier.
pub fn roll_with_modifier<R: Roller + ?Sized>(rng: &mut R, sides: u32, modifier: i32) -> RollResult {
    let natural = rng.roll_die(sides);
    RollResult::new(natural, sides, modifier)
}

/// Roll a d20 and add a modifier (attacks, checks, saves).
pub fn roll_d20<R: Roller + ?Sized>(rng: &mut R, modifier: i32) -> RollResult {
    roll_with_modifier(rng, 20, modifier)
}

/// Roll one damage die plus a modifier. Damage is never below 1.
pub fn roll_damage<R: Roller + ?Sized>(rng: &mut R, die: u32, modifier: i32) -> i32 {
    (rng.roll_die(die) as i32 + modifier).max(1)
}

/// Sum `count` dice plus a modifier, floored at 1.
pub fn roll_multiple_damage<R: Roller + ?Sized>(
    rng: &mut R,
    count: u32,
    sides: u32,
    modifier: i32,
) -> i32 {
    let sum: i64 = rng
        .roll_multiple(count, sides)
        .iter()
        .map(|&r| i64::from(r))
        .sum();
    clamp_total(sum + i64::from(modifier))
}

fn clamp_total(total: i64) -> i32 {
    total.clamp(1, i64::from(i32::MAX)) as i32
}

// ============================================================================
// Dice pools
// ============================================================================

/// A fixed dice formula such as `3d6` or `2d4+2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DicePool {
    pub count: u32,
    pub sides: u32,
    pub bonus: i32,
}

impl DicePool {
    pub const fn new(count: u32, sides: u32, bonus: i32) -> Self {
        Self {
            count,
            sides,
            bonus,
        }
    }

    /// Roll the pool. Like all damage and healing, the result is at least 1.
    pub fn roll<R: Roller + ?Sized>(&self, rng: &mut R) -> i32 {
        roll_multiple_damage(rng, self.count, self.sides, self.bonus)
    }

    pub fn min_total(&self) -> i32 {
        clamp_total(i64::from(self.count) + i64::from(self.bonus))
    }

    pub fn max_total(&self) -> i32 {
        let dice = i64::from(self.count).saturating_mul(i64::from(self.sides));
        clamp_total(dice.saturating_add(i64::from(self.bonus)))
    }

    /// Parse `XdY`, `XdY+Z`, `XdY-Z` or `dY`.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation: String = notation
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if notation.is_empty() {
            return Err(DiceError::NoDice);
        }

        let d_pos = notation
            .find('d')
            .ok_or_else(|| DiceError::InvalidNotation(notation.clone()))?;
        let count_str = &notation[..d_pos];
        let rest = &notation[d_pos + 1..];

        let count: u32 = if count_str.is_empty() {
            1
        } else {
            count_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(notation.clone()))?
        };
        if count == 0 {
            return Err(DiceError::NoDice);
        }
        if count > MAX_DICE {
            return Err(DiceError::TooManyDice(count));
        }

        let (sides_str, bonus) = match rest.find(['+', '-']) {
            Some(pos) => {
                let sign = if rest[pos..].starts_with('-') { -1 } else { 1 };
                let value: i32 = rest[pos + 1..]
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(notation.clone()))?;
                (&rest[..pos], sign * value)
            }
            None => (rest, 0),
        };

        let sides: u32 = sides_str
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.clone()))?;
        if sides == 0 || sides > MAX_SIDES {
            return Err(DiceError::InvalidDieSize(sides));
        }

        Ok(Self::new(count, sides, bonus))
    }
}

impl FromStr for DicePool {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DicePool::parse(s)
    }
}

impl fmt::Display for DicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.bonus {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{b}"),
            b => write!(f, "{b}"),
        }
    }
}

// ============================================================================
// Dice tray
// ============================================================================

/// The free-standing dice roller: pick a die and a modifier, keep a short
/// history of results (most recent first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiceTray {
    pub selected: DieType,
    pub modifier: i32,
    history: Vec<RollResult>,
    capacity: usize,
}

impl DiceTray {
    pub fn new(capacity: usize) -> Self {
        Self {
            selected: DieType::D20,
            modifier: 0,
            history: Vec::new(),
            capacity,
        }
    }

    pub fn select(&mut self, die: DieType) {
        self.selected = die;
    }

    pub fn set_modifier(&mut self, modifier: i32) {
        self.modifier = modifier;
    }

    pub fn roll<R: Roller + ?Sized>(&mut self, rng: &mut R) -> RollResult {
        let result = roll_with_modifier(rng, self.selected.sides(), self.modifier);
        self.history.insert(0, result);
        self.history.truncate(self.capacity);
        result
    }

    pub fn last_roll(&self) -> Option<&RollResult> {
        self.history.first()
    }

    pub fn history(&self) -> &[RollResult] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Default for DiceTray {
    fn default() -> Self {
        Self::new(20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRoller;

    #[test]
    fn test_roll_range() {
        let mut rng = RandomRoller::seeded(7);
        for _ in 0..200 {
            let result = roll_d20(&mut rng, 0);
            assert!(result.total >= 1 && result.total <= 20);
        }
    }

    #[test]
    fn test_roll_multiple_count() {
        let mut rng = RandomRoller::seeded(11);
        let rolls = rng.roll_multiple(5, 6);
        assert_eq!(rolls.len(), 5);
        assert!(rolls.iter().all(|r| (1..=6).contains(r)));
    }

    #[test]
    fn test_seeded_rolls_replay() {
        let mut a = RandomRoller::seeded(42);
        let mut b = RandomRoller::seeded(42);
        let first: Vec<u32> = (0..20).map(|_| a.roll_die(20)).collect();
        let second: Vec<u32> = (0..20).map(|_| b.roll_die(20)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_critical_only_on_d20() {
        assert!(RollResult::new(20, 20, 3).is_critical());
        assert!(RollResult::new(1, 20, 3).is_critical_fail());
        // A 20 on a d100 is just a 20
        assert!(!RollResult::new(20, 100, 0).is_critical());
        assert!(!RollResult::new(1, 6, 0).is_critical_fail());
    }

    #[test]
    fn test_meets_or_beats() {
        let roll = RollResult::new(10, 20, 2);
        assert_eq!(roll.total, 12);
        assert!(roll.meets_or_beats(12));
        assert!(!roll.meets_or_beats(13));
    }

    #[test]
    fn test_damage_never_below_one() {
        let mut rng = RandomRoller::seeded(3);
        for _ in 0..200 {
            assert!(roll_damage(&mut rng, 4, -10) >= 1);
            assert!(roll_multiple_damage(&mut rng, 2, 4, -20) >= 1);
        }
    }

    #[test]
    fn test_multi_die_damage_sums() {
        let mut dice = ScriptedRoller::new([3, 5, 6]);
        assert_eq!(roll_multiple_damage(&mut dice, 3, 6, 2), 16);
    }

    #[test]
    fn test_parse_pool() {
        assert_eq!(DicePool::parse("2d4+2").unwrap(), DicePool::new(2, 4, 2));
        assert_eq!(DicePool::parse("3d6").unwrap(), DicePool::new(3, 6, 0));
        assert_eq!(DicePool::parse("d8-1").unwrap(), DicePool::new(1, 8, -1));
        assert_eq!(" 4D4 + 4 ".parse::<DicePool>().unwrap(), DicePool::new(4, 4, 4));
    }

    #[test]
    fn test_parse_pool_errors() {
        assert_eq!(DicePool::parse(""), Err(DiceError::NoDice));
        assert_eq!(DicePool::parse("0d6"), Err(DiceError::NoDice));
        assert_eq!(DicePool::parse("2d0"), Err(DiceError::InvalidDieSize(0)));
        assert!(matches!(
            DicePool::parse("fireball"),
            Err(DiceError::InvalidNotation(_))
        ));
        assert!(matches!(
            DicePool::parse("2d6+x"),
            Err(DiceError::InvalidNotation(_))
        ));
        assert_eq!(DicePool::parse("70000d70000"), Err(DiceError::TooManyDice(70000)));
        assert_eq!(
            DicePool::parse("4294967295d6"),
            Err(DiceError::TooManyDice(u32::MAX))
        );
        assert_eq!(DicePool::parse("2d10000"), Err(DiceError::InvalidDieSize(10000)));
    }

    #[test]
    fn test_largest_pool_stays_in_range() {
        let pool = DicePool::parse("100d1000+5").unwrap();
        assert_eq!(pool.max_total(), 100_005);
        assert_eq!(pool.min_total(), 105);
        let total = pool.roll(&mut RandomRoller::seeded(1));
        assert!((pool.min_total()..=pool.max_total()).contains(&total));
    }

    #[test]
    fn test_extreme_pool_totals_saturate() {
        // Built directly, past the parser's limits
        let pool = DicePool::new(u32::MAX, u32::MAX, i32::MAX);
        assert_eq!(pool.max_total(), i32::MAX);
        assert_eq!(DicePool::new(1, 6, i32::MIN).min_total(), 1);
    }

    #[test]
    fn test_pool_display() {
        assert_eq!(DicePool::new(2, 4, 2).to_string(), "2d4+2");
        assert_eq!(DicePool::new(3, 6, 0).to_string(), "3d6");
        assert_eq!(DicePool::new(1, 8, -1).to_string(), "1d8-1");
    }

    #[test]
    fn test_roll_display() {
        assert_eq!(RollResult::new(15, 20, 5).to_string(), "15 +5 = 20");
        assert_eq!(RollResult::new(15, 20, -1).to_string(), "15 -1 = 14");
        assert_eq!(RollResult::new(15, 20, 0).to_string(), "15");
    }

    #[test]
    fn test_tray_history_is_bounded() {
        let mut tray = DiceTray::new(3);
        tray.select(DieType::D6);
        tray.set_modifier(1);
        let mut dice = ScriptedRoller::new([1, 2, 3, 4]);
        for _ in 0..4 {
            tray.roll(&mut dice);
        }
        let totals: Vec<i32> = tray.history().iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![5, 4, 3]);
        assert_eq!(tray.last_roll().map(|r| r.natural_roll), Some(4));

        tray.clear_history();
        assert!(tray.history().is_empty());
    }
}
