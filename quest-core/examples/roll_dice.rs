//! Roll a few pools and the dice tray.
//!
//! Run with: `cargo run -p quest-core --example roll_dice -- 2d6+3 1d20`

use quest_core::config::GameConfig;
use quest_core::dice::{DicePool, DieType, RandomRoller};

fn main() {
    let mut rng = RandomRoller::from_entropy();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let notations = if args.is_empty() {
        vec!["1d20".to_string(), "2d6+3".to_string(), "3d6".to_string()]
    } else {
        args
    };

    println!("=== Dice pools ===\n");
    for notation in &notations {
        match notation.parse::<DicePool>() {
            Ok(pool) => println!(
                "{pool}: {}  (range {}..={})",
                pool.roll(&mut rng),
                pool.min_total(),
                pool.max_total()
            ),
            Err(e) => println!("{notation}: {e}"),
        }
    }

    println!("\n=== Dice tray ===\n");
    let mut tray = GameConfig::new().with_roll_history(5).dice_tray();
    for die in DieType::all() {
        tray.select(*die);
        tray.set_modifier(2);
        let result = tray.roll(&mut rng);
        let note = if result.is_critical() {
            " CRITICAL!"
        } else if result.is_critical_fail() {
            " fumble"
        } else {
            ""
        };
        println!("{die}: {result}{note}");
    }

    println!("\nLast {} rolls kept:", tray.history().len());
    for result in tray.history() {
        println!("  {result}");
    }
}
