//! Play the built-in adventure with a simple strategy and print the transcript.
//!
//! Run with: `cargo run -p quest-core --example play_through -- [seed]`
//! Set `RUST_LOG=quest_core=debug` to see every roll.

use quest_core::character::{CharacterClass, Race};
use quest_core::combat::CombatOutcome;
use quest_core::headless::{HeadlessConfig, HeadlessGame};

const MAX_TURNS: usize = 500;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 42,
    };

    let config =
        HeadlessConfig::custom("Kira Stonefist", Race::Dwarf, CharacterClass::Warrior).with_seed(seed);
    let mut game = HeadlessGame::new(config)?;

    if let Some(node) = game.current_node() {
        println!("# {}\n\n{}\n", node.title, node.text);
    }

    for _ in 0..MAX_TURNS {
        match game.combat_outcome() {
            Some(CombatOutcome::Ongoing) => {
                let low = game.current_hp() * 3 < game.max_hp();
                if low && game.state().character.has_item("health_potion") {
                    game.use_item("health_potion");
                } else {
                    game.attack();
                }
            }
            Some(_) => {
                game.end_combat();
            }
            None if game.is_game_over() => break,
            None => {
                let Some(index) = game.choices().iter().position(|(_, ok)| *ok) else {
                    break;
                };
                game.choose(index)?;
            }
        }
        if let Some(entry) = game.transcript().last() {
            println!("> {}\n\n{}\n", entry.action, entry.narration);
        }
    }

    let character = &game.state().character;
    println!("---");
    println!(
        "{} the {} {}: level {}, {}/{} HP, {} gold, {} nodes visited",
        character.name,
        character.race,
        character.class,
        character.level,
        character.current_hp,
        character.max_hp,
        character.gold,
        game.state().visited_nodes.len()
    );
    Ok(())
}
