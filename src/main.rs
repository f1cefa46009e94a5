use std::sync::Arc;
use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use log::{info, LevelFilter};

use gundam_tcg::client::{run_match, AutoPilot, GameStateListener, PlayerController};
use gundam_tcg::engine::prelude::*;
use gundam_tcg::impls::cards::{starter_database, starter_deck};

const MAX_TURNS: u32 = 100;

fn main() -> Result<()> {
    simple_logging::log_to_file("gundam_tcg.log", LevelFilter::Info)?;
    color_eyre::install()?;

    let database = Arc::new(starter_database());
    info!("{}", database.stats());

    let config = EngineConfig::default().with_phase_advance_delay(Duration::ZERO);
    let deck = starter_deck();
    if let Err(errors) = database.validate_deck(&deck, &config) {
        let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(eyre!("starter deck is not legal: {}", reasons.join("; ")));
    }

    let mut game = Game::new(config, database, vec![deck.clone(), deck]);
    let mut listener = GameStateListener::from(game.subscribe());
    game.start_game()?;

    let mut controllers: Vec<Box<dyn PlayerController>> =
        vec![Box::new(AutoPilot::default()), Box::new(AutoPilot::default())];
    match run_match(&mut game, &mut controllers, &mut listener, MAX_TURNS)? {
        Some(GameOutcome::Winner(player)) => println!("{:?} wins on turn {}", player, game.turn_number),
        Some(outcome) => println!("game over: {:?}", outcome),
        None => println!("no result after {} turns", MAX_TURNS),
    }
    Ok(())
}
