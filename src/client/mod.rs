//! Things that sit across the table from the engine: who picks the actions
//! and who watches what happens.

mod auto_pilot;
mod game_state_listener;

pub use auto_pilot::AutoPilot;
pub use game_state_listener::GameStateListener;

use color_eyre::Result;
use log::{info, warn};

use crate::engine::prelude::*;

/// Guards against a controller that never passes.
const MAX_ACTIONS_PER_TURN: usize = 64;

/// A `PlayerActionRequest` list holds every action worth offering the
/// player right now. The first element is always the no-op
/// `PlayerActionRequest::PassPriority`.
pub type PlayerOptions = Vec<PlayerActionRequest>;

pub trait PlayerController {
    fn choose_options(&mut self, snapshot: &GameStateSnapshot, options: &PlayerOptions) -> PlayerActionRequest;
}

/// Actions `player` could take that pass validation as things stand.
pub fn legal_actions(game: &Game, player: PlayerID) -> PlayerOptions {
    let mut candidates = vec![PlayerActionRequest::PlaceResource];
    let Ok(me) = game.player(player) else {
        return vec![PlayerActionRequest::PassPriority];
    };
    let link_units: Vec<CardInstanceID> = game.link_units(player).iter().map(|card| card.id).collect();
    let enemies: Vec<CardInstanceID> = game
        .opponents_of(player)
        .into_iter()
        .filter_map(|opponent| game.player(opponent).ok())
        .flat_map(|opponent| opponent.zone(Zone::BattleArea).iter().map(|card| card.id))
        .collect();

    for card in me.zone(Zone::Hand) {
        candidates.push(PlayerActionRequest::PlayCard { card: card.id, target: enemies.first().copied() });
        candidates.push(PlayerActionRequest::PlayCard { card: card.id, target: None });
        for unit in &link_units {
            candidates.push(PlayerActionRequest::PlayCard { card: card.id, target: Some(*unit) });
        }
    }
    if let Some(defender) = game.opponent_of(player) {
        for unit in me.zone(Zone::BattleArea) {
            candidates.push(PlayerActionRequest::DeclareAttack { attacker: unit.id, defender });
        }
    }
    if !game.current_attacks.is_empty() {
        candidates.push(PlayerActionRequest::ResolveCombat);
    }

    let mut options = vec![PlayerActionRequest::PassPriority];
    options.extend(
        candidates
            .into_iter()
            .filter(|request| game.validate_action(player, request).is_ok()),
    );
    options.dedup();
    options
}

/// Plays the game out with one controller per seat, up to `max_turns`.
/// Returns the outcome, `None` when the turn limit came first.
pub fn run_match(
    game: &mut Game,
    controllers: &mut [Box<dyn PlayerController>],
    listener: &mut GameStateListener,
    max_turns: u32,
) -> Result<Option<GameOutcome>> {
    let mut actions_this_turn = 0;
    let mut turn = game.turn_number;

    while !game.is_game_over() && game.turn_number <= max_turns {
        if game.turn_number != turn {
            turn = game.turn_number;
            actions_this_turn = 0;
        }

        let player = game.active_player;
        let seat = game.players.iter().position(|p| p.id == player).unwrap_or(0);
        let snapshot = game.snapshot_for(player)?;
        let options = legal_actions(game, player);

        let choice = match controllers.get_mut(seat) {
            Some(controller) if actions_this_turn < MAX_ACTIONS_PER_TURN => {
                controller.choose_options(&snapshot, &options)
            }
            _ => PlayerActionRequest::PassPriority,
        };
        actions_this_turn += 1;

        let outcome = game.perform(player, choice.clone());
        if !outcome.success {
            warn!("client: {:?} tried {:?}: {}", player, choice, outcome.message);
            game.execute_action(player, PlayerActionRequest::PassPriority)?;
        }
        listener.update()?;
    }

    info!("client: match stopped on turn {} after {} events", game.turn_number, listener.events_seen());
    Ok(game.outcome())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::impls::cards::{starter_database, starter_deck};

    fn starter_game() -> Game {
        let config = EngineConfig::default().with_phase_advance_delay(Duration::ZERO);
        Game::new(config, Arc::new(starter_database()), vec![starter_deck(), starter_deck()]).with_rng_seed(11)
    }

    #[test]
    fn pass_is_always_first() {
        let mut game = starter_game();
        game.start_game().unwrap();
        let p1 = PlayerID::from_raw(1);
        // not p1's turn, so passing is all there is
        assert_eq!(legal_actions(&game, p1), vec![PlayerActionRequest::PassPriority]);
        let p0 = PlayerID::from_raw(0);
        assert_eq!(legal_actions(&game, p0)[0], PlayerActionRequest::PassPriority);
    }

    #[test]
    fn auto_pilots_finish_a_game() {
        let mut game = starter_game();
        let mut listener = GameStateListener::from(game.subscribe());
        game.start_game().unwrap();
        let mut controllers: Vec<Box<dyn PlayerController>> =
            vec![Box::new(AutoPilot::default()), Box::new(AutoPilot::default())];

        let outcome = run_match(&mut game, &mut controllers, &mut listener, 200).unwrap();
        assert!(outcome.is_some());
        assert!(listener.events_seen() > 0);
    }
}
