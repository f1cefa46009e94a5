use tokio::sync::broadcast::{error::TryRecvError, Receiver};
use log::{info, warn};
use color_eyre::Result;

use crate::engine::prelude::*;

/// Drains game notifications and keeps the ones worth reporting.
pub struct GameStateListener {
    receiver: Receiver<GameEvent>,
    events_seen: usize,
    outcome: Option<GameOutcome>,
}

impl GameStateListener {
    pub fn from(receiver: Receiver<GameEvent>) -> Self {
        Self {
            receiver,
            events_seen: 0,
            outcome: None,
        }
    }

    pub fn update(&mut self) -> Result<()> {
        // handle everything the game sent since the last call
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    self.events_seen += 1;
                    self.observe(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("client: listener fell behind, {} events skipped", skipped);
                    self.events_seen += skipped as usize;
                }
                Err(e) => {
                    log::error!("client: failed to receive updates from the game: {e}");
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    fn observe(&mut self, event: GameEvent) {
        match event {
            GameEvent::TurnStarted { turn, player } => info!("client: turn {} for {:?}", turn, player),
            GameEvent::PlayerLost(player, rule) => info!("client: {:?} lost ({:?})", player, rule),
            GameEvent::GameEnded(outcome) => {
                info!("client: game ended: {:?}", outcome);
                self.outcome = Some(outcome);
            }
            _ => {}
        }
    }

    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;

    #[test]
    fn picks_up_the_outcome() {
        let mut game = test_game();
        let mut listener = GameStateListener::from(game.subscribe());
        game.start_game().unwrap();
        game.abandon();
        listener.update().unwrap();
        assert!(listener.events_seen() > 0);
        assert_eq!(listener.outcome(), Some(GameOutcome::NoWinner));
    }
}
