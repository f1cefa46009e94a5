use std::sync::Arc;

use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::broadcast::{channel, Receiver, Sender as BroadcastSender};

use super::prelude::*;

use super::util::id::{IDFactory, IDMapper, ID};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The Game object contains all game information
/// and additionally acts as a store for all game
/// objects so that they are easily found and rusts
/// borrow checker doesn't get too mad.
pub struct Game {
    pub config: EngineConfig,
    pub database: Arc<CardDatabase>,
    pub players: Vec<Player>,
    pub mode: GameMode,
    pub turn_number: u32,
    pub active_player: PlayerID,
    pub status: GameStatus,
    pub current_attacks: Vec<AttackDeclaration>,
    pub effect_stack: EffectStack,

    pub(crate) phase_timer: Option<PhaseTimer>,
    pub(crate) rng: StdRng,

    // notify observers of what happened
    event_sender: BroadcastSender<GameEvent>,
}

impl Game {
    /// A one-on-one game, one deck per player in seating order.
    pub fn new(config: EngineConfig, database: Arc<CardDatabase>, decks: Vec<DeckList>) -> Self {
        Self::with_mode(config, database, decks, GameMode::Standard)
    }

    /// A two-on-two game with the standard seating: 0 and 2 against 1 and 3.
    pub fn new_team(config: EngineConfig, database: Arc<CardDatabase>, decks: Vec<DeckList>) -> Self {
        Self::with_mode(config, database, decks, GameMode::Team(TeamLayout::standard()))
    }

    fn with_mode(config: EngineConfig, database: Arc<CardDatabase>, decks: Vec<DeckList>, mode: GameMode) -> Self {
        let player_ids: Vec<PlayerID> = IDFactory::new().take(decks.len()).collect();
        let active_player = player_ids.first().copied().unwrap_or(ID::from_raw(0));
        let (event_sender, _) = channel(EVENT_CHANNEL_CAPACITY);

        let players = decks
            .into_iter()
            .zip(player_ids)
            .map(|(deck, player_id)| {
                let mut player = Player::new(player_id);
                let (main, resources) = deck.instantiate(player_id);
                main.into_iter().for_each(|card| player.cards.put(card, Zone::Deck));
                resources
                    .into_iter()
                    .for_each(|card| player.cards.put(card, Zone::ResourceDeck));
                player
            })
            .collect::<Vec<_>>();

        info!("game: created a {:?} game for {} players", mode, players.len());

        Self {
            config,
            database,
            players,
            mode,
            turn_number: 0,
            active_player,
            status: GameStatus::NotStarted,
            current_attacks: vec![],
            effect_stack: EffectStack::new(),
            phase_timer: None,
            rng: StdRng::from_entropy(),
            event_sender,
        }
    }

    /// Fixes every shuffle of the game.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn subscribe(&self) -> Receiver<GameEvent> {
        self.event_sender.subscribe()
    }

    /// Sending fails only when nobody listens, which is fine.
    pub(crate) fn emit(&self, event: GameEvent) {
        let _ = self.event_sender.send(event);
    }

    pub fn player(&self, id: PlayerID) -> EngineResult<&Player> {
        self.players
            .iter()
            .find(|player| player.id == id)
            .ok_or_else(|| IntegrityError::UnknownPlayer(id).into())
    }

    pub fn player_mut(&mut self, id: PlayerID) -> EngineResult<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or_else(|| IntegrityError::UnknownPlayer(id).into())
    }

    pub fn card(&self, player: PlayerID, id: CardInstanceID) -> EngineResult<&CardInstance> {
        self.player(player)?
            .cards
            .get(id)
            .ok_or_else(|| IntegrityError::UnknownInstance(id).into())
    }

    pub fn card_mut(&mut self, player: PlayerID, id: CardInstanceID) -> EngineResult<&mut CardInstance> {
        self.player_mut(player)?
            .cards
            .get_mut(id)
            .ok_or_else(|| IntegrityError::UnknownInstance(id).into())
    }

    /// The definition behind an instance, wherever it is.
    pub fn definition_of(&self, id: CardInstanceID) -> EngineResult<&CardDefinition> {
        let (_, _, card) = self.find_card(id).ok_or(IntegrityError::UnknownInstance(id))?;
        Ok(self.database.require(&card.card_number)?)
    }

    pub fn player_ids(&self) -> Vec<PlayerID> {
        self.players.iter().map(|player| player.id).collect()
    }

    pub fn current_step(&self) -> Option<TurnStep> {
        match self.status {
            GameStatus::InProgress(step) => Some(step),
            _ => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.status, GameStatus::GameOver(_))
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.status {
            GameStatus::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Flags the player as having lost. Turning that into the end of the
    /// game is left to the turn machine.
    pub fn mark_lost(&mut self, player: PlayerID, rule: GameRule) -> EngineResult<()> {
        let target = self.player_mut(player)?;
        if target.has_lost {
            return Ok(());
        }
        target.has_lost = true;
        warn!("game: {:?} loses ({:?})", player, rule);
        self.emit(GameEvent::PlayerLost(player, rule));
        Ok(())
    }
}

impl IDMapper<Player> for Game {
    fn get(&self, id: ID<Player>) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    fn get_mut(&mut self, id: ID<Player>) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;

    #[test]
    fn decks_are_instantiated_into_their_zones() {
        let game = test_game();
        let p0 = PlayerID::from_raw(0);
        let player = game.player(p0).unwrap();
        assert_eq!(player.deck_size(), test_deck().main.len());
        assert_eq!(player.resource_deck_size(), test_deck().resources.len());
        assert_eq!(game.status, GameStatus::NotStarted);
        assert_eq!(game.active_player, p0);
    }

    #[test]
    fn unknown_ids_are_integrity_errors() {
        let game = test_game();
        let ghost = PlayerID::from_raw(9);
        assert_eq!(game.player(ghost).unwrap_err(), IntegrityError::UnknownPlayer(ghost).into());
        let card = CardInstanceID::from_raw(usize::MAX);
        assert!(game.card(PlayerID::from_raw(0), card).unwrap_err().is_integrity());
    }

    #[test]
    fn losing_is_announced_once() {
        let mut game = test_game();
        let mut events = game.subscribe();
        let p1 = PlayerID::from_raw(1);
        game.mark_lost(p1, GameRule::BaseDestroyed).unwrap();
        game.mark_lost(p1, GameRule::CouldntDraw).unwrap();
        assert_eq!(events.try_recv().unwrap(), GameEvent::PlayerLost(p1, GameRule::BaseDestroyed));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn id_mapper_lookup() {
        let game = test_game();
        let p1 = PlayerID::from_raw(1);
        assert_eq!(IDMapper::<Player>::get(&game, p1).map(|p| p.id), Some(p1));
    }
}
