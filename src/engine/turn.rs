//! Game setup and the turn machine.
//!
//! Every step but Main runs its body on entry and then waits out
//! `phase_advance_delay` of logical time, fed in through [`Game::tick`]. A
//! zero delay runs straight through to the next Main step. Main waits for
//! the turn player to pass priority.

use std::time::Duration;

use log::{debug, info};

use super::prelude::*;

/// The pending automatic advance out of `step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseTimer {
    pub step: TurnStep,
    pub remaining: Duration,
}

impl Game {
    /// Shuffles, deals shields, hands out the EX tokens and opening hands,
    /// then starts turn 1 for the first player.
    pub fn start_game(&mut self) -> EngineResult<()> {
        if self.status != GameStatus::NotStarted {
            return Err(RuleViolation::GameAlreadyStarted.into());
        }
        info!("turn: starting game with {} players", self.players.len());

        let shields = match self.mode {
            GameMode::Standard => self.config.shields_per_player,
            GameMode::Team(_) => self.config.team_shields_per_player,
        };
        for player in self.player_ids() {
            self.shuffle_zone(player, Zone::Deck)?;
            self.shuffle_zone(player, Zone::ResourceDeck)?;
            self.draw_top_cards(player, Zone::Deck, Zone::ShieldStack, shields)?;
        }

        let mut leaders = vec![];
        for player in self.player_ids() {
            let leader = self.side_leader(player);
            if !leaders.contains(&leader) {
                leaders.push(leader);
            }
        }
        for leader in leaders {
            self.give_token(leader, TokenKind::ExBase, Zone::BaseSection)?;
        }
        for player in self.ex_resource_receivers() {
            self.give_token(player, TokenKind::ExResource, Zone::ResourceArea)?;
        }

        for player in self.player_ids() {
            self.draw_cards(player, self.config.starting_hand_size)?;
        }

        self.active_player = self.player_ids().first().copied().ok_or(RuleViolation::GameNotInProgress)?;
        self.emit(GameEvent::GameStarted);
        self.begin_turn();
        self.enter_step(TurnStep::Active)
    }

    /// Whoever goes second gets an EX Resource; in team games that's every
    /// member of the second team.
    fn ex_resource_receivers(&self) -> Vec<PlayerID> {
        match &self.mode {
            GameMode::Standard => self.player_ids().into_iter().skip(1).take(1).collect(),
            GameMode::Team(layout) => layout.teams[1].members.to_vec(),
        }
    }

    fn give_token(&mut self, player: PlayerID, kind: TokenKind, zone: Zone) -> EngineResult<()> {
        let token = CardInstance::token(kind, player);
        let id = token.id;
        self.player_mut(player)?.cards.put(token, zone);
        debug!("turn: {:?} gets {:?}", player, kind);
        self.emit(GameEvent::CardMoved { player, card: id, from: Zone::Removal, to: zone });
        Ok(())
    }

    fn begin_turn(&mut self) {
        self.turn_number += 1;
        info!("turn: turn {} begins for {:?}", self.turn_number, self.active_player);
        self.emit(GameEvent::TurnStarted { turn: self.turn_number, player: self.active_player });
    }

    /// Enters `step` and keeps going while steps advance with no delay.
    pub(crate) fn enter_step(&mut self, step: TurnStep) -> EngineResult<()> {
        let mut next = Some(step);
        while let Some(step) = next {
            next = self.run_step(step)?;
        }
        Ok(())
    }

    /// Runs one step. Returns the step to enter right away, if any.
    fn run_step(&mut self, step: TurnStep) -> EngineResult<Option<TurnStep>> {
        self.phase_timer = None;
        self.status = GameStatus::InProgress(step);
        debug!("turn: entering {}", step);
        self.emit(GameEvent::PhaseChanged(step));

        self.run_step_body(step)?;
        self.settle()?;
        if self.is_game_over() || !step.auto_advances() {
            return Ok(None);
        }

        let delay = self.config.phase_advance_delay;
        if delay.is_zero() {
            return Ok(Some(self.following_step(step)));
        }
        self.phase_timer = Some(PhaseTimer { step, remaining: delay });
        Ok(None)
    }

    /// Cleanup hands over to the Active step of the next turn.
    fn following_step(&mut self, step: TurnStep) -> TurnStep {
        match step.next() {
            Some(next) => next,
            None => {
                self.begin_turn();
                TurnStep::Active
            }
        }
    }

    fn run_step_body(&mut self, step: TurnStep) -> EngineResult<()> {
        let side = self.turn_side();
        match step {
            TurnStep::Active => {
                for player in &side {
                    self.activate_all_cards(*player)?;
                    self.player_mut(*player)?.reset_turn_flags();
                }
            }
            TurnStep::Start => {
                self.trigger_in_play(&side, EffectTiming::StartOfTurn)?;
            }
            TurnStep::Draw => {
                for player in &side {
                    self.draw_cards(*player, 1)?;
                }
            }
            TurnStep::Resource => {
                for player in &side {
                    self.place_turn_resource(*player)?;
                }
            }
            TurnStep::Main | TurnStep::Action => {}
            TurnStep::End => {
                self.trigger_in_play(&side, EffectTiming::EndOfTurn)?;
                for player in &side {
                    self.apply_repair(*player)?;
                }
            }
            TurnStep::Hand => {
                let limit = self.config.hand_limit;
                for player in &side {
                    self.discard_to_hand_limit(*player, &[], limit)?;
                }
            }
            TurnStep::Cleanup => self.cleanup_turn()?,
        }
        Ok(())
    }

    /// The Resource step's placement. Skipped quietly when the deck is
    /// empty or the area is full.
    fn place_turn_resource(&mut self, player: PlayerID) -> EngineResult<()> {
        let owner = self.player(player)?;
        if owner.placed_resource_this_turn || owner.resource_deck_size() == 0 {
            return Ok(());
        }
        if self.can_add_to_zone(player, CardType::Resource, Zone::ResourceArea).is_err() {
            debug!("turn: resource area of {:?} is full", player);
            return Ok(());
        }
        self.draw_top_card(player, Zone::ResourceDeck, Zone::ResourceArea)?;
        self.player_mut(player)?.placed_resource_this_turn = true;
        Ok(())
    }

    fn apply_repair(&mut self, player: PlayerID) -> EngineResult<()> {
        let database = self.database.clone();
        for card in self.player_mut(player)?.cards.cards_mut(Zone::BattleArea).iter_mut() {
            let definition = database.require(&card.card_number)?;
            let amount = repair_amount(card, definition);
            if amount > 0 {
                card.heal(amount);
                info!("turn: Repair {} on {}", amount, definition.name);
            }
        }
        Ok(())
    }

    fn cleanup_turn(&mut self) -> EngineResult<()> {
        for player in self.players.iter_mut() {
            player.cards.for_each_in_play(|card| {
                card.expire_modifiers(|m| m.duration == ModifierDuration::UntilEndOfTurn);
                card.temporary_keywords.clear();
            });
        }
        let swept = self.effect_stack.cleanup(self.turn_number + 1);
        debug!("turn: swept {} turn effect(s)", swept);

        let ending = self.active_player;
        self.emit(GameEvent::TurnEnded { turn: self.turn_number, player: ending });
        self.active_player = self.next_turn_player();
        info!("turn: turn {} over, {:?} is up", self.turn_number, self.active_player);
        self.emit(GameEvent::ActivePlayerChanged(self.active_player));
        Ok(())
    }

    /// Leaves the current step. From Main, open attacks are fought out
    /// first.
    pub fn advance_step(&mut self) -> EngineResult<()> {
        let step = self.current_step().ok_or(RuleViolation::GameNotInProgress)?;
        self.phase_timer = None;
        if step == TurnStep::Main && !self.current_attacks.is_empty() {
            self.resolve_all_attacks()?;
            if self.is_game_over() {
                return Ok(());
            }
        }
        let next = self.following_step(step);
        self.enter_step(next)
    }

    /// Feeds logical time to the auto-advance timer. Time left over after
    /// one advance carries into the next step's timer.
    pub fn tick(&mut self, elapsed: Duration) -> EngineResult<()> {
        let mut elapsed = elapsed;
        while let Some(timer) = self.phase_timer {
            if elapsed < timer.remaining {
                self.phase_timer = Some(PhaseTimer { remaining: timer.remaining - elapsed, ..timer });
                break;
            }
            elapsed -= timer.remaining;
            debug!("turn: timer for {} ran out", timer.step);
            self.advance_step()?;
        }
        Ok(())
    }

    pub fn pending_timer(&self) -> Option<PhaseTimer> {
        self.phase_timer
    }

    /// Resolves the stack and applies state-based actions until neither
    /// has anything left, then checks whether the game is over.
    pub fn settle(&mut self) -> EngineResult<()> {
        loop {
            self.resolve_stack()?;
            let applied = self.run_state_based_actions()?;
            if self.check_game_over() || (applied == 0 && self.effect_stack.is_empty()) {
                return Ok(());
            }
        }
    }

    /// Ends the game once at most one side is still standing.
    pub fn check_game_over(&mut self) -> bool {
        if self.is_game_over() {
            return true;
        }
        let mut standing = vec![];
        let mut sides = 0;
        for player in self.player_ids() {
            if self.side_leader(player) != player {
                continue;
            }
            sides += 1;
            let lost = self
                .side_of(player)
                .into_iter()
                .any(|member| self.player(member).is_ok_and(|p| p.has_lost));
            if !lost {
                standing.push(player);
            }
        }
        if sides < 2 || standing.len() > 1 {
            return false;
        }

        let outcome = match standing.first() {
            Some(winner) => GameOutcome::Winner(*winner),
            None => GameOutcome::Draw,
        };
        self.finish(outcome);
        true
    }

    /// Stops the game with nobody winning.
    pub fn abandon(&mut self) {
        if !self.is_game_over() {
            self.finish(GameOutcome::NoWinner);
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        info!("turn: game over, {:?}", outcome);
        self.status = GameStatus::GameOver(outcome);
        self.phase_timer = None;
        self.current_attacks.clear();
        self.effect_stack.clear();
        self.emit(GameEvent::GameEnded(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;

    fn drain(events: &mut tokio::sync::broadcast::Receiver<GameEvent>) -> Vec<GameEvent> {
        std::iter::from_fn(|| events.try_recv().ok()).collect()
    }

    #[test]
    fn setup_deals_shields_tokens_and_hands() {
        let game = started_game();
        let p0 = PlayerID::from_raw(0);
        let p1 = PlayerID::from_raw(1);
        for player in [p0, p1] {
            let p = game.player(player).unwrap();
            assert_eq!(p.shield_count(), 6);
            assert!(p.base().unwrap().is_ex_base());
        }
        assert_eq!(game.player(p0).unwrap().ex_resource_count(), 0);
        assert_eq!(game.player(p1).unwrap().ex_resource_count(), 1);
        // five dealt, one drawn in the Draw step
        assert_eq!(game.player(p0).unwrap().hand_size(), 6);
        assert_eq!(game.player(p1).unwrap().hand_size(), 5);
        assert_eq!(game.status, GameStatus::InProgress(TurnStep::Main));
        assert_eq!(game.turn_number, 1);
    }

    #[test]
    fn cannot_start_twice() {
        let mut game = started_game();
        assert_eq!(game.start_game().unwrap_err().to_string(), "Game has already started");
    }

    #[test]
    fn passing_runs_the_rest_of_the_turn() {
        let mut game = started_game();
        let mut events = game.subscribe();
        let p0 = PlayerID::from_raw(0);
        let p1 = PlayerID::from_raw(1);

        game.execute_action(p0, PlayerActionRequest::PassPriority).unwrap();

        assert_eq!(game.turn_number, 2);
        assert_eq!(game.active_player, p1);
        assert_eq!(game.current_step(), Some(TurnStep::Main));
        let events = drain(&mut events);
        assert!(events.contains(&GameEvent::TurnEnded { turn: 1, player: p0 }));
        assert!(events.contains(&GameEvent::ActivePlayerChanged(p1)));
        assert!(events.contains(&GameEvent::TurnStarted { turn: 2, player: p1 }));
    }

    #[test]
    fn timer_waits_for_ticks() {
        let mut game = test_game().with_rng_seed(7);
        game.config = game.config.clone().with_phase_advance_delay(Duration::from_secs(2));
        game.start_game().unwrap();
        assert_eq!(game.current_step(), Some(TurnStep::Active));

        game.tick(Duration::from_millis(1500)).unwrap();
        assert_eq!(game.current_step(), Some(TurnStep::Active));

        // carries the spare half second into Start
        game.tick(Duration::from_millis(1000)).unwrap();
        assert_eq!(game.current_step(), Some(TurnStep::Start));
        assert_eq!(game.pending_timer().unwrap().remaining, Duration::from_millis(1500));

        game.tick(Duration::from_secs(60)).unwrap();
        assert_eq!(game.current_step(), Some(TurnStep::Main));
        assert_eq!(game.pending_timer(), None);
    }

    #[test]
    fn a_manual_advance_cancels_the_timer() {
        let mut game = test_game();
        game.config = game.config.clone().with_phase_advance_delay(Duration::from_secs(2));
        game.start_game().unwrap();
        game.tick(Duration::from_millis(1500)).unwrap();

        game.advance_step().unwrap();
        assert_eq!(game.current_step(), Some(TurnStep::Start));
        assert_eq!(game.pending_timer().unwrap().remaining, Duration::from_secs(2));
    }

    #[test]
    fn repair_heals_at_end_of_turn() {
        let mut game = started_game();
        let p0 = PlayerID::from_raw(0);
        let unit = give_card(&mut game, p0, "UNIT-REPAIR", Zone::BattleArea);
        game.card_mut(p0, unit).unwrap().damage = 2;

        game.advance_step().unwrap();
        assert_eq!(game.card(p0, unit).unwrap().damage, 1);
    }

    #[test]
    fn turn_modifiers_expire_in_cleanup() {
        let mut game = started_game();
        let p0 = PlayerID::from_raw(0);
        let unit = give_card(&mut game, p0, "UNIT-3-4", Zone::BattleArea);
        {
            let card = game.card_mut(p0, unit).unwrap();
            card.modifiers.push(ActiveModifier {
                stat: ModifierStat::Ap,
                amount: 2,
                duration: ModifierDuration::UntilEndOfTurn,
                source: unit,
            });
            card.modifiers.push(ActiveModifier {
                stat: ModifierStat::Hp,
                amount: 1,
                duration: ModifierDuration::Permanent,
                source: unit,
            });
            card.temporary_keywords.push(KeywordInstance::flag(Keyword::Blocker));
        }

        game.advance_step().unwrap();
        let card = game.card(p0, unit).unwrap();
        assert_eq!(card.modifiers.len(), 1);
        assert!(card.temporary_keywords.is_empty());
    }

    #[test]
    fn empty_deck_on_draw_ends_the_game() {
        let mut game = started_game();
        let p1 = PlayerID::from_raw(1);
        game.player_mut(p1).unwrap().cards.cards_mut(Zone::Deck).clear();

        game.advance_step().unwrap();
        assert_eq!(game.outcome(), Some(GameOutcome::Winner(PlayerID::from_raw(0))));
        assert!(game.advance_step().is_err());
    }

    #[test]
    fn hand_step_discards_down_to_the_limit() {
        let mut game = started_game();
        let p0 = PlayerID::from_raw(0);
        for _ in 0..8 {
            give_card(&mut game, p0, "UNIT-1-1", Zone::Hand);
        }
        assert!(game.player(p0).unwrap().hand_size() > 10);
        game.advance_step().unwrap();
        assert_eq!(game.player(p0).unwrap().hand_size(), 10);
    }

    #[test]
    fn both_sides_losing_is_a_draw() {
        let mut game = started_game();
        game.mark_lost(PlayerID::from_raw(0), GameRule::BaseDestroyed).unwrap();
        game.mark_lost(PlayerID::from_raw(1), GameRule::BaseDestroyed).unwrap();
        assert!(game.check_game_over());
        assert_eq!(game.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn team_setup_shares_tokens() {
        let mut game = test_team_game().with_rng_seed(3);
        game.start_game().unwrap();
        let p = PlayerID::from_raw;

        assert!(game.player(p(0)).unwrap().base().is_some());
        assert!(game.player(p(1)).unwrap().base().is_some());
        assert!(game.player(p(2)).unwrap().base().is_none());
        assert!(game.player(p(3)).unwrap().base().is_none());
        for member in [p(1), p(3)] {
            assert_eq!(game.player(member).unwrap().ex_resource_count(), 1);
        }
        assert_eq!(game.side_shield_count(p(0)), 8);
        assert!(game.is_turn_side(p(2)));

        game.advance_step().unwrap();
        assert_eq!(game.active_player, p(1));
        assert!(game.is_turn_side(p(3)));
    }

    #[test]
    fn abandon_has_no_winner() {
        let mut game = started_game();
        game.abandon();
        assert_eq!(game.outcome(), Some(GameOutcome::NoWinner));
        assert_eq!(game.outcome().unwrap().code(), -1);
    }
}
