//! Requests coming from players, validated before anything changes.

use log::{debug, info};

use super::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerActionRequest {
    /// Play a card from hand. `target` names the Link Unit for a Pilot, or
    /// the unit an effect should aim at.
    PlayCard { card: CardInstanceID, target: Option<CardInstanceID> },
    PairPilot { pilot: CardInstanceID, unit: CardInstanceID },
    PlaceResource,
    Discard { cards: Vec<CardInstanceID> },
    DeclareAttack { attacker: CardInstanceID, defender: PlayerID },
    DeclareBlocker { attack_index: usize, blocker: CardInstanceID },
    Evade { attack_index: usize, unit: CardInstanceID },
    ActivateAbility { card: CardInstanceID, effect_index: usize, target: Option<CardInstanceID> },
    ResolveCombat,
    PassPriority,
}

impl PlayerActionRequest {
    /// Requests the defending side makes during the attacker's turn.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            PlayerActionRequest::DeclareBlocker { .. }
                | PlayerActionRequest::Evade { .. }
                | PlayerActionRequest::ActivateAbility { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionResponse {
    Done,
    AttackDeclared(usize),
    ResourcePlaced(CardInstanceID),
    Discarded(usize),
    Combat(Vec<CombatResult>),
}

impl Game {
    /// Validates then executes, and settles whatever the action set off.
    pub fn execute_action(&mut self, player: PlayerID, request: PlayerActionRequest) -> EngineResult<ActionResponse> {
        self.validate_action(player, &request)?;
        debug!("action: {:?} requests {:?}", player, request);

        use PlayerActionRequest::*;
        let response = match request {
            PlayCard { card, target } => {
                self.play_card(player, card, target)?;
                ActionResponse::Done
            }
            PairPilot { pilot, unit } => {
                self.pair_pilot(player, pilot, unit)?;
                ActionResponse::Done
            }
            PlaceResource => ActionResponse::ResourcePlaced(self.place_resource(player)?),
            Discard { cards } => ActionResponse::Discarded(self.discard_cards(player, &cards)?),
            DeclareAttack { attacker, defender } => {
                ActionResponse::AttackDeclared(self.declare_attack(attacker, player, defender)?)
            }
            DeclareBlocker { attack_index, blocker } => {
                self.declare_blocker(attack_index, blocker, player)?;
                ActionResponse::Done
            }
            Evade { attack_index, unit } => {
                self.evade_attack(attack_index, unit, player)?;
                ActionResponse::Done
            }
            ActivateAbility { card, effect_index, target } => {
                self.activate_ability(player, card, effect_index, target)?;
                ActionResponse::Done
            }
            ResolveCombat => ActionResponse::Combat(self.resolve_all_attacks()?),
            PassPriority => {
                info!("action: {:?} passes priority", player);
                self.advance_step()?;
                return Ok(ActionResponse::Done);
            }
        };

        self.settle()?;
        Ok(response)
    }

    /// Same as [`Game::execute_action`] flattened for hosts that only show
    /// a message.
    pub fn perform(&mut self, player: PlayerID, request: PlayerActionRequest) -> ActionOutcome {
        self.execute_action(player, request).into()
    }

    /// Priority first, then the checks of the particular action.
    pub fn validate_action(&self, player: PlayerID, request: &PlayerActionRequest) -> EngineResult<()> {
        self.player(player)?;
        let Some(step) = self.current_step() else {
            return Err(RuleViolation::GameNotInProgress.into());
        };
        if !request.is_response() && !self.is_turn_side(player) {
            return Err(RuleViolation::NotYourTurn.into());
        }

        use PlayerActionRequest::*;
        match request {
            PlayCard { card, target } => self.validate_play_card(player, *card, *target),
            PairPilot { .. } if step != TurnStep::Main => Err(RuleViolation::NotMainPhase.into()),
            DeclareAttack { .. } | ResolveCombat if step != TurnStep::Main => {
                Err(RuleViolation::AttackOutsideMainPhase.into())
            }
            DeclareAttack { attacker, defender } => self.validate_attack(*attacker, player, *defender),
            PlaceResource => self.validate_place_resource(player),
            Discard { cards } => self.validate_discard(player, cards),
            PassPriority if step != TurnStep::Main => Err(RuleViolation::CannotPassNow.into()),
            _ => Ok(()),
        }
    }

    fn hand_card(&self, player: PlayerID, card: CardInstanceID) -> EngineResult<&CardInstance> {
        let store = &self.player(player)?.cards;
        match store.get(card) {
            None => Err(RuleViolation::CardNotFound.into()),
            Some(instance) if instance.zone != Zone::Hand => Err(RuleViolation::CardNotInHand.into()),
            Some(instance) => Ok(instance),
        }
    }

    /// Main Phase, in hand, playable type, Lv, cost, then room to put it.
    pub fn validate_play_card(
        &self,
        player: PlayerID,
        card: CardInstanceID,
        target: Option<CardInstanceID>,
    ) -> EngineResult<()> {
        if self.current_step() != Some(TurnStep::Main) {
            return Err(RuleViolation::NotMainPhase.into());
        }
        let instance = self.hand_card(player, card)?;
        let definition = self.database.require(&instance.card_number)?;
        if matches!(definition.card_type, CardType::Resource | CardType::Token) {
            return Err(RuleViolation::UnplayableType { card_type: definition.card_type }.into());
        }

        let owner = self.player(player)?;
        let level = owner.level();
        if definition.level > level {
            return Err(RuleViolation::InsufficientLevel { required: definition.level, have: level }.into());
        }
        let cost = instance.effective_cost(definition);
        if !owner.can_pay_cost(cost) {
            return Err(RuleViolation::InsufficientResources { need: cost, have: owner.available_resources() }.into());
        }

        match definition.card_type {
            CardType::Unit => self.can_add_to_zone(player, CardType::Unit, Zone::BattleArea),
            CardType::Base => {
                let holder = self.base_holder(player);
                match self.player(holder)?.base() {
                    Some(base) if !base.is_ex_base() => Err(RuleViolation::BaseSectionOccupied.into()),
                    _ => Ok(()),
                }
            }
            CardType::Pilot => match target {
                Some(unit) => {
                    let unit = self.player(player)?.cards.get(unit).filter(|u| u.zone == Zone::BattleArea);
                    match unit {
                        Some(unit) => {
                            let unit_def = self.database.require(&unit.card_number)?;
                            Ok(check_pairing((unit, unit_def), (instance, definition))?)
                        }
                        None => Err(RuleViolation::NotInBattleArea.into()),
                    }
                }
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Pays for and puts the card where it goes. Call only after
    /// [`Game::validate_play_card`] passed.
    fn play_card(&mut self, player: PlayerID, card: CardInstanceID, target: Option<CardInstanceID>) -> EngineResult<()> {
        let database = self.database.clone();
        let instance = self.hand_card(player, card)?;
        let definition = database.require(&instance.card_number)?;
        let cost = instance.effective_cost(definition);

        let paid = self.player_mut(player)?.pay_cost(cost)?;
        info!(
            "action: {:?} plays {} (rested {}, spent {} EX)",
            player,
            definition.name,
            paid.rested.len(),
            paid.spent_ex.len()
        );
        for ex in paid.spent_ex {
            self.emit(GameEvent::CardMoved { player, card: ex, from: Zone::ResourceArea, to: Zone::Removal });
        }

        match definition.card_type {
            CardType::Unit => {
                self.move_card(player, card, Zone::Hand, Zone::BattleArea, true)?;
                self.card_mut(player, card)?.turn_deployed = Some(self.turn_number);
                self.trigger_effects(card, &definition.card_number, player, EffectTiming::OnDeploy, target)?;
                self.trigger_effects(card, &definition.card_number, player, EffectTiming::OnPlay, target)?;
            }
            CardType::Base => {
                self.remove_ex_base(player)?;
                self.move_card(player, card, Zone::Hand, Zone::BaseSection, true)?;
                self.card_mut(player, card)?.turn_deployed = Some(self.turn_number);
                self.trigger_effects(card, &definition.card_number, player, EffectTiming::OnDeploy, target)?;
                self.trigger_effects(card, &definition.card_number, player, EffectTiming::OnPlay, target)?;
            }
            CardType::Pilot if target.is_some() => {
                let unit = target.ok_or(RuleViolation::NotInBattleArea)?;
                self.pair_pilot(player, card, unit)?;
            }
            _ => {
                self.trigger_effects(card, &definition.card_number, player, EffectTiming::OnPlay, target)?;
                self.resolve_stack()?;
                if self.player(player)?.cards.zone_of(card) == Some(Zone::Hand) {
                    self.move_card(player, card, Zone::Hand, Zone::Trash, false)?;
                }
            }
        }
        Ok(())
    }

    /// The EX Base token makes way for a real base and stops existing.
    fn remove_ex_base(&mut self, player: PlayerID) -> EngineResult<()> {
        for member in self.side_of(player) {
            let ex_base = self
                .player(member)?
                .base()
                .filter(|base| base.is_ex_base())
                .map(|base| base.id);
            if let Some(id) = ex_base {
                self.player_mut(member)?.cards.take(Zone::BaseSection, id);
                info!("action: EX Base of {:?} replaced", member);
                self.emit(GameEvent::CardMoved { player: member, card: id, from: Zone::BaseSection, to: Zone::Removal });
            }
        }
        Ok(())
    }

    fn validate_place_resource(&self, player: PlayerID) -> EngineResult<()> {
        let owner = self.player(player)?;
        if owner.placed_resource_this_turn {
            return Err(RuleViolation::ResourceAlreadyPlaced.into());
        }
        self.can_add_to_zone(player, CardType::Resource, Zone::ResourceArea)?;
        if owner.resource_deck_size() == 0 {
            return Err(RuleViolation::ResourceDeckEmpty.into());
        }
        Ok(())
    }

    /// Top of the Resource Deck into the Resource Area, once per turn.
    pub fn place_resource(&mut self, player: PlayerID) -> EngineResult<CardInstanceID> {
        self.validate_place_resource(player)?;
        let placed = self
            .draw_top_card(player, Zone::ResourceDeck, Zone::ResourceArea)?
            .ok_or(RuleViolation::ResourceDeckEmpty)?;
        self.player_mut(player)?.placed_resource_this_turn = true;
        info!("action: {:?} placed a resource", player);
        Ok(placed)
    }

    fn validate_discard(&self, player: PlayerID, cards: &[CardInstanceID]) -> EngineResult<()> {
        let store = &self.player(player)?.cards;
        for card in cards {
            match store.zone_of(*card) {
                None => return Err(RuleViolation::CardNotFound.into()),
                Some(Zone::Hand) => {}
                Some(_) => return Err(RuleViolation::NotInHand.into()),
            }
        }
        Ok(())
    }

    /// All or nothing.
    pub fn discard_cards(&mut self, player: PlayerID, cards: &[CardInstanceID]) -> EngineResult<usize> {
        self.validate_discard(player, cards)?;
        for card in cards {
            self.move_card(player, *card, Zone::Hand, Zone::Trash, false)?;
        }
        Ok(cards.len())
    }

    /// Discards down to `limit`: the chosen cards first, then the ones most
    /// recently added to hand. Returns how many went.
    pub fn discard_to_hand_limit(
        &mut self,
        player: PlayerID,
        chosen: &[CardInstanceID],
        limit: usize,
    ) -> EngineResult<usize> {
        let mut discarded = 0;
        for card in chosen {
            if self.player(player)?.hand_size() <= limit {
                break;
            }
            if self.player(player)?.cards.zone_of(*card) == Some(Zone::Hand) {
                self.move_card(player, *card, Zone::Hand, Zone::Trash, false)?;
                discarded += 1;
            }
        }
        while self.player(player)?.hand_size() > limit {
            let Some(newest) = self.player(player)?.zone(Zone::Hand).last().map(|card| card.id) else {
                break;
            };
            self.move_card(player, newest, Zone::Hand, Zone::Trash, false)?;
            discarded += 1;
        }
        if discarded > 0 {
            info!("action: {:?} discarded {} card(s) to the hand limit", player, discarded);
        }
        Ok(discarded)
    }
}
