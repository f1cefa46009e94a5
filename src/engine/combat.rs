//! Attacks, blocks, battle damage, shields and destruction.

use log::{debug, info};

use super::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackDeclaration {
    pub attacker: CardInstanceID,
    pub attacking_player: PlayerID,
    pub defending_player: PlayerID,
    pub targeting_base: bool,
    pub blocker: Option<CardInstanceID>,
    /// Who controls the blocker. Differs from the defender when a teammate
    /// blocks.
    pub blocking_player: Option<PlayerID>,
    pub resolved: bool,
    pub evaded: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatResult {
    pub damage_dealt: u32,
    pub shields_broken: usize,
    pub attacker_destroyed: bool,
    pub blocker_destroyed: bool,
    pub base_destroyed: bool,
    pub message: String,
}

/// What a hit on a player did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerDamage {
    pub shields_broken: usize,
    pub base_damage: u32,
    pub base_destroyed: bool,
}

impl Game {
    /// Whether the unit could attack `defending_player` right now.
    pub fn validate_attack(
        &self,
        attacker: CardInstanceID,
        attacking_player: PlayerID,
        defending_player: PlayerID,
    ) -> EngineResult<()> {
        if attacking_player == defending_player || self.are_teammates(attacking_player, defending_player) {
            return Err(RuleViolation::CannotAttackTeammate.into());
        }
        self.player(defending_player)?;

        let card = self
            .player(attacking_player)?
            .cards
            .get(attacker)
            .ok_or(RuleViolation::AttackerNotFound)?;
        if card.zone != Zone::BattleArea {
            return Err(RuleViolation::NotInBattleArea.into());
        }
        let definition = self.database.require(&card.card_number)?;
        if definition.card_type != CardType::Unit {
            return Err(RuleViolation::OnlyUnitsAttack.into());
        }
        if !card.active {
            return Err(RuleViolation::UnitRested.into());
        }
        if card.turn_deployed == Some(self.turn_number) && !ignores_summoning_sickness(card, definition) {
            return Err(RuleViolation::SummoningSickness.into());
        }
        if card.attacked_this_turn {
            return Err(RuleViolation::AlreadyAttacked.into());
        }
        Ok(())
    }

    /// Declares an attack on `defending_player` and returns its index in
    /// `current_attacks`.
    pub fn declare_attack(
        &mut self,
        attacker: CardInstanceID,
        attacking_player: PlayerID,
        defending_player: PlayerID,
    ) -> EngineResult<usize> {
        self.validate_attack(attacker, attacking_player, defending_player)?;
        let database = self.database.clone();
        let card = self.card_mut(attacking_player, attacker)?;
        let definition = database.require(&card.card_number)?;
        card.rest();
        card.attacked_this_turn = true;

        self.current_attacks.push(AttackDeclaration {
            attacker,
            attacking_player,
            defending_player,
            targeting_base: true,
            blocker: None,
            blocking_player: None,
            resolved: false,
            evaded: false,
        });
        let index = self.current_attacks.len() - 1;

        info!("combat: {} ({:?}) attacks {:?}", definition.name, attacker, defending_player);
        self.emit(GameEvent::AttackDeclared { attacker, attacking_player, defending_player });

        for effect in definition.effects_with_timing(EffectTiming::OnAttack) {
            self.push_effect(attacker, attacking_player, effect.clone(), None);
        }
        let base_holder = self.base_holder(defending_player);
        if let Some(base) = self.player(base_holder)?.base().map(|c| (c.id, c.card_number.clone())) {
            self.trigger_effects(base.0, &base.1, base_holder, EffectTiming::WhenAttacked, Some(attacker))?;
        }
        Ok(index)
    }

    fn open_attack(&self, attack_index: usize) -> RuleResult<&AttackDeclaration> {
        let attack = self
            .current_attacks
            .get(attack_index)
            .ok_or(RuleViolation::InvalidAttackIndex)?;
        if attack.resolved {
            return Err(RuleViolation::AttackResolved);
        }
        if attack.evaded {
            return Err(RuleViolation::AttackEvaded);
        }
        Ok(attack)
    }

    /// Checks that `player` is on the defending side of the attack.
    fn check_defending_side(&self, attack: &AttackDeclaration, player: PlayerID) -> RuleResult<()> {
        if player == attack.attacking_player || self.are_teammates(player, attack.attacking_player) {
            return Err(RuleViolation::CannotBlockForOpponent);
        }
        if player != attack.defending_player && !self.are_teammates(player, attack.defending_player) {
            return Err(RuleViolation::NotDefendingPlayer);
        }
        Ok(())
    }

    /// `defending_player` blocks with one of their units. A teammate of the
    /// defender may block in their place.
    pub fn declare_blocker(
        &mut self,
        attack_index: usize,
        blocker: CardInstanceID,
        defending_player: PlayerID,
    ) -> EngineResult<()> {
        let attack = self.open_attack(attack_index)?;
        if attack.blocker.is_some() {
            return Err(RuleViolation::AlreadyBlocked.into());
        }
        self.check_defending_side(attack, defending_player)?;

        let database = self.database.clone();
        let card = self
            .player(defending_player)?
            .cards
            .get(blocker)
            .ok_or(RuleViolation::BlockerNotFound)?;
        if card.zone != Zone::BattleArea {
            return Err(RuleViolation::NotInBattleArea.into());
        }
        let definition = database.require(&card.card_number)?;
        if definition.card_type != CardType::Unit {
            return Err(RuleViolation::OnlyUnitsBlock.into());
        }
        if !card.active && !can_block_while_rested(card, definition) {
            return Err(RuleViolation::RestedWithoutBlocker.into());
        }

        self.card_mut(defending_player, blocker)?.rest();
        let attack = &mut self.current_attacks[attack_index];
        attack.blocker = Some(blocker);
        attack.blocking_player = Some(defending_player);
        attack.targeting_base = false;
        let attacker = attack.attacker;

        info!("combat: {} ({:?}) blocks attack {}", definition.name, blocker, attack_index);
        self.emit(GameEvent::BlockerDeclared { attack_index, blocker });

        for effect in definition.effects_with_timing(EffectTiming::OnBlock) {
            self.push_effect(blocker, defending_player, effect.clone(), Some(attacker));
        }
        Ok(())
    }

    /// High-Maneuver: the unit the attack is fought against rests a resource
    /// and the attack misses. Attacks only ever target a player, so that unit
    /// is the declared blocker.
    pub fn evade_attack(&mut self, attack_index: usize, unit: CardInstanceID, player: PlayerID) -> EngineResult<()> {
        let attack = self.open_attack(attack_index)?;
        self.check_defending_side(attack, player)?;
        if attack.blocker != Some(unit) {
            return Err(RuleViolation::NotEngagedInAttack.into());
        }

        let database = self.database.clone();
        let card = self.player(player)?.cards.get(unit).ok_or(RuleViolation::CardNotFound)?;
        if card.zone != Zone::BattleArea {
            return Err(RuleViolation::NotInBattleArea.into());
        }
        let definition = database.require(&card.card_number)?;
        if !has_keyword(card, definition, Keyword::HighManeuver) {
            return Err(RuleViolation::MissingKeyword { keyword: Keyword::HighManeuver }.into());
        }

        let cost = self.config.high_maneuver_cost;
        self.player_mut(player)?.rest_resources(cost)?;
        self.current_attacks[attack_index].evaded = true;
        info!("combat: {} evaded attack {} (High-Maneuver)", definition.name, attack_index);
        self.emit(GameEvent::AttackEvaded { attack_index, unit });
        Ok(())
    }

    pub fn resolve_attack(&mut self, attack_index: usize) -> EngineResult<CombatResult> {
        let attack = self
            .current_attacks
            .get(attack_index)
            .cloned()
            .ok_or(RuleViolation::InvalidAttackIndex)?;
        if attack.resolved {
            return Err(RuleViolation::AttackResolved.into());
        }
        self.current_attacks[attack_index].resolved = true;

        let mut result = CombatResult::default();
        let attacker_present = self
            .player(attack.attacking_player)?
            .cards
            .cards(Zone::BattleArea)
            .iter()
            .any(|card| card.id == attack.attacker);

        if attack.evaded {
            result.message = "Attack evaded".into();
        } else if !attacker_present {
            result.message = "Attacker left the Battle Area".into();
        } else if let Some(blocker) = attack.blocker {
            self.resolve_blocked(&attack, blocker, &mut result)?;
        } else {
            self.resolve_unblocked(&attack, &mut result)?;
        }
        debug!("combat: attack {} resolved: {:?}", attack_index, result);
        Ok(result)
    }

    fn resolve_blocked(
        &mut self,
        attack: &AttackDeclaration,
        blocker: CardInstanceID,
        result: &mut CombatResult,
    ) -> EngineResult<()> {
        let blocking_player = attack.blocking_player.unwrap_or(attack.defending_player);
        let blocker_present = self
            .player(blocking_player)?
            .cards
            .cards(Zone::BattleArea)
            .iter()
            .any(|card| card.id == blocker);
        if !blocker_present {
            result.message = "Blocker left the Battle Area".into();
            return Ok(());
        }

        let database = self.database.clone();
        let attacker_card = self.card(attack.attacking_player, attack.attacker)?;
        let attacker_def = database.require(&attacker_card.card_number)?;
        let blocker_card = self.card(blocking_player, blocker)?;
        let blocker_def = database.require(&blocker_card.card_number)?;

        let attacker_ap =
            attacker_card.effective_ap(attacker_def) + self.support_bonus(attack.attacking_player, attack.attacker)?;
        let blocker_ap = blocker_card.effective_ap(blocker_def);
        let breach = keyword_value(attacker_card, attacker_def, Keyword::Breach);
        let first_strike = first_strike_advantage((attacker_card, attacker_def), (blocker_card, blocker_def));

        let to_blocker = DamageSource::Battle(attack.attacker);
        let to_attacker = DamageSource::Battle(blocker);
        match first_strike {
            Some(CombatSide::Attacker) => {
                result.damage_dealt += attacker_ap;
                result.blocker_destroyed = self.deal_damage_to_unit(blocking_player, blocker, attacker_ap, to_blocker)?;
                if !result.blocker_destroyed {
                    result.damage_dealt += blocker_ap;
                    result.attacker_destroyed =
                        self.deal_damage_to_unit(attack.attacking_player, attack.attacker, blocker_ap, to_attacker)?;
                }
            }
            Some(CombatSide::Blocker) => {
                result.damage_dealt += blocker_ap;
                result.attacker_destroyed =
                    self.deal_damage_to_unit(attack.attacking_player, attack.attacker, blocker_ap, to_attacker)?;
                if !result.attacker_destroyed {
                    result.damage_dealt += attacker_ap;
                    result.blocker_destroyed =
                        self.deal_damage_to_unit(blocking_player, blocker, attacker_ap, to_blocker)?;
                }
            }
            None => {
                result.damage_dealt += attacker_ap + blocker_ap;
                self.mark_damage(blocking_player, blocker, attacker_ap, to_blocker)?;
                self.mark_damage(attack.attacking_player, attack.attacker, blocker_ap, to_attacker)?;
                result.blocker_destroyed = self.check_lethal(blocking_player, blocker)?;
                result.attacker_destroyed = self.check_lethal(attack.attacking_player, attack.attacker)?;
            }
        }

        if result.blocker_destroyed {
            if !result.attacker_destroyed {
                for effect in attacker_def.effects_with_timing(EffectTiming::WhenAttackDestroysUnit) {
                    self.push_effect(attack.attacker, attack.attacking_player, effect.clone(), Some(blocker));
                }
            }
            if breach > 0 {
                result.shields_broken = self.break_shields(breach as usize, attack.defending_player)?;
            }
        }

        result.message = match (result.attacker_destroyed, result.blocker_destroyed) {
            (true, true) => "Both units destroyed".into(),
            (true, false) => format!("{} destroyed", attacker_def.name),
            (false, true) => format!("{} destroyed", blocker_def.name),
            (false, false) => "Both units survived".into(),
        };
        Ok(())
    }

    fn resolve_unblocked(&mut self, attack: &AttackDeclaration, result: &mut CombatResult) -> EngineResult<()> {
        let database = self.database.clone();
        let card = self.card(attack.attacking_player, attack.attacker)?;
        let definition = database.require(&card.card_number)?;
        let ap = card.effective_ap(definition) + self.support_bonus(attack.attacking_player, attack.attacker)?;

        let remaining = self.side_shield_count(attack.defending_player);
        if remaining > 0 {
            let count = shields_to_break(card, definition, remaining);
            result.shields_broken = self.break_shields(count, attack.defending_player)?;
            result.message = format!("{} shield(s) broken", result.shields_broken);
        } else {
            result.damage_dealt = ap;
            result.base_destroyed = self.damage_base(attack.defending_player, ap, DamageSource::Battle(attack.attacker))?;
            result.message = if result.base_destroyed {
                "Base destroyed".into()
            } else {
                format!("{} damage to Base", ap)
            };
        }
        Ok(())
    }

    /// Support of every other unit the player controls.
    pub fn support_bonus(&self, player: PlayerID, attacker: CardInstanceID) -> EngineResult<u32> {
        let mut bonus = 0;
        for card in self.player(player)?.zone(Zone::BattleArea) {
            if card.id == attacker {
                continue;
            }
            let definition = self.database.require(&card.card_number)?;
            bonus += keyword_value(card, definition, Keyword::Support);
        }
        Ok(bonus)
    }

    /// Breaks up to `count` shields of `player`'s side, top first, and
    /// returns how many broke. Burst shields go to their owner's hand and
    /// put their Burst effects on the stack, the top shield's resolving first.
    pub fn break_shields(&mut self, count: usize, player: PlayerID) -> EngineResult<usize> {
        let mut broken = vec![];
        for _ in 0..count {
            let Some(holder) = self.next_shield_holder(player) else {
                break;
            };
            match self.draw_top_card(holder, Zone::ShieldStack, Zone::Trash)? {
                Some(id) => broken.push((holder, id)),
                None => break,
            }
        }
        if broken.is_empty() {
            return Ok(0);
        }

        info!("combat: {} shield(s) of {:?} broken", broken.len(), player);
        self.emit(GameEvent::ShieldsBroken { player, count: broken.len() });

        let database = self.database.clone();
        for (holder, id) in broken.iter().rev() {
            let card = self.card(*holder, *id)?;
            let definition = database.require(&card.card_number)?;
            if !has_keyword(card, definition, Keyword::Burst) {
                continue;
            }
            self.move_card(*holder, *id, Zone::Trash, Zone::Hand, false)?;
            info!("combat: Burst! {} goes to hand", definition.name);
            for effect in definition.effects_with_timing(EffectTiming::Burst) {
                self.push_effect(*id, *holder, effect.clone(), None);
            }
        }
        Ok(broken.len())
    }

    /// Damage that reaches the player: shields while there are any, the
    /// base after that.
    pub fn deal_damage_to_player(&mut self, player: PlayerID, amount: u32, source: DamageSource) -> EngineResult<PlayerDamage> {
        let mut hit = PlayerDamage::default();
        if self.side_shield_count(player) > 0 {
            hit.shields_broken = self.break_shields(amount as usize, player)?;
        } else {
            hit.base_damage = amount;
            hit.base_destroyed = self.damage_base(player, amount, source)?;
        }
        Ok(hit)
    }

    /// Returns whether the base went down. A side without a base loses
    /// outright.
    fn damage_base(&mut self, player: PlayerID, amount: u32, source: DamageSource) -> EngineResult<bool> {
        let holder = self.base_holder(player);
        let Some(base) = self.player(holder)?.base().map(|card| card.id) else {
            self.mark_side_lost(player, GameRule::NoBase)?;
            return Ok(true);
        };

        self.mark_damage(holder, base, amount, source)?;
        let database = self.database.clone();
        let card = self.card(holder, base)?;
        let definition = database.require(&card.card_number)?;
        if !card.is_lethally_damaged(definition) {
            return Ok(false);
        }

        self.destroy_base(holder, base)?;
        Ok(true)
    }

    /// Trashes a base. Losing it loses the game for the whole side.
    pub fn destroy_base(&mut self, holder: PlayerID, base: CardInstanceID) -> EngineResult<()> {
        let card = self.player(holder)?.cards.get(base).ok_or(RuleViolation::CardNotFound)?;
        if card.zone != Zone::BaseSection {
            return Err(RuleViolation::CardNotInZone { zone: Zone::BaseSection }.into());
        }
        let card_number = card.card_number.clone();
        self.move_card(holder, base, Zone::BaseSection, Zone::Trash, false)?;
        info!("combat: base {} of {:?} destroyed", card_number, holder);
        self.emit(GameEvent::BaseDestroyed { player: holder, card: base });
        self.trigger_effects(base, &card_number, holder, EffectTiming::OnDestroyed, None)?;
        self.mark_side_lost(holder, GameRule::BaseDestroyed)
    }

    fn mark_side_lost(&mut self, player: PlayerID, rule: GameRule) -> EngineResult<()> {
        for member in self.side_of(player) {
            self.mark_lost(member, rule)?;
        }
        Ok(())
    }

    fn mark_damage(&mut self, owner: PlayerID, id: CardInstanceID, amount: u32, source: DamageSource) -> EngineResult<()> {
        if amount == 0 {
            return Ok(());
        }
        self.card_mut(owner, id)?.take_damage(amount, source);
        self.emit(GameEvent::DamageDealt { player: owner, card: id, amount, source });
        Ok(())
    }

    /// Destroys the unit if its damage has reached its HP.
    pub(crate) fn check_lethal(&mut self, owner: PlayerID, id: CardInstanceID) -> EngineResult<bool> {
        let Some(card) = self.player(owner)?.cards.get(id) else {
            return Ok(false);
        };
        if card.zone != Zone::BattleArea {
            return Ok(false);
        }
        let database = self.database.clone();
        let definition = database.require(&card.card_number)?;
        if card.is_lethally_damaged(definition) {
            self.destroy_unit(owner, id)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Marks damage and destroys the unit right away when it is lethal.
    pub fn deal_damage_to_unit(
        &mut self,
        owner: PlayerID,
        id: CardInstanceID,
        amount: u32,
        source: DamageSource,
    ) -> EngineResult<bool> {
        self.mark_damage(owner, id, amount, source)?;
        self.check_lethal(owner, id)
    }

    /// Sends a unit from the Battle Area to Trash and queues its OnDestroyed
    /// effects along with every WhenUnitDestroyed effect in play.
    pub fn destroy_unit(&mut self, owner: PlayerID, id: CardInstanceID) -> EngineResult<()> {
        let card = self.player(owner)?.cards.get(id).ok_or(RuleViolation::CardNotFound)?;
        if card.zone != Zone::BattleArea {
            return Err(RuleViolation::NotInBattleArea.into());
        }
        let card_number = card.card_number.clone();
        self.move_card(owner, id, Zone::BattleArea, Zone::Trash, false)?;
        info!("combat: {:?} ({}) destroyed", id, card_number);
        self.emit(GameEvent::UnitDestroyed { player: owner, card: id });

        self.trigger_effects(id, &card_number, owner, EffectTiming::OnDestroyed, None)?;

        let watchers: Vec<(PlayerID, CardInstanceID, CardNumber)> = self
            .players
            .iter()
            .flat_map(|p| p.cards.in_play().map(move |c| (p.id, c.id, c.card_number.clone())))
            .collect();
        for (watcher_owner, watcher, number) in watchers {
            self.trigger_effects(watcher, &number, watcher_owner, EffectTiming::WhenUnitDestroyed, Some(id))?;
        }
        Ok(())
    }

    /// Resolves every open attack in declaration order, then closes the
    /// battle.
    pub fn resolve_all_attacks(&mut self) -> EngineResult<Vec<CombatResult>> {
        let mut results = vec![];
        for index in 0..self.current_attacks.len() {
            if self.is_game_over() {
                break;
            }
            if self.current_attacks[index].resolved {
                continue;
            }
            results.push(self.resolve_attack(index)?);
            self.settle()?;
        }
        self.end_battle()?;
        Ok(results)
    }

    /// Clears the declarations and the until-end-of-battle modifiers.
    pub fn end_battle(&mut self) -> EngineResult<()> {
        self.current_attacks.clear();
        for player in self.players.iter_mut() {
            player.cards.for_each_in_play(|card| {
                card.expire_modifiers(|m| m.duration == ModifierDuration::UntilEndOfBattle);
            });
        }
        let everyone = self.player_ids();
        self.trigger_in_play(&everyone, EffectTiming::EndOfBattle)?;
        self.settle()
    }

    /// Queues the effects with `timing` of every in-play card of `players`.
    pub fn trigger_in_play(&mut self, players: &[PlayerID], timing: EffectTiming) -> EngineResult<usize> {
        let mut cards = vec![];
        for player in players {
            cards.extend(
                self.player(*player)?
                    .cards
                    .in_play()
                    .map(|card| (*player, card.id, card.card_number.clone())),
            );
        }
        let mut pushed = 0;
        for (owner, id, number) in cards {
            pushed += self.trigger_effects(id, &number, owner, timing, None)?;
        }
        Ok(pushed)
    }
}
