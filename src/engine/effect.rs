//! Card effects as data, and the processor that carries them out.
//!
//! An effect is a timing, a list of conditions that must all hold, a list of
//! costs that are paid all together or not at all, and a list of operations
//! executed in order.

use log::{debug, info, warn};

use super::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectTiming {
    OnDeploy,
    OnPlay,
    OnAttack,
    OnBlock,
    WhenAttacked,
    OnDestroyed,
    WhenUnitDestroyed,
    WhenAttackDestroysUnit,
    WhenPaired,
    WhilePaired,
    Burst,
    ActivateMain,
    ActivateAction,
    StartOfTurn,
    EndOfTurn,
    StartOfBattle,
    EndOfBattle,
    Continuous,
}

impl EffectTiming {
    /// Timings that fire on their own in response to something happening.
    pub fn is_trigger(self) -> bool {
        use EffectTiming::*;
        matches!(
            self,
            OnDeploy
                | OnAttack
                | OnBlock
                | WhenAttacked
                | OnDestroyed
                | WhenUnitDestroyed
                | WhenAttackDestroysUnit
                | WhenPaired
                | StartOfTurn
                | EndOfTurn
                | StartOfBattle
                | EndOfBattle
        )
    }

    pub fn is_activated(self) -> bool {
        matches!(self, EffectTiming::ActivateMain | EffectTiming::ActivateAction)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectCondition {
    YourTurn,
    OpponentTurn,
    HasActiveResources(u32),
    HasUnitsInPlay(u32),
    SourceIsPaired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectCost {
    RestResources(u32),
    RestThisUnit,
    TrashSelf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetScope {
    This,
    TargetUnit,
    YourUnits,
    EnemyUnits,
    AllUnits,
    YourPlayer,
    OpponentPlayer,
}

impl TargetScope {
    pub fn is_unit_scope(self) -> bool {
        !matches!(self, TargetScope::YourPlayer | TargetScope::OpponentPlayer)
    }

    /// Scopes that cover whatever units happen to be around, as opposed to
    /// one named unit.
    pub fn is_group(self) -> bool {
        matches!(self, TargetScope::YourUnits | TargetScope::EnemyUnits | TargetScope::AllUnits)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Draw(u32),
    DealDamageToUnit(u32),
    /// Breaks shields first, then hits the base.
    DealDamageToPlayer(u32),
    DestroyUnit,
    GiveAp(i32),
    GiveHp(i32),
    GrantKeyword(Keyword, u32),
    /// Cancels the next pending effect of an opponent.
    Negate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectOperation {
    pub operation: Operation,
    pub target: TargetScope,
    pub duration: ModifierDuration,
}

impl EffectOperation {
    pub fn new(operation: Operation, target: TargetScope) -> Self {
        Self { operation, target, duration: ModifierDuration::UntilEndOfTurn }
    }

    pub fn lasting(mut self, duration: ModifierDuration) -> Self {
        self.duration = duration;
        self
    }

    fn is_stat_change(&self) -> bool {
        matches!(self.operation, Operation::GiveAp(_) | Operation::GiveHp(_) | Operation::GrantKeyword(..))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectDefinition {
    pub timing: EffectTiming,
    pub description: String,
    pub conditions: Vec<EffectCondition>,
    pub costs: Vec<EffectCost>,
    pub operations: Vec<EffectOperation>,
    /// Recorded in the per-turn registry once resolved.
    pub during_this_turn: bool,
}

impl EffectDefinition {
    pub fn new(timing: EffectTiming, description: impl Into<String>) -> Self {
        Self {
            timing,
            description: description.into(),
            conditions: vec![],
            costs: vec![],
            operations: vec![],
            during_this_turn: false,
        }
    }

    pub fn when(mut self, condition: EffectCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn cost(mut self, cost: EffectCost) -> Self {
        self.costs.push(cost);
        self
    }

    pub fn then(mut self, operation: EffectOperation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn during_this_turn(mut self) -> Self {
        self.during_this_turn = true;
        self
    }

    pub fn is_negation(&self) -> bool {
        self.operations.iter().any(|op| op.operation == Operation::Negate)
    }

    /// Lasting stat changes over a group of units. These bind to the units
    /// present when the effect goes on the stack.
    pub fn is_continuous(&self) -> bool {
        self.operations.iter().any(|op| {
            op.is_stat_change()
                && op.target.is_group()
                && matches!(
                    op.duration,
                    ModifierDuration::WhileInPlay | ModifierDuration::UntilEndOfTurn | ModifierDuration::UntilEndOfBattle
                )
        })
    }
}

/// Who is acting and on what.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectContext {
    pub source: CardInstanceID,
    pub controller: PlayerID,
    pub target: Option<CardInstanceID>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectResult {
    pub cards_drawn: u32,
    pub damage_dealt: u32,
    pub units_destroyed: Vec<CardInstanceID>,
    pub ap_granted: i32,
    pub hp_granted: i32,
    pub keywords_granted: u32,
    pub shields_broken: usize,
    pub negated: u32,
    pub affected: Vec<CardInstanceID>,
}

impl EffectResult {
    pub fn merge(&mut self, other: EffectResult) {
        self.cards_drawn += other.cards_drawn;
        self.damage_dealt += other.damage_dealt;
        self.units_destroyed.extend(other.units_destroyed);
        self.ap_granted += other.ap_granted;
        self.hp_granted += other.hp_granted;
        self.keywords_granted += other.keywords_granted;
        self.shields_broken += other.shields_broken;
        self.negated += other.negated;
        self.affected.extend(other.affected);
    }
}

/// Effect processor.
impl Game {
    pub fn check_conditions(&self, effect: &EffectDefinition, ctx: &EffectContext) -> bool {
        effect.conditions.iter().all(|condition| self.check_condition(*condition, ctx))
    }

    fn check_condition(&self, condition: EffectCondition, ctx: &EffectContext) -> bool {
        use EffectCondition::*;
        match condition {
            YourTurn => self.is_turn_side(ctx.controller),
            OpponentTurn => !self.is_turn_side(ctx.controller),
            HasActiveResources(n) => self
                .player(ctx.controller)
                .is_ok_and(|p| p.available_resources() >= n),
            HasUnitsInPlay(n) => self.side_unit_count(ctx.controller) >= n as usize,
            SourceIsPaired => self
                .find_card(ctx.source)
                .is_some_and(|(_, _, card)| card.paired_with.is_some()),
        }
    }

    /// Checks every cost against the current state without touching it.
    pub fn validate_costs(&self, effect: &EffectDefinition, ctx: &EffectContext) -> EngineResult<()> {
        let player = self.player(ctx.controller)?;
        let resources: u32 = effect
            .costs
            .iter()
            .map(|cost| match cost {
                EffectCost::RestResources(n) => *n,
                _ => 0,
            })
            .sum();
        if resources > player.active_resource_count() {
            return Err(RuleViolation::CannotPayCost {
                reason: format!("need {} active resources, have {}", resources, player.active_resource_count()),
            }
            .into());
        }

        let source = player.cards.get(ctx.source);
        for cost in &effect.costs {
            match cost {
                EffectCost::RestResources(_) => {}
                EffectCost::RestThisUnit => match source {
                    Some(card) if card.zone == Zone::BattleArea && card.active => {}
                    Some(card) if card.zone == Zone::BattleArea => {
                        return Err(RuleViolation::CannotPayCost { reason: "this unit is rested".into() }.into())
                    }
                    _ => return Err(RuleViolation::CannotPayCost { reason: "this unit is not in play".into() }.into()),
                },
                EffectCost::TrashSelf => {
                    if !source.is_some_and(|card| card.zone.is_in_play()) {
                        return Err(RuleViolation::CannotPayCost { reason: "this card is not in play".into() }.into());
                    }
                }
            }
        }
        Ok(())
    }

    /// Validate first, then commit. A cost that can't be paid leaves the
    /// state exactly as it was.
    pub fn pay_costs(&mut self, effect: &EffectDefinition, ctx: &EffectContext) -> EngineResult<()> {
        self.validate_costs(effect, ctx)?;
        for cost in &effect.costs {
            match cost {
                EffectCost::RestResources(n) => {
                    self.player_mut(ctx.controller)?.rest_resources(*n)?;
                }
                EffectCost::RestThisUnit => self.card_mut(ctx.controller, ctx.source)?.rest(),
                EffectCost::TrashSelf => {
                    let zone = self
                        .player(ctx.controller)?
                        .cards
                        .zone_of(ctx.source)
                        .ok_or(IntegrityError::UnknownInstance(ctx.source))?;
                    self.move_card(ctx.controller, ctx.source, zone, Zone::Trash, false)?;
                }
            }
        }
        Ok(())
    }

    /// Conditions, then costs, then operations.
    pub fn execute_effect(&mut self, effect: &EffectDefinition, ctx: &EffectContext) -> EngineResult<EffectResult> {
        if !self.check_conditions(effect, ctx) {
            return Err(RuleViolation::ConditionsNotMet.into());
        }
        self.pay_costs(effect, ctx)?;
        self.execute_operations(effect, ctx, None)
    }

    /// Runs every operation in order. When a snapshot is given, unit
    /// targets outside it are skipped.
    pub fn execute_operations(
        &mut self,
        effect: &EffectDefinition,
        ctx: &EffectContext,
        snapshot: Option<&[CardInstanceID]>,
    ) -> EngineResult<EffectResult> {
        let mut result = EffectResult::default();
        for operation in &effect.operations {
            self.execute_operation(operation, ctx, snapshot, &mut result)?;
            if self.is_game_over() {
                break;
            }
        }
        debug!("effect: '{}' finished with {:?}", effect.description, result);
        Ok(result)
    }

    fn execute_operation(
        &mut self,
        op: &EffectOperation,
        ctx: &EffectContext,
        snapshot: Option<&[CardInstanceID]>,
        result: &mut EffectResult,
    ) -> EngineResult<()> {
        match op.operation {
            Operation::Draw(n) => {
                for player in self.player_targets(op.target, ctx) {
                    result.cards_drawn += self.draw_cards(player, n as usize)? as u32;
                }
            }
            Operation::DealDamageToPlayer(n) => {
                for player in self.player_targets(op.target, ctx) {
                    let hit = self.deal_damage_to_player(player, n, DamageSource::Effect(ctx.source))?;
                    result.shields_broken += hit.shields_broken;
                    result.damage_dealt += hit.base_damage;
                }
            }
            Operation::DealDamageToUnit(n) => {
                for (owner, id) in self.unit_targets(op.target, ctx, snapshot) {
                    result.damage_dealt += n;
                    result.affected.push(id);
                    if self.deal_damage_to_unit(owner, id, n, DamageSource::Effect(ctx.source))? {
                        result.units_destroyed.push(id);
                    }
                }
            }
            Operation::DestroyUnit => {
                for (owner, id) in self.unit_targets(op.target, ctx, snapshot) {
                    self.destroy_unit(owner, id)?;
                    result.affected.push(id);
                    result.units_destroyed.push(id);
                }
            }
            Operation::GiveAp(amount) | Operation::GiveHp(amount) => {
                let stat = match op.operation {
                    Operation::GiveAp(_) => ModifierStat::Ap,
                    _ => ModifierStat::Hp,
                };
                for (owner, id) in self.unit_targets(op.target, ctx, snapshot) {
                    self.card_mut(owner, id)?.modifiers.push(ActiveModifier {
                        stat,
                        amount,
                        duration: op.duration,
                        source: ctx.source,
                    });
                    result.affected.push(id);
                    match stat {
                        ModifierStat::Ap => result.ap_granted += amount,
                        _ => result.hp_granted += amount,
                    }
                    if stat == ModifierStat::Hp && self.check_lethal(owner, id)? {
                        result.units_destroyed.push(id);
                    }
                }
            }
            Operation::GrantKeyword(keyword, value) => {
                for (owner, id) in self.unit_targets(op.target, ctx, snapshot) {
                    self.card_mut(owner, id)?
                        .temporary_keywords
                        .push(KeywordInstance::new(keyword, value));
                    result.affected.push(id);
                    result.keywords_granted += 1;
                }
            }
            Operation::Negate => {
                let opponents = self.opponents_of(ctx.controller);
                if let Some(negated) = self.effect_stack.cancel_next_owned_by(&opponents) {
                    info!("effect: negated '{}' from {:?}", negated.effect.description, negated.source);
                    result.negated += 1;
                }
            }
        }
        Ok(())
    }

    fn player_targets(&self, target: TargetScope, ctx: &EffectContext) -> Vec<PlayerID> {
        match target {
            TargetScope::YourPlayer => vec![ctx.controller],
            TargetScope::OpponentPlayer => self.opponent_of(ctx.controller).into_iter().collect(),
            _ => {
                warn!("effect: {:?} does not name a player", target);
                vec![]
            }
        }
    }

    fn unit_targets(
        &self,
        target: TargetScope,
        ctx: &EffectContext,
        snapshot: Option<&[CardInstanceID]>,
    ) -> Vec<(PlayerID, CardInstanceID)> {
        let units_of = |players: Vec<PlayerID>| -> Vec<(PlayerID, CardInstanceID)> {
            players
                .into_iter()
                .filter_map(|p| self.player(p).ok())
                .flat_map(|p| p.zone(Zone::BattleArea).iter().map(move |card| (p.id, card.id)))
                .collect()
        };
        let in_battle_area = |id: Option<CardInstanceID>| -> Vec<(PlayerID, CardInstanceID)> {
            id.and_then(|id| self.find_card(id))
                .filter(|(_, zone, _)| *zone == Zone::BattleArea)
                .map(|(owner, _, card)| vec![(owner, card.id)])
                .unwrap_or_default()
        };

        let candidates = match target {
            TargetScope::This => in_battle_area(Some(ctx.source)),
            TargetScope::TargetUnit => in_battle_area(ctx.target),
            TargetScope::YourUnits => units_of(vec![ctx.controller]),
            TargetScope::EnemyUnits => units_of(self.opponents_of(ctx.controller)),
            TargetScope::AllUnits => units_of(self.player_ids()),
            TargetScope::YourPlayer | TargetScope::OpponentPlayer => vec![],
        };

        match snapshot {
            Some(snapshot) => candidates
                .into_iter()
                .filter(|(_, id)| snapshot.contains(id))
                .collect(),
            None => candidates,
        }
    }

    /// Activates an ActivateMain or ActivateAction ability of a card in
    /// play. Costs are paid now; the effect itself goes on the stack.
    pub fn activate_ability(
        &mut self,
        player: PlayerID,
        card: CardInstanceID,
        effect_index: usize,
        target: Option<CardInstanceID>,
    ) -> EngineResult<()> {
        let database = self.database.clone();
        let instance = self.player(player)?.cards.get(card).ok_or(RuleViolation::CardNotFound)?;
        if !instance.zone.is_in_play() {
            return Err(RuleViolation::NotInBattleArea.into());
        }
        let definition = database.require(&instance.card_number)?;
        let effect = definition.effects.get(effect_index).ok_or(RuleViolation::NoSuchAbility)?;

        let step = self.current_step();
        let timing_ok = match effect.timing {
            EffectTiming::ActivateMain => step == Some(TurnStep::Main) && self.is_turn_side(player),
            EffectTiming::ActivateAction => matches!(step, Some(TurnStep::Main) | Some(TurnStep::Action)),
            _ => false,
        };
        if !timing_ok {
            return Err(RuleViolation::WrongTiming.into());
        }

        let ctx = EffectContext { source: card, controller: player, target };
        if !self.check_conditions(effect, &ctx) {
            return Err(RuleViolation::ConditionsNotMet.into());
        }
        self.pay_costs(effect, &ctx)?;
        if let Ok(instance) = self.card_mut(player, card) {
            instance.activations_this_turn += 1;
        }
        info!("effect: {:?} activated '{}'", player, effect.description);
        self.push_activated_effect(card, player, effect.clone(), target);
        Ok(())
    }

    /// Puts every effect of `card_number` with the given timing on the stack.
    pub fn trigger_effects(
        &mut self,
        source: CardInstanceID,
        card_number: &str,
        owner: PlayerID,
        timing: EffectTiming,
        target: Option<CardInstanceID>,
    ) -> EngineResult<usize> {
        let database = self.database.clone();
        let definition = database.require(card_number)?;
        let mut pushed = 0;
        for effect in definition.effects_with_timing(timing) {
            self.push_effect(source, owner, effect.clone(), target);
            pushed += 1;
        }
        Ok(pushed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;

    fn ctx(game: &mut Game, player: PlayerID) -> EffectContext {
        let source = give_card(game, player, "UNIT-3-4", Zone::BattleArea);
        EffectContext { source, controller: player, target: None }
    }

    #[test]
    fn conditions_are_anded() {
        let mut game = started_game();
        let p0 = PlayerID::from_raw(0);
        let ctx = ctx(&mut game, p0);
        let effect = EffectDefinition::new(EffectTiming::OnPlay, "test")
            .when(EffectCondition::YourTurn)
            .when(EffectCondition::HasUnitsInPlay(1));
        assert!(game.check_conditions(&effect, &ctx));

        let effect = effect.when(EffectCondition::OpponentTurn);
        assert!(!game.check_conditions(&effect, &ctx));
    }

    #[test]
    fn cost_payment_is_atomic() {
        let mut game = started_game();
        let p0 = PlayerID::from_raw(0);
        let ctx = ctx(&mut game, p0);
        give_card(&mut game, p0, "RES", Zone::ResourceArea);
        game.card_mut(p0, ctx.source).unwrap().activate();

        // The unit can be rested but two resources are not there.
        let effect = EffectDefinition::new(EffectTiming::ActivateMain, "test")
            .cost(EffectCost::RestThisUnit)
            .cost(EffectCost::RestResources(2));
        let before = game.player(p0).unwrap().cards.clone();
        assert!(game.pay_costs(&effect, &ctx).is_err());
        assert_eq!(game.player(p0).unwrap().cards, before);

        let effect = EffectDefinition::new(EffectTiming::ActivateMain, "test")
            .cost(EffectCost::RestThisUnit)
            .cost(EffectCost::RestResources(1));
        game.pay_costs(&effect, &ctx).unwrap();
        assert!(!game.card(p0, ctx.source).unwrap().active);
        assert_eq!(game.player(p0).unwrap().active_resource_count(), 0);
    }

    #[test]
    fn operations_run_in_order_and_accumulate() {
        let mut game = started_game();
        let p0 = PlayerID::from_raw(0);
        let p1 = PlayerID::from_raw(1);
        let ctx = ctx(&mut game, p0);
        let enemy = give_card(&mut game, p1, "UNIT-3-4", Zone::BattleArea);
        let hand_before = game.player(p0).unwrap().hand_size();

        let effect = EffectDefinition::new(EffectTiming::OnPlay, "test")
            .then(EffectOperation::new(Operation::Draw(2), TargetScope::YourPlayer))
            .then(EffectOperation::new(Operation::GiveAp(2), TargetScope::This))
            .then(EffectOperation::new(Operation::DealDamageToUnit(4), TargetScope::EnemyUnits));
        let result = game.execute_effect(&effect, &ctx).unwrap();

        assert_eq!(result.cards_drawn, 2);
        assert_eq!(result.ap_granted, 2);
        assert_eq!(result.units_destroyed, vec![enemy]);
        assert_eq!(game.player(p0).unwrap().hand_size(), hand_before + 2);
        assert_eq!(game.zone_count(p1, Zone::BattleArea).unwrap(), 0);
        let def = game.database.require("UNIT-3-4").unwrap().clone();
        assert_eq!(game.card(p0, ctx.source).unwrap().effective_ap(&def), 5);
    }

    #[test]
    fn unmet_conditions_pay_nothing() {
        let mut game = started_game();
        let p0 = PlayerID::from_raw(0);
        let ctx = ctx(&mut game, p0);
        give_card(&mut game, p0, "RES", Zone::ResourceArea);
        let effect = EffectDefinition::new(EffectTiming::OnPlay, "test")
            .when(EffectCondition::OpponentTurn)
            .cost(EffectCost::RestResources(1));
        let err = game.execute_effect(&effect, &ctx).unwrap_err();
        assert_eq!(err, RuleViolation::ConditionsNotMet.into());
        assert_eq!(game.player(p0).unwrap().active_resource_count(), 1);
    }

    #[test]
    fn continuous_means_lasting_group_stat_change() {
        let buff_all = EffectDefinition::new(EffectTiming::OnDeploy, "buff")
            .then(EffectOperation::new(Operation::GiveAp(1), TargetScope::YourUnits));
        assert!(buff_all.is_continuous());

        let buff_one = EffectDefinition::new(EffectTiming::OnDeploy, "buff")
            .then(EffectOperation::new(Operation::GiveAp(1), TargetScope::TargetUnit));
        assert!(!buff_one.is_continuous());

        let forever = EffectDefinition::new(EffectTiming::OnDeploy, "buff").then(
            EffectOperation::new(Operation::GiveAp(1), TargetScope::YourUnits).lasting(ModifierDuration::Permanent),
        );
        assert!(!forever.is_continuous());
    }

    #[test]
    fn granted_keywords_are_temporary() {
        let mut game = started_game();
        let p0 = PlayerID::from_raw(0);
        let ctx = ctx(&mut game, p0);
        let effect = EffectDefinition::new(EffectTiming::OnPlay, "test")
            .then(EffectOperation::new(Operation::GrantKeyword(Keyword::Blocker, 0), TargetScope::This));
        game.execute_effect(&effect, &ctx).unwrap();
        assert_eq!(game.card(p0, ctx.source).unwrap().temporary_keywords.len(), 1);
    }
}
