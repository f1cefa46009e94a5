//! Effect templates the card list is built from.

use crate::engine::prelude::*;

pub fn draw(timing: EffectTiming, count: u32) -> EffectDefinition {
    EffectDefinition::new(timing, format!("Draw {}", count))
        .then(EffectOperation::new(Operation::Draw(count), TargetScope::YourPlayer))
}

pub fn burst_draw(count: u32) -> EffectDefinition {
    draw(EffectTiming::Burst, count)
}

/// Damage to the unit named when the card was played.
pub fn strike_unit(timing: EffectTiming, damage: u32) -> EffectDefinition {
    EffectDefinition::new(timing, format!("Deal {} damage to an enemy Unit", damage))
        .then(EffectOperation::new(Operation::DealDamageToUnit(damage), TargetScope::TargetUnit))
}

pub fn rally(ap: i32) -> EffectDefinition {
    EffectDefinition::new(EffectTiming::OnPlay, format!("All your Units get AP+{} during this turn", ap))
        .then(EffectOperation::new(Operation::GiveAp(ap), TargetScope::YourUnits))
        .during_this_turn()
}

pub fn reinforce(hp: i32) -> EffectDefinition {
    EffectDefinition::new(EffectTiming::OnPlay, format!("Target Unit gets HP+{} during this turn", hp))
        .then(EffectOperation::new(Operation::GiveHp(hp), TargetScope::TargetUnit))
}

/// 【Activate･Main】 rest resources for a battle-long AP boost.
pub fn overdrive(cost: u32, ap: i32) -> EffectDefinition {
    EffectDefinition::new(EffectTiming::ActivateMain, format!("Rest {}: This Unit gets AP+{} during this turn", cost, ap))
        .cost(EffectCost::RestResources(cost))
        .then(EffectOperation::new(Operation::GiveAp(ap), TargetScope::This))
}

pub fn jamming(cost: u32) -> EffectDefinition {
    EffectDefinition::new(EffectTiming::ActivateAction, "Negate the next enemy effect")
        .when(EffectCondition::OpponentTurn)
        .cost(EffectCost::RestResources(cost))
        .then(EffectOperation::new(Operation::Negate, TargetScope::OpponentPlayer))
}

pub fn paired_blocker() -> EffectDefinition {
    EffectDefinition::new(EffectTiming::WhenPaired, "Gains Blocker during this turn")
        .then(EffectOperation::new(Operation::GrantKeyword(Keyword::Blocker, 0), TargetScope::This))
}

pub fn parting_shot(damage: u32) -> EffectDefinition {
    EffectDefinition::new(EffectTiming::OnDestroyed, format!("Deal {} damage to the opponent", damage))
        .then(EffectOperation::new(Operation::DealDamageToPlayer(damage), TargetScope::OpponentPlayer))
}
