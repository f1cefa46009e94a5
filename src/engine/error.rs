//! Failure types of the rules engine.
//!
//! A [`RuleViolation`] is an ordinary "you can't do that right now" answer
//! and its `Display` text is what a player gets to see. An
//! [`IntegrityError`] means the caller and the engine disagree about what
//! exists, which is a bug in the host rather than a game situation.

use thiserror::Error;

use super::prelude::*;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Game is not in progress")]
    GameNotInProgress,

    #[error("Game has already started")]
    GameAlreadyStarted,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Only the defending player can respond to this attack")]
    NotDefendingPlayer,

    #[error("Can only play cards during Main Phase")]
    NotMainPhase,

    #[error("Can only attack during Main Phase")]
    AttackOutsideMainPhase,

    #[error("Insufficient Lv (card requires Lv {required}, you have Lv {have})")]
    InsufficientLevel { required: u32, have: u32 },

    #[error("Insufficient resources (need {need}, have {have})")]
    InsufficientResources { need: u32, have: u32 },

    #[error("Battle Area is full (max {max} Units)")]
    BattleAreaFull { max: usize },

    #[error("Can only have 1 Base (replace EX Base first)")]
    BaseSectionOccupied,

    #[error("Resource Area is full (max {max})")]
    ResourceAreaFull { max: usize },

    #[error("Already placed a resource this turn")]
    ResourceAlreadyPlaced,

    #[error("Resource Deck is empty")]
    ResourceDeckEmpty,

    #[error("Can only discard cards from hand")]
    NotInHand,

    #[error("{card_type} cards cannot be played from hand")]
    UnplayableType { card_type: CardType },

    #[error("Card not found")]
    CardNotFound,

    #[error("Card is not in hand")]
    CardNotInHand,

    #[error("Cannot pass priority in current phase")]
    CannotPassNow,

    #[error("Card is already in {zone}")]
    SameZone { zone: Zone },

    #[error("Card is not in {zone}")]
    CardNotInZone { zone: Zone },

    #[error("{zone} does not accept {card_type} cards")]
    ZoneRejectsType { zone: Zone, card_type: CardType },

    #[error("{zone} is full")]
    ZoneFull { zone: Zone },

    #[error("{zone} cannot be shuffled")]
    NotShuffleable { zone: Zone },

    #[error("{zone} has no top card")]
    NotOrdered { zone: Zone },

    #[error("Card is not in Battle Area")]
    NotInBattleArea,

    #[error("Attacker not found")]
    AttackerNotFound,

    #[error("Only Units can attack")]
    OnlyUnitsAttack,

    #[error("Unit is rested")]
    UnitRested,

    #[error("Unit has summoning sickness (deployed this turn)")]
    SummoningSickness,

    #[error("Unit has already attacked this turn")]
    AlreadyAttacked,

    #[error("Cannot attack a teammate")]
    CannotAttackTeammate,

    #[error("Invalid attack index")]
    InvalidAttackIndex,

    #[error("Attack has already been resolved")]
    AttackResolved,

    #[error("Attack is already blocked")]
    AlreadyBlocked,

    #[error("Blocker not found")]
    BlockerNotFound,

    #[error("Only Units can block")]
    OnlyUnitsBlock,

    #[error("Unit is rested and does not have Blocker keyword")]
    RestedWithoutBlocker,

    #[error("Cannot block for an opponent")]
    CannotBlockForOpponent,

    #[error("Unit does not have {keyword}")]
    MissingKeyword { keyword: Keyword },

    #[error("Attack has already been evaded")]
    AttackEvaded,

    #[error("Only the Unit blocking this attack can evade it")]
    NotEngagedInAttack,

    #[error("{name} is not a Link Unit")]
    NotALinkUnit { name: String },

    #[error("{name} is not a Pilot")]
    NotAPilot { name: String },

    #[error("{name} is already paired")]
    AlreadyPaired { name: String },

    #[error("{name} is not a valid Pilot for this Link Unit")]
    WrongPilot { name: String },

    #[error("{name} does not meet color requirement")]
    ColorRequirement { name: String },

    #[error("{name} does not meet trait requirement")]
    TraitRequirement { name: String },

    #[error("Card has no such ability")]
    NoSuchAbility,

    #[error("Ability cannot be activated now")]
    WrongTiming,

    #[error("Effect conditions are not met")]
    ConditionsNotMet,

    #[error("Cannot pay cost: {reason}")]
    CannotPayCost { reason: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("no card instance {0} in any zone")]
    UnknownInstance(CardInstanceID),

    #[error("card number '{0}' is not in the card database")]
    UnknownCard(CardNumber),

    #[error("no player with id {0}")]
    UnknownPlayer(PlayerID),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

impl EngineError {
    pub fn is_integrity(&self) -> bool {
        matches!(self, EngineError::Integrity(_))
    }

    pub fn as_rule(&self) -> Option<&RuleViolation> {
        match self {
            EngineError::Rule(rule) => Some(rule),
            EngineError::Integrity(_) => None,
        }
    }
}

pub type RuleResult<T> = Result<T, RuleViolation>;
pub type EngineResult<T> = Result<T, EngineError>;

/// Flat success/message pair for hosts that only relay text to a player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

impl<T> From<EngineResult<T>> for ActionOutcome {
    fn from(result: EngineResult<T>) -> Self {
        match result {
            Ok(_) => ActionOutcome::ok("OK"),
            Err(e) => ActionOutcome::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_player_facing_text() {
        let e = RuleViolation::InsufficientLevel { required: 4, have: 2 };
        assert_eq!(e.to_string(), "Insufficient Lv (card requires Lv 4, you have Lv 2)");

        let e = RuleViolation::BattleAreaFull { max: 6 };
        assert_eq!(e.to_string(), "Battle Area is full (max 6 Units)");
    }

    #[test]
    fn outcome_from_result() {
        let failed: EngineResult<()> = Err(RuleViolation::NotYourTurn.into());
        assert_eq!(ActionOutcome::from(failed), ActionOutcome::failed("Not your turn"));

        let ok: EngineResult<u32> = Ok(3);
        assert!(ActionOutcome::from(ok).success);
    }

    #[test]
    fn integrity_is_distinguished() {
        let e: EngineError = IntegrityError::UnknownCard("GD01-999".into()).into();
        assert!(e.is_integrity());
        assert!(e.as_rule().is_none());
    }
}
