use std::fmt::Display;

use super::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    Start,
    Draw,
    Resource,
    Main,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnStep {
    Active,
    Start,
    Draw,
    Resource,
    Main,
    Action,
    End,
    Hand,
    Cleanup,
}

impl TurnStep {
    pub fn phase(self) -> TurnPhase {
        use TurnStep::*;
        match self {
            Active | Start => TurnPhase::Start,
            Draw => TurnPhase::Draw,
            Resource => TurnPhase::Resource,
            Main => TurnPhase::Main,
            Action | End | Hand | Cleanup => TurnPhase::End,
        }
    }

    /// Every step but Main moves on by itself once the timer runs out.
    pub fn auto_advances(self) -> bool {
        self != TurnStep::Main
    }

    /// The following step of the same turn, `None` after Cleanup.
    pub fn next(self) -> Option<TurnStep> {
        let pos = DEFAULT_TURN_STRUCTURE.iter().position(|step| *step == self)?;
        DEFAULT_TURN_STRUCTURE.get(pos + 1).copied()
    }
}

impl Display for TurnStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub const DEFAULT_TURN_STRUCTURE: [TurnStep; 9] = [
    TurnStep::Active,
    TurnStep::Start,
    TurnStep::Draw,
    TurnStep::Resource,
    TurnStep::Main,
    TurnStep::Action,
    TurnStep::End,
    TurnStep::Hand,
    TurnStep::Cleanup,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(PlayerID),
    NoWinner,
    Draw,
}

impl GameOutcome {
    /// Integer form used on the wire: the winner's index, -1 for no winner
    /// and -2 for a draw.
    pub fn code(self) -> i64 {
        match self {
            GameOutcome::Winner(id) => id.raw() as i64,
            GameOutcome::NoWinner => -1,
            GameOutcome::Draw => -2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    NotStarted,
    InProgress(TurnStep),
    GameOver(GameOutcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameRule {
    /// Damage reached HP
    LethalDamage,
    /// Took damage with no shields left and the base went down
    BaseDestroyed,
    /// Had to draw from an empty deck
    CouldntDraw,
    /// Took damage with no shields and no base at all
    NoBase,
}

/// Notifications sent to whoever subscribed to the game. They describe what
/// already happened; nothing listens to them to change the outcome.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// Setup finished and the first turn is about to begin
    GameStarted,

    TurnStarted { turn: u32, player: PlayerID },

    TurnEnded { turn: u32, player: PlayerID },

    ActivePlayerChanged(PlayerID),

    /// The turn moved into the given step
    PhaseChanged(TurnStep),

    /// A card left `from` and arrived in `to`
    CardMoved { player: PlayerID, card: CardInstanceID, from: Zone, to: Zone },

    AttackDeclared { attacker: CardInstanceID, attacking_player: PlayerID, defending_player: PlayerID },

    BlockerDeclared { attack_index: usize, blocker: CardInstanceID },

    /// High-Maneuver turned the attack into a miss
    AttackEvaded { attack_index: usize, unit: CardInstanceID },

    DamageDealt { player: PlayerID, card: CardInstanceID, amount: u32, source: DamageSource },

    ShieldsBroken { player: PlayerID, count: usize },

    UnitDestroyed { player: PlayerID, card: CardInstanceID },

    BaseDestroyed { player: PlayerID, card: CardInstanceID },

    EffectResolved { source: CardInstanceID, owner: PlayerID, description: String },

    /// A Pilot was attached to a Link Unit
    Paired { player: PlayerID, unit: CardInstanceID, pilot: CardInstanceID },

    PlayerLost(PlayerID, GameRule),

    GameEnded(GameOutcome),
}
