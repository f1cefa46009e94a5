//! Keyword rules as plain queries.
//!
//! Nothing in here mutates game state. Combat and the turn machine ask these
//! functions how a keyword changes an outcome and then do the mutation
//! themselves.

use std::fmt::Display;

use super::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Keyword {
    /// Recovers damage at the end of its controller's turn.
    Repair,
    /// Breaks extra shields when it destroys a blocker.
    Breach,
    /// Lends AP to a friendly attacker.
    Support,
    /// May block while rested.
    Blocker,
    /// Deals its combat damage before the other side.
    FirstStrike,
    /// Can evade an attack by resting a resource.
    HighManeuver,
    /// Breaks every remaining shield at once.
    Suppression,
    /// Goes to hand and fires its effect when broken as a shield.
    Burst,
    /// Ignores summoning sickness while paired with a Pilot.
    LinkUnit,
}

impl Keyword {
    pub const ALL: [Keyword; 9] = [
        Keyword::Repair,
        Keyword::Breach,
        Keyword::Support,
        Keyword::Blocker,
        Keyword::FirstStrike,
        Keyword::HighManeuver,
        Keyword::Suppression,
        Keyword::Burst,
        Keyword::LinkUnit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Keyword::Repair => "Repair",
            Keyword::Breach => "Breach",
            Keyword::Support => "Support",
            Keyword::Blocker => "Blocker",
            Keyword::FirstStrike => "First Strike",
            Keyword::HighManeuver => "High-Maneuver",
            Keyword::Suppression => "Suppression",
            Keyword::Burst => "Burst",
            Keyword::LinkUnit => "Link Unit",
        }
    }

    /// Stacking keywords add their values together across every source.
    /// The rest only care whether they are present.
    pub fn does_stack(self) -> bool {
        matches!(self, Keyword::Repair | Keyword::Breach | Keyword::Support)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeywordInstance {
    pub keyword: Keyword,
    pub value: u32,
}

impl KeywordInstance {
    pub fn new(keyword: Keyword, value: u32) -> Self {
        Self { keyword, value }
    }

    pub fn flag(keyword: Keyword) -> Self {
        Self { keyword, value: 0 }
    }
}

impl Display for KeywordInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.keyword.does_stack() {
            write!(f, "{} {}", self.keyword, self.value)
        } else {
            write!(f, "{}", self.keyword)
        }
    }
}

/// Which side of a blocked attack strikes first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatSide {
    Attacker,
    Blocker,
}

fn keywords_of<'a>(
    card: &'a CardInstance,
    definition: &'a CardDefinition,
) -> impl Iterator<Item = &'a KeywordInstance> {
    definition.keywords.iter().chain(card.temporary_keywords.iter())
}

pub fn has_keyword(card: &CardInstance, definition: &CardDefinition, keyword: Keyword) -> bool {
    keywords_of(card, definition).any(|k| k.keyword == keyword)
}

/// Summed value for stacking keywords, 1 or 0 for the others.
pub fn keyword_value(card: &CardInstance, definition: &CardDefinition, keyword: Keyword) -> u32 {
    if keyword.does_stack() {
        keywords_of(card, definition)
            .filter(|k| k.keyword == keyword)
            .map(|k| k.value)
            .sum()
    } else {
        has_keyword(card, definition, keyword) as u32
    }
}

/// How much damage Repair would remove right now.
pub fn repair_amount(card: &CardInstance, definition: &CardDefinition) -> u32 {
    keyword_value(card, definition, Keyword::Repair).min(card.damage)
}

pub fn can_block_while_rested(card: &CardInstance, definition: &CardDefinition) -> bool {
    has_keyword(card, definition, Keyword::Blocker)
}

/// First Strike only matters when exactly one side has it.
pub fn first_strike_advantage(
    attacker: (&CardInstance, &CardDefinition),
    blocker: (&CardInstance, &CardDefinition),
) -> Option<CombatSide> {
    let attacker_has = has_keyword(attacker.0, attacker.1, Keyword::FirstStrike);
    let blocker_has = has_keyword(blocker.0, blocker.1, Keyword::FirstStrike);
    match (attacker_has, blocker_has) {
        (true, false) => Some(CombatSide::Attacker),
        (false, true) => Some(CombatSide::Blocker),
        _ => None,
    }
}

/// Shields an unblocked attack breaks before touching the base: every
/// remaining one under Suppression, otherwise one.
pub fn shields_to_break(
    card: &CardInstance,
    definition: &CardDefinition,
    remaining_shields: usize,
) -> usize {
    if has_keyword(card, definition, Keyword::Suppression) {
        remaining_shields
    } else {
        remaining_shields.min(1)
    }
}

/// Whether the unit ignores summoning sickness right now.
pub fn ignores_summoning_sickness(card: &CardInstance, definition: &CardDefinition) -> bool {
    has_keyword(card, definition, Keyword::LinkUnit) && card.paired_with.is_some()
}
