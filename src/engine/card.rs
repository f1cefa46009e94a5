use std::fmt::Display;

use crate::engine::prelude::*;

use super::util::id::{GlobalIDCounter, ID};

pub type CardInstanceID = ID<CardInstance>;
pub type CardNumber = String;

static INSTANCE_IDS: GlobalIDCounter = GlobalIDCounter::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CardType {
    Unit,
    Pilot,
    Command,
    Base,
    Resource,
    Token,
}

impl Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CardColor {
    White,
    Blue,
    Green,
    Red,
    Black,
    Yellow,
    Colorless,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    ExBase,
    ExResource,
}

impl TokenKind {
    pub fn card_number(self) -> &'static str {
        match self {
            TokenKind::ExBase => "EXBase",
            TokenKind::ExResource => "EXResource",
        }
    }
}

/// Static card data, looked up by card number. Never changes during a game.
#[derive(Clone, Debug, PartialEq)]
pub struct CardDefinition {
    pub card_number: CardNumber,
    pub name: String,
    pub card_type: CardType,
    pub colors: Vec<CardColor>,
    pub level: u32,
    pub cost: u32,
    pub ap: u32,
    pub hp: u32,
    pub keywords: Vec<KeywordInstance>,
    pub effects: Vec<EffectDefinition>,
    pub traits: Vec<String>,
    pub link_requirement: Option<LinkRequirement>,
    pub is_token: bool,
    pub text: String,
}

impl CardDefinition {
    pub fn new(card_number: impl Into<CardNumber>, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            card_number: card_number.into(),
            name: name.into(),
            card_type,
            colors: vec![],
            level: 0,
            cost: 0,
            ap: 0,
            hp: 0,
            keywords: vec![],
            effects: vec![],
            traits: vec![],
            link_requirement: None,
            is_token: false,
            text: String::new(),
        }
    }

    pub fn unit(card_number: impl Into<CardNumber>, name: impl Into<String>, level: u32, cost: u32, ap: u32, hp: u32) -> Self {
        Self {
            level,
            cost,
            ap,
            hp,
            ..Self::new(card_number, name, CardType::Unit)
        }
    }

    pub fn base(card_number: impl Into<CardNumber>, name: impl Into<String>, level: u32, cost: u32, hp: u32) -> Self {
        Self {
            level,
            cost,
            hp,
            ..Self::new(card_number, name, CardType::Base)
        }
    }

    pub fn command(card_number: impl Into<CardNumber>, name: impl Into<String>, level: u32, cost: u32) -> Self {
        Self {
            level,
            cost,
            ..Self::new(card_number, name, CardType::Command)
        }
    }

    pub fn pilot(card_number: impl Into<CardNumber>, name: impl Into<String>, level: u32, cost: u32) -> Self {
        Self {
            level,
            cost,
            ..Self::new(card_number, name, CardType::Pilot)
        }
    }

    pub fn with_color(mut self, color: CardColor) -> Self {
        self.colors.push(color);
        self
    }

    pub fn with_keyword(mut self, keyword: Keyword, value: u32) -> Self {
        self.keywords.push(KeywordInstance::new(keyword, value));
        self
    }

    pub fn with_effect(mut self, effect: EffectDefinition) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        self.traits.push(name.into());
        self
    }

    pub fn with_link(mut self, requirement: LinkRequirement) -> Self {
        self.link_requirement = Some(requirement);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn as_token(mut self) -> Self {
        self.is_token = true;
        self
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t == name)
    }

    pub fn is_colorless(&self) -> bool {
        self.colors.iter().all(|c| *c == CardColor::Colorless)
    }

    pub fn effects_with_timing(&self, timing: EffectTiming) -> impl Iterator<Item = &EffectDefinition> {
        self.effects.iter().filter(move |e| e.timing == timing)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModifierStat {
    Ap,
    Hp,
    Cost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModifierDuration {
    UntilEndOfTurn,
    UntilEndOfBattle,
    WhileInPlay,
    Permanent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveModifier {
    pub stat: ModifierStat,
    pub amount: i32,
    pub duration: ModifierDuration,
    pub source: CardInstanceID,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageSource {
    Battle(CardInstanceID),
    Effect(CardInstanceID),
    Shield,
}

/// A physical card during a game. Everything that changes lives here.
#[derive(Clone, Debug, PartialEq)]
pub struct CardInstance {
    pub id: CardInstanceID,
    pub card_number: CardNumber,
    pub owner: PlayerID,
    pub controller: PlayerID,
    pub zone: Zone,
    pub active: bool,
    pub damage: u32,
    pub turn_deployed: Option<u32>,
    pub attacked_this_turn: bool,
    pub activations_this_turn: u32,
    pub modifiers: Vec<ActiveModifier>,
    pub attached: Vec<CardInstance>,
    pub paired_with: Option<CardInstanceID>,
    pub temporary_keywords: Vec<KeywordInstance>,
    pub last_damage_source: Option<DamageSource>,
    pub token: Option<TokenKind>,
}

impl CardInstance {
    /// Creates a fresh instance with a never before used id.
    pub fn new(card_number: CardNumber, owner: PlayerID) -> Self {
        Self {
            id: INSTANCE_IDS.next(),
            card_number,
            owner,
            controller: owner,
            zone: Zone::Deck,
            active: true,
            damage: 0,
            turn_deployed: None,
            attacked_this_turn: false,
            activations_this_turn: 0,
            modifiers: vec![],
            attached: vec![],
            paired_with: None,
            temporary_keywords: vec![],
            last_damage_source: None,
            token: None,
        }
    }

    pub fn token(kind: TokenKind, owner: PlayerID) -> Self {
        Self {
            token: Some(kind),
            ..Self::new(kind.card_number().into(), owner)
        }
    }

    pub fn is_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_ex_resource(&self) -> bool {
        self.token == Some(TokenKind::ExResource)
    }

    pub fn is_ex_base(&self) -> bool {
        self.token == Some(TokenKind::ExBase)
    }

    pub fn rest(&mut self) {
        self.active = false;
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn modifier_total(&self, stat: ModifierStat) -> i32 {
        self.modifiers
            .iter()
            .filter(|m| m.stat == stat)
            .map(|m| m.amount)
            .sum()
    }

    pub fn effective_ap(&self, definition: &CardDefinition) -> u32 {
        apply_modifier(definition.ap, self.modifier_total(ModifierStat::Ap))
    }

    pub fn effective_hp(&self, definition: &CardDefinition) -> u32 {
        apply_modifier(definition.hp, self.modifier_total(ModifierStat::Hp))
    }

    pub fn effective_cost(&self, definition: &CardDefinition) -> u32 {
        apply_modifier(definition.cost, self.modifier_total(ModifierStat::Cost))
    }

    pub fn is_lethally_damaged(&self, definition: &CardDefinition) -> bool {
        self.damage >= self.effective_hp(definition)
    }

    pub fn take_damage(&mut self, amount: u32, source: DamageSource) {
        self.damage += amount;
        self.last_damage_source = Some(source);
    }

    /// Heals up to `amount` and returns what was actually removed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let healed = amount.min(self.damage);
        self.damage -= healed;
        healed
    }

    /// Resets the per-turn flags at the start of its controller's turn.
    pub fn reset_turn_flags(&mut self) {
        self.attacked_this_turn = false;
        self.activations_this_turn = 0;
    }

    /// Forgets everything that happened to the card while in play.
    pub fn clear_transient_state(&mut self) {
        self.active = false;
        self.damage = 0;
        self.modifiers.clear();
        self.temporary_keywords.clear();
        self.paired_with = None;
        self.last_damage_source = None;
        self.turn_deployed = None;
        self.attacked_this_turn = false;
        self.activations_this_turn = 0;
        self.controller = self.owner;
    }

    /// Drops modifiers matching the predicate, returning how many went.
    pub fn expire_modifiers(&mut self, mut expired: impl FnMut(&ActiveModifier) -> bool) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| !expired(m));
        before - self.modifiers.len()
    }
}

fn apply_modifier(base: u32, delta: i32) -> u32 {
    (base as i64 + delta as i64).max(0) as u32
}
