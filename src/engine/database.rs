//! In-memory card lookup and deck legality.

use std::collections::BTreeMap;

use log::{info, warn};
use thiserror::Error;

use super::prelude::*;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("Deck must contain exactly {expected} cards (found {found})")]
    MainDeckSize { expected: usize, found: usize },

    #[error("Resource Deck must contain exactly {expected} cards (found {found})")]
    ResourceDeckSize { expected: usize, found: usize },

    #[error("Card not found in database: {0}")]
    UnknownCard(CardNumber),

    #[error("Token cards cannot be put in a deck: {0}")]
    TokenInDeck(CardNumber),

    #[error("Base cards limited to {limit} copy: {card} (found {found})")]
    TooManyBases { card: CardNumber, limit: usize, found: usize },

    #[error("Cards limited to {limit} copies: {card} (found {found})")]
    TooManyCopies { card: CardNumber, limit: usize, found: usize },

    #[error("Deck can use at most {limit} colors (found {found})")]
    TooManyColors { limit: usize, found: usize },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub total: usize,
    pub units: usize,
    pub pilots: usize,
    pub commands: usize,
    pub bases: usize,
    pub resources: usize,
    pub tokens: usize,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Card Database: {} total cards ({} Units, {} Pilots, {} Commands, {} Bases, {} Tokens)",
            self.total, self.units, self.pilots, self.commands, self.bases, self.tokens
        )
    }
}

/// Read-only after construction, shared between games behind an `Arc`.
#[derive(Clone, Debug)]
pub struct CardDatabase {
    cards: BTreeMap<CardNumber, CardDefinition>,
    tokens: BTreeMap<CardNumber, CardDefinition>,
}

impl Default for CardDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl CardDatabase {
    pub fn new() -> Self {
        let tokens: BTreeMap<_, _> = token_definitions()
            .into_iter()
            .map(|def| (def.card_number.clone(), def))
            .collect();
        info!("database: initialized {} token definitions", tokens.len());
        Self { cards: BTreeMap::new(), tokens }
    }

    pub fn from_cards(cards: impl IntoIterator<Item = CardDefinition>) -> Self {
        let mut database = Self::new();
        for card in cards {
            database.insert(card);
        }
        info!("database: {}", database.stats());
        database
    }

    pub fn insert(&mut self, definition: CardDefinition) {
        if let Some(old) = self.cards.insert(definition.card_number.clone(), definition) {
            warn!("database: replaced definition of {}", old.card_number);
        }
    }

    /// Tokens are looked up before regular cards.
    pub fn get_card_data(&self, card_number: &str) -> Option<&CardDefinition> {
        self.tokens.get(card_number).or_else(|| self.cards.get(card_number))
    }

    pub fn require(&self, card_number: &str) -> Result<&CardDefinition, IntegrityError> {
        self.get_card_data(card_number)
            .ok_or_else(|| IntegrityError::UnknownCard(card_number.to_string()))
    }

    pub fn card_exists(&self, card_number: &str) -> bool {
        self.get_card_data(card_number).is_some()
    }

    pub fn all_cards(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    pub fn cards_by_type(&self, card_type: CardType) -> Vec<&CardDefinition> {
        self.cards.values().filter(|def| def.card_type == card_type).collect()
    }

    pub fn cards_by_color(&self, color: CardColor) -> Vec<&CardDefinition> {
        self.cards.values().filter(|def| def.colors.contains(&color)).collect()
    }

    /// Every problem with the deck, not just the first one.
    pub fn validate_deck(&self, deck: &DeckList, config: &EngineConfig) -> Result<(), Vec<DeckError>> {
        let mut errors = vec![];

        if deck.main.len() != config.main_deck_size {
            errors.push(DeckError::MainDeckSize { expected: config.main_deck_size, found: deck.main.len() });
        }
        if deck.resources.len() != config.resource_deck_size {
            errors.push(DeckError::ResourceDeckSize {
                expected: config.resource_deck_size,
                found: deck.resources.len(),
            });
        }

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for number in &deck.main {
            *counts.entry(number.as_str()).or_default() += 1;
        }

        let mut colors: Vec<CardColor> = vec![];
        for (number, found) in &counts {
            let Some(def) = self.get_card_data(number) else {
                errors.push(DeckError::UnknownCard(number.to_string()));
                continue;
            };
            if def.is_token {
                errors.push(DeckError::TokenInDeck(number.to_string()));
                continue;
            }
            if def.card_type == CardType::Base && *found > config.max_copies_per_base {
                errors.push(DeckError::TooManyBases {
                    card: number.to_string(),
                    limit: config.max_copies_per_base,
                    found: *found,
                });
            } else if *found > config.max_copies_per_card {
                errors.push(DeckError::TooManyCopies {
                    card: number.to_string(),
                    limit: config.max_copies_per_card,
                    found: *found,
                });
            }
            for color in &def.colors {
                if *color != CardColor::Colorless && !colors.contains(color) {
                    colors.push(*color);
                }
            }
        }
        if colors.len() > config.max_deck_colors {
            errors.push(DeckError::TooManyColors { limit: config.max_deck_colors, found: colors.len() });
        }

        for number in &deck.resources {
            match self.get_card_data(number) {
                None => errors.push(DeckError::UnknownCard(number.clone())),
                Some(def) if def.is_token => errors.push(DeckError::TokenInDeck(number.clone())),
                Some(_) => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn stats(&self) -> DatabaseStats {
        let count = |t: CardType| self.cards.values().filter(|def| def.card_type == t).count();
        DatabaseStats {
            total: self.cards.len(),
            units: count(CardType::Unit),
            pilots: count(CardType::Pilot),
            commands: count(CardType::Command),
            bases: count(CardType::Base),
            resources: count(CardType::Resource),
            tokens: self.tokens.len(),
        }
    }
}

fn token_definitions() -> Vec<CardDefinition> {
    vec![
        CardDefinition::base(TokenKind::ExBase.card_number(), "EX Base", 0, 0, 3)
            .with_color(CardColor::Colorless)
            .with_text("An emergency base used when no Base card is available.")
            .as_token(),
        CardDefinition::new(TokenKind::ExResource.card_number(), "EX Resource", CardType::Resource)
            .with_color(CardColor::Colorless)
            .with_text("An extra resource given to the player going second.")
            .as_token(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database() -> CardDatabase {
        CardDatabase::from_cards([
            CardDefinition::unit("R-1", "Red Unit", 1, 1, 2, 2).with_color(CardColor::Red),
            CardDefinition::unit("B-1", "Blue Unit", 1, 1, 2, 2).with_color(CardColor::Blue),
            CardDefinition::unit("G-1", "Green Unit", 1, 1, 2, 2).with_color(CardColor::Green),
            CardDefinition::base("BASE-1", "Base", 2, 2, 5).with_color(CardColor::Red),
            CardDefinition::new("RES", "Resource", CardType::Resource),
        ])
    }

    fn resources() -> Vec<CardNumber> {
        vec!["RES".to_string(); 10]
    }

    #[test]
    fn tokens_are_always_there() {
        let db = CardDatabase::new();
        let ex_base = db.require("EXBase").unwrap();
        assert_eq!(ex_base.card_type, CardType::Base);
        assert_eq!((ex_base.cost, ex_base.ap, ex_base.hp), (0, 0, 3));
        assert!(ex_base.is_token);
        assert!(db.card_exists("EXResource"));
        assert_eq!(db.require("nope"), Err(IntegrityError::UnknownCard("nope".into())));
    }

    #[test]
    fn legal_deck() {
        let mut db = database();
        for i in 0..11 {
            db.insert(CardDefinition::unit(format!("C-{:02}", i), "Colorless Unit", 1, 1, 1, 1));
        }
        let mut deck = DeckList::new(vec![], resources());
        deck.add("R-1", 4);
        deck.add("B-1", 4);
        deck.add("BASE-1", 1);
        for i in 0..10 {
            deck.add(format!("C-{:02}", i), 4);
        }
        deck.add("C-10", 1);
        let config = EngineConfig::default();
        assert_eq!(deck.main.len(), 50);
        assert_eq!(db.validate_deck(&deck, &config), Ok(()));

        // swap the single C-10 for a fifth R-1
        deck.main.pop();
        deck.add("R-1", 1);
        let errors = db.validate_deck(&deck, &config).unwrap_err();
        assert_eq!(errors, vec![DeckError::TooManyCopies { card: "R-1".into(), limit: 4, found: 5 }]);
    }

    #[test]
    fn tokens_never_come_from_a_deck_list() {
        let db = database();
        let mut deck = DeckList::new(vec![], vec!["EXResource".to_string(); 10]);
        deck.add("EXResource", 4);
        deck.add("EXBase", 1);
        let small = EngineConfig::default().with_deck_sizes(5, 10);

        let errors = db.validate_deck(&deck, &small).unwrap_err();
        assert!(errors.contains(&DeckError::TokenInDeck("EXBase".into())));
        assert!(errors.contains(&DeckError::TokenInDeck("EXResource".into())));
        assert_eq!(errors.iter().filter(|e| matches!(e, DeckError::TokenInDeck(_))).count(), 12);
    }

    #[test]
    fn collects_every_problem() {
        let db = database();
        let mut deck = DeckList::new(vec![], vec!["RES".into()]);
        deck.add("R-1", 5);
        deck.add("B-1", 1);
        deck.add("G-1", 1);
        deck.add("BASE-1", 2);
        deck.add("X-404", 1);
        let errors = db.validate_deck(&deck, &EngineConfig::default()).unwrap_err();

        assert!(errors.contains(&DeckError::MainDeckSize { expected: 50, found: 10 }));
        assert!(errors.contains(&DeckError::ResourceDeckSize { expected: 10, found: 1 }));
        assert!(errors.contains(&DeckError::UnknownCard("X-404".into())));
        assert!(errors.contains(&DeckError::TooManyBases { card: "BASE-1".into(), limit: 1, found: 2 }));
        assert!(errors.contains(&DeckError::TooManyCopies { card: "R-1".into(), limit: 4, found: 5 }));
        assert!(errors.contains(&DeckError::TooManyColors { limit: 2, found: 3 }));
    }

    #[test]
    fn lookups_and_stats() {
        let db = database();
        assert_eq!(db.cards_by_type(CardType::Unit).len(), 3);
        assert_eq!(db.cards_by_color(CardColor::Red).len(), 2);
        let stats = db.stats();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.tokens, 2);
        assert!(stats.to_string().starts_with("Card Database: 5 total cards"));
    }
}
