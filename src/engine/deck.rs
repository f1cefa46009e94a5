use crate::engine::prelude::*;

/// Card numbers making up one player's two decks. Instances are created
/// from it once, at setup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeckList {
    pub main: Vec<CardNumber>,
    pub resources: Vec<CardNumber>,
}

impl DeckList {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(main: Vec<CardNumber>, resources: Vec<CardNumber>) -> Self {
        Self { main, resources }
    }

    pub fn add(&mut self, card_number: impl Into<CardNumber>, copies: usize) {
        let card_number = card_number.into();
        self.main.extend(std::iter::repeat(card_number).take(copies));
    }

    pub fn add_resource(&mut self, card_number: impl Into<CardNumber>, copies: usize) {
        let card_number = card_number.into();
        self.resources.extend(std::iter::repeat(card_number).take(copies));
    }

    pub fn copies_of(&self, card_number: &str) -> usize {
        self.main.iter().filter(|c| *c == card_number).count()
    }

    /// Fresh instances for the main deck and the resource deck, in list order.
    pub fn instantiate(&self, owner: PlayerID) -> (Vec<CardInstance>, Vec<CardInstance>) {
        let build = |numbers: &[CardNumber]| -> Vec<CardInstance> {
            numbers
                .iter()
                .map(|number| CardInstance::new(number.clone(), owner))
                .collect()
        };
        (build(&self.main), build(&self.resources))
    }
}

impl FromIterator<CardNumber> for DeckList {
    fn from_iter<T: IntoIterator<Item = CardNumber>>(iter: T) -> Self {
        Self { main: iter.into_iter().collect(), resources: vec![] }
    }
}
