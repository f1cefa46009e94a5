use std::fmt::Display;

use super::prelude::*;

/// The per-player places a card can be.
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub enum Zone {
    Deck,
    ResourceDeck,
    Hand,
    ResourceArea,
    BattleArea,
    ShieldStack,
    BaseSection,
    Trash,
    Removal,
}

impl Zone {
    pub const ALL: [Zone; 9] = [
        Zone::Deck,
        Zone::ResourceDeck,
        Zone::Hand,
        Zone::ResourceArea,
        Zone::BattleArea,
        Zone::ShieldStack,
        Zone::BaseSection,
        Zone::Trash,
        Zone::Removal,
    ];

    /// Ordered zones keep their sequence, index 0 being the top.
    pub fn is_ordered(self) -> bool {
        matches!(self, Zone::Deck | Zone::ResourceDeck | Zone::ShieldStack)
    }

    /// Whether other players may see the card faces in this zone.
    pub fn is_public(self) -> bool {
        matches!(
            self,
            Zone::ResourceArea | Zone::BattleArea | Zone::BaseSection | Zone::Trash | Zone::Removal
        )
    }

    pub fn is_in_play(self) -> bool {
        matches!(self, Zone::ResourceArea | Zone::BattleArea | Zone::BaseSection)
    }

    pub fn is_shuffleable(self) -> bool {
        matches!(self, Zone::Deck | Zone::ResourceDeck)
    }

    /// Cards that land here lose every trace of having been in play.
    pub fn clears_state(self) -> bool {
        matches!(self, Zone::Trash | Zone::Removal)
    }

    pub fn capacity(self, config: &EngineConfig) -> Option<usize> {
        match self {
            Zone::BattleArea => Some(config.battle_area_capacity),
            Zone::ResourceArea => Some(config.resource_area_capacity),
            Zone::BaseSection => Some(config.base_section_capacity),
            _ => None,
        }
    }

    /// Type restriction on entering. Unrestricted zones take anything.
    pub fn accepts(self, card_type: CardType) -> bool {
        match self {
            Zone::BattleArea => card_type == CardType::Unit,
            Zone::BaseSection => card_type == CardType::Base,
            _ => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Zone::Deck => "Deck",
            Zone::ResourceDeck => "Resource Deck",
            Zone::Hand => "Hand",
            Zone::ResourceArea => "Resource Area",
            Zone::BattleArea => "Battle Area",
            Zone::ShieldStack => "Shield Stack",
            Zone::BaseSection => "Base Section",
            Zone::Trash => "Trash",
            Zone::Removal => "Removal",
        }
    }
}

impl Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_and_public_are_disjoint() {
        for zone in Zone::ALL {
            assert!(!(zone.is_ordered() && zone.is_public()), "{zone}");
        }
    }

    #[test]
    fn type_restrictions() {
        assert!(Zone::BattleArea.accepts(CardType::Unit));
        assert!(!Zone::BattleArea.accepts(CardType::Command));
        assert!(Zone::BaseSection.accepts(CardType::Base));
        assert!(!Zone::BaseSection.accepts(CardType::Unit));
        assert!(Zone::Trash.accepts(CardType::Pilot));
    }

    #[test]
    fn capacities_come_from_config() {
        let config = EngineConfig::default();
        assert_eq!(Zone::BattleArea.capacity(&config), Some(6));
        assert_eq!(Zone::ResourceArea.capacity(&config), Some(15));
        assert_eq!(Zone::BaseSection.capacity(&config), Some(1));
        assert_eq!(Zone::Hand.capacity(&config), None);
    }
}
