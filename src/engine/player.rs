use crate::engine::prelude::*;

use super::util::id::ID;

pub type PlayerID = ID<Player>;

/// Resources spent by a successful [`Player::pay_cost`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaidCost {
    pub rested: Vec<CardInstanceID>,
    /// EX Resources used up, which are gone from the table.
    pub spent_ex: Vec<CardInstanceID>,
}

/// A seat at the table. Owns every card that currently belongs to it.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerID,
    pub cards: CardStore,
    pub has_lost: bool,
    pub placed_resource_this_turn: bool,
    pub drawn_this_turn: bool,
}

impl Player {
    pub fn new(id: PlayerID) -> Self {
        Self {
            id,
            cards: CardStore::new(),
            has_lost: false,
            placed_resource_this_turn: false,
            drawn_this_turn: false,
        }
    }

    pub fn zone(&self, zone: Zone) -> &[CardInstance] {
        self.cards.cards(zone)
    }

    pub fn hand_size(&self) -> usize {
        self.cards.count(Zone::Hand)
    }

    pub fn deck_size(&self) -> usize {
        self.cards.count(Zone::Deck)
    }

    pub fn resource_deck_size(&self) -> usize {
        self.cards.count(Zone::ResourceDeck)
    }

    pub fn shield_count(&self) -> usize {
        self.cards.count(Zone::ShieldStack)
    }

    pub fn unit_count(&self) -> usize {
        self.cards.count(Zone::BattleArea)
    }

    pub fn base(&self) -> Option<&CardInstance> {
        self.cards.cards(Zone::BaseSection).first()
    }

    /// Regular (non-token) resources that are still active.
    pub fn active_resource_count(&self) -> u32 {
        self.zone(Zone::ResourceArea)
            .iter()
            .filter(|card| !card.is_ex_resource() && card.active)
            .count() as u32
    }

    pub fn ex_resource_count(&self) -> u32 {
        self.zone(Zone::ResourceArea)
            .iter()
            .filter(|card| card.is_ex_resource())
            .count() as u32
    }

    pub fn total_resource_count(&self) -> u32 {
        self.cards.count(Zone::ResourceArea) as u32
    }

    /// Lv counts active regular resources plus every EX resource, rested or not.
    pub fn level(&self) -> u32 {
        self.active_resource_count() + self.ex_resource_count()
    }

    /// What the player could spend right now.
    pub fn available_resources(&self) -> u32 {
        self.active_resource_count() + self.ex_resource_count()
    }

    pub fn can_pay_cost(&self, cost: u32) -> bool {
        self.available_resources() >= cost
    }

    /// Rests regular resources first and only then spends EX resources,
    /// which leave play entirely. Nothing changes when the cost can't be met.
    pub fn pay_cost(&mut self, cost: u32) -> RuleResult<PaidCost> {
        let have = self.available_resources();
        if have < cost {
            return Err(RuleViolation::InsufficientResources { need: cost, have });
        }

        let mut paid = PaidCost::default();
        let mut remaining = cost;
        for card in self.cards.cards_mut(Zone::ResourceArea).iter_mut() {
            if remaining == 0 {
                break;
            }
            if !card.is_ex_resource() && card.active {
                card.rest();
                paid.rested.push(card.id);
                remaining -= 1;
            }
        }

        if remaining > 0 {
            let resources = self.cards.cards_mut(Zone::ResourceArea);
            while remaining > 0 {
                match resources.iter().position(|card| card.is_ex_resource()) {
                    Some(pos) => {
                        paid.spent_ex.push(resources.remove(pos).id);
                        remaining -= 1;
                    }
                    None => break,
                }
            }
        }

        Ok(paid)
    }

    /// Rests `count` active regular resources. EX resources can't be rested
    /// to pay effect costs.
    pub fn rest_resources(&mut self, count: u32) -> RuleResult<Vec<CardInstanceID>> {
        let have = self.active_resource_count();
        if have < count {
            return Err(RuleViolation::InsufficientResources { need: count, have });
        }
        let rested = self
            .cards
            .cards_mut(Zone::ResourceArea)
            .iter_mut()
            .filter(|card| !card.is_ex_resource() && card.active)
            .take(count as usize)
            .map(|card| {
                card.rest();
                card.id
            })
            .collect();
        Ok(rested)
    }

    /// Per-turn bookkeeping done in the Active step.
    pub fn reset_turn_flags(&mut self) {
        self.placed_resource_this_turn = false;
        self.drawn_this_turn = false;
        for zone in [Zone::BattleArea, Zone::ResourceArea, Zone::BaseSection] {
            self.cards
                .cards_mut(zone)
                .iter_mut()
                .for_each(CardInstance::reset_turn_flags);
        }
    }
}
