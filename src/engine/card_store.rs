use std::collections::BTreeMap;

use log::{debug, info, warn};
use rand::seq::SliceRandom;

use super::prelude::*;

/// Every card a player owns, zone by zone. Ordered zones keep index 0 as the
/// top card; for the others the order is just the order of arrival.
#[derive(Clone, Debug, PartialEq)]
pub struct CardStore {
    zone_to_cards: BTreeMap<Zone, Vec<CardInstance>>,
}

impl Default for CardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CardStore {
    pub fn new() -> Self {
        Self {
            zone_to_cards: Zone::ALL.iter().map(|zone| (*zone, vec![])).collect(),
        }
    }

    pub fn cards(&self, zone: Zone) -> &[CardInstance] {
        self.zone_to_cards.get(&zone).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cards_mut(&mut self, zone: Zone) -> &mut Vec<CardInstance> {
        self.zone_to_cards.entry(zone).or_default()
    }

    pub fn count(&self, zone: Zone) -> usize {
        self.cards(zone).len()
    }

    /// Non-token cards across every zone, attachments included.
    pub fn total_cards(&self) -> usize {
        self.zone_to_cards
            .values()
            .flatten()
            .map(|card| !card.is_token() as usize + card.attached.len())
            .sum()
    }

    pub fn locate(&self, id: CardInstanceID) -> Option<(Zone, usize)> {
        self.zone_to_cards.iter().find_map(|(zone, cards)| {
            cards.iter().position(|card| card.id == id).map(|pos| (*zone, pos))
        })
    }

    pub fn zone_of(&self, id: CardInstanceID) -> Option<Zone> {
        self.locate(id).map(|(zone, _)| zone)
    }

    pub fn get(&self, id: CardInstanceID) -> Option<&CardInstance> {
        let (zone, pos) = self.locate(id)?;
        self.cards(zone).get(pos)
    }

    pub fn get_mut(&mut self, id: CardInstanceID) -> Option<&mut CardInstance> {
        let (zone, pos) = self.locate(id)?;
        self.cards_mut(zone).get_mut(pos)
    }

    /// Puts the card at the bottom (or end) of the zone.
    pub fn put(&mut self, mut card: CardInstance, zone: Zone) {
        card.zone = zone;
        self.cards_mut(zone).push(card);
    }

    pub fn put_top(&mut self, mut card: CardInstance, zone: Zone) {
        card.zone = zone;
        self.cards_mut(zone).insert(0, card);
    }

    pub fn take(&mut self, zone: Zone, id: CardInstanceID) -> Option<CardInstance> {
        let cards = self.cards_mut(zone);
        let pos = cards.iter().position(|card| card.id == id)?;
        Some(cards.remove(pos))
    }

    pub fn top(&self, zone: Zone) -> Option<&CardInstance> {
        self.cards(zone).first()
    }

    pub fn in_play(&self) -> impl Iterator<Item = &CardInstance> {
        [Zone::BattleArea, Zone::ResourceArea, Zone::BaseSection]
            .into_iter()
            .flat_map(move |zone| self.cards(zone).iter())
    }

    fn in_play_mut(&mut self) -> impl Iterator<Item = &mut CardInstance> {
        self.zone_to_cards
            .iter_mut()
            .filter(|(zone, _)| zone.is_in_play())
            .flat_map(|(_, cards)| cards.iter_mut())
    }

    pub fn for_each_in_play(&mut self, f: impl FnMut(&mut CardInstance)) {
        self.in_play_mut().for_each(f)
    }
}

/// Zone manager. Every card movement in the engine goes through here.
impl Game {
    /// Type and capacity checks for a card about to enter `zone`. The Battle
    /// Area limit counts the whole team in team games.
    pub fn can_add_to_zone(&self, player: PlayerID, card_type: CardType, zone: Zone) -> EngineResult<()> {
        if !zone.accepts(card_type) {
            return Err(RuleViolation::ZoneRejectsType { zone, card_type }.into());
        }
        if let Some(capacity) = zone.capacity(&self.config) {
            let occupied = match zone {
                Zone::BattleArea => self.side_unit_count(player),
                _ => self.player(player)?.cards.count(zone),
            };
            if occupied >= capacity {
                return Err(match zone {
                    Zone::BattleArea => RuleViolation::BattleAreaFull { max: capacity },
                    Zone::ResourceArea => RuleViolation::ResourceAreaFull { max: capacity },
                    _ => RuleViolation::ZoneFull { zone },
                }
                .into());
            }
        }
        Ok(())
    }

    /// Moves one card between two of `player`'s zones, applying the exit
    /// rules of the old zone and the entry rules of the new one. Fires no
    /// effects.
    pub fn move_card(
        &mut self,
        player: PlayerID,
        id: CardInstanceID,
        from: Zone,
        to: Zone,
        validate_limits: bool,
    ) -> EngineResult<()> {
        if from == to {
            return Err(RuleViolation::SameZone { zone: to }.into());
        }
        if from == Zone::Removal {
            warn!("zone: card {} is leaving Removal", id);
        }

        let store = &self.player(player)?.cards;
        let Some(card) = store.cards(from).iter().find(|card| card.id == id) else {
            return Err(RuleViolation::CardNotInZone { zone: from }.into());
        };

        if validate_limits {
            let database = self.database.clone();
            let card_type = database.require(&card.card_number)?.card_type;
            self.can_add_to_zone(player, card_type, to)?;
        }

        let mut card = self
            .player_mut(player)?
            .cards
            .take(from, id)
            .ok_or(IntegrityError::UnknownInstance(id))?;

        // exit rules
        if from.is_in_play() && !to.is_in_play() {
            self.detach_all(&mut card)?;
            self.drop_while_in_play_modifiers(card.id);
        }

        // entry rules
        match to {
            Zone::BattleArea => card.rest(),
            Zone::ResourceArea | Zone::Hand => card.activate(),
            Zone::Trash | Zone::Removal => card.clear_transient_state(),
            _ => {}
        }

        debug!("zone: {:?} {} -> {}", id, from, to);
        self.player_mut(player)?.cards.put(card, to);
        self.emit(GameEvent::CardMoved { player, card: id, from, to });
        Ok(())
    }

    /// Sends attached cards to their owners' Trash.
    fn detach_all(&mut self, card: &mut CardInstance) -> EngineResult<()> {
        for mut attached in card.attached.drain(..) {
            let owner = attached.owner;
            let from = attached.zone;
            attached.clear_transient_state();
            info!("zone: detached {:?} from {:?} into Trash", attached.id, card.id);
            let attached_id = attached.id;
            self.player_mut(owner)?.cards.put(attached, Zone::Trash);
            self.emit(GameEvent::CardMoved { player: owner, card: attached_id, from, to: Zone::Trash });
        }
        card.paired_with = None;
        Ok(())
    }

    fn drop_while_in_play_modifiers(&mut self, source: CardInstanceID) {
        for player in self.players.iter_mut() {
            player.cards.for_each_in_play(|card| {
                card.expire_modifiers(|m| m.source == source && m.duration == ModifierDuration::WhileInPlay);
            });
        }
    }

    /// Unbiased in-place shuffle of a deck.
    pub fn shuffle_zone(&mut self, player: PlayerID, zone: Zone) -> EngineResult<()> {
        if !zone.is_shuffleable() {
            return Err(RuleViolation::NotShuffleable { zone }.into());
        }
        let Game { players, rng, .. } = self;
        let target = players
            .iter_mut()
            .find(|p| p.id == player)
            .ok_or(IntegrityError::UnknownPlayer(player))?;
        target.cards.cards_mut(zone).shuffle(rng);
        debug!("zone: shuffled {} of {:?}", zone, player);
        Ok(())
    }

    /// Moves the top card of an ordered zone. `Ok(None)` means the zone was
    /// empty, which callers usually turn into a loss.
    pub fn draw_top_card(&mut self, player: PlayerID, from: Zone, to: Zone) -> EngineResult<Option<CardInstanceID>> {
        if !from.is_ordered() {
            return Err(RuleViolation::NotOrdered { zone: from }.into());
        }
        let Some(top) = self.player(player)?.cards.top(from).map(|card| card.id) else {
            return Ok(None);
        };
        self.move_card(player, top, from, to, false)?;
        Ok(Some(top))
    }

    /// Like [`Game::draw_top_card`] repeated. Stops early on an empty zone.
    pub fn draw_top_cards(&mut self, player: PlayerID, from: Zone, to: Zone, count: usize) -> EngineResult<Vec<CardInstanceID>> {
        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            match self.draw_top_card(player, from, to)? {
                Some(id) => drawn.push(id),
                None => break,
            }
        }
        Ok(drawn)
    }

    /// Draws into hand. Running out marks the player as having lost.
    pub fn draw_cards(&mut self, player: PlayerID, count: usize) -> EngineResult<usize> {
        let drawn = self.draw_top_cards(player, Zone::Deck, Zone::Hand, count)?;
        if drawn.len() < count {
            warn!("zone: {:?} could not draw from an empty deck", player);
            self.mark_lost(player, GameRule::CouldntDraw)?;
        }
        if !drawn.is_empty() {
            self.player_mut(player)?.drawn_this_turn = true;
        }
        Ok(drawn.len())
    }

    pub fn activate_all_cards(&mut self, player: PlayerID) -> EngineResult<()> {
        let cards = &mut self.player_mut(player)?.cards;
        for zone in [Zone::BattleArea, Zone::ResourceArea] {
            cards.cards_mut(zone).iter_mut().for_each(CardInstance::activate);
        }
        Ok(())
    }

    pub fn zone_count(&self, player: PlayerID, zone: Zone) -> EngineResult<usize> {
        Ok(self.player(player)?.cards.count(zone))
    }

    /// Finds a card anywhere on the table.
    pub fn find_card(&self, id: CardInstanceID) -> Option<(PlayerID, Zone, &CardInstance)> {
        self.players.iter().find_map(|player| {
            let (zone, pos) = player.cards.locate(id)?;
            Some((player.id, zone, player.cards.cards(zone).get(pos)?))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;

    #[test]
    fn store_put_take_roundtrip_keeps_order() {
        let owner = PlayerID::from_raw(0);
        let mut store = CardStore::new();
        let a = CardInstance::new("A".into(), owner);
        let b = CardInstance::new("B".into(), owner);
        let (a_id, b_id) = (a.id, b.id);
        store.put(a, Zone::Deck);
        store.put_top(b, Zone::Deck);
        assert_eq!(store.top(Zone::Deck).map(|c| c.id), Some(b_id));
        assert_eq!(store.zone_of(a_id), Some(Zone::Deck));
        assert!(store.take(Zone::Hand, a_id).is_none());
        assert_eq!(store.take(Zone::Deck, a_id).map(|c| c.id), Some(a_id));
        assert_eq!(store.count(Zone::Deck), 1);
    }

    #[test]
    fn move_applies_entry_rules() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        let unit = give_card(&mut game, p0, "UNIT-3-4", Zone::Hand);

        game.move_card(p0, unit, Zone::Hand, Zone::BattleArea, true).unwrap();
        let card = game.player(p0).unwrap().cards.get(unit).unwrap();
        assert_eq!(card.zone, Zone::BattleArea);
        assert!(!card.active, "units enter the Battle Area rested");

        game.card_mut(p0, unit).unwrap().damage = 2;
        game.move_card(p0, unit, Zone::BattleArea, Zone::Trash, true).unwrap();
        let card = game.player(p0).unwrap().cards.get(unit).unwrap();
        assert_eq!(card.damage, 0);
    }

    #[test]
    fn move_rejects_same_zone_and_missing_card() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        let unit = give_card(&mut game, p0, "UNIT-3-4", Zone::Hand);

        let err = game.move_card(p0, unit, Zone::Hand, Zone::Hand, true).unwrap_err();
        assert_eq!(err, RuleViolation::SameZone { zone: Zone::Hand }.into());

        let err = game.move_card(p0, unit, Zone::Deck, Zone::Hand, true).unwrap_err();
        assert_eq!(err, RuleViolation::CardNotInZone { zone: Zone::Deck }.into());
    }

    #[test]
    fn type_restrictions_only_with_validation() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        let command = give_card(&mut game, p0, "CMD-DRAW", Zone::Hand);

        let err = game.move_card(p0, command, Zone::Hand, Zone::BattleArea, true).unwrap_err();
        assert_eq!(
            err,
            RuleViolation::ZoneRejectsType { zone: Zone::BattleArea, card_type: CardType::Command }.into()
        );
        assert_eq!(game.zone_count(p0, Zone::Hand).unwrap(), 1);
    }

    #[test]
    fn battle_area_capacity() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        for _ in 0..6 {
            give_card(&mut game, p0, "UNIT-3-4", Zone::BattleArea);
        }
        let extra = give_card(&mut game, p0, "UNIT-3-4", Zone::Hand);
        let err = game.move_card(p0, extra, Zone::Hand, Zone::BattleArea, true).unwrap_err();
        assert_eq!(err, RuleViolation::BattleAreaFull { max: 6 }.into());
        assert_eq!(game.zone_count(p0, Zone::BattleArea).unwrap(), 6);
    }

    #[test]
    fn leaving_play_discards_attachments() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        let unit = give_card(&mut game, p0, "UNIT-3-4", Zone::BattleArea);
        let mut pilot = CardInstance::new("PILOT-RED".into(), p0);
        pilot.zone = Zone::BattleArea;
        game.card_mut(p0, unit).unwrap().attached.push(pilot);
        let before = game.player(p0).unwrap().cards.total_cards();

        game.move_card(p0, unit, Zone::BattleArea, Zone::Trash, false).unwrap();

        assert_eq!(game.zone_count(p0, Zone::Trash).unwrap(), 2);
        assert_eq!(game.player(p0).unwrap().cards.total_cards(), before);
    }

    #[test]
    fn while_in_play_modifiers_end_with_their_source() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        let source = give_card(&mut game, p0, "UNIT-3-4", Zone::BattleArea);
        let buffed = give_card(&mut game, p0, "UNIT-3-4", Zone::BattleArea);
        game.card_mut(p0, buffed).unwrap().modifiers.push(ActiveModifier {
            stat: ModifierStat::Ap,
            amount: 2,
            duration: ModifierDuration::WhileInPlay,
            source,
        });

        game.move_card(p0, source, Zone::BattleArea, Zone::Trash, false).unwrap();
        assert!(game.card(p0, buffed).unwrap().modifiers.is_empty());
    }

    #[test]
    fn draw_on_empty_deck_is_none() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        game.player_mut(p0).unwrap().cards.cards_mut(Zone::Deck).clear();
        assert_eq!(game.draw_top_card(p0, Zone::Deck, Zone::Hand).unwrap(), None);
        let err = game.draw_top_card(p0, Zone::Hand, Zone::Trash).unwrap_err();
        assert_eq!(err, RuleViolation::NotOrdered { zone: Zone::Hand }.into());
    }

    #[test]
    fn drawing_from_empty_deck_loses() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        game.player_mut(p0).unwrap().cards.cards_mut(Zone::Deck).truncate(1);
        assert_eq!(game.draw_cards(p0, 2).unwrap(), 1);
        assert!(game.player(p0).unwrap().has_lost);
    }

    #[test]
    fn only_decks_shuffle() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        assert!(game.shuffle_zone(p0, Zone::Deck).is_ok());
        let err = game.shuffle_zone(p0, Zone::ShieldStack).unwrap_err();
        assert_eq!(err, RuleViolation::NotShuffleable { zone: Zone::ShieldStack }.into());
    }
}
