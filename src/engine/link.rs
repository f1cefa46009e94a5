//! Pairing Pilots with Link Units.

use log::info;

use super::prelude::*;

/// What a Pilot needs to pair with a Link Unit. A list of specific card
/// numbers overrides the color and trait checks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkRequirement {
    pub specific_cards: Vec<CardNumber>,
    /// Any one of these colors is enough.
    pub colors: Vec<CardColor>,
    /// Every one of these traits is needed.
    pub traits: Vec<String>,
}

impl LinkRequirement {
    pub fn specific(card_number: impl Into<CardNumber>) -> Self {
        Self { specific_cards: vec![card_number.into()], ..Self::default() }
    }

    pub fn color(mut self, color: CardColor) -> Self {
        self.colors.push(color);
        self
    }

    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        self.traits.push(name.into());
        self
    }
}

pub fn validate_link_requirement(requirement: &LinkRequirement, pilot: &CardDefinition) -> RuleResult<()> {
    if !requirement.specific_cards.is_empty() {
        return if requirement.specific_cards.contains(&pilot.card_number) {
            Ok(())
        } else {
            Err(RuleViolation::WrongPilot { name: pilot.name.clone() })
        };
    }
    if !requirement.colors.is_empty() && !requirement.colors.iter().any(|c| pilot.colors.contains(c)) {
        return Err(RuleViolation::ColorRequirement { name: pilot.name.clone() });
    }
    if !requirement.traits.iter().all(|t| pilot.has_trait(t)) {
        return Err(RuleViolation::TraitRequirement { name: pilot.name.clone() });
    }
    Ok(())
}

/// Full pairing check: card kinds, neither side already paired, then the
/// unit's requirement.
pub fn check_pairing(
    unit: (&CardInstance, &CardDefinition),
    pilot: (&CardInstance, &CardDefinition),
) -> RuleResult<()> {
    let (unit, unit_def) = unit;
    let (pilot, pilot_def) = pilot;
    if !unit_def.keywords.iter().any(|k| k.keyword == Keyword::LinkUnit) {
        return Err(RuleViolation::NotALinkUnit { name: unit_def.name.clone() });
    }
    if pilot_def.card_type != CardType::Pilot {
        return Err(RuleViolation::NotAPilot { name: pilot_def.name.clone() });
    }
    if unit.paired_with.is_some() {
        return Err(RuleViolation::AlreadyPaired { name: unit_def.name.clone() });
    }
    if pilot.paired_with.is_some() {
        return Err(RuleViolation::AlreadyPaired { name: pilot_def.name.clone() });
    }
    match &unit_def.link_requirement {
        Some(requirement) => validate_link_requirement(requirement, pilot_def),
        None => Ok(()),
    }
}

impl Game {
    /// Moves a Pilot out of hand and attaches it to a Link Unit in play.
    /// Nothing moves unless the pair is valid.
    pub fn pair_pilot(&mut self, player: PlayerID, pilot_id: CardInstanceID, unit_id: CardInstanceID) -> EngineResult<()> {
        let database = self.database.clone();
        let store = &self.player(player)?.cards;
        let pilot = store
            .cards(Zone::Hand)
            .iter()
            .find(|c| c.id == pilot_id)
            .ok_or(RuleViolation::CardNotFound)?;
        let unit = store
            .cards(Zone::BattleArea)
            .iter()
            .find(|c| c.id == unit_id)
            .ok_or(RuleViolation::NotInBattleArea)?;
        let pilot_def = database.require(&pilot.card_number)?;
        let unit_def = database.require(&unit.card_number)?;
        check_pairing((unit, unit_def), (pilot, pilot_def))?;

        let mut pilot = self
            .player_mut(player)?
            .cards
            .take(Zone::Hand, pilot_id)
            .ok_or(IntegrityError::UnknownInstance(pilot_id))?;
        pilot.zone = Zone::BattleArea;
        pilot.paired_with = Some(unit_id);
        pilot.turn_deployed = Some(self.turn_number);

        let unit = self.card_mut(player, unit_id)?;
        unit.paired_with = Some(pilot_id);
        unit.attached.push(pilot);

        info!("link: {} paired with {}", pilot_def.name, unit_def.name);
        self.emit(GameEvent::CardMoved { player, card: pilot_id, from: Zone::Hand, to: Zone::BattleArea });
        self.emit(GameEvent::Paired { player, unit: unit_id, pilot: pilot_id });

        for effect in unit_def.effects_with_timing(EffectTiming::WhenPaired) {
            self.push_effect(unit_id, player, effect.clone(), None);
        }
        Ok(())
    }

    /// Detaches the Pilot of a paired unit and sends it to Trash.
    pub fn unpair(&mut self, player: PlayerID, unit_id: CardInstanceID) -> EngineResult<Option<CardInstanceID>> {
        let unit = self.card_mut(player, unit_id)?;
        let Some(pilot_id) = unit.paired_with.take() else {
            return Ok(None);
        };
        let Some(pos) = unit.attached.iter().position(|c| c.id == pilot_id) else {
            return Ok(None);
        };
        let mut pilot = unit.attached.remove(pos);
        let from = pilot.zone;
        let owner = pilot.owner;
        pilot.clear_transient_state();
        self.player_mut(owner)?.cards.put(pilot, Zone::Trash);
        self.emit(GameEvent::CardMoved { player: owner, card: pilot_id, from, to: Zone::Trash });
        Ok(Some(pilot_id))
    }

    pub fn paired_pilot(&self, player: PlayerID, unit_id: CardInstanceID) -> Option<&CardInstance> {
        let unit = self.player(player).ok()?.cards.get(unit_id)?;
        let pilot = unit.paired_with?;
        unit.attached.iter().find(|c| c.id == pilot)
    }

    pub fn link_units(&self, player: PlayerID) -> Vec<&CardInstance> {
        let Ok(p) = self.player(player) else {
            return vec![];
        };
        p.zone(Zone::BattleArea)
            .iter()
            .filter(|card| {
                self.database
                    .get_card_data(&card.card_number)
                    .is_some_and(|def| def.keywords.iter().any(|k| k.keyword == Keyword::LinkUnit))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::*;

    fn pilot_def(colors: &[CardColor], traits: &[&str]) -> CardDefinition {
        let mut def = CardDefinition::pilot("P-1", "Amuro Ray", 1, 1);
        for c in colors {
            def = def.with_color(*c);
        }
        for t in traits {
            def = def.with_trait(*t);
        }
        def
    }

    #[test]
    fn specific_card_takes_precedence() {
        let requirement = LinkRequirement::specific("P-1").color(CardColor::Green);
        assert!(validate_link_requirement(&requirement, &pilot_def(&[CardColor::Blue], &[])).is_ok());

        let requirement = LinkRequirement::specific("P-2").color(CardColor::Blue);
        assert_eq!(
            validate_link_requirement(&requirement, &pilot_def(&[CardColor::Blue], &[])),
            Err(RuleViolation::WrongPilot { name: "Amuro Ray".into() })
        );
    }

    #[test]
    fn any_color_but_all_traits() {
        let requirement = LinkRequirement::default()
            .color(CardColor::Blue)
            .color(CardColor::White)
            .with_trait("Earth Federation")
            .with_trait("Newtype");
        let ok = pilot_def(&[CardColor::White], &["Earth Federation", "Newtype"]);
        assert!(validate_link_requirement(&requirement, &ok).is_ok());

        let missing_trait = pilot_def(&[CardColor::White], &["Earth Federation"]);
        assert!(matches!(
            validate_link_requirement(&requirement, &missing_trait),
            Err(RuleViolation::TraitRequirement { .. })
        ));

        let wrong_color = pilot_def(&[CardColor::Red], &["Earth Federation", "Newtype"]);
        assert!(matches!(
            validate_link_requirement(&requirement, &wrong_color),
            Err(RuleViolation::ColorRequirement { .. })
        ));
    }

    #[test]
    fn pairing_moves_pilot_onto_unit() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        let unit = give_card(&mut game, p0, "LINK-RED", Zone::BattleArea);
        let pilot = give_card(&mut game, p0, "PILOT-RED", Zone::Hand);
        let total = game.player(p0).unwrap().cards.total_cards();

        game.pair_pilot(p0, pilot, unit).unwrap();

        assert_eq!(game.paired_pilot(p0, unit).map(|c| c.id), Some(pilot));
        assert_eq!(game.zone_count(p0, Zone::Hand).unwrap(), 0);
        assert_eq!(game.player(p0).unwrap().cards.total_cards(), total);
        assert_eq!(game.link_units(p0).len(), 1);

        assert_eq!(game.unpair(p0, unit).unwrap(), Some(pilot));
        assert_eq!(game.zone_count(p0, Zone::Trash).unwrap(), 1);
    }

    #[test]
    fn pairing_rejects_non_link_units() {
        let mut game = test_game();
        let p0 = PlayerID::from_raw(0);
        let unit = give_card(&mut game, p0, "UNIT-3-4", Zone::BattleArea);
        let pilot = give_card(&mut game, p0, "PILOT-RED", Zone::Hand);
        let err = game.pair_pilot(p0, pilot, unit).unwrap_err();
        assert!(matches!(err, EngineError::Rule(RuleViolation::NotALinkUnit { .. })));
        assert_eq!(game.zone_count(p0, Zone::Hand).unwrap(), 1);
    }
}
