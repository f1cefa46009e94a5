//! Shared fixtures for the unit tests.

use std::sync::Arc;
use std::time::Duration;

use super::prelude::*;

pub fn test_database() -> CardDatabase {
    let draw_one = EffectDefinition::new(EffectTiming::OnPlay, "Draw 1")
        .then(EffectOperation::new(Operation::Draw(1), TargetScope::YourPlayer));
    let burst_draw = EffectDefinition::new(EffectTiming::Burst, "Burst: Draw 1")
        .then(EffectOperation::new(Operation::Draw(1), TargetScope::YourPlayer));
    let draw_on_destroy = EffectDefinition::new(EffectTiming::OnDestroyed, "Destroyed: Draw 1")
        .then(EffectOperation::new(Operation::Draw(1), TargetScope::YourPlayer));

    CardDatabase::from_cards([
        CardDefinition::unit("UNIT-1-1", "Ball", 1, 1, 1, 1).with_color(CardColor::Blue),
        CardDefinition::unit("UNIT-3-4", "Zaku II", 3, 3, 3, 4).with_color(CardColor::Green),
        CardDefinition::unit("UNIT-5-5", "Gelgoog", 5, 5, 5, 5).with_color(CardColor::Green),
        CardDefinition::unit("UNIT-SUPPRESSION", "Hi-Nu", 3, 3, 2, 3).with_keyword(Keyword::Suppression, 0),
        CardDefinition::unit("UNIT-FIRST-STRIKE", "Gouf", 3, 3, 4, 2).with_keyword(Keyword::FirstStrike, 0),
        CardDefinition::unit("UNIT-BREACH", "Dom", 3, 3, 3, 3).with_keyword(Keyword::Breach, 2),
        CardDefinition::unit("UNIT-BLOCKER", "Guncannon", 2, 2, 2, 4).with_keyword(Keyword::Blocker, 0),
        CardDefinition::unit("UNIT-SUPPORT", "Guntank", 2, 2, 1, 3).with_keyword(Keyword::Support, 2),
        CardDefinition::unit("UNIT-HIGH-MANEUVER", "Zeta", 3, 3, 3, 3).with_keyword(Keyword::HighManeuver, 0),
        CardDefinition::unit("UNIT-REPAIR", "Repair Unit", 2, 2, 2, 4).with_keyword(Keyword::Repair, 1),
        CardDefinition::unit("UNIT-DRAW-ON-DESTROY", "Acguy", 1, 1, 1, 2).with_effect(draw_on_destroy),
        CardDefinition::unit("LINK-RED", "Gundam", 2, 2, 3, 3)
            .with_color(CardColor::Red)
            .with_keyword(Keyword::LinkUnit, 0)
            .with_link(LinkRequirement::default().color(CardColor::Red)),
        CardDefinition::pilot("PILOT-RED", "Amuro Ray", 1, 1)
            .with_color(CardColor::Red)
            .with_trait("Earth Federation"),
        CardDefinition::command("CMD-DRAW", "Intel", 1, 1).with_effect(draw_one),
        CardDefinition::command("CMD-BURST", "Ambush", 1, 1)
            .with_keyword(Keyword::Burst, 0)
            .with_effect(burst_draw),
        CardDefinition::base("BASE-5", "White Base", 2, 2, 5),
        CardDefinition::new("RES", "Resource", CardType::Resource),
    ])
}

pub fn test_deck() -> DeckList {
    let mut deck = DeckList::empty();
    deck.add("UNIT-3-4", 30);
    deck
}

pub fn test_game() -> Game {
    Game::new(EngineConfig::default(), Arc::new(test_database()), vec![test_deck(), test_deck()])
}

pub fn test_team_game() -> Game {
    Game::new_team(EngineConfig::default(), Arc::new(test_database()), vec![test_deck(); 4])
}

/// Seeded, no phase delay, sitting in player 0's Main step of turn 1.
pub fn started_game() -> Game {
    let mut game = test_game().with_rng_seed(42);
    game.config = EngineConfig::default().with_phase_advance_delay(Duration::ZERO);
    game.start_game().unwrap();
    game
}

/// Puts a brand new card straight into a zone, skipping every rule.
pub fn give_card(game: &mut Game, player: PlayerID, number: &str, zone: Zone) -> CardInstanceID {
    let card = CardInstance::new(number.into(), player);
    let id = card.id;
    game.player_mut(player).unwrap().cards.put(card, zone);
    id
}
