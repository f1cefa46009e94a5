use super::abilities::*;
use crate::engine::prelude::*;

/// The starter card list, looked up by card number.
pub fn get_card(number: &str) -> Option<CardDefinition> {
    use CardColor::*;
    use Keyword::*;
    let card = match number {
        "ST01-001" => CardDefinition::unit(number, "Gundam", 4, 3, 4, 4)
            .with_color(Blue)
            .with_keyword(LinkUnit, 0)
            .with_keyword(Repair, 1)
            .with_link(LinkRequirement::specific("ST01-090"))
            .with_trait("Earth Federation")
            .with_effect(overdrive(1, 1))
            .with_text("The Federation's first mobile suit."),
        "ST01-002" => CardDefinition::unit(number, "Guncannon", 3, 2, 3, 4)
            .with_color(Blue)
            .with_keyword(Blocker, 0)
            .with_trait("Earth Federation"),
        "ST01-003" => CardDefinition::unit(number, "GM", 2, 1, 2, 2)
            .with_color(Blue)
            .with_trait("Earth Federation"),
        "ST01-004" => CardDefinition::unit(number, "Guntank", 2, 2, 1, 3)
            .with_color(Blue)
            .with_keyword(Support, 2)
            .with_trait("Earth Federation"),
        "ST01-005" => CardDefinition::unit(number, "Core Fighter", 1, 1, 1, 1)
            .with_color(Blue)
            .with_effect(draw(EffectTiming::OnDeploy, 1))
            .with_trait("Earth Federation"),
        "ST01-010" => CardDefinition::unit(number, "Zaku II", 2, 1, 2, 3)
            .with_color(Red)
            .with_trait("Zeon"),
        "ST01-011" => CardDefinition::unit(number, "Char's Zaku II", 4, 3, 4, 3)
            .with_color(Red)
            .with_keyword(LinkUnit, 0)
            .with_keyword(FirstStrike, 0)
            .with_link(LinkRequirement::default().color(Red).with_trait("Zeon"))
            .with_effect(paired_blocker())
            .with_trait("Zeon"),
        "ST01-012" => CardDefinition::unit(number, "Gouf", 3, 2, 3, 3)
            .with_color(Red)
            .with_keyword(Breach, 1)
            .with_trait("Zeon"),
        "ST01-013" => CardDefinition::unit(number, "Dom", 5, 4, 5, 5)
            .with_color(Red)
            .with_keyword(HighManeuver, 0)
            .with_trait("Zeon"),
        "ST01-014" => CardDefinition::unit(number, "Zaku I", 1, 1, 1, 2)
            .with_color(Red)
            .with_effect(parting_shot(1))
            .with_trait("Zeon"),
        "ST01-090" => CardDefinition::pilot(number, "Amuro Ray", 2, 1)
            .with_color(Blue)
            .with_trait("Earth Federation")
            .with_text("Pair with Gundam."),
        "ST01-091" => CardDefinition::pilot(number, "Char Aznable", 3, 1)
            .with_color(Red)
            .with_trait("Zeon"),
        "ST01-100" => CardDefinition::command(number, "Beam Rifle Barrage", 2, 2)
            .with_color(Red)
            .with_keyword(Burst, 0)
            .with_effect(strike_unit(EffectTiming::OnPlay, 3))
            .with_effect(burst_draw(1)),
        "ST01-101" => CardDefinition::command(number, "Supply Run", 1, 1)
            .with_color(Blue)
            .with_effect(draw(EffectTiming::OnPlay, 2)),
        "ST01-102" => CardDefinition::command(number, "Counterattack", 2, 1)
            .with_color(Red)
            .with_effect(rally(1)),
        "ST01-103" => CardDefinition::command(number, "Field Repairs", 1, 1)
            .with_color(Blue)
            .with_keyword(Burst, 0)
            .with_effect(reinforce(2))
            .with_effect(burst_draw(1)),
        "ST01-104" => CardDefinition::command(number, "Minovsky Jamming", 3, 2)
            .with_color(Blue)
            .with_effect(jamming(1)),
        "ST01-120" => CardDefinition::base(number, "White Base", 3, 2, 5)
            .with_color(Blue)
            .with_effect(draw(EffectTiming::WhenAttacked, 1))
            .with_trait("Earth Federation"),
        "ST01-121" => CardDefinition::base(number, "Musai", 3, 2, 5)
            .with_color(Red)
            .with_trait("Zeon"),
        "R-001" => CardDefinition::new(number, "Resource", CardType::Resource),
        _ => return None,
    };
    Some(card)
}

pub const STARTER_CARDS: [&str; 20] = [
    "ST01-001", "ST01-002", "ST01-003", "ST01-004", "ST01-005", "ST01-010", "ST01-011", "ST01-012",
    "ST01-013", "ST01-014", "ST01-090", "ST01-091", "ST01-100", "ST01-101", "ST01-102", "ST01-103",
    "ST01-104", "ST01-120", "ST01-121", "R-001",
];

pub fn starter_database() -> CardDatabase {
    CardDatabase::from_cards(STARTER_CARDS.iter().filter_map(|number| get_card(number)))
}

/// A legal blue/red deck: 50 main deck cards and 10 resources.
pub fn starter_deck() -> DeckList {
    let mut deck = DeckList::empty();
    for unit in ["ST01-001", "ST01-002", "ST01-003", "ST01-004", "ST01-005"] {
        deck.add(unit, 4);
    }
    for unit in ["ST01-010", "ST01-011", "ST01-012", "ST01-013", "ST01-014"] {
        deck.add(unit, 4);
    }
    deck.add("ST01-090", 2);
    deck.add("ST01-091", 2);
    deck.add("ST01-100", 2);
    deck.add("ST01-101", 2);
    deck.add("ST01-103", 1);
    deck.add("ST01-120", 1);
    deck.add_resource("R-001", 10);
    deck
}
