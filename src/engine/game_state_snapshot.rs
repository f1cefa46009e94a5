use super::prelude::*;

/// The table as one player is allowed to see it.
#[derive(Clone, Debug, PartialEq)]
pub struct GameStateSnapshot {
    pub viewer: PlayerID,
    pub turn_number: u32,
    pub active_player: PlayerID,
    pub status: GameStatus,
    pub players: Vec<PlayerSnapshot>,
    pub attacks: Vec<AttackDeclaration>,
    pub pending_effects: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerID,
    pub has_lost: bool,
    pub level: u32,
    /// Only filled in for the viewer.
    pub hand: Option<Vec<CardSnapshot>>,
    pub hand_size: usize,
    pub deck_size: usize,
    pub resource_deck_size: usize,
    pub shield_count: usize,
    pub resources: Vec<CardSnapshot>,
    pub battle_area: Vec<CardSnapshot>,
    pub base: Option<CardSnapshot>,
    pub trash: Vec<CardSnapshot>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CardSnapshot {
    pub id: CardInstanceID,
    pub card: Attributes,
    pub state: State,
}

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub is_active: bool,
    pub damage: u32,
    pub paired_with: Option<CardInstanceID>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attributes {
    pub card_number: CardNumber,
    pub name: String,
    pub card_type: CardType,
    pub level: u32,
    pub cost: u32,
    pub ap: u32,
    pub hp: u32,
    pub keywords: Vec<String>,
    pub text: String,
}

impl CardSnapshot {
    fn of(card: &CardInstance, database: &CardDatabase) -> Self {
        let card_attrs = match database.get_card_data(&card.card_number) {
            Some(definition) => Attributes {
                card_number: card.card_number.clone(),
                name: definition.name.clone(),
                card_type: definition.card_type,
                level: definition.level,
                cost: card.effective_cost(definition),
                ap: card.effective_ap(definition),
                hp: card.effective_hp(definition),
                keywords: definition
                    .keywords
                    .iter()
                    .chain(card.temporary_keywords.iter())
                    .map(ToString::to_string)
                    .collect(),
                text: definition.text.clone(),
            },
            None => Attributes {
                card_number: card.card_number.clone(),
                name: card.card_number.clone(),
                card_type: CardType::Token,
                level: 0,
                cost: 0,
                ap: 0,
                hp: 0,
                keywords: vec![],
                text: String::new(),
            },
        };
        Self {
            id: card.id,
            card: card_attrs,
            state: State { is_active: card.active, damage: card.damage, paired_with: card.paired_with },
        }
    }
}

impl Game {
    /// Decks, resource decks and shields only show up as counts, and only
    /// the viewer's own hand is listed.
    pub fn snapshot_for(&self, viewer: PlayerID) -> EngineResult<GameStateSnapshot> {
        self.player(viewer)?;
        let database = self.database.as_ref();
        let cards = |player: &Player, zone: Zone| -> Vec<CardSnapshot> {
            player.zone(zone).iter().map(|card| CardSnapshot::of(card, database)).collect()
        };

        let players = self
            .players
            .iter()
            .map(|player| PlayerSnapshot {
                id: player.id,
                has_lost: player.has_lost,
                level: player.level(),
                hand: (player.id == viewer).then(|| cards(player, Zone::Hand)),
                hand_size: player.hand_size(),
                deck_size: player.deck_size(),
                resource_deck_size: player.resource_deck_size(),
                shield_count: player.shield_count(),
                resources: cards(player, Zone::ResourceArea),
                battle_area: cards(player, Zone::BattleArea),
                base: player.base().map(|base| CardSnapshot::of(base, database)),
                trash: cards(player, Zone::Trash),
            })
            .collect();

        Ok(GameStateSnapshot {
            viewer,
            turn_number: self.turn_number,
            active_player: self.active_player,
            status: self.status,
            players,
            attacks: self.current_attacks.clone(),
            pending_effects: self.effect_stack.len(),
        })
    }
}
