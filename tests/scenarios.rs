use std::sync::Arc;
use std::time::Duration;

use gundam_tcg::engine::prelude::*;

const P0: PlayerID = PlayerID::from_raw(0);
const P1: PlayerID = PlayerID::from_raw(1);
const P2: PlayerID = PlayerID::from_raw(2);

fn database() -> CardDatabase {
    CardDatabase::from_cards([
        CardDefinition::unit("ZAKU", "Zaku II", 1, 1, 3, 3),
        CardDefinition::unit("GELGOOG", "Gelgoog", 4, 4, 5, 5),
        CardDefinition::unit("GOUF", "Gouf", 3, 3, 4, 5),
        CardDefinition::unit("DOM", "Dom", 3, 3, 6, 4),
        CardDefinition::unit("BIG-ZAM", "Big Zam", 8, 8, 8, 8),
        CardDefinition::new("RES", "Resource", CardType::Resource),
    ])
}

fn deck() -> DeckList {
    let mut deck = DeckList::empty();
    deck.add("ZAKU", 30);
    deck.add_resource("RES", 10);
    deck
}

/// Turn 1, player 0 in Main, both sides on six shields and an EX Base.
fn new_game() -> Game {
    let mut game =
        Game::new(EngineConfig::default(), Arc::new(database()), vec![deck(), deck()]).with_rng_seed(7);
    game.config = EngineConfig::default().with_phase_advance_delay(Duration::ZERO);
    game.start_game().unwrap();
    game
}

fn new_team_game() -> Game {
    let mut game =
        Game::new_team(EngineConfig::default(), Arc::new(database()), vec![deck(); 4]).with_rng_seed(7);
    game.config = EngineConfig::default().with_phase_advance_delay(Duration::ZERO);
    game.start_game().unwrap();
    game
}

fn put(game: &mut Game, player: PlayerID, number: &str, zone: Zone) -> CardInstanceID {
    let card = CardInstance::new(number.into(), player);
    let id = card.id;
    game.player_mut(player).unwrap().cards.put(card, zone);
    id
}

fn single_result(response: ActionResponse) -> CombatResult {
    match response {
        ActionResponse::Combat(mut results) if results.len() == 1 => results.remove(0),
        other => panic!("expected one combat result, got {:?}", other),
    }
}

#[test]
fn quiet_first_turn_hands_over_to_player_one() {
    let mut game = new_game();
    assert_eq!(game.turn_number, 1);
    assert_eq!(game.active_player, P0);
    assert_eq!(game.current_step(), Some(TurnStep::Main));
    for player in [P0, P1] {
        let player = game.player(player).unwrap();
        assert_eq!(player.shield_count(), 6);
        assert_eq!(player.unit_count(), 0);
    }

    // something of player 1's left rested from an earlier exchange
    let rested = put(&mut game, P1, "ZAKU", Zone::BattleArea);
    game.card_mut(P1, rested).unwrap().rest();

    game.execute_action(P0, PlayerActionRequest::PassPriority).unwrap();

    assert_eq!(game.turn_number, 2);
    assert_eq!(game.active_player, P1);
    assert_eq!(game.current_step(), Some(TurnStep::Main));
    assert!(game.card(P1, rested).unwrap().active);
    for player in [P0, P1] {
        let resources = game.player(player).unwrap().zone(Zone::ResourceArea);
        assert!(resources.iter().all(|card| card.active));
    }
    assert_eq!(game.player(P1).unwrap().resource_deck_size(), 9);
}

#[test]
fn unblocked_attack_breaks_a_single_shield() {
    let mut game = new_game();
    let attacker = put(&mut game, P0, "GELGOOG", Zone::BattleArea);
    let base = game.player(P1).unwrap().base().unwrap().id;

    game.execute_action(P0, PlayerActionRequest::DeclareAttack { attacker, defender: P1 })
        .unwrap();
    let result = single_result(game.execute_action(P0, PlayerActionRequest::ResolveCombat).unwrap());

    assert_eq!(result.shields_broken, 1);
    assert_eq!(result.damage_dealt, 0);
    assert!(!result.base_destroyed);
    let defender = game.player(P1).unwrap();
    assert_eq!(defender.shield_count(), 5);
    assert_eq!(defender.zone(Zone::Trash).len(), 1);
    assert_eq!(game.card(P1, base).unwrap().damage, 0);
}

#[test]
fn attack_through_empty_shields_destroys_the_ex_base() {
    let mut game = new_game();
    let mut events = game.subscribe();
    let shields: Vec<_> = game.player(P1).unwrap().zone(Zone::ShieldStack).iter().map(|c| c.id).collect();
    for shield in shields {
        game.move_card(P1, shield, Zone::ShieldStack, Zone::Trash, false).unwrap();
    }
    let base = game.player(P1).unwrap().base().unwrap().id;
    assert_eq!(game.definition_of(base).unwrap().hp, 3);

    let attacker = put(&mut game, P0, "ZAKU", Zone::BattleArea);
    game.execute_action(P0, PlayerActionRequest::DeclareAttack { attacker, defender: P1 })
        .unwrap();
    let result = single_result(game.execute_action(P0, PlayerActionRequest::ResolveCombat).unwrap());

    assert!(result.base_destroyed);
    assert_eq!(result.damage_dealt, 3);
    assert!(game.player(P1).unwrap().has_lost);
    assert!(game.player(P1).unwrap().base().is_none());
    assert_eq!(game.outcome(), Some(GameOutcome::Winner(P0)));

    let mut saw_base_destroyed = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, GameEvent::BaseDestroyed { player, .. } if player == P1) {
            saw_base_destroyed = true;
        }
    }
    assert!(saw_base_destroyed);
}

#[test]
fn blocked_attack_trades_both_units() {
    let mut game = new_game();
    let attacker = put(&mut game, P0, "GOUF", Zone::BattleArea);
    let blocker = put(&mut game, P1, "DOM", Zone::BattleArea);

    let attack_index = match game
        .execute_action(P0, PlayerActionRequest::DeclareAttack { attacker, defender: P1 })
        .unwrap()
    {
        ActionResponse::AttackDeclared(index) => index,
        other => panic!("unexpected response {:?}", other),
    };
    game.execute_action(P1, PlayerActionRequest::DeclareBlocker { attack_index, blocker })
        .unwrap();
    let result = single_result(game.execute_action(P0, PlayerActionRequest::ResolveCombat).unwrap());

    // 6 into HP 5, and 4 into HP 4 is lethal as well
    assert!(result.attacker_destroyed);
    assert!(result.blocker_destroyed);
    assert_eq!(result.shields_broken, 0);
    assert_eq!(game.card(P0, attacker).unwrap().zone, Zone::Trash);
    assert_eq!(game.card(P1, blocker).unwrap().zone, Zone::Trash);
    assert_eq!(game.player(P1).unwrap().shield_count(), 6);
}

#[test]
fn playing_above_your_level_changes_nothing() {
    let mut game = new_game();
    let card = put(&mut game, P0, "BIG-ZAM", Zone::Hand);
    let before = game.player(P0).unwrap().cards.clone();
    let level = game.player(P0).unwrap().level();

    let outcome = game.perform(P0, PlayerActionRequest::PlayCard { card, target: None });

    assert!(!outcome.success);
    assert_eq!(
        outcome.message,
        format!("Insufficient Lv (card requires Lv 8, you have Lv {})", level)
    );
    let after = &game.player(P0).unwrap().cards;
    for zone in Zone::ALL {
        assert_eq!(after.cards(zone), before.cards(zone), "{}", zone);
    }
}

#[test]
fn responses_from_the_wrong_side_are_refused() {
    let mut game = new_game();
    let own = put(&mut game, P1, "ZAKU", Zone::BattleArea);

    let err = game
        .execute_action(P1, PlayerActionRequest::DeclareAttack { attacker: own, defender: P0 })
        .unwrap_err();
    assert_eq!(err.as_rule(), Some(&RuleViolation::NotYourTurn));
    assert_eq!(game.perform(P1, PlayerActionRequest::PassPriority).message, "Not your turn");
}

#[test]
fn teammates_share_one_battle_area_limit() {
    let mut game = new_team_game();
    assert_eq!(game.active_player, P0);
    assert_eq!(game.current_step(), Some(TurnStep::Main));
    for player in [P0, P2] {
        put(&mut game, player, "RES", Zone::ResourceArea);
    }
    for _ in 0..3 {
        put(&mut game, P0, "ZAKU", Zone::BattleArea);
    }
    for _ in 0..2 {
        put(&mut game, P2, "ZAKU", Zone::BattleArea);
    }

    // the sixth unit still fits, on either teammate's side of the table
    let sixth = put(&mut game, P2, "ZAKU", Zone::Hand);
    game.execute_action(P2, PlayerActionRequest::PlayCard { card: sixth, target: None })
        .unwrap();
    assert_eq!(game.side_unit_count(P0), 6);

    for player in [P0, P2] {
        put(&mut game, player, "RES", Zone::ResourceArea);
        let seventh = put(&mut game, player, "ZAKU", Zone::Hand);
        let before = game.player(player).unwrap().cards.clone();

        let err = game
            .execute_action(player, PlayerActionRequest::PlayCard { card: seventh, target: None })
            .unwrap_err();

        assert_eq!(err.as_rule(), Some(&RuleViolation::BattleAreaFull { max: 6 }));
        let after = &game.player(player).unwrap().cards;
        for zone in Zone::ALL {
            assert_eq!(after.cards(zone), before.cards(zone), "{}", zone);
        }
    }
    assert_eq!(game.player(P0).unwrap().unit_count(), 3);
    assert_eq!(game.player(P2).unwrap().unit_count(), 3);
    // the other team's area is untouched by the limit
    assert_eq!(game.side_unit_count(P1), 0);
}
