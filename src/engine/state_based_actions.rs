use log::{info, warn};

use super::prelude::*;

/// Something the rules do on their own once the board reaches a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateAction {
    DestroyUnit { owner: PlayerID, card: CardInstanceID, rule: GameRule },
    DestroyBase { owner: PlayerID, card: CardInstanceID, rule: GameRule },
}

/// This checks all state based actions and returns what should happen.
///
/// NOTE: This function takes the game by shared reference on purpose so it
/// can't apply anything while it is still looking.
pub fn check_state_based_actions(game: &Game) -> Vec<StateAction> {
    let mut ret = vec![];

    add_lethal_units(game, &mut ret);
    add_lethal_bases(game, &mut ret);

    ret
}

fn add_lethal_units(game: &Game, vec: &mut Vec<StateAction>) {
    vec.extend(game.players.iter().flat_map(|player| {
        player.zone(Zone::BattleArea).iter().filter_map(|card| {
            if is_lethal(game, card) {
                Some(StateAction::DestroyUnit { owner: player.id, card: card.id, rule: GameRule::LethalDamage })
            } else {
                None
            }
        })
    }));
}

fn add_lethal_bases(game: &Game, vec: &mut Vec<StateAction>) {
    vec.extend(game.players.iter().filter_map(|player| {
        let base = player.base()?;
        if is_lethal(game, base) {
            Some(StateAction::DestroyBase { owner: player.id, card: base.id, rule: GameRule::LethalDamage })
        } else {
            None
        }
    }));
}

fn is_lethal(game: &Game, card: &CardInstance) -> bool {
    match game.database.require(&card.card_number) {
        Ok(definition) => card.is_lethally_damaged(definition),
        Err(err) => {
            warn!("rules: skipping lethal check of {}: {}", card.id, err);
            false
        }
    }
}

impl Game {
    /// Applies every pending state-based action and returns how many there
    /// were. Anything queued by them waits on the stack for the caller.
    pub fn run_state_based_actions(&mut self) -> EngineResult<usize> {
        let actions = check_state_based_actions(self);
        for action in &actions {
            info!("rules: {:?}", action);
            match *action {
                StateAction::DestroyUnit { owner, card, .. } => self.destroy_unit(owner, card)?,
                StateAction::DestroyBase { owner, card, .. } => self.destroy_base(owner, card)?,
            }
        }
        Ok(actions.len())
    }
}
