use log::debug;

use super::{PlayerController, PlayerOptions};
use crate::engine::prelude::*;

/// Takes the first option that isn't a pass, in the order resources,
/// cards, attacks, combat. Passes when nothing else is left.
#[derive(Debug, Default)]
pub struct AutoPilot {
    decisions: usize,
}

impl AutoPilot {
    fn rank(request: &PlayerActionRequest) -> u8 {
        match request {
            PlayerActionRequest::PlaceResource => 0,
            PlayerActionRequest::PlayCard { .. } | PlayerActionRequest::PairPilot { .. } => 1,
            PlayerActionRequest::DeclareAttack { .. } => 2,
            PlayerActionRequest::ResolveCombat => 3,
            _ => 4,
        }
    }
}

impl PlayerController for AutoPilot {
    fn choose_options(&mut self, snapshot: &GameStateSnapshot, options: &PlayerOptions) -> PlayerActionRequest {
        self.decisions += 1;
        let choice = options
            .iter()
            .skip(1)
            .min_by_key(|request| Self::rank(request))
            .cloned()
            .unwrap_or(PlayerActionRequest::PassPriority);
        debug!(
            "client: turn {} decision {} for {:?}: {:?}",
            snapshot.turn_number, self.decisions, snapshot.viewer, choice
        );
        choice
    }
}
