use std::time::Duration;

/// Tunable numbers of the rules engine. The defaults are the tournament
/// values for a 1v1 game.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// How long non-interactive steps wait before advancing on their own.
    pub phase_advance_delay: Duration,
    pub hand_limit: usize,
    pub starting_hand_size: usize,
    pub shields_per_player: usize,
    /// Shields each member contributes to a team's shared stack.
    pub team_shields_per_player: usize,
    pub battle_area_capacity: usize,
    pub resource_area_capacity: usize,
    pub base_section_capacity: usize,
    pub main_deck_size: usize,
    pub resource_deck_size: usize,
    pub max_copies_per_card: usize,
    pub max_copies_per_base: usize,
    pub max_deck_colors: usize,
    /// High-Maneuver rests this many active resources to evade.
    pub high_maneuver_cost: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            phase_advance_delay: Duration::from_secs(2),
            hand_limit: 10,
            starting_hand_size: 5,
            shields_per_player: 6,
            team_shields_per_player: 4,
            battle_area_capacity: 6,
            resource_area_capacity: 15,
            base_section_capacity: 1,
            main_deck_size: 50,
            resource_deck_size: 10,
            max_copies_per_card: 4,
            max_copies_per_base: 1,
            max_deck_colors: 2,
            high_maneuver_cost: 1,
        }
    }
}

impl EngineConfig {
    pub fn with_phase_advance_delay(mut self, delay: Duration) -> Self {
        self.phase_advance_delay = delay;
        self
    }

    pub fn with_hand_limit(mut self, limit: usize) -> Self {
        self.hand_limit = limit;
        self
    }

    pub fn with_starting_hand_size(mut self, size: usize) -> Self {
        self.starting_hand_size = size;
        self
    }

    pub fn with_shields_per_player(mut self, shields: usize) -> Self {
        self.shields_per_player = shields;
        self
    }

    /// Deck size checks are relaxed for hand-built test decks.
    pub fn with_deck_sizes(mut self, main: usize, resources: usize) -> Self {
        self.main_deck_size = main;
        self.resource_deck_size = resources;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_tournament_rules() {
        let config = EngineConfig::default();
        assert_eq!(config.battle_area_capacity, 6);
        assert_eq!(config.resource_area_capacity, 15);
        assert_eq!(config.base_section_capacity, 1);
        assert_eq!(config.phase_advance_delay, Duration::from_secs(2));
    }

    #[test]
    fn builders_override_single_fields() {
        let config = EngineConfig::default()
            .with_hand_limit(7)
            .with_phase_advance_delay(Duration::ZERO);
        assert_eq!(config.hand_limit, 7);
        assert_eq!(config.phase_advance_delay, Duration::ZERO);
        assert_eq!(config.starting_hand_size, 5);
    }
}
