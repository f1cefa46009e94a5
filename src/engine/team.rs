//! Sides of the table. In a standard game every player is a side of their
//! own; in a team game two players share a turn, a Battle Area limit, a
//! base and their shields.

use super::prelude::*;

pub type TeamID = ID<Team>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub id: TeamID,
    pub members: [PlayerID; 2],
    pub leader: PlayerID,
}

impl Team {
    pub fn contains(&self, player: PlayerID) -> bool {
        self.members.contains(&player)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamLayout {
    pub teams: [Team; 2],
}

impl TeamLayout {
    /// Players 0 and 2 against 1 and 3, led by 0 and 1.
    pub fn standard() -> Self {
        let p = PlayerID::from_raw;
        Self {
            teams: [
                Team { id: TeamID::from_raw(0), members: [p(0), p(2)], leader: p(0) },
                Team { id: TeamID::from_raw(1), members: [p(1), p(3)], leader: p(1) },
            ],
        }
    }

    pub fn team_of(&self, player: PlayerID) -> Option<&Team> {
        self.teams.iter().find(|team| team.contains(player))
    }

    pub fn other_team(&self, player: PlayerID) -> Option<&Team> {
        self.teams.iter().find(|team| !team.contains(player))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameMode {
    Standard,
    Team(TeamLayout),
}

impl GameMode {
    pub fn is_team(&self) -> bool {
        matches!(self, GameMode::Team(_))
    }
}

impl Game {
    /// Everyone on `player`'s side, leader first.
    pub fn side_of(&self, player: PlayerID) -> Vec<PlayerID> {
        match &self.mode {
            GameMode::Standard => vec![player],
            GameMode::Team(layout) => match layout.team_of(player) {
                Some(team) => {
                    let mut members = vec![team.leader];
                    members.extend(team.members.iter().filter(|m| **m != team.leader));
                    members
                }
                None => vec![player],
            },
        }
    }

    pub fn are_teammates(&self, a: PlayerID, b: PlayerID) -> bool {
        a != b && self.side_of(a).contains(&b)
    }

    pub fn teammate_of(&self, player: PlayerID) -> Option<PlayerID> {
        self.side_of(player).into_iter().find(|p| *p != player)
    }

    pub fn opponents_of(&self, player: PlayerID) -> Vec<PlayerID> {
        let side = self.side_of(player);
        self.player_ids().into_iter().filter(|p| !side.contains(p)).collect()
    }

    /// The opponent effects aimed at "the opponent" land on: the other
    /// team's leader in team games.
    pub fn opponent_of(&self, player: PlayerID) -> Option<PlayerID> {
        match &self.mode {
            GameMode::Team(layout) => layout.other_team(player).map(|team| team.leader),
            GameMode::Standard => self.opponents_of(player).into_iter().next(),
        }
    }

    pub fn side_leader(&self, player: PlayerID) -> PlayerID {
        self.side_of(player).first().copied().unwrap_or(player)
    }

    pub fn turn_side(&self) -> Vec<PlayerID> {
        self.side_of(self.active_player)
    }

    pub fn is_turn_side(&self, player: PlayerID) -> bool {
        self.turn_side().contains(&player)
    }

    pub fn side_unit_count(&self, player: PlayerID) -> usize {
        self.side_of(player)
            .into_iter()
            .filter_map(|p| self.player(p).ok())
            .map(Player::unit_count)
            .sum()
    }

    pub fn side_shield_count(&self, player: PlayerID) -> usize {
        self.side_of(player)
            .into_iter()
            .filter_map(|p| self.player(p).ok())
            .map(Player::shield_count)
            .sum()
    }

    /// Whose shield breaks next. Team shields break alternately, so this is
    /// the member with the most left, the leader winning ties.
    pub fn next_shield_holder(&self, player: PlayerID) -> Option<PlayerID> {
        let mut best: Option<(PlayerID, usize)> = None;
        for member in self.side_of(player) {
            let shields = self.player(member).map(Player::shield_count).unwrap_or(0);
            if shields > best.map_or(0, |(_, most)| most) {
                best = Some((member, shields));
            }
        }
        best.map(|(member, _)| member)
    }

    /// Whoever on the side has the base in their Base Section, the leader
    /// when nobody does.
    pub fn base_holder(&self, player: PlayerID) -> PlayerID {
        let side = self.side_of(player);
        side.iter()
            .copied()
            .find(|member| self.player(*member).is_ok_and(|p| p.base().is_some()))
            .or_else(|| side.first().copied())
            .unwrap_or(player)
    }

    /// Whose turn comes after the current one.
    pub fn next_turn_player(&self) -> PlayerID {
        match &self.mode {
            GameMode::Team(layout) => layout
                .other_team(self.active_player)
                .map(|team| team.leader)
                .unwrap_or(self.active_player),
            GameMode::Standard => {
                let ids = self.player_ids();
                let pos = ids.iter().position(|p| *p == self.active_player).unwrap_or(0);
                ids.get((pos + 1) % ids.len().max(1)).copied().unwrap_or(self.active_player)
            }
        }
    }
}
