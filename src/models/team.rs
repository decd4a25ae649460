//! Team and TeamStats data structures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches, pools and the bracket).
pub type TeamId = Uuid;

/// Aggregate results of a team. Always recomputed from the match list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub wins: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,
    /// `points_for - points_against`.
    pub performance: i32,
}

impl TeamStats {
    /// Record one decided match from this team's side.
    pub fn add_result(&mut self, scored: u32, conceded: u32) {
        self.points_for += scored;
        self.points_against += conceded;
        if scored > conceded {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.performance = self.points_for as i32 - self.points_against as i32;
    }
}

/// A registered team: a name and its ordered players.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub players: Vec<String>,
    #[serde(default)]
    pub stats: TeamStats,
}

impl Team {
    /// Create a new team with the given name and players. Stats start at zero.
    pub fn new(name: impl Into<String>, players: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            players,
            stats: TeamStats::default(),
        }
    }
}
