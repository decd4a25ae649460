//! Pool: a small group of teams playing a closed mini-bracket.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a pool.
pub type PoolId = Uuid;

/// A pool of 3 or 4 teams. `teams` is in seed order (seed 1 first).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    pub teams: Vec<TeamId>,
}

impl Pool {
    pub fn new(name: impl Into<String>, teams: Vec<TeamId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            teams,
        }
    }

    /// Team holding the given 1-based seed.
    pub fn seed(&self, seed: usize) -> TeamId {
        self.teams[seed - 1]
    }
}
