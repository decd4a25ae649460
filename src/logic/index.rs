//! Lookup of existing matches by logical identity, for idempotent insertion.

use crate::logic::pairing::pair_key;
use crate::models::{GameMatch, Opponents, PoolId, TeamId};
use std::collections::HashSet;

/// Where a match belongs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Stage {
    Rounds,
    Pool(PoolId),
    Bracket(usize),
}

/// `(stage, round, unordered opponent pair)`. A bye pairs its team with itself.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MatchKey {
    pub stage: Stage,
    pub round: u32,
    pub pair: (TeamId, TeamId),
}

impl MatchKey {
    pub fn new(stage: Stage, round: u32, a: TeamId, b: TeamId) -> Self {
        Self {
            stage,
            round,
            pair: pair_key(a, b),
        }
    }

    /// Key of an existing match. Grouped matches have none.
    pub fn of(m: &GameMatch) -> Option<Self> {
        let stage = match (m.pool_id, m.bracket) {
            (Some(pool), _) => Stage::Pool(pool),
            (None, Some(bracket)) => Stage::Bracket(bracket.phase),
            (None, None) => Stage::Rounds,
        };
        match &m.opponents {
            Opponents::Single { team1, team2 } => Some(Self::new(stage, m.round, *team1, *team2)),
            Opponents::Bye(bye) => Some(Self::new(stage, m.round, bye.team, bye.team)),
            Opponents::Grouped { .. } => None,
        }
    }
}

/// Keys of every match known so far, existing or about to be appended.
#[derive(Debug, Default)]
pub struct MatchIndex {
    keys: HashSet<MatchKey>,
}

impl MatchIndex {
    pub fn build(matches: &[GameMatch]) -> Self {
        Self {
            keys: matches.iter().filter_map(MatchKey::of).collect(),
        }
    }

    /// Queue `m` into `out` unless a match with the same key is already known.
    pub fn push_new(&mut self, m: GameMatch, out: &mut Vec<GameMatch>) {
        match MatchKey::of(&m) {
            Some(key) if !self.keys.insert(key) => {}
            _ => out.push(m),
        }
    }
}
