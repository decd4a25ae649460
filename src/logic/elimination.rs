//! Single-elimination bracket built from pool qualifiers.
//!
//! The bracket is never stored. Each pass rebuilds it from the qualified slots
//! and the recorded winners: phase 1 pairs slots 1v2, 3v4, ...; match `i` of a
//! later phase is winner of `2i` against winner of `2i + 1` from the phase before.

use crate::logic::index::MatchIndex;
use crate::logic::pairing::cycle_court;
use crate::logic::pools::{pool_outcome, PoolOutcome};
use crate::models::{BracketRef, BracketWin, GameMatch, MatchId, Pool, TeamId, TournamentId};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Round number of the first bracket phase (pools use rounds 1-3).
pub const FIRST_BRACKET_ROUND: u32 = 4;

/// Names of the shortest phase sequence for `slots` qualified slots, first phase first.
pub fn phase_names(slots: usize) -> Vec<String> {
    let mut count = 1;
    while (1usize << count) < slots {
        count += 1;
    }
    (0..count).rev().map(phase_name).collect()
}

/// Name of the phase `rounds_left` rounds before the final.
fn phase_name(rounds_left: usize) -> String {
    match rounds_left {
        0 => "finale".to_string(),
        1 => "demi-finale".to_string(),
        2 => "quart-de-finale".to_string(),
        3 => "huitième-de-finale".to_string(),
        4 => "seizième-de-finale".to_string(),
        5 => "trente-deuxième-de-finale".to_string(),
        n => format!("1/{}e-de-finale", 1u128 << n),
    }
}

/// Deterministic id of a bracket match, stable across passes.
pub fn bracket_match_id(tournament: TournamentId, phase: usize, position: usize) -> MatchId {
    Uuid::new_v5(&tournament, format!("bracket/{phase}/{position}").as_bytes())
}

/// Qualifiers of every pool in pool order (first, second, first, second, ...),
/// or `None` while any pool is undecided.
pub fn qualified_slots(pools: &[Pool], matches: &[GameMatch]) -> Option<Vec<Option<TeamId>>> {
    if pools.is_empty() {
        return None;
    }
    let mut slots = Vec::with_capacity(pools.len() * 2);
    for pool in pools {
        match pool_outcome(pool, matches) {
            PoolOutcome::Qualified { first, second } => {
                slots.push(Some(first));
                slots.push(Some(second));
            }
            PoolOutcome::Pending => return None,
        }
    }
    Some(slots)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Slot {
    Team(TeamId),
    /// Will be known once an earlier match is decided.
    Pending,
    /// Nobody will ever fill it.
    Vacant,
}

impl Slot {
    fn team(self) -> Option<TeamId> {
        match self {
            Slot::Team(id) => Some(id),
            _ => None,
        }
    }
}

/// One match of the bracket, as currently derived.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EliminationMatch {
    pub id: MatchId,
    pub phase: String,
    pub phase_index: usize,
    pub position: usize,
    pub team1: Option<TeamId>,
    pub team2: Option<TeamId>,
    pub winner: Option<TeamId>,
    /// Exactly one slot will ever be filled; its team advances without playing.
    pub is_bye: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Phase {
    pub name: String,
    pub matches: Vec<EliminationMatch>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Bracket {
    pub phases: Vec<Phase>,
}

impl Bracket {
    /// Derive the whole bracket from the qualified slots and recorded winners.
    ///
    /// A recorded result only counts for the pairing it was decided in; once an
    /// upstream change brings a new opponent the match is open again.
    pub fn resolve(
        tournament: TournamentId,
        qualified: &[Option<TeamId>],
        winners: &HashMap<MatchId, BracketWin>,
    ) -> Self {
        let mut slots: Vec<Slot> = qualified
            .iter()
            .map(|q| q.map_or(Slot::Vacant, Slot::Team))
            .collect();
        let mut phases = Vec::new();

        for (phase_index, name) in phase_names(qualified.len()).into_iter().enumerate() {
            let count = slots.len().div_ceil(2).max(1);
            let mut next = Vec::with_capacity(count);
            let mut matches = Vec::with_capacity(count);

            for position in 0..count {
                let a = slots.get(2 * position).copied().unwrap_or(Slot::Vacant);
                let b = slots.get(2 * position + 1).copied().unwrap_or(Slot::Vacant);
                let id = bracket_match_id(tournament, phase_index, position);
                let (winner, is_bye) = match (a, b) {
                    (Slot::Team(x), Slot::Team(y)) => match winners.get(&id) {
                        Some(win) if win.decides(x, y) => (Slot::Team(win.winner), false),
                        _ => (Slot::Pending, false),
                    },
                    (Slot::Team(x), Slot::Vacant) | (Slot::Vacant, Slot::Team(x)) => {
                        (Slot::Team(x), true)
                    }
                    (Slot::Vacant, Slot::Vacant) => (Slot::Vacant, false),
                    _ => (Slot::Pending, false),
                };
                matches.push(EliminationMatch {
                    id,
                    phase: name.clone(),
                    phase_index,
                    position,
                    team1: a.team(),
                    team2: b.team(),
                    winner: winner.team(),
                    is_bye,
                });
                next.push(winner);
            }

            phases.push(Phase { name, matches });
            slots = next;
        }

        Bracket { phases }
    }

    pub fn matches(&self) -> impl Iterator<Item = &EliminationMatch> {
        self.phases.iter().flat_map(|p| p.matches.iter())
    }

    pub fn find(&self, id: MatchId) -> Option<&EliminationMatch> {
        self.matches().find(|m| m.id == id)
    }

    /// Winner of the final.
    pub fn champion(&self) -> Option<TeamId> {
        self.phases.last()?.matches.first()?.winner
    }

    /// Bye winners not recorded yet (or recorded differently).
    pub fn unrecorded_bye_winners(
        &self,
        winners: &HashMap<MatchId, BracketWin>,
    ) -> Vec<(MatchId, BracketWin)> {
        self.matches()
            .filter(|m| m.is_bye)
            .filter_map(|m| m.winner.map(|w| (m.id, BracketWin::bye(w))))
            .filter(|(id, win)| winners.get(id) != Some(win))
            .collect()
    }

    /// Match records for every bracket match with both teams known, skipping
    /// those already emitted.
    pub fn playable_matches(&self, courts: u32, index: &mut MatchIndex) -> Vec<GameMatch> {
        let mut out = Vec::new();
        for m in self.matches() {
            let (Some(team1), Some(team2)) = (m.team1, m.team2) else {
                continue;
            };
            let record = GameMatch::single(
                team1,
                team2,
                FIRST_BRACKET_ROUND + m.phase_index as u32,
                cycle_court(m.position, courts),
            )
            .in_bracket(BracketRef {
                id: m.id,
                phase: m.phase_index,
                position: m.position,
            });
            index.push_new(record, &mut out);
        }
        out
    }
}
