//! Pool mini-brackets.
//!
//! 4 teams: seed 1 v 4 and 2 v 3, then winners match and losers match, then a
//! barrage between the two teams left on one win each.
//! 3 teams: seed 1 gets a bye while 2 v 3 play, the winner then meets seed 1 and
//! the loser gets a bye, then a barrage between the two teams left on one win each.
//!
//! Progression is re-derived from the full match list on every pass and only
//! emits matches whose key is not known yet. After a corrected score, matches
//! of the old pairing stay in the list but no longer count for the pool.

use crate::logic::index::MatchIndex;
use crate::models::{ByeAward, GameMatch, Opponents, Pool, TeamId};
use serde::Serialize;
use std::collections::HashMap;

/// Round of the barrage inside a pool.
pub const BARRAGE_ROUND: u32 = 3;

/// Matches played before the barrage, in both pool sizes (byes included).
const GROUP_MATCHES: usize = 4;

/// Qualification state of a pool.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PoolOutcome {
    Pending,
    Qualified { first: TeamId, second: TeamId },
}

/// Wins and performance of a team counted over its pool matches only.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PoolRecord {
    pub wins: u32,
    pub performance: i32,
}

/// Matches of one pool, with lookups by round and opponents.
struct PoolMatches<'a> {
    pool: &'a Pool,
    matches: Vec<&'a GameMatch>,
}

impl<'a> PoolMatches<'a> {
    fn new(pool: &'a Pool, all: &'a [GameMatch]) -> Self {
        Self {
            pool,
            matches: all.iter().filter(|m| m.pool_id == Some(pool.id)).collect(),
        }
    }

    fn find(&self, round: u32, a: TeamId, b: TeamId) -> Option<&'a GameMatch> {
        self.matches.iter().copied().find(|m| {
            m.round == round
                && match m.opponents {
                    Opponents::Single { team1, team2 } => {
                        (team1 == a && team2 == b) || (team1 == b && team2 == a)
                    }
                    _ => false,
                }
        })
    }

    fn find_bye(&self, round: u32, team: TeamId) -> Option<&'a GameMatch> {
        self.matches.iter().copied().find(|m| {
            m.round == round && matches!(&m.opponents, Opponents::Bye(bye) if bye.team == team)
        })
    }

    /// The match if it exists and has a result.
    fn decided(&self, round: u32, a: TeamId, b: TeamId) -> Option<&'a GameMatch> {
        self.find(round, a, b).filter(|m| m.winner().is_some())
    }

    /// Pool matches before the barrage that the current results lead to.
    fn group(&self) -> Vec<&'a GameMatch> {
        let mut group = Vec::new();
        match self.pool.teams.len() {
            4 => {
                let (s1, s2, s3, s4) = (
                    self.pool.seed(1),
                    self.pool.seed(2),
                    self.pool.seed(3),
                    self.pool.seed(4),
                );
                let m1 = self.find(1, s1, s4);
                let m2 = self.find(1, s2, s3);
                group.extend(m1);
                group.extend(m2);
                if let (Some(m1), Some(m2)) = (m1, m2) {
                    if let (Some(w1), Some(l1), Some(w2), Some(l2)) =
                        (m1.winner(), m1.loser(), m2.winner(), m2.loser())
                    {
                        group.extend(self.find(2, w1, w2));
                        group.extend(self.find(2, l1, l2));
                    }
                }
            }
            3 => {
                let (s1, s2, s3) = (self.pool.seed(1), self.pool.seed(2), self.pool.seed(3));
                group.extend(self.find_bye(1, s1));
                let opening = self.find(1, s2, s3);
                group.extend(opening);
                if let Some(m) = opening {
                    if let (Some(winner), Some(loser)) = (m.winner(), m.loser()) {
                        group.extend(self.find(2, winner, s1));
                        group.extend(self.find_bye(2, loser));
                    }
                }
            }
            _ => {}
        }
        group
    }

    /// The group matches, once every one of them has a result.
    fn decided_group(&self) -> Option<Vec<&'a GameMatch>> {
        let group = self.group();
        let complete = group.len() == GROUP_MATCHES && group.iter().all(|m| m.winner().is_some());
        complete.then_some(group)
    }

    fn tally(&self, matches: &[&GameMatch]) -> HashMap<TeamId, PoolRecord> {
        let mut records: HashMap<TeamId, PoolRecord> =
            self.pool.teams.iter().map(|&t| (t, PoolRecord::default())).collect();
        for m in matches.iter().filter(|m| m.completed) {
            let Some(score) = m.score else { continue };
            let winner = m.winner_side();
            for &team in &self.pool.teams {
                let Some(side) = m.opponents.side_of(team) else {
                    continue;
                };
                let (scored, conceded) = score.for_side(side);
                let record = records.entry(team).or_default();
                record.performance += scored as i32 - conceded as i32;
                if winner == Some(side) {
                    record.wins += 1;
                }
            }
        }
        records
    }

    /// The two teams on one win after the group matches, in seed order.
    fn barrage_pair(&self) -> Option<(TeamId, TeamId)> {
        let group = self.decided_group()?;
        let records = self.tally(&group);
        let tied: Vec<TeamId> = self
            .pool
            .teams
            .iter()
            .copied()
            .filter(|t| records.get(t).map(|r| r.wins) == Some(1))
            .collect();
        match tied.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    fn barrage(&self) -> Option<&'a GameMatch> {
        let (a, b) = self.barrage_pair()?;
        self.find(BARRAGE_ROUND, a, b)
    }

    /// Records over the group matches and the current barrage.
    fn records(&self) -> HashMap<TeamId, PoolRecord> {
        let mut counted = self.group();
        counted.extend(self.barrage());
        self.tally(&counted)
    }

    /// Group winner (two wins) and barrage winner.
    fn qualifiers(&self) -> Option<(TeamId, TeamId)> {
        let group = self.decided_group()?;
        let records = self.tally(&group);
        let first = self
            .pool
            .teams
            .iter()
            .copied()
            .find(|t| records.get(t).map(|r| r.wins) == Some(2))?;
        let second = self.barrage()?.winner()?;
        Some((first, second))
    }
}

/// The two courts of the `pool_index`-th pool.
pub fn pool_courts(pool_index: usize, courts: u32) -> (u32, u32) {
    let courts = courts.max(1) as usize;
    (
        ((2 * pool_index) % courts) as u32 + 1,
        ((2 * pool_index + 1) % courts) as u32 + 1,
    )
}

/// Matches newly unlocked in this pool. Keys are registered in `index` so a
/// match is never emitted twice.
pub fn advance_pool(
    pool: &Pool,
    pool_index: usize,
    courts: u32,
    matches: &[GameMatch],
    index: &mut MatchIndex,
) -> Vec<GameMatch> {
    let view = PoolMatches::new(pool, matches);
    let (court_a, court_b) = pool_courts(pool_index, courts);
    let mut out = Vec::new();
    let mut emit = |m: GameMatch, out: &mut Vec<GameMatch>| index.push_new(m.in_pool(pool.id), out);

    match pool.teams.len() {
        4 => {
            let (s1, s2, s3, s4) = (pool.seed(1), pool.seed(2), pool.seed(3), pool.seed(4));
            emit(GameMatch::single(s1, s4, 1, court_a), &mut out);
            emit(GameMatch::single(s2, s3, 1, court_b), &mut out);

            if let (Some(m1), Some(m2)) = (view.decided(1, s1, s4), view.decided(1, s2, s3)) {
                if let (Some(w1), Some(l1), Some(w2), Some(l2)) =
                    (m1.winner(), m1.loser(), m2.winner(), m2.loser())
                {
                    emit(GameMatch::single(w1, w2, 2, court_a), &mut out);
                    emit(GameMatch::single(l1, l2, 2, court_b), &mut out);
                }
            }
        }
        3 => {
            let (s1, s2, s3) = (pool.seed(1), pool.seed(2), pool.seed(3));
            emit(GameMatch::bye(s1, ByeAward::Pool, 1), &mut out);
            emit(GameMatch::single(s2, s3, 1, court_a), &mut out);

            if let Some(m) = view.decided(1, s2, s3) {
                if let (Some(winner), Some(loser)) = (m.winner(), m.loser()) {
                    emit(GameMatch::single(winner, s1, 2, court_a), &mut out);
                    emit(GameMatch::bye(loser, ByeAward::Pool, 2), &mut out);
                }
            }
        }
        n => log::warn!("Pool {} has {} teams, skipping", pool.name, n),
    }

    if let Some((a, b)) = view.barrage_pair() {
        emit(GameMatch::single(a, b, BARRAGE_ROUND, court_a), &mut out);
    }

    if !out.is_empty() {
        log::debug!("Pool {}: {} new match(es)", pool.name, out.len());
    }
    out
}

/// Wins and performance of each pool team over the matches that count for the pool.
pub fn pool_records(pool: &Pool, matches: &[GameMatch]) -> HashMap<TeamId, PoolRecord> {
    PoolMatches::new(pool, matches).records()
}

/// The two qualifiers of a pool, once fully decided.
pub fn pool_outcome(pool: &Pool, matches: &[GameMatch]) -> PoolOutcome {
    match PoolMatches::new(pool, matches).qualifiers() {
        Some((first, second)) => PoolOutcome::Qualified { first, second },
        None => PoolOutcome::Pending,
    }
}
