//! Round pairing for the non-pool formats.

use crate::logic::standings::rank_by_performance;
use crate::models::{ByeAward, GameMatch, Opponents, Team, TeamId, TournamentFormat};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Number of rounds in the quadrette rotation.
pub const QUADRETTE_ROUNDS: u32 = 7;

/// Members of a block of four, by label A-D, for each side of a round.
/// Rounds 1-3 cover the three 2-vs-2 splits; rounds 4-7 sit one member out.
const QUADRETTE_SCHEDULE: [(&[usize], &[usize]); QUADRETTE_ROUNDS as usize] = [
    (&[0, 1], &[2, 3]),
    (&[0, 2], &[1, 3]),
    (&[0, 3], &[1, 2]),
    (&[0, 1], &[2]),
    (&[1, 3], &[0]),
    (&[0, 2], &[3]),
    (&[2, 3], &[1]),
];

/// Generate the matches of `round` (1-based) for a non-pool format.
///
/// Empty when there are fewer than 2 teams, when the format has no such round,
/// or for the pool format (handled by the pool bracket).
pub fn pair_round<R: Rng + ?Sized>(
    format: TournamentFormat,
    teams: &[Team],
    matches: &[GameMatch],
    round: u32,
    courts: u32,
    rng: &mut R,
) -> Vec<GameMatch> {
    if teams.len() < 2 {
        return Vec::new();
    }
    match format {
        TournamentFormat::Standard => standard_round(teams, matches, round, courts, rng),
        TournamentFormat::Quadrette => quadrette_round(teams, round, courts),
        TournamentFormat::FreeForAll => free_for_all_round(teams, round, courts, rng),
        TournamentFormat::Pools => Vec::new(),
    }
}

/// Court for the `index`-th pairing of a round: cycles 1..=courts.
pub(crate) fn cycle_court(index: usize, courts: u32) -> u32 {
    (index as u32 % courts.max(1)) + 1
}

/// Standard round: rank by performance, give an odd team out a bye, then pair
/// each top team with the first remaining team it has not met yet.
fn standard_round<R: Rng + ?Sized>(
    teams: &[Team],
    matches: &[GameMatch],
    round: u32,
    courts: u32,
    rng: &mut R,
) -> Vec<GameMatch> {
    let mut remaining: Vec<TeamId> = rank_by_performance(teams).iter().map(|t| t.id).collect();
    let mut out = Vec::new();

    if remaining.len() % 2 == 1 {
        let idx = if round <= 1 {
            rng.gen_range(0..remaining.len())
        } else {
            let had_bye = bye_recipients(matches);
            remaining
                .iter()
                .rposition(|id| !had_bye.contains(id))
                .unwrap_or(remaining.len() - 1)
        };
        let bye_team = remaining.remove(idx);
        out.push(GameMatch::bye(bye_team, ByeAward::Standard, round));
    }

    let faced = faced_pairs(matches);
    let mut index = 0;
    while remaining.len() >= 2 {
        let top = remaining.remove(0);
        let opponent_idx = remaining
            .iter()
            .position(|&other| !faced.contains(&pair_key(top, other)))
            .unwrap_or(0);
        let opponent = remaining.remove(opponent_idx);
        out.push(GameMatch::single(top, opponent, round, cycle_court(index, courts)));
        index += 1;
    }
    out
}

/// Quadrette round: fixed rotation inside each block of four teams (registration
/// order). Teams of an incomplete last block get a bye. Nothing after round 7.
fn quadrette_round(teams: &[Team], round: u32, courts: u32) -> Vec<GameMatch> {
    if round == 0 || round > QUADRETTE_ROUNDS {
        return Vec::new();
    }
    let (side1, side2) = QUADRETTE_SCHEDULE[(round - 1) as usize];
    let mut out = Vec::new();
    let blocks = teams.chunks(4);
    let mut index = 0;
    for block in blocks {
        if block.len() < 4 {
            for team in block {
                out.push(GameMatch::bye(team.id, ByeAward::Standard, round));
            }
            continue;
        }
        let pick = |labels: &[usize]| labels.iter().map(|&l| block[l].id).collect::<Vec<_>>();
        out.push(GameMatch::grouped(
            pick(side1),
            pick(side2),
            round,
            cycle_court(index, courts),
        ));
        index += 1;
    }
    out
}

/// Free-for-all round: shuffle everyone and pair consecutively while courts last.
/// Whoever is left over simply does not play this round.
fn free_for_all_round<R: Rng + ?Sized>(
    teams: &[Team],
    round: u32,
    courts: u32,
    rng: &mut R,
) -> Vec<GameMatch> {
    let mut ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
    ids.shuffle(rng);
    ids.chunks_exact(2)
        .take(courts.max(1) as usize)
        .enumerate()
        .map(|(i, pair)| GameMatch::single(pair[0], pair[1], round, cycle_court(i, courts)))
        .collect()
}

/// Canonical unordered pair.
pub(crate) fn pair_key(a: TeamId, b: TeamId) -> (TeamId, TeamId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Every pair of teams that already met on opposite sides.
fn faced_pairs(matches: &[GameMatch]) -> HashSet<(TeamId, TeamId)> {
    let mut faced = HashSet::new();
    for m in matches {
        match &m.opponents {
            Opponents::Single { team1, team2 } => {
                faced.insert(pair_key(*team1, *team2));
            }
            Opponents::Grouped { team1, team2 } => {
                for &a in team1 {
                    for &b in team2 {
                        faced.insert(pair_key(a, b));
                    }
                }
            }
            Opponents::Bye(_) => {}
        }
    }
    faced
}

fn bye_recipients(matches: &[GameMatch]) -> HashSet<TeamId> {
    matches
        .iter()
        .filter_map(|m| match &m.opponents {
            Opponents::Bye(bye) => Some(bye.team),
            _ => None,
        })
        .collect()
}
