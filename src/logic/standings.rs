//! Standings: team stats derived from completed matches, and the ranking orders.

use crate::models::{GameMatch, Opponents, Team, TeamStats};
use std::cmp::Reverse;

/// Recompute every team's stats from scratch.
///
/// Byes always count as one win with their fixed score. Completed matches add
/// points on whichever side the team plays; the strictly greater score wins and
/// anything else (a tie slipping through) is a loss.
pub fn compute_standings(teams: &[Team], matches: &[GameMatch]) -> Vec<Team> {
    teams
        .iter()
        .map(|team| Team {
            stats: team_stats(team, matches),
            ..team.clone()
        })
        .collect()
}

fn team_stats(team: &Team, matches: &[GameMatch]) -> TeamStats {
    let mut stats = TeamStats::default();
    for m in matches {
        let Some(side) = m.opponents.side_of(team.id) else {
            continue;
        };
        if let Opponents::Bye(bye) = &m.opponents {
            let score = bye.award.score();
            stats.add_result(score.team1, score.team2);
            continue;
        }
        if !m.completed {
            continue;
        }
        if let Some(score) = m.score {
            let (scored, conceded) = score.for_side(side);
            stats.add_result(scored, conceded);
        }
    }
    stats
}

/// Standings order: wins descending, then performance descending. Stable.
pub fn rank_by_standings(teams: &[Team]) -> Vec<Team> {
    let mut ranked = teams.to_vec();
    ranked.sort_by_key(|t| (Reverse(t.stats.wins), Reverse(t.stats.performance)));
    ranked
}

/// Pairing order: performance descending only. Stable.
pub fn rank_by_performance(teams: &[Team]) -> Vec<Team> {
    let mut ranked = teams.to_vec();
    ranked.sort_by_key(|t| Reverse(t.stats.performance));
    ranked
}
