//! Integration tests for the pool mini-brackets.

use petanque_tournament::logic::{pool_courts, pool_records, PoolRecord, BARRAGE_ROUND};
use petanque_tournament::{
    derive_matches, pool_outcome, record_score, refresh, start_tournament, ByeAward, GameMatch,
    MatchId, Opponents, PoolOutcome, TeamId, Tournament, TournamentFormat,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn pool_tournament(names: &[&str]) -> (Tournament, Vec<TeamId>) {
    let mut t = Tournament::new("Pools", TournamentFormat::Pools, 4);
    let ids: Vec<TeamId> = names
        .iter()
        .map(|n| t.add_team(*n, Vec::new()).unwrap())
        .collect();
    t.set_pools(vec![ids.clone()]).unwrap();
    (t, ids)
}

fn find_match(t: &Tournament, round: u32, a: TeamId, b: TeamId) -> Option<&GameMatch> {
    t.matches.iter().find(|m| {
        m.round == round
            && matches!(m.opponents, Opponents::Single { team1, team2 }
                if (team1 == a && team2 == b) || (team1 == b && team2 == a))
    })
}

fn match_id(t: &Tournament, round: u32, a: TeamId, b: TeamId) -> MatchId {
    find_match(t, round, a, b)
        .unwrap_or_else(|| panic!("no round {round} match"))
        .id
}

/// Score with `winner` on 13 and `loser` on `loser_points`, whichever side they play.
fn play(
    t: &mut Tournament,
    rng: &mut StdRng,
    round: u32,
    winner: TeamId,
    loser: TeamId,
    loser_points: u32,
) {
    let id = match_id(t, round, winner, loser);
    let m = t.get_match(id).unwrap();
    let (s1, s2) = match m.opponents {
        Opponents::Single { team1, .. } if team1 == winner => (13, loser_points),
        _ => (loser_points, 13),
    };
    record_score(t, id, s1, s2, rng).unwrap();
}

fn bye_for(t: &Tournament, round: u32, team: TeamId) -> Option<&GameMatch> {
    t.matches
        .iter()
        .find(|m| m.round == round && matches!(&m.opponents, Opponents::Bye(b) if b.team == team))
}

fn assert_no_duplicates(t: &Tournament) {
    let mut seen = HashSet::new();
    for m in &t.matches {
        let mut ids = m.opponents.teams();
        ids.sort();
        assert!(seen.insert((m.pool_id, m.round, ids)), "duplicate match {:?}", m);
    }
}

#[test]
fn four_team_pool_opens_with_seed_crossing() {
    let (mut t, ids) = pool_tournament(&["W", "X", "Y", "Z"]);
    let mut rng = StdRng::seed_from_u64(1);

    start_tournament(&mut t, &mut rng).unwrap();

    assert_eq!(t.matches.len(), 2);
    let m1 = find_match(&t, 1, ids[0], ids[3]).unwrap();
    let m2 = find_match(&t, 1, ids[1], ids[2]).unwrap();
    assert_eq!((m1.court, m2.court), (1, 2));
    assert!(t.matches.iter().all(|m| m.pool_id == Some(t.pools[0].id)));
}

#[test]
fn four_team_pool_emits_winners_and_losers_matches_once_both_openers_are_done() {
    let (mut t, ids) = pool_tournament(&["W", "X", "Y", "Z"]);
    let (w, x, y, z) = (ids[0], ids[1], ids[2], ids[3]);
    let mut rng = StdRng::seed_from_u64(1);
    start_tournament(&mut t, &mut rng).unwrap();

    play(&mut t, &mut rng, 1, w, z, 7);
    assert_eq!(t.matches.len(), 2);

    play(&mut t, &mut rng, 1, x, y, 11);
    assert_eq!(t.matches.len(), 4);
    assert!(find_match(&t, 2, w, x).is_some());
    assert!(find_match(&t, 2, z, y).is_some());

    assert!(derive_matches(&t, &mut rng).is_empty());
    assert_no_duplicates(&t);
}

#[test]
fn four_team_pool_barrage_decides_second_qualifier() {
    let (mut t, ids) = pool_tournament(&["W", "X", "Y", "Z"]);
    let (w, x, y, z) = (ids[0], ids[1], ids[2], ids[3]);
    let mut rng = StdRng::seed_from_u64(1);
    start_tournament(&mut t, &mut rng).unwrap();

    play(&mut t, &mut rng, 1, w, z, 7);
    play(&mut t, &mut rng, 1, x, y, 11);
    play(&mut t, &mut rng, 2, w, x, 5);
    assert!(find_match(&t, BARRAGE_ROUND, x, y).is_none());
    assert_eq!(pool_outcome(&t.pools[0], &t.matches), PoolOutcome::Pending);

    play(&mut t, &mut rng, 2, y, z, 10);
    // X and Y are both on one win.
    assert!(find_match(&t, BARRAGE_ROUND, x, y).is_some());
    assert_eq!(pool_outcome(&t.pools[0], &t.matches), PoolOutcome::Pending);

    play(&mut t, &mut rng, BARRAGE_ROUND, y, x, 12);
    assert_eq!(
        pool_outcome(&t.pools[0], &t.matches),
        PoolOutcome::Qualified { first: w, second: y }
    );
    assert_eq!(refresh(&mut t, &mut rng), 0);
    assert_no_duplicates(&t);
}

#[test]
fn three_team_pool_starts_with_a_bye_for_the_top_seed() {
    let (mut t, ids) = pool_tournament(&["A", "B", "C"]);
    let mut rng = StdRng::seed_from_u64(1);

    start_tournament(&mut t, &mut rng).unwrap();

    assert_eq!(t.matches.len(), 2);
    let bye = bye_for(&t, 1, ids[0]).unwrap();
    assert!(bye.completed);
    assert_eq!(bye.court, 0);
    assert!(matches!(&bye.opponents, Opponents::Bye(b) if b.award == ByeAward::Pool));
    assert_eq!(bye.score.map(|s| (s.team1, s.team2)), Some((13, 0)));
    assert!(find_match(&t, 1, ids[1], ids[2]).is_some());
}

#[test]
fn three_team_pool_second_round_and_barrage() {
    let (mut t, ids) = pool_tournament(&["A", "B", "C"]);
    let (a, b, c) = (ids[0], ids[1], ids[2]);
    let mut rng = StdRng::seed_from_u64(1);
    start_tournament(&mut t, &mut rng).unwrap();

    play(&mut t, &mut rng, 1, b, c, 9);
    assert!(find_match(&t, 2, b, a).is_some());
    let bye = bye_for(&t, 2, c).unwrap();
    assert_eq!(bye.score.map(|s| (s.team1, s.team2)), Some((13, 0)));
    assert_eq!(t.matches.len(), 4);

    play(&mut t, &mut rng, 2, a, b, 11);
    let wins = |id: TeamId| t.team(id).unwrap().stats.wins;
    assert_eq!((wins(a), wins(b), wins(c)), (2, 1, 1));
    assert!(find_match(&t, BARRAGE_ROUND, b, c).is_some());
    assert_eq!(pool_outcome(&t.pools[0], &t.matches), PoolOutcome::Pending);

    play(&mut t, &mut rng, BARRAGE_ROUND, c, b, 4);
    let records = pool_records(&t.pools[0], &t.matches);
    // C: lost 9-13, bye 13-0, barrage won 13-4.
    assert_eq!(records[&c], PoolRecord { wins: 2, performance: 18 });
    assert_eq!(
        pool_outcome(&t.pools[0], &t.matches),
        PoolOutcome::Qualified { first: a, second: c }
    );
    assert_no_duplicates(&t);
}

#[test]
fn pool_derivation_is_idempotent() {
    let (mut t, ids) = pool_tournament(&["A", "B", "C"]);
    let mut rng = StdRng::seed_from_u64(1);
    start_tournament(&mut t, &mut rng).unwrap();
    play(&mut t, &mut rng, 1, ids[2], ids[1], 3);

    let before = t.matches.len();
    assert_eq!(refresh(&mut t, &mut rng), 0);
    assert_eq!(refresh(&mut t, &mut rng), 0);
    assert_eq!(t.matches.len(), before);
    assert!(derive_matches(&t, &mut rng).is_empty());
}

#[test]
fn pools_play_on_their_own_courts() {
    assert_eq!(pool_courts(0, 4), (1, 2));
    assert_eq!(pool_courts(1, 4), (3, 4));
    assert_eq!(pool_courts(1, 3), (3, 1));
    assert_eq!(pool_courts(2, 1), (1, 1));
}

#[test]
fn nothing_is_derived_before_start() {
    let (t, _) = pool_tournament(&["A", "B", "C", "D"]);
    let mut rng = StdRng::seed_from_u64(1);

    assert!(derive_matches(&t, &mut rng).is_empty());
}

#[test]
fn corrected_opener_only_counts_the_new_pairings() {
    let (mut t, ids) = pool_tournament(&["W", "X", "Y", "Z"]);
    let (w, x, y, z) = (ids[0], ids[1], ids[2], ids[3]);
    let mut rng = StdRng::seed_from_u64(1);
    start_tournament(&mut t, &mut rng).unwrap();
    play(&mut t, &mut rng, 1, w, z, 5);
    play(&mut t, &mut rng, 1, x, y, 5);

    // Z actually won the opener.
    let opener = match_id(&t, 1, w, z);
    record_score(&mut t, opener, 5, 13, &mut rng).unwrap();
    assert!(find_match(&t, 2, z, x).is_some());
    assert!(find_match(&t, 2, w, y).is_some());
    assert_eq!(t.matches.iter().filter(|m| m.round == 2).count(), 4);

    // The old pairings were played too before anyone noticed.
    play(&mut t, &mut rng, 2, w, x, 8);
    play(&mut t, &mut rng, 2, y, z, 8);
    play(&mut t, &mut rng, 2, z, x, 8);
    play(&mut t, &mut rng, 2, w, y, 8);

    assert_eq!(pool_outcome(&t.pools[0], &t.matches), PoolOutcome::Pending);
    assert!(find_match(&t, BARRAGE_ROUND, w, x).is_some());
    assert!(t.matches.iter().all(|m| m.bracket.is_none()));
    let records = pool_records(&t.pools[0], &t.matches);
    assert_eq!(records[&z].wins, 2);
    assert_eq!(records[&w].wins, 1);

    play(&mut t, &mut rng, BARRAGE_ROUND, w, x, 6);
    assert_eq!(
        pool_outcome(&t.pools[0], &t.matches),
        PoolOutcome::Qualified { first: z, second: w }
    );
    let final_match = t.matches.iter().find(|m| m.bracket.is_some()).unwrap();
    assert_eq!(final_match.round, 4);
}
