//! Integration tests for round pairing in the non-pool formats.

use petanque_tournament::{
    pair_round, ByeAward, GameMatch, Opponents, Team, TeamStats, TournamentFormat,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn teams_with_performance(perfs: &[i32]) -> Vec<Team> {
    perfs
        .iter()
        .enumerate()
        .map(|(i, &p)| Team {
            stats: TeamStats {
                performance: p,
                ..Default::default()
            },
            ..Team::new(format!("T{i}"), Vec::new())
        })
        .collect()
}

fn single_pair(m: &GameMatch) -> (uuid::Uuid, uuid::Uuid) {
    match m.opponents {
        Opponents::Single { team1, team2 } => (team1, team2),
        _ => panic!("expected a single match, got {:?}", m.opponents),
    }
}

fn bye_team(m: &GameMatch) -> Option<uuid::Uuid> {
    match &m.opponents {
        Opponents::Bye(bye) => Some(bye.team),
        _ => None,
    }
}

#[test]
fn standard_pairs_by_performance_and_avoids_rematches() {
    let t = teams_with_performance(&[10, 8, 6, 4]);
    let history = vec![
        GameMatch::single(t[0].id, t[1].id, 1, 1),
        GameMatch::single(t[2].id, t[3].id, 1, 2),
    ];
    let mut rng = StdRng::seed_from_u64(1);

    let round = pair_round(TournamentFormat::Standard, &t, &history, 2, 4, &mut rng);

    assert_eq!(round.len(), 2);
    assert_eq!(single_pair(&round[0]), (t[0].id, t[2].id));
    assert_eq!(single_pair(&round[1]), (t[1].id, t[3].id));
    assert!(round.iter().all(|m| m.round == 2 && !m.completed));
}

#[test]
fn standard_falls_back_to_next_team_when_everyone_was_met() {
    let t = teams_with_performance(&[5, 1]);
    let history = vec![GameMatch::single(t[1].id, t[0].id, 1, 1)];
    let mut rng = StdRng::seed_from_u64(1);

    let round = pair_round(TournamentFormat::Standard, &t, &history, 2, 1, &mut rng);

    assert_eq!(round.len(), 1);
    assert_eq!(single_pair(&round[0]), (t[0].id, t[1].id));
}

#[test]
fn standard_courts_cycle_in_pairing_order() {
    let t = teams_with_performance(&[6, 5, 4, 3, 2, 1]);
    let mut rng = StdRng::seed_from_u64(1);

    let round = pair_round(TournamentFormat::Standard, &t, &[], 1, 2, &mut rng);

    let courts: Vec<u32> = round.iter().map(|m| m.court).collect();
    assert_eq!(courts, vec![1, 2, 1]);
}

#[test]
fn standard_first_round_bye_is_random_but_reproducible() {
    let t = teams_with_performance(&[0, 0, 0, 0, 0]);

    let draw = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        pair_round(TournamentFormat::Standard, &t, &[], 1, 4, &mut rng)
    };
    let first = draw(7);
    let second = draw(7);

    assert_eq!(first.len(), 3);
    let byes: Vec<_> = first.iter().filter_map(bye_team).collect();
    assert_eq!(byes.len(), 1);
    assert_eq!(byes, second.iter().filter_map(bye_team).collect::<Vec<_>>());

    let bye = first.iter().find(|m| m.is_bye()).unwrap();
    assert_eq!(bye.court, 0);
    assert!(bye.completed);
    assert!(matches!(&bye.opponents, Opponents::Bye(b) if b.award == ByeAward::Standard));
}

#[test]
fn standard_later_bye_goes_to_lowest_ranked() {
    let t = teams_with_performance(&[9, 7, 5, 3, 1]);
    let mut rng = StdRng::seed_from_u64(3);

    let round = pair_round(TournamentFormat::Standard, &t, &[], 2, 4, &mut rng);

    let byes: Vec<_> = round.iter().filter_map(bye_team).collect();
    assert_eq!(byes, vec![t[4].id]);
}

#[test]
fn standard_later_bye_skips_teams_that_already_had_one() {
    let t = teams_with_performance(&[9, 7, 5, 3, 1]);
    let history = vec![GameMatch::bye(t[4].id, ByeAward::Standard, 1)];
    let mut rng = StdRng::seed_from_u64(3);

    let round = pair_round(TournamentFormat::Standard, &t, &history, 2, 4, &mut rng);

    let byes: Vec<_> = round.iter().filter_map(bye_team).collect();
    assert_eq!(byes, vec![t[3].id]);
}

#[test]
fn fewer_than_two_teams_yields_nothing() {
    let t = teams_with_performance(&[0]);
    let mut rng = StdRng::seed_from_u64(1);

    for format in [
        TournamentFormat::Standard,
        TournamentFormat::Quadrette,
        TournamentFormat::FreeForAll,
    ] {
        assert!(pair_round(format, &t, &[], 1, 2, &mut rng).is_empty());
    }
}

fn grouped_sides(m: &GameMatch) -> (Vec<uuid::Uuid>, Vec<uuid::Uuid>) {
    match &m.opponents {
        Opponents::Grouped { team1, team2 } => (team1.clone(), team2.clone()),
        other => panic!("expected a grouped match, got {other:?}"),
    }
}

#[test]
fn quadrette_rotation_covers_every_split_and_sits_each_member_out_once() {
    let t = teams_with_performance(&[0, 0, 0, 0]);
    let ids: Vec<_> = t.iter().map(|t| t.id).collect();
    let mut rng = StdRng::seed_from_u64(1);

    let mut splits = HashSet::new();
    let mut sat_out = Vec::new();
    for round in 1..=7 {
        let matches = pair_round(TournamentFormat::Quadrette, &t, &[], round, 2, &mut rng);
        assert_eq!(matches.len(), 1);
        let (mut side1, mut side2) = grouped_sides(&matches[0]);
        side1.sort();
        side2.sort();
        if round <= 3 {
            assert_eq!((side1.len(), side2.len()), (2, 2));
            let split = if side1 < side2 { (side1, side2) } else { (side2, side1) };
            assert!(splits.insert(split), "split repeated in round {round}");
        } else {
            assert_eq!((side1.len(), side2.len()), (2, 1));
            let playing: HashSet<_> = side1.iter().chain(side2.iter()).copied().collect();
            sat_out.extend(ids.iter().copied().filter(|id| !playing.contains(id)));
        }
    }

    assert_eq!(splits.len(), 3);
    sat_out.sort();
    let mut expected = ids.clone();
    expected.sort();
    assert_eq!(sat_out, expected);
}

#[test]
fn quadrette_stops_after_seven_rounds() {
    let t = teams_with_performance(&[0; 8]);
    let mut rng = StdRng::seed_from_u64(1);

    assert_eq!(pair_round(TournamentFormat::Quadrette, &t, &[], 7, 2, &mut rng).len(), 2);
    assert!(pair_round(TournamentFormat::Quadrette, &t, &[], 8, 2, &mut rng).is_empty());
}

#[test]
fn quadrette_incomplete_block_gets_byes() {
    let t = teams_with_performance(&[0; 6]);
    let mut rng = StdRng::seed_from_u64(1);

    let round = pair_round(TournamentFormat::Quadrette, &t, &[], 1, 3, &mut rng);

    assert_eq!(round.len(), 3);
    assert_eq!(round[0].court, 1);
    let byes: Vec<_> = round.iter().filter_map(bye_team).collect();
    assert_eq!(byes, vec![t[4].id, t[5].id]);
}

#[test]
fn free_for_all_is_limited_by_courts() {
    let t = teams_with_performance(&[0; 7]);
    let mut rng = StdRng::seed_from_u64(11);

    let round = pair_round(TournamentFormat::FreeForAll, &t, &[], 1, 2, &mut rng);

    assert_eq!(round.len(), 2);
    assert!(round.iter().all(|m| !m.is_bye()));
    let playing: HashSet<_> = round.iter().flat_map(|m| m.opponents.teams()).collect();
    assert_eq!(playing.len(), 4);
}

#[test]
fn free_for_all_leaves_odd_team_unscheduled() {
    let t = teams_with_performance(&[0; 7]);
    let mut rng = StdRng::seed_from_u64(11);

    let round = pair_round(TournamentFormat::FreeForAll, &t, &[], 1, 10, &mut rng);

    assert_eq!(round.len(), 3);
    assert!(round.iter().all(|m| !m.is_bye()));
}

#[test]
fn free_for_all_shuffle_is_reproducible_with_a_seed() {
    let t = teams_with_performance(&[0; 8]);
    let pairs = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        pair_round(TournamentFormat::FreeForAll, &t, &[], 1, 4, &mut rng)
            .iter()
            .map(single_pair)
            .collect::<Vec<_>>()
    };

    assert_eq!(pairs(42), pairs(42));
}
