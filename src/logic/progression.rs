//! The recomputation pass run after every state change.
//!
//! `derive_matches` is a pure function from the tournament snapshot to the matches
//! (and bracket bye winners) that should be appended. `refresh` applies it and
//! recomputes standings. Running either twice on the same state adds nothing.

use crate::logic::elimination::{qualified_slots, Bracket};
use crate::logic::index::MatchIndex;
use crate::logic::pairing::pair_round;
use crate::logic::pools::advance_pool;
use crate::logic::standings::compute_standings;
use crate::models::{BracketWin, GameMatch, MatchId, Tournament, TournamentFormat, TournamentState};
use rand::Rng;

/// What a pass adds to the tournament.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Derivation {
    pub matches: Vec<GameMatch>,
    /// Bracket byes decided without a match.
    pub bracket_winners: Vec<(MatchId, BracketWin)>,
}

impl Derivation {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.bracket_winners.is_empty()
    }
}

/// Matches unlocked by the current state, by tournament format.
///
/// Non-pool formats produce the next round once every match of the current one
/// is completed, unless that round would hold byes only. The pool format
/// advances every pool and, once all pools are decided, the elimination bracket.
pub fn derive_matches<R: Rng + ?Sized>(tournament: &Tournament, rng: &mut R) -> Derivation {
    if tournament.state == TournamentState::Setup {
        return Derivation::default();
    }
    match tournament.format {
        TournamentFormat::Pools => derive_pool_matches(tournament),
        format => {
            if !round_completed(tournament) {
                return Derivation::default();
            }
            let teams = compute_standings(&tournament.teams, &tournament.matches);
            let matches = pair_round(
                format,
                &teams,
                &tournament.matches,
                tournament.current_round + 1,
                tournament.courts,
                rng,
            );
            // A round of byes only would be complete at once and never stop.
            if matches.iter().all(GameMatch::is_bye) {
                return Derivation::default();
            }
            Derivation {
                matches,
                bracket_winners: Vec::new(),
            }
        }
    }
}

fn round_completed(tournament: &Tournament) -> bool {
    tournament
        .matches
        .iter()
        .filter(|m| m.round == tournament.current_round)
        .all(|m| m.completed)
}

fn derive_pool_matches(tournament: &Tournament) -> Derivation {
    let mut index = MatchIndex::build(&tournament.matches);
    let mut derivation = Derivation::default();

    for (i, pool) in tournament.pools.iter().enumerate() {
        derivation.matches.extend(advance_pool(
            pool,
            i,
            tournament.courts,
            &tournament.matches,
            &mut index,
        ));
    }

    if let Some(bracket) = bracket(tournament) {
        derivation.bracket_winners = bracket.unrecorded_bye_winners(&tournament.bracket_winners);
        derivation
            .matches
            .extend(bracket.playable_matches(tournament.courts, &mut index));
    }
    derivation
}

/// The elimination bracket, once every pool is decided.
pub fn bracket(tournament: &Tournament) -> Option<Bracket> {
    if tournament.format != TournamentFormat::Pools {
        return None;
    }
    let slots = qualified_slots(&tournament.pools, &tournament.matches)?;
    Some(Bracket::resolve(
        tournament.id,
        &slots,
        &tournament.bracket_winners,
    ))
}

/// Run one full pass: derive, append, recompute standings, update round and state.
/// Returns the number of matches appended.
pub fn refresh<R: Rng + ?Sized>(tournament: &mut Tournament, rng: &mut R) -> usize {
    let derivation = derive_matches(tournament, rng);
    if !derivation.is_empty() {
        log::debug!(
            "Tournament {}: {} new match(es), {} bye winner(s)",
            tournament.id,
            derivation.matches.len(),
            derivation.bracket_winners.len()
        );
    }
    let added = derivation.matches.len();

    if let Some(round) = derivation.matches.iter().map(|m| m.round).max() {
        if tournament.format != TournamentFormat::Pools {
            tournament.current_round = tournament.current_round.max(round);
        }
    }
    tournament.matches.extend(derivation.matches);
    for (id, win) in derivation.bracket_winners {
        log::debug!("Bracket match {} decided by bye for {}", id, win.winner);
        tournament.bracket_winners.insert(id, win);
    }
    tournament.teams = compute_standings(&tournament.teams, &tournament.matches);

    if tournament.format == TournamentFormat::Pools && tournament.state != TournamentState::Setup
    {
        let champion = bracket(tournament).and_then(|b| b.champion());
        let state = match champion {
            Some(_) => TournamentState::Completed,
            None => TournamentState::Running,
        };
        if state != tournament.state {
            log::info!("Tournament {} is now {:?}", tournament.id, state);
            tournament.state = state;
        }
    }
    added
}
