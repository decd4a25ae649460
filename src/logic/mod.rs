//! Tournament engine: standings, pairing, pool brackets, elimination bracket.

mod elimination;
mod index;
mod pairing;
mod pools;
mod progression;
mod results;
mod setup;
mod standings;

pub use elimination::{
    bracket_match_id, phase_names, qualified_slots, Bracket, EliminationMatch, Phase,
    FIRST_BRACKET_ROUND,
};
pub use index::{MatchIndex, MatchKey, Stage};
pub use pairing::{pair_round, QUADRETTE_ROUNDS};
pub use pools::{
    advance_pool, pool_courts, pool_outcome, pool_records, PoolOutcome, PoolRecord, BARRAGE_ROUND,
};
pub use progression::{bracket, derive_matches, refresh, Derivation};
pub use results::{record_score, set_bracket_winner};
pub use setup::{import_teams_csv, start_tournament};
pub use standings::{compute_standings, rank_by_performance, rank_by_standings};
