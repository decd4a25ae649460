//! Petanque tournament engine: models, standings, pairing, pools and elimination bracket.

pub mod logic;
pub mod models;

pub use logic::{
    bracket, compute_standings, derive_matches, import_teams_csv, pair_round, pool_outcome,
    rank_by_performance, rank_by_standings, record_score, refresh, set_bracket_winner,
    start_tournament, Bracket, Derivation, EliminationMatch, PoolOutcome,
};
pub use models::{
    BracketRef, BracketWin, Bye, ByeAward, GameMatch, MatchId, MatchRecord, Opponents, Pool,
    PoolId, Score, Side, Team, TeamId, TeamStats, Tournament, TournamentError, TournamentFormat,
    TournamentId, TournamentState,
};
