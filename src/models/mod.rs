//! Data structures for the petanque tournament: teams, matches, pools, tournament state.

mod game;
mod pool;
mod record;
mod team;
mod tournament;

pub use game::{
    BracketRef, BracketWin, Bye, ByeAward, GameMatch, MatchId, Opponents, Score, Side,
    WINNING_SCORE,
};
pub use pool::{Pool, PoolId};
pub use record::MatchRecord;
pub use team::{Team, TeamId, TeamStats};
pub use tournament::{
    Tournament, TournamentError, TournamentFormat, TournamentId, TournamentState,
};
