//! Result entry: match scores and elimination winners. Each entry triggers a pass.

use crate::logic::progression::{bracket, refresh};
use crate::models::{
    BracketWin, MatchId, Opponents, Score, Side, TeamId, Tournament, TournamentError,
    TournamentFormat, TournamentState, WINNING_SCORE,
};
use rand::Rng;

fn ensure_playing(tournament: &Tournament) -> Result<(), TournamentError> {
    match tournament.state {
        TournamentState::Running | TournamentState::Completed => Ok(()),
        TournamentState::Setup => Err(TournamentError::InvalidState),
    }
}

/// Enter (or correct) the score of a match and run the recomputation pass.
///
/// For a bracket match the score also records its result. A bracket record whose
/// pairing has since changed upstream can no longer be scored.
pub fn record_score<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    match_id: MatchId,
    score1: u32,
    score2: u32,
    rng: &mut R,
) -> Result<(), TournamentError> {
    ensure_playing(tournament)?;
    if score1 > WINNING_SCORE || score2 > WINNING_SCORE {
        return Err(TournamentError::ScoreOutOfRange { max: WINNING_SCORE });
    }
    let score = Score::new(score1, score2);
    let side = score.winner().ok_or(TournamentError::TiedScore)?;

    let m = tournament
        .get_match(match_id)
        .ok_or(TournamentError::MatchNotFound(match_id))?;
    if m.is_bye() {
        return Err(TournamentError::ByeScore);
    }
    let bracket_result = match (m.bracket, &m.opponents) {
        (Some(b), &Opponents::Single { team1, team2 }) => {
            let current = bracket(tournament)
                .and_then(|view| view.find(b.id).map(|em| (em.team1, em.team2)));
            if current != Some((Some(team1), Some(team2))) {
                return Err(TournamentError::SupersededMatch(match_id));
            }
            let win = match side {
                Side::One => BracketWin::over(team1, team2),
                Side::Two => BracketWin::over(team2, team1),
            };
            Some((b.id, win))
        }
        _ => None,
    };

    if let Some(m) = tournament.get_match_mut(match_id) {
        m.score = Some(score);
        m.completed = true;
    }
    if let Some((bracket_id, win)) = bracket_result {
        tournament.bracket_winners.insert(bracket_id, win);
    }
    refresh(tournament, rng);
    Ok(())
}

/// Record the winner of an elimination match (last write wins) and run the pass.
/// Downstream phases follow on the next derivation.
pub fn set_bracket_winner<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    bracket_match_id: MatchId,
    team: TeamId,
    rng: &mut R,
) -> Result<(), TournamentError> {
    ensure_playing(tournament)?;
    if tournament.format != TournamentFormat::Pools {
        return Err(TournamentError::InvalidState);
    }
    let bracket = bracket(tournament).ok_or(TournamentError::InvalidState)?;
    let m = bracket
        .find(bracket_match_id)
        .ok_or(TournamentError::MatchNotFound(bracket_match_id))?;
    let (Some(team1), Some(team2)) = (m.team1, m.team2) else {
        return Err(TournamentError::InvalidState);
    };
    let win = if team == team1 {
        BracketWin::over(team1, team2)
    } else if team == team2 {
        BracketWin::over(team2, team1)
    } else {
        return Err(TournamentError::NotInMatch(team));
    };
    tournament.bracket_winners.insert(bracket_match_id, win);
    refresh(tournament, rng);
    Ok(())
}
