//! Tournament, its format and state.

use crate::models::game::{BracketWin, GameMatch, MatchId};
use crate::models::pool::Pool;
use crate::models::team::{Team, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TournamentError {
    /// Tournament is not in a state that allows this action.
    #[error("Invalid state for this action")]
    InvalidState,
    #[error("Team not found")]
    TeamNotFound(TeamId),
    #[error("Match not found")]
    MatchNotFound(MatchId),
    /// Team names are unique, case-insensitive.
    #[error("A team with this name already exists")]
    DuplicateTeamName,
    #[error("Team name must not be empty")]
    EmptyTeamName,
    #[error("Need at least {required} teams to start")]
    NotEnoughTeams { required: usize },
    #[error("Pools have not been assigned")]
    MissingPools,
    #[error("A pool must hold 3 or 4 teams (got {0})")]
    InvalidPoolSize(usize),
    #[error("Team is assigned to more than one pool")]
    OverlappingPools(TeamId),
    #[error("Team is not assigned to any pool")]
    UnassignedTeam(TeamId),
    #[error("A match cannot end in a tie")]
    TiedScore,
    #[error("Score must be between 0 and {max}")]
    ScoreOutOfRange { max: u32 },
    #[error("A bye has a fixed score")]
    ByeScore,
    #[error("Team does not play in this match")]
    NotInMatch(TeamId),
    #[error("This elimination match has been superseded by a new pairing")]
    SupersededMatch(MatchId),
    #[error("Malformed match record")]
    MalformedMatch(MatchId),
    #[error("Invalid CSV: {0}")]
    Csv(String),
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// How matches are produced.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Rounds paired by performance, no repeat pairings where possible.
    #[default]
    Standard,
    /// Teams combined in blocks of four on a fixed 7-round rotation.
    Quadrette,
    /// Solo players shuffled every round.
    FreeForAll,
    /// Pools of 3 or 4 teams, then a single-elimination bracket.
    Pools,
}

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    /// Registering teams, assigning pools; not started.
    #[default]
    Setup,
    /// Matches are being derived and played.
    Running,
    /// The elimination bracket has a champion.
    Completed,
}

/// Full tournament state: teams, matches, pools and recorded bracket winners.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub format: TournamentFormat,
    /// Number of courts available; courts are numbered from 1.
    pub courts: u32,
    /// Last generated round. Only advances for non-pool formats.
    pub current_round: u32,
    pub state: TournamentState,
    pub teams: Vec<Team>,
    /// Append-only.
    pub matches: Vec<GameMatch>,
    pub pools: Vec<Pool>,
    /// Elimination results keyed by bracket match id (last write wins).
    pub bracket_winners: HashMap<MatchId, BracketWin>,
}

impl Tournament {
    /// Create a new tournament in Setup state with no teams.
    pub fn new(name: impl Into<String>, format: TournamentFormat, courts: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            format,
            courts: courts.max(1),
            current_round: 0,
            state: TournamentState::Setup,
            teams: Vec::new(),
            matches: Vec::new(),
            pools: Vec::new(),
            bracket_winners: HashMap::new(),
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn get_match(&self, id: MatchId) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut GameMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Register a team (Setup only). Names must be unique (case-insensitive).
    pub fn add_team(
        &mut self,
        name: impl Into<String>,
        players: Vec<String>,
    ) -> Result<TeamId, TournamentError> {
        if self.state != TournamentState::Setup {
            return Err(TournamentError::InvalidState);
        }
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::EmptyTeamName);
        }
        let is_duplicate = self
            .teams
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(name_trimmed));
        if is_duplicate {
            return Err(TournamentError::DuplicateTeamName);
        }
        let players = players
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let team = Team::new(name_trimmed, players);
        let id = team.id;
        self.teams.push(team);
        Ok(id)
    }

    /// Withdraw a team (Setup only). Any pool partition is no longer valid and is dropped.
    pub fn remove_team(&mut self, team_id: TeamId) -> Result<(), TournamentError> {
        if self.state != TournamentState::Setup {
            return Err(TournamentError::InvalidState);
        }
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        self.teams.remove(idx);
        if !self.pools.is_empty() {
            log::info!("Team {} withdrew, pools cleared", team_id);
            self.pools.clear();
        }
        Ok(())
    }

    /// Install an externally computed pool partition (Setup only, Pools format).
    ///
    /// Each group is in seed order. Groups must hold 3 or 4 teams, be disjoint and
    /// together cover every registered team.
    pub fn set_pools(&mut self, groups: Vec<Vec<TeamId>>) -> Result<(), TournamentError> {
        if self.state != TournamentState::Setup || self.format != TournamentFormat::Pools {
            return Err(TournamentError::InvalidState);
        }
        let mut seen = HashSet::new();
        for group in &groups {
            if !(3..=4).contains(&group.len()) {
                return Err(TournamentError::InvalidPoolSize(group.len()));
            }
            for &id in group {
                if self.team(id).is_none() {
                    return Err(TournamentError::TeamNotFound(id));
                }
                if !seen.insert(id) {
                    return Err(TournamentError::OverlappingPools(id));
                }
            }
        }
        if let Some(missing) = self.teams.iter().find(|t| !seen.contains(&t.id)) {
            return Err(TournamentError::UnassignedTeam(missing.id));
        }
        self.pools = groups
            .into_iter()
            .enumerate()
            .map(|(i, teams)| Pool::new(pool_name(i), teams))
            .collect();
        Ok(())
    }

    /// Restart: back to Setup with the same teams. Clears matches, pools and results.
    pub fn restart_tournament(&mut self) -> Result<(), TournamentError> {
        if self.state == TournamentState::Setup {
            return Err(TournamentError::InvalidState);
        }
        self.matches.clear();
        self.pools.clear();
        self.bracket_winners.clear();
        self.current_round = 0;
        for team in &mut self.teams {
            team.stats = Default::default();
        }
        self.state = TournamentState::Setup;
        Ok(())
    }
}

/// "A", "B", ... "Z", "AA", "AB", ...
fn pool_name(index: usize) -> String {
    let letter = |i: usize| char::from(b'A' + (i % 26) as u8);
    if index < 26 {
        letter(index).to_string()
    } else {
        format!("{}{}", letter(index / 26 - 1), letter(index))
    }
}
