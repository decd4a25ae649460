//! Match, its opponents, byes and scores.

use crate::models::pool::PoolId;
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// A game is played to 13 points.
pub const WINNING_SCORE: u32 = 13;

/// Which side of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

/// Points of both sides, in `team1`/`team2` order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub team1: u32,
    pub team2: u32,
}

impl Score {
    pub fn new(team1: u32, team2: u32) -> Self {
        Self { team1, team2 }
    }

    /// Side with the strictly greater score, `None` on a tie.
    pub fn winner(&self) -> Option<Side> {
        match self.team1.cmp(&self.team2) {
            std::cmp::Ordering::Greater => Some(Side::One),
            std::cmp::Ordering::Less => Some(Side::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// `(scored, conceded)` from the given side's point of view.
    pub fn for_side(&self, side: Side) -> (u32, u32) {
        match side {
            Side::One => (self.team1, self.team2),
            Side::Two => (self.team2, self.team1),
        }
    }
}

/// The two fixed bye scorings.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByeAward {
    /// Odd team out in a round: 13-7.
    Standard,
    /// Automatic win inside a 3-team pool: 13-0.
    Pool,
}

impl ByeAward {
    pub fn score(self) -> Score {
        match self {
            ByeAward::Standard => Score::new(WINNING_SCORE, 7),
            ByeAward::Pool => Score::new(WINNING_SCORE, 0),
        }
    }
}

/// An automatic win for a single team.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bye {
    pub team: TeamId,
    pub award: ByeAward,
}

/// Who plays in a match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Opponents {
    /// One team against another.
    Single { team1: TeamId, team2: TeamId },
    /// Combined teams against combined teams (four-team rotation format).
    Grouped {
        team1: Vec<TeamId>,
        team2: Vec<TeamId>,
    },
    Bye(Bye),
}

impl Opponents {
    /// Team ids on one side. A bye only has side one.
    pub fn side(&self, side: Side) -> Vec<TeamId> {
        match (self, side) {
            (Opponents::Single { team1, .. }, Side::One) => vec![*team1],
            (Opponents::Single { team2, .. }, Side::Two) => vec![*team2],
            (Opponents::Grouped { team1, .. }, Side::One) => team1.clone(),
            (Opponents::Grouped { team2, .. }, Side::Two) => team2.clone(),
            (Opponents::Bye(bye), Side::One) => vec![bye.team],
            (Opponents::Bye(_), Side::Two) => Vec::new(),
        }
    }

    /// Which side the team plays on, if it plays at all.
    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        match self {
            Opponents::Single { team1, team2 } => {
                if *team1 == team {
                    Some(Side::One)
                } else if *team2 == team {
                    Some(Side::Two)
                } else {
                    None
                }
            }
            Opponents::Grouped { team1, team2 } => {
                if team1.contains(&team) {
                    Some(Side::One)
                } else if team2.contains(&team) {
                    Some(Side::Two)
                } else {
                    None
                }
            }
            Opponents::Bye(bye) => (bye.team == team).then_some(Side::One),
        }
    }

    /// Every team taking part (the bye recipient included).
    pub fn teams(&self) -> Vec<TeamId> {
        let mut ids = self.side(Side::One);
        ids.extend(self.side(Side::Two));
        ids
    }
}

/// Links an emitted match record to its slot in the elimination bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketRef {
    /// Deterministic id of the bracket match (winners are keyed by it).
    pub id: MatchId,
    pub phase: usize,
    pub position: usize,
}

/// A recorded elimination result. `loser` is `None` when the winner advanced on a bye.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketWin {
    pub winner: TeamId,
    pub loser: Option<TeamId>,
}

impl BracketWin {
    pub fn over(winner: TeamId, loser: TeamId) -> Self {
        Self {
            winner,
            loser: Some(loser),
        }
    }

    pub fn bye(winner: TeamId) -> Self {
        Self {
            winner,
            loser: None,
        }
    }

    /// Whether this result was decided between `a` and `b`, in either order.
    pub fn decides(&self, a: TeamId, b: TeamId) -> bool {
        (self.winner == a && self.loser == Some(b)) || (self.winner == b && self.loser == Some(a))
    }
}

/// A single match. Matches are append-only: once created only `court`,
/// `score` and `completed` change.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub round: u32,
    /// 0 means "no real court" (byes).
    pub court: u32,
    pub opponents: Opponents,
    /// None if not yet played.
    pub score: Option<Score>,
    pub completed: bool,
    pub pool_id: Option<PoolId>,
    #[serde(default)]
    pub bracket: Option<BracketRef>,
}

impl GameMatch {
    /// A playable match between two teams.
    pub fn single(team1: TeamId, team2: TeamId, round: u32, court: u32) -> Self {
        Self::with_opponents(Opponents::Single { team1, team2 }, round, court)
    }

    /// A playable match between two groups of teams.
    pub fn grouped(team1: Vec<TeamId>, team2: Vec<TeamId>, round: u32, court: u32) -> Self {
        Self::with_opponents(Opponents::Grouped { team1, team2 }, round, court)
    }

    /// An automatic win: already completed, court 0, fixed score.
    pub fn bye(team: TeamId, award: ByeAward, round: u32) -> Self {
        Self {
            score: Some(award.score()),
            completed: true,
            ..Self::with_opponents(Opponents::Bye(Bye { team, award }), round, 0)
        }
    }

    fn with_opponents(opponents: Opponents, round: u32, court: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            court,
            opponents,
            score: None,
            completed: false,
            pool_id: None,
            bracket: None,
        }
    }

    pub fn in_pool(mut self, pool_id: PoolId) -> Self {
        self.pool_id = Some(pool_id);
        self
    }

    pub fn in_bracket(mut self, bracket: BracketRef) -> Self {
        self.bracket = Some(bracket);
        self
    }

    pub fn is_bye(&self) -> bool {
        matches!(self.opponents, Opponents::Bye(_))
    }

    /// Winning side of a completed match. A bye is always won by side one.
    pub fn winner_side(&self) -> Option<Side> {
        if !self.completed {
            return None;
        }
        match self.opponents {
            Opponents::Bye(_) => Some(Side::One),
            _ => self.score.as_ref().and_then(Score::winner),
        }
    }

    /// Winner of a completed one-against-one match or bye.
    pub fn winner(&self) -> Option<TeamId> {
        let side = self.winner_side()?;
        match (&self.opponents, side) {
            (Opponents::Single { team1, .. }, Side::One) => Some(*team1),
            (Opponents::Single { team2, .. }, Side::Two) => Some(*team2),
            (Opponents::Bye(bye), _) => Some(bye.team),
            (Opponents::Grouped { .. }, _) => None,
        }
    }

    /// Loser of a completed one-against-one match. Byes have none.
    pub fn loser(&self) -> Option<TeamId> {
        let side = self.winner_side()?;
        match (&self.opponents, side) {
            (Opponents::Single { team2, .. }, Side::One) => Some(*team2),
            (Opponents::Single { team1, .. }, Side::Two) => Some(*team1),
            _ => None,
        }
    }
}
