//! Flat match record as stored by existing hosts, with both self-referential
//! bye encodings (`team1Id == team2Id`).

use crate::models::game::{
    BracketRef, Bye, ByeAward, GameMatch, MatchId, Opponents, Score,
};
use crate::models::pool::PoolId;
use crate::models::team::TeamId;
use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: MatchId,
    pub round: u32,
    pub court: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1_ids: Option<Vec<TeamId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2_ids: Option<Vec<TeamId>>,
    #[serde(default)]
    pub score1: Option<u32>,
    #[serde(default)]
    pub score2: Option<u32>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_bye: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<PoolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bracket: Option<BracketRef>,
}

impl From<&GameMatch> for MatchRecord {
    fn from(m: &GameMatch) -> Self {
        let mut record = MatchRecord {
            id: m.id,
            round: m.round,
            court: m.court,
            team1_id: None,
            team2_id: None,
            team1_ids: None,
            team2_ids: None,
            score1: m.score.map(|s| s.team1),
            score2: m.score.map(|s| s.team2),
            completed: m.completed,
            is_bye: m.is_bye(),
            pool_id: m.pool_id,
            bracket: m.bracket,
        };
        match &m.opponents {
            Opponents::Single { team1, team2 } => {
                record.team1_id = Some(*team1);
                record.team2_id = Some(*team2);
            }
            Opponents::Grouped { team1, team2 } => {
                record.team1_ids = Some(team1.clone());
                record.team2_ids = Some(team2.clone());
            }
            Opponents::Bye(bye) => {
                record.team1_id = Some(bye.team);
                record.team2_id = Some(bye.team);
            }
        }
        record
    }
}

impl TryFrom<MatchRecord> for GameMatch {
    type Error = TournamentError;

    fn try_from(r: MatchRecord) -> Result<Self, Self::Error> {
        let score = match (r.score1, r.score2) {
            (Some(a), Some(b)) => Some(Score::new(a, b)),
            _ => None,
        };
        let opponents = match (r.team1_id, r.team2_id, r.team1_ids, r.team2_ids) {
            (Some(a), Some(b), _, _) if r.is_bye || a == b => {
                let award = if r.score2 == Some(0) {
                    ByeAward::Pool
                } else {
                    ByeAward::Standard
                };
                Opponents::Bye(Bye { team: a, award })
            }
            (Some(a), None, _, _) if r.is_bye => Opponents::Bye(Bye {
                team: a,
                award: ByeAward::Standard,
            }),
            (Some(team1), Some(team2), _, _) => Opponents::Single { team1, team2 },
            (None, None, Some(team1), Some(team2)) if !team1.is_empty() && !team2.is_empty() => {
                Opponents::Grouped { team1, team2 }
            }
            _ => return Err(TournamentError::MalformedMatch(r.id)),
        };
        let is_bye = matches!(opponents, Opponents::Bye(_));
        Ok(GameMatch {
            id: r.id,
            round: r.round,
            court: if is_bye { 0 } else { r.court },
            score: match &opponents {
                Opponents::Bye(bye) => Some(bye.award.score()),
                _ => score,
            },
            completed: r.completed || is_bye,
            opponents,
            pool_id: r.pool_id,
            bracket: r.bracket,
        })
    }
}
