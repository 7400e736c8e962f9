use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{ChampionshipId, Entity, EntityKind, MatchId, TeamId};
use super::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
    Cancelled,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "Scheduled"),
            MatchStatus::Live => write!(f, "Live"),
            MatchStatus::Finished => write!(f, "Finished"),
            MatchStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Rounds won by each side, in team A / team B order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub team_a: u32,
    pub team_b: u32,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.team_a, self.team_b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Match {
    #[serde(default, skip_serializing_if = "MatchId::is_pending")]
    pub id: MatchId,
    pub championship_id: ChampionshipId,
    pub team_a_id: TeamId,
    pub team_b_id: TeamId,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub map: Option<String>,
    pub status: MatchStatus,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub winner_id: Option<TeamId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct MatchPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MatchStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<TeamId>,
}

impl Match {
    pub fn involves(&self, team: &TeamId) -> bool {
        &self.team_a_id == team || &self.team_b_id == team
    }

    pub fn opponent_of(&self, team: &TeamId) -> Option<&TeamId> {
        if &self.team_a_id == team {
            Some(&self.team_b_id)
        } else if &self.team_b_id == team {
            Some(&self.team_a_id)
        } else {
            None
        }
    }

    /// Result for `team`, only for finished matches it played in.
    ///
    /// An explicit winner takes precedence over the score.
    pub fn outcome_for(&self, team: &TeamId) -> Option<MatchOutcome> {
        if self.status != MatchStatus::Finished || !self.involves(team) {
            return None;
        }
        if let Some(ref winner) = self.winner_id {
            return Some(if winner == team {
                MatchOutcome::Win
            } else {
                MatchOutcome::Loss
            });
        }
        let score = self.score?;
        let (ours, theirs) = if &self.team_a_id == team {
            (score.team_a, score.team_b)
        } else {
            (score.team_b, score.team_a)
        };
        Some(match ours.cmp(&theirs) {
            std::cmp::Ordering::Greater => MatchOutcome::Win,
            std::cmp::Ordering::Less => MatchOutcome::Loss,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        })
    }

    pub fn score_display(&self) -> String {
        self.score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

impl Entity for Match {
    type Id = MatchId;
    type Patch = MatchPatch;

    const KIND: EntityKind = EntityKind::Match;

    fn id(&self) -> &MatchId {
        &self.id
    }

    fn apply(&mut self, patch: &MatchPatch) {
        if let Some(at) = patch.scheduled_at {
            self.scheduled_at = at;
        }
        if let Some(ref stage) = patch.stage {
            self.stage = Some(stage.clone());
        }
        if let Some(ref map) = patch.map {
            self.map = Some(map.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(score) = patch.score {
            self.score = Some(score);
        }
        if let Some(ref winner) = patch.winner_id {
            self.winner_id = Some(winner.clone());
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.team_a_id == self.team_b_id {
            errors.push("teamBId", "must differ from the first team");
        }
        if let Some(ref winner) = self.winner_id {
            if !self.involves(winner) {
                errors.push("winnerId", "must be one of the two teams");
            }
        }
        errors.into_result()
    }
}
