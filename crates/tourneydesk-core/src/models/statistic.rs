use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, MatchId, ParticipantId, StatisticId};

/// Counters for one participant in one match.
///
/// Missing counters deserialize as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ParticipantStatistic {
    #[serde(default, skip_serializing_if = "StatisticId::is_pending")]
    pub id: StatisticId,
    pub participant_id: ParticipantId,
    pub match_id: MatchId,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub plants: u32,
    #[serde(default)]
    pub defuses: u32,
    #[serde(default)]
    pub mvp: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ParticipantStatisticPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kills: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaths: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assists: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plants: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defuses: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mvp: Option<bool>,
}

impl Entity for ParticipantStatistic {
    type Id = StatisticId;
    type Patch = ParticipantStatisticPatch;

    const KIND: EntityKind = EntityKind::ParticipantStatistic;

    fn id(&self) -> &StatisticId {
        &self.id
    }

    fn apply(&mut self, patch: &ParticipantStatisticPatch) {
        if let Some(kills) = patch.kills {
            self.kills = kills;
        }
        if let Some(deaths) = patch.deaths {
            self.deaths = deaths;
        }
        if let Some(assists) = patch.assists {
            self.assists = assists;
        }
        if let Some(plants) = patch.plants {
            self.plants = plants;
        }
        if let Some(defuses) = patch.defuses {
            self.defuses = defuses;
        }
        if let Some(mvp) = patch.mvp {
            self.mvp = mvp;
        }
    }

    /// One row per (participant, match)
    fn conflicts_with(&self, other: &Self) -> bool {
        self.participant_id == other.participant_id && self.match_id == other.match_id
    }
}

/// Aggregated per-player row from `GET /participant-stats/all-players`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStatsRow {
    pub participant_id: Option<ParticipantId>,
    pub name: String,
    pub nickname: Option<String>,
    pub team_name: Option<String>,
    pub matches: u32,
    pub wins: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub plants: u32,
    pub defuses: u32,
    pub mvps: u32,
}
