use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{ChampionshipId, Entity, EntityKind, SubscriptionId, TeamId};

/// Enrollment of a team into a championship.
///
/// At most one subscription may exist per (team, championship) pair;
/// repositories enforce this through [`Entity::conflicts_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "SubscriptionId::is_pending")]
    pub id: SubscriptionId,
    pub team_id: TeamId,
    pub championship_id: ChampionshipId,
    pub subscribed_on: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed_on: Option<NaiveDate>,
}

impl Subscription {
    pub fn links(&self, team: &TeamId, championship: &ChampionshipId) -> bool {
        &self.team_id == team && &self.championship_id == championship
    }
}

impl Entity for Subscription {
    type Id = SubscriptionId;
    type Patch = SubscriptionPatch;

    const KIND: EntityKind = EntityKind::Subscription;

    fn id(&self) -> &SubscriptionId {
        &self.id
    }

    fn apply(&mut self, patch: &SubscriptionPatch) {
        if let Some(date) = patch.subscribed_on {
            self.subscribed_on = date;
        }
    }

    fn conflicts_with(&self, other: &Self) -> bool {
        other.links(&self.team_id, &self.championship_id)
    }
}
