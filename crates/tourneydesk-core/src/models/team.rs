use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, ParticipantId, TeamId};
use super::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default, skip_serializing_if = "TeamId::is_pending")]
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub manager_name: Option<String>,
    /// Ordered participant references
    #[serde(default)]
    pub roster: Vec<ParticipantId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster: Option<Vec<ParticipantId>>,
}

impl Team {
    pub fn roster_size(&self) -> usize {
        self.roster.len()
    }

    pub fn has_member(&self, participant: &ParticipantId) -> bool {
        self.roster.contains(participant)
    }

    pub fn manager_display(&self) -> &str {
        self.manager_name.as_deref().unwrap_or("No manager")
    }
}

impl Entity for Team {
    type Id = TeamId;
    type Patch = TeamPatch;

    const KIND: EntityKind = EntityKind::Team;

    fn id(&self) -> &TeamId {
        &self.id
    }

    fn apply(&mut self, patch: &TeamPatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref manager) = patch.manager_name {
            self.manager_name = Some(manager.clone());
        }
        if let Some(ref roster) = patch.roster {
            self.roster = roster.clone();
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_empty("name", &self.name);
        for (i, member) in self.roster.iter().enumerate() {
            if self.roster[..i].contains(member) {
                errors.push("roster", format!("lists {} more than once", member));
                break;
            }
        }
        errors.into_result()
    }
}
