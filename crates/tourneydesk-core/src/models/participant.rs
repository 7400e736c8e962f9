use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, ParticipantId, TeamId};
use super::validation::ValidationErrors;
use crate::utils::phone_digits;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    Player,
    Coach,
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantRole::Player => write!(f, "Player"),
            ParticipantRole::Coach => write!(f, "Coach"),
        }
    }
}

/// A player or coach, distinguished by `is_coach`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(default, skip_serializing_if = "ParticipantId::is_pending")]
    pub id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub is_coach: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_coach: Option<bool>,
}

impl Participant {
    pub fn role(&self) -> ParticipantRole {
        if self.is_coach {
            ParticipantRole::Coach
        } else {
            ParticipantRole::Player
        }
    }

    /// Name followed by the nickname in parentheses, when one is set
    pub fn display_name(&self) -> String {
        match self.nickname.as_deref().filter(|n| !n.is_empty()) {
            Some(nick) => format!("{} ({})", self.name, nick),
            None => self.name.clone(),
        }
    }

    /// Age in whole years on the given date
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        let mut age = date.year() - birth.year();
        if (date.month(), date.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }
}

impl Entity for Participant {
    type Id = ParticipantId;
    type Patch = ParticipantPatch;

    const KIND: EntityKind = EntityKind::Participant;

    fn id(&self) -> &ParticipantId {
        &self.id
    }

    fn apply(&mut self, patch: &ParticipantPatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(ref nickname) = patch.nickname {
            self.nickname = Some(nickname.clone());
        }
        if let Some(birth) = patch.birth_date {
            self.birth_date = Some(birth);
        }
        if let Some(ref phone) = patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(ref team) = patch.team_id {
            self.team_id = Some(team.clone());
        }
        if let Some(is_coach) = patch.is_coach {
            self.is_coach = is_coach;
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_empty("name", &self.name);
        if let Some(ref phone) = self.phone {
            let digits = phone_digits(phone).len();
            if digits != 10 && digits != 11 {
                errors.push("phone", "must have 10 or 11 digits");
            }
        }
        errors.into_result()
    }
}
