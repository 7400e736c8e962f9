use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{ChampionshipId, Entity, EntityKind};
use super::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ChampionshipFormat {
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    Swiss,
    League,
}

impl fmt::Display for ChampionshipFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChampionshipFormat::SingleElimination => write!(f, "Single Elimination"),
            ChampionshipFormat::DoubleElimination => write!(f, "Double Elimination"),
            ChampionshipFormat::RoundRobin => write!(f, "Round Robin"),
            ChampionshipFormat::Swiss => write!(f, "Swiss"),
            ChampionshipFormat::League => write!(f, "League"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ChampionshipStatus {
    Planned,
    Active,
    Finished,
}

impl fmt::Display for ChampionshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChampionshipStatus::Planned => write!(f, "Planned"),
            ChampionshipStatus::Active => write!(f, "Active"),
            ChampionshipStatus::Finished => write!(f, "Finished"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Championship {
    #[serde(default, skip_serializing_if = "ChampionshipId::is_pending")]
    pub id: ChampionshipId,
    pub name: String,
    pub format: ChampionshipFormat,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub location: Option<String>,
    pub status: ChampionshipStatus,
    #[serde(default)]
    pub prize: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ChampionshipPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ChampionshipFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ChampionshipStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize: Option<String>,
}

impl Championship {
    /// Inclusive length of the championship in days
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn date_range_display(&self) -> String {
        if self.start_date == self.end_date {
            self.start_date.format("%b %d, %Y").to_string()
        } else {
            format!(
                "{} - {}",
                self.start_date.format("%b %d, %Y"),
                self.end_date.format("%b %d, %Y")
            )
        }
    }

    pub fn is_open_for_subscription(&self) -> bool {
        self.status == ChampionshipStatus::Planned
    }
}

impl Entity for Championship {
    type Id = ChampionshipId;
    type Patch = ChampionshipPatch;

    const KIND: EntityKind = EntityKind::Championship;

    fn id(&self) -> &ChampionshipId {
        &self.id
    }

    fn apply(&mut self, patch: &ChampionshipPatch) {
        if let Some(ref name) = patch.name {
            self.name = name.clone();
        }
        if let Some(format) = patch.format {
            self.format = format;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(ref location) = patch.location {
            self.location = Some(location.clone());
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(ref prize) = patch.prize {
            self.prize = Some(prize.clone());
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_non_empty("name", &self.name);
        if self.end_date < self.start_date {
            errors.push("endDate", "must not be before the start date");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn championship() -> Championship {
        Championship {
            id: ChampionshipId::new("c1"),
            name: "Spring Split".to_string(),
            format: ChampionshipFormat::DoubleElimination,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            location: Some("Lisbon".to_string()),
            status: ChampionshipStatus::Planned,
            prize: None,
        }
    }

    #[test]
    fn test_parse_championship() {
        let json = r#"{"id":"c9","name":"Winter Cup","format":"round_robin","startDate":"2024-12-01","endDate":"2024-12-03","status":"active"}"#;
        let c: Championship = serde_json::from_str(json).unwrap();
        assert_eq!(c.format, ChampionshipFormat::RoundRobin);
        assert_eq!(c.status, ChampionshipStatus::Active);
        assert_eq!(c.location, None);
        assert_eq!(c.duration_days(), 3);
    }

    #[test]
    fn test_apply_patch_only_touches_set_fields() {
        let mut c = championship();
        c.apply(&ChampionshipPatch {
            status: Some(ChampionshipStatus::Active),
            prize: Some("$10,000".to_string()),
            ..Default::default()
        });
        assert_eq!(c.status, ChampionshipStatus::Active);
        assert_eq!(c.prize.as_deref(), Some("$10,000"));
        assert_eq!(c.name, "Spring Split");
        assert_eq!(c.location.as_deref(), Some("Lisbon"));
    }

    #[test]
    fn test_validate_dates() {
        let mut c = championship();
        assert!(c.validate().is_ok());
        c.end_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let errors = c.validate().unwrap_err();
        assert!(errors.for_field("endDate").is_some());
    }

    #[test]
    fn test_date_range_display() {
        let c = championship();
        assert_eq!(c.date_range_display(), "Mar 01, 2024 - Mar 10, 2024");
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = ChampionshipPatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"name":"Renamed"}"#);
    }
}
