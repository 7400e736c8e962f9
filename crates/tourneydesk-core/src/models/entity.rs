use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::validation::ValidationErrors;

/// Accepts identifiers sent either as JSON strings or numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Declares a string-backed identifier newtype.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Placeholder for a record the backend has not assigned an id yet
            pub fn pending() -> Self {
                Self(String::new())
            }

            /// Pending ids are left out of request bodies
            pub fn is_pending(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Championship`](super::Championship).
    ChampionshipId
);
entity_id!(
    /// Identifier of a [`Team`](super::Team).
    TeamId
);
entity_id!(
    /// Identifier of a [`Participant`](super::Participant).
    ParticipantId
);
entity_id!(MatchId);
entity_id!(SubscriptionId);
entity_id!(StatisticId);
entity_id!(UserId);

/// The kinds of records the backend exposes as CRUD resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Championship,
    Team,
    Participant,
    Match,
    Subscription,
    ParticipantStatistic,
}

impl EntityKind {
    /// Path segment of the REST collection, also the cache resource name.
    pub fn resource(&self) -> &'static str {
        match self {
            EntityKind::Championship => "championships",
            EntityKind::Team => "teams",
            EntityKind::Participant => "participants",
            EntityKind::Match => "matches",
            EntityKind::Subscription => "subscriptions",
            EntityKind::ParticipantStatistic => "participant-stats",
        }
    }

    /// Cache resources whose contents are derived from this kind.
    ///
    /// Always starts with the kind's own resource.
    pub fn dependent_resources(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Championship => &["championships", "matches", "subscriptions"],
            EntityKind::Team => &["teams", "participants", "matches", "subscriptions"],
            EntityKind::Participant => &["participants", "teams", "player-stats"],
            EntityKind::Match => &["matches", "championships", "participant-stats", "player-stats"],
            EntityKind::Subscription => &["subscriptions", "championships", "teams"],
            EntityKind::ParticipantStatistic => &["participant-stats", "player-stats"],
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Championship => "Championship",
            EntityKind::Team => "Team",
            EntityKind::Participant => "Participant",
            EntityKind::Match => "Match",
            EntityKind::Subscription => "Subscription",
            EntityKind::ParticipantStatistic => "Statistic",
        };
        f.write_str(label)
    }
}

/// A record managed through a repository.
///
/// `Id` gives compile-time checked identifier access and `Patch` is the typed
/// partial update merged by `apply`.
pub trait Entity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Id: Clone + Debug + Display + Eq + Hash + Send + Sync + Serialize + DeserializeOwned;
    type Patch: Clone + Debug + Default + Send + Sync + Serialize;

    const KIND: EntityKind;

    fn id(&self) -> &Self::Id;

    /// Whether the backend has yet to assign this record's id.
    fn is_pending(&self) -> bool {
        self.id().to_string().is_empty()
    }

    /// Merge every field set in `patch` into `self`.
    fn apply(&mut self, patch: &Self::Patch);

    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }

    /// Whether `self` and `other` may not coexist in one collection.
    fn conflicts_with(&self, _other: &Self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependent_resources_include_own_resource() {
        let kinds = [
            EntityKind::Championship,
            EntityKind::Team,
            EntityKind::Participant,
            EntityKind::Match,
            EntityKind::Subscription,
            EntityKind::ParticipantStatistic,
        ];
        for kind in kinds {
            assert_eq!(kind.dependent_resources()[0], kind.resource());
        }
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = TeamId::new("t-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"t-1\"");
        let back: TeamId = serde_json::from_str("\"t-1\"").unwrap();
        assert_eq!(back, id);
        assert_eq!(id.to_string(), "t-1");
    }

    #[test]
    fn test_pending_id_is_empty() {
        let id = SubscriptionId::pending();
        assert!(id.is_pending());
        assert!(!SubscriptionId::new("s1").is_pending());
    }

    #[test]
    fn test_numeric_id_is_accepted() {
        let id: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(id, UserId::new("42"));
    }
}
