//! Data models for tournament entities.
//!
//! This module contains the records exchanged with the backend:
//!
//! - `Championship`, `Team`, `Participant`: league structure
//! - `Match`, `Subscription`: scheduling and enrollment
//! - `ParticipantStatistic`, `PlayerStatsRow`: per-match and aggregated counters
//! - `User`: backend accounts
//!
//! Every CRUD-able record implements [`Entity`], which gives repositories
//! typed identifier access and typed partial updates.

pub mod championship;
pub mod entity;
pub mod matches;
pub mod participant;
pub mod statistic;
pub mod subscription;
pub mod team;
pub mod user;
pub mod validation;

pub use championship::{Championship, ChampionshipFormat, ChampionshipPatch, ChampionshipStatus};
pub use entity::{
    ChampionshipId, Entity, EntityKind, MatchId, ParticipantId, StatisticId, SubscriptionId,
    TeamId, UserId,
};
pub use matches::{Match, MatchOutcome, MatchPatch, MatchStatus, Score};
pub use participant::{Participant, ParticipantPatch, ParticipantRole};
pub use statistic::{ParticipantStatistic, ParticipantStatisticPatch, PlayerStatsRow};
pub use subscription::{Subscription, SubscriptionPatch};
pub use team::{Team, TeamPatch};
pub use user::{Role, User};
pub use validation::{FieldError, ValidationErrors};
