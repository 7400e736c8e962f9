//! Core library for tourneydesk.
//!
//! Provides the data layer for a tournament management client: entity
//! models, the REST client, session handling, the query cache, CRUD
//! repositories with rollback, derived statistics and universal search.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod repository;
pub mod search;
pub mod stats;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{CredentialStore, Session, SessionData};
pub use cache::{QueryCache, QueryKey};
pub use config::Config;
pub use repository::{Repository, RepositoryError};
