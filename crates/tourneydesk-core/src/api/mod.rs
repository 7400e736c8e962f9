//! REST API client module for the tournament backend.
//!
//! This module provides the `ApiClient` for logging in, checking backend
//! health and performing generic CRUD calls against `/{entity}` collections.
//!
//! The backend uses bearer token authentication; the token is obtained from
//! `POST /auth/login` and carried by the session.

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiResult};
pub use error::ApiError;
