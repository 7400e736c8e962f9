//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: Token-based session management with configurable expiry
//! - `CredentialStore`: Secure OS-level credential storage via keyring
//! - `sealed`: at-rest encryption of the session file when a secret is set

pub mod credentials;
pub mod sealed;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
