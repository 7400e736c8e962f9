//! Generic CRUD repositories over tournament entities.
//!
//! A [`Repository`] keeps an in-memory list of one entity type and applies
//! every mutation in two phases: the change is applied tentatively, the
//! [`Backend`] is asked to persist it, and the change is then confirmed with
//! the backend's version or rolled back. Outcomes are reported on a
//! [`Notifier`] channel as well as returned.
//!
//! Backends:
//! - [`LocalBackend`]: in-memory only, every mutation is confirmed as-is
//! - [`RemoteBackend`]: REST calls through an [`EntityTransport`], reads via
//!   the query cache and dependent-cache invalidation after each successful
//!   mutation

pub mod backend;
pub mod error;
pub mod notify;
pub mod service;

pub use backend::{Backend, EntityTransport, LocalBackend, RemoteBackend};
pub use error::RepositoryError;
pub use notify::{Notification, NotificationLevel, Notifier};
pub use service::Repository;
