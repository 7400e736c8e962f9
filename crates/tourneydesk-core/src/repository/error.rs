use thiserror::Error;

use crate::api::ApiError;
use crate::models::{EntityKind, ValidationErrors};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} already exists: {detail}")]
    Duplicate { kind: EntityKind, detail: String },

    #[error("Invalid {kind}: {errors}")]
    Validation {
        kind: EntityKind,
        errors: ValidationErrors,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl RepositoryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}
