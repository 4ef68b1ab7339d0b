use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Trip not found: {id}")]
    TripNotFound { id: Uuid },

    #[error("Module not found: {id}")]
    ModuleNotFound { id: Uuid },

    #[error("Crew member not found: {id}")]
    CrewMemberNotFound { id: Uuid },

    #[error("Only the captain may {action}")]
    Forbidden { action: String },

    #[error("Trip name cannot be empty")]
    EmptyName,

    #[error("Trip name too long: {len} characters (max: {max})")]
    NameTooLong { len: usize, max: usize },

    #[error("Invalid email: {email}")]
    InvalidEmail { email: String },

    #[error("Email '{email}' is invited more than once")]
    DuplicateInvite { email: String },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Identity provider error: {message}")]
    Upstream { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn trip_not_found(id: Uuid) -> Self {
        Self::TripNotFound { id }
    }

    pub fn module_not_found(id: Uuid) -> Self {
        Self::ModuleNotFound { id }
    }

    pub fn crew_member_not_found(id: Uuid) -> Self {
        Self::CrewMemberNotFound { id }
    }

    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }

    pub fn name_too_long(len: usize, max: usize) -> Self {
        Self::NameTooLong { len, max }
    }

    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    pub fn duplicate_invite(email: impl Into<String>) -> Self {
        Self::DuplicateInvite {
            email: email.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Translate a repository failure, keeping unique-index violations distinct.
    pub fn from_storage(err: anyhow::Error) -> Self {
        match err.downcast_ref::<crate::domain::repo::UniqueViolation>() {
            Some(v) => Self::conflict(v.to_string()),
            None => Self::database(format!("{err:#}")),
        }
    }
}
