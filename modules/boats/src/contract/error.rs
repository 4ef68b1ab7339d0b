use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoatsError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Identity provider error: {message}")]
    Upstream { message: String },

    #[error("Internal error")]
    Internal,
}

impl BoatsError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
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

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for BoatsError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            // Non-members see the same shape as a missing trip.
            TripNotFound { .. } => Self::not_found("Trip"),
            ModuleNotFound { id } => Self::not_found(format!("Module {id}")),
            CrewMemberNotFound { id } => Self::not_found(format!("Crew member {id}")),
            Forbidden { action } => Self::forbidden(format!("only the captain may {action}")),
            EmptyName => Self::validation("Trip name cannot be empty"),
            NameTooLong { len, max } => Self::validation(format!(
                "Trip name too long: {len} characters (max: {max})"
            )),
            InvalidEmail { email } => Self::validation(format!("Invalid email: {email}")),
            DuplicateInvite { email } => {
                Self::validation(format!("Email '{email}' is invited more than once"))
            }
            Validation { field, message } => Self::validation(format!("{field}: {message}")),
            Conflict { message } => Self::conflict(message),
            Upstream { message } => Self::upstream(message),
            Database { .. } => Self::internal(),
        }
    }
}
