use problem::ProblemResponse;

use crate::domain::error::DomainError;
use crate::errors::ErrorCode;

/// Trace id of the current span, if any.
fn current_trace_id() -> Option<String> {
    tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string())
}

/// Build a ProblemResponse from a catalog entry with less boilerplate
pub fn from_code(code: ErrorCode, detail: impl Into<String>, instance: &str) -> ProblemResponse {
    code.to_response(detail, instance, current_trace_id())
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        // Same body whether the trip is missing or the caller is not aboard.
        DomainError::TripNotFound { .. } => from_code(
            ErrorCode::boats_trip_not_found_v1,
            "Trip was not found",
            instance,
        ),
        DomainError::ModuleNotFound { id } => from_code(
            ErrorCode::boats_module_not_found_v1,
            format!("Module {id} was not found on this trip"),
            instance,
        ),
        DomainError::CrewMemberNotFound { id } => from_code(
            ErrorCode::boats_crew_member_not_found_v1,
            format!("Crew member {id} was not found on this trip"),
            instance,
        ),
        DomainError::Forbidden { .. } => {
            from_code(ErrorCode::boats_crew_forbidden_v1, e.to_string(), instance)
        }
        DomainError::InvalidEmail { .. } => {
            from_code(ErrorCode::boats_crew_invalid_email_v1, e.to_string(), instance)
        }
        DomainError::DuplicateInvite { .. } => from_code(
            ErrorCode::boats_crew_duplicate_invite_v1,
            e.to_string(),
            instance,
        ),
        DomainError::EmptyName
        | DomainError::NameTooLong { .. }
        | DomainError::Validation { .. } => {
            from_code(ErrorCode::boats_request_validation_v1, e.to_string(), instance)
        }
        DomainError::Conflict { .. } => {
            // Storage detail stays in the logs.
            tracing::warn!(error = ?e, "Write conflict");
            from_code(
                ErrorCode::boats_request_conflict_v1,
                "The trip changed concurrently; reload and retry",
                instance,
            )
        }
        DomainError::Upstream { .. } => {
            tracing::error!(error = ?e, "Identity provider error");
            from_code(
                ErrorCode::boats_identity_upstream_v1,
                "The identity provider could not be reached",
                instance,
            )
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_code(
                ErrorCode::boats_internal_database_v1,
                "An internal database error occurred",
                instance,
            )
        }
    }
}
