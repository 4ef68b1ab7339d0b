use uuid::Uuid;

use crate::contract::model::{CrewMember, Identity, Role, Trip};
use crate::domain::error::DomainError;
use crate::domain::repo::TripsRepository;

/// Canonical form used for every stored and compared email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A crew row belongs to `identity` when either the user id or the email matches.
pub fn matches(member: &CrewMember, identity: &Identity) -> bool {
    member.user_id.as_deref() == Some(identity.user_id.as_str())
        || member.email == normalize_email(&identity.email)
}

/// In-memory lookup over an already loaded trip.
pub fn member_of<'a>(trip: &'a Trip, identity: &Identity) -> Option<&'a CrewMember> {
    trip.crew.iter().find(|m| matches(m, identity))
}

/// Resolve the caller's crew row for `trip_id`.
///
/// A missing trip and a trip the caller does not belong to fail the same way.
pub async fn resolve(
    repo: &dyn TripsRepository,
    trip_id: Uuid,
    identity: &Identity,
) -> Result<CrewMember, DomainError> {
    repo.find_membership(trip_id, &identity.user_id, &normalize_email(&identity.email))
        .await
        .map_err(DomainError::from_storage)?
        .ok_or_else(|| DomainError::trip_not_found(trip_id))
}

pub fn require_captain(member: &CrewMember, action: &str) -> Result<(), DomainError> {
    match member.role {
        Role::Captain => Ok(()),
        Role::Crew => Err(DomainError::forbidden(action)),
    }
}
