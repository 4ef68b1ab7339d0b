use async_trait::async_trait;
use serde::Serialize;

use crate::contract::model::Role;
use crate::domain::error::DomainError;

/// Account known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub primary_email: Option<String>,
}

/// Metadata stored on the invitation and echoed back on sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationMetadata {
    pub inviter_name: String,
    pub boat_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationRequest {
    pub email_address: String,
    pub role: Role,
    pub redirect_url: String,
    pub metadata: InvitationMetadata,
}

/// Transport-agnostic port to the external identity provider:
/// 1) account lookup by email (GET)
/// 2) invitation creation (POST)
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn lookup_users_by_email(&self, emails: &[String])
        -> Result<Vec<UserRecord>, DomainError>;
    async fn create_invitation(&self, invitation: &InvitationRequest) -> Result<(), DomainError>;
}
