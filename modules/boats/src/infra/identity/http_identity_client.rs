use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::domain::error::DomainError;
use crate::domain::ports::{IdentityProvider, InvitationMetadata, InvitationRequest, UserRecord};

/// HTTP adapter implementing the IdentityProvider port against a
/// Clerk-compatible backend API (`/v1/users`, `/v1/invitations`).
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct EmailAddressDto {
    id: String,
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: String,
    #[serde(default)]
    primary_email_address_id: Option<String>,
    #[serde(default)]
    email_addresses: Vec<EmailAddressDto>,
}

impl From<UserDto> for UserRecord {
    fn from(u: UserDto) -> Self {
        let primary_email = u.primary_email_address_id.as_deref().and_then(|primary| {
            u.email_addresses
                .iter()
                .find(|e| e.id == primary)
                .map(|e| e.email_address.clone())
        });
        Self {
            id: u.id,
            primary_email,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateInvitationDto<'a> {
    email_address: &'a str,
    redirect_url: &'a str,
    public_metadata: PublicMetadataDto<'a>,
}

#[derive(Debug, Serialize)]
struct PublicMetadataDto<'a> {
    #[serde(flatten)]
    metadata: &'a InvitationMetadata,
    role: &'a str,
}

impl HttpIdentityProvider {
    pub fn new(base: Url, api_key: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build identity HTTP client")?;
        Ok(Self::with_client(client, base, api_key))
    }

    pub fn with_client(client: reqwest::Client, base: Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base,
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DomainError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DomainError::upstream("invalid identity base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(
        name = "boats.http.identity.lookup_users",
        skip_all,
        fields(identity_base = %self.base, emails = emails.len())
    )]
    async fn lookup_users_by_email(
        &self,
        emails: &[String],
    ) -> Result<Vec<UserRecord>, DomainError> {
        let mut url = self.endpoint(&["v1", "users"])?;
        {
            let mut query = url.query_pairs_mut();
            for email in emails {
                query.append_pair("email_address", email);
            }
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("GET /v1/users")
            .map_err(|e| DomainError::upstream(format!("{e:#}")))?;

        if !response.status().is_success() {
            return Err(DomainError::upstream(format!(
                "user lookup returned HTTP {}",
                response.status()
            )));
        }

        let users: Vec<UserDto> = response
            .json()
            .await
            .context("decode /v1/users response")
            .map_err(|e| DomainError::upstream(format!("{e:#}")))?;
        debug!(found = users.len(), "identity users fetched");
        Ok(users.into_iter().map(UserRecord::from).collect())
    }

    #[instrument(
        name = "boats.http.identity.create_invitation",
        skip_all,
        fields(identity_base = %self.base, email = %invitation.email_address)
    )]
    async fn create_invitation(&self, invitation: &InvitationRequest) -> Result<(), DomainError> {
        let url = self.endpoint(&["v1", "invitations"])?;
        let body = CreateInvitationDto {
            email_address: &invitation.email_address,
            redirect_url: &invitation.redirect_url,
            public_metadata: PublicMetadataDto {
                metadata: &invitation.metadata,
                role: invitation.role.as_str(),
            },
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("POST /v1/invitations")
            .map_err(|e| DomainError::upstream(format!("{e:#}")))?;

        if !response.status().is_success() {
            return Err(DomainError::upstream(format!(
                "invitation for {} returned HTTP {}",
                invitation.email_address,
                response.status()
            )));
        }
        Ok(())
    }
}
