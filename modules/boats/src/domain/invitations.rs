use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, instrument, warn};

use crate::contract::model::{CrewInvite, Identity, InvitationReport, Trip, TripId};
use crate::domain::error::DomainError;
use crate::domain::membership::normalize_email;
use crate::domain::ports::{IdentityProvider, InvitationMetadata, InvitationRequest};

/// Sends sign-up invitations for crew emails that have no account yet.
#[derive(Clone)]
pub struct InvitationWorkflow {
    identity: Arc<dyn IdentityProvider>,
    app_base_url: String,
}

impl InvitationWorkflow {
    pub fn new(identity: Arc<dyn IdentityProvider>, app_base_url: impl Into<String>) -> Self {
        Self {
            identity,
            app_base_url: app_base_url.into(),
        }
    }

    /// Where an invitee lands after signing up.
    pub fn redirect_url(&self, trip_id: TripId) -> String {
        format!(
            "{}/sign-in?redirectUrl=/dock/{}",
            self.app_base_url.trim_end_matches('/'),
            trip_id
        )
    }

    /// Look up the invited addresses and invite the ones without an account.
    ///
    /// A failed lookup fails the whole call. After that each invitation is
    /// independent: failures are collected in the report, never propagated.
    #[instrument(
        name = "boats.invitations.dispatch",
        skip_all,
        fields(trip_id = %trip.id, invites = invites.len())
    )]
    pub async fn dispatch(
        &self,
        trip: &Trip,
        invites: &[CrewInvite],
        inviter: &Identity,
    ) -> Result<InvitationReport, DomainError> {
        let mut report = InvitationReport::default();
        if invites.is_empty() {
            return Ok(report);
        }

        let emails: Vec<String> = invites.iter().map(|i| i.email_address.clone()).collect();
        let existing: HashSet<String> = self
            .identity
            .lookup_users_by_email(&emails)
            .await?
            .into_iter()
            .filter_map(|u| u.primary_email)
            .map(|e| normalize_email(&e))
            .collect();
        debug!(existing = existing.len(), "identity lookup done");

        let metadata = InvitationMetadata {
            inviter_name: inviter
                .first_name
                .clone()
                .unwrap_or_else(|| inviter.email.clone()),
            boat_name: trip.name.clone(),
        };
        let redirect_url = self.redirect_url(trip.id);

        let mut pending = Vec::new();
        for invite in invites {
            if existing.contains(&invite.email_address) {
                report.skipped_existing.push(invite.email_address.clone());
            } else {
                pending.push(InvitationRequest {
                    email_address: invite.email_address.clone(),
                    role: invite.role,
                    redirect_url: redirect_url.clone(),
                    metadata: metadata.clone(),
                });
            }
        }

        let results = join_all(pending.iter().map(|req| self.identity.create_invitation(req))).await;
        for (req, result) in pending.into_iter().zip(results) {
            match result {
                Ok(()) => report.sent.push(req.email_address),
                Err(e) => {
                    warn!(email = %req.email_address, error = %e, "invitation failed");
                    report.failed.push(req.email_address);
                }
            }
        }

        debug!(
            sent = report.sent.len(),
            skipped = report.skipped_existing.len(),
            failed = report.failed.len(),
            "invitations dispatched"
        );
        Ok(report)
    }
}
