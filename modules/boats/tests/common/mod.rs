//! Shared fixtures: migrated in-memory SQLite and a scripted identity provider.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use boats::{
    config::BoatsConfig,
    contract::model::{CrewInvite, Identity, NewTrip, Role},
    domain::{
        error::DomainError,
        ports::{IdentityProvider, InvitationRequest, UserRecord},
    },
    infra::storage::{Migrator, SeaOrmTripsRepository},
    Boats,
};

pub const CAPTAIN_ID: &str = "user_captain";
pub const CAPTAIN_EMAIL: &str = "captain@sailbow.test";

/// Fresh in-memory database with migrations applied.
pub async fn create_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Identity provider double: a fixed set of known accounts, optional lookup
/// outage, per-address invitation failures, and a log of sent invitations.
#[derive(Default)]
pub struct MockIdentity {
    pub existing: HashSet<String>,
    pub lookup_down: bool,
    pub reject: HashSet<String>,
    pub sent: Mutex<Vec<InvitationRequest>>,
}

impl MockIdentity {
    pub fn with_existing(emails: &[&str]) -> Self {
        Self {
            existing: emails.iter().map(|e| e.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn down() -> Self {
        Self {
            lookup_down: true,
            ..Self::default()
        }
    }

    pub fn sent_to(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.email_address.clone())
            .collect()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn lookup_users_by_email(
        &self,
        emails: &[String],
    ) -> Result<Vec<UserRecord>, DomainError> {
        if self.lookup_down {
            return Err(DomainError::upstream("identity provider unavailable"));
        }
        Ok(emails
            .iter()
            .filter(|e| self.existing.contains(e.as_str()))
            .map(|e| UserRecord {
                id: format!("user_{e}"),
                primary_email: Some(e.clone()),
            })
            .collect())
    }

    async fn create_invitation(&self, invitation: &InvitationRequest) -> Result<(), DomainError> {
        if self.reject.contains(&invitation.email_address) {
            return Err(DomainError::upstream("invitation rejected"));
        }
        self.sent.lock().unwrap().push(invitation.clone());
        Ok(())
    }
}

pub fn captain() -> Identity {
    Identity::new(CAPTAIN_ID, CAPTAIN_EMAIL).with_first_name("Ahab")
}

pub fn member(user_id: &str, email: &str) -> Identity {
    Identity::new(user_id, email)
}

pub fn new_trip(name: &str, invites: &[&str]) -> NewTrip {
    NewTrip {
        name: name.to_string(),
        description: String::new(),
        banner: None,
        crew_invites: invites
            .iter()
            .map(|e| CrewInvite {
                email_address: e.to_string(),
                role: Role::Crew,
            })
            .collect(),
    }
}

/// Boats wired over a migrated database and the given identity double.
pub async fn create_test_boats(identity: Arc<MockIdentity>) -> Boats {
    let db = create_test_db().await;
    let repo = SeaOrmTripsRepository::new(db);
    Boats::with_ports(Arc::new(repo), identity, &BoatsConfig::default())
}

pub async fn create_test_router(identity: Arc<MockIdentity>) -> Router {
    create_test_boats(identity).await.register_rest(Router::new())
}
