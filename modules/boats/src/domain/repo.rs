use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{
    Banner, CrewMember, Module, ModuleMode, ModulePayload, ModuleSettings, Trip,
};

/// Marker error raised by storage adapters when a unique index rejects a write.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unique constraint violated: {0}")]
pub struct UniqueViolation(pub String);

/// Trip-level column written by a detail command. Other columns keep their stored values.
#[derive(Debug, Clone, PartialEq)]
pub enum TripDetailsPatch {
    Name(String),
    Description(String),
    Banner(Banner),
}

/// Module columns written by a module command. Other columns keep their stored values.
#[derive(Debug, Clone, PartialEq)]
pub enum ModulePatch {
    Mode(ModuleMode),
    Settings(ModuleSettings),
    /// `mode` is left untouched when `None`.
    Data {
        data: ModulePayload,
        mode: Option<ModuleMode>,
    },
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// Multi-row writes are atomic: either every row lands or none does.
#[async_trait]
pub trait TripsRepository: Send + Sync {
    /// Insert the trip row and all of its crew rows in one transaction.
    async fn create_trip(&self, trip: &Trip) -> anyhow::Result<()>;

    /// Load a trip with its crew and modules.
    async fn find_trip(&self, id: Uuid) -> anyhow::Result<Option<Trip>>;

    /// Crew row linking the caller to the trip, matched by user id or email.
    async fn find_membership(
        &self,
        trip_id: Uuid,
        user_id: &str,
        email: &str,
    ) -> anyhow::Result<Option<CrewMember>>;

    /// Every trip that has a crew row for the caller.
    async fn list_trips_for(&self, user_id: &str, email: &str) -> anyhow::Result<Vec<Trip>>;

    /// Write one detail column plus `updated_at`. Returns false if the trip is gone.
    async fn update_trip_details(
        &self,
        trip_id: Uuid,
        patch: &TripDetailsPatch,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;

    /// Delete the trip with its modules and crew. Returns true if the trip existed.
    async fn delete_trip(&self, id: Uuid) -> anyhow::Result<bool>;

    /// Insert a module, assigning `order = max(order) + 1` inside the write transaction.
    async fn insert_module(&self, module: Module) -> anyhow::Result<Module>;

    /// Write only the columns named by `patch`. Returns false if the module is gone.
    async fn update_module(
        &self,
        trip_id: Uuid,
        module_id: Uuid,
        patch: &ModulePatch,
    ) -> anyhow::Result<bool>;

    async fn delete_module(&self, trip_id: Uuid, module_id: Uuid) -> anyhow::Result<bool>;

    /// Persist every crew role plus the trip's captain pointer in one transaction.
    async fn update_crew_roles(&self, trip: &Trip) -> anyhow::Result<()>;

    async fn delete_crew_member(&self, trip_id: Uuid, member_id: Uuid) -> anyhow::Result<bool>;

    /// Set `user_id` on crew rows still pending for `email`. Returns rows changed.
    async fn link_pending_memberships(&self, user_id: &str, email: &str) -> anyhow::Result<u64>;
}
