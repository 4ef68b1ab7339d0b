use async_trait::async_trait;

use crate::contract::{
    error::BoatsError,
    model::{
        Banner, CreatedTrip, CrewMemberId, Identity, InvitationReport, Module, ModuleId,
        ModuleMode, ModulePayload, ModuleSettings, NewModule, NewTrip, Role, Trip, TripId,
    },
};

/// Public API trait for the boats module that other modules can use.
///
/// Every call acts on behalf of `identity`; trips the caller does not belong
/// to are reported as not found.
#[async_trait]
pub trait BoatsApi: Send + Sync {
    /// Create a trip with the caller as captain and invite the listed crew.
    async fn create_trip(&self, identity: &Identity, new_trip: NewTrip)
        -> Result<CreatedTrip, BoatsError>;

    /// Trips the caller is a crew member of, matched by user id or email.
    async fn list_trips(&self, identity: &Identity) -> Result<Vec<Trip>, BoatsError>;

    async fn get_trip(&self, identity: &Identity, trip_id: TripId) -> Result<Trip, BoatsError>;

    /// Captain only.
    async fn delete_trip(&self, identity: &Identity, trip_id: TripId) -> Result<(), BoatsError>;

    async fn rename_trip(
        &self,
        identity: &Identity,
        trip_id: TripId,
        name: String,
    ) -> Result<Trip, BoatsError>;

    async fn update_description(
        &self,
        identity: &Identity,
        trip_id: TripId,
        description: String,
    ) -> Result<Trip, BoatsError>;

    async fn update_banner(
        &self,
        identity: &Identity,
        trip_id: TripId,
        banner: Banner,
    ) -> Result<Trip, BoatsError>;

    async fn add_module(
        &self,
        identity: &Identity,
        trip_id: TripId,
        new_module: NewModule,
    ) -> Result<Module, BoatsError>;

    async fn remove_module(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
    ) -> Result<(), BoatsError>;

    async fn set_module_mode(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        mode: ModuleMode,
    ) -> Result<Module, BoatsError>;

    async fn save_module_data(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        data: ModulePayload,
    ) -> Result<Module, BoatsError>;

    async fn save_module_settings(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        settings: ModuleSettings,
    ) -> Result<Module, BoatsError>;

    async fn select_option(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        option_id: String,
    ) -> Result<Module, BoatsError>;

    /// Captain only.
    async fn change_crew_role(
        &self,
        identity: &Identity,
        trip_id: TripId,
        member_id: CrewMemberId,
        role: Role,
    ) -> Result<Trip, BoatsError>;

    /// Captain only.
    async fn remove_crew_member(
        &self,
        identity: &Identity,
        trip_id: TripId,
        member_id: CrewMemberId,
    ) -> Result<Trip, BoatsError>;

    /// Attach the caller's user id to pending invitations for their email.
    async fn accept_invitations(&self, identity: &Identity) -> Result<u64, BoatsError>;

    /// Captain only. Re-sends invitations to crew that have not signed up yet.
    async fn resend_invitations(
        &self,
        identity: &Identity,
        trip_id: TripId,
    ) -> Result<InvitationReport, BoatsError>;
}
