use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::BoatsApi,
    error::BoatsError,
    model::{
        Banner, CreatedTrip, CrewMemberId, Identity, InvitationReport, Module, ModuleId,
        ModuleMode, ModulePayload, ModuleSettings, NewModule, NewTrip, Role, Trip, TripId,
    },
};
use crate::domain::service::Service;

/// Local implementation of the BoatsApi trait that delegates to the domain service
pub struct BoatsLocalClient {
    service: Arc<Service>,
}

impl BoatsLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl BoatsApi for BoatsLocalClient {
    async fn create_trip(
        &self,
        identity: &Identity,
        new_trip: NewTrip,
    ) -> Result<CreatedTrip, BoatsError> {
        self.service
            .create_trip(identity, new_trip)
            .await
            .map_err(Into::into)
    }

    async fn list_trips(&self, identity: &Identity) -> Result<Vec<Trip>, BoatsError> {
        self.service.list_trips(identity).await.map_err(Into::into)
    }

    async fn get_trip(&self, identity: &Identity, trip_id: TripId) -> Result<Trip, BoatsError> {
        self.service
            .get_trip(identity, trip_id)
            .await
            .map_err(Into::into)
    }

    async fn delete_trip(&self, identity: &Identity, trip_id: TripId) -> Result<(), BoatsError> {
        self.service
            .delete_trip(identity, trip_id)
            .await
            .map_err(Into::into)
    }

    async fn rename_trip(
        &self,
        identity: &Identity,
        trip_id: TripId,
        name: String,
    ) -> Result<Trip, BoatsError> {
        self.service
            .rename_trip(identity, trip_id, name)
            .await
            .map_err(Into::into)
    }

    async fn update_description(
        &self,
        identity: &Identity,
        trip_id: TripId,
        description: String,
    ) -> Result<Trip, BoatsError> {
        self.service
            .update_description(identity, trip_id, description)
            .await
            .map_err(Into::into)
    }

    async fn update_banner(
        &self,
        identity: &Identity,
        trip_id: TripId,
        banner: Banner,
    ) -> Result<Trip, BoatsError> {
        self.service
            .update_banner(identity, trip_id, banner)
            .await
            .map_err(Into::into)
    }

    async fn add_module(
        &self,
        identity: &Identity,
        trip_id: TripId,
        new_module: NewModule,
    ) -> Result<Module, BoatsError> {
        self.service
            .add_module(identity, trip_id, new_module)
            .await
            .map_err(Into::into)
    }

    async fn remove_module(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
    ) -> Result<(), BoatsError> {
        self.service
            .remove_module(identity, trip_id, module_id)
            .await
            .map_err(Into::into)
    }

    async fn set_module_mode(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        mode: ModuleMode,
    ) -> Result<Module, BoatsError> {
        self.service
            .set_module_mode(identity, trip_id, module_id, mode)
            .await
            .map_err(Into::into)
    }

    async fn save_module_data(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        data: ModulePayload,
    ) -> Result<Module, BoatsError> {
        self.service
            .save_module_data(identity, trip_id, module_id, data)
            .await
            .map_err(Into::into)
    }

    async fn save_module_settings(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        settings: ModuleSettings,
    ) -> Result<Module, BoatsError> {
        self.service
            .save_module_settings(identity, trip_id, module_id, settings)
            .await
            .map_err(Into::into)
    }

    async fn select_option(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        option_id: String,
    ) -> Result<Module, BoatsError> {
        self.service
            .select_option(identity, trip_id, module_id, option_id)
            .await
            .map_err(Into::into)
    }

    async fn change_crew_role(
        &self,
        identity: &Identity,
        trip_id: TripId,
        member_id: CrewMemberId,
        role: Role,
    ) -> Result<Trip, BoatsError> {
        self.service
            .change_crew_role(identity, trip_id, member_id, role)
            .await
            .map_err(Into::into)
    }

    async fn remove_crew_member(
        &self,
        identity: &Identity,
        trip_id: TripId,
        member_id: CrewMemberId,
    ) -> Result<Trip, BoatsError> {
        self.service
            .remove_crew_member(identity, trip_id, member_id)
            .await
            .map_err(Into::into)
    }

    async fn accept_invitations(&self, identity: &Identity) -> Result<u64, BoatsError> {
        self.service
            .accept_invitations(identity)
            .await
            .map_err(Into::into)
    }

    async fn resend_invitations(
        &self,
        identity: &Identity,
        trip_id: TripId,
    ) -> Result<InvitationReport, BoatsError> {
        self.service
            .resend_invitations(identity, trip_id)
            .await
            .map_err(Into::into)
    }
}
