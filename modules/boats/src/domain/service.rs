use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    Banner, CreatedTrip, CrewInvite, CrewMember, CrewMemberId, Identity, InvitationOutcome,
    InvitationReport, Module, ModuleId, ModuleKind, ModuleMode, ModulePayload, ModuleSettings,
    NewModule, NewTrip, Role, Trip, TripId,
};
use crate::domain::aggregate::{self, TripCommand};
use crate::domain::error::DomainError;
use crate::domain::invitations::InvitationWorkflow;
use crate::domain::membership;
use crate::domain::ports::IdentityProvider;
use crate::domain::repo::{ModulePatch, TripDetailsPatch, TripsRepository};
use crate::domain::validation;

/// Domain service with business rules for trips, crew and modules.
/// Depends only on the repository and identity ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn TripsRepository>,
    invitations: InvitationWorkflow,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_name_length: usize,
    pub max_description_length: usize,
    pub app_base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_name_length: 100,
            max_description_length: 2000,
            app_base_url: "http://localhost:3000".to_string(),
        }
    }
}

fn default_module_name(kind: ModuleKind) -> &'static str {
    match kind {
        ModuleKind::Poll => "Poll",
        ModuleKind::DatePoll => "Dates",
        ModuleKind::Itinerary => "Itinerary",
    }
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repo: Arc<dyn TripsRepository>,
        identity: Arc<dyn IdentityProvider>,
        config: ServiceConfig,
    ) -> Self {
        let invitations = InvitationWorkflow::new(identity, config.app_base_url.clone());
        Self {
            repo,
            invitations,
            config,
        }
    }

    #[instrument(
        name = "boats.service.create_trip",
        skip(self, identity, new_trip),
        fields(user_id = %identity.user_id, invites = new_trip.crew_invites.len())
    )]
    pub async fn create_trip(
        &self,
        identity: &Identity,
        new_trip: NewTrip,
    ) -> Result<CreatedTrip, DomainError> {
        info!("Creating new trip");

        let (name, description, invites) = validation::new_trip(
            &new_trip,
            identity,
            self.config.max_name_length,
            self.config.max_description_length,
        )?;
        let captain_email = validation::email(&identity.email)?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut crew = vec![CrewMember {
            id: Uuid::new_v4(),
            boat_id: id,
            user_id: Some(identity.user_id.clone()),
            email: captain_email,
            role: Role::Captain,
        }];
        crew.extend(invites.iter().map(|invite| CrewMember {
            id: Uuid::new_v4(),
            boat_id: id,
            user_id: None,
            email: invite.email_address.clone(),
            role: invite.role,
        }));

        let trip = Trip {
            id,
            name,
            description,
            banner: new_trip.banner.unwrap_or_default(),
            captain_user_id: identity.user_id.clone(),
            crew,
            modules: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        };

        self.repo
            .create_trip(&trip)
            .await
            .map_err(DomainError::from_storage)?;
        info!(trip_id = %trip.id, "Trip stored");

        // The trip stays committed whatever happens to the invitations.
        let invitations = match self.invitations.dispatch(&trip, &invites, identity).await {
            Ok(report) => InvitationOutcome::Dispatched(report),
            Err(e) => {
                warn!(trip_id = %trip.id, error = %e, "Invitation lookup failed");
                InvitationOutcome::Failed
            }
        };

        Ok(CreatedTrip { trip, invitations })
    }

    #[instrument(
        name = "boats.service.get_trip",
        skip(self, identity),
        fields(user_id = %identity.user_id, trip_id = %trip_id)
    )]
    pub async fn get_trip(&self, identity: &Identity, trip_id: TripId) -> Result<Trip, DomainError> {
        debug!("Getting trip");
        let (trip, _) = self.load_for_member(identity, trip_id).await?;
        Ok(trip)
    }

    #[instrument(
        name = "boats.service.list_trips",
        skip(self, identity),
        fields(user_id = %identity.user_id)
    )]
    pub async fn list_trips(&self, identity: &Identity) -> Result<Vec<Trip>, DomainError> {
        debug!("Listing trips for caller");
        let trips = self
            .repo
            .list_trips_for(&identity.user_id, &membership::normalize_email(&identity.email))
            .await
            .map_err(DomainError::from_storage)?;
        debug!("Found {} trips", trips.len());
        Ok(trips)
    }

    #[instrument(
        name = "boats.service.delete_trip",
        skip(self, identity),
        fields(user_id = %identity.user_id, trip_id = %trip_id)
    )]
    pub async fn delete_trip(&self, identity: &Identity, trip_id: TripId) -> Result<(), DomainError> {
        info!("Deleting trip");
        let member = membership::resolve(self.repo.as_ref(), trip_id, identity).await?;
        membership::require_captain(&member, "delete the trip")?;

        let deleted = self
            .repo
            .delete_trip(trip_id)
            .await
            .map_err(DomainError::from_storage)?;
        if !deleted {
            return Err(DomainError::trip_not_found(trip_id));
        }
        info!("Trip deleted");
        Ok(())
    }

    #[instrument(
        name = "boats.service.rename_trip",
        skip(self, identity, name),
        fields(user_id = %identity.user_id, trip_id = %trip_id)
    )]
    pub async fn rename_trip(
        &self,
        identity: &Identity,
        trip_id: TripId,
        name: String,
    ) -> Result<Trip, DomainError> {
        let name = validation::trip_name(&name, self.config.max_name_length)?;
        self.update_details(identity, trip_id, TripCommand::Rename { name }, |t| {
            TripDetailsPatch::Name(t.name.clone())
        })
        .await
    }

    #[instrument(
        name = "boats.service.update_description",
        skip(self, identity, description),
        fields(user_id = %identity.user_id, trip_id = %trip_id)
    )]
    pub async fn update_description(
        &self,
        identity: &Identity,
        trip_id: TripId,
        description: String,
    ) -> Result<Trip, DomainError> {
        let description =
            validation::description(&description, self.config.max_description_length)?;
        self.update_details(
            identity,
            trip_id,
            TripCommand::UpdateDescription { description },
            |t| TripDetailsPatch::Description(t.description.clone()),
        )
        .await
    }

    #[instrument(
        name = "boats.service.update_banner",
        skip(self, identity, banner),
        fields(user_id = %identity.user_id, trip_id = %trip_id, banner_type = %banner.kind)
    )]
    pub async fn update_banner(
        &self,
        identity: &Identity,
        trip_id: TripId,
        banner: Banner,
    ) -> Result<Trip, DomainError> {
        validation::banner(&banner)?;
        self.update_details(identity, trip_id, TripCommand::UpdateBanner { banner }, |t| {
            TripDetailsPatch::Banner(t.banner.clone())
        })
        .await
    }

    #[instrument(
        name = "boats.service.add_module",
        skip(self, identity, new_module),
        fields(user_id = %identity.user_id, trip_id = %trip_id, kind = %new_module.kind)
    )]
    pub async fn add_module(
        &self,
        identity: &Identity,
        trip_id: TripId,
        new_module: NewModule,
    ) -> Result<Module, DomainError> {
        info!("Adding module");
        let name = match new_module.name.as_deref() {
            Some(name) => validation::module_name(name, self.config.max_name_length)?,
            None => default_module_name(new_module.kind).to_string(),
        };
        let description = validation::description(
            new_module.description.as_deref().unwrap_or_default(),
            self.config.max_description_length,
        )?;

        let (trip, _) = self.load_for_member(identity, trip_id).await?;
        let draft = Module {
            id: Uuid::new_v4(),
            boat_id: trip_id,
            kind: new_module.kind,
            name,
            description,
            order: aggregate::next_module_order(&trip),
            settings: new_module.settings.unwrap_or_default(),
            data: ModulePayload::empty(new_module.kind),
            mode: ModuleMode::Edit,
        };
        aggregate::apply(
            trip,
            TripCommand::AddModule {
                module: draft.clone(),
            },
        )?;

        // Storage recomputes the order inside its transaction.
        let module = self
            .repo
            .insert_module(draft)
            .await
            .map_err(DomainError::from_storage)?;
        info!(module_id = %module.id, order = module.order, "Module added");
        Ok(module)
    }

    #[instrument(
        name = "boats.service.remove_module",
        skip(self, identity),
        fields(user_id = %identity.user_id, trip_id = %trip_id, module_id = %module_id)
    )]
    pub async fn remove_module(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
    ) -> Result<(), DomainError> {
        info!("Removing module");
        let (trip, _) = self.load_for_member(identity, trip_id).await?;
        aggregate::apply(trip, TripCommand::RemoveModule { module_id })?;

        let deleted = self
            .repo
            .delete_module(trip_id, module_id)
            .await
            .map_err(DomainError::from_storage)?;
        if !deleted {
            return Err(DomainError::module_not_found(module_id));
        }
        Ok(())
    }

    #[instrument(
        name = "boats.service.set_module_mode",
        skip(self, identity),
        fields(user_id = %identity.user_id, trip_id = %trip_id, module_id = %module_id)
    )]
    pub async fn set_module_mode(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        mode: ModuleMode,
    ) -> Result<Module, DomainError> {
        self.update_module(
            identity,
            trip_id,
            module_id,
            TripCommand::SetModuleMode { module_id, mode },
            |m| ModulePatch::Mode(m.mode),
        )
        .await
    }

    #[instrument(
        name = "boats.service.save_module_data",
        skip(self, identity, data),
        fields(user_id = %identity.user_id, trip_id = %trip_id, module_id = %module_id, entries = data.len())
    )]
    pub async fn save_module_data(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        data: ModulePayload,
    ) -> Result<Module, DomainError> {
        validation::payload(&data)?;
        self.update_module(
            identity,
            trip_id,
            module_id,
            TripCommand::SaveModuleData { module_id, data },
            |m| ModulePatch::Data {
                data: m.data.clone(),
                mode: Some(m.mode),
            },
        )
        .await
    }

    #[instrument(
        name = "boats.service.save_module_settings",
        skip(self, identity, settings),
        fields(user_id = %identity.user_id, trip_id = %trip_id, module_id = %module_id)
    )]
    pub async fn save_module_settings(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        settings: ModuleSettings,
    ) -> Result<Module, DomainError> {
        self.update_module(
            identity,
            trip_id,
            module_id,
            TripCommand::SaveModuleSettings {
                module_id,
                settings,
            },
            |m| ModulePatch::Settings(m.settings.clone()),
        )
        .await
    }

    #[instrument(
        name = "boats.service.select_option",
        skip(self, identity),
        fields(user_id = %identity.user_id, trip_id = %trip_id, module_id = %module_id)
    )]
    pub async fn select_option(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        option_id: String,
    ) -> Result<Module, DomainError> {
        self.update_module(
            identity,
            trip_id,
            module_id,
            TripCommand::SelectOption {
                module_id,
                option_id,
            },
            |m| ModulePatch::Data {
                data: m.data.clone(),
                mode: None,
            },
        )
        .await
    }

    #[instrument(
        name = "boats.service.change_crew_role",
        skip(self, identity),
        fields(user_id = %identity.user_id, trip_id = %trip_id, member_id = %member_id)
    )]
    pub async fn change_crew_role(
        &self,
        identity: &Identity,
        trip_id: TripId,
        member_id: CrewMemberId,
        role: Role,
    ) -> Result<Trip, DomainError> {
        info!(%role, "Changing crew role");
        let (trip, member) = self.load_for_member(identity, trip_id).await?;
        membership::require_captain(&member, "change crew roles")?;

        let trip = aggregate::apply(trip, TripCommand::ChangeCrewRole { member_id, role })?;
        self.repo
            .update_crew_roles(&trip)
            .await
            .map_err(DomainError::from_storage)?;
        Ok(trip)
    }

    #[instrument(
        name = "boats.service.remove_crew_member",
        skip(self, identity),
        fields(user_id = %identity.user_id, trip_id = %trip_id, member_id = %member_id)
    )]
    pub async fn remove_crew_member(
        &self,
        identity: &Identity,
        trip_id: TripId,
        member_id: CrewMemberId,
    ) -> Result<Trip, DomainError> {
        info!("Removing crew member");
        let (trip, member) = self.load_for_member(identity, trip_id).await?;
        membership::require_captain(&member, "remove crew members")?;

        let trip = aggregate::apply(trip, TripCommand::RemoveCrewMember { member_id })?;
        let deleted = self
            .repo
            .delete_crew_member(trip_id, member_id)
            .await
            .map_err(DomainError::from_storage)?;
        if !deleted {
            return Err(DomainError::crew_member_not_found(member_id));
        }
        Ok(trip)
    }

    #[instrument(
        name = "boats.service.accept_invitations",
        skip(self, identity),
        fields(user_id = %identity.user_id)
    )]
    pub async fn accept_invitations(&self, identity: &Identity) -> Result<u64, DomainError> {
        let email = validation::email(&identity.email)?;
        let linked = self
            .repo
            .link_pending_memberships(&identity.user_id, &email)
            .await
            .map_err(DomainError::from_storage)?;
        info!(linked, "Pending invitations linked");
        Ok(linked)
    }

    #[instrument(
        name = "boats.service.resend_invitations",
        skip(self, identity),
        fields(user_id = %identity.user_id, trip_id = %trip_id)
    )]
    pub async fn resend_invitations(
        &self,
        identity: &Identity,
        trip_id: TripId,
    ) -> Result<InvitationReport, DomainError> {
        let (trip, member) = self.load_for_member(identity, trip_id).await?;
        membership::require_captain(&member, "resend invitations")?;

        let pending: Vec<CrewInvite> = trip
            .crew
            .iter()
            .filter(|m| m.is_pending())
            .map(|m| CrewInvite {
                email_address: m.email.clone(),
                role: m.role,
            })
            .collect();
        debug!("Resending {} invitations", pending.len());
        self.invitations.dispatch(&trip, &pending, identity).await
    }

    // --- helpers ---

    /// Load the trip after checking the caller belongs to it.
    async fn load_for_member(
        &self,
        identity: &Identity,
        trip_id: TripId,
    ) -> Result<(Trip, CrewMember), DomainError> {
        let member = membership::resolve(self.repo.as_ref(), trip_id, identity).await?;
        let trip = self
            .repo
            .find_trip(trip_id)
            .await
            .map_err(DomainError::from_storage)?
            .ok_or_else(|| DomainError::trip_not_found(trip_id))?;
        Ok((trip, member))
    }

    /// Apply a detail command and write back only the column it changed.
    async fn update_details(
        &self,
        identity: &Identity,
        trip_id: TripId,
        command: TripCommand,
        patch: fn(&Trip) -> TripDetailsPatch,
    ) -> Result<Trip, DomainError> {
        let (trip, _) = self.load_for_member(identity, trip_id).await?;
        let trip = aggregate::apply(trip, command)?;

        let updated = self
            .repo
            .update_trip_details(trip_id, &patch(&trip), trip.updated_at)
            .await
            .map_err(DomainError::from_storage)?;
        if !updated {
            return Err(DomainError::trip_not_found(trip_id));
        }
        debug!("Trip details updated");
        Ok(trip)
    }

    async fn update_module(
        &self,
        identity: &Identity,
        trip_id: TripId,
        module_id: ModuleId,
        command: TripCommand,
        patch: fn(&Module) -> ModulePatch,
    ) -> Result<Module, DomainError> {
        let (trip, _) = self.load_for_member(identity, trip_id).await?;
        let trip = aggregate::apply(trip, command)?;
        let module = trip
            .module(module_id)
            .cloned()
            .ok_or_else(|| DomainError::module_not_found(module_id))?;

        let updated = self
            .repo
            .update_module(trip_id, module_id, &patch(&module))
            .await
            .map_err(DomainError::from_storage)?;
        if !updated {
            return Err(DomainError::module_not_found(module_id));
        }
        debug!(mode = %module.mode, "Module updated");
        Ok(module)
    }
}
