use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    Extension, Json,
};
use problem::{Problem, ProblemResponse};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    AcceptInvitationsDto, AddModuleReq, BannerDto, ChangeRoleReq, CreateTripReq, CreatedTripDto,
    InvitationReportDto, ModuleDto, ModuleSettingsDto, RenameTripReq, SaveModuleDataReq,
    SelectOptionReq, SetModeReq, TripDto, TripListDto, UpdateDescriptionReq,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::extract::{CallerIdentity, JsonBody};
use crate::domain::service::Service;

/// Create a trip with the caller as captain
#[utoipa::path(
    post,
    path = "/trips",
    tag = "trips",
    operation_id = "boats.create_trip",
    request_body = CreateTripReq,
    responses(
        (status = 201, description = "Trip created", body = CreatedTripDto),
        (status = 401, description = "Unauthenticated", body = Problem),
        (status = 422, description = "Validation error", body = Problem),
        (status = 500, description = "Internal error", body = Problem)
    )
)]
pub async fn create_trip(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    JsonBody(req_body): JsonBody<CreateTripReq>,
) -> Result<(StatusCode, Json<CreatedTripDto>), ProblemResponse> {
    info!("Creating trip '{}'", req_body.name);

    match svc.create_trip(&identity, req_body.into()).await {
        Ok(created) => Ok((
            StatusCode::CREATED,
            Json(CreatedTripDto::for_caller(created, &identity)),
        )),
        Err(e) => {
            error!("Failed to create trip: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Trips the caller is aboard
#[utoipa::path(
    get,
    path = "/trips",
    tag = "trips",
    operation_id = "boats.list_trips",
    responses(
        (status = 200, description = "Trips of the caller", body = TripListDto),
        (status = 401, description = "Unauthenticated", body = Problem),
        (status = 500, description = "Internal error", body = Problem)
    )
)]
pub async fn list_trips(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<Json<TripListDto>, ProblemResponse> {
    match svc.list_trips(&identity).await {
        Ok(trips) => Ok(Json(TripListDto {
            trips: trips
                .into_iter()
                .map(|t| TripDto::for_caller(t, &identity))
                .collect(),
        })),
        Err(e) => {
            error!("Failed to list trips: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a trip by id
#[utoipa::path(
    get,
    path = "/trips/{trip_id}",
    tag = "trips",
    operation_id = "boats.get_trip",
    params(("trip_id" = Uuid, Path, description = "Trip id")),
    responses(
        (status = 200, description = "Trip found", body = TripDto),
        (status = 404, description = "Not found or not a member", body = Problem)
    )
)]
pub async fn get_trip(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripDto>, ProblemResponse> {
    info!("Getting trip {}", trip_id);

    match svc.get_trip(&identity, trip_id).await {
        Ok(trip) => Ok(Json(TripDto::for_caller(trip, &identity))),
        Err(e) => {
            error!("Failed to get trip {}: {}", trip_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a trip (captain only)
#[utoipa::path(
    delete,
    path = "/trips/{trip_id}",
    tag = "trips",
    operation_id = "boats.delete_trip",
    params(("trip_id" = Uuid, Path, description = "Trip id")),
    responses(
        (status = 204, description = "Trip deleted"),
        (status = 403, description = "Caller is not the captain", body = Problem),
        (status = 404, description = "Not found or not a member", body = Problem)
    )
)]
pub async fn delete_trip(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path(trip_id): Path<Uuid>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Deleting trip {}", trip_id);

    match svc.delete_trip(&identity, trip_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete trip {}: {}", trip_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Rename a trip
#[utoipa::path(
    put,
    path = "/trips/{trip_id}/name",
    tag = "trips",
    operation_id = "boats.rename_trip",
    params(("trip_id" = Uuid, Path, description = "Trip id")),
    request_body = RenameTripReq,
    responses(
        (status = 200, description = "Trip renamed", body = TripDto),
        (status = 404, description = "Not found or not a member", body = Problem),
        (status = 422, description = "Validation error", body = Problem)
    )
)]
pub async fn rename_trip(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path(trip_id): Path<Uuid>,
    JsonBody(req_body): JsonBody<RenameTripReq>,
) -> Result<Json<TripDto>, ProblemResponse> {
    match svc.rename_trip(&identity, trip_id, req_body.name).await {
        Ok(trip) => Ok(Json(TripDto::for_caller(trip, &identity))),
        Err(e) => {
            error!("Failed to rename trip {}: {}", trip_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    put,
    path = "/trips/{trip_id}/description",
    tag = "trips",
    operation_id = "boats.update_description",
    params(("trip_id" = Uuid, Path, description = "Trip id")),
    request_body = UpdateDescriptionReq,
    responses(
        (status = 200, description = "Description updated", body = TripDto),
        (status = 404, description = "Not found or not a member", body = Problem),
        (status = 422, description = "Validation error", body = Problem)
    )
)]
pub async fn update_description(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path(trip_id): Path<Uuid>,
    JsonBody(req_body): JsonBody<UpdateDescriptionReq>,
) -> Result<Json<TripDto>, ProblemResponse> {
    match svc
        .update_description(&identity, trip_id, req_body.description)
        .await
    {
        Ok(trip) => Ok(Json(TripDto::for_caller(trip, &identity))),
        Err(e) => {
            error!("Failed to update description of trip {}: {}", trip_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    put,
    path = "/trips/{trip_id}/banner",
    tag = "trips",
    operation_id = "boats.update_banner",
    params(("trip_id" = Uuid, Path, description = "Trip id")),
    request_body = BannerDto,
    responses(
        (status = 200, description = "Banner updated", body = TripDto),
        (status = 404, description = "Not found or not a member", body = Problem),
        (status = 422, description = "Validation error", body = Problem)
    )
)]
pub async fn update_banner(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path(trip_id): Path<Uuid>,
    JsonBody(req_body): JsonBody<BannerDto>,
) -> Result<Json<TripDto>, ProblemResponse> {
    match svc.update_banner(&identity, trip_id, req_body.into()).await {
        Ok(trip) => Ok(Json(TripDto::for_caller(trip, &identity))),
        Err(e) => {
            error!("Failed to update banner of trip {}: {}", trip_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Add a module at the end of the trip page
#[utoipa::path(
    post,
    path = "/trips/{trip_id}/modules",
    tag = "modules",
    operation_id = "boats.add_module",
    params(("trip_id" = Uuid, Path, description = "Trip id")),
    request_body = AddModuleReq,
    responses(
        (status = 201, description = "Module added in edit mode", body = ModuleDto),
        (status = 404, description = "Not found or not a member", body = Problem),
        (status = 409, description = "Concurrent add took the same order", body = Problem),
        (status = 422, description = "Validation error", body = Problem)
    )
)]
pub async fn add_module(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path(trip_id): Path<Uuid>,
    JsonBody(req_body): JsonBody<AddModuleReq>,
) -> Result<(StatusCode, Json<ModuleDto>), ProblemResponse> {
    info!("Adding {:?} module to trip {}", req_body.kind, trip_id);

    match svc.add_module(&identity, trip_id, req_body.into()).await {
        Ok(module) => Ok((StatusCode::CREATED, Json(module.into()))),
        Err(e) => {
            error!("Failed to add module to trip {}: {}", trip_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/trips/{trip_id}/modules/{module_id}",
    tag = "modules",
    operation_id = "boats.remove_module",
    params(
        ("trip_id" = Uuid, Path, description = "Trip id"),
        ("module_id" = Uuid, Path, description = "Module id")
    ),
    responses(
        (status = 204, description = "Module removed"),
        (status = 404, description = "Trip or module not found", body = Problem)
    )
)]
pub async fn remove_module(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path((trip_id, module_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ProblemResponse> {
    info!("Removing module {} from trip {}", module_id, trip_id);

    match svc.remove_module(&identity, trip_id, module_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to remove module {}: {}", module_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    put,
    path = "/trips/{trip_id}/modules/{module_id}/mode",
    tag = "modules",
    operation_id = "boats.set_module_mode",
    params(
        ("trip_id" = Uuid, Path, description = "Trip id"),
        ("module_id" = Uuid, Path, description = "Module id")
    ),
    request_body = SetModeReq,
    responses(
        (status = 200, description = "Mode changed", body = ModuleDto),
        (status = 404, description = "Trip or module not found", body = Problem)
    )
)]
pub async fn set_module_mode(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path((trip_id, module_id)): Path<(Uuid, Uuid)>,
    JsonBody(req_body): JsonBody<SetModeReq>,
) -> Result<Json<ModuleDto>, ProblemResponse> {
    match svc
        .set_module_mode(&identity, trip_id, module_id, req_body.mode.into())
        .await
    {
        Ok(module) => Ok(Json(module.into())),
        Err(e) => {
            error!("Failed to set mode of module {}: {}", module_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Replace a module's entries and switch it to view mode
#[utoipa::path(
    put,
    path = "/trips/{trip_id}/modules/{module_id}/data",
    tag = "modules",
    operation_id = "boats.save_module_data",
    params(
        ("trip_id" = Uuid, Path, description = "Trip id"),
        ("module_id" = Uuid, Path, description = "Module id")
    ),
    request_body = SaveModuleDataReq,
    responses(
        (status = 200, description = "Data saved", body = ModuleDto),
        (status = 404, description = "Trip or module not found", body = Problem),
        (status = 422, description = "Payload does not fit the module", body = Problem)
    )
)]
pub async fn save_module_data(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path((trip_id, module_id)): Path<(Uuid, Uuid)>,
    JsonBody(req_body): JsonBody<SaveModuleDataReq>,
) -> Result<Json<ModuleDto>, ProblemResponse> {
    match svc
        .save_module_data(&identity, trip_id, module_id, req_body.data.into())
        .await
    {
        Ok(module) => Ok(Json(module.into())),
        Err(e) => {
            error!("Failed to save data of module {}: {}", module_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    put,
    path = "/trips/{trip_id}/modules/{module_id}/settings",
    tag = "modules",
    operation_id = "boats.save_module_settings",
    params(
        ("trip_id" = Uuid, Path, description = "Trip id"),
        ("module_id" = Uuid, Path, description = "Module id")
    ),
    request_body = ModuleSettingsDto,
    responses(
        (status = 200, description = "Settings saved", body = ModuleDto),
        (status = 404, description = "Trip or module not found", body = Problem)
    )
)]
pub async fn save_module_settings(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path((trip_id, module_id)): Path<(Uuid, Uuid)>,
    JsonBody(req_body): JsonBody<ModuleSettingsDto>,
) -> Result<Json<ModuleDto>, ProblemResponse> {
    match svc
        .save_module_settings(&identity, trip_id, module_id, req_body.into())
        .await
    {
        Ok(module) => Ok(Json(module.into())),
        Err(e) => {
            error!("Failed to save settings of module {}: {}", module_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Mark a poll option as selected
#[utoipa::path(
    post,
    path = "/trips/{trip_id}/modules/{module_id}/select",
    tag = "modules",
    operation_id = "boats.select_option",
    params(
        ("trip_id" = Uuid, Path, description = "Trip id"),
        ("module_id" = Uuid, Path, description = "Module id")
    ),
    request_body = SelectOptionReq,
    responses(
        (status = 200, description = "Option selected", body = ModuleDto),
        (status = 404, description = "Trip or module not found", body = Problem),
        (status = 422, description = "Module is not a poll", body = Problem)
    )
)]
pub async fn select_option(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path((trip_id, module_id)): Path<(Uuid, Uuid)>,
    JsonBody(req_body): JsonBody<SelectOptionReq>,
) -> Result<Json<ModuleDto>, ProblemResponse> {
    match svc
        .select_option(&identity, trip_id, module_id, req_body.option_id)
        .await
    {
        Ok(module) => Ok(Json(module.into())),
        Err(e) => {
            error!("Failed to select option on module {}: {}", module_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Change a crew member's role (captain only)
#[utoipa::path(
    put,
    path = "/trips/{trip_id}/crew/{member_id}/role",
    tag = "crew",
    operation_id = "boats.change_crew_role",
    params(
        ("trip_id" = Uuid, Path, description = "Trip id"),
        ("member_id" = Uuid, Path, description = "Crew member id")
    ),
    request_body = ChangeRoleReq,
    responses(
        (status = 200, description = "Role changed", body = TripDto),
        (status = 403, description = "Caller is not the captain", body = Problem),
        (status = 404, description = "Trip or crew member not found", body = Problem),
        (status = 422, description = "Change would break the single-captain rule", body = Problem)
    )
)]
pub async fn change_crew_role(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path((trip_id, member_id)): Path<(Uuid, Uuid)>,
    JsonBody(req_body): JsonBody<ChangeRoleReq>,
) -> Result<Json<TripDto>, ProblemResponse> {
    match svc
        .change_crew_role(&identity, trip_id, member_id, req_body.role.into())
        .await
    {
        Ok(trip) => Ok(Json(TripDto::for_caller(trip, &identity))),
        Err(e) => {
            error!("Failed to change role of {}: {}", member_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/trips/{trip_id}/crew/{member_id}",
    tag = "crew",
    operation_id = "boats.remove_crew_member",
    params(
        ("trip_id" = Uuid, Path, description = "Trip id"),
        ("member_id" = Uuid, Path, description = "Crew member id")
    ),
    responses(
        (status = 200, description = "Crew member removed", body = TripDto),
        (status = 403, description = "Caller is not the captain", body = Problem),
        (status = 404, description = "Trip or crew member not found", body = Problem)
    )
)]
pub async fn remove_crew_member(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path((trip_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TripDto>, ProblemResponse> {
    info!("Removing crew member {} from trip {}", member_id, trip_id);

    match svc.remove_crew_member(&identity, trip_id, member_id).await {
        Ok(trip) => Ok(Json(TripDto::for_caller(trip, &identity))),
        Err(e) => {
            error!("Failed to remove crew member {}: {}", member_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Re-send invitations to crew that have not signed up yet (captain only)
#[utoipa::path(
    post,
    path = "/trips/{trip_id}/invitations",
    tag = "crew",
    operation_id = "boats.resend_invitations",
    params(("trip_id" = Uuid, Path, description = "Trip id")),
    responses(
        (status = 200, description = "Per-address outcome", body = InvitationReportDto),
        (status = 403, description = "Caller is not the captain", body = Problem),
        (status = 502, description = "Identity provider lookup failed", body = Problem)
    )
)]
pub async fn resend_invitations(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<InvitationReportDto>, ProblemResponse> {
    match svc.resend_invitations(&identity, trip_id).await {
        Ok(report) => Ok(Json(report.into())),
        Err(e) => {
            error!("Failed to resend invitations for trip {}: {}", trip_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Claim pending invitations addressed to the caller's email
#[utoipa::path(
    post,
    path = "/invitations/accept",
    tag = "crew",
    operation_id = "boats.accept_invitations",
    responses(
        (status = 200, description = "Number of memberships linked", body = AcceptInvitationsDto),
        (status = 401, description = "Unauthenticated", body = Problem)
    )
)]
pub async fn accept_invitations(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    CallerIdentity(identity): CallerIdentity,
) -> Result<Json<AcceptInvitationsDto>, ProblemResponse> {
    match svc.accept_invitations(&identity).await {
        Ok(linked) => Ok(Json(AcceptInvitationsDto { linked })),
        Err(e) => {
            error!("Failed to accept invitations: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
