use utoipa::OpenApi;

use crate::api::rest::handlers;

/// OpenAPI document for the boats REST surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sailbow boats API",
        description = "Trips, crew and modules. Every call is made on behalf of the caller \
                       identified by the x-user-id and x-user-email headers."
    ),
    paths(
        handlers::create_trip,
        handlers::list_trips,
        handlers::get_trip,
        handlers::delete_trip,
        handlers::rename_trip,
        handlers::update_description,
        handlers::update_banner,
        handlers::add_module,
        handlers::remove_module,
        handlers::set_module_mode,
        handlers::save_module_data,
        handlers::save_module_settings,
        handlers::select_option,
        handlers::change_crew_role,
        handlers::remove_crew_member,
        handlers::resend_invitations,
        handlers::accept_invitations,
    ),
    tags(
        (name = "trips", description = "Trip lifecycle and details"),
        (name = "modules", description = "Polls, date polls and itineraries"),
        (name = "crew", description = "Membership and invitations")
    )
)]
pub struct BoatsApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    BoatsApiDoc::openapi()
}
