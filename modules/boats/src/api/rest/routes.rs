use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route(
            "/trips",
            get(handlers::list_trips).post(handlers::create_trip),
        )
        .route(
            "/trips/{trip_id}",
            get(handlers::get_trip).delete(handlers::delete_trip),
        )
        .route("/trips/{trip_id}/name", put(handlers::rename_trip))
        .route(
            "/trips/{trip_id}/description",
            put(handlers::update_description),
        )
        .route("/trips/{trip_id}/banner", put(handlers::update_banner))
        .route("/trips/{trip_id}/modules", post(handlers::add_module))
        .route(
            "/trips/{trip_id}/modules/{module_id}",
            delete(handlers::remove_module),
        )
        .route(
            "/trips/{trip_id}/modules/{module_id}/mode",
            put(handlers::set_module_mode),
        )
        .route(
            "/trips/{trip_id}/modules/{module_id}/data",
            put(handlers::save_module_data),
        )
        .route(
            "/trips/{trip_id}/modules/{module_id}/settings",
            put(handlers::save_module_settings),
        )
        .route(
            "/trips/{trip_id}/modules/{module_id}/select",
            post(handlers::select_option),
        )
        .route(
            "/trips/{trip_id}/crew/{member_id}",
            delete(handlers::remove_crew_member),
        )
        .route(
            "/trips/{trip_id}/crew/{member_id}/role",
            put(handlers::change_crew_role),
        )
        .route(
            "/trips/{trip_id}/invitations",
            post(handlers::resend_invitations),
        )
        .route("/invitations/accept", post(handlers::accept_invitations))
        .layer(Extension(service))
}
