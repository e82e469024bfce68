use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models::{
    Booking, BookingStatus, CancelRequest, Cancellation, ClassSchedule, Client, NewClass,
    NewClient, ReserveRequest, SessionSummary,
};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "query_token",
            SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new("token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::list_classes,
        crate::handlers::create_class,
        crate::handlers::get_session,
        crate::handlers::get_roster,
        crate::handlers::create_client,
        crate::handlers::get_client,
        crate::handlers::get_client_bookings,
        crate::handlers::get_client_ical,
        crate::handlers::reserve,
        crate::handlers::get_booking,
        crate::handlers::cancel,
        crate::handlers::confirm,
        crate::handlers::mark_attended,
        crate::handlers::mark_no_show
    ),
    components(schemas(
        Booking,
        BookingStatus,
        CancelRequest,
        Cancellation,
        ClassSchedule,
        Client,
        NewClass,
        NewClient,
        ReserveRequest,
        SessionSummary
    )),
    tags(
        (name = "gym", description = "Service information"),
        (name = "classes", description = "Class templates and sessions"),
        (name = "clients", description = "Clients and their bookings"),
        (name = "bookings", description = "Reservation lifecycle")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_booking_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/bookings/{id}/cancel"));
        assert!(doc.paths.paths.contains_key("/classes/{id}/sessions/{date}"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
