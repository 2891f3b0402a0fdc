use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::handlers::admin::{self, require_admin};
use crate::handlers::api::{
    connect_calendar, create_booking, disconnect_calendar, download_booking_ics, get_availability,
    list_meeting_types, AppState,
};
use crate::handlers::health::health_check;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let mut router = Router::new();

    // Health check is always available
    let health_route = Router::new().route("/health", get(health_check));
    router = router.merge(health_route);

    // Visitor booking flow
    let booking_routes = Router::new()
        .route("/meeting-types", get(list_meeting_types))
        .route("/availability", get(get_availability))
        .route("/bookings", post(create_booking))
        .route("/bookings/:booking_id/calendar.ics", get(download_booking_ics))
        .route("/calendar/connect", post(connect_calendar))
        .route("/calendar/disconnect", post(disconnect_calendar));
    router = router.merge(booking_routes);

    // Admin area; everything except login needs a session token
    let admin_routes = Router::new()
        .route("/admin/session", get(admin::get_session))
        .route(
            "/admin/bookings",
            get(admin::list_bookings).post(admin::create_booking),
        )
        .route(
            "/admin/bookings/:booking_id",
            put(admin::update_booking).delete(admin::delete_booking),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&app_state),
            require_admin,
        ))
        .route("/admin/login", post(admin::login));
    router = router.merge(admin_routes);

    if app_state.auth.is_some() {
        info!("Admin routes enabled");
    } else {
        warn!("No admin credentials configured - admin routes will reject every request");
    }

    router.with_state(app_state)
}
