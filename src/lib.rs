pub mod auth;
pub mod booking;
pub mod clock;
pub mod error;
pub mod handlers;
pub mod ical;
pub mod models;
pub mod openapi;
pub mod seed;
pub mod settings;
pub mod store;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use chrono_tz::Tz;
use handlers::{
    cancel, confirm, create_class, create_client, get_booking, get_client, get_client_bookings,
    get_client_ical, get_roster, get_session, healthz_live, healthz_ready, list_classes,
    mark_attended, mark_no_show, reserve, root,
};
use tower_http::LatencyUnit;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::booking::BookingManager;
use crate::clock::SystemClock;
use crate::ical::ICalExporter;
use crate::openapi::ApiDoc;
use crate::seed::Seed;
use crate::settings::Settings;
use crate::store::InMemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub bookings: Arc<BookingManager>,
    pub exporter: Arc<ICalExporter>,
}

impl AppState {
    pub fn new(settings: Settings, bookings: BookingManager) -> Self {
        let exporter = ICalExporter::new(&settings.gym_title, &settings.gym_location);
        Self {
            settings,
            bookings: Arc::new(bookings),
            exporter: Arc::new(exporter),
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let tz: Tz = settings
        .timezone
        .parse()
        .map_err(|err| format!("invalid timezone {:?}: {err}", settings.timezone))?;
    let bookings = BookingManager::new(InMemoryStore::new(), Arc::new(SystemClock::new(tz)));
    if let Some(path) = &settings.seed_file {
        Seed::from_file(path)?.apply(&bookings).await;
    }

    let state = AppState::new(settings, bookings);
    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!("Starting Gym Booking API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/classes", get(list_classes).post(create_class))
        .route("/classes/{id}/sessions/{date}", get(get_session))
        .route("/classes/{id}/sessions/{date}/bookings", get(get_roster))
        .route("/clients", post(create_client))
        .route("/clients/{id}", get(get_client))
        .route("/clients/{id}/bookings", get(get_client_bookings))
        .route("/clients/{id}/bookings.ical", get(get_client_ical))
        .route("/bookings", post(reserve))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/cancel", post(cancel))
        .route("/bookings/{id}/confirm", post(confirm))
        .route("/bookings/{id}/attended", post(mark_attended))
        .route("/bookings/{id}/no-show", post(mark_no_show))
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    if state.settings.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(trace_layer)
}
