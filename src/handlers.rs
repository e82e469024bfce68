use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::NaiveDate;
use http::header;
use tracing::debug;
use uuid::Uuid;

use crate::{
    AppState,
    auth::{Role, authorize},
    error::ApiError,
    models::{
        Booking, CancelRequest, Cancellation, ClassSchedule, Client, NewClass, NewClient,
        ReserveRequest, SessionSummary,
    },
    validation::{validate_new_class, validate_new_client},
};

#[derive(Debug, serde::Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

fn require(
    state: &AppState,
    auth: BearerHeader,
    query: &TokenQuery,
    role: Role,
) -> Result<Role, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    authorize(&state.settings, auth_header, query.token.as_deref(), role)
}

#[utoipa::path(get, path = "/", tag = "gym")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Gym Booking API",
        "endpoints": {
            "/classes": "Class templates and session availability",
            "/clients": "Clients and their bookings",
            "/bookings": "Reserve, cancel, confirm and mark attendance"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "gym")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "gym")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "Class templates", body = [ClassSchedule]),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn list_classes(
    State(state): State<AppState>,
    auth: BearerHeader,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require(&state, auth, &query, Role::Staff)?;
    Ok(Json(state.bookings.classes().await))
}

#[utoipa::path(
    post,
    path = "/classes",
    request_body = NewClass,
    responses(
        (status = 201, description = "Class created", body = ClassSchedule),
        (status = 400, description = "Invalid class definition"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn create_class(
    State(state): State<AppState>,
    auth: BearerHeader,
    Query(query): Query<TokenQuery>,
    Json(body): Json<NewClass>,
) -> Result<impl IntoResponse, ApiError> {
    let role = require(&state, auth, &query, Role::Admin)?;
    debug!(?role, name = %body.name, "create class request");
    validate_new_class(&body)?;
    let class = state.bookings.create_class(body).await;
    Ok((StatusCode::CREATED, Json(class)))
}

#[utoipa::path(
    get,
    path = "/classes/{id}/sessions/{date}",
    params(
        ("id" = Uuid, Path, description = "Class id"),
        ("date" = String, Path, description = "Session date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Session capacity", body = SessionSummary),
        (status = 400, description = "Class does not run on that date"),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn get_session(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path((id, date)): Path<(Uuid, NaiveDate)>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require(&state, auth, &query, Role::Staff)?;
    Ok(Json(state.bookings.session(id, date).await?))
}

#[utoipa::path(
    get,
    path = "/classes/{id}/sessions/{date}/bookings",
    params(
        ("id" = Uuid, Path, description = "Class id"),
        ("date" = String, Path, description = "Session date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Session roster", body = [Booking]),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "classes"
)]
pub async fn get_roster(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path((id, date)): Path<(Uuid, NaiveDate)>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require(&state, auth, &query, Role::Staff)?;
    Ok(Json(state.bookings.roster(id, date).await?))
}

#[utoipa::path(
    post,
    path = "/clients",
    request_body = NewClient,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    auth: BearerHeader,
    Query(query): Query<TokenQuery>,
    Json(body): Json<NewClient>,
) -> Result<impl IntoResponse, ApiError> {
    let role = require(&state, auth, &query, Role::Admin)?;
    debug!(?role, "create client request");
    validate_new_client(&body)?;
    let client = state.bookings.create_client(body).await;
    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    get,
    path = "/clients/{id}",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client", body = Client),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require(&state, auth, &query, Role::Staff)?;
    Ok(Json(state.bookings.client(id).await?))
}

#[utoipa::path(
    get,
    path = "/clients/{id}/bookings",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "All bookings of the client", body = [Booking]),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn get_client_bookings(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require(&state, auth, &query, Role::Staff)?;
    Ok(Json(state.bookings.client_bookings(id).await?))
}

#[utoipa::path(
    get,
    path = "/clients/{id}/bookings.ical",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 404, description = "Client not found or no bookings")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "clients"
)]
pub async fn get_client_ical(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require(&state, auth, &query, Role::Staff)?;
    let client = state.bookings.client(id).await?;
    let agenda = state.bookings.client_agenda(id).await?;
    if agenda.is_empty() {
        return Err(ApiError::NotFound("No bookings found".into()));
    }

    let body = state.exporter.generate(&client.name, &agenda);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/calendar"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=bookings.ics",
            ),
        ],
        body,
    ))
}

#[utoipa::path(
    post,
    path = "/bookings",
    request_body = ReserveRequest,
    responses(
        (status = 201, description = "Seat or waiting-list entry reserved", body = Booking),
        (status = 404, description = "Class or client not found"),
        (status = 409, description = "Client already booked")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "bookings"
)]
pub async fn reserve(
    State(state): State<AppState>,
    auth: BearerHeader,
    Query(query): Query<TokenQuery>,
    Json(body): Json<ReserveRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role = require(&state, auth, &query, Role::Staff)?;
    debug!(?role, client_id = %body.client_id, class_id = %body.class_id, date = %body.date, "reserve request");
    let booking = state
        .bookings
        .reserve(body.client_id, body.class_id, body.date)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

#[utoipa::path(
    get,
    path = "/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require(&state, auth, &query, Role::Staff)?;
    Ok(Json(state.bookings.booking(id).await?))
}

#[utoipa::path(
    post,
    path = "/bookings/{id}/cancel",
    params(("id" = Uuid, Path, description = "Booking id")),
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Booking cancelled", body = Cancellation),
        (status = 409, description = "Inside the cancellation window or booking already closed")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "bookings"
)]
pub async fn cancel(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
    body: Option<Json<CancelRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let role = require(&state, auth, &query, Role::Staff)?;
    debug!(?role, booking_id = %id, "cancel request");
    let reason = body.and_then(|Json(body)| body.reason);
    Ok(Json(state.bookings.cancel(id, reason).await?))
}

#[utoipa::path(
    post,
    path = "/bookings/{id}/confirm",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking confirmed", body = Booking),
        (status = 409, description = "Booking cannot be confirmed")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "bookings"
)]
pub async fn confirm(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let role = require(&state, auth, &query, Role::Staff)?;
    debug!(?role, booking_id = %id, "confirm request");
    Ok(Json(state.bookings.confirm(id).await?))
}

#[utoipa::path(
    post,
    path = "/bookings/{id}/attended",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Attendance recorded", body = Booking),
        (status = 409, description = "Booking is not open")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "bookings"
)]
pub async fn mark_attended(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let role = require(&state, auth, &query, Role::Staff)?;
    debug!(?role, booking_id = %id, "attendance request");
    Ok(Json(state.bookings.mark_attended(id).await?))
}

#[utoipa::path(
    post,
    path = "/bookings/{id}/no-show",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "No-show recorded", body = Booking),
        (status = 409, description = "Booking is not open")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "bookings"
)]
pub async fn mark_no_show(
    State(state): State<AppState>,
    auth: BearerHeader,
    Path(id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let role = require(&state, auth, &query, Role::Staff)?;
    debug!(?role, booking_id = %id, "no-show request");
    Ok(Json(state.bookings.mark_no_show(id).await?))
}
