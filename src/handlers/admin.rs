use axum::{
    extract::{Json as ExtractJson, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{Json, Response},
    Extension,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::auth::{AdminAuth, AdminSession, AdminToken, LoginRequest};
use crate::error::{ServiceError, ServiceResult};
use crate::handlers::api::AppState;
use crate::models::booking::{BookingListResponse, BookingUpdate, CreatedResponse, NewBooking};
use crate::models::common::PaginationParams;
use crate::models::form::{validate_booking_update, validate_new_booking};
use crate::models::meeting::{find_meeting_type, MeetingType};
use crate::services::time_slots::parse_label_clock;

fn configured_auth(state: &AppState) -> ServiceResult<&AdminAuth> {
    state
        .auth
        .as_ref()
        .ok_or_else(|| ServiceError::Unauthorized("Admin access is not configured".to_string()))
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Rejects requests without a valid admin session token and exposes the
/// session to handlers as an extension
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let auth = configured_auth(&state)?;

    let token = bearer_token(&request).ok_or_else(|| {
        debug!("Admin request to {} without bearer token", request.uri().path());
        ServiceError::Unauthorized("Missing bearer token".to_string())
    })?;

    let session = auth
        .verify_token(token, AdminAuth::get_timestamp())
        .map_err(|err| {
            warn!("Rejected admin request to {}: {}", request.uri().path(), err);
            err
        })?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ExtractJson(credentials): ExtractJson<LoginRequest>,
) -> ServiceResult<Json<AdminToken>> {
    let auth = configured_auth(&state)?;
    let token = auth.login(&credentials.email, &credentials.password)?;
    Ok(Json(token))
}

pub async fn get_session(Extension(session): Extension<AdminSession>) -> Json<AdminSession> {
    Json(session)
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> ServiceResult<Json<BookingListResponse>> {
    info!(
        "Received request to list bookings with page={}, page_size={}",
        params.page, params.page_size
    );

    let bookings = state.database.list().map_err(|err| {
        error!("Failed to list bookings: {}", err);
        ServiceError::from(err)
    })?;

    Ok(Json(BookingListResponse {
        total: bookings.len(),
        page: params.page.max(1),
        page_size: params.page_size.clamp(1, 100),
        bookings: params.paginate(&bookings),
    }))
}

// Admin-entered bookings must still be exportable later. Callers pass
// already-trimmed values, the same ones that get stored.
fn check_references(
    meeting_types: &[MeetingType],
    meeting_type: Option<&str>,
    time: Option<&str>,
) -> ServiceResult<()> {
    if let Some(id) = meeting_type {
        if find_meeting_type(meeting_types, id).is_none() {
            return Err(ServiceError::Validation(format!("Unknown meeting type: {}", id)));
        }
    }
    if let Some(time) = time {
        parse_label_clock(time)?;
    }
    Ok(())
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn normalize_new_booking(booking: NewBooking) -> NewBooking {
    NewBooking {
        time: trimmed(booking.time),
        name: trimmed(booking.name),
        email: trimmed(booking.email),
        meeting_type: trimmed(booking.meeting_type),
        ..booking
    }
}

fn normalize_update(update: BookingUpdate) -> BookingUpdate {
    BookingUpdate {
        time: update.time.map(trimmed),
        name: update.name.map(trimmed),
        email: update.email.map(trimmed),
        meeting_type: update.meeting_type.map(trimmed),
        ..update
    }
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    ExtractJson(booking): ExtractJson<NewBooking>,
) -> ServiceResult<(StatusCode, Json<CreatedResponse>)> {
    let booking = normalize_new_booking(booking);
    validate_new_booking(&booking)?;
    check_references(
        &state.meeting_types,
        Some(&booking.meeting_type),
        Some(&booking.time),
    )?;

    let id = state.database.create(booking).map_err(|err| {
        error!("Failed to create booking: {}", err);
        ServiceError::from(err)
    })?;

    info!("Admin created booking {}", id);
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    ExtractJson(update): ExtractJson<BookingUpdate>,
) -> ServiceResult<StatusCode> {
    let update = normalize_update(update);
    validate_booking_update(&update)?;
    check_references(
        &state.meeting_types,
        update.meeting_type.as_deref(),
        update.time.as_deref(),
    )?;

    state.database.update(&booking_id, update).map_err(|err| {
        warn!("Failed to update booking {}: {}", booking_id, err);
        ServiceError::from(err)
    })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> ServiceResult<StatusCode> {
    state.database.delete(&booking_id).map_err(|err| {
        error!("Failed to delete booking {}: {}", booking_id, err);
        ServiceError::from(err)
    })?;

    Ok(StatusCode::NO_CONTENT)
}
