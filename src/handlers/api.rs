use axum::{
    extract::{Json as ExtractJson, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Local;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::AdminAuth;
use crate::error::{ServiceError, ServiceResult};
use crate::handlers::download::{trigger_download, IcsDownload};
use crate::models::calendar::{CalendarConnection, ConnectRequest, DisconnectRequest};
use crate::models::common::{AvailabilityQuery, AvailabilityResponse, DownloadQuery};
use crate::models::form::BookingForm;
use crate::models::meeting::MeetingType;
use crate::services::availability::AvailabilitySource;
use crate::services::booking::{booking_ics, submit_booking, BookingConfirmation, BookingContext};
use crate::services::calendar::CalendarService;
use crate::services::database::BookingStore;

// AppState struct containing shared resources
pub struct AppState {
    pub database: Arc<dyn BookingStore>,
    pub availability: Arc<dyn AvailabilitySource>,
    pub calendar: CalendarService,
    /// None when no admin credentials are configured
    pub auth: Option<AdminAuth>,
    pub meeting_types: Vec<MeetingType>,
}

// Meeting types offered to visitors
pub async fn list_meeting_types(State(state): State<Arc<AppState>>) -> Json<Vec<MeetingType>> {
    Json(state.meeting_types.clone())
}

// Available time slots for a date
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> ServiceResult<Json<AvailabilityResponse>> {
    info!("Received availability request for {}", query.date);

    match state.availability.available_times(query.date).await {
        Ok(times) => Ok(Json(AvailabilityResponse {
            date: query.date,
            times,
        })),
        Err(err) => {
            error!("Failed to load availability for {}: {}", query.date, err);
            Err(err)
        }
    }
}

// Visitor booking submission
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    ExtractJson(form): ExtractJson<BookingForm>,
) -> ServiceResult<(StatusCode, Json<BookingConfirmation>)> {
    info!(
        "Received booking request: type={:?} date={:?} time={:?}",
        form.meeting_type_id, form.date, form.time
    );

    let ctx = BookingContext {
        store: state.database.as_ref(),
        calendar: &state.calendar,
        meeting_types: &state.meeting_types,
        today: Local::now().date_naive(),
    };

    match submit_booking(&ctx, form).await {
        Ok(confirmation) => Ok((StatusCode::CREATED, Json(confirmation))),
        Err(err) => {
            match &err {
                ServiceError::ExternalService(_) => error!("Booking failed: {}", err),
                _ => warn!("Booking rejected: {}", err),
            }
            Err(err)
        }
    }
}

// Calendar file for a stored booking
pub async fn download_booking_ics(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> ServiceResult<IcsDownload> {
    info!("Received calendar download request for booking {}", booking_id);

    let (text, filename) = booking_ics(
        state.database.as_ref(),
        &state.meeting_types,
        &booking_id,
        query.provider,
    )
    .map_err(|err| {
        warn!("Calendar download for {} failed: {}", booking_id, err);
        err
    })?;

    Ok(trigger_download(text, filename))
}

pub async fn connect_calendar(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<ConnectRequest>,
) -> ServiceResult<Json<CalendarConnection>> {
    info!("Received request to connect {} calendar", request.provider);

    let connection = state
        .calendar
        .connect(request.provider, request.auth_data.as_deref())
        .await
        .map_err(|err| {
            warn!("Failed to connect {} calendar: {}", request.provider, err);
            err
        })?;

    Ok(Json(connection))
}

pub async fn disconnect_calendar(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<DisconnectRequest>,
) -> StatusCode {
    state.calendar.disconnect(request.connection).await;
    StatusCode::NO_CONTENT
}
