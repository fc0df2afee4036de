// src/routes/appointment_routes.rs

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{
        AppState, AppointmentIdRequest, AppointmentsResponse, BookAppointmentRequest,
        BookingResponse, MessageResponse,
    },
    services::appointments,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/book-appointment", post(book_appointment))
        .route("/appointments", get(list_appointments))
        .route("/cancel-appointment", post(cancel_appointment))
}

/* ============================================================
   POST /book-appointment
   ============================================================ */

pub async fn book_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Json(req), _): WithRejection<Json<BookAppointmentRequest>, ApiError>,
) -> Result<Json<BookingResponse>, ApiError> {
    let appointment = appointments::book_appointment(state.store.as_ref(), auth.user_id, req).await?;

    Ok(Json(BookingResponse {
        success: true,
        message: "Appointment booked".into(),
        appointment,
    }))
}

/* ============================================================
   GET /appointments
   ============================================================ */

pub async fn list_appointments(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let appointments = appointments::list_appointments(state.store.as_ref(), auth.user_id).await?;

    Ok(Json(AppointmentsResponse {
        success: true,
        appointments,
    }))
}

/* ============================================================
   POST /cancel-appointment
   ============================================================ */

pub async fn cancel_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Json(req), _): WithRejection<Json<AppointmentIdRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let appointment_id = req
        .appointment_id
        .ok_or_else(|| ApiError::Validation("appointmentId is required".into()))?;

    appointments::cancel_appointment(state.store.as_ref(), auth.user_id, appointment_id).await?;
    Ok(Json(MessageResponse::ok("Appointment cancelled")))
}
