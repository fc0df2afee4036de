// src/routes/admin_routes.rs

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;
use serde::Serialize;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{
        AddDoctorRequest, AppState, AppointmentIdRequest, AppointmentsResponse, DashboardData,
        DashboardResponse, DoctorAdminView, DoctorIdRequest, DoctorsResponse, MessageResponse,
    },
    services::{appointments, doctors},
};

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub success: bool,
    pub message: String,
    pub available: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add-doctor", post(add_doctor))
        .route("/all-doctors", get(all_doctors))
        .route("/change-availability", post(change_availability))
        .route("/appointments", get(all_appointments))
        .route("/cancel-appointment", post(cancel_appointment))
        .route("/dashboard", get(dashboard))
}

pub async fn add_doctor(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Json(req), _): WithRejection<Json<AddDoctorRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth.ensure_admin()?;
    doctors::add_doctor(state.store.as_ref(), req).await?;
    Ok(Json(MessageResponse::ok("Doctor added")))
}

pub async fn all_doctors(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<DoctorsResponse<DoctorAdminView>>, ApiError> {
    auth.ensure_admin()?;
    let doctors = doctors::list_doctors(state.store.as_ref())
        .await?
        .into_iter()
        .map(DoctorAdminView::from)
        .collect();

    Ok(Json(DoctorsResponse {
        success: true,
        doctors,
    }))
}

pub async fn change_availability(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Json(req), _): WithRejection<Json<DoctorIdRequest>, ApiError>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    auth.ensure_admin()?;
    let doctor_id = req
        .doc_id
        .ok_or_else(|| ApiError::Validation("docId is required".into()))?;

    let available = doctors::change_availability(state.store.as_ref(), doctor_id).await?;
    Ok(Json(AvailabilityResponse {
        success: true,
        message: "Availability changed".into(),
        available,
    }))
}

pub async fn all_appointments(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    auth.ensure_admin()?;
    let appointments = appointments::list_all_appointments(state.store.as_ref()).await?;

    Ok(Json(AppointmentsResponse {
        success: true,
        appointments,
    }))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Json(req), _): WithRejection<Json<AppointmentIdRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth.ensure_admin()?;
    let appointment_id = req
        .appointment_id
        .ok_or_else(|| ApiError::Validation("appointmentId is required".into()))?;

    appointments::admin_cancel_appointment(state.store.as_ref(), appointment_id).await?;
    Ok(Json(MessageResponse::ok("Appointment cancelled")))
}

pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<DashboardResponse<DashboardData>>, ApiError> {
    auth.ensure_admin()?;
    let dash_data = appointments::dashboard(state.store.as_ref()).await?;

    Ok(Json(DashboardResponse {
        success: true,
        dash_data,
    }))
}
