// src/routes/doctor_routes.rs

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
        AppState, AppointmentIdRequest, AppointmentsResponse, DashboardResponse,
        DoctorAdminView, DoctorDashboardData, DoctorListing, DoctorProfileResponse,
        DoctorsResponse, LoginRequest, MessageResponse, TokenResponse, UpdateDoctorProfileRequest,
    },
    services::{accounts, appointments, doctors},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", get(list_doctors))
        .route("/login", post(login))
        .route("/appointments", get(my_appointments))
        .route("/cancel-appointment", post(cancel_appointment))
        .route("/dashboard", get(dashboard))
        .route("/profile", get(profile))
        .route("/update-profile", post(update_profile))
}

/// Public listing used by the booking page; no auth, no contact emails.
pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<DoctorsResponse<DoctorListing>>, ApiError> {
    let doctors = doctors::list_doctors(state.store.as_ref())
        .await?
        .into_iter()
        .map(DoctorListing::from)
        .collect();

    Ok(Json(DoctorsResponse {
        success: true,
        doctors,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = accounts::doctor_login(state.store.as_ref(), req, state.session_ttl_hours).await?;
    Ok(Json(TokenResponse { success: true, token }))
}

pub async fn my_appointments(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let store = state.store.as_ref();
    let doctor = doctors::doctor_for_session(store, &auth).await?;
    let appointments = appointments::list_doctor_appointments(store, doctor.doctor_id).await?;

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
    let store = state.store.as_ref();
    let doctor = doctors::doctor_for_session(store, &auth).await?;
    let appointment_id = req
        .appointment_id
        .ok_or_else(|| ApiError::Validation("appointmentId is required".into()))?;

    appointments::doctor_cancel_appointment(store, doctor.doctor_id, appointment_id).await?;
    Ok(Json(MessageResponse::ok("Appointment cancelled")))
}

pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<DashboardResponse<DoctorDashboardData>>, ApiError> {
    let store = state.store.as_ref();
    let doctor = doctors::doctor_for_session(store, &auth).await?;
    let dash_data = appointments::doctor_dashboard(store, doctor.doctor_id).await?;

    Ok(Json(DashboardResponse {
        success: true,
        dash_data,
    }))
}

pub async fn profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<DoctorProfileResponse>, ApiError> {
    let doctor = doctors::doctor_for_session(state.store.as_ref(), &auth).await?;

    Ok(Json(DoctorProfileResponse {
        success: true,
        profile_data: DoctorAdminView::from(doctor),
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Json(req), _): WithRejection<Json<UpdateDoctorProfileRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let store = state.store.as_ref();
    let doctor = doctors::doctor_for_session(store, &auth).await?;

    doctors::update_doctor_profile(store, doctor.doctor_id, req).await?;
    Ok(Json(MessageResponse::ok("Profile updated")))
}
