// src/routes/user_routes.rs

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_extra::extract::WithRejection;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{AppState, MessageResponse, ProfileResponse, UpdateProfileRequest},
    services::profiles,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/get-profile", get(get_profile))
        .route("/update-profile", post(update_profile))
}

pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user_data = profiles::get_profile(state.store.as_ref(), auth.user_id).await?;
    Ok(Json(ProfileResponse {
        success: true,
        user_data,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Json(req), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    profiles::update_profile(state.store.as_ref(), auth.user_id, req).await?;
    Ok(Json(MessageResponse::ok("Profile updated")))
}
