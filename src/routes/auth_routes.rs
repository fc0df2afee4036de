// src/routes/auth_routes.rs

use axum::{Json, Router, extract::State, routing::post};
use axum_extra::extract::WithRejection;

use crate::{
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{AppState, LoginRequest, MessageResponse, RegisterRequest, TokenResponse},
    services::accounts,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = accounts::register(state.store.as_ref(), req, state.session_ttl_hours).await?;
    Ok(Json(TokenResponse { success: true, token }))
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = accounts::login(state.store.as_ref(), req, state.session_ttl_hours).await?;
    Ok(Json(TokenResponse { success: true, token }))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<Json<MessageResponse>, ApiError> {
    accounts::logout(state.store.as_ref(), &auth).await?;
    Ok(Json(MessageResponse::ok("Logged out")))
}
