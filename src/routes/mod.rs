use crate::models::AppState;
use axum::Router;

pub mod admin_routes;
pub mod appointment_routes;
pub mod auth_routes;
pub mod doctor_routes;
pub mod user_routes;

pub fn router(state: AppState) -> Router {
    let user_api = auth_routes::router()
        .merge(user_routes::router())
        .merge(appointment_routes::router());

    Router::new()
        .nest("/api/user", user_api)
        .nest("/api/doctor", doctor_routes::router())
        .nest("/api/admin", admin_routes::router())
        .with_state(state)
}
