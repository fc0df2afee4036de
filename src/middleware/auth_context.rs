use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use uuid::Uuid;

use crate::auth::hash_access_token;
use crate::error::ApiError;
use crate::models::{AppState, Role};

/// Caller identity resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
    pub session_token_id: Uuid,
}

impl AuthContext {
    pub fn ensure_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Unauthorized("Admin access required".into()))
        }
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let TypedHeader(authz): TypedHeader<Authorization<Bearer>> =
                TypedHeader::from_request_parts(parts, state)
                    .await
                    .map_err(|_| ApiError::Unauthenticated("Not authorized, login again".into()))?;

            let token_hash = hash_access_token(authz.token());

            let session = state
                .store
                .find_active_session(&token_hash)
                .await?
                .ok_or_else(ApiError::session_expired)?;

            // best-effort
            if let Err(e) = state.store.touch_session(session.session_token_id).await {
                tracing::warn!("failed to touch session: {e}");
            }

            Ok(AuthContext {
                user_id: session.user_id,
                role: session.role,
                session_token_id: session.session_token_id,
            })
        }
    }
}
