use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    auth::{generate_access_token, hash_access_token, hash_password, verify_password},
    db::Store,
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{LoginRequest, NewSession, RegisterRequest, Role, User},
    services::non_blank,
};

const MIN_PASSWORD_LEN: usize = 8;

/// Structural email check: one `@`, non-empty local part, dotted domain, no spaces.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let invalid = || ApiError::Validation("Enter a valid email".into());

    if email.len() > 254 || email.contains(char::is_whitespace) || email.contains("..") {
        return Err(invalid());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    if local.is_empty() || local.len() > 64 || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Create a patient account and log it in.
pub async fn register(
    store: &dyn Store,
    req: RegisterRequest,
    session_ttl_hours: i64,
) -> Result<String, ApiError> {
    let (Some(name), Some(email), Some(password)) =
        (non_blank(req.name), non_blank(req.email), req.password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::Validation("Missing details".into()));
    };

    let email = email.to_lowercase();
    validate_email(&email)?;
    validate_password(&password)?;

    let user = User::new(name, email, hash_password(&password)?, Role::Patient);
    store.insert_user(&user).await?;
    tracing::info!(user_id = %user.user_id, "registered user");

    issue_session(store, user.user_id, session_ttl_hours).await
}

/// Login for the patient app and the admin panel; any role is accepted.
pub async fn login(
    store: &dyn Store,
    req: LoginRequest,
    session_ttl_hours: i64,
) -> Result<String, ApiError> {
    login_with_role(store, req, session_ttl_hours, None).await
}

/// Login for the doctor panel; only doctor accounts get a session.
pub async fn doctor_login(
    store: &dyn Store,
    req: LoginRequest,
    session_ttl_hours: i64,
) -> Result<String, ApiError> {
    login_with_role(store, req, session_ttl_hours, Some(Role::Doctor)).await
}

async fn login_with_role(
    store: &dyn Store,
    req: LoginRequest,
    session_ttl_hours: i64,
    required_role: Option<Role>,
) -> Result<String, ApiError> {
    let (Some(email), Some(password)) = (non_blank(req.email), req.password) else {
        return Err(ApiError::Validation("email and password are required".into()));
    };

    let user = store
        .find_user_by_email(&email.to_lowercase())
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    if !verify_password(&password, &user.password_hash) {
        return Err(ApiError::invalid_credentials());
    }

    if required_role.is_some_and(|role| role != user.role) {
        return Err(ApiError::Unauthorized("Account type not allowed for this login".into()));
    }

    issue_session(store, user.user_id, session_ttl_hours).await
}

pub async fn logout(store: &dyn Store, auth: &AuthContext) -> Result<(), ApiError> {
    if !store.revoke_session(auth.session_token_id, auth.user_id).await? {
        return Err(ApiError::session_expired());
    }
    Ok(())
}

/// Ensure the configured admin account exists. Existing accounts are left alone.
pub async fn bootstrap_admin(store: &dyn Store, email: &str, password: &str) -> Result<(), ApiError> {
    if store.find_user_by_email(email).await?.is_some() {
        return Ok(());
    }
    let admin = User::new("Admin".into(), email.to_string(), hash_password(password)?, Role::Admin);
    store.insert_user(&admin).await?;
    tracing::info!(user_id = %admin.user_id, "created admin account");
    Ok(())
}

async fn issue_session(store: &dyn Store, user_id: Uuid, ttl_hours: i64) -> Result<String, ApiError> {
    let expires_at = Duration::try_hours(ttl_hours)
        .filter(|ttl| *ttl > Duration::zero())
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| ApiError::Storage(format!("session ttl out of range: {ttl_hours}h")))?;

    let access_token = generate_access_token();
    let session = NewSession {
        session_token_id: Uuid::new_v4(),
        user_id,
        token_hash: hash_access_token(&access_token),
        expires_at,
    };
    store.insert_session(&session).await?;
    Ok(access_token)
}
