use chrono::Utc;
use uuid::Uuid;

use crate::{
    auth::hash_password,
    db::Store,
    error::ApiError,
    middleware::auth_context::AuthContext,
    models::{AddDoctorRequest, Doctor, DoctorProfileUpdate, Role, UpdateDoctorProfileRequest, User},
    services::{
        accounts::{validate_email, validate_password},
        non_blank,
    },
    slots::SlotLedger,
};

pub async fn list_doctors(store: &dyn Store) -> Result<Vec<Doctor>, ApiError> {
    store.list_doctors().await
}

/// Register a doctor together with their panel login. New doctors are
/// available with an empty ledger.
pub async fn add_doctor(store: &dyn Store, req: AddDoctorRequest) -> Result<Doctor, ApiError> {
    let (
        Some(name),
        Some(email),
        Some(speciality),
        Some(degree),
        Some(experience),
        Some(about),
        Some(fees),
        Some(address),
        Some(password),
    ) = (
        non_blank(req.name),
        non_blank(req.email),
        non_blank(req.speciality),
        non_blank(req.degree),
        non_blank(req.experience),
        non_blank(req.about),
        req.fees,
        req.address,
        req.password.filter(|p| !p.is_empty()),
    )
    else {
        return Err(ApiError::Validation("Missing details".into()));
    };

    let email = email.to_lowercase();
    validate_email(&email)?;
    validate_password(&password)?;
    validate_fees(fees)?;

    // the account row owns the unique email, so a clash fails before the doctor row
    let account = User::new(name.clone(), email.clone(), hash_password(&password)?, Role::Doctor);
    store.insert_user(&account).await?;

    let doctor = Doctor {
        doctor_id: Uuid::new_v4(),
        user_id: account.user_id,
        name,
        email,
        image: non_blank(req.image).unwrap_or_default(),
        speciality,
        degree,
        experience,
        about,
        fees,
        address,
        available: true,
        slots_booked: SlotLedger::new(),
        created_at: Utc::now(),
    };
    if let Err(e) = store.insert_doctor(&doctor).await {
        tracing::error!(user_id = %account.user_id, "doctor account created but doctor insert failed: {e}");
        return Err(e);
    }
    tracing::info!(doctor_id = %doctor.doctor_id, user_id = %doctor.user_id, "added doctor");

    Ok(doctor)
}

/// Flip the availability flag; returns the new value.
pub async fn change_availability(store: &dyn Store, doctor_id: Uuid) -> Result<bool, ApiError> {
    let doctor = store
        .find_doctor(doctor_id)
        .await?
        .ok_or(ApiError::DoctorNotFound)?;

    let available = !doctor.available;
    if !store.set_doctor_availability(doctor_id, available).await? {
        return Err(ApiError::DoctorNotFound);
    }
    tracing::info!(%doctor_id, available, "changed doctor availability");
    Ok(available)
}

fn validate_fees(fees: i64) -> Result<(), ApiError> {
    if fees < 0 {
        return Err(ApiError::Validation("fees must be >= 0".into()));
    }
    Ok(())
}

/// Doctor record behind the caller's session. Non-doctor accounts are refused.
pub async fn doctor_for_session(store: &dyn Store, auth: &AuthContext) -> Result<Doctor, ApiError> {
    if auth.role != Role::Doctor {
        return Err(ApiError::Unauthorized("Doctor access required".into()));
    }
    store
        .find_doctor_by_user(auth.user_id)
        .await?
        .ok_or(ApiError::DoctorNotFound)
}

/// Doctor's own edit of fees, address and availability. Omitted fields keep their value.
pub async fn update_doctor_profile(
    store: &dyn Store,
    doctor_id: Uuid,
    req: UpdateDoctorProfileRequest,
) -> Result<(), ApiError> {
    if req.fees.is_none() && req.address.is_none() && req.available.is_none() {
        return Err(ApiError::Validation("Data missing".into()));
    }
    if let Some(fees) = req.fees {
        validate_fees(fees)?;
    }

    let update = DoctorProfileUpdate {
        fees: req.fees,
        address: req.address,
        available: req.available,
    };
    if !store.update_doctor_profile(doctor_id, &update).await? {
        return Err(ApiError::DoctorNotFound);
    }
    tracing::info!(%doctor_id, "doctor updated profile");
    Ok(())
}
