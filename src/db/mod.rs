use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    Appointment, Doctor, DoctorProfileUpdate, NewSession, ProfileUpdate, SessionLookup, User,
};
use crate::slots::SlotLedger;

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::{PgStore, connect_pg};

/// Persistence used by the services: id lookups, field updates and equality queries.
///
/// Every driver failure surfaces as `ApiError::Storage`; a unique-email clash
/// surfaces as `ApiError::Validation`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), ApiError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, ApiError>;
    /// Returns false when no such user exists.
    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<bool, ApiError>;
    async fn count_patients(&self) -> Result<i64, ApiError>;

    async fn insert_session(&self, session: &NewSession) -> Result<(), ApiError>;
    /// Unrevoked, unexpired session for this token hash.
    async fn find_active_session(&self, token_hash: &str) -> Result<Option<SessionLookup>, ApiError>;
    async fn touch_session(&self, session_token_id: Uuid) -> Result<(), ApiError>;
    /// Returns false when the session was already revoked or belongs to someone else.
    async fn revoke_session(&self, session_token_id: Uuid, user_id: Uuid) -> Result<bool, ApiError>;

    async fn insert_doctor(&self, doctor: &Doctor) -> Result<(), ApiError>;
    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, ApiError>;
    /// Doctor record linked to a login account.
    async fn find_doctor_by_user(&self, user_id: Uuid) -> Result<Option<Doctor>, ApiError>;
    async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError>;
    /// Returns false when no such doctor exists.
    async fn set_doctor_availability(&self, doctor_id: Uuid, available: bool) -> Result<bool, ApiError>;
    /// Returns false when no such doctor exists.
    async fn update_doctor_profile(
        &self,
        doctor_id: Uuid,
        update: &DoctorProfileUpdate,
    ) -> Result<bool, ApiError>;
    async fn save_slots(&self, doctor_id: Uuid, ledger: &SlotLedger) -> Result<(), ApiError>;

    async fn insert_appointment(&self, appointment: &Appointment) -> Result<(), ApiError>;
    async fn find_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, ApiError>;
    /// Newest first.
    async fn list_appointments_for_user(&self, user_id: Uuid) -> Result<Vec<Appointment>, ApiError>;
    /// Newest first.
    async fn list_appointments_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, ApiError>;
    /// Newest first.
    async fn list_appointments(&self) -> Result<Vec<Appointment>, ApiError>;
    async fn mark_appointment_cancelled(&self, appointment_id: Uuid) -> Result<(), ApiError>;
}
