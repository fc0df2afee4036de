// In-process Store for unit and router tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::Store;
use crate::error::ApiError;
use crate::models::{
    Appointment, Doctor, DoctorProfileUpdate, NewSession, ProfileUpdate, Role, SessionLookup, User,
};
use crate::slots::SlotLedger;

struct SessionEntry {
    session: NewSession,
    revoked_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    sessions: Vec<SessionEntry>,
    doctors: Vec<Doctor>,
    appointments: Vec<Appointment>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_appointment_inserts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `insert_appointment` fail with a storage error.
    pub fn fail_appointment_inserts(&self) {
        self.fail_appointment_inserts.store(true, Ordering::SeqCst);
    }

    pub fn doctor_ledger(&self, doctor_id: Uuid) -> Option<SlotLedger> {
        let inner = self.inner.lock().unwrap();
        inner
            .doctors
            .iter()
            .find(|d| d.doctor_id == doctor_id)
            .map(|d| d.slots_booked.clone())
    }

    pub fn remove_doctor(&self, doctor_id: Uuid) {
        self.inner.lock().unwrap().doctors.retain(|d| d.doctor_id != doctor_id);
    }

    pub fn appointment_count(&self) -> usize {
        self.inner.lock().unwrap().appointments.len()
    }

    pub fn expire_sessions(&self) {
        let mut inner = self.inner.lock().unwrap();
        for entry in inner.sessions.iter_mut() {
            entry.session.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }
}

fn newest_first(mut list: Vec<Appointment>) -> Vec<Appointment> {
    list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    list
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(ApiError::Validation("Email already registered".into()));
        }
        inner.users.push(user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<bool, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.users.iter_mut().find(|u| u.user_id == user_id) else {
            return Ok(false);
        };
        user.name = update.name.clone();
        user.phone = update.phone.clone();
        if let Some(address) = &update.address {
            user.address = address.clone();
        }
        user.dob = update.dob.clone();
        user.gender = update.gender.clone();
        if let Some(image) = &update.image {
            user.image = image.clone();
        }
        Ok(true)
    }

    async fn count_patients(&self) -> Result<i64, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().filter(|u| u.role == Role::Patient).count() as i64)
    }

    async fn insert_session(&self, session: &NewSession) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.push(SessionEntry {
            session: session.clone(),
            revoked_at: None,
        });
        Ok(())
    }

    async fn find_active_session(&self, token_hash: &str) -> Result<Option<SessionLookup>, ApiError> {
        let inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let Some(entry) = inner.sessions.iter().find(|e| {
            e.session.token_hash == token_hash && e.revoked_at.is_none() && e.session.expires_at > now
        }) else {
            return Ok(None);
        };
        Ok(inner
            .users
            .iter()
            .find(|u| u.user_id == entry.session.user_id)
            .map(|u| SessionLookup {
                session_token_id: entry.session.session_token_id,
                user_id: u.user_id,
                role: u.role,
            }))
    }

    async fn touch_session(&self, _session_token_id: Uuid) -> Result<(), ApiError> {
        Ok(())
    }

    async fn revoke_session(&self, session_token_id: Uuid, user_id: Uuid) -> Result<bool, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(entry) = inner.sessions.iter_mut().find(|e| {
            e.session.session_token_id == session_token_id
                && e.session.user_id == user_id
                && e.revoked_at.is_none()
        }) else {
            return Ok(false);
        };
        entry.revoked_at = Some(Utc::now());
        Ok(true)
    }

    async fn insert_doctor(&self, doctor: &Doctor) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.doctors.iter().any(|d| d.email == doctor.email) {
            return Err(ApiError::Validation("Email already registered".into()));
        }
        inner.doctors.push(doctor.clone());
        Ok(())
    }

    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.doctors.iter().find(|d| d.doctor_id == doctor_id).cloned())
    }

    async fn find_doctor_by_user(&self, user_id: Uuid) -> Result<Option<Doctor>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.doctors.iter().find(|d| d.user_id == user_id).cloned())
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        Ok(self.inner.lock().unwrap().doctors.clone())
    }

    async fn set_doctor_availability(&self, doctor_id: Uuid, available: bool) -> Result<bool, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(doctor) = inner.doctors.iter_mut().find(|d| d.doctor_id == doctor_id) else {
            return Ok(false);
        };
        doctor.available = available;
        Ok(true)
    }

    async fn update_doctor_profile(
        &self,
        doctor_id: Uuid,
        update: &DoctorProfileUpdate,
    ) -> Result<bool, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(doctor) = inner.doctors.iter_mut().find(|d| d.doctor_id == doctor_id) else {
            return Ok(false);
        };
        if let Some(fees) = update.fees {
            doctor.fees = fees;
        }
        if let Some(address) = &update.address {
            doctor.address = address.clone();
        }
        if let Some(available) = update.available {
            doctor.available = available;
        }
        Ok(true)
    }

    async fn save_slots(&self, doctor_id: Uuid, ledger: &SlotLedger) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(doctor) = inner.doctors.iter_mut().find(|d| d.doctor_id == doctor_id) {
            doctor.slots_booked = ledger.clone();
        }
        Ok(())
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> Result<(), ApiError> {
        if self.fail_appointment_inserts.load(Ordering::SeqCst) {
            return Err(ApiError::Storage("db error: simulated insert failure".into()));
        }
        self.inner.lock().unwrap().appointments.push(appointment.clone());
        Ok(())
    }

    async fn find_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .appointments
            .iter()
            .find(|a| a.appointment_id == appointment_id)
            .cloned())
    }

    async fn list_appointments_for_user(&self, user_id: Uuid) -> Result<Vec<Appointment>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(newest_first(
            inner.appointments.iter().filter(|a| a.user_id == user_id).cloned().collect(),
        ))
    }

    async fn list_appointments_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, ApiError> {
        let inner = self.inner.lock().unwrap();
        Ok(newest_first(
            inner.appointments.iter().filter(|a| a.doctor_id == doctor_id).cloned().collect(),
        ))
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        Ok(newest_first(self.inner.lock().unwrap().appointments.clone()))
    }

    async fn mark_appointment_cancelled(&self, appointment_id: Uuid) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(a) = inner.appointments.iter_mut().find(|a| a.appointment_id == appointment_id) {
            a.cancelled = true;
        }
        Ok(())
    }
}
