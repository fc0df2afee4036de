use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::Store;
use crate::slots::SlotLedger;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub session_ttl_hours: i64,
}

/* -------------------------
   Domain records
--------------------------*/

/// Stored as smallint: 0 patient, 1 admin, 2 doctor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Role {
    Patient = 0,
    Admin = 1,
    Doctor = 2,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub image: String,
    pub phone: String,
    #[sqlx(json)]
    pub address: Address,
    pub dob: String,
    pub gender: String,
    pub created_at: DateTime<Utc>,
}

const NOT_SELECTED: &str = "Not Selected";
const DEFAULT_PHONE: &str = "0000000000";

impl User {
    /// A freshly registered account with placeholder profile fields.
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role,
            image: String::new(),
            phone: DEFAULT_PHONE.to_string(),
            address: Address::default(),
            dob: NOT_SELECTED.to_string(),
            gender: NOT_SELECTED.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Validated profile edit. `None` for `address` or `image` keeps the stored value.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
    pub address: Option<Address>,
    pub dob: String,
    pub gender: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_token_id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SessionLookup {
    pub session_token_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, FromRow)]
pub struct Doctor {
    pub doctor_id: Uuid,
    /// Login account (role `Doctor`) for the doctor panel.
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: i64,
    #[sqlx(json)]
    pub address: Address,
    pub available: bool,
    #[sqlx(json)]
    pub slots_booked: SlotLedger,
    pub created_at: DateTime<Utc>,
}

/// Doctor's own edit of their listing. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct DoctorProfileUpdate {
    pub fees: Option<i64>,
    pub address: Option<Address>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "id")]
    pub appointment_id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "docId")]
    pub doctor_id: Uuid,
    pub slot_date: String,
    pub slot_time: String,
    #[sqlx(json)]
    pub user_data: UserSnapshot,
    #[sqlx(json)]
    pub doc_data: DoctorSnapshot,
    pub amount: i64,
    pub cancelled: bool,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

/* -------------------------
   Booking-time snapshots
--------------------------*/

/// Copy of the patient taken when an appointment is booked. Later profile
/// edits never reach it; credentials are never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: String,
    pub phone: String,
    pub address: Address,
    pub dob: String,
    pub gender: String,
}

impl From<&User> for UserSnapshot {
    fn from(u: &User) -> Self {
        Self {
            id: u.user_id,
            name: u.name.clone(),
            email: u.email.clone(),
            image: u.image.clone(),
            phone: u.phone.clone(),
            address: u.address.clone(),
            dob: u.dob.clone(),
            gender: u.gender.clone(),
        }
    }
}

/// Copy of the doctor taken at booking time, without the slot ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorSnapshot {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: i64,
    pub address: Address,
}

impl From<&Doctor> for DoctorSnapshot {
    fn from(d: &Doctor) -> Self {
        Self {
            id: d.doctor_id,
            name: d.name.clone(),
            email: d.email.clone(),
            image: d.image.clone(),
            speciality: d.speciality.clone(),
            degree: d.degree.clone(),
            experience: d.experience.clone(),
            about: d.about.clone(),
            fees: d.fees,
            address: d.address.clone(),
        }
    }
}

/* -------------------------
   API DTOs
--------------------------*/

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    /// Public URL of an avatar already uploaded to image hosting.
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub doc_id: Option<Uuid>,
    pub slot_date: Option<String>,
    pub slot_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentIdRequest {
    pub appointment_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorIdRequest {
    pub doc_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AddDoctorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub speciality: Option<String>,
    pub degree: Option<String>,
    pub experience: Option<String>,
    pub about: Option<String>,
    pub fees: Option<i64>,
    pub address: Option<Address>,
    /// Password for the doctor's panel login.
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDoctorProfileRequest {
    pub fees: Option<i64>,
    pub address: Option<Address>,
    pub available: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

/// Profile as returned to its owner: everything except the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub image: String,
    pub phone: String,
    pub address: Address,
    pub dob: String,
    pub gender: String,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.user_id,
            name: u.name,
            email: u.email,
            role: u.role,
            image: u.image,
            phone: u.phone,
            address: u.address,
            dob: u.dob,
            gender: u.gender,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub success: bool,
    pub user_data: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub success: bool,
    pub message: String,
    pub appointment: Appointment,
}

#[derive(Debug, Serialize)]
pub struct AppointmentsResponse {
    pub success: bool,
    pub appointments: Vec<Appointment>,
}

/// Public doctor card. The contact email stays private.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorListing {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: i64,
    pub address: Address,
    pub available: bool,
    pub slots_booked: SlotLedger,
}

impl From<Doctor> for DoctorListing {
    fn from(d: Doctor) -> Self {
        Self {
            id: d.doctor_id,
            name: d.name,
            image: d.image,
            speciality: d.speciality,
            degree: d.degree,
            experience: d.experience,
            about: d.about,
            fees: d.fees,
            address: d.address,
            available: d.available,
            slots_booked: d.slots_booked,
        }
    }
}

/// Admin view of a doctor: the public card plus the contact email.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorAdminView {
    pub email: String,
    #[serde(flatten)]
    pub listing: DoctorListing,
}

impl From<Doctor> for DoctorAdminView {
    fn from(d: Doctor) -> Self {
        Self {
            email: d.email.clone(),
            listing: DoctorListing::from(d),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorsResponse<T> {
    pub success: bool,
    pub doctors: Vec<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub doctors: usize,
    pub patients: i64,
    pub appointments: usize,
    pub latest_appointments: Vec<Appointment>,
}

/// Doctor panel summary. Earnings leave out cancelled appointments.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDashboardData {
    pub earnings: i64,
    pub appointments: usize,
    pub patients: usize,
    pub latest_appointments: Vec<Appointment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse<T> {
    pub success: bool,
    pub dash_data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfileResponse {
    pub success: bool,
    pub profile_data: DoctorAdminView,
}
