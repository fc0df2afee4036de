use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::Store;
use crate::error::{ApiError, db_error};
use crate::models::{
    Appointment, Doctor, DoctorProfileUpdate, NewSession, ProfileUpdate, Role, SessionLookup, User,
};
use crate::slots::SlotLedger;

/// Open the pool and bring the schema up to date.
pub async fn connect_pg(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = r#"
    user_id, name, email, password_hash, role, image, phone, address, dob, gender, created_at
"#;

const DOCTOR_COLUMNS: &str = r#"
    doctor_id, user_id, name, email, image, speciality, degree, experience, about,
    fees, address, available, slots_booked, created_at
"#;

const APPOINTMENT_COLUMNS: &str = r#"
    appointment_id, user_id, doctor_id, slot_date, slot_time,
    user_data, doc_data, amount, cancelled, created_at
"#;

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO app_user
                (user_id, name, email, password_hash, role, image, phone, address, dob, gender, created_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.image)
        .bind(&user.phone)
        .bind(Json(&user.address))
        .bind(&user.dob)
        .bind(&user.gender)
        .bind(user.created_at)
        .execute(&self.db)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(db_error)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(db_error)
    }

    async fn update_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<bool, ApiError> {
        let res = sqlx::query(
            r#"
            UPDATE app_user
            SET name = $2,
                phone = $3,
                address = COALESCE($4, address),
                dob = $5,
                gender = $6,
                image = COALESCE($7, image)
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(update.address.as_ref().map(Json))
        .bind(&update.dob)
        .bind(&update.gender)
        .bind(update.image.as_deref())
        .execute(&self.db)
        .await
        .map_err(db_error)?;

        Ok(res.rows_affected() > 0)
    }

    async fn count_patients(&self) -> Result<i64, ApiError> {
        sqlx::query_scalar(r#"SELECT COUNT(*) FROM app_user WHERE role = $1"#)
            .bind(Role::Patient)
            .fetch_one(&self.db)
            .await
            .map_err(db_error)
    }

    async fn insert_session(&self, session: &NewSession) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO session_token
                (session_token_id, user_id, session_token_hash, expires_at)
            VALUES
                ($1, $2, $3, $4)
            "#,
        )
        .bind(session.session_token_id)
        .bind(session.user_id)
        .bind(&session.token_hash)
        .bind(session.expires_at)
        .execute(&self.db)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find_active_session(&self, token_hash: &str) -> Result<Option<SessionLookup>, ApiError> {
        sqlx::query_as::<_, SessionLookup>(
            r#"
            SELECT st.session_token_id, st.user_id, u.role
            FROM session_token st
            JOIN app_user u ON u.user_id = st.user_id
            WHERE st.session_token_hash = $1
              AND st.revoked_at IS NULL
              AND st.expires_at > now()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.db)
        .await
        .map_err(db_error)
    }

    async fn touch_session(&self, session_token_id: Uuid) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            UPDATE session_token
            SET last_seen_at = now()
            WHERE session_token_id = $1
            "#,
        )
        .bind(session_token_id)
        .execute(&self.db)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn revoke_session(&self, session_token_id: Uuid, user_id: Uuid) -> Result<bool, ApiError> {
        let res = sqlx::query(
            r#"
            UPDATE session_token
            SET revoked_at = now()
            WHERE session_token_id = $1
              AND user_id = $2
              AND revoked_at IS NULL
            "#,
        )
        .bind(session_token_id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(db_error)?;

        Ok(res.rows_affected() > 0)
    }

    async fn insert_doctor(&self, doctor: &Doctor) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO doctor
                (doctor_id, user_id, name, email, image, speciality, degree, experience, about,
                 fees, address, available, slots_booked, created_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(doctor.doctor_id)
        .bind(doctor.user_id)
        .bind(&doctor.name)
        .bind(&doctor.email)
        .bind(&doctor.image)
        .bind(&doctor.speciality)
        .bind(&doctor.degree)
        .bind(&doctor.experience)
        .bind(&doctor.about)
        .bind(doctor.fees)
        .bind(Json(&doctor.address))
        .bind(doctor.available)
        .bind(Json(&doctor.slots_booked))
        .bind(doctor.created_at)
        .execute(&self.db)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find_doctor(&self, doctor_id: Uuid) -> Result<Option<Doctor>, ApiError> {
        sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctor WHERE doctor_id = $1"
        ))
        .bind(doctor_id)
        .fetch_optional(&self.db)
        .await
        .map_err(db_error)
    }

    async fn find_doctor_by_user(&self, user_id: Uuid) -> Result<Option<Doctor>, ApiError> {
        sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctor WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .map_err(db_error)
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctor ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await
        .map_err(db_error)
    }

    async fn set_doctor_availability(&self, doctor_id: Uuid, available: bool) -> Result<bool, ApiError> {
        let res = sqlx::query(r#"UPDATE doctor SET available = $2 WHERE doctor_id = $1"#)
            .bind(doctor_id)
            .bind(available)
            .execute(&self.db)
            .await
            .map_err(db_error)?;

        Ok(res.rows_affected() > 0)
    }

    async fn update_doctor_profile(
        &self,
        doctor_id: Uuid,
        update: &DoctorProfileUpdate,
    ) -> Result<bool, ApiError> {
        let res = sqlx::query(
            r#"
            UPDATE doctor
            SET fees = COALESCE($2, fees),
                address = COALESCE($3, address),
                available = COALESCE($4, available)
            WHERE doctor_id = $1
            "#,
        )
        .bind(doctor_id)
        .bind(update.fees)
        .bind(update.address.as_ref().map(Json))
        .bind(update.available)
        .execute(&self.db)
        .await
        .map_err(db_error)?;

        Ok(res.rows_affected() > 0)
    }

    async fn save_slots(&self, doctor_id: Uuid, ledger: &SlotLedger) -> Result<(), ApiError> {
        sqlx::query(r#"UPDATE doctor SET slots_booked = $2 WHERE doctor_id = $1"#)
            .bind(doctor_id)
            .bind(Json(ledger))
            .execute(&self.db)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn insert_appointment(&self, appointment: &Appointment) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO appointment
                (appointment_id, user_id, doctor_id, slot_date, slot_time,
                 user_data, doc_data, amount, cancelled, created_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(appointment.appointment_id)
        .bind(appointment.user_id)
        .bind(appointment.doctor_id)
        .bind(&appointment.slot_date)
        .bind(&appointment.slot_time)
        .bind(Json(&appointment.user_data))
        .bind(Json(&appointment.doc_data))
        .bind(appointment.amount)
        .bind(appointment.cancelled)
        .bind(appointment.created_at)
        .execute(&self.db)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn find_appointment(&self, appointment_id: Uuid) -> Result<Option<Appointment>, ApiError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointment WHERE appointment_id = $1"
        ))
        .bind(appointment_id)
        .fetch_optional(&self.db)
        .await
        .map_err(db_error)
    }

    async fn list_appointments_for_user(&self, user_id: Uuid) -> Result<Vec<Appointment>, ApiError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointment WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_error)
    }

    async fn list_appointments_for_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, ApiError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointment WHERE doctor_id = $1 ORDER BY created_at DESC"
        ))
        .bind(doctor_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_error)
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointment ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await
        .map_err(db_error)
    }

    async fn mark_appointment_cancelled(&self, appointment_id: Uuid) -> Result<(), ApiError> {
        sqlx::query(r#"UPDATE appointment SET cancelled = true WHERE appointment_id = $1"#)
            .bind(appointment_id)
            .execute(&self.db)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
