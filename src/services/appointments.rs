//! Booking and cancellation against a doctor's slot ledger.
//!
//! Both flows are a read-modify-write of the ledger followed by a write of the
//! appointment record. The two writes are not atomic and concurrent bookings of
//! the same slot are not serialized here; that belongs to the storage layer.

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::Store,
    error::ApiError,
    models::{
        Appointment, BookAppointmentRequest, DashboardData, DoctorDashboardData, DoctorSnapshot,
        UserSnapshot,
    },
    services::non_blank,
};

const LATEST_ON_DASHBOARD: usize = 5;

pub async fn book_appointment(
    store: &dyn Store,
    user_id: Uuid,
    req: BookAppointmentRequest,
) -> Result<Appointment, ApiError> {
    let (Some(doctor_id), Some(slot_date), Some(slot_time)) =
        (req.doc_id, non_blank(req.slot_date), non_blank(req.slot_time))
    else {
        return Err(ApiError::Validation("docId, slotDate and slotTime are required".into()));
    };

    let mut doctor = store
        .find_doctor(doctor_id)
        .await?
        .ok_or(ApiError::DoctorNotFound)?;

    if !doctor.available {
        return Err(ApiError::DoctorUnavailable);
    }

    doctor.slots_booked.reserve(&slot_date, &slot_time)?;

    let user = store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(ApiError::session_expired)?;

    store.save_slots(doctor_id, &doctor.slots_booked).await?;

    let appointment = Appointment {
        appointment_id: Uuid::new_v4(),
        user_id,
        doctor_id,
        slot_date,
        slot_time,
        user_data: UserSnapshot::from(&user),
        doc_data: DoctorSnapshot::from(&doctor),
        amount: doctor.fees,
        cancelled: false,
        created_at: Utc::now(),
    };

    if let Err(e) = store.insert_appointment(&appointment).await {
        tracing::error!(
            %doctor_id,
            slot_date = %appointment.slot_date,
            slot_time = %appointment.slot_time,
            "slot reserved but appointment insert failed: {e}"
        );
        return Err(e);
    }

    tracing::info!(
        appointment_id = %appointment.appointment_id,
        %user_id,
        %doctor_id,
        "appointment booked"
    );
    Ok(appointment)
}

pub async fn list_appointments(store: &dyn Store, user_id: Uuid) -> Result<Vec<Appointment>, ApiError> {
    store.list_appointments_for_user(user_id).await
}

pub async fn list_all_appointments(store: &dyn Store) -> Result<Vec<Appointment>, ApiError> {
    store.list_appointments().await
}

pub async fn list_doctor_appointments(
    store: &dyn Store,
    doctor_id: Uuid,
) -> Result<Vec<Appointment>, ApiError> {
    store.list_appointments_for_doctor(doctor_id).await
}

/// Patient-initiated cancellation: only the owner may cancel.
pub async fn cancel_appointment(
    store: &dyn Store,
    user_id: Uuid,
    appointment_id: Uuid,
) -> Result<(), ApiError> {
    let appointment = store
        .find_appointment(appointment_id)
        .await?
        .ok_or(ApiError::AppointmentNotFound)?;

    if appointment.user_id != user_id {
        return Err(ApiError::Unauthorized("Unauthorized action".into()));
    }

    cancel_and_release(store, appointment).await
}

/// Admin cancellation, no ownership check.
pub async fn admin_cancel_appointment(store: &dyn Store, appointment_id: Uuid) -> Result<(), ApiError> {
    let appointment = store
        .find_appointment(appointment_id)
        .await?
        .ok_or(ApiError::AppointmentNotFound)?;

    cancel_and_release(store, appointment).await
}

/// Doctor-initiated cancellation: only appointments booked with this doctor.
pub async fn doctor_cancel_appointment(
    store: &dyn Store,
    doctor_id: Uuid,
    appointment_id: Uuid,
) -> Result<(), ApiError> {
    let appointment = store
        .find_appointment(appointment_id)
        .await?
        .ok_or(ApiError::AppointmentNotFound)?;

    if appointment.doctor_id != doctor_id {
        return Err(ApiError::Unauthorized("Unauthorized action".into()));
    }

    cancel_and_release(store, appointment).await
}

async fn cancel_and_release(store: &dyn Store, appointment: Appointment) -> Result<(), ApiError> {
    // Already cancelled: the slot was released back then and may have been re-booked since.
    if appointment.cancelled {
        return Ok(());
    }

    let mut doctor = store
        .find_doctor(appointment.doctor_id)
        .await?
        .ok_or(ApiError::DoctorNotFound)?;

    store.mark_appointment_cancelled(appointment.appointment_id).await?;

    doctor
        .slots_booked
        .release(&appointment.slot_date, &appointment.slot_time);
    store.save_slots(doctor.doctor_id, &doctor.slots_booked).await?;

    tracing::info!(
        appointment_id = %appointment.appointment_id,
        doctor_id = %doctor.doctor_id,
        "appointment cancelled"
    );
    Ok(())
}

pub async fn dashboard(store: &dyn Store) -> Result<DashboardData, ApiError> {
    let doctors = store.list_doctors().await?.len();
    let patients = store.count_patients().await?;
    let all = store.list_appointments().await?;

    Ok(DashboardData {
        doctors,
        patients,
        appointments: all.len(),
        latest_appointments: all.into_iter().take(LATEST_ON_DASHBOARD).collect(),
    })
}

pub async fn doctor_dashboard(
    store: &dyn Store,
    doctor_id: Uuid,
) -> Result<DoctorDashboardData, ApiError> {
    let all = store.list_appointments_for_doctor(doctor_id).await?;

    let earnings = all.iter().filter(|a| !a.cancelled).map(|a| a.amount).sum();
    let patients = all.iter().map(|a| a.user_id).collect::<HashSet<_>>().len();

    Ok(DoctorDashboardData {
        earnings,
        appointments: all.len(),
        patients,
        latest_appointments: all.into_iter().take(LATEST_ON_DASHBOARD).collect(),
    })
}
