use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::analytics::trend::{analyze_trend, TrendAnalysis};
use crate::auth::roles::RequireDoctor;
use crate::db::queries::{
    active_assignment, assigned_patients, daily_mood_trend, find_patient_by_code,
    mood_distribution, mood_stats, mood_values_since, MoodStats,
};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::assignment::{AssignPatientRequest, DoctorPatientAssignment};
use crate::models::journal::JournalEntry;
use crate::models::mood::{DailyMood, MoodBucket, MoodEntry};
use crate::models::note::{CreateNoteRequest, DoctorNote};
use crate::models::user::{normalize_patient_id, User, UserProfile};
use crate::AppState;

const DETAIL_TREND_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub assignment: DoctorPatientAssignment,
    pub patient: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct PatientDetail {
    pub patient: UserProfile,
    pub assignment: DoctorPatientAssignment,
    pub mood_entries: Vec<MoodEntry>,
    pub journal_entries: Vec<JournalEntry>,
    pub mood_trend: Vec<DailyMood>,
    pub mood_distribution: Vec<MoodBucket>,
    pub stats: MoodStats,
    pub trend_analysis: TrendAnalysis,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

async fn lookup_patient(state: &AppState, raw_code: &str) -> AppResult<User> {
    let code = normalize_patient_id(raw_code);
    find_patient_by_code(&state.db, &code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No patient found with ID: {}", code)))
}

/// Resolve a patient the doctor is actively assigned to.
async fn assigned_patient(
    state: &AppState,
    doctor_id: Uuid,
    raw_code: &str,
) -> AppResult<(User, DoctorPatientAssignment)> {
    let patient = lookup_patient(state, raw_code).await?;
    let assignment = active_assignment(&state.db, doctor_id, patient.id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Patient is not assigned to you".into()))?;
    Ok((patient, assignment))
}

pub async fn list_patients(
    State(state): State<AppState>,
    RequireDoctor(doctor): RequireDoctor,
) -> AppResult<Json<Vec<UserProfile>>> {
    let patients = assigned_patients(&state.db, doctor.id)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    Ok(Json(patients))
}

pub async fn assign_patient(
    State(state): State<AppState>,
    RequireDoctor(doctor): RequireDoctor,
    Json(body): Json<AssignPatientRequest>,
) -> AppResult<Json<AssignmentResponse>> {
    body.validate()?;

    let patient = lookup_patient(&state, &body.patient_id).await?;

    let existing = sqlx::query_as::<_, DoctorPatientAssignment>(
        "SELECT * FROM doctor_patient_assignments WHERE doctor_id = $1 AND patient_id = $2",
    )
    .bind(doctor.id)
    .bind(patient.id)
    .fetch_optional(&state.db)
    .await?;

    let assignment = match existing {
        Some(a) if a.is_active => {
            return Err(AppError::Conflict(
                "Patient is already assigned to you".into(),
            ));
        }
        Some(a) => {
            sqlx::query_as::<_, DoctorPatientAssignment>(
                r#"
                UPDATE doctor_patient_assignments
                SET is_active = true, assigned_at = NOW(), notes = $2
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(a.id)
            .bind(&body.notes)
            .fetch_one(&state.db)
            .await?
        }
        None => sqlx::query_as::<_, DoctorPatientAssignment>(
            r#"
            INSERT INTO doctor_patient_assignments (id, doctor_id, patient_id, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(doctor.id)
        .bind(patient.id)
        .bind(&body.notes)
        .fetch_one(&state.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Patient is already assigned to you".into())
            } else {
                e.into()
            }
        })?,
    };

    tracing::info!(doctor_id = %doctor.id, patient_id = %patient.id, "Patient assigned");
    Ok(Json(AssignmentResponse {
        assignment,
        patient: patient.into(),
    }))
}

pub async fn get_patient_detail(
    State(state): State<AppState>,
    RequireDoctor(doctor): RequireDoctor,
    Path(patient_code): Path<String>,
) -> AppResult<Json<PatientDetail>> {
    let (patient, assignment) = assigned_patient(&state, doctor.id, &patient_code).await?;
    let now = Utc::now();
    let today = now.date_naive();

    let mood_entries = sqlx::query_as::<_, MoodEntry>(
        "SELECT * FROM mood_entries WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(patient.id)
    .fetch_all(&state.db)
    .await?;

    let journal_entries = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(patient.id)
    .fetch_all(&state.db)
    .await?;

    let mood_trend = daily_mood_trend(
        &state.db,
        patient.id,
        today - Duration::days(DETAIL_TREND_DAYS),
        today,
    )
    .await?;
    let mood_distribution = mood_distribution(&state.db, patient.id).await?;
    let stats = mood_stats(&state.db, patient.id, today).await?;

    let window_start = now - Duration::days(state.config.trend_window_days);
    let values = mood_values_since(&state.db, patient.id, window_start).await?;

    Ok(Json(PatientDetail {
        patient: patient.into(),
        assignment,
        mood_entries,
        journal_entries,
        mood_trend,
        mood_distribution,
        stats,
        trend_analysis: analyze_trend(&values),
    }))
}

pub async fn remove_patient(
    State(state): State<AppState>,
    RequireDoctor(doctor): RequireDoctor,
    Path(patient_code): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let (patient, assignment) = assigned_patient(&state, doctor.id, &patient_code).await?;

    sqlx::query("UPDATE doctor_patient_assignments SET is_active = false WHERE id = $1")
        .bind(assignment.id)
        .execute(&state.db)
        .await?;

    tracing::info!(doctor_id = %doctor.id, patient_id = %patient.id, "Patient unassigned");
    Ok(Json(MessageResponse {
        message: format!("Patient {} removed from your list", patient.username),
    }))
}

pub async fn create_note(
    State(state): State<AppState>,
    RequireDoctor(doctor): RequireDoctor,
    Path(patient_code): Path<String>,
    Json(body): Json<CreateNoteRequest>,
) -> AppResult<Json<DoctorNote>> {
    body.validate()?;

    let (patient, _) = assigned_patient(&state, doctor.id, &patient_code).await?;

    let note = sqlx::query_as::<_, DoctorNote>(
        r#"
        INSERT INTO doctor_notes (id, patient_id, doctor_id, note, is_visible_to_patient)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(patient.id)
    .bind(doctor.id)
    .bind(&body.note)
    .bind(body.is_visible_to_patient)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(doctor_id = %doctor.id, patient_id = %patient.id, "Doctor note added");
    Ok(Json(note))
}
