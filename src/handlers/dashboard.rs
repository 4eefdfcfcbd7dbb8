use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::analytics::trend::{analyze_trend, TrendAnalysis};
use crate::auth::middleware::AuthUser;
use crate::db::queries::{
    assigned_doctors, assigned_patients, ensure_patient_id, mood_distribution, mood_stats,
    mood_values_since, visible_notes_for_patient, MoodStats,
};
use crate::error::{AppError, AppResult};
use crate::models::achievement::Achievement;
use crate::models::journal::JournalEntry;
use crate::models::mood::{MoodBucket, MoodEntry, PatientMoodEntry};
use crate::models::note::DoctorNoteView;
use crate::models::user::{Role, User, UserProfile};
use crate::AppState;

const RECENT_MOODS: i64 = 7;
const RECENT_JOURNALS: i64 = 5;
const RECENT_NOTES: i64 = 5;
const DOCTOR_RECENT_ENTRIES: i64 = 20;

#[derive(Debug, Serialize)]
pub struct PatientDashboard {
    pub role: Role,
    pub patient_id: Option<String>,
    pub stats: MoodStats,
    pub mood_distribution: Vec<MoodBucket>,
    pub recent_moods: Vec<MoodEntry>,
    pub recent_journals: Vec<JournalEntry>,
    pub achievements: Vec<Achievement>,
    pub doctor_notes: Vec<DoctorNoteView>,
    pub doctors: Vec<UserProfile>,
    pub trend_analysis: TrendAnalysis,
}

#[derive(Debug, Serialize)]
pub struct DoctorDashboard {
    pub role: Role,
    pub total_patients: usize,
    pub patients: Vec<UserProfile>,
    pub recent_entries: Vec<PatientMoodEntry>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DashboardStats {
    Patient(Box<PatientDashboard>),
    Doctor(DoctorDashboard),
}

pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<DashboardStats>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    let stats = match user.role {
        Role::Patient => DashboardStats::Patient(Box::new(patient_dashboard(&state, &user).await?)),
        Role::Doctor => DashboardStats::Doctor(doctor_dashboard(&state, user.id).await?),
    };

    Ok(Json(stats))
}

async fn patient_dashboard(state: &AppState, user: &User) -> AppResult<PatientDashboard> {
    let now = Utc::now();
    let patient_id = ensure_patient_id(&state.db, user).await?;
    let stats = mood_stats(&state.db, user.id, now.date_naive()).await?;
    let mood_distribution = mood_distribution(&state.db, user.id).await?;

    let recent_moods = sqlx::query_as::<_, MoodEntry>(
        "SELECT * FROM mood_entries WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user.id)
    .bind(RECENT_MOODS)
    .fetch_all(&state.db)
    .await?;

    let recent_journals = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user.id)
    .bind(RECENT_JOURNALS)
    .fetch_all(&state.db)
    .await?;

    let achievements = sqlx::query_as::<_, Achievement>(
        "SELECT * FROM achievements WHERE user_id = $1 ORDER BY unlocked_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    let doctor_notes = visible_notes_for_patient(&state.db, user.id, RECENT_NOTES).await?;
    let doctors = assigned_doctors(&state.db, user.id)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    let window_start = now - Duration::days(state.config.trend_window_days);
    let values = mood_values_since(&state.db, user.id, window_start).await?;

    Ok(PatientDashboard {
        role: Role::Patient,
        patient_id,
        stats,
        mood_distribution,
        recent_moods,
        recent_journals,
        achievements,
        doctor_notes,
        doctors,
        trend_analysis: analyze_trend(&values),
    })
}

async fn doctor_dashboard(state: &AppState, doctor_id: Uuid) -> AppResult<DoctorDashboard> {
    let patients: Vec<UserProfile> = assigned_patients(&state.db, doctor_id)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    let recent_entries = sqlx::query_as::<_, PatientMoodEntry>(
        r#"
        SELECT m.*, u.username AS patient_name
        FROM mood_entries m
        JOIN users u ON u.id = m.user_id
        JOIN doctor_patient_assignments a ON a.patient_id = m.user_id
        WHERE a.doctor_id = $1 AND a.is_active = true
        ORDER BY m.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(doctor_id)
    .bind(DOCTOR_RECENT_ENTRIES)
    .fetch_all(&state.db)
    .await?;

    Ok(DoctorDashboard {
        role: Role::Doctor,
        total_patients: patients.len(),
        patients,
        recent_entries,
    })
}
