//! Queries shared by more than one handler.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analytics::{self, achievements::due_achievements, streak};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::achievement::Achievement;
use crate::models::assignment::DoctorPatientAssignment;
use crate::models::journal::DailyCount;
use crate::models::mood::{DailyMood, MoodBucket};
use crate::models::note::DoctorNoteView;
use crate::models::user::{generate_patient_id, Role, User};

/// Attempts at finding an unused patient identifier before giving up.
pub const PATIENT_ID_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct MoodStats {
    pub total_moods: i64,
    pub total_journals: i64,
    pub avg_mood: f64,
    pub avg_mood_percentage: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
}

/// Every distinct UTC calendar day on which the user logged a mood.
pub async fn mood_entry_dates(db: &PgPool, user_id: Uuid) -> Result<Vec<NaiveDate>, sqlx::Error> {
    sqlx::query_scalar::<_, NaiveDate>(
        r#"
        SELECT DISTINCT (created_at AT TIME ZONE 'UTC')::date AS day
        FROM mood_entries
        WHERE user_id = $1
        ORDER BY day DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Mood values logged at or after `since`, oldest first.
pub async fn mood_values_since(
    db: &PgPool,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        SELECT mood FROM mood_entries
        WHERE user_id = $1 AND created_at >= $2
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(db)
    .await
}

/// Mood values logged on calendar days `start..=end`, oldest first.
pub async fn mood_values_between(
    db: &PgPool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        SELECT mood FROM mood_entries
        WHERE user_id = $1
          AND (created_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3
        ORDER BY created_at ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
}

/// The `limit` most recent mood values, returned oldest first.
pub async fn recent_mood_values(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<i32>, sqlx::Error> {
    let mut values = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT mood FROM mood_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await?;
    values.reverse();
    Ok(values)
}

pub async fn journal_count(db: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM journal_entries WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await
}

pub async fn mood_stats(db: &PgPool, user_id: Uuid, today: NaiveDate) -> Result<MoodStats, sqlx::Error> {
    let (total_moods, avg_mood) = sqlx::query_as::<_, (i64, Option<f64>)>(
        "SELECT COUNT(*), AVG(mood)::float8 FROM mood_entries WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;

    let total_journals = journal_count(db, user_id).await?;
    let dates = mood_entry_dates(db, user_id).await?;
    let avg_mood = analytics::round1(avg_mood.unwrap_or(0.0));

    Ok(MoodStats {
        total_moods,
        total_journals,
        avg_mood,
        avg_mood_percentage: analytics::mood_percentage(avg_mood),
        current_streak: streak::current_streak(dates.iter().copied(), today),
        longest_streak: streak::longest_streak(dates),
    })
}

pub async fn daily_mood_trend(
    db: &PgPool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyMood>, sqlx::Error> {
    sqlx::query_as::<_, DailyMood>(
        r#"
        SELECT (created_at AT TIME ZONE 'UTC')::date AS date,
               AVG(mood)::float8 AS avg_mood,
               COUNT(*) AS count
        FROM mood_entries
        WHERE user_id = $1
          AND (created_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3
        GROUP BY 1
        ORDER BY 1 ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
}

pub async fn mood_distribution(db: &PgPool, user_id: Uuid) -> Result<Vec<MoodBucket>, sqlx::Error> {
    sqlx::query_as::<_, MoodBucket>(
        r#"
        SELECT mood, COUNT(*) AS count
        FROM mood_entries
        WHERE user_id = $1
        GROUP BY mood
        ORDER BY mood ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn journal_activity(
    db: &PgPool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailyCount>, sqlx::Error> {
    sqlx::query_as::<_, DailyCount>(
        r#"
        SELECT (created_at AT TIME ZONE 'UTC')::date AS date, COUNT(*) AS count
        FROM journal_entries
        WHERE user_id = $1
          AND (created_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3
        GROUP BY 1
        ORDER BY 1 ASC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
}

pub async fn find_patient_by_code(db: &PgPool, code: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE patient_id = $1 AND role = $2")
        .bind(code)
        .bind(Role::Patient)
        .fetch_optional(db)
        .await
}

pub async fn active_assignment(
    db: &PgPool,
    doctor_id: Uuid,
    patient_id: Uuid,
) -> Result<Option<DoctorPatientAssignment>, sqlx::Error> {
    sqlx::query_as::<_, DoctorPatientAssignment>(
        r#"
        SELECT * FROM doctor_patient_assignments
        WHERE doctor_id = $1 AND patient_id = $2 AND is_active = true
        "#,
    )
    .bind(doctor_id)
    .bind(patient_id)
    .fetch_optional(db)
    .await
}

/// Patients the doctor currently holds an active assignment for.
pub async fn assigned_patients(db: &PgPool, doctor_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM users u
        JOIN doctor_patient_assignments a ON a.patient_id = u.id
        WHERE a.doctor_id = $1 AND a.is_active = true
        ORDER BY a.assigned_at DESC
        "#,
    )
    .bind(doctor_id)
    .fetch_all(db)
    .await
}

/// Doctors currently holding an active assignment for the patient.
pub async fn assigned_doctors(db: &PgPool, patient_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM users u
        JOIN doctor_patient_assignments a ON a.doctor_id = u.id
        WHERE a.patient_id = $1 AND a.is_active = true
        ORDER BY a.assigned_at DESC
        "#,
    )
    .bind(patient_id)
    .fetch_all(db)
    .await
}

/// Notes a patient may read: flagged visible, written by a doctor who is
/// still actively assigned.
pub async fn visible_notes_for_patient(
    db: &PgPool,
    patient_id: Uuid,
    limit: i64,
) -> Result<Vec<DoctorNoteView>, sqlx::Error> {
    sqlx::query_as::<_, DoctorNoteView>(
        r#"
        SELECT n.*, d.username AS doctor_name, p.username AS patient_name
        FROM doctor_notes n
        JOIN users d ON d.id = n.doctor_id
        JOIN users p ON p.id = n.patient_id
        WHERE n.patient_id = $1
          AND n.is_visible_to_patient = true
          AND EXISTS (
              SELECT 1 FROM doctor_patient_assignments a
              WHERE a.doctor_id = n.doctor_id
                AND a.patient_id = n.patient_id
                AND a.is_active = true
          )
        ORDER BY n.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(patient_id)
    .bind(limit)
    .fetch_all(db)
    .await
}

pub async fn notes_by_doctor(
    db: &PgPool,
    doctor_id: Uuid,
    limit: i64,
) -> Result<Vec<DoctorNoteView>, sqlx::Error> {
    sqlx::query_as::<_, DoctorNoteView>(
        r#"
        SELECT n.*, d.username AS doctor_name, p.username AS patient_name
        FROM doctor_notes n
        JOIN users d ON d.id = n.doctor_id
        JOIN users p ON p.id = n.patient_id
        WHERE n.doctor_id = $1
        ORDER BY n.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(doctor_id)
    .bind(limit)
    .fetch_all(db)
    .await
}

/// Run the achievement rules after a new mood entry.
///
/// The insert ignores `(user_id, title)` conflicts, so a concurrent request
/// that already awarded the same achievement turns this into a no-op.
pub async fn award_achievements(db: &PgPool, user_id: Uuid) -> Result<Vec<Achievement>, sqlx::Error> {
    let entry_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM mood_entries WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(db)
            .await?;

    let unlocked =
        sqlx::query_scalar::<_, String>("SELECT title FROM achievements WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(db)
            .await?;

    let mut awarded = Vec::new();
    for rule in due_achievements(entry_count, &unlocked) {
        let inserted = sqlx::query_as::<_, Achievement>(
            r#"
            INSERT INTO achievements (id, user_id, title, description, points)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, title) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(rule.title)
        .bind(rule.description)
        .bind(rule.points)
        .fetch_optional(db)
        .await?;

        if let Some(achievement) = inserted {
            tracing::info!(user_id = %user_id, title = %achievement.title, "Achievement unlocked");
            awarded.push(achievement);
        }
    }

    Ok(awarded)
}

/// Return the patient's identifier, allocating one if the account has none.
pub async fn ensure_patient_id(db: &PgPool, user: &User) -> AppResult<Option<String>> {
    if user.role != Role::Patient {
        return Ok(None);
    }
    if let Some(existing) = user.patient_id.as_deref().filter(|id| !id.is_empty()) {
        return Ok(Some(existing.to_string()));
    }

    for _ in 0..PATIENT_ID_ATTEMPTS {
        let candidate = generate_patient_id();
        // COALESCE keeps whatever a concurrent request may have written first
        let result = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE users SET patient_id = COALESCE(NULLIF(patient_id, ''), $2)
            WHERE id = $1
            RETURNING patient_id
            "#,
        )
        .bind(user.id)
        .bind(&candidate)
        .fetch_one(db)
        .await;

        match result {
            Ok(id) => {
                tracing::info!(user_id = %user.id, "Assigned patient ID");
                return Ok(Some(id));
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(user_id = %user.id, "Patient ID collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique patient ID after {} attempts",
        PATIENT_ID_ATTEMPTS
    )))
}
