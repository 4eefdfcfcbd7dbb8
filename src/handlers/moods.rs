use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::queries::award_achievements;
use crate::error::{AppError, AppResult};
use crate::models::mood::{CreateMoodEntryRequest, CreateMoodEntryResponse, MoodEntry, MoodQuery};
use crate::AppState;

const DEFAULT_RANGE_DAYS: i64 = 30;

pub async fn create_mood_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodEntryRequest>,
) -> AppResult<Json<CreateMoodEntryResponse>> {
    body.validate()?;

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, mood, note, tags)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.mood)
    .bind(&body.note)
    .bind(&body.tags)
    .fetch_one(&state.db)
    .await?;

    let unlocked = award_achievements(&state.db, auth_user.id).await?;

    tracing::debug!(user_id = %auth_user.id, mood = entry.mood, "Mood entry logged");
    Ok(Json(CreateMoodEntryResponse { entry, unlocked }))
}

pub async fn list_mood_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start = query
        .start_date
        .unwrap_or_else(|| end - Duration::days(DEFAULT_RANGE_DAYS));

    if start > end {
        return Err(AppError::Validation(
            "start_date must not be after end_date".into(),
        ));
    }

    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1
          AND (created_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

pub async fn get_mood_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<MoodEntry>> {
    let entry = sqlx::query_as::<_, MoodEntry>(
        "SELECT * FROM mood_entries WHERE id = $1 AND user_id = $2",
    )
    .bind(entry_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Mood entry not found".into()))?;

    Ok(Json(entry))
}
