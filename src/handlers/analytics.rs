use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::analytics::forecast::{
    predict_next_mood, prediction_confidence, weekly_forecast, PredictionConfidence,
    WeeklyForecast,
};
use crate::analytics::recommend::generate_recommendations;
use crate::analytics::trend::{analyze_trend, Trend};
use crate::analytics::{mean, round1};
use crate::auth::roles::RequirePatient;
use crate::db::queries::{
    daily_mood_trend, journal_activity, journal_count, mood_distribution, mood_stats,
    mood_values_between, recent_mood_values, MoodStats,
};
use crate::error::AppResult;
use crate::models::achievement::Achievement;
use crate::models::journal::DailyCount;
use crate::models::mood::{DailyMood, MoodBucket};
use crate::AppState;

const PROGRESS_DAYS: i64 = 30;
const RECENT_ACHIEVEMENTS: i64 = 5;

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub mood_trend: Vec<DailyMood>,
    pub journal_activity: Vec<DailyCount>,
    pub recent_achievements: Vec<Achievement>,
    pub stats: MoodStats,
    pub mood_distribution: Vec<MoodBucket>,
    pub forecast: WeeklyForecast,
}

#[derive(Debug, Serialize)]
pub struct MoodPrediction {
    pub avg_mood: f64,
    pub trend: Trend,
    pub trend_message: String,
    pub recommendations: Vec<String>,
    pub data_points: usize,
    pub predicted_mood: f64,
    pub confidence: PredictionConfidence,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: Option<MoodPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Assemble the prediction for a non-empty sample, oldest value first.
///
/// Recommendation buckets see the exact mean; only the reported average is rounded.
fn build_prediction(values: &[i32], journal_count: i64) -> MoodPrediction {
    let analysis = analyze_trend(values);
    let avg_mood = mean(values).unwrap_or_default();

    MoodPrediction {
        avg_mood: round1(avg_mood),
        trend: analysis.trend,
        trend_message: analysis.trend.message().to_string(),
        recommendations: generate_recommendations(avg_mood, analysis.trend, journal_count),
        data_points: values.len(),
        predicted_mood: predict_next_mood(values),
        confidence: prediction_confidence(values),
    }
}

pub async fn get_progress(
    State(state): State<AppState>,
    RequirePatient(patient): RequirePatient,
) -> AppResult<Json<ProgressResponse>> {
    let today = Utc::now().date_naive();
    let start = today - Duration::days(PROGRESS_DAYS);

    let mood_trend = daily_mood_trend(&state.db, patient.id, start, today).await?;
    let journal_activity = journal_activity(&state.db, patient.id, start, today).await?;

    let recent_achievements = sqlx::query_as::<_, Achievement>(
        "SELECT * FROM achievements WHERE user_id = $1 ORDER BY unlocked_at DESC LIMIT $2",
    )
    .bind(patient.id)
    .bind(RECENT_ACHIEVEMENTS)
    .fetch_all(&state.db)
    .await?;

    let stats = mood_stats(&state.db, patient.id, today).await?;
    let mood_distribution = mood_distribution(&state.db, patient.id).await?;

    let forecast_start = today - Duration::days(state.config.forecast_window_days);
    let forecast_values = mood_values_between(&state.db, patient.id, forecast_start, today).await?;

    Ok(Json(ProgressResponse {
        mood_trend,
        journal_activity,
        recent_achievements,
        stats,
        mood_distribution,
        forecast: weekly_forecast(&forecast_values),
    }))
}

pub async fn get_prediction(
    State(state): State<AppState>,
    RequirePatient(patient): RequirePatient,
) -> AppResult<Json<PredictionResponse>> {
    let values =
        recent_mood_values(&state.db, patient.id, state.config.prediction_sample_size).await?;

    if values.len() < state.config.prediction_min_entries {
        return Ok(Json(PredictionResponse {
            prediction: None,
            message: Some(format!(
                "Log at least {} moods to unlock predictions",
                state.config.prediction_min_entries
            )),
        }));
    }

    let journals = journal_count(&state.db, patient.id).await?;
    let prediction = build_prediction(&values, journals);

    tracing::debug!(user_id = %patient.id, trend = ?prediction.trend, "Mood prediction computed");
    Ok(Json(PredictionResponse {
        prediction: Some(prediction),
        message: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_use_unrounded_mean() {
        // mean 3.95 reports as 4.0 but still counts as a low mood
        let mut values = vec![4; 19];
        values.push(3);
        values.rotate_right(1);

        let prediction = build_prediction(&values, 10);
        assert_eq!(prediction.avg_mood, 4.0);
        assert_eq!(prediction.trend, Trend::Stable);
        assert_eq!(
            prediction.recommendations[0],
            "Consider speaking with a mental health professional"
        );
    }

    #[test]
    fn test_prediction_fields_follow_sample() {
        let values = [5, 5, 5, 5, 5, 5, 5];
        let prediction = build_prediction(&values, 0);
        assert_eq!(prediction.data_points, 7);
        assert_eq!(prediction.predicted_mood, 5.0);
        assert_eq!(prediction.confidence, PredictionConfidence::High);
        assert!(prediction
            .recommendations
            .iter()
            .any(|r| r.starts_with("Try journaling")));
    }
}
