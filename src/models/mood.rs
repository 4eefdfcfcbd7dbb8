use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::achievement::Achievement;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: i32,
    pub note: String,
    pub tags: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMoodEntryRequest {
    #[validate(range(min = 1, max = 10, message = "Mood must be between 1 and 10"))]
    pub mood: i32,

    #[serde(default)]
    #[validate(length(max = 5000, message = "Note must be under 5000 characters"))]
    pub note: String,

    #[validate(length(max = 200, message = "Tags must be under 200 characters"))]
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct CreateMoodEntryResponse {
    #[serde(flatten)]
    pub entry: MoodEntry,
    /// Achievements unlocked by this entry, usually empty.
    pub unlocked: Vec<Achievement>,
}

/// Mood entry tagged with its author, for views spanning several patients.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PatientMoodEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: MoodEntry,
    pub patient_name: String,
}

/// Per-day mood aggregate used by trend charts.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyMood {
    pub date: NaiveDate,
    pub avg_mood: f64,
    pub count: i64,
}

/// How many entries carry each mood score.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MoodBucket {
    pub mood: i32,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mood: i32) -> CreateMoodEntryRequest {
        CreateMoodEntryRequest {
            mood,
            note: String::new(),
            tags: None,
        }
    }

    #[test]
    fn test_mood_range() {
        assert!(request(1).validate().is_ok());
        assert!(request(10).validate().is_ok());
        assert!(request(0).validate().is_err());
        assert!(request(11).validate().is_err());
    }

    #[test]
    fn test_tags_length() {
        let mut req = request(5);
        req.tags = Some("x".repeat(201));
        assert!(req.validate().is_err());
    }
}
