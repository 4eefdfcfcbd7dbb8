use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DoctorNote {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub is_visible_to_patient: bool,
}

/// Note joined with both parties' usernames for display.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DoctorNoteView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub note: DoctorNote,
    pub doctor_name: String,
    pub patient_name: String,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 10000, message = "Note must be 1-10000 characters"))]
    pub note: String,

    #[serde(default = "default_visible")]
    pub is_visible_to_patient: bool,
}
