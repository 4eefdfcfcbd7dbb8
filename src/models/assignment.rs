use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DoctorPatientAssignment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub is_active: bool,
    pub notes: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignPatientRequest {
    /// The patient's public identifier, case-insensitive.
    #[validate(length(min = 1, max = 32, message = "Patient ID is required"))]
    pub patient_id: String,

    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
}
