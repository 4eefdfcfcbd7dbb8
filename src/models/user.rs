use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Length of the public patient identifier handed to doctors.
pub const PATIENT_ID_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub patient_id: Option<String>,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub years_experience: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Patient,
    Doctor,
}

/// Public view of a user, safe to hand to the other side of an assignment.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
            patient_id: u.patient_id,
            date_of_birth: u.date_of_birth,
            phone_number: u.phone_number,
            specialization: u.specialization,
            license_number: u.license_number,
            years_experience: (u.role == Role::Doctor).then_some(u.years_experience),
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Role,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(max = 15, message = "Phone number must be at most 15 characters"))]
    pub phone_number: Option<String>,

    // Doctor profile; ignored for patients
    #[validate(length(max = 100, message = "Specialization must be at most 100 characters"))]
    pub specialization: Option<String>,

    #[validate(length(max = 50, message = "License number must be at most 50 characters"))]
    pub license_number: Option<String>,

    #[validate(range(min = 0, max = 80, message = "Years of experience must be 0-80"))]
    pub years_experience: Option<i32>,
}

/// Doctor-only profile fields as they should be stored for this registration.
pub struct DoctorProfile<'a> {
    pub specialization: Option<&'a str>,
    pub license_number: Option<&'a str>,
    pub years_experience: i32,
}

impl RegisterRequest {
    pub fn doctor_profile(&self) -> DoctorProfile<'_> {
        match self.role {
            Role::Doctor => DoctorProfile {
                specialization: self.specialization.as_deref(),
                license_number: self.license_number.as_deref(),
                years_experience: self.years_experience.unwrap_or(0),
            },
            Role::Patient => DoctorProfile {
                specialization: None,
                license_number: None,
                years_experience: 0,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Generate a candidate patient identifier: 8 uppercase hex characters.
///
/// Uniqueness is enforced by the `users.patient_id` constraint; callers retry
/// on a unique violation.
pub fn generate_patient_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    raw[..PATIENT_ID_LEN].to_uppercase()
}

/// Normalize a patient identifier typed by a doctor.
pub fn normalize_patient_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_patient_id_shape() {
        let id = generate_patient_id();
        assert_eq!(id.len(), PATIENT_ID_LEN);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn test_generated_patient_ids_differ() {
        assert_ne!(generate_patient_id(), generate_patient_id());
    }

    #[test]
    fn test_normalize_patient_id() {
        assert_eq!(normalize_patient_id("  ab12cd34 \n"), "AB12CD34");
    }

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            username: "sam".into(),
            email: "not-an-email".into(),
            password: "short".into(),
            role: Role::Patient,
            date_of_birth: None,
            phone_number: None,
            specialization: None,
            license_number: None,
            years_experience: Some(-1),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("years_experience"));
        assert!(!fields.contains_key("username"));
    }

    fn register_body(role: &str) -> RegisterRequest {
        serde_json::from_value(serde_json::json!({
            "username": "dr_grey",
            "email": "grey@example.com",
            "password": "long-enough-pw",
            "role": role,
            "specialization": "Psychiatry",
            "license_number": "LIC-42",
            "years_experience": 12,
        }))
        .unwrap()
    }

    #[test]
    fn test_doctor_profile_kept_for_doctors() {
        let req = register_body("doctor");
        assert!(req.validate().is_ok());
        let profile = req.doctor_profile();
        assert_eq!(profile.specialization, Some("Psychiatry"));
        assert_eq!(profile.license_number, Some("LIC-42"));
        assert_eq!(profile.years_experience, 12);
    }

    #[test]
    fn test_doctor_profile_dropped_for_patients() {
        let req = register_body("patient");
        let profile = req.doctor_profile();
        assert_eq!(profile.specialization, None);
        assert_eq!(profile.license_number, None);
        assert_eq!(profile.years_experience, 0);
    }

    #[test]
    fn test_role_defaults_to_patient() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "sam",
            "email": "sam@example.com",
            "password": "long-enough-pw",
        }))
        .unwrap();
        assert_eq!(req.role, Role::Patient);
    }
}
