pub mod achievements;
pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod doctor;
pub mod health;
pub mod journals;
pub mod moods;
pub mod notes;
pub mod wellness;
