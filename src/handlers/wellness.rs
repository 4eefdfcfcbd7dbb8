use axum::{extract::State, Json};
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::auth::roles::RequirePatient;
use crate::db::queries::assigned_doctors;
use crate::error::AppResult;
use crate::models::user::UserProfile;
use crate::AppState;

const QUOTES: [&str; 10] = [
    "You are stronger than you think.",
    "Every day is a new beginning.",
    "Your mental health matters.",
    "Small steps lead to big changes.",
    "You are not alone in this journey.",
    "Be kind to yourself today.",
    "Your feelings are valid.",
    "Progress, not perfection.",
    "You deserve peace and happiness.",
    "One day at a time.",
];

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub quote: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EmergencyContact {
    pub name: &'static str,
    pub number: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Resource {
    pub title: &'static str,
    pub description: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CrisisResources {
    pub emergency_contacts: &'static [EmergencyContact],
    pub resources: &'static [Resource],
    /// The patient's own doctors, listed alongside the hotlines.
    pub assigned_doctors: Vec<UserProfile>,
}

static EMERGENCY_CONTACTS: [EmergencyContact; 3] = [
    EmergencyContact {
        name: "National Suicide Prevention Lifeline",
        number: "988",
        description: "24/7 support for suicide prevention and mental health crisis",
    },
    EmergencyContact {
        name: "Crisis Text Line",
        number: "Text HOME to 741741",
        description: "Free 24/7 crisis counseling via text message",
    },
    EmergencyContact {
        name: "Emergency Services",
        number: "911",
        description: "For immediate danger or medical emergency",
    },
];

static RESOURCES: [Resource; 3] = [
    Resource {
        title: "Mental Health America",
        description: "Screening tools and mental health resources",
        url: "https://www.mhanational.org/",
    },
    Resource {
        title: "NAMI (National Alliance on Mental Illness)",
        description: "Support for individuals and families affected by mental illness",
        url: "https://www.nami.org/",
    },
    Resource {
        title: "Psychology Today",
        description: "Find therapists and mental health professionals",
        url: "https://www.psychologytoday.com/",
    },
];

fn random_quote() -> &'static str {
    QUOTES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(QUOTES[0])
}

pub async fn get_quote(RequirePatient(_patient): RequirePatient) -> Json<QuoteResponse> {
    Json(QuoteResponse {
        quote: random_quote(),
    })
}

pub async fn get_crisis_resources(
    State(state): State<AppState>,
    RequirePatient(patient): RequirePatient,
) -> AppResult<Json<CrisisResources>> {
    let doctors = assigned_doctors(&state.db, patient.id)
        .await?
        .into_iter()
        .map(UserProfile::from)
        .collect();

    Ok(Json(CrisisResources {
        emergency_contacts: &EMERGENCY_CONTACTS,
        resources: &RESOURCES,
        assigned_doctors: doctors,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_quote_comes_from_list() {
        for _ in 0..20 {
            assert!(QUOTES.contains(&random_quote()));
        }
    }

    #[test]
    fn test_crisis_contacts_include_988() {
        assert!(EMERGENCY_CONTACTS.iter().any(|c| c.number == "988"));
        assert_eq!(RESOURCES.len(), 3);
    }
}
