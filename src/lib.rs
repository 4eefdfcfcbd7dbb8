//! Vyze API library.
//!
//! Mood tracking, journaling and doctor/patient assignments over a JSON API.
//! The binary and the integration tests both build the router from here.

pub mod analytics;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use auth::rate_limit::{RateLimitPolicy, RateLimitState};
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let policy = RateLimitPolicy {
            max_requests: config.auth_rate_limit_max,
            window: Duration::from_secs(config.auth_rate_limit_window_secs),
        };
        Self {
            db,
            config: Arc::new(config),
            rate_limiter: RateLimitState::new(policy),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = std::iter::once(config.frontend_url.as_str())
        .chain(config.cors_extra_origins.iter().map(String::as_str))
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    // Credential endpoints get a per-IP budget
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        // Moods
        .route(
            "/api/moods",
            get(handlers::moods::list_mood_entries).post(handlers::moods::create_mood_entry),
        )
        .route("/api/moods/:id", get(handlers::moods::get_mood_entry))
        // Journals
        .route(
            "/api/journals",
            get(handlers::journals::list_journal_entries)
                .post(handlers::journals::create_journal_entry),
        )
        .route("/api/journals/:id", get(handlers::journals::get_journal_entry))
        .route("/api/achievements", get(handlers::achievements::list_achievements))
        .route("/api/notes", get(handlers::notes::list_notes))
        .route("/api/dashboard/stats", get(handlers::dashboard::get_dashboard_stats))
        // Patient analytics & wellness
        .route("/api/analytics/progress", get(handlers::analytics::get_progress))
        .route("/api/analytics/prediction", get(handlers::analytics::get_prediction))
        .route("/api/wellness/quote", get(handlers::wellness::get_quote))
        .route(
            "/api/wellness/crisis-resources",
            get(handlers::wellness::get_crisis_resources),
        )
        // Doctor workspace
        .route(
            "/api/doctor/patients",
            get(handlers::doctor::list_patients).post(handlers::doctor::assign_patient),
        )
        .route(
            "/api/doctor/patients/:patient_id",
            get(handlers::doctor::get_patient_detail).delete(handlers::doctor::remove_patient),
        )
        .route(
            "/api/doctor/patients/:patient_id/notes",
            post(handlers::doctor::create_note),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
