//! Router-level tests for the paths decided before any database access.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use axum::http::header;
use axum::Router;

use common::{body_json, build_test_app, lazy_pool, send, token_for};
use vyze_api::models::user::Role;

fn app() -> Router {
    build_test_app(lazy_pool())
}

#[tokio::test]
async fn health_returns_service_info() {
    let response = send(app(), Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "vyze-api");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = send(app(), Method::GET, "/api/nope", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let response = send(app(), Method::GET, "/api/moods", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], 401);
}

#[tokio::test]
async fn garbage_token_is_401() {
    let response = send(
        app(),
        Method::GET,
        "/api/dashboard/stats",
        Some("not-a-jwt"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn patient_cannot_use_doctor_routes() {
    let token = token_for(Role::Patient);

    let list = send(
        app(),
        Method::GET,
        "/api/doctor/patients",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(list.status(), StatusCode::FORBIDDEN);

    let note = send(
        app(),
        Method::POST,
        "/api/doctor/patients/AB12CD34/notes",
        Some(&token),
        Some(json!({ "note": "hello" })),
    )
    .await;
    assert_eq!(note.status(), StatusCode::FORBIDDEN);

    let json = body_json(note).await;
    assert_eq!(json["error"]["code"], 403);
}

#[tokio::test]
async fn doctor_cannot_use_patient_routes() {
    let token = token_for(Role::Doctor);

    for uri in [
        "/api/analytics/progress",
        "/api/analytics/prediction",
        "/api/wellness/quote",
        "/api/wellness/crisis-resources",
    ] {
        let response = send(app(), Method::GET, uri, Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn patient_gets_a_quote() {
    let token = token_for(Role::Patient);
    let response = send(
        app(),
        Method::GET,
        "/api/wellness/quote",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["quote"].is_string());
}

#[tokio::test]
async fn out_of_range_mood_is_rejected() {
    let token = token_for(Role::Patient);
    let response = send(
        app(),
        Method::POST,
        "/api/moods",
        Some(&token),
        Some(json!({ "mood": 11, "note": "too good" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], 422);
}

#[tokio::test]
async fn empty_journal_title_is_rejected() {
    let token = token_for(Role::Patient);
    let response = send(
        app(),
        Method::POST,
        "/api/journals",
        Some(&token),
        Some(json!({ "title": "", "content": "text" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn inverted_mood_range_is_rejected() {
    let token = token_for(Role::Patient);
    let response = send(
        app(),
        Method::GET,
        "/api/moods?start_date=2026-02-01&end_date=2026-01-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn register_validates_before_touching_the_store() {
    let response = send(
        app(),
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "username": "sam",
            "email": "not-an-email",
            "password": "short",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn register_is_rate_limited_per_client() {
    let app = app();
    let bad_body = json!({ "username": "", "email": "x", "password": "y" });

    for _ in 0..5 {
        let response = send(
            app.clone(),
            Method::POST,
            "/api/auth/register",
            None,
            Some(bad_body.clone()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    let limited = send(
        app.clone(),
        Method::POST,
        "/api/auth/register",
        None,
        Some(bad_body.clone()),
    )
    .await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = limited.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(body_json(limited).await["error"]["code"], 429);

    // Login keeps its own budget
    let login = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "sam" })),
    )
    .await;
    assert_ne!(login.status(), StatusCode::TOO_MANY_REQUESTS);
}
