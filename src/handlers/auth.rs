use axum::{extract::State, Extension, Json};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    jwt::create_access_token,
    middleware::AuthUser,
    password::{hash_password, verify_password},
};
use crate::db::queries::{ensure_patient_id, PATIENT_ID_ATTEMPTS};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::models::user::{
    generate_patient_id, LoginRequest, RegisterRequest, Role, User, UserProfile,
};
use crate::AppState;

const USERNAME_CONSTRAINT: &str = "users_username_key";

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

fn auth_response(user: User, state: &AppState) -> AppResult<AuthResponse> {
    let access = create_access_token(user.id, &user.username, user.role, &state.config)?;
    Ok(AuthResponse {
        token: access.token,
        expires_in: access.expires_in,
        user: user.into(),
    })
}

fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

async fn insert_user(state: &AppState, body: &RegisterRequest, pwd_hash: &str) -> AppResult<User> {
    for _ in 0..PATIENT_ID_ATTEMPTS {
        let patient_id = (body.role == Role::Patient).then(generate_patient_id);
        let profile = body.doctor_profile();

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, date_of_birth, phone_number,
                               patient_id, specialization, license_number, years_experience)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&body.username)
        .bind(&body.email)
        .bind(pwd_hash)
        .bind(body.role)
        .bind(body.date_of_birth)
        .bind(&body.phone_number)
        .bind(&patient_id)
        .bind(profile.specialization)
        .bind(profile.license_number)
        .bind(profile.years_experience)
        .fetch_one(&state.db)
        .await;

        match result {
            Ok(user) => return Ok(user),
            Err(e) if violated_constraint(&e) == Some(USERNAME_CONSTRAINT) => {
                return Err(AppError::Conflict("Username already taken".into()));
            }
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(username = %body.username, "Patient ID collision on register, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique patient ID after {} attempts",
        PATIENT_ID_ATTEMPTS
    )))
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    body.validate()?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&body.username)
        .fetch_one(&state.db)
        .await?;

    if existing > 0 {
        return Err(AppError::Conflict("Username already taken".into()));
    }

    let pwd_hash = hash_password(&body.password)?;
    let user = insert_user(&state, &body, &pwd_hash).await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User registered");
    Ok(Json(auth_response(user, &state)?))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(&body.username)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash)? {
        tracing::info!(username = %body.username, "Login rejected");
        return Err(AppError::Unauthorized);
    }

    Ok(Json(auth_response(user, &state)?))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserProfile>> {
    let mut user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    user.patient_id = ensure_patient_id(&state.db, &user).await?;
    Ok(Json(user.into()))
}
