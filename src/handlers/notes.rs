use axum::{extract::State, Extension, Json};

use crate::auth::middleware::AuthUser;
use crate::db::queries::{notes_by_doctor, visible_notes_for_patient};
use crate::error::AppResult;
use crate::models::note::DoctorNoteView;
use crate::models::user::Role;
use crate::AppState;

const NOTES_LIMIT: i64 = 100;

/// Doctors see the notes they wrote; patients see the visible ones
/// from doctors still assigned to them.
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<DoctorNoteView>>> {
    let notes = match auth_user.role {
        Role::Doctor => notes_by_doctor(&state.db, auth_user.id, NOTES_LIMIT).await?,
        Role::Patient => visible_notes_for_patient(&state.db, auth_user.id, NOTES_LIMIT).await?,
    };

    Ok(Json(notes))
}
