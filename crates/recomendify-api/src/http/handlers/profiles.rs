//! Profile directory REST handlers.
//!
//! - `GET  /rest/v1/profiles[?email=..]`: all profiles, or the one with that email.
//! - `GET  /rest/v1/profiles/{id}`
//! - `POST /rest/v1/profiles`: insert or replace by id.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use recomendify_core::bot::CompletionBackend;
use recomendify_core::repository::ProfileDirectory;
use recomendify_types::error::StoreError;
use recomendify_types::peer::Profile;

use crate::http::error::AppError;
use crate::state::ServerState;

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub email: Option<String>,
}

/// GET /rest/v1/profiles
pub async fn list_profiles<C: CompletionBackend + 'static>(
    State(state): State<ServerState<C>>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<Vec<Profile>>, AppError> {
    let profiles = match query.email {
        Some(email) => state.profiles.find_by_email(&email).await?.into_iter().collect(),
        None => state.profiles.list_profiles().await?,
    };
    Ok(Json(profiles))
}

/// GET /rest/v1/profiles/{id}
pub async fn get_profile<C: CompletionBackend + 'static>(
    State(state): State<ServerState<C>>,
    Path(id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let profile = state
        .profiles
        .get_profile(&id)
        .await?
        .ok_or(StoreError::NotFound)?;
    Ok(Json(profile))
}

/// POST /rest/v1/profiles
pub async fn upsert_profile<C: CompletionBackend + 'static>(
    State(state): State<ServerState<C>>,
    Json(body): Json<Profile>,
) -> Result<Json<Profile>, AppError> {
    if body.id.trim().is_empty() {
        return Err(AppError::Validation("id is required".to_string()));
    }
    let profile = state.profiles.upsert_profile(&body).await?;
    Ok(Json(profile))
}
