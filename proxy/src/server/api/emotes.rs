//! Emote lookup API.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use emote_resolver::{EmoteMap, NamedEmote, ResolveError};

use super::err_json;
use crate::app::SharedState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn map_resolve_error(err: &ResolveError, fallback: &str) -> (StatusCode, Json<Value>) {
    if err.is_not_found() {
        tracing::warn!("{err}");
        return err_json(404, "User not found");
    }
    tracing::error!("{fallback}: {err}");
    err_json(500, fallback)
}

/// GET /
pub async fn missing_user() -> (StatusCode, Json<Value>) {
    err_json(400, "Missing user ID")
}

/// GET /{user}
pub async fn get_user_emotes(
    State(state): State<SharedState>,
    Path(user): Path<String>,
) -> ApiResult<EmoteMap> {
    let user = user.to_lowercase();
    state
        .resolver()
        .get_emotes_for_user(&user)
        .await
        .map(Json)
        .map_err(|e| map_resolve_error(&e, "Failed to get emotes"))
}

/// GET /{user}/{emote}
pub async fn get_user_emote(
    State(state): State<SharedState>,
    Path((user, emote)): Path<(String, String)>,
) -> ApiResult<NamedEmote> {
    let user = user.to_lowercase();
    match state.resolver().get_emote_by_name(&user, &emote).await {
        Ok(found) => Ok(Json(found)),
        Err(ResolveError::EmoteNotFound(_)) => Err(err_json(404, "Emote not found")),
        Err(e) => Err(map_resolve_error(&e, "Failed to get emote")),
    }
}
