//! Friendship endpoints.

use api_types::friend::{FriendListResponse, FriendNew, ReconcileResponse};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, accounts, server::ServerState};

/// Links the authenticated account with another one, both directions at once.
pub async fn add(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<FriendNew>,
) -> Result<StatusCode, ServerError> {
    let id = accounts::account_id(&account)?;
    state.engine.add_friend(id, payload.friend_id).await?;
    Ok(StatusCode::CREATED)
}

/// Lists the mutual friends of the authenticated account.
pub async fn list(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<FriendListResponse>, ServerError> {
    let id = accounts::account_id(&account)?;
    let friends = state.engine.list_friends(id).await?;
    Ok(Json(FriendListResponse {
        friends: friends.into_iter().map(accounts::view).collect(),
    }))
}

/// Sweeps the whole graph and completes one-sided edges.
pub async fn reconcile(
    Extension(_account): Extension<accounts::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ReconcileResponse>, ServerError> {
    let repaired = state.engine.reconcile_friendships().await?;
    Ok(Json(ReconcileResponse { repaired }))
}
