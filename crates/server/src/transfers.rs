//! Transfer endpoint. The sender is always the authenticated account.

use api_types::transfer::{TransferCreated, TransferNew};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, accounts, server::ServerState};
use engine::TransferCmd;

pub async fn create(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferCreated>), ServerError> {
    let sender_id = accounts::account_id(&account)?;
    let cmd = TransferCmd {
        sender_id,
        recipient_id: payload.recipient_id,
        amount: payload.amount,
        reason: payload.reason,
    };

    let transfer = state.engine.transfer(&cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(TransferCreated {
            id: transfer.id,
            created_at: transfer.created_at,
        }),
    ))
}
