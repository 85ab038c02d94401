//! History endpoint.

use api_types::history::{Direction, HistoryQuery, HistoryResponse, TransferView};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, accounts, server::ServerState};
use engine::{HistoryEntry, TransferDirection};

const DEFAULT_LIMIT: u64 = 50;

pub async fn get(
    Extension(account): Extension<accounts::Model>,
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let id = accounts::account_id(&account)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let history = state.engine.history(id, limit).await?;
    Ok(Json(HistoryResponse {
        transfers: history.entries.into_iter().map(view).collect(),
        total_sent: history.total_sent,
        total_received: history.total_received,
    }))
}

fn view(entry: HistoryEntry) -> TransferView {
    let (direction, counterparty) = match entry.direction {
        TransferDirection::Sent => (Direction::Sent, entry.transfer.recipient_name),
        TransferDirection::Received => (Direction::Received, entry.transfer.sender_name),
    };

    TransferView {
        id: entry.transfer.id,
        direction,
        counterparty,
        amount: entry.transfer.amount,
        reason: entry.transfer.reason,
        created_at: entry.transfer.created_at,
    }
}
