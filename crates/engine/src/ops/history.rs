use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{History, HistoryEntry, ResultEngine, Transfer, TransferDirection, transfers};

use super::Engine;

impl Engine {
    /// Returns the recent activity of an account, newest first.
    ///
    /// `limit` caps each direction separately before the merge, so the result
    /// holds up to `2 * limit` entries. Totals are summed over the returned
    /// window only.
    pub async fn history(&self, account_id: Uuid, limit: u64) -> ResultEngine<History> {
        self.require_account(&self.database, account_id).await?;

        let sent = transfers::Entity::find()
            .filter(transfers::Column::SenderId.eq(account_id.to_string()))
            .order_by_desc(transfers::Column::CreatedAt)
            .order_by_desc(transfers::Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?;
        let received = transfers::Entity::find()
            .filter(transfers::Column::RecipientId.eq(account_id.to_string()))
            .order_by_desc(transfers::Column::CreatedAt)
            .order_by_desc(transfers::Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?;

        let mut entries = Vec::with_capacity(sent.len() + received.len());
        for model in sent {
            entries.push(HistoryEntry {
                transfer: Transfer::try_from(model)?,
                direction: TransferDirection::Sent,
            });
        }
        for model in received {
            entries.push(HistoryEntry {
                transfer: Transfer::try_from(model)?,
                direction: TransferDirection::Received,
            });
        }
        entries.sort_by(|a, b| {
            (b.transfer.created_at, b.transfer.id).cmp(&(a.transfer.created_at, a.transfer.id))
        });

        let total_sent = entries
            .iter()
            .filter(|e| e.direction == TransferDirection::Sent)
            .map(|e| e.transfer.amount)
            .sum();
        let total_received = entries
            .iter()
            .filter(|e| e.direction == TransferDirection::Received)
            .map(|e| e.transfer.amount)
            .sum();

        Ok(History {
            entries,
            total_sent,
            total_received,
        })
    }
}
