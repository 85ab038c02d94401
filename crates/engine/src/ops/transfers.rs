use chrono::{DateTime, Duration, Utc};

use sea_orm::{
    Condition, ConnectionTrait, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*,
};

use crate::{Account, EngineError, ResultEngine, Transfer, TransferCmd, transfers};

use super::{Engine, with_tx};

impl Engine {
    /// Moves coins from one account to another and records the ledger event.
    ///
    /// The whole commit is a single DB transaction: the event insert, the
    /// guarded sender debit and the recipient credit either all land or none
    /// do. On a database failure the commit is retried a bounded number of
    /// times with preconditions re-checked from scratch; after the last
    /// attempt the caller gets `CommitFailed` and no coins have moved.
    pub async fn transfer(&self, cmd: &TransferCmd) -> ResultEngine<Transfer> {
        // Shape errors cannot be fixed by retrying, reject before touching
        // the database.
        cmd.validate()?;

        let mut last_error: Option<EngineError> = None;
        for attempt in 1..=self.commit_retries {
            match self.try_transfer(cmd).await {
                Ok(transfer) => {
                    tracing::info!(
                        transfer_id = %transfer.id,
                        amount = transfer.amount,
                        "transfer committed"
                    );
                    return Ok(transfer);
                }
                Err(EngineError::Database(err)) => {
                    tracing::warn!(attempt, error = %err, "transfer commit failed, retrying");
                    last_error = Some(EngineError::Database(err));
                }
                Err(err) => return Err(err),
            }
        }

        let detail = last_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        Err(EngineError::CommitFailed(detail))
    }

    async fn try_transfer(&self, cmd: &TransferCmd) -> ResultEngine<Transfer> {
        with_tx!(self, |db_tx| {
            let sender = Account::try_from(self.require_account(&db_tx, cmd.sender_id).await?)?;
            let recipient =
                Account::try_from(self.require_account(&db_tx, cmd.recipient_id).await?)?;

            if self.require_friendship {
                self.require_friends(&db_tx, cmd.sender_id, cmd.recipient_id)
                    .await?;
            }

            if sender.balance < cmd.amount {
                return Err(EngineError::InsufficientFunds(format!(
                    "balance {} is less than {}",
                    sender.balance, cmd.amount
                )));
            }

            let created_at = next_event_timestamp(&db_tx, cmd).await?;
            let transfer = Transfer::new(
                cmd,
                sender.label().to_string(),
                recipient.label().to_string(),
                created_at,
            )?;

            transfers::ActiveModel::from(&transfer).insert(&db_tx).await?;
            debit_sender(&db_tx, cmd).await?;
            credit_recipient(&db_tx, cmd).await?;

            Ok(transfer)
        })
    }
}

/// Picks a timestamp strictly after the latest event involving either party,
/// so each party's history has a total order even when the wall clock stalls.
async fn next_event_timestamp<C: ConnectionTrait>(
    db: &C,
    cmd: &TransferCmd,
) -> ResultEngine<DateTime<Utc>> {
    let ids = [cmd.sender_id.to_string(), cmd.recipient_id.to_string()];
    let previous = transfers::Entity::find()
        .filter(
            Condition::any()
                .add(transfers::Column::SenderId.is_in(ids.clone()))
                .add(transfers::Column::RecipientId.is_in(ids)),
        )
        .order_by_desc(transfers::Column::CreatedAt)
        .one(db)
        .await?;

    let now = Utc::now();
    Ok(match previous {
        Some(event) if event.created_at >= now => event.created_at + Duration::microseconds(1),
        _ => now,
    })
}

/// Debits the sender with the balance guard re-checked inside the statement,
/// so a concurrent writer cannot drive the balance negative.
async fn debit_sender<C: ConnectionTrait>(db: &C, cmd: &TransferCmd) -> ResultEngine<()> {
    let result = db
        .execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "UPDATE accounts SET balance = balance - ? WHERE id = ? AND balance >= ?",
            vec![
                cmd.amount.into(),
                cmd.sender_id.to_string().into(),
                cmd.amount.into(),
            ],
        ))
        .await?;
    if result.rows_affected() != 1 {
        return Err(EngineError::InsufficientFunds(format!(
            "balance changed under transfer of {}",
            cmd.amount
        )));
    }
    Ok(())
}

async fn credit_recipient<C: ConnectionTrait>(db: &C, cmd: &TransferCmd) -> ResultEngine<()> {
    let result = db
        .execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "UPDATE accounts SET balance = balance + ? WHERE id = ?",
            vec![cmd.amount.into(), cmd.recipient_id.to_string().into()],
        ))
        .await?;
    if result.rows_affected() != 1 {
        return Err(EngineError::KeyNotFound("account not exists".to_string()));
    }
    Ok(())
}
