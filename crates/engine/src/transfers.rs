//! Transfer entity, command and domain type.
//!
//! A transfer is an immutable ledger event: once written it is never updated
//! or deleted. The sender and recipient names are captured at commit time so
//! history entries keep the labels that were current when the coins moved.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A request to move coins, as received from the caller. Validation happens
/// when the command is turned into a [`Transfer`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCmd {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub amount: i64,
    pub reason: String,
}

/// A committed ledger event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    /// Sender label snapshot taken when the event was committed.
    pub sender_name: String,
    /// Recipient label snapshot taken when the event was committed.
    pub recipient_name: String,
    pub amount: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl TransferCmd {
    /// Rejects self transfers, non-positive amounts and blank reasons. Balance
    /// and existence checks belong to the commit path, not here.
    pub fn validate(&self) -> ResultEngine<()> {
        if self.sender_id == self.recipient_id {
            return Err(EngineError::InvalidTransfer(
                "sender and recipient are the same account".to_string(),
            ));
        }
        if self.amount <= 0 {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.reason.trim().is_empty() {
            return Err(EngineError::InvalidReason(
                "a transfer needs a reason".to_string(),
            ));
        }
        Ok(())
    }
}

impl Transfer {
    /// Builds a ledger event from a command, validating it first.
    pub fn new(
        cmd: &TransferCmd,
        sender_name: String,
        recipient_name: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        cmd.validate()?;
        let reason = cmd.reason.trim();

        Ok(Self {
            id: Uuid::new_v4(),
            sender_id: cmd.sender_id,
            recipient_id: cmd.recipient_id,
            sender_name,
            recipient_name,
            amount: cmd.amount,
            reason: reason.to_string(),
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub sender_name: String,
    pub recipient_name: String,
    pub amount: i64,
    pub reason: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transfer> for ActiveModel {
    fn from(transfer: &Transfer) -> Self {
        use sea_orm::ActiveValue;

        Self {
            id: ActiveValue::Set(transfer.id.to_string()),
            sender_id: ActiveValue::Set(transfer.sender_id.to_string()),
            recipient_id: ActiveValue::Set(transfer.recipient_id.to_string()),
            sender_name: ActiveValue::Set(transfer.sender_name.clone()),
            recipient_name: ActiveValue::Set(transfer.recipient_name.clone()),
            amount: ActiveValue::Set(transfer.amount),
            reason: ActiveValue::Set(transfer.reason.clone()),
            created_at: ActiveValue::Set(transfer.created_at),
        }
    }
}

impl TryFrom<Model> for Transfer {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let parse = |value: &str| {
            Uuid::parse_str(value)
                .map_err(|_| EngineError::KeyNotFound("transfer not exists".to_string()))
        };

        Ok(Self {
            id: parse(&model.id)?,
            sender_id: parse(&model.sender_id)?,
            recipient_id: parse(&model.recipient_id)?,
            sender_name: model.sender_name,
            recipient_name: model.recipient_name,
            amount: model.amount,
            reason: model.reason,
            created_at: model.created_at,
        })
    }
}
