//! Account entity and domain type.
//!
//! An account is a user's ledger identity: an opaque id, the email it was
//! registered with, an optional display name and the coin balance. Balances
//! are only ever written by the transfer operation.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// A registered user's ledger identity and balance record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, generated once at signup and never reused.
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    /// Coin balance; never negative, enforced at transfer time.
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Human label: the display name when set, the email otherwise.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.email,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub balance: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("account not exists".to_string()))?,
            email: model.email,
            display_name: model.display_name,
            balance: model.balance,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(display_name: Option<&str>) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            display_name: display_name.map(str::to_string),
            balance: 10,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn label_prefers_display_name() {
        assert_eq!(account(Some("Alice")).label(), "Alice");
    }

    #[test]
    fn label_falls_back_to_email() {
        assert_eq!(account(None).label(), "alice@example.com");
        assert_eq!(account(Some("")).label(), "alice@example.com");
    }
}
