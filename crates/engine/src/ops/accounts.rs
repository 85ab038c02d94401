use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{Account, EngineError, ResultEngine, accounts};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Registers a new account with the configured starting balance.
    ///
    /// The email is trimmed and lowercased before the uniqueness check, so
    /// `Alice@Example.com` and `alice@example.com` are the same account.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> ResultEngine<Account> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(EngineError::InvalidAmount(
                "email must not be empty".to_string(),
            ));
        }
        let display_name = normalize_optional_text(display_name);
        let now = Utc::now();

        with_tx!(self, |db_tx| {
            let exists = accounts::Entity::find()
                .filter(accounts::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(email.clone()));
            }

            let account = Account {
                id: Uuid::new_v4(),
                email: email.clone(),
                display_name: display_name.clone(),
                balance: self.starting_balance,
                created_at: now,
            };

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account.id.to_string()),
                email: ActiveValue::Set(account.email.clone()),
                password: ActiveValue::Set(password.to_string()),
                display_name: ActiveValue::Set(account.display_name.clone()),
                balance: ActiveValue::Set(account.balance),
                created_at: ActiveValue::Set(account.created_at),
            };
            active.insert(&db_tx).await?;

            tracing::info!(account_id = %account.id, "account created");
            Ok(account)
        })
    }

    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        let model = self.require_account(&self.database, account_id).await?;
        Account::try_from(model)
    }

    /// Looks an account up by its (normalized) email.
    pub async fn account_by_email(&self, email: &str) -> ResultEngine<Account> {
        let email = email.trim().to_lowercase();
        let model = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    /// Lists every account except the given one, ordered by email.
    pub async fn list_accounts_except(&self, account_id: Uuid) -> ResultEngine<Vec<Account>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::Id.ne(account_id.to_string()))
            .order_by_asc(accounts::Column::Email)
            .all(&self.database)
            .await?;
        models.into_iter().map(Account::try_from).collect()
    }

    /// Fetches an account row or fails with `KeyNotFound`.
    pub(super) async fn require_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }
}
