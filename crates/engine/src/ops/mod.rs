use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod accounts;
mod friendships;
mod history;
mod transfers;

/// Coins granted to every new account.
pub const DEFAULT_STARTING_BALANCE: i64 = 10;
/// How many times a transfer commit is retried before giving up.
pub const DEFAULT_COMMIT_RETRIES: u32 = 3;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    starting_balance: i64,
    require_friendship: bool,
    commit_retries: u32,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    starting_balance: i64,
    require_friendship: bool,
    commit_retries: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            starting_balance: DEFAULT_STARTING_BALANCE,
            require_friendship: false,
            commit_retries: DEFAULT_COMMIT_RETRIES,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the balance granted to new accounts.
    pub fn starting_balance(mut self, balance: i64) -> EngineBuilder {
        self.starting_balance = balance;
        self
    }

    /// When set, transfers are only allowed between mutual friends.
    pub fn require_friendship(mut self, required: bool) -> EngineBuilder {
        self.require_friendship = required;
        self
    }

    /// Override the number of commit attempts for a transfer.
    pub fn commit_retries(mut self, retries: u32) -> EngineBuilder {
        self.commit_retries = retries.max(1);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            starting_balance: self.starting_balance,
            require_friendship: self.require_friendship,
            commit_retries: self.commit_retries,
        })
    }
}
