use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod account {
    use super::*;

    /// Request body for registering a new account.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignUp {
        pub email: String,
        pub password: String,
        pub display_name: Option<String>,
    }

    /// An account as exposed over the API. The password never leaves the server.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub email: String,
        pub display_name: Option<String>,
        pub balance: i64,
        /// RFC3339 timestamp in UTC.
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
    }
}

pub mod friend {
    use super::*;

    /// Request body for linking the authenticated account with another one.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendNew {
        pub friend_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendListResponse {
        pub friends: Vec<super::account::AccountView>,
    }

    /// Response body of the graph repair sweep.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReconcileResponse {
        /// How many one-sided edges got their missing half inserted.
        pub repaired: u64,
    }
}

pub mod transfer {
    use super::*;

    /// Request body for moving coins from the authenticated account.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub recipient_id: Uuid,
        /// Must be > 0.
        pub amount: i64,
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferCreated {
        pub id: Uuid,
        /// RFC3339 timestamp in UTC, assigned by the server at commit time.
        pub created_at: DateTime<Utc>,
    }
}

pub mod history {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Direction {
        Sent,
        Received,
    }

    /// One ledger event as seen from the queried account.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub id: Uuid,
        pub direction: Direction,
        /// Name snapshot of the other party, taken when the event committed.
        pub counterparty: String,
        pub amount: i64,
        pub reason: String,
        /// RFC3339 timestamp in UTC.
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryQuery {
        /// Per-direction cap; the merged response holds up to twice this.
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub transfers: Vec<TransferView>,
        /// Summed over the returned window only.
        pub total_sent: i64,
        pub total_received: i64,
    }
}
