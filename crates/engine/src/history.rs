//! Account history view types.

use serde::{Deserialize, Serialize};

use crate::Transfer;

/// Which side of a transfer the queried account was on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    Sent,
    Received,
}

/// A transfer annotated with the queried account's side of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub transfer: Transfer,
    pub direction: TransferDirection,
}

/// The merged recent activity of one account.
///
/// Totals are computed over the entries in this window, not over the whole
/// ledger, so they change as older events fall out of the window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub entries: Vec<HistoryEntry>,
    pub total_sent: i64,
    pub total_received: i64,
}
