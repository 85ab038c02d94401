//! The module contains the errors the engine can throw.
//!
//! Every operation returns a typed result; nothing is swallowed. All of these
//! are recoverable by retrying or by surfacing the error to the caller.

use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid reason: {0}")]
    InvalidReason(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Already friends: {0}")]
    AlreadyFriends(String),
    #[error("Commit failed: {0}")]
    CommitFailed(String),
    #[error("Partial friendship: {0}")]
    PartialFriendship(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidTransfer(a), Self::InvalidTransfer(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidReason(a), Self::InvalidReason(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::AlreadyFriends(a), Self::AlreadyFriends(b)) => a == b,
            (Self::CommitFailed(a), Self::CommitFailed(b)) => a == b,
            (Self::PartialFriendship(a), Self::PartialFriendship(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
