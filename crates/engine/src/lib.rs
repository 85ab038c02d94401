pub use accounts::Account;
pub use error::EngineError;
pub use history::{History, HistoryEntry, TransferDirection};
pub use ops::{Engine, EngineBuilder};
pub use transfers::{Transfer, TransferCmd};

mod accounts;
mod error;
mod friendships;
mod history;
mod ops;
mod transfers;

type ResultEngine<T> = Result<T, EngineError>;
