//! Error handling for the ledger
//!
//! Every fallible operation in the crate returns [`Result`]. Signature and
//! proof-of-work checks are not errors: they return `bool` and the caller
//! decides what to do with a failed check.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    /// Block store errors
    Database(String),
    /// Key generation, signing or clock errors
    Crypto(String),
    /// Transaction assembly errors
    Transaction(String),
    /// Configuration errors
    Config(String),
    /// Encoding or decoding of persisted data failed
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// Address is not valid Base58Check
    InvalidAddress(String),
    /// No keypair for this address in the wallet file
    UnknownAddress(String),
    /// Spendable outputs do not cover the requested amount
    InsufficientFunds { required: u64, available: u64 },
    /// A chain already exists at this location
    ChainAlreadyExists,
    /// No chain has been created at this location
    ChainNotFound,
    /// Block construction errors
    InvalidBlock(String),
    /// Mining errors
    Mining(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::Database(msg) => write!(f, "Database error: {msg}"),
            BlockchainError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            BlockchainError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
            BlockchainError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            BlockchainError::UnknownAddress(addr) => {
                write!(f, "No wallet found for address: {addr}")
            }
            BlockchainError::InsufficientFunds {
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient funds: required {required}, available {available}"
                )
            }
            BlockchainError::ChainAlreadyExists => write!(f, "Blockchain already exists"),
            BlockchainError::ChainNotFound => {
                write!(f, "No existing blockchain found. Create one first.")
            }
            BlockchainError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            BlockchainError::Mining(msg) => write!(f, "Mining error: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<sled::Error> for BlockchainError {
    fn from(err: sled::Error) -> Self {
        BlockchainError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}
