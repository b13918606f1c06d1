//! # PoW Ledger
//!
//! A single-node ledger: a hash-linked chain of proof-of-work blocks holding
//! UTXO transactions signed with ECDSA P-256, plus the wallets that own them.
//!
//! ## How the code is organized
//! - `core/`: blocks, transactions, the persisted chain and proof-of-work
//! - `storage/`: unspent-output queries, coin selection and balances
//! - `wallet/`: key pairs, Base58Check addresses and the wallet file
//! - `utils/`: hashing, signatures, canonical encoding and bincode helpers
//! - `config/`: storage paths and difficulty from the environment
//! - `cli/`: argument parsing for the `pow-ledger` binary
//!
//! ## Things to remember
//! - Amounts are integer base units; see [`core::monetary`]
//! - Transaction ids and signing digests hash a canonical byte layout, never
//!   the bincode form that goes to disk
//! - There is no UTXO index: balances and coin selection rescan the chain
//! - Only one block is appended at a time; the tip lock is held while mining

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::Config;
pub use crate::core::{
    Block, Blockchain, BlockchainIterator, MiningCancel, ProofOfWork, TXInput, TXOutput,
    Transaction, BLOCK_REWARD, UNITS_PER_COIN,
};
pub use error::{BlockchainError, Result};
pub use storage::{UTXOInfo, UTXOSet};
pub use utils::{
    base58_decode, base58_encode, current_timestamp, ecdsa_p256_sha256_sign_digest,
    ecdsa_p256_sha256_sign_verify, new_key_pair, ripemd160_digest, sha256_digest,
};
pub use wallet::{
    address_to_pub_key_hash, convert_address, hash_pub_key, validate_address, Wallet, Wallets,
    ADDRESS_CHECK_SUM_LEN,
};
