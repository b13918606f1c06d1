//! Core ledger functionality
//!
//! Blocks, transactions, the persisted chain and the proof-of-work that
//! seals each block.

pub mod block;
pub mod blockchain;
pub mod monetary;
pub mod proof_of_work;
pub mod transaction;

pub use block::{Block, BLOCK_VERSION};
pub use blockchain::{Blockchain, BlockchainIterator, GENESIS_COINBASE_DATA};
pub use monetary::{BLOCK_REWARD, COIN_DECIMALS, UNITS_PER_COIN};
pub use proof_of_work::{MiningCancel, ProofOfWork};
pub use transaction::{ReferencedTransactions, TXInput, TXOutput, Transaction, COINBASE_VOUT};
