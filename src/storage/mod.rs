//! Queries over the stored chain
//!
//! Unspent-output lookups, coin selection and balances.

pub mod utxo_set;

pub use utxo_set::{UTXOInfo, UTXOSet};
