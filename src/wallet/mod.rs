//! Keys, addresses and the wallet file
//!
//! `wallet` derives Base58Check addresses from P-256 public keys; `wallets`
//! keeps the address -> keypair map on disk.

#[allow(clippy::module_inception)]
pub mod wallet;
pub mod wallets;

pub use wallet::{
    address_to_pub_key_hash, convert_address, hash_pub_key, validate_address, Wallet,
    ADDRESS_CHECK_SUM_LEN, ADDRESS_PAYLOAD_LEN, PUB_KEY_HASH_LEN,
};
pub use wallets::{Wallets, WALLET_FILE};
