//! Test utilities for chain and wallet tests

use crate::config::Config;
use crate::core::Blockchain;
use crate::error::{BlockchainError, Result};
use crate::wallet::Wallets;
use std::path::Path;
use tempfile::TempDir;

/// Difficulty used by every test chain
pub const TEST_DIFFICULTY: u64 = 8;

/// Create a temporary directory for testing
pub fn create_temp_dir() -> Result<TempDir> {
    tempfile::tempdir().map_err(|e| BlockchainError::Io(e.to_string()))
}

/// Config keeping the chain and wallet file under `dir`
pub fn create_test_config(dir: &Path) -> Config {
    Config::default()
        .with_db_path(dir.join("chain"))
        .with_wallet_file(dir.join("wallet.dat"))
        .with_difficulty(TEST_DIFFICULTY)
        .expect("test difficulty is in range")
}

/// A fresh chain whose genesis reward goes to `genesis_address`
pub fn create_test_blockchain(genesis_address: &str) -> Result<(Blockchain, TempDir)> {
    let temp_dir = create_temp_dir()?;
    let config = create_test_config(temp_dir.path());
    let blockchain = Blockchain::create_blockchain(genesis_address, &config)?;
    Ok((blockchain, temp_dir))
}

/// `count` new wallets in a temporary wallet file
pub fn create_test_wallets(count: usize) -> Result<(Wallets, Vec<String>, TempDir)> {
    let temp_dir = create_temp_dir()?;
    let mut wallets = Wallets::load(create_test_config(temp_dir.path()).get_wallet_file())?;
    let mut addresses = Vec::with_capacity(count);

    for _ in 0..count {
        addresses.push(wallets.create_wallet()?);
    }

    Ok((wallets, addresses, temp_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::validate_address;

    #[test]
    fn test_create_test_blockchain() {
        let (_wallets, addresses, _wallet_dir) = create_test_wallets(1).unwrap();
        let (blockchain, _temp_dir) = create_test_blockchain(&addresses[0]).unwrap();

        assert_eq!(blockchain.iterator().count(), 1);
        assert_eq!(blockchain.get_difficulty(), TEST_DIFFICULTY);
    }

    #[test]
    fn test_create_test_wallets() {
        let (wallets, addresses, temp_dir) = create_test_wallets(5).unwrap();
        assert_eq!(addresses.len(), 5);
        assert_eq!(wallets.len(), 5);

        // All addresses should be unique and valid
        for i in 0..addresses.len() {
            assert!(validate_address(&addresses[i]));
            for j in i + 1..addresses.len() {
                assert_ne!(addresses[i], addresses[j]);
            }
        }

        let reloaded = Wallets::load(temp_dir.path().join("wallet.dat")).unwrap();
        assert_eq!(reloaded.get_addresses(), wallets.get_addresses());
    }
}
