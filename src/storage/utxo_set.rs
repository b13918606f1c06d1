use crate::core::{Blockchain, TXOutput};
use crate::error::{BlockchainError, Result};
use crate::wallet::{address_to_pub_key_hash, validate_address};
use log::debug;

/// An unspent output together with where it lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UTXOInfo {
    txid: Vec<u8>,
    index: usize,
    output: TXOutput,
}

impl UTXOInfo {
    pub fn new(txid: &[u8], index: usize, output: TXOutput) -> UTXOInfo {
        UTXOInfo {
            txid: txid.to_vec(),
            index,
            output,
        }
    }

    pub fn get_txid(&self) -> &[u8] {
        self.txid.as_slice()
    }

    pub fn get_index(&self) -> usize {
        self.index
    }

    pub fn get_output(&self) -> &TXOutput {
        &self.output
    }
}

/// Balance and coin-selection queries. Nothing is cached: every call
/// rescans the chain.
pub struct UTXOSet {
    blockchain: Blockchain,
}

impl UTXOSet {
    pub fn new(blockchain: Blockchain) -> UTXOSet {
        UTXOSet { blockchain }
    }

    pub fn get_blockchain(&self) -> &Blockchain {
        &self.blockchain
    }

    /// Pick unspent outputs in scan order until they cover `amount`.
    /// Returns the accumulated value and the `(txid, index)` pairs picked;
    /// the value may fall short when the key does not own enough.
    pub fn find_spendable_outputs(
        &self,
        pub_key_hash: &[u8],
        amount: u64,
    ) -> Result<(u64, Vec<(Vec<u8>, usize)>)> {
        let mut unspent_outputs = vec![];
        let mut accumulated = 0u64;

        for utxo in self.blockchain.find_my_outputs(pub_key_hash) {
            if accumulated >= amount {
                break;
            }
            accumulated = accumulated
                .checked_add(utxo.get_output().get_value())
                .ok_or_else(|| BlockchainError::Transaction("Balance overflow".to_string()))?;
            unspent_outputs.push((utxo.txid, utxo.index));
        }

        debug!(
            "Selected {} outputs worth {accumulated} for a spend of {amount}",
            unspent_outputs.len()
        );
        Ok((accumulated, unspent_outputs))
    }

    pub fn find_utxo(&self, pub_key_hash: &[u8]) -> Vec<UTXOInfo> {
        self.blockchain.find_my_outputs(pub_key_hash)
    }

    /// Sum of every unspent output locked to `address`
    pub fn get_balance(&self, address: &str) -> Result<u64> {
        if !validate_address(address) {
            return Err(BlockchainError::InvalidAddress(address.to_string()));
        }
        let pub_key_hash = address_to_pub_key_hash(address)?;

        let mut balance = 0u64;
        for utxo in self.find_utxo(&pub_key_hash) {
            balance = balance
                .checked_add(utxo.get_output().get_value())
                .ok_or_else(|| BlockchainError::Transaction("Balance overflow".to_string()))?;
        }
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Transaction, BLOCK_REWARD};
    use crate::testnet::{create_test_blockchain, create_test_wallets};
    use crate::wallet::hash_pub_key;

    #[test]
    fn test_genesis_balance() {
        let (wallets, addresses, _wallet_dir) = create_test_wallets(2).unwrap();
        let (chain, _dir) = create_test_blockchain(&addresses[0]).unwrap();
        let utxo_set = UTXOSet::new(chain);

        assert_eq!(utxo_set.get_balance(&addresses[0]).unwrap(), BLOCK_REWARD);
        assert_eq!(utxo_set.get_balance(&addresses[1]).unwrap(), 0);
        assert_eq!(wallets.len(), 2);
    }

    #[test]
    fn test_balance_of_bad_address() {
        let (_wallets, addresses, _wallet_dir) = create_test_wallets(1).unwrap();
        let (chain, _dir) = create_test_blockchain(&addresses[0]).unwrap();
        let result = UTXOSet::new(chain).get_balance("not-an-address");
        assert!(matches!(result, Err(BlockchainError::InvalidAddress(_))));
    }

    #[test]
    fn test_greedy_selection_stops_once_covered() {
        let (wallets, addresses, _wallet_dir) = create_test_wallets(1).unwrap();
        let miner = &addresses[0];
        let (chain, _dir) = create_test_blockchain(miner).unwrap();
        for data in ["one", "two"] {
            let reward = Transaction::new_coinbase_tx(miner, data).unwrap();
            chain.add_block(&[reward]).unwrap();
        }
        let utxo_set = UTXOSet::new(chain);
        let pub_key_hash = hash_pub_key(wallets.get_wallet(miner).unwrap().get_public_key());

        let (accumulated, outputs) = utxo_set
            .find_spendable_outputs(&pub_key_hash, BLOCK_REWARD + 1)
            .unwrap();
        assert_eq!(accumulated, 2 * BLOCK_REWARD);
        assert_eq!(outputs.len(), 2);

        let (accumulated, outputs) = utxo_set
            .find_spendable_outputs(&pub_key_hash, 10 * BLOCK_REWARD)
            .unwrap();
        assert_eq!(accumulated, 3 * BLOCK_REWARD);
        assert_eq!(outputs.len(), 3);
    }

    #[test]
    fn test_transfer_with_change() {
        let (wallets, addresses, _wallet_dir) = create_test_wallets(3).unwrap();
        let (sender, recipient, miner) = (&addresses[0], &addresses[1], &addresses[2]);
        let (chain, _dir) = create_test_blockchain(sender).unwrap();
        let utxo_set = UTXOSet::new(chain.clone());

        let amount = 5 * crate::core::UNITS_PER_COIN;
        let tx = Transaction::new_utxo_transaction(sender, recipient, amount, &wallets, &utxo_set)
            .unwrap();
        assert_eq!(tx.get_vout().len(), 2);

        let reward = Transaction::new_coinbase_tx(miner, "fee-free").unwrap();
        chain.add_block(&[reward, tx]).unwrap();

        assert_eq!(utxo_set.get_balance(sender).unwrap(), BLOCK_REWARD - amount);
        assert_eq!(utxo_set.get_balance(recipient).unwrap(), amount);
        assert_eq!(utxo_set.get_balance(miner).unwrap(), BLOCK_REWARD);
    }

    #[test]
    fn test_overspend_is_rejected() {
        let (wallets, addresses, _wallet_dir) = create_test_wallets(2).unwrap();
        let (chain, _dir) = create_test_blockchain(&addresses[0]).unwrap();
        let utxo_set = UTXOSet::new(chain);

        let result = Transaction::new_utxo_transaction(
            &addresses[0],
            &addresses[1],
            BLOCK_REWARD + 1,
            &wallets,
            &utxo_set,
        );
        assert_eq!(
            result.unwrap_err(),
            BlockchainError::InsufficientFunds {
                required: BLOCK_REWARD + 1,
                available: BLOCK_REWARD,
            }
        );
    }
}
