// The chain is a sled tree of blocks keyed by their hash, plus one extra key
// pointing at the tip. Every scan (balances, spendable outputs, referenced
// transactions) walks backwards from a tip snapshot; nothing is indexed.

use crate::config::Config;
use crate::core::{
    Block, MiningCancel, ProofOfWork, ReferencedTransactions, Transaction, BLOCK_REWARD,
};
use crate::error::{BlockchainError, Result};
use crate::storage::UTXOInfo;
use data_encoding::HEXLOWER;
use log::{debug, error, info, warn};
use sled::{Db, Tree};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

const TIP_BLOCK_HASH_KEY: &str = "tip_block_hash";
const BLOCKS_TREE: &str = "blocks";

/// Coinbase data of the first block
pub const GENESIS_COINBASE_DATA: &str =
    "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks";

/// An output reference: (transaction id, output index)
type OutPoint = (Vec<u8>, i64);

#[derive(Clone)]
pub struct Blockchain {
    tip_hash: Arc<RwLock<Vec<u8>>>, // hash of the newest block
    db: Db,
    blocks: Tree,
    difficulty: u64, // used for blocks mined through this handle
}

impl Blockchain {
    /// Start a new chain whose genesis coinbase pays `genesis_address`
    pub fn create_blockchain(genesis_address: &str, config: &Config) -> Result<Blockchain> {
        let (db, blocks) = Self::open_store(config)?;
        if Self::stored_tip(&blocks)?.is_some() {
            return Err(BlockchainError::ChainAlreadyExists);
        }

        info!("Creating genesis block for address: {genesis_address}");
        let coinbase_tx = Transaction::new_coinbase_tx(genesis_address, GENESIS_COINBASE_DATA)?;
        let block = Block::generate_genesis_block(
            &coinbase_tx,
            config.get_difficulty(),
            &MiningCancel::new(),
        )?;
        Self::update_blocks_tree(&blocks, &block)?;

        Ok(Blockchain {
            tip_hash: Arc::new(RwLock::new(block.get_hash().to_vec())),
            db,
            blocks,
            difficulty: config.get_difficulty(),
        })
    }

    /// Open the chain stored at the configured path
    pub fn open_blockchain(config: &Config) -> Result<Blockchain> {
        let (db, blocks) = Self::open_store(config)?;
        let tip_hash = Self::stored_tip(&blocks)?.ok_or(BlockchainError::ChainNotFound)?;
        debug!("Opened chain with tip {}", HEXLOWER.encode(&tip_hash));

        Ok(Blockchain {
            tip_hash: Arc::new(RwLock::new(tip_hash)),
            db,
            blocks,
            difficulty: config.get_difficulty(),
        })
    }

    fn open_store(config: &Config) -> Result<(Db, Tree)> {
        let db = sled::open(config.get_db_path())
            .map_err(|e| BlockchainError::Database(format!("Failed to open database: {e}")))?;
        let blocks = db
            .open_tree(BLOCKS_TREE)
            .map_err(|e| BlockchainError::Database(format!("Failed to open blocks tree: {e}")))?;
        Ok((db, blocks))
    }

    fn stored_tip(blocks: &Tree) -> Result<Option<Vec<u8>>> {
        let tip = blocks
            .get(TIP_BLOCK_HASH_KEY)
            .map_err(|e| BlockchainError::Database(format!("Failed to get tip hash: {e}")))?;
        Ok(tip.map(|hash| hash.to_vec()))
    }

    /// Write a block and move the tip to it in one sled transaction
    fn update_blocks_tree(blocks: &Tree, block: &Block) -> Result<()> {
        let block_hash = block.get_hash();
        let block_data = block.serialize()?;

        blocks
            .transaction(|tx_db| {
                tx_db.insert(block_hash, block_data.as_slice())?;
                tx_db.insert(TIP_BLOCK_HASH_KEY, block_hash)?;
                Ok(())
            })
            .map_err(|e: sled::transaction::TransactionError| {
                BlockchainError::Database(format!("Failed to update blocks tree: {e}"))
            })?;

        blocks
            .flush()
            .map_err(|e| BlockchainError::Database(format!("Failed to flush blocks tree: {e}")))?;
        Ok(())
    }

    pub fn get_tip_hash(&self) -> Vec<u8> {
        self.tip_hash
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_difficulty(&self) -> u64 {
        self.difficulty
    }

    /// Mine `transactions` into a new block on the tip.
    ///
    /// Candidates that fail verification, spend an output that is already
    /// spent or reuse a transaction id are dropped and logged, as is any
    /// coinbase after the first. Fails if nothing is left.
    pub fn add_block(&self, transactions: &[Transaction]) -> Result<Block> {
        self.add_block_with_cancel(transactions, &MiningCancel::new())
    }

    /// Like [`add_block`](Self::add_block), but mining stops once `cancel`
    /// is triggered and the chain is left unchanged.
    pub fn add_block_with_cancel(
        &self,
        transactions: &[Transaction],
        cancel: &MiningCancel,
    ) -> Result<Block> {
        // Held until the new tip is published, so appends never interleave
        let mut tip = self
            .tip_hash
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let accepted = self.select_transactions(tip.as_slice(), transactions);
        info!(
            "Mining block with {} of {} candidate transactions (difficulty: {})",
            accepted.len(),
            transactions.len(),
            self.difficulty
        );

        let block = Block::new_block(tip.clone(), &accepted, self.difficulty, cancel)?;
        Self::update_blocks_tree(&self.blocks, &block)?;
        *tip = block.get_hash().to_vec();

        info!("Successfully mined block: {}", HEXLOWER.encode(block.get_hash()));
        Ok(block)
    }

    /// Candidates that may go into a block on top of `tip`, in order
    fn select_transactions(&self, tip: &[u8], candidates: &[Transaction]) -> Vec<Transaction> {
        let mut selection = self.block_selection_from(tip);
        let mut accepted = Vec::with_capacity(candidates.len());

        for tx in candidates {
            match self.check_candidate(tip, tx, &mut selection) {
                Ok(()) => accepted.push(tx.clone()),
                Err(e) => warn!("Dropping transaction {}: {e}", HEXLOWER.encode(tx.get_id())),
            }
        }
        accepted
    }

    /// Whether `tx` would be accepted into a block mined on the current tip.
    ///
    /// Runs the same checks as [`add_block`](Self::add_block) and returns the
    /// reason a transaction would be dropped.
    pub fn check_transaction(&self, tx: &Transaction) -> Result<()> {
        let tip = self.get_tip_hash();
        let mut selection = self.block_selection_from(&tip);
        self.check_candidate(&tip, tx, &mut selection)
    }

    /// Check one candidate against the chain and the block so far. Records
    /// its id and spends in `selection` only when it is accepted.
    fn check_candidate(
        &self,
        tip: &[u8],
        tx: &Transaction,
        selection: &mut BlockSelection,
    ) -> Result<()> {
        let id = tx.get_id();
        if selection.ids_in_chain.contains(id) || selection.ids_in_block.contains(id) {
            return Err(BlockchainError::Transaction("Transaction id already used".to_string()));
        }

        if tx.is_coinbase() {
            if selection.has_coinbase {
                return Err(BlockchainError::Transaction(
                    "Block already has a coinbase".to_string(),
                ));
            }
            if tx.get_output_value()? > BLOCK_REWARD {
                return Err(BlockchainError::Transaction(
                    "Coinbase pays more than the block reward".to_string(),
                ));
            }
            selection.has_coinbase = true;
            selection.ids_in_block.insert(id.to_vec());
            return Ok(());
        }

        let referenced = self.find_referenced_from(tip, tx)?;
        if !tx.verify(&referenced) {
            return Err(BlockchainError::Transaction("Signature verification failed".to_string()));
        }
        check_value_balance(tx, &referenced)?;

        let mut spends: HashSet<OutPoint> = HashSet::new();
        let double_spend = tx.get_vin().iter().any(|vin| {
            let outpoint = (vin.get_txid().to_vec(), vin.get_vout());
            selection.spent_in_chain.contains(&outpoint)
                || selection.spent_in_block.contains(&outpoint)
                || !spends.insert(outpoint)
        });
        if double_spend {
            return Err(BlockchainError::Transaction("Output already spent".to_string()));
        }

        selection.spent_in_block.extend(spends);
        selection.ids_in_block.insert(id.to_vec());
        Ok(())
    }

    /// Blocks from the tip back to genesis
    pub fn iterator(&self) -> BlockchainIterator {
        self.iterator_from(self.get_tip_hash())
    }

    fn iterator_from(&self, tip: Vec<u8>) -> BlockchainIterator {
        BlockchainIterator::new(tip, self.blocks.clone())
    }

    pub fn get_block(&self, block_hash: &[u8]) -> Result<Option<Block>> {
        let block_bytes = self
            .blocks
            .get(block_hash)
            .map_err(|e| BlockchainError::Database(format!("Failed to get block: {e}")))?;
        block_bytes
            .map(|bytes| Block::deserialize(bytes.as_ref()))
            .transpose()
    }

    /// Unspent outputs locked to `pub_key_hash`, newest first.
    ///
    /// An output counts as spent when some input referencing it carries a
    /// public key that hashes to `pub_key_hash`.
    pub fn find_my_outputs(&self, pub_key_hash: &[u8]) -> Vec<UTXOInfo> {
        let mut spent: HashMap<Vec<u8>, Vec<i64>> = HashMap::new();
        let mut candidates = vec![];

        for block in self.iterator() {
            for tx in block.get_transactions() {
                for (idx, out) in tx.get_vout().iter().enumerate() {
                    if out.is_locked_with_key(pub_key_hash) {
                        candidates.push(UTXOInfo::new(tx.get_id(), idx, out.clone()));
                    }
                }
                if tx.is_coinbase() {
                    continue;
                }
                for vin in tx.get_vin() {
                    if vin.uses_key(pub_key_hash) {
                        spent
                            .entry(vin.get_txid().to_vec())
                            .or_default()
                            .push(vin.get_vout());
                    }
                }
            }
        }

        candidates.retain(|utxo| {
            let index = i64::try_from(utxo.get_index()).unwrap_or(i64::MAX);
            !spent
                .get(utxo.get_txid())
                .is_some_and(|indexes| indexes.contains(&index))
        });
        debug!(
            "Found {} unspent outputs for {}",
            candidates.len(),
            HEXLOWER.encode(pub_key_hash)
        );
        candidates
    }

    pub fn find_transaction(&self, txid: &[u8]) -> Option<Transaction> {
        self.iterator().find_map(|block| {
            block
                .get_transactions()
                .iter()
                .find(|tx| tx.get_id() == txid)
                .cloned()
        })
    }

    /// Every earlier transaction `tx` spends from, keyed by id
    pub fn find_referenced_transactions(
        &self,
        tx: &Transaction,
    ) -> Result<ReferencedTransactions> {
        self.find_referenced_from(&self.get_tip_hash(), tx)
    }

    fn find_referenced_from(
        &self,
        tip: &[u8],
        tx: &Transaction,
    ) -> Result<ReferencedTransactions> {
        let mut referenced = ReferencedTransactions::new();
        if tx.is_coinbase() {
            return Ok(referenced);
        }

        let mut wanted: HashSet<&[u8]> = tx.get_vin().iter().map(|vin| vin.get_txid()).collect();
        for block in self.iterator_from(tip.to_vec()) {
            for candidate in block.get_transactions() {
                if wanted.remove(candidate.get_id()) {
                    referenced.insert(candidate.get_id().to_vec(), candidate.clone());
                }
            }
            if wanted.is_empty() {
                return Ok(referenced);
            }
        }

        let missing: Vec<String> = wanted.iter().map(|txid| HEXLOWER.encode(txid)).collect();
        Err(BlockchainError::Transaction(format!(
            "Referenced transaction not found: {}",
            missing.join(", ")
        )))
    }

    /// Transaction ids and spent outputs on the chain ending at `tip`
    fn block_selection_from(&self, tip: &[u8]) -> BlockSelection {
        let mut selection = BlockSelection::default();
        for block in self.iterator_from(tip.to_vec()) {
            for tx in block.get_transactions() {
                selection.ids_in_chain.insert(tx.get_id().to_vec());
                if tx.is_coinbase() {
                    continue;
                }
                for vin in tx.get_vin() {
                    selection
                        .spent_in_chain
                        .insert((vin.get_txid().to_vec(), vin.get_vout()));
                }
            }
        }
        selection
    }

    /// Check that every block's proof of work holds at no less than the
    /// configured difficulty and that the blocks link back from the tip to a
    /// genesis block.
    pub fn validate_chain(&self) -> bool {
        let mut expected = self.get_tip_hash();
        for block in self.iterator() {
            if block.get_hash() != expected.as_slice() {
                error!(
                    "Block {} is stored under the wrong hash",
                    HEXLOWER.encode(block.get_hash())
                );
                return false;
            }
            if block.get_difficulty() < self.difficulty {
                error!(
                    "Block {} was mined below difficulty {}",
                    HEXLOWER.encode(block.get_hash()),
                    self.difficulty
                );
                return false;
            }
            if !ProofOfWork::validate(&block) {
                error!(
                    "Block {} fails proof of work",
                    HEXLOWER.encode(block.get_hash())
                );
                return false;
            }
            expected = block.get_pre_block_hash().to_vec();
        }

        if !expected.is_empty() {
            error!("Chain is broken at {}", HEXLOWER.encode(&expected));
            return false;
        }
        true
    }

    /// Drop every stored block and the tip. The chain must be created again
    /// before it can be opened.
    pub fn clear(self) -> Result<()> {
        let _tip = self
            .tip_hash
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        self.blocks
            .clear()
            .map_err(|e| BlockchainError::Database(format!("Failed to clear blocks tree: {e}")))?;
        self.db
            .flush()
            .map_err(|e| BlockchainError::Database(format!("Failed to flush database: {e}")))?;
        info!("Cleared all chain data");
        Ok(())
    }
}

/// What a block being assembled may no longer use
#[derive(Default)]
struct BlockSelection {
    ids_in_chain: HashSet<Vec<u8>>,
    spent_in_chain: HashSet<OutPoint>,
    ids_in_block: HashSet<Vec<u8>>,
    spent_in_block: HashSet<OutPoint>,
    has_coinbase: bool,
}

/// Outputs may not create value: they must sum to at most what the inputs
/// spend.
fn check_value_balance(tx: &Transaction, referenced: &ReferencedTransactions) -> Result<()> {
    let mut input_total = 0u64;
    for vin in tx.get_vin() {
        let value = referenced
            .get(vin.get_txid())
            .and_then(|prev| {
                usize::try_from(vin.get_vout())
                    .ok()
                    .and_then(|idx| prev.get_vout().get(idx))
            })
            .map(|out| out.get_value())
            .ok_or_else(|| BlockchainError::Transaction("Unknown spent output".to_string()))?;
        input_total = input_total
            .checked_add(value)
            .ok_or_else(|| BlockchainError::Transaction("Input value overflow".to_string()))?;
    }

    let output_total = tx.get_output_value()?;
    if output_total > input_total {
        return Err(BlockchainError::Transaction(format!(
            "Outputs ({output_total}) exceed inputs ({input_total})"
        )));
    }
    Ok(())
}

/// Walks from a block back through its predecessors. Ends after genesis,
/// at a hash that is not stored, or at a block that fails to decode.
pub struct BlockchainIterator {
    blocks: Tree,
    current_hash: Vec<u8>,
}

impl BlockchainIterator {
    fn new(tip_hash: Vec<u8>, blocks: Tree) -> BlockchainIterator {
        BlockchainIterator {
            current_hash: tip_hash,
            blocks,
        }
    }
}

impl Iterator for BlockchainIterator {
    type Item = Block;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_hash.is_empty() {
            return None;
        }
        let hash = std::mem::take(&mut self.current_hash);

        let data = match self.blocks.get(&hash) {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(e) => {
                error!("Failed to read block {}: {e}", HEXLOWER.encode(&hash));
                return None;
            }
        };
        match Block::deserialize(data.as_ref()) {
            Ok(block) => {
                self.current_hash = block.get_pre_block_hash().to_vec();
                Some(block)
            }
            Err(e) => {
                error!("Failed to decode block {}: {e}", HEXLOWER.encode(&hash));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TXInput, TXOutput};
    use crate::storage::UTXOSet;
    use crate::testnet::{
        create_test_blockchain, create_test_config, create_test_wallets, TEST_DIFFICULTY,
    };
    use crate::wallet::{hash_pub_key, Wallet};

    fn funded_spend(
        owner: &Wallet,
        chain: &Blockchain,
        funding: &Transaction,
        to: &str,
    ) -> Transaction {
        let input = TXInput::new(funding.get_id(), 0, owner.get_public_key());
        let output = TXOutput::new(BLOCK_REWARD, to).unwrap();
        let mut tx = Transaction::from_parts(vec![input], vec![output]);
        let referenced = chain.find_referenced_transactions(&tx).unwrap();
        tx.sign(owner.get_pkcs8(), &referenced).unwrap();
        tx
    }

    #[test]
    fn test_genesis_chain() {
        let owner = Wallet::new().unwrap();
        let (chain, _dir) = create_test_blockchain(&owner.get_address()).unwrap();

        let blocks: Vec<Block> = chain.iterator().collect();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_genesis());
        assert_eq!(blocks[0].get_hash(), chain.get_tip_hash().as_slice());
        assert!(chain.validate_chain());

        let outputs = chain.find_my_outputs(&hash_pub_key(owner.get_public_key()));
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].get_output().get_value(), BLOCK_REWARD);
    }

    #[test]
    fn test_create_twice_fails() {
        let owner = Wallet::new().unwrap().get_address();
        let (chain, dir) = create_test_blockchain(&owner).unwrap();
        drop(chain);

        let config = create_test_config(dir.path());
        let result = Blockchain::create_blockchain(&owner, &config);
        assert!(matches!(result, Err(BlockchainError::ChainAlreadyExists)));
    }

    #[test]
    fn test_open_missing_chain() {
        let dir = tempfile::tempdir().unwrap();
        let result = Blockchain::open_blockchain(&create_test_config(dir.path()));
        assert!(matches!(result, Err(BlockchainError::ChainNotFound)));
    }

    #[test]
    fn test_spent_output_disappears() {
        let owner = Wallet::new().unwrap();
        let recipient = Wallet::new().unwrap();
        let (chain, _dir) = create_test_blockchain(&owner.get_address()).unwrap();
        let genesis_tx = chain.iterator().next().unwrap().get_transactions()[0].clone();

        let tx = funded_spend(&owner, &chain, &genesis_tx, &recipient.get_address());
        let block = chain.add_block(&[tx.clone()]).unwrap();
        assert_eq!(block.get_transactions(), &[tx]);

        let owner_hash = hash_pub_key(owner.get_public_key());
        let recipient_hash = hash_pub_key(recipient.get_public_key());
        assert!(chain.find_my_outputs(&owner_hash).is_empty());
        assert_eq!(chain.find_my_outputs(&recipient_hash).len(), 1);
        assert!(chain.validate_chain());
    }

    #[test]
    fn test_invalid_and_double_spends_are_dropped() {
        let owner = Wallet::new().unwrap();
        let miner = Wallet::new().unwrap().get_address();
        let (chain, _dir) = create_test_blockchain(&owner.get_address()).unwrap();
        let genesis_tx = chain.iterator().next().unwrap().get_transactions()[0].clone();

        let first = funded_spend(&owner, &chain, &genesis_tx, &miner);
        let second = funded_spend(&owner, &chain, &genesis_tx, &owner.get_address());
        let reward = Transaction::new_coinbase_tx(&miner, "reward").unwrap();

        let block = chain
            .add_block(&[reward.clone(), first.clone(), second.clone()])
            .unwrap();
        assert_eq!(block.get_transactions(), &[reward, first.clone()]);

        // The same output again in a later block
        let reward = Transaction::new_coinbase_tx(&miner, "again").unwrap();
        let block = chain.add_block(&[reward.clone(), second]).unwrap();
        assert_eq!(block.get_transactions(), &[reward]);
    }

    #[test]
    fn test_inflating_transaction_is_dropped() {
        let owner = Wallet::new().unwrap();
        let (chain, _dir) = create_test_blockchain(&owner.get_address()).unwrap();
        let genesis_tx = chain.iterator().next().unwrap().get_transactions()[0].clone();

        let input = TXInput::new(genesis_tx.get_id(), 0, owner.get_public_key());
        let output = TXOutput::new(BLOCK_REWARD * 2, &owner.get_address()).unwrap();
        let mut tx = Transaction::from_parts(vec![input], vec![output]);
        tx.sign(
            owner.get_pkcs8(),
            &chain.find_referenced_transactions(&tx).unwrap(),
        )
        .unwrap();

        let tip_before = chain.get_tip_hash();
        let result = chain.add_block(&[tx]);
        assert!(matches!(result, Err(BlockchainError::InvalidBlock(_))));
        assert_eq!(chain.get_tip_hash(), tip_before);
    }

    #[test]
    fn test_only_one_coinbase_per_block() {
        let (_wallets, addresses, _wallet_dir) = create_test_wallets(1).unwrap();
        let miner = &addresses[0];
        let (chain, _dir) = create_test_blockchain(miner).unwrap();

        let rewards: Vec<Transaction> = ["a", "b", "c", "d"]
            .iter()
            .map(|data| Transaction::new_coinbase_tx(miner, data).unwrap())
            .collect();
        let block = chain.add_block(&rewards).unwrap();
        assert_eq!(block.get_transactions(), &rewards[..1]);

        let utxo_set = UTXOSet::new(chain);
        assert_eq!(utxo_set.get_balance(miner).unwrap(), 2 * BLOCK_REWARD);
    }

    #[test]
    fn test_reused_coinbase_id_is_dropped() {
        let (wallets, addresses, _wallet_dir) = create_test_wallets(2).unwrap();
        let (miner, other) = (&addresses[0], &addresses[1]);
        let (chain, _dir) = create_test_blockchain(miner).unwrap();

        let reward = Transaction::new_coinbase_tx(miner, "same data").unwrap();
        chain.add_block(&[reward.clone()]).unwrap();
        let tip_before = chain.get_tip_hash();

        let result = chain.add_block(&[reward.clone()]);
        assert!(matches!(result, Err(BlockchainError::InvalidBlock(_))));
        assert_eq!(chain.get_tip_hash(), tip_before);

        // Balance stays fully spendable
        let utxo_set = UTXOSet::new(chain.clone());
        let balance = utxo_set.get_balance(miner).unwrap();
        assert_eq!(balance, 2 * BLOCK_REWARD);
        let spend_all =
            Transaction::new_utxo_transaction(miner, other, balance, &wallets, &utxo_set).unwrap();
        let block = chain.add_block(&[spend_all.clone()]).unwrap();
        assert_eq!(block.get_transactions(), &[spend_all]);
        assert_eq!(utxo_set.get_balance(other).unwrap(), balance);
    }

    #[test]
    fn test_check_transaction_matches_add_block() {
        let owner = Wallet::new().unwrap();
        let recipient = Wallet::new().unwrap().get_address();
        let (chain, _dir) = create_test_blockchain(&owner.get_address()).unwrap();
        let genesis_tx = chain.iterator().next().unwrap().get_transactions()[0].clone();
        let tx = funded_spend(&owner, &chain, &genesis_tx, &recipient);

        let tip_before = chain.get_tip_hash();
        assert!(chain.check_transaction(&tx).is_ok());
        assert_eq!(chain.get_tip_hash(), tip_before);

        chain.add_block(&[tx.clone()]).unwrap();
        assert!(matches!(
            chain.check_transaction(&tx),
            Err(BlockchainError::Transaction(_))
        ));
        assert!(chain.check_transaction(&genesis_tx).is_err());
    }

    #[test]
    fn test_validate_chain_enforces_configured_difficulty() {
        let owner = Wallet::new().unwrap().get_address();
        let (chain, dir) = create_test_blockchain(&owner).unwrap();
        drop(chain);

        let config = create_test_config(dir.path());
        let stricter = config.clone().with_difficulty(TEST_DIFFICULTY + 8).unwrap();
        assert!(!Blockchain::open_blockchain(&stricter).unwrap().validate_chain());
        assert!(Blockchain::open_blockchain(&config).unwrap().validate_chain());
    }

    #[test]
    fn test_cancelled_mining_leaves_tip() {
        let owner = Wallet::new().unwrap().get_address();
        let (chain, _dir) = create_test_blockchain(&owner).unwrap();
        let tip_before = chain.get_tip_hash();

        let cancel = MiningCancel::new();
        cancel.trigger();
        let reward = Transaction::new_coinbase_tx(&owner, "cancelled").unwrap();
        let result = chain.add_block_with_cancel(&[reward], &cancel);

        assert!(matches!(result, Err(BlockchainError::Mining(_))));
        assert_eq!(chain.get_tip_hash(), tip_before);
        assert_eq!(chain.iterator().count(), 1);
    }

    #[test]
    fn test_find_transaction_and_block() {
        let owner = Wallet::new().unwrap().get_address();
        let (chain, _dir) = create_test_blockchain(&owner).unwrap();
        let reward = Transaction::new_coinbase_tx(&owner, "lookup").unwrap();
        let block = chain.add_block(&[reward.clone()]).unwrap();

        assert_eq!(chain.find_transaction(reward.get_id()), Some(reward));
        assert_eq!(chain.find_transaction(&[0u8; 32]), None);
        assert_eq!(chain.get_block(block.get_hash()).unwrap(), Some(block));
        assert_eq!(chain.get_block(&[1u8; 32]).unwrap(), None);
    }

    #[test]
    fn test_missing_reference_is_an_error() {
        let owner = Wallet::new().unwrap();
        let (chain, _dir) = create_test_blockchain(&owner.get_address()).unwrap();
        let input = TXInput::new(&[9u8; 32], 0, owner.get_public_key());
        let tx = Transaction::from_parts(vec![input], vec![]);

        let result = chain.find_referenced_transactions(&tx);
        assert!(matches!(result, Err(BlockchainError::Transaction(_))));
    }

    #[test]
    fn test_clear_removes_chain() {
        let owner = Wallet::new().unwrap().get_address();
        let (chain, dir) = create_test_blockchain(&owner).unwrap();
        chain.clear().unwrap();

        let config = create_test_config(dir.path());
        let result = Blockchain::open_blockchain(&config);
        assert!(matches!(result, Err(BlockchainError::ChainNotFound)));
        assert!(Blockchain::create_blockchain(&owner, &config).is_ok());
    }
}
