use crate::core::{MiningCancel, ProofOfWork, Transaction};
use crate::error::{BlockchainError, Result};
use crate::utils::{current_timestamp, deserialize, serialize};
use data_encoding::HEXLOWER;
use log::info;
use serde::{Deserialize, Serialize};

/// Header version written into every block
pub const BLOCK_VERSION: u64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Block {
    version: u64,
    pre_block_hash: Vec<u8>, // empty for genesis
    merkle_root: Vec<u8>,    // reserved, always empty
    timestamp: u64,
    difficulty: u64,
    nonce: u64,
    transactions: Vec<Transaction>,
    hash: Vec<u8>,
}

impl Block {
    /// Build a block on top of `pre_block_hash` and mine it
    pub fn new_block(
        pre_block_hash: Vec<u8>,
        transactions: &[Transaction],
        difficulty: u64,
        cancel: &MiningCancel,
    ) -> Result<Block> {
        if transactions.is_empty() {
            return Err(BlockchainError::InvalidBlock(
                "Block must contain at least one transaction".to_string(),
            ));
        }

        let mut block = Block {
            version: BLOCK_VERSION,
            pre_block_hash,
            merkle_root: vec![],
            timestamp: current_timestamp()?,
            difficulty,
            nonce: 0,
            transactions: transactions.to_vec(),
            hash: vec![],
        };

        info!(
            "Starting proof-of-work for block with {} transactions (difficulty: {difficulty})",
            transactions.len()
        );
        let (nonce, hash) = ProofOfWork::new_proof_of_work(&block).run_with_cancel(cancel)?;
        block.nonce = nonce;
        block.hash = hash;
        info!(
            "Proof-of-work completed for block: {} (nonce: {nonce})",
            HEXLOWER.encode(&block.hash)
        );

        Ok(block)
    }

    /// First block of a chain: a single coinbase and no predecessor
    pub fn generate_genesis_block(
        transaction: &Transaction,
        difficulty: u64,
        cancel: &MiningCancel,
    ) -> Result<Block> {
        Block::new_block(vec![], std::slice::from_ref(transaction), difficulty, cancel)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize::<Block>(bytes)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn is_genesis(&self) -> bool {
        self.pre_block_hash.is_empty()
    }

    pub fn get_version(&self) -> u64 {
        self.version
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_pre_block_hash(&self) -> &[u8] {
        self.pre_block_hash.as_slice()
    }

    pub fn get_merkle_root(&self) -> &[u8] {
        self.merkle_root.as_slice()
    }

    pub fn get_hash(&self) -> &[u8] {
        self.hash.as_slice()
    }

    pub fn get_timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn get_difficulty(&self) -> u64 {
        self.difficulty
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    #[cfg(test)]
    pub(crate) fn set_timestamp_for_test(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }
}
