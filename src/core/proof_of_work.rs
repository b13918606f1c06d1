use crate::core::Block;
use crate::error::{BlockchainError, Result};
use crate::utils::{sha256_digest, CanonicalEncoder};
use data_encoding::HEXLOWER;
use log::debug;
use num_bigint::BigUint;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag that stops a running nonce search.
///
/// Clones share the same flag. Once triggered it stays set.
#[derive(Debug, Clone, Default)]
pub struct MiningCancel(Arc<AtomicBool>);

impl MiningCancel {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Nonce search over a block header. The target is `2^(256 - difficulty)`;
/// a hash wins when its big-endian value is strictly below it.
pub struct ProofOfWork<'a> {
    block: &'a Block,
    target: BigUint,
}

impl<'a> ProofOfWork<'a> {
    pub fn new_proof_of_work(block: &'a Block) -> ProofOfWork<'a> {
        ProofOfWork {
            block,
            target: target_for(block.get_difficulty()),
        }
    }

    pub fn get_target(&self) -> &BigUint {
        &self.target
    }

    /// Whether the stored hash matches the block's fields and is below target
    pub fn validate(block: &Block) -> bool {
        let pow = ProofOfWork::new_proof_of_work(block);
        let hash = sha256_digest(&pow.prepare_data(block.get_nonce()));
        hash.as_slice() == block.get_hash() && pow.is_below_target(&hash)
    }

    fn is_below_target(&self, hash: &[u8]) -> bool {
        BigUint::from_bytes_be(hash) < self.target
    }

    /// version | prev hash | merkle root | timestamp | difficulty | nonce
    fn prepare_data(&self, nonce: u64) -> Vec<u8> {
        let mut enc = CanonicalEncoder::new();
        enc.put_u64(self.block.get_version())
            .put_raw(self.block.get_pre_block_hash())
            .put_raw(self.block.get_merkle_root())
            .put_u64(self.block.get_timestamp())
            .put_u64(self.block.get_difficulty())
            .put_u64(nonce);
        enc.finish()
    }

    /// Search nonces from zero until a hash falls below target. Returns
    /// `(nonce, hash)`. The nonce wraps at `u64::MAX`.
    pub fn run(&self) -> (u64, Vec<u8>) {
        let mut nonce = 0u64;
        loop {
            if let Some(found) = self.try_nonce(nonce) {
                return found;
            }
            nonce = nonce.wrapping_add(1);
        }
    }

    /// Like [`run`](Self::run), but checks `cancel` before every attempt
    pub fn run_with_cancel(&self, cancel: &MiningCancel) -> Result<(u64, Vec<u8>)> {
        let mut nonce = 0u64;
        loop {
            if cancel.is_triggered() {
                return Err(BlockchainError::Mining(format!(
                    "cancelled after {nonce} attempts"
                )));
            }
            if let Some(found) = self.try_nonce(nonce) {
                return Ok(found);
            }
            nonce = nonce.wrapping_add(1);
        }
    }

    fn try_nonce(&self, nonce: u64) -> Option<(u64, Vec<u8>)> {
        let hash = sha256_digest(&self.prepare_data(nonce));
        if !self.is_below_target(&hash) {
            return None;
        }
        debug!("Found nonce {nonce}: {}", HEXLOWER.encode(&hash));
        Some((nonce, hash))
    }
}

fn target_for(difficulty: u64) -> BigUint {
    BigUint::from(1u8) << (256 - difficulty.min(256)) as usize
}
