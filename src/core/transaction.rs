// Transactions follow the UTXO model: each input points at an output of an
// earlier transaction, each output locks a value to a public-key hash.
// Ids and signing digests are SHA-256 over the canonical encoding in
// utils::encoding, never over the at-rest bincode form.

use crate::core::BLOCK_REWARD;
use crate::error::{BlockchainError, Result};
use crate::storage::UTXOSet;
use crate::utils::{
    ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify, sha256_digest,
    CanonicalEncoder,
};
use crate::wallet::{address_to_pub_key_hash, validate_address, Wallets};
use data_encoding::HEXLOWER;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Output index carried by the single input of a coinbase transaction
pub const COINBASE_VOUT: i64 = -1;

/// Transactions looked up by id, as returned by
/// [`Blockchain::find_referenced_transactions`](crate::core::Blockchain::find_referenced_transactions)
pub type ReferencedTransactions = HashMap<Vec<u8>, Transaction>;

#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct TXInput {
    txid: Vec<u8>,      // id of the transaction holding the output being spent
    vout: i64,          // index of that output, -1 for coinbase
    signature: Vec<u8>, // r || s, empty until signed
    pub_key: Vec<u8>,   // spender's public key; free-form data for coinbase
}

impl TXInput {
    pub fn new(txid: &[u8], vout: i64, pub_key: &[u8]) -> TXInput {
        TXInput {
            txid: txid.to_vec(),
            vout,
            signature: vec![],
            pub_key: pub_key.to_vec(),
        }
    }

    pub fn get_txid(&self) -> &[u8] {
        self.txid.as_slice()
    }

    pub fn get_vout(&self) -> i64 {
        self.vout
    }

    pub fn get_signature(&self) -> &[u8] {
        self.signature.as_slice()
    }

    pub fn get_pub_key(&self) -> &[u8] {
        self.pub_key.as_slice()
    }

    /// Whether the public key stored in this input hashes to `pub_key_hash`
    pub fn uses_key(&self, pub_key_hash: &[u8]) -> bool {
        crate::wallet::hash_pub_key(self.pub_key.as_slice()).as_slice() == pub_key_hash
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TXOutput {
    value: u64,            // base units, see core::monetary
    pub_key_hash: Vec<u8>, // who may spend this output
}

impl TXOutput {
    /// Output of `value` locked to `address`
    pub fn new(value: u64, address: &str) -> Result<TXOutput> {
        if !validate_address(address) {
            return Err(BlockchainError::InvalidAddress(address.to_string()));
        }
        Ok(TXOutput {
            value,
            pub_key_hash: address_to_pub_key_hash(address)?,
        })
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }

    pub fn get_pub_key_hash(&self) -> &[u8] {
        self.pub_key_hash.as_slice()
    }

    pub fn is_locked_with_key(&self, pub_key_hash: &[u8]) -> bool {
        self.pub_key_hash.as_slice() == pub_key_hash
    }
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    id: Vec<u8>,
    vin: Vec<TXInput>,
    vout: Vec<TXOutput>,
}

impl Transaction {
    /// Assemble a transaction and fix its id.
    ///
    /// The id is computed here, once, over whatever public keys and
    /// signatures the inputs carry at this point. It is never recomputed:
    /// later signing fills in signatures without changing it.
    pub fn from_parts(vin: Vec<TXInput>, vout: Vec<TXOutput>) -> Transaction {
        let mut tx = Transaction {
            id: vec![],
            vin,
            vout,
        };
        tx.set_id();
        tx
    }

    /// Mining reward paying [`BLOCK_REWARD`] to `to`. `data` is stored in
    /// place of the input's public key.
    pub fn new_coinbase_tx(to: &str, data: &str) -> Result<Transaction> {
        let txout = TXOutput::new(BLOCK_REWARD, to)?;
        let tx_input = TXInput::new(&[], COINBASE_VOUT, data.as_bytes());
        Ok(Transaction::from_parts(vec![tx_input], vec![txout]))
    }

    /// Build and sign a transfer of `amount` from `from` to `to`, spending
    /// outputs found by scanning the chain behind `utxo_set`.
    pub fn new_utxo_transaction(
        from: &str,
        to: &str,
        amount: u64,
        wallets: &Wallets,
        utxo_set: &UTXOSet,
    ) -> Result<Transaction> {
        if amount == 0 {
            return Err(BlockchainError::Transaction(
                "Amount must be positive".to_string(),
            ));
        }
        if !validate_address(from) {
            return Err(BlockchainError::InvalidAddress(format!(
                "Invalid from address: {from}"
            )));
        }
        if !validate_address(to) {
            return Err(BlockchainError::InvalidAddress(format!(
                "Invalid to address: {to}"
            )));
        }

        let wallet = wallets
            .get_wallet(from)
            .ok_or_else(|| BlockchainError::UnknownAddress(from.to_string()))?;
        let public_key_hash = address_to_pub_key_hash(from)?;

        let (accumulated, valid_outputs) =
            utxo_set.find_spendable_outputs(public_key_hash.as_slice(), amount)?;
        if accumulated < amount {
            return Err(BlockchainError::InsufficientFunds {
                required: amount,
                available: accumulated,
            });
        }

        let mut inputs = Vec::with_capacity(valid_outputs.len());
        for (txid, out) in valid_outputs {
            let vout = i64::try_from(out).map_err(|_| {
                BlockchainError::Transaction(format!("Output index {out} out of range"))
            })?;
            inputs.push(TXInput::new(&txid, vout, wallet.get_public_key()));
        }

        let mut outputs = vec![TXOutput::new(amount, to)?];
        if accumulated > amount {
            outputs.push(TXOutput::new(accumulated - amount, from)?);
        }

        let mut tx = Transaction::from_parts(inputs, outputs);
        let referenced = utxo_set
            .get_blockchain()
            .find_referenced_transactions(&tx)?;
        tx.sign(wallet.get_pkcs8(), &referenced)?;
        debug!(
            "Built transaction {} spending {} inputs",
            HEXLOWER.encode(tx.get_id()),
            tx.vin.len()
        );
        Ok(tx)
    }

    /// Copy with every input's signature and public key cleared
    fn trimmed_copy(&self) -> Transaction {
        let inputs = self
            .vin
            .iter()
            .map(|input| TXInput::new(input.get_txid(), input.get_vout(), &[]))
            .collect();
        Transaction {
            id: self.id.clone(),
            vin: inputs,
            vout: self.vout.clone(),
        }
    }

    /// Digest signed for input `idx`. `self` must be a trimmed copy; the
    /// input's public key is swapped for the pub-key hash of the output it
    /// spends while hashing, then cleared again.
    fn signing_digest(
        &mut self,
        idx: usize,
        referenced: &ReferencedTransactions,
    ) -> Result<Vec<u8>> {
        let pub_key_hash = referenced_output(&self.vin[idx], referenced)?
            .get_pub_key_hash()
            .to_vec();
        self.vin[idx].pub_key = pub_key_hash;
        let digest = self.hash();
        self.vin[idx].pub_key = vec![];
        Ok(digest)
    }

    /// Sign every input with `pkcs8`. Coinbase transactions are left alone.
    pub fn sign(&mut self, pkcs8: &[u8], referenced: &ReferencedTransactions) -> Result<()> {
        if self.is_coinbase() {
            return Ok(());
        }

        let mut tx_copy = self.trimmed_copy();
        for idx in 0..self.vin.len() {
            let digest = tx_copy.signing_digest(idx, referenced)?;
            self.vin[idx].signature = ecdsa_p256_sha256_sign_digest(pkcs8, &digest)?;
        }
        Ok(())
    }

    /// Check every input's signature against the public key it carries.
    /// Coinbase transactions always pass.
    pub fn verify(&self, referenced: &ReferencedTransactions) -> bool {
        if self.is_coinbase() {
            return true;
        }

        let mut tx_copy = self.trimmed_copy();
        for (idx, vin) in self.vin.iter().enumerate() {
            let locked_to = match referenced_output(vin, referenced) {
                Ok(output) => output.get_pub_key_hash(),
                Err(e) => {
                    error!(
                        "Cannot verify input {idx} of {}: {e}",
                        HEXLOWER.encode(self.get_id())
                    );
                    return false;
                }
            };
            if !vin.uses_key(locked_to) {
                error!(
                    "Input {idx} of {} does not own the output it spends",
                    HEXLOWER.encode(self.get_id())
                );
                return false;
            }

            let digest = match tx_copy.signing_digest(idx, referenced) {
                Ok(digest) => digest,
                Err(e) => {
                    error!("Cannot build signing digest: {e}");
                    return false;
                }
            };
            if !ecdsa_p256_sha256_sign_verify(
                vin.pub_key.as_slice(),
                vin.signature.as_slice(),
                digest.as_slice(),
            ) {
                return false;
            }
        }
        true
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].txid.is_empty() && self.vin[0].vout == COINBASE_VOUT
    }

    /// Inputs then outputs, each field in declaration order
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut enc = CanonicalEncoder::new();
        enc.put_u64(self.vin.len() as u64);
        for input in &self.vin {
            enc.put_bytes(&input.txid)
                .put_i64(input.vout)
                .put_bytes(&input.signature)
                .put_bytes(&input.pub_key);
        }
        enc.put_u64(self.vout.len() as u64);
        for output in &self.vout {
            enc.put_u64(output.value).put_bytes(&output.pub_key_hash);
        }
        enc.finish()
    }

    fn hash(&self) -> Vec<u8> {
        sha256_digest(&self.canonical_bytes())
    }

    fn set_id(&mut self) {
        self.id = self.hash();
    }

    pub fn get_id(&self) -> &[u8] {
        self.id.as_slice()
    }

    pub fn get_vin(&self) -> &[TXInput] {
        self.vin.as_slice()
    }

    pub fn get_vout(&self) -> &[TXOutput] {
        self.vout.as_slice()
    }

    /// Sum of all output values
    pub fn get_output_value(&self) -> Result<u64> {
        let mut total = 0u64;
        for vout in &self.vout {
            total = total
                .checked_add(vout.get_value())
                .ok_or_else(|| BlockchainError::Transaction("Output value overflow".to_string()))?;
        }
        Ok(total)
    }
}

/// The output `input` claims to spend
fn referenced_output<'a>(
    input: &TXInput,
    referenced: &'a ReferencedTransactions,
) -> Result<&'a TXOutput> {
    let prev_tx = referenced.get(input.get_txid()).ok_or_else(|| {
        BlockchainError::Transaction(format!(
            "Previous transaction not found: {}",
            HEXLOWER.encode(input.get_txid())
        ))
    })?;
    usize::try_from(input.get_vout())
        .ok()
        .and_then(|idx| prev_tx.vout.get(idx))
        .ok_or_else(|| {
            BlockchainError::Transaction(format!(
                "Invalid output index {} for {}",
                input.get_vout(),
                HEXLOWER.encode(input.get_txid())
            ))
        })
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transaction {}:", HEXLOWER.encode(&self.id))?;
        for (i, input) in self.vin.iter().enumerate() {
            writeln!(f, "  Input {i}:")?;
            writeln!(f, "    TxId: {}", HEXLOWER.encode(&input.txid))?;
            writeln!(f, "    OutIndex: {}", input.vout)?;
            writeln!(f, "    Signature: {}", HEXLOWER.encode(&input.signature))?;
            writeln!(f, "    PublicKey: {}", HEXLOWER.encode(&input.pub_key))?;
        }
        for (i, output) in self.vout.iter().enumerate() {
            writeln!(f, "  Output {i}:")?;
            writeln!(
                f,
                "    Value: {}",
                crate::core::monetary::conversions::format_units(output.value)
            )?;
            writeln!(f, "    PublicKeyHash: {}", HEXLOWER.encode(&output.pub_key_hash))?;
        }
        Ok(())
    }
}
