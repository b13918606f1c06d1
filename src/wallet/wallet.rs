use crate::error::{BlockchainError, Result};
use crate::utils::{
    base58_decode, base58_encode, new_key_pair, public_key_from_pkcs8, ripemd160_digest,
    sha256_digest,
};
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

const VERSION: u8 = 0x00;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;
pub const PUB_KEY_HASH_LEN: usize = 20;
/// version + public key hash + checksum
pub const ADDRESS_PAYLOAD_LEN: usize = 1 + PUB_KEY_HASH_LEN + ADDRESS_CHECK_SUM_LEN;

/// A P-256 keypair. The private half is kept as a PKCS#8 document and wiped on drop.
#[derive(Clone, Serialize, Deserialize, bincode::Encode, bincode::Decode, ZeroizeOnDrop)]
pub struct Wallet {
    pkcs8: Vec<u8>,
    public_key: Vec<u8>,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.get_address())
            .finish_non_exhaustive()
    }
}

impl Wallet {
    pub fn new() -> Result<Wallet> {
        let pkcs8 = new_key_pair()?;
        let public_key = public_key_from_pkcs8(&pkcs8)?;
        Ok(Wallet { pkcs8, public_key })
    }

    pub fn get_address(&self) -> String {
        convert_address(hash_pub_key(self.public_key.as_slice()).as_slice())
    }

    pub fn get_public_key(&self) -> &[u8] {
        self.public_key.as_slice()
    }

    pub fn get_pkcs8(&self) -> &[u8] {
        self.pkcs8.as_slice()
    }
}

/// RIPEMD-160(SHA-256(pub_key))
pub fn hash_pub_key(pub_key: &[u8]) -> Vec<u8> {
    let pub_key_sha256 = sha256_digest(pub_key);
    ripemd160_digest(pub_key_sha256.as_slice())
}

fn checksum(payload: &[u8]) -> Vec<u8> {
    let first_sha = sha256_digest(payload);
    let second_sha = sha256_digest(first_sha.as_slice());
    second_sha[0..ADDRESS_CHECK_SUM_LEN].to_vec()
}

pub fn validate_address(address: &str) -> bool {
    let payload = match base58_decode(address) {
        Ok(payload) => payload,
        Err(_) => return false,
    };
    if payload.len() != ADDRESS_PAYLOAD_LEN {
        return false;
    }

    let (versioned, actual_checksum) = payload.split_at(payload.len() - ADDRESS_CHECK_SUM_LEN);
    checksum(versioned).as_slice() == actual_checksum
}

pub fn convert_address(pub_key_hash: &[u8]) -> String {
    let mut payload: Vec<u8> = Vec::with_capacity(ADDRESS_PAYLOAD_LEN);
    payload.push(VERSION);
    payload.extend(pub_key_hash);
    let checksum = checksum(payload.as_slice());
    payload.extend(checksum.as_slice());
    // version + pub_key_hash + checksum
    base58_encode(payload.as_slice())
}

/// Recover the public-key hash an address locks to
pub fn address_to_pub_key_hash(address: &str) -> Result<Vec<u8>> {
    let payload = base58_decode(address)?;
    if payload.len() != ADDRESS_PAYLOAD_LEN {
        return Err(BlockchainError::InvalidAddress(format!(
            "{address}: decoded length {} (expected {ADDRESS_PAYLOAD_LEN})",
            payload.len()
        )));
    }
    Ok(payload[1..payload.len() - ADDRESS_CHECK_SUM_LEN].to_vec())
}
