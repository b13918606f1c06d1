// At-rest encoding for blocks and the wallet file (bincode 2, standard config).
// Hash inputs never go through here; see `encoding.rs`.
use crate::error::{BlockchainError, Result};
use serde::{Deserialize, Serialize};

pub fn serialize<T: Serialize + bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    bincode::encode_to_vec(data, config)
        .map_err(|e| BlockchainError::Serialization(format!("Serialization failed: {e}")))
}

/// Decode a value, rejecting input with bytes left over after it
pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de> + bincode::Decode<()>,
{
    let config = bincode::config::standard();
    let (data, read) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| BlockchainError::Serialization(format!("Deserialization failed: {e}")))?;
    if read != bytes.len() {
        return Err(BlockchainError::Serialization(format!(
            "Deserialization failed: {} trailing bytes",
            bytes.len() - read
        )));
    }
    Ok(data)
}
