//! Utility functions and helpers
//!
//! Hashing, Base58, ECDSA helpers, the canonical hash-input encoder and the
//! bincode layer used for everything written to disk.

pub mod crypto;
pub mod encoding;
pub mod serialization;

pub use crypto::{
    base58_decode, base58_encode, current_timestamp, ecdsa_p256_sha256_sign_digest,
    ecdsa_p256_sha256_sign_verify, new_key_pair, public_key_from_pkcs8, ripemd160_digest,
    sha256_digest, split_signature, SIGNATURE_SCALAR_LEN,
};
pub use encoding::{i64_be, u64_be, CanonicalEncoder};
pub use serialization::{deserialize, serialize};
