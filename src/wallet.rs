// src/wallet.rs

use rand::Rng;
use serde::Serialize;

use crate::crypto::hash_bytes_sha256;
use crate::types::Address;

/// Address plus the secret used to authorize its transfers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Wallet {
    pub address: Address,
    pub secret: String,
}

impl Wallet {
    /// Fresh random secret; the address is "0x" + the last 20 bytes of SHA-256(secret).
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut secret = [0u8; 32];
        rng.fill(&mut secret[..]);
        Self::from_secret_bytes(&secret)
    }

    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        let digest = hash_bytes_sha256(secret);
        Self {
            address: format!("0x{}", hex::encode(&digest[12..])),
            secret: hex::encode(secret),
        }
    }
}
