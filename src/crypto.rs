//src/crypto.rs

use sha2::{Digest, Sha256};
use crate::codec::auth_preimage;
use crate::types::{Fingerprint, Hash};

pub fn hash_bytes_sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Identity digest over canonical bytes. Used to name and link entities,
/// never to authenticate them.
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    Fingerprint::from_digest(&hash_bytes_sha256(bytes))
}

/// Authorization marker for a transaction: fingerprint(tx.fingerprint + secret).
pub fn authorization_tag(tx_fingerprint: &Fingerprint, secret: &str) -> Fingerprint {
    fingerprint(&auth_preimage(tx_fingerprint, secret))
}
