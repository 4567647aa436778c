// src/codec.rs

use crate::types::{Amount, Fingerprint, Transaction};

pub const CODEC_VERSION: u8 = 1;
pub const DOM_TX: &[u8] = b"TX";
pub const DOM_BLK: &[u8] = b"BLK";
pub const DOM_AUTH: &[u8] = b"AUTH";
const TAG_NONE: u8 = 0;
const TAG_SOME: u8 = 1;

// --- helpers: write primitives deterministically ---

// append a u64 to a Vec<u8> in little-endian.
pub fn put_u64(dst: &mut Vec<u8>, x: u64) {
    dst.extend_from_slice(&x.to_le_bytes());
}

pub fn put_u32(v: &mut Vec<u8>, x: u32) {
    v.extend_from_slice(&x.to_le_bytes());
}

// amounts are encoded by their IEEE-754 bit pattern; -0.0 is folded into 0.0
// so that equal amounts always produce equal bytes.
pub fn put_amount(dst: &mut Vec<u8>, x: Amount) {
    let x = if x == 0.0 { 0.0 } else { x };
    put_u64(dst, x.to_bits());
}

// append a string as length (u32 LE) + UTF-8 bytes.
fn put_str(dst: &mut Vec<u8>, s: &str) {
    put_u32(dst, s.len() as u32);
    dst.extend_from_slice(s.as_bytes());
}

fn put_opt_str(dst: &mut Vec<u8>, s: Option<&str>) {
    match s {
        Some(s) => {
            dst.push(TAG_SOME);
            put_str(dst, s);
        }
        None => dst.push(TAG_NONE),
    }
}

// --- public encoders used for fingerprinting ---

/// Preimage of a transaction fingerprint: (origin, destination, amount, fee, created_at).
pub fn tx_preimage(
    origin: Option<&str>,
    destination: &str,
    amount: Amount,
    fee: Amount,
    created_at: u64,
) -> Vec<u8> {
    let mut v = vec![CODEC_VERSION];
    v.extend_from_slice(DOM_TX);
    put_opt_str(&mut v, origin);
    put_str(&mut v, destination);
    put_amount(&mut v, amount);
    put_amount(&mut v, fee);
    put_u64(&mut v, created_at);
    v
}

/// Full transaction encoding as embedded in a block preimage.
pub fn tx_bytes(tx: &Transaction) -> Vec<u8> {
    let mut v = tx_preimage(tx.origin(), tx.destination(), tx.amount(), tx.fee(), tx.created_at());
    put_str(&mut v, tx.fingerprint().as_str());
    put_opt_str(&mut v, tx.authorization().map(Fingerprint::as_str));
    v
}

/// Preimage of a block fingerprint: (height, previous, created_at, transactions, producer).
pub fn block_preimage(
    height: u64,
    previous: &Fingerprint,
    created_at: u64,
    transactions: &[Transaction],
    producer: &str,
) -> Vec<u8> {
    let mut v = vec![CODEC_VERSION];
    v.extend_from_slice(DOM_BLK);
    put_u64(&mut v, height);
    put_str(&mut v, previous.as_str());
    put_u64(&mut v, created_at);
    put_u32(&mut v, transactions.len() as u32);
    for tx in transactions {
        let bytes = tx_bytes(tx);
        put_u32(&mut v, bytes.len() as u32);
        v.extend_from_slice(&bytes);
    }
    put_str(&mut v, producer);
    v
}

/// Preimage of an authorization tag: the transaction fingerprint followed by the secret.
pub fn auth_preimage(fingerprint: &Fingerprint, secret: &str) -> Vec<u8> {
    let mut v = vec![CODEC_VERSION];
    v.extend_from_slice(DOM_AUTH);
    put_str(&mut v, fingerprint.as_str());
    put_str(&mut v, secret);
    v
}
