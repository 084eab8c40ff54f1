//! Shared test helpers: a minimal compatible encoder for the wire layout
//! the reader decodes (varints, fixed32/64, length-delimited fields), and
//! an encrypt wrapper producing chained AES-CFB ciphertext.
#![allow(dead_code)]

use veilkv::AesCfb;

pub const KEY: [u8; 16] = *b"veilkv-test-key!";
pub const IV: [u8; 16] = *b"veilkv-test-iv!!";

/// Encrypt a whole plaintext stream the way the writer side would.
pub fn encrypt(plain: &[u8]) -> Vec<u8> {
    let mut engine = AesCfb::new(&KEY, &IV);
    let mut out = vec![0u8; plain.len()];
    engine.encrypt(plain, &mut out);
    out
}

/// Reference decryption of the full source, for byte-for-byte comparisons.
pub fn decrypt_all(ct: &[u8]) -> Vec<u8> {
    use veilkv::DecryptEngine;
    let mut engine = AesCfb::new(&KEY, &IV);
    let mut out = vec![0u8; ct.len()];
    engine.decrypt(ct, &mut out);
    out
}

pub fn put_uvarint(buf: &mut Vec<u8>, mut v: u64) {
    loop {
        let b = (v & 0x7f) as u8;
        v >>= 7;
        if v != 0 {
            buf.push(b | 0x80);
        } else {
            buf.push(b);
            break;
        }
    }
}

/// int32 the way wide encoders emit it: negatives are sign-extended to 64
/// bits and take 10 bytes.
pub fn put_varint32(buf: &mut Vec<u8>, v: i32) {
    put_uvarint(buf, v as i64 as u64);
}

pub fn put_varint64(buf: &mut Vec<u8>, v: i64) {
    put_uvarint(buf, v as u64);
}

pub fn put_fixed32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn put_fixed64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn put_float(buf: &mut Vec<u8>, v: f32) {
    put_fixed32(buf, v.to_bits());
}

pub fn put_double(buf: &mut Vec<u8>, v: f64) {
    put_fixed64(buf, v.to_bits());
}

/// `[varint length][raw bytes]`.
pub fn put_len_delimited(buf: &mut Vec<u8>, bytes: &[u8]) {
    put_uvarint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// A key/value record: two length-delimited fields back to back.
pub fn put_record(buf: &mut Vec<u8>, key: &[u8], value: &[u8]) {
    put_len_delimited(buf, key);
    put_len_delimited(buf, value);
}

/// Deterministic filler bytes.
pub fn pattern(len: usize, salt: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31) ^ salt).collect()
}
