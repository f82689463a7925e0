//! The four-round Feistel network that turns a whole file into one block.

use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::fencrypt::error::{Error, Result};
use crate::fencrypt::mac::mac;
use crate::fencrypt::schedule::{Aes128Ctr, SUBKEY_LEN};

/// Width of the left half in bytes. The right half is everything after it.
pub const LEFT_LEN: usize = 16;

/// Smallest block the network accepts: a full left half plus at least 16
/// bytes of right half.
pub const MIN_BLOCK_LEN: usize = 32;

/// Four-round balanced Feistel construction over `L (16) || R (>= 16)`.
///
/// Odd rounds mask the right half with an AES-128-CTR keystream whose IV is
/// the left half; even rounds mask the left half with the leading 16 bytes
/// of an HMAC-SHA-256 tag over the right half. Each round only reads the
/// half it does not write, so applying the same round twice with the same
/// key is the identity. Decryption is therefore the same rounds replayed in
/// reverse key order, with no separate inverse algorithm.
pub struct Feistel {
    round_keys: [[u8; SUBKEY_LEN]; 4],
}

impl Feistel {
    pub fn new(round_keys: [[u8; SUBKEY_LEN]; 4]) -> Self {
        Self { round_keys }
    }

    /// Encrypt `block` in place: odd(k1), even(k2), odd(k3), even(k4).
    pub fn encrypt(&self, block: &mut [u8]) -> Result<()> {
        check_len(block)?;
        let [k1, k2, k3, k4] = &self.round_keys;
        round_odd(block, k1);
        round_even(block, k2);
        round_odd(block, k3);
        round_even(block, k4);
        Ok(())
    }

    /// Decrypt `block` in place: the reverse sequence with reversed keys.
    pub fn decrypt(&self, block: &mut [u8]) -> Result<()> {
        check_len(block)?;
        let [k1, k2, k3, k4] = &self.round_keys;
        round_even(block, k4);
        round_odd(block, k3);
        round_even(block, k2);
        round_odd(block, k1);
        Ok(())
    }
}

fn check_len(block: &[u8]) -> Result<()> {
    if block.len() < MIN_BLOCK_LEN {
        return Err(Error::BlockTooShort { len: block.len() });
    }
    Ok(())
}

/// Odd round: XOR the right half with a keystream keyed by `rk`, IV taken
/// from the left half (nonce `L[0..8]`, big-endian counter `L[8..16]`).
/// The stream extends to any right-half length; the left half is unchanged.
fn round_odd(block: &mut [u8], rk: &[u8; SUBKEY_LEN]) {
    let (left, right) = block.split_at_mut(LEFT_LEN);
    let mut iv = [0u8; LEFT_LEN];
    iv.copy_from_slice(left);
    let mut cipher = Aes128Ctr::new(&(*rk).into(), &iv.into());
    cipher.apply_keystream(right);
}

/// Even round: XOR the left half with the first 16 bytes of
/// `HMAC-SHA-256(rk, R)`. The right half is unchanged.
fn round_even(block: &mut [u8], rk: &[u8; SUBKEY_LEN]) {
    let (left, right) = block.split_at_mut(LEFT_LEN);
    let tag = mac(rk, right);
    for (l, t) in left.iter_mut().zip(&tag[..LEFT_LEN]) {
        *l ^= t;
    }
}
