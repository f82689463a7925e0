use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::fencrypt::schedule::SUBKEY_LEN;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA-256 of `msg` under a 16-byte subkey.
///
/// Authenticates ciphertexts under the MAC subkey and blinds index tokens
/// under the term subkey. Tags are compared as lowercase hex strings; both
/// sides of every comparison are already public to whoever holds the
/// sidecar.
pub fn mac(key: &[u8; SUBKEY_LEN], msg: &[u8]) -> [u8; 32] {
    let mut hmac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    hmac.update(msg);
    hmac.finalize().into_bytes().into()
}
