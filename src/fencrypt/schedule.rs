//! Expansion of the master key into the seven operational subkeys.

use aes::Aes128;
use ctr::Ctr64BE;
use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::fencrypt::kdf::MASTER_LEN;

/// AES-128-CTR with an 8-byte nonce and a 64-bit big-endian counter in the
/// low half of the IV. The key schedule and the odd Feistel rounds both
/// draw keystream from this.
pub(crate) type Aes128Ctr = Ctr64BE<Aes128>;

/// Subkey length in bytes.
pub const SUBKEY_LEN: usize = 16;

const BUNDLE_LEN: usize = 7 * SUBKEY_LEN;

/// The seven 16-byte subkeys expanded from one master key, in derivation
/// order: password validator, the four Feistel round keys, the ciphertext
/// MAC key, and the search term key.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct KeyBundle {
    pub validator: [u8; SUBKEY_LEN],
    pub round_keys: [[u8; SUBKEY_LEN]; 4],
    pub mac_key: [u8; SUBKEY_LEN],
    pub term_key: [u8; SUBKEY_LEN],
}

impl KeyBundle {
    /// Expand a master key into the subkey bundle.
    ///
    /// The master is split as `key (16) || nonce (8) || initial counter (8)`
    /// and the bundle is the first 112 bytes of that AES-128-CTR keystream,
    /// sliced into subkeys in order. Identical masters yield identical
    /// bundles; the split is load-bearing for sidecar cross-compatibility.
    pub fn expand(master: &[u8; MASTER_LEN]) -> Self {
        let mut key = [0u8; SUBKEY_LEN];
        key.copy_from_slice(&master[..16]);
        let mut iv = [0u8; SUBKEY_LEN];
        iv.copy_from_slice(&master[16..]);

        let mut stream = [0u8; BUNDLE_LEN];
        let mut cipher = Aes128Ctr::new(&key.into(), &iv.into());
        cipher.apply_keystream(&mut stream);

        Self {
            validator: subkey(&stream, 0),
            round_keys: [
                subkey(&stream, 1),
                subkey(&stream, 2),
                subkey(&stream, 3),
                subkey(&stream, 4),
            ],
            mac_key: subkey(&stream, 5),
            term_key: subkey(&stream, 6),
        }
    }
}

fn subkey(stream: &[u8; BUNDLE_LEN], index: usize) -> [u8; SUBKEY_LEN] {
    let mut out = [0u8; SUBKEY_LEN];
    out.copy_from_slice(&stream[index * SUBKEY_LEN..(index + 1) * SUBKEY_LEN]);
    out
}
