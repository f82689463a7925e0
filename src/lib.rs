//! This crate encrypts individual files in place with a password, authenticates the ciphertext,
//! and keeps a searchable index over the plaintext's words in a JSON sidecar, so that later --
//! given only the password -- you can find which encrypted files contain a term without
//! decrypting anything.
//!
//! The moving parts, leaves first:
//! - **Key derivation** ([`derive_master`]): PBKDF2-HMAC-SHA-256 turns (password, per-file salt)
//!   into a 32-byte master key.
//! - **Key schedule** ([`KeyBundle`]): an AES-128-CTR keystream expands the master into seven
//!   16-byte subkeys (password validator, four round keys, MAC key, search term key).
//! - **Cipher** ([`Feistel`]): a four-round balanced Feistel network over the whole file,
//!   `L (16 bytes) || R (the rest)`, built from AES-128-CTR and HMAC-SHA-256. Every round is an
//!   involution, so decryption replays the rounds with the key order reversed.
//! - **Envelope** ([`encrypt_file`], [`PendingDecrypt`], [`search_dir`]): drives the above
//!   against a file and its `.fenc-meta.*` sidecar, which holds the salt, validator, ciphertext
//!   tag, and the blinded search terms.
//!
//! ## Example
//! The cipher round-trips any block of at least 32 bytes:
//! ```
//! use fencrypt::{Feistel, KeyBundle};
//!
//! let keys = KeyBundle::expand(&[7u8; 32]);
//! let feistel = Feistel::new(keys.round_keys);
//!
//! let mut block = *b"the quick brown fox jumps over the lazy dog.";
//! let original = block;
//!
//! feistel.encrypt(&mut block)?;
//! assert_ne!(block, original);
//!
//! feistel.decrypt(&mut block)?;
//! assert_eq!(block, original);
//! # Ok::<(), fencrypt::Error>(())
//! ```

mod fencrypt;

pub use fencrypt::{
    EncryptOutcome, Error, Feistel, KeyBundle, MIN_BLOCK_LEN, PBKDF2_ROUNDS, PendingDecrypt,
    Result, SALT_LEN, SIDECAR_PREFIX, SearchOutcome, Sidecar, derive_master, encrypt_file,
    random_salt, search_dir,
};
