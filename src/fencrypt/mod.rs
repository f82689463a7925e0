mod envelope;
mod error;
mod feistel;
mod index;
mod kdf;
mod mac;
mod schedule;

pub use envelope::{
    EncryptOutcome, PendingDecrypt, SIDECAR_PREFIX, SearchOutcome, Sidecar, encrypt_file,
    search_dir,
};
pub use error::{Error, Result};
pub use feistel::{Feistel, MIN_BLOCK_LEN};
pub use kdf::{PBKDF2_ROUNDS, SALT_LEN, derive_master, random_salt};
pub use schedule::KeyBundle;
