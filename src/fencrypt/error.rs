use rand::rand_core;
use thiserror::Error;

/// Engine Result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Engine Error type. Variants are ordered by severity: configuration and
/// state problems abort a whole batch before anything is written, an
/// integrity failure skips a single file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The password read from the terminal or stdin was empty.
    #[error("password must not be empty")]
    EmptyPassword,

    /// One or more paths were missing or not regular files.
    #[error("Invalid filepaths for the following filenames: {}", .0.join(", "))]
    InvalidPaths(Vec<String>),

    /// One or more files were below the 32-byte block minimum.
    #[error("File size should be greater than 31 bytes for the following filenames: {}", .0.join(", "))]
    FileTooSmall(Vec<String>),

    /// A block handed to the Feistel network was below the 32-byte minimum.
    #[error("block too short for the cipher: {len} bytes (minimum 32)")]
    BlockTooShort { len: usize },

    /// Encrypt was asked to process files that already carry a sidecar.
    #[error("{} are already encrypted, \nNo files were encrypted", .0.join(", "))]
    AlreadyEncrypted(Vec<String>),

    /// Decrypt was asked to process files with no sidecar.
    #[error("{} are unencrypted, \nNo files were decrypted", .0.join(", "))]
    NotEncrypted(Vec<String>),

    /// A sidecar was present but its hex fields could not be parsed.
    #[error("sidecar for {file} is malformed")]
    SidecarMalformed { file: String },

    /// The validator derived from the password did not match the stored one.
    #[error("The password did not match for the following filenames: {}", .0.join(", "))]
    PasswordMismatch(Vec<String>),

    /// The ciphertext tag did not match the sidecar tag. The file was left
    /// untouched.
    #[error("{file} has been tampered with and has not been decrypted")]
    Tampered { file: String },

    /// Search found no sidecar the password could open.
    #[error("no searchable files matched the given password")]
    NoSearchableFiles { skipped: Vec<String> },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// OS RNG failed during salt generation.
    #[error("OS RNG failed in salt generation")]
    Rng(#[from] rand_core::OsError),
}
