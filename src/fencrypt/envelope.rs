//! The file envelope: sidecar metadata and the encrypt / decrypt / search
//! drivers that tie the key schedule, the Feistel network, the MAC, and the
//! word index together around a file on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fencrypt::error::{Error, Result};
use crate::fencrypt::feistel::{Feistel, MIN_BLOCK_LEN};
use crate::fencrypt::index;
use crate::fencrypt::kdf::{self, MASTER_LEN, SALT_LEN};
use crate::fencrypt::mac::mac;
use crate::fencrypt::schedule::KeyBundle;

/// Filename prefix of the per-file metadata blob. A sidecar existing is the
/// definition of "this file is currently encrypted".
pub const SIDECAR_PREFIX: &str = ".fenc-meta.";

/// Per-file metadata stored next to an encrypted file. All fields are
/// lowercase hex except `terms`, whose entries are the 64-hex-char blinded
/// index tokens in sorted token order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sidecar {
    pub salt: String,
    pub validator: String,
    pub mac: String,
    pub terms: Vec<String>,
}

impl Sidecar {
    /// Sidecar path for a file: `.fenc-meta.<name>` in the same directory.
    pub fn path_for(file: &Path) -> PathBuf {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        file.with_file_name(format!("{SIDECAR_PREFIX}{name}"))
    }

    /// Whether `file` currently has a sidecar, i.e. is encrypted.
    pub fn exists_for(file: &Path) -> bool {
        Self::path_for(file).exists()
    }

    fn load(path: &Path) -> Result<Self> {
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }

    fn store(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    fn salt_bytes(&self, file: &Path) -> Result<[u8; SALT_LEN]> {
        let mut salt = [0u8; SALT_LEN];
        hex::decode_to_slice(&self.salt, &mut salt).map_err(|_| Error::SidecarMalformed {
            file: display_name(file),
        })?;
        Ok(salt)
    }
}

/// Key material surfaced to the caller for the optional JSON dump.
#[derive(Debug)]
pub struct EncryptOutcome {
    pub master: [u8; MASTER_LEN],
}

/// Encrypt `path` in place and write its sidecar.
///
/// A fresh salt is drawn, the subkeys are derived, the plaintext's blinded
/// token set is built (empty when the file is not valid UTF-8), and the
/// Feistel ciphertext plus its tag replace the file. The ciphertext
/// overwrite happens before the sidecar write, so a crash between the two
/// leaves a ciphertext with no sidecar rather than a sidecar pointing at
/// plaintext. Nothing is written for files below 32 bytes.
pub fn encrypt_file(path: &Path, password: &str) -> Result<EncryptOutcome> {
    let salt = kdf::random_salt()?;
    let master = kdf::derive_master(password, &salt);
    let keys = KeyBundle::expand(&master);

    let mut block = fs::read(path)?;
    if block.len() < MIN_BLOCK_LEN {
        return Err(Error::BlockTooShort { len: block.len() });
    }

    let terms = match std::str::from_utf8(&block) {
        Ok(text) => index::blinded_terms(text, &keys.term_key),
        Err(_) => Vec::new(),
    };

    Feistel::new(keys.round_keys).encrypt(&mut block)?;
    let tag = mac(&keys.mac_key, &block);

    fs::write(path, &block)?;
    Sidecar {
        salt: hex::encode(salt),
        validator: hex::encode(keys.validator),
        mac: hex::encode(tag),
        terms,
    }
    .store(&Sidecar::path_for(path))?;

    Ok(EncryptOutcome { master })
}

/// A decrypt whose sidecar has been loaded and whose password has been
/// validated, but whose file bytes are untouched. Batch callers open every
/// file first and only then commit, so a failed check on any file aborts
/// before anything is rewritten.
#[derive(Debug)]
pub struct PendingDecrypt {
    path: PathBuf,
    sidecar_path: PathBuf,
    sidecar: Sidecar,
    master: [u8; MASTER_LEN],
    keys: KeyBundle,
}

impl PendingDecrypt {
    /// Load the sidecar and check the password validator. Fails with
    /// `NotEncrypted` when no sidecar exists and `PasswordMismatch` when
    /// the derived validator differs, in both cases before reading the
    /// encrypted file itself.
    pub fn open(path: &Path, password: &str) -> Result<Self> {
        let sidecar_path = Sidecar::path_for(path);
        if !sidecar_path.exists() {
            return Err(Error::NotEncrypted(vec![display_name(path)]));
        }
        let sidecar = Sidecar::load(&sidecar_path)?;
        let salt = sidecar.salt_bytes(path)?;

        let master = kdf::derive_master(password, &salt);
        let keys = KeyBundle::expand(&master);
        if hex::encode(keys.validator) != sidecar.validator {
            return Err(Error::PasswordMismatch(vec![display_name(path)]));
        }

        Ok(Self {
            path: path.to_owned(),
            sidecar_path,
            sidecar,
            master,
            keys,
        })
    }

    pub fn master(&self) -> &[u8; MASTER_LEN] {
        &self.master
    }

    pub fn keys(&self) -> &KeyBundle {
        &self.keys
    }

    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }

    /// Authenticate the current file bytes and decrypt in place, removing
    /// the sidecar afterwards. On a tag mismatch the file and the sidecar
    /// are both left untouched.
    pub fn commit(self) -> Result<()> {
        let mut block = fs::read(&self.path)?;
        if hex::encode(mac(&self.keys.mac_key, &block)) != self.sidecar.mac {
            return Err(Error::Tampered {
                file: self.file_name(),
            });
        }

        Feistel::new(self.keys.round_keys).decrypt(&mut block)?;
        fs::write(&self.path, &block)?;
        fs::remove_file(&self.sidecar_path)?;
        Ok(())
    }
}

/// Search results over one directory's sidecars.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Query term paired with the bare filenames whose index contains it,
    /// in query order.
    pub matches: Vec<(String, Vec<String>)>,
    /// Bare filename to master key, for the optional JSON dump.
    pub masters: BTreeMap<String, [u8; MASTER_LEN]>,
    /// Bare filenames whose sidecar the password could not open.
    pub skipped: Vec<String>,
}

/// Search every sidecar in `dir` for the given query terms.
///
/// Each sidecar derives its own keys; files whose validator rejects the
/// password are skipped and reported in the outcome. Fails with
/// `NoSearchableFiles` when the password opens none of them. Reported
/// names are the original filenames with the sidecar prefix stripped.
pub fn search_dir(dir: &Path, terms: &[String], password: &str) -> Result<SearchOutcome> {
    let mut sidecar_paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(SIDECAR_PREFIX))
        })
        .collect();
    sidecar_paths.sort();

    let mut opened = Vec::new();
    let mut skipped = Vec::new();
    for sidecar_path in sidecar_paths {
        let name = sidecar_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n[SIDECAR_PREFIX.len()..].to_owned())
            .unwrap_or_default();
        let sidecar = Sidecar::load(&sidecar_path)?;
        let Ok(salt) = sidecar.salt_bytes(&sidecar_path) else {
            skipped.push(name);
            continue;
        };

        let master = kdf::derive_master(password, &salt);
        let keys = KeyBundle::expand(&master);
        if hex::encode(keys.validator) != sidecar.validator {
            skipped.push(name);
            continue;
        }
        opened.push((name, sidecar, master, keys));
    }

    if opened.is_empty() {
        return Err(Error::NoSearchableFiles { skipped });
    }

    let mut masters = BTreeMap::new();
    for (name, _, master, _) in &opened {
        masters.insert(name.clone(), *master);
    }

    let mut matches = Vec::with_capacity(terms.len());
    for term in terms {
        let mut hits = Vec::new();
        for (name, sidecar, _, keys) in &opened {
            if sidecar.terms.contains(&index::blind_query(term, &keys.term_key)) {
                hits.push(name.clone());
            }
        }
        matches.push((term.clone(), hits));
    }

    Ok(SearchOutcome {
        matches,
        masters,
        skipped,
    })
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}
