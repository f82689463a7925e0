//! Batch pre-flight tests against the compiled binary. A failed check on
//! any file in an invocation must abort before anything is written, so
//! every assertion here is about files NOT changing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use fencrypt::encrypt_file;
use tempfile::tempdir;

const PASSWORD: &str = "correct horse battery staple";

fn write_sample(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write sample file");
    path
}

/// Run the fencrypt binary in `dir`, feeding the password on stdin the way
/// a piped invocation would.
fn run_cli(dir: &Path, args: &[&str], password: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_fencrypt"))
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn fencrypt");
    child
        .stdin
        .as_mut()
        .expect("stdin is piped")
        .write_all(format!("{password}\n").as_bytes())
        .expect("write password");
    child.wait_with_output().expect("binary runs to completion")
}

#[test]
fn encrypt_batch_aborts_when_one_file_is_already_encrypted() {
    let dir = tempdir().expect("tempdir");
    let plain_contents = b"this file stays plaintext through the aborted batch";
    let plain = write_sample(dir.path(), "plain.txt", plain_contents);
    let locked = write_sample(
        dir.path(),
        "locked.txt",
        b"this file was already encrypted before the batch ran",
    );
    encrypt_file(&locked, PASSWORD).expect("pre-encrypt the second file");

    let locked_ciphertext = fs::read(&locked).expect("read ciphertext");
    let locked_sidecar_path = dir.path().join(".fenc-meta.locked.txt");
    let locked_sidecar = fs::read(&locked_sidecar_path).expect("read sidecar");

    let output = run_cli(dir.path(), &["encrypt", "plain.txt", "locked.txt"], PASSWORD);

    assert!(!output.status.success(), "batch must exit non-zero");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("locked.txt are already encrypted"));
    assert!(stderr.contains("No files were encrypted"));

    // Neither file was touched: the first is still plaintext with no
    // sidecar, the second's ciphertext and sidecar are byte-identical.
    assert_eq!(fs::read(&plain).expect("read"), plain_contents);
    assert!(!dir.path().join(".fenc-meta.plain.txt").exists());
    assert_eq!(fs::read(&locked).expect("read"), locked_ciphertext);
    assert_eq!(fs::read(&locked_sidecar_path).expect("read"), locked_sidecar);
}

#[test]
fn decrypt_batch_aborts_when_one_password_mismatches() {
    let dir = tempdir().expect("tempdir");
    let mine = write_sample(
        dir.path(),
        "mine.txt",
        b"encrypted under the password the batch will use",
    );
    let theirs = write_sample(
        dir.path(),
        "theirs.txt",
        b"encrypted under a different password entirely..",
    );
    encrypt_file(&mine, PASSWORD).expect("encrypt mine");
    encrypt_file(&theirs, "someone elses password").expect("encrypt theirs");

    let mine_ciphertext = fs::read(&mine).expect("read");
    let theirs_ciphertext = fs::read(&theirs).expect("read");

    let output = run_cli(dir.path(), &["decrypt", "mine.txt", "theirs.txt"], PASSWORD);

    assert!(!output.status.success(), "batch must exit non-zero");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("The password did not match for the following filenames: theirs.txt"));

    // Both files are still ciphertext and both sidecars survive, including
    // the one whose password would have matched.
    assert_eq!(fs::read(&mine).expect("read"), mine_ciphertext);
    assert_eq!(fs::read(&theirs).expect("read"), theirs_ciphertext);
    assert!(dir.path().join(".fenc-meta.mine.txt").exists());
    assert!(dir.path().join(".fenc-meta.theirs.txt").exists());
}

#[test]
fn round_trip_through_the_binary() {
    let dir = tempdir().expect("tempdir");
    let contents = b"plaintext that goes through the whole binary";
    let file = write_sample(dir.path(), "note.txt", contents);

    let output = run_cli(dir.path(), &["encrypt", "note.txt"], PASSWORD);
    assert!(output.status.success());
    assert_ne!(fs::read(&file).expect("read"), contents);
    assert!(dir.path().join(".fenc-meta.note.txt").exists());

    let output = run_cli(dir.path(), &["decrypt", "note.txt"], PASSWORD);
    assert!(output.status.success());
    assert_eq!(fs::read(&file).expect("read"), contents);
    assert!(!dir.path().join(".fenc-meta.note.txt").exists());
}

#[test]
fn empty_password_is_fatal() {
    let dir = tempdir().expect("tempdir");
    write_sample(dir.path(), "note.txt", &[0x42u8; 40]);

    let output = run_cli(dir.path(), &["encrypt", "note.txt"], "");
    assert!(!output.status.success());
    assert!(!dir.path().join(".fenc-meta.note.txt").exists());
}
