mod args;

use args::{Cli, Commands};
use clap::Parser;

use std::collections::BTreeMap;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fencrypt::{Error, MIN_BLOCK_LEN, PendingDecrypt, Sidecar};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    let cli = Cli::parse();
    let password = read_password()?;

    match cli.command {
        Commands::Encrypt(file_args) => run_encrypt(&file_args.files, &password, cli.json),
        Commands::Decrypt(file_args) => run_decrypt(&file_args.files, &password, cli.json),
        Commands::Search(search_args) => run_search(&search_args.terms, &password, cli.json),
    }
}

/// Route each fatal message to the stream the interface contract names:
/// state and password failures go to stderr, path and size pre-flight
/// reports to stdout.
fn report(err: &Error) {
    match err {
        Error::InvalidPaths(_) | Error::FileTooSmall(_) => println!("{err}"),
        Error::AlreadyEncrypted(_)
        | Error::NotEncrypted(_)
        | Error::PasswordMismatch(_)
        | Error::EmptyPassword
        | Error::NoSearchableFiles { .. } => eprintln!("{err}"),
        _ => eprintln!("error: {err}"),
    }
}

/// Read the password: one no-echo prompt on a terminal, otherwise one line
/// from stdin with the trailing newline stripped.
fn read_password() -> Result<String, Error> {
    let password = if atty::is(atty::Stream::Stdin) {
        rpassword::prompt_password("Password: ")?
    } else {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_owned()
    };

    if password.is_empty() {
        return Err(Error::EmptyPassword);
    }
    Ok(password)
}

fn run_encrypt(files: &[PathBuf], password: &str, json: bool) -> Result<(), Error> {
    preflight_paths(files)?;
    preflight_sizes(files)?;

    let already: Vec<String> = files
        .iter()
        .filter(|file| Sidecar::exists_for(file))
        .map(|file| display(file))
        .collect();
    if !already.is_empty() {
        return Err(Error::AlreadyEncrypted(already));
    }

    let mut masters = BTreeMap::new();
    for file in files {
        let outcome = fencrypt::encrypt_file(file, password)?;
        masters.insert(display(file), hex::encode(outcome.master));
    }

    if json {
        print_json(&masters)?;
    }
    Ok(())
}

fn run_decrypt(files: &[PathBuf], password: &str, json: bool) -> Result<(), Error> {
    preflight_paths(files)?;
    preflight_sizes(files)?;

    let missing: Vec<String> = files
        .iter()
        .filter(|file| !Sidecar::exists_for(file))
        .map(|file| display(file))
        .collect();
    if !missing.is_empty() {
        return Err(Error::NotEncrypted(missing));
    }

    // Validate the password against every sidecar before touching any file,
    // so a mismatch anywhere in the batch aborts it whole.
    let mut pending = Vec::with_capacity(files.len());
    let mut mismatched = Vec::new();
    for file in files {
        match PendingDecrypt::open(file, password) {
            Ok(p) => pending.push(p),
            Err(Error::PasswordMismatch(mut names)) => mismatched.append(&mut names),
            Err(other) => return Err(other),
        }
    }
    if !mismatched.is_empty() {
        return Err(Error::PasswordMismatch(mismatched));
    }

    if json {
        print_decrypt_dump(&pending)?;
    }

    for p in pending {
        match p.commit() {
            Ok(()) => {}
            Err(err @ Error::Tampered { .. }) => println!("{err}"),
            Err(other) => return Err(other),
        }
    }
    Ok(())
}

fn run_search(terms: &[String], password: &str, json: bool) -> Result<(), Error> {
    let outcome = match fencrypt::search_dir(Path::new("."), terms, password) {
        Ok(outcome) => outcome,
        Err(Error::NoSearchableFiles { skipped }) => {
            warn_skipped(&skipped);
            return Err(Error::NoSearchableFiles { skipped });
        }
        Err(other) => return Err(other),
    };
    warn_skipped(&outcome.skipped);

    if json {
        let masters: BTreeMap<String, String> = outcome
            .masters
            .iter()
            .map(|(name, master)| (name.clone(), hex::encode(master)))
            .collect();
        print_json(&masters)?;
    }

    for (term, hits) in &outcome.matches {
        if hits.is_empty() {
            println!("no files contain \"{term}\"");
        } else {
            println!("files with \"{term}\": {}", hits.join(", "));
        }
    }
    Ok(())
}

fn warn_skipped(skipped: &[String]) {
    for name in skipped {
        eprintln!("warning: skipping {name}: password mismatch");
    }
}

fn preflight_paths(files: &[PathBuf]) -> Result<(), Error> {
    let bad: Vec<String> = files
        .iter()
        .filter(|file| !file.is_file())
        .map(|file| display(file))
        .collect();
    if bad.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidPaths(bad))
    }
}

fn preflight_sizes(files: &[PathBuf]) -> Result<(), Error> {
    let mut small = Vec::new();
    for file in files {
        if fs::metadata(file)?.len() < MIN_BLOCK_LEN as u64 {
            small.push(display(file));
        }
    }
    if small.is_empty() {
        Ok(())
    } else {
        Err(Error::FileTooSmall(small))
    }
}

fn print_json(map: &BTreeMap<String, String>) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(map)?);
    Ok(())
}

fn print_decrypt_dump(pending: &[PendingDecrypt]) -> Result<(), Error> {
    let mut masters = BTreeMap::new();
    let mut bundles = serde_json::Map::new();
    for p in pending {
        masters.insert(p.file_name(), hex::encode(p.master()));
        let keys = p.keys();
        bundles.insert(
            p.file_name(),
            serde_json::json!({
                "password validator": hex::encode(keys.validator),
                "1st round key": hex::encode(keys.round_keys[0]),
                "2nd round key": hex::encode(keys.round_keys[1]),
                "3rd round key": hex::encode(keys.round_keys[2]),
                "4th round key": hex::encode(keys.round_keys[3]),
                "mac key": hex::encode(keys.mac_key),
                "search term key": hex::encode(keys.term_key),
            }),
        );
    }
    print_json(&masters)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(bundles))?
    );
    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
