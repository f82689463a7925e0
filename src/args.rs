use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, arg_required_else_help = true)]
pub struct Cli {
    /// Emit derived key material as JSON on stdout.
    #[arg(short = 'j', long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encrypt files in place and build their search sidecars
    Encrypt(FileArgs),

    /// Authenticate and decrypt files in place
    Decrypt(FileArgs),

    /// Find which encrypted files in the current directory contain the given terms
    Search(SearchArgs),
}

#[derive(Args, Debug)]
#[command(arg_required_else_help = true)]
pub struct FileArgs {
    /// File paths, relative to the current directory.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
#[command(arg_required_else_help = true)]
pub struct SearchArgs {
    /// Search terms; append `*` for a prefix query of at least four characters.
    #[arg(required = true)]
    pub terms: Vec<String>,
}
