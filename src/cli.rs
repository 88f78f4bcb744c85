//! Command-line flags (§6 "CLI flags"). Out of scope per spec.md §1, but the
//! corpus's idiomatic CLI crate is `clap`, not hand-rolled `std::env::args()`.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kiro-gateway")]
#[command(about = "Anthropic-compatible gateway in front of a proprietary streaming upstream")]
pub struct Args {
    /// Path to the gateway configuration file.
    #[arg(short = 'c', long = "config", default_value = "./config.json")]
    pub config: PathBuf,

    /// Path to the OAuth credentials file.
    #[arg(short = 'C', long = "credentials", default_value = "./credentials.json")]
    pub credentials: PathBuf,
}
