use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Relay, an OpenAI-compatible front for an agent runtime
#[derive(Debug, Parser)]
#[command(name = "relay", about = "OpenAI-compatible chat completions over an agent runtime")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml", env = "RELAY_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "RELAY_LISTEN")]
    pub listen: Option<SocketAddr>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the SHA-256 digest of an API key for `[[auth.keys]]`
    HashKey {
        /// Raw API key
        key: String,
    },
}
