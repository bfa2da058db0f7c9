//! mcwire - Minecraft protocol client
//!
//! Queries server status, measures ping, authenticates accounts and performs
//! logins, plus a few helpers for inspecting wire values.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mcwire")]
#[command(about = "Minecraft Java edition protocol client")]
#[command(version)]
struct Cli {
    /// YAML config file
    #[arg(short, long, env = "MCWIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Server host
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Protocol version announced in the handshake
    #[arg(long)]
    protocol: Option<i32>,

    /// Username for offline login
    #[arg(short, long)]
    username: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Query the server list status
    Status,

    /// Ping the server through the status protocol
    Ping {
        /// Number of pings
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },

    /// Log in and print the first play packets
    Login {
        /// Number of play packets to print after login
        #[arg(long, default_value = "5")]
        packets: usize,

        /// Account password; authenticates the username against the
        /// account service first
        #[arg(long, env = "MCWIRE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Authenticate an account and print its profile
    Auth {
        /// Account name or email
        account: String,

        /// Account password
        #[arg(long, env = "MCWIRE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Print the VarInt encoding of a number as hex
    EncodeVarint {
        value: i64,

        /// Encode as VarLong
        #[arg(long)]
        long: bool,
    },

    /// Decode a hex-encoded VarInt
    DecodeVarint {
        hex: String,

        /// Decode as VarLong
        #[arg(long)]
        long: bool,
    },

    /// Print the effective configuration
    Config {
        /// Write it to this file instead
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).map_err(|e| {
        tracing::error!("Failed to load config: {}", e);
        e
    })?;
    if let Some(path) = &cli.config {
        tracing::debug!("Loaded config from {}", path.display());
    }

    // Flags win over file and environment
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(protocol) = cli.protocol {
        config.server.protocol_version = protocol;
    }
    if let Some(username) = cli.username {
        config.connection.username = username;
    }

    match commands::execute(&config, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }
}
