use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tether")]
#[command(version)]
#[command(about = "Scriptable host and channel caller for tether")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a host that answers every channel with configured responses
    Serve(ServeArgs),

    /// Send one message on a channel and print the reply
    Call(CallArgs),

    /// List the channel catalogue
    Channels,
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args)]
pub struct CallArgs {
    /// Channel name, e.g. `open-external`
    pub channel: String,

    /// Arguments as a JSON array, e.g. '["https://example.com"]'
    pub args: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Common arguments shared across subcommands
#[derive(Args)]
pub struct CommonArgs {
    /// Host socket path
    #[arg(long, env = "TETHER_IPC_SOCKET")]
    pub socket: Option<PathBuf>,

    /// Maximum frame size in bytes
    #[arg(long)]
    pub max_frame_len: Option<usize>,
}
