use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "lisk-node", about = "DPoS blockchain node")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the node, applying `--genesis` if the data directory has no tip yet.
    Start(StartArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct StartArgs {
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub genesis: Option<PathBuf>,

    #[arg(long, env = "LISK_NETWORK_IDENTIFIER")]
    pub network_identifier: Option<String>,

    #[arg(long, env = "LISK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, env = "LISK_LOG_LEVEL")]
    pub log_level: Option<String>,
}
