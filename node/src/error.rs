use std::path::PathBuf;

use thiserror::Error;

/// Surfaced at the CLI boundary, mapped to exit code 2 — misconfiguration,
/// never a runtime fault.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
    #[error("{0} must be set via config file, --{1}, or {2}")]
    Missing(&'static str, &'static str, &'static str),
    #[error("network identifier must be 32 bytes of hex: {0}")]
    InvalidNetworkIdentifier(hex::FromHexError),
    #[error("failed to read genesis file {0}: {1}")]
    ReadGenesis(PathBuf, std::io::Error),
    #[error("failed to create data directory {0}: {1}")]
    DataDir(PathBuf, std::io::Error),
    #[error("failed to parse genesis file {0}: {1}")]
    ParseGenesis(PathBuf, serde_json::Error),
    #[error("data directory has no chain tip and no --genesis was given")]
    NoGenesis,
}

/// Top-level error the binary maps to an exit code: `Config` is a
/// misconfiguration (2), everything else is a fatal runtime error (1).
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] lisk_store::DbError),
    #[error(transparent)]
    Chain(#[from] lisk_chain::ChainError),
    #[error(transparent)]
    Processor(#[from] lisk_processor::ProcessorError),
    #[error(transparent)]
    Bus(#[from] lisk_bus::BusError),
}
