use std::path::{Path, PathBuf};

use lisk_primitives::Hash32;
use serde::Deserialize;

use crate::cli::StartArgs;
use crate::error::ConfigError;

/// On-disk TOML shape; every field optional so a bare `start --genesis ...`
/// without a `--config` still works off CLI flags and environment alone.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    network_identifier: Option<String>,
    data_dir: Option<PathBuf>,
    log_level: Option<String>,
    confirmation_depth: Option<u32>,
}

/// Fully resolved node configuration (spec §6's ambient CLI/env surface).
/// Precedence, highest first: CLI flag, environment variable (via clap's
/// `env` attribute on [`StartArgs`]), config file, built-in default.
#[derive(Debug, Clone)]
pub struct Config {
    pub network_identifier: Hash32,
    pub data_dir: PathBuf,
    pub log_level: String,
    pub confirmation_depth: u32,
}

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_CONFIRMATION_DEPTH: u32 = 3;

impl Config {
    pub fn load(args: &StartArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => read_file_config(path)?,
            None => FileConfig::default(),
        };

        let network_identifier = args
            .network_identifier
            .clone()
            .or(file.network_identifier)
            .ok_or(ConfigError::Missing("network identifier", "network-identifier", "LISK_NETWORK_IDENTIFIER"))?;
        let network_identifier = Hash32::from_hex(&network_identifier).map_err(ConfigError::InvalidNetworkIdentifier)?;

        let data_dir = args
            .data_dir
            .clone()
            .or(file.data_dir)
            .ok_or(ConfigError::Missing("data directory", "data-dir", "LISK_DATA_DIR"))?;

        let log_level = args.log_level.clone().or(file.log_level).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let confirmation_depth = file.confirmation_depth.unwrap_or(DEFAULT_CONFIRMATION_DEPTH);

        Ok(Config { network_identifier, data_dir, log_level, confirmation_depth })
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn args() -> StartArgs {
        StartArgs {
            config: None,
            genesis: None,
            network_identifier: Some("00".repeat(32)),
            data_dir: Some(PathBuf::from("/tmp/lisk-data")),
            log_level: None,
        }
    }

    #[test]
    fn cli_flags_are_sufficient_without_a_config_file() {
        let config = Config::load(&args()).unwrap();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.confirmation_depth, DEFAULT_CONFIRMATION_DEPTH);
    }

    #[test]
    fn missing_network_identifier_is_a_config_error() {
        let mut a = args();
        a.network_identifier = None;
        assert!(matches!(Config::load(&a), Err(ConfigError::Missing("network identifier", ..))));
    }

    #[test]
    fn config_file_fills_in_gaps_left_by_cli_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "network_identifier = \"{}\"", "ab".repeat(32)).unwrap();
        writeln!(file, "data_dir = \"/var/lib/lisk\"").unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();
        file.flush().unwrap();

        let mut a = args();
        a.network_identifier = None;
        a.data_dir = None;
        a.config = Some(file.path().to_path_buf());

        let config = Config::load(&a).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/lisk"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn invalid_network_identifier_hex_is_a_config_error() {
        let mut a = args();
        a.network_identifier = Some("not-hex".to_string());
        assert!(matches!(Config::load(&a), Err(ConfigError::InvalidNetworkIdentifier(_))));
    }
}
