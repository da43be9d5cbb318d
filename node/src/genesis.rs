use std::path::Path;

use lisk_primitives::Block;

use crate::error::ConfigError;

pub fn load(path: &Path) -> Result<Block, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadGenesis(path.to_path_buf(), e))?;
    serde_json::from_str(&contents).map_err(|e| ConfigError::ParseGenesis(path.to_path_buf(), e))
}
