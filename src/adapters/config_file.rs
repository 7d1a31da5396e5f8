//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document on disk. A missing
//! file is reported as [`ConfigError::NotFound`] so the caller can decide
//! to run on defaults; a file that exists but does not parse is
//! [`ConfigError::Corrupted`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::FeederConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<FeederConfig, ConfigError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ConfigError::NotFound),
            Err(e) => {
                warn!("ConfigFile: read {} failed: {}", self.path.display(), e);
                return Err(ConfigError::IoError);
            }
        };
        let config: FeederConfig = serde_json::from_slice(&bytes).map_err(|e| {
            warn!("ConfigFile: {} is not valid config: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        info!("ConfigFile: loaded {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &FeederConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_vec_pretty(config).map_err(|_| ConfigError::IoError)?;
        std::fs::write(&self.path, json).map_err(|e| {
            warn!("ConfigFile: write {} failed: {}", self.path.display(), e);
            ConfigError::IoError
        })?;
        info!("ConfigFile: saved {}", self.path.display());
        Ok(())
    }
}
