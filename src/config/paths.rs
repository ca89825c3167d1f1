//! Path management for the composition engine
//!
//! Resolves where engine settings are stored.
//!
//! ## Path Resolution Order
//!
//! 1. `OHADA_COMPOSER_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/ohada-composer` or `~/.config/ohada-composer`
//! 3. Windows: `%APPDATA%\ohada-composer`

use std::path::PathBuf;

use crate::error::ComposerError;

/// Environment variable overriding the settings directory
pub const DIR_ENV_VAR: &str = "OHADA_COMPOSER_DIR";

/// Manages all paths used by the engine
#[derive(Debug, Clone)]
pub struct ComposerPaths {
    base_dir: PathBuf,
}

impl ComposerPaths {
    /// Create a new ComposerPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home or application data directory can be
    /// determined.
    pub fn new() -> Result<Self, ComposerError> {
        let base_dir = if let Ok(custom) = std::env::var(DIR_ENV_VAR) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create ComposerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("composer.json")
    }

    /// Ensure the base directory exists
    pub fn ensure_directories(&self) -> Result<(), ComposerError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            ComposerError::Io(format!("Failed to create settings directory: {}", e))
        })
    }

    /// Check if a settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, ComposerError> {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(config_home).join("ohada-composer"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| ComposerError::Config("Could not determine HOME directory".into()))?;
    Ok(PathBuf::from(home).join(".config").join("ohada-composer"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, ComposerError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| ComposerError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("ohada-composer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ComposerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(
            paths.settings_file(),
            temp_dir.path().join("composer.json")
        );
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        env::set_var(DIR_ENV_VAR, custom_path);
        let paths = ComposerPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());
        env::remove_var(DIR_ENV_VAR);
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("composer");
        let paths = ComposerPaths::with_base_dir(nested.clone());

        paths.ensure_directories().unwrap();
        assert!(nested.exists());
    }
}
