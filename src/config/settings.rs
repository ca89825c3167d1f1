//! Engine settings
//!
//! Tuning knobs for suggestion handling and text analysis. Every field has a
//! serde default so older settings files keep loading.

use serde::{Deserialize, Serialize};

use super::paths::ComposerPaths;
use crate::error::ComposerError;

/// Settings for the composition engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerSettings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Apply high-confidence auto-applicable suggestions without asking
    #[serde(default)]
    pub auto_accept_suggestions: bool,

    /// Quiet period before a description change is analyzed
    #[serde(default = "default_debounce_ms")]
    pub analysis_debounce_ms: u64,

    /// Descriptions of this many characters or fewer are not analyzed
    #[serde(default = "default_min_description_length")]
    pub min_description_length: usize,

    /// Minimum match score (0.0 to 1.0) for a template to be offered
    #[serde(default = "default_template_min_score")]
    pub template_min_score: f64,

    /// Maximum number of ranked template matches
    #[serde(default = "default_max_template_matches")]
    pub max_template_matches: usize,

    /// VAT rate used by VAT suggestions
    #[serde(default = "default_vat_rate")]
    pub vat_rate_percent: f64,

    /// Also emit VAT and AMOUNT hints
    #[serde(default)]
    pub extended_suggestions: bool,

    /// Currency symbol used when formatting amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_description_length() -> usize {
    10
}

fn default_template_min_score() -> f64 {
    0.3
}

fn default_max_template_matches() -> usize {
    5
}

fn default_vat_rate() -> f64 {
    18.0
}

fn default_currency() -> String {
    "FCFA".to_string()
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            auto_accept_suggestions: false,
            analysis_debounce_ms: default_debounce_ms(),
            min_description_length: default_min_description_length(),
            template_min_score: default_template_min_score(),
            max_template_matches: default_max_template_matches(),
            vat_rate_percent: default_vat_rate(),
            extended_suggestions: false,
            currency_symbol: default_currency(),
        }
    }
}

impl ComposerSettings {
    /// Debounce delay as a Duration
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.analysis_debounce_ms)
    }

    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &ComposerPaths) -> Result<Self, ComposerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                ComposerError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: ComposerSettings = serde_json::from_str(&contents).map_err(|e| {
                ComposerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Not persisted until the caller decides to save
            Ok(ComposerSettings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ComposerPaths) -> Result<(), ComposerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            ComposerError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            ComposerError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ComposerError> {
        if !(0.0..=1.0).contains(&self.template_min_score) {
            return Err(ComposerError::Config(format!(
                "template_min_score must be between 0 and 1, got {}",
                self.template_min_score
            )));
        }
        if !(0.0..=100.0).contains(&self.vat_rate_percent) {
            return Err(ComposerError::Config(format!(
                "vat_rate_percent must be between 0 and 100, got {}",
                self.vat_rate_percent
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = ComposerSettings::default();
        assert!(!settings.auto_accept_suggestions);
        assert_eq!(settings.analysis_debounce_ms, 300);
        assert_eq!(settings.min_description_length, 10);
        assert_eq!(settings.currency_symbol, "FCFA");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ComposerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = ComposerSettings::default();
        settings.auto_accept_suggestions = true;
        settings.vat_rate_percent = 19.25;
        settings.save(&paths).unwrap();

        let loaded = ComposerSettings::load_or_create(&paths).unwrap();
        assert!(loaded.auto_accept_suggestions);
        assert_eq!(loaded.vat_rate_percent, 19.25);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: ComposerSettings =
            serde_json::from_str(r#"{"auto_accept_suggestions": true}"#).unwrap();
        assert!(settings.auto_accept_suggestions);
        assert_eq!(settings.max_template_matches, 5);
        assert_eq!(settings.template_min_score, 0.3);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = ComposerPaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "{ not json").unwrap();

        let err = ComposerSettings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, ComposerError::Config(_)));
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let settings = ComposerSettings {
            template_min_score: 1.5,
            ..ComposerSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
