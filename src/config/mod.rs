//! Configuration module
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Engine settings persistence

pub mod paths;
pub mod settings;

pub use paths::ComposerPaths;
pub use settings::ComposerSettings;
