//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::LensConfig;
use std::path::Path;

/// Name of the configuration file inside a sketch workspace.
pub const CONFIG_FILE_NAME: &str = "lens.toml";

/// Loads and validates a `lens.toml` configuration from a workspace directory.
///
/// Reads `<dir>/lens.toml`, parses it, and validates required fields.
pub fn load_config(dir: &Path) -> Result<LensConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `lens.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<LensConfig, ConfigError> {
    let config: LensConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &LensConfig) -> Result<(), ConfigError> {
    if config.sketch.root.as_os_str().is_empty() {
        return Err(ConfigError::MissingField("sketch.root".to_string()));
    }
    if config.analysis.completion_limit == 0 {
        return Err(ConfigError::ValidationError(
            "analysis.completion_limit must be at least 1".to_string(),
        ));
    }
    if config.service.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "service.queue_capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
[sketch]
root = "/home/me/Blink"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.sketch.root, PathBuf::from("/home/me/Blink"));
        assert_eq!(config.analysis.core_include, "Arduino.h");
        assert_eq!(config.analysis.completion_limit, 256);
        assert_eq!(config.analysis.symbol_grace(), Duration::from_secs(10));
        assert!(config.analysis.compiler_args.is_empty());
        assert_eq!(config.service.queue_capacity, 64);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[sketch]
root = "/home/me/Blink"

[analysis]
compiler_args = ["-DARDUINO=10819", "-I/opt/core"]
warning_flags = ["-Wall"]
core_include = "WProgram.h"
symbol_grace_ms = 2500
completion_limit = 50

[service]
queue_capacity = 8
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.analysis.compiler_args, vec!["-DARDUINO=10819", "-I/opt/core"]);
        assert_eq!(config.analysis.warning_flags, vec!["-Wall"]);
        assert_eq!(config.analysis.core_include, "WProgram.h");
        assert_eq!(config.analysis.symbol_grace(), Duration::from_millis(2500));
        assert_eq!(config.analysis.completion_limit, 50);
        assert_eq!(config.service.queue_capacity, 8);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let toml = r#"
[sketch]
root = "/s"

[analysis]
warning_flags = ["-Wextra"]
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.analysis.warning_flags, vec!["-Wextra"]);
        assert_eq!(config.analysis.core_include, "Arduino.h");
        assert_eq!(config.analysis.symbol_grace_ms, 10_000);
    }

    #[test]
    fn missing_sketch_section() {
        let err = load_config_from_str("[service]\nqueue_capacity = 4\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn empty_root_rejected() {
        let err = load_config_from_str("[sketch]\nroot = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(ref f) if f == "sketch.root"));
    }

    #[test]
    fn zero_completion_limit_rejected() {
        let toml = "[sketch]\nroot = \"/s\"\n[analysis]\ncompletion_limit = 0\n";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn zero_queue_capacity_rejected() {
        let toml = "[sketch]\nroot = \"/s\"\n[service]\nqueue_capacity = 0\n";
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[sketch]\nroot = \"/s\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.sketch.root, PathBuf::from("/s"));
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
