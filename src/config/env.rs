//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::models::config::parse_buffer_sizes;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load a specific env file if it exists. Variables already set in the
    /// process environment keep their values.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                println!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            println!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "IPERF3_PATH" | "OUTPUT_DIR" => {
                if value.is_empty() {
                    return Err(AppError::config(format!("{} cannot be empty", key)));
                }
            }
            "TEST_COUNT" => {
                let count: u32 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid TEST_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > crate::defaults::MAX_TEST_COUNT {
                    return Err(AppError::config(format!(
                        "TEST_COUNT must be between 1 and {}, got: {}",
                        crate::defaults::MAX_TEST_COUNT,
                        count
                    )));
                }
            }
            "BUFFER_SIZES" => {
                parse_buffer_sizes(value)
                    .map_err(|e| AppError::config(format!("Invalid BUFFER_SIZES value '{}': {}", value, e)))?;
            }
            "BANDWIDTH_MBPS" => {
                let bandwidth: u32 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid BANDWIDTH_MBPS value '{}': {}", value, e)))?;
                if bandwidth == 0 {
                    return Err(AppError::config("BANDWIDTH_MBPS must be greater than 0"));
                }
            }
            "ENABLE_COLOR" | "BITRATE_PROBE" => {
                value
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("IPERF3_PATH", "Path or name of the iperf3 binary", "/usr/bin/iperf3"),
            ("TEST_COUNT", "Runs per buffer size (1-1000)", "10"),
            ("BUFFER_SIZES", "Buffer sizes in bytes, N or start:end:step", "1000:15000:2000"),
            ("BANDWIDTH_MBPS", "UDP target bandwidth in Mbit/s", "30"),
            ("OUTPUT_DIR", "Directory for generated CSV reports", "iperf3_results"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
            ("BITRATE_PROBE", "Probe the wireless link bitrate with iwconfig", "false"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<18} {}\n", var, description));
            help.push_str(&format!("  {:<18} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        let mut warnings = Vec::new();

        for (var_name, _, _) in Self::get_supported_env_vars() {
            if let Ok(value) = std::env::var(var_name) {
                if let Err(e) = Self::validate_env_var(var_name, &value) {
                    warnings.push(format!("Warning: {}", e));
                }
            }
        }

        warnings
    }

    /// Validate the `KEY=value` lines of an env file without loading it
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                if let Err(e) = Self::validate_env_var(key.trim(), value) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_LOCK;
    use tempfile::TempDir;

    #[test]
    fn test_env_manager_validate_env_var() {
        // Valid cases
        assert!(EnvManager::validate_env_var("IPERF3_PATH", "/usr/local/bin/iperf3").is_ok());
        assert!(EnvManager::validate_env_var("TEST_COUNT", "5").is_ok());
        assert!(EnvManager::validate_env_var("BUFFER_SIZES", "1000,1400").is_ok());
        assert!(EnvManager::validate_env_var("BUFFER_SIZES", "1000:15000:2000").is_ok());
        assert!(EnvManager::validate_env_var("BANDWIDTH_MBPS", "1000").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "true").is_ok());
        assert!(EnvManager::validate_env_var("BITRATE_PROBE", "false").is_ok());
        assert!(EnvManager::validate_env_var("SOMETHING_ELSE", "whatever").is_ok());

        // Invalid cases
        assert!(EnvManager::validate_env_var("IPERF3_PATH", "  ").is_err());
        assert!(EnvManager::validate_env_var("TEST_COUNT", "0").is_err());
        assert!(EnvManager::validate_env_var("TEST_COUNT", "1001").is_err());
        assert!(EnvManager::validate_env_var("BUFFER_SIZES", "big").is_err());
        assert!(EnvManager::validate_env_var("BANDWIDTH_MBPS", "0").is_err());
        assert!(EnvManager::validate_env_var("BANDWIDTH_MBPS", "-5").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
    }

    #[test]
    fn test_get_supported_env_vars() {
        let vars = EnvManager::get_supported_env_vars();

        assert_eq!(vars.len(), 7);
        assert!(vars.iter().any(|(name, _, _)| *name == "IPERF3_PATH"));
        assert!(vars.iter().any(|(name, _, _)| *name == "BUFFER_SIZES"));
        assert!(vars.iter().any(|(name, _, _)| *name == "BITRATE_PROBE"));
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();

        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("BANDWIDTH_MBPS"));
        assert!(help.contains("Configuration Priority"));
        assert!(help.contains("Command-line arguments"));
    }

    #[test]
    fn test_validate_current_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for (var_name, _, _) in EnvManager::get_supported_env_vars() {
            std::env::remove_var(var_name);
        }
        assert!(EnvManager::validate_current_env().is_empty());

        std::env::set_var("TEST_COUNT", "zero");
        let warnings = EnvManager::validate_current_env();
        std::env::remove_var("TEST_COUNT");

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("TEST_COUNT"));
    }

    #[test]
    fn test_check_env_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        assert!(EnvManager::check_env_file(&path).unwrap().is_none());

        std::fs::write(&path, "# comment\nTEST_COUNT=5\nBANDWIDTH_MBPS=fast\n\nENABLE_COLOR=true\n").unwrap();
        let warnings = EnvManager::check_env_file(&path).unwrap().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("BANDWIDTH_MBPS=fast"));
    }

    #[test]
    fn test_load_env_file_from() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = TempDir::new().unwrap();

        // Missing file is not an error
        assert!(EnvManager::load_env_file_from(&dir.path().join("missing.env"), false).is_ok());

        let path = dir.path().join("custom.env");
        std::fs::write(&path, "NTT_ENV_FILE_VALUE=loaded\n").unwrap();
        std::env::remove_var("NTT_ENV_FILE_VALUE");

        EnvManager::load_env_file_from(&path, false).unwrap();
        assert_eq!(std::env::var("NTT_ENV_FILE_VALUE").unwrap(), "loaded");
        std::env::remove_var("NTT_ENV_FILE_VALUE");
    }
}
