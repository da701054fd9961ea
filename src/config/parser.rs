//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::{supports_color, Cli},
    config::env::EnvManager,
    error::Result,
    models::{config::parse_buffer_sizes, Config},
};
use std::path::PathBuf;

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            env_file: PathBuf::from(".env"),
        }
    }

    /// Read a different env file instead of `./.env`
    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = path.into();
        self
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::for_target(self.cli.protocol, self.cli.server.trim());

        if self.cli.debug {
            if let Some(warnings) = EnvManager::check_env_file(&self.env_file)? {
                for warning in warnings {
                    println!("Warning: {}", warning);
                }
            }
        }

        EnvManager::load_env_file_from(&self.env_file, self.cli.debug)?;

        if self.cli.debug {
            for warning in EnvManager::validate_current_env() {
                println!("{}", warning);
            }
        }

        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config)?;

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        let cli = &self.cli;

        if let Some(bandwidth) = cli.bandwidth {
            config.bandwidth_mbps = bandwidth;
        }

        if let Some(count) = cli.count {
            config.test_count = count;
        }

        if let Some(sizes) = &cli.buffer_sizes {
            config.buffer_sizes = parse_buffer_sizes(sizes)?;
        }

        if cli.duration.is_some() {
            config.duration_seconds = cli.duration;
        }

        if cli.timeout.is_some() {
            config.timeout_seconds = cli.timeout;
        }

        if let Some(dir) = &cli.output_dir {
            config.output_dir = dir.clone();
        }

        if cli.output.is_some() {
            config.output_file = cli.output.clone();
        }

        if let Some(path) = &cli.iperf_path {
            config.iperf_path = path.clone();
        }

        if cli.bitrate_probe {
            config.bitrate_probe = true;
        }

        if cli.interface.is_some() {
            config.interface = cli.interface.clone();
        }

        if let Some(format) = cli.log_format {
            config.log_format = format;
        }

        match cli.color_override() {
            Some(enable) => config.enable_color = enable,
            None => config.enable_color = config.enable_color && supports_color(),
        }

        // CLI-only flags
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            println!("Applied CLI overrides to configuration");
            println!(
                "Final config: protocol={}, server={}, buffer_sizes={:?}, test_count={}, bandwidth={}M",
                config.protocol, config.server, config.buffer_sizes, config.test_count, config.bandwidth_mbps
            );
        }

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Protocol: {}", config.protocol));
    summary.push(format!("Server: {}", config.server));
    if config.protocol.is_rate_limited() {
        summary.push(format!("Bandwidth: {} Mbit/s", config.bandwidth_mbps));
    }
    summary.push(format!(
        "Buffer Sizes: {}",
        config.buffer_sizes.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
    ));
    summary.push(format!("Test Count: {}", config.test_count));
    match config.duration_seconds {
        Some(secs) => summary.push(format!("Duration: {}s", secs)),
        None => summary.push("Duration: iperf3 default".to_string()),
    }
    match config.timeout_seconds {
        Some(secs) => summary.push(format!("Timeout: {}s", secs)),
        None => summary.push("Timeout: none".to_string()),
    }
    summary.push(format!("iperf3: {}", config.iperf_path));
    match &config.output_file {
        Some(path) => summary.push(format!("Output: {}", path.display())),
        None => summary.push(format!("Output Directory: {}", config.output_dir.display())),
    }
    match (&config.interface, config.bitrate_probe) {
        (Some(interface), true) => summary.push(format!("Bitrate Probe: true ({})", interface)),
        _ => summary.push(format!("Bitrate Probe: {}", config.bitrate_probe)),
    }
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
