//! Network Throughput Tester - Main CLI Application
//!
//! Runs iperf3 repeatedly for each buffer size, summarises the measured
//! throughput and writes the results to a CSV report.

use clap::Parser;
use network_throughput_tester::{
    app::App,
    cli::Cli,
    config::{load_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    PKG_NAME, VERSION,
};
use std::{error::Error, process};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        let error = AppError::internal(format!("panic: {}", panic_info));
        eprintln!("{}", error.format_for_console(false));
        eprintln!("Please report this issue with the command line you used.");
        process::exit(error.exit_code());
    }));

    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(2);
    }

    let use_color = cli.use_colors();
    let verbose = cli.verbose;

    if let Err(e) = run_application(cli).await {
        ErrorReporter::new(use_color, verbose).report_error(&e);

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        println!("{} v{}", PKG_NAME, VERSION);
        if let Some(commit) = option_env!("GIT_COMMIT") {
            println!("Commit: {}", commit);
        }
        if let Some(built) = option_env!("BUILD_TIME") {
            println!("Built: {}", built);
        }
        println!("Target: {}", env!("TARGET_TRIPLE"));
        println!("Debug mode enabled");
        println!("{}", cli.get_config_summary());
    }

    let config = load_config(cli)?;

    if config.verbose {
        println!(
            "{} v{} - {} test against {}",
            PKG_NAME, VERSION, config.protocol, config.server
        );
    }

    let app = App::new(config).await;
    app.run().await?;

    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - Buffer sizes are N or start:end:step (end exclusive), comma separated");
            eprintln!("  - UDP buffer sizes cannot exceed 65507 bytes");
            eprintln!();
            eprint!("{}", EnvManager::display_env_help());
        }
        AppError::Report(_) | AppError::Io(_) => {
            eprintln!();
            eprintln!("Report troubleshooting:");
            eprintln!("  - Check that the output directory is writable");
            eprintln!("  - Use --output-dir or --output to choose another location");
        }
        _ => {}
    }
}
