//! Error handling for the network throughput tester

use thiserror::Error;

/// Custom error types for the network throughput tester
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (JSON, numbers, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// The benchmarking tool could not be started or exited unsuccessfully
    #[error("Tool invocation error: {0}")]
    ToolInvocation(String),

    /// The benchmarking tool ran but its report was unusable
    #[error("Tool output error: {0}")]
    ToolOutput(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Report writing errors
    #[error("Report error: {0}")]
    Report(String),

    /// Statistics calculation errors
    #[error("Statistics error: {0}")]
    Statistics(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new tool invocation error
    pub fn tool_invocation<S: Into<String>>(message: S) -> Self {
        Self::ToolInvocation(message.into())
    }

    /// Create a new tool output error
    pub fn tool_output<S: Into<String>>(message: S) -> Self {
        Self::ToolOutput(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new report error
    pub fn report<S: Into<String>>(message: S) -> Self {
        Self::Report(message.into())
    }

    /// Create a new statistics error
    pub fn statistics<S: Into<String>>(message: S) -> Self {
        Self::Statistics(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::ToolInvocation(_) => "TOOL",
            Self::ToolOutput(_) => "OUTPUT",
            Self::Timeout(_) => "TIMEOUT",
            Self::Report(_) => "REPORT",
            Self::Statistics(_) => "STATS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether a measurement run that failed with this error may simply be skipped
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ToolInvocation(_) | Self::ToolOutput(_) | Self::Timeout(_) | Self::Parse(_) => true,
            Self::Config(_) | Self::Validation(_) | Self::Io(_) | Self::Report(_) => false,
            Self::Statistics(_) | Self::Internal(_) => false,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check buffer sizes, bandwidth and run count values.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check file permissions and disk space.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of your input data or configuration files.", msg)
            }
            Self::ToolInvocation(msg) => {
                format!("iperf3 failed: {}\n\nSuggestion: Make sure iperf3 is installed and a server is running on the target (iperf3 -s).", msg)
            }
            Self::ToolOutput(msg) => {
                format!("Unexpected iperf3 output: {}\n\nSuggestion: Check that your iperf3 version supports JSON output (-J).", msg)
            }
            Self::Timeout(msg) => {
                format!("Run timed out: {}\n\nSuggestion: Increase the value passed to --timeout or check the target server.", msg)
            }
            Self::Report(msg) => {
                format!("Could not write the report: {}\n\nSuggestion: Check the output directory and its permissions.", msg)
            }
            Self::Statistics(msg) => {
                format!("Statistics calculation failed: {}\n\nSuggestion: This may indicate invalid measurement data.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,  // Invalid configuration/usage
            Self::ToolInvocation(_) | Self::ToolOutput(_) => 2,
            Self::Timeout(_) => 3,
            Self::Io(_) | Self::Report(_) => 5,
            Self::Statistics(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Same variant with `context` prefixed to the message
    fn with_message_prefix(self, context: &str) -> Self {
        let prefix = |msg: String| format!("{}: {}", context, msg);
        match self {
            Self::Config(msg) => Self::Config(prefix(msg)),
            Self::Validation(msg) => Self::Validation(prefix(msg)),
            Self::Io(msg) => Self::Io(prefix(msg)),
            Self::Parse(msg) => Self::Parse(prefix(msg)),
            Self::ToolInvocation(msg) => Self::ToolInvocation(prefix(msg)),
            Self::ToolOutput(msg) => Self::ToolOutput(prefix(msg)),
            Self::Timeout(msg) => Self::Timeout(prefix(msg)),
            Self::Report(msg) => Self::Report(prefix(msg)),
            Self::Statistics(msg) => Self::Statistics(prefix(msg)),
            Self::Internal(msg) => Self::Internal(prefix(msg)),
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::ToolInvocation(_) | Self::ToolOutput(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Io(_) | Self::Report(_) | Self::Statistics(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> Self {
        Self::report(format!("CSV error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::parse(format!("Float parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(error: tokio::time::error::Elapsed) -> Self {
        Self::timeout(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Prefixes context to an error while keeping its category
pub trait ErrorContext<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    fn context(self, message: &'static str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let error: AppError = e.into();
            error.with_message_prefix(&f())
        })
    }

    fn context(self, message: &'static str) -> Result<T> {
        self.with_context(|| message.to_string())
    }
}

/// Error reporter for structured error logging and user feedback
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_error = AppError::config("Invalid configuration");
        assert_eq!(config_error.category(), "CONFIG");
        assert!(!config_error.is_recoverable());
        assert_eq!(config_error.exit_code(), 1);

        let tool_error = AppError::tool_invocation("iperf3 exited with status 1");
        assert_eq!(tool_error.category(), "TOOL");
        assert!(tool_error.is_recoverable());
        assert_eq!(tool_error.exit_code(), 2);
    }

    #[test]
    fn test_error_display() {
        let error = AppError::tool_output("missing end.sum_received");
        let display = error.to_string();
        assert!(display.contains("Tool output error"));
        assert!(display.contains("missing end.sum_received"));
    }

    #[test]
    fn test_error_categories() {
        let errors = [
            AppError::config("config"),
            AppError::validation("validation"),
            AppError::io("io"),
            AppError::parse("parse"),
            AppError::tool_invocation("tool"),
            AppError::tool_output("output"),
            AppError::timeout("timeout"),
            AppError::report("report"),
            AppError::statistics("stats"),
            AppError::internal("internal"),
        ];

        let expected_categories = [
            "CONFIG", "VALIDATION", "IO", "PARSE", "TOOL",
            "OUTPUT", "TIMEOUT", "REPORT", "STATS", "INTERNAL",
        ];

        for (error, expected) in errors.iter().zip(expected_categories.iter()) {
            assert_eq!(error.category(), *expected);
        }
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(AppError::tool_invocation("test").is_recoverable());
        assert!(AppError::tool_output("test").is_recoverable());
        assert!(AppError::timeout("test").is_recoverable());
        assert!(AppError::parse("test").is_recoverable());

        assert!(!AppError::config("test").is_recoverable());
        assert!(!AppError::report("test").is_recoverable());
        assert!(!AppError::io("test").is_recoverable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("test").exit_code(), 1);
        assert_eq!(AppError::tool_invocation("test").exit_code(), 2);
        assert_eq!(AppError::timeout("test").exit_code(), 3);
        assert_eq!(AppError::report("test").exit_code(), 5);
        assert_eq!(AppError::statistics("test").exit_code(), 6);
        assert_eq!(AppError::internal("test").exit_code(), 99);
    }

    #[test]
    fn test_user_friendly_messages() {
        let error = AppError::tool_invocation("unable to connect to server");
        let message = error.user_friendly_message();
        assert!(message.contains("iperf3 failed"));
        assert!(message.contains("Suggestion:"));
        assert!(message.contains("unable to connect to server"));
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "iperf3 not found");
        let app_error: AppError = io_error.into();
        assert_eq!(app_error.category(), "IO");

        let parse_error = "not_a_number".parse::<u32>().unwrap_err();
        let app_error: AppError = parse_error.into();
        assert_eq!(app_error.category(), "PARSE");

        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let app_error: AppError = json_error.into();
        assert_eq!(app_error.category(), "PARSE");
        assert!(app_error.to_string().contains("JSON parse error"));
    }

    #[test]
    fn test_dotenv_error_conversion() {
        let dotenv_error = dotenv::Error::LineParse(".env".to_string(), 1);
        let app_error: AppError = dotenv_error.into();
        assert_eq!(app_error.category(), "CONFIG");
        assert!(app_error.to_string().contains("Environment file error"));
    }

    #[test]
    fn test_error_context_trait() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "Permission denied"
        ));

        let with_context = result.with_context(|| "While creating output directory".to_string());
        let error = with_context.unwrap_err();
        assert_eq!(error.category(), "IO");
        assert_eq!(error.exit_code(), 5);
        assert_eq!(
            error.to_string(),
            "I/O error: While creating output directory: Permission denied"
        );

        let error = Err::<(), _>(AppError::tool_output("missing end"))
            .context("Reading report")
            .unwrap_err();
        assert_eq!(error.category(), "OUTPUT");
        assert!(error.is_recoverable());
        assert!(error.to_string().ends_with("Reading report: missing end"));
    }

    #[test]
    fn test_console_formatting() {
        let error = AppError::config("Test error");
        let formatted_no_color = error.format_for_console(false);
        let formatted_color = error.format_for_console(true);

        assert_eq!(formatted_no_color, "[CONFIG] Configuration error: Test error");
        assert!(formatted_color.contains("CONFIG"));
        assert!(formatted_color.contains("Test error"));
    }
}
