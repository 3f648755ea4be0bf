//! CLI error type.

use std::fmt;
use std::process;

use console::style;
use tabhost::app::AppError;
use tabhost::config::ConfigFileError;
use tabhost::log::LoggingError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Bad configuration or arguments.
    Config(String),

    /// Failed to load or save `config.ini`.
    ConfigFile(ConfigFileError),

    /// Failed to start logging.
    Logging(LoggingError),

    /// Failed to start the application.
    App(AppError),

    /// A simulation script line could not be parsed.
    Script { line: usize, message: String },

    /// The launch request was refused.
    Rejected(String),

    Io(std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Rejected(_) => 2,
            _ => 1,
        }
    }

    /// Print the error and exit.
    pub fn exit(&self) -> ! {
        eprintln!("{} {}", style("Error:").red().bold(), self);
        process::exit(self.exit_code());
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Script { line, message } => write!(f, "Script line {}: {}", line, message),
            CliError::Rejected(request) => write!(f, "Launch request rejected: {}", request),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::App(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Config(_) | CliError::Script { .. } | CliError::Rejected(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Rejected("x".into()).exit_code(), 2);
        assert_eq!(CliError::Config("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_script_error_display() {
        let err = CliError::Script {
            line: 3,
            message: "unknown command 'fly'".to_string(),
        };
        assert_eq!(err.to_string(), "Script line 3: unknown command 'fly'");
    }
}
