//! CLI error handling with user-friendly messages.

use std::fmt;
use std::path::PathBuf;
use std::process;
use thumbsheet::builder::BuildError;
use thumbsheet::config::ConfigFileError;
use thumbsheet::server::ServerError;
use thumbsheet::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Config file could not be read, parsed or written
    ConfigFile(ConfigFileError),
    /// Failed to create service
    ServiceCreation(ServiceError),
    /// Sheet build failed
    Build(BuildError),
    /// Failed to write output file
    FileWrite { path: PathBuf, error: std::io::Error },
    /// HTTP server error
    Serve(ServerError),
}

impl CliError {
    /// Prints the error and exits with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Build(BuildError::Fetch(_)) => {
                eprintln!();
                eprintln!("Check that the upstream tile provider is running and that");
                eprintln!("'thumbsheet config get upstream.url' points at it.");
            }
            CliError::Serve(ServerError::Bind { .. }) => {
                eprintln!();
                eprintln!("Another process may be using the port. Pick another with --port");
                eprintln!("or 'thumbsheet config set server.port <PORT>'.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::ServiceCreation(e) => write!(f, "Failed to create service: {}", e),
            CliError::Build(e) => write!(f, "Failed to build sheet: {}", e),
            CliError::FileWrite { path, error } => {
                write!(f, "Failed to write file '{}': {}", path.display(), error)
            }
            CliError::Serve(e) => write!(f, "HTTP server error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::ServiceCreation(e) => Some(e),
            CliError::Build(e) => Some(e),
            CliError::FileWrite { error, .. } => Some(error),
            CliError::Serve(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::ServiceCreation(e)
    }
}

impl From<BuildError> for CliError {
    fn from(e: BuildError) -> Self {
        CliError::Build(e)
    }
}

impl From<ServerError> for CliError {
    fn from(e: ServerError) -> Self {
        CliError::Serve(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thumbsheet::fetch::FetchError;

    #[test]
    fn test_build_error_display() {
        let err: CliError = BuildError::Fetch(FetchError::Timeout { index: 2 }).into();
        assert_eq!(
            err.to_string(),
            "Failed to build sheet: tile 2: request timed out"
        );
    }

    #[test]
    fn test_file_write_has_source() {
        use std::error::Error;
        let err = CliError::FileWrite {
            path: PathBuf::from("/nope/sheet.png"),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/nope/sheet.png"));
        assert!(err.source().is_some());
    }
}
