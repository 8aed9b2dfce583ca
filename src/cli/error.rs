//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::{ApplicationError, ReportError};
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Usage(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(e.into())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(DomainError::Render(_)) => crate::exitcode::IOERR,
                ApplicationError::Domain(_) => crate::exitcode::SOFTWARE,
                ApplicationError::Document { .. } => crate::exitcode::DATAERR,
                ApplicationError::Session(_) | ApplicationError::Config { .. } => {
                    crate::exitcode::CONFIG
                }
                ApplicationError::Report(ReportError::InvalidExtension(_)) => {
                    crate::exitcode::USAGE
                }
                ApplicationError::Report(ReportError::Io(_)) => crate::exitcode::IOERR,
                ApplicationError::OperationFailed { .. } => crate::exitcode::NOINPUT,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{EngineKind, SessionError};

    #[test]
    fn test_exit_codes() {
        let usage = CliError::Usage("x".into());
        assert_eq!(usage.exit_code(), crate::exitcode::USAGE);

        let listener: CliError = DomainError::ListenerFailed {
            event: "click".into(),
            label: "img".into(),
            source: "boom".into(),
        }
        .into();
        assert_eq!(listener.exit_code(), crate::exitcode::SOFTWARE);

        let session: CliError =
            ApplicationError::from(SessionError::MissingEngineConfig(EngineKind::Mongodb)).into();
        assert_eq!(session.exit_code(), crate::exitcode::CONFIG);
    }
}
