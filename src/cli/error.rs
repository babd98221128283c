//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{DomainError, Refusal};
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),

    /// Expected refusal from the core (nothing changed)
    #[error("{0}")]
    Refused(Refusal),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Refused(_) => crate::exitcode::REFUSED,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                    ApplicationError::Domain(domain) => match domain {
                        DomainError::InvalidModulus { .. } | DomainError::IndexOverflow(_) => {
                            crate::exitcode::DATAERR
                        }
                        DomainError::FormNotConfigured => crate::exitcode::CONFIG,
                        DomainError::InvalidFormLink(_)
                        | DomainError::MissingField(_)
                        | DomainError::UnknownFormField(_) => crate::exitcode::USAGE,
                    },
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_refusal_when_exit_code_then_refused() {
        let err = CliError::Refused(Refusal::LastService);
        assert_eq!(err.exit_code(), exitcode::REFUSED);
        assert_eq!(err.to_string(), Refusal::LastService.to_string());
    }

    #[test]
    fn given_invalid_modulus_when_exit_code_then_data_error() {
        let err: CliError =
            ApplicationError::from(DomainError::InvalidModulus { modulus: 0 }).into();
        assert_eq!(err.exit_code(), exitcode::DATAERR);
    }

    #[test]
    fn given_config_error_when_exit_code_then_config() {
        let err: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exitcode::CONFIG);
    }

    #[test]
    fn given_io_error_when_exit_code_then_ioerr() {
        let err: CliError = InfraError::io(
            "read confirmation",
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "closed"),
        )
        .into();
        assert_eq!(err.exit_code(), exitcode::IOERR);
        assert_eq!(err.to_string(), "I/O error: read confirmation");
    }
}
