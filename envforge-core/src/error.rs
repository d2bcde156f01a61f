//! Error taxonomy for command execution.
//!
//! Operations recover only the specific benign service conditions documented
//! on each operation; everything else propagates unmodified through the
//! operation queue to the top-level invocation.

use crate::api::ServiceError;
use crate::config_file::ConfigFileError;
use crate::parameter::ParameterName;
use crate::process::ProcessError;
use thiserror::Error;

/// Errors that can abort a command workflow.
#[derive(Debug, Error)]
pub enum CliError {
    /// A required parameter was read but never set. Always fatal.
    #[error("parameter \"{0}\" is not set")]
    ParameterNotFound(ParameterName),

    /// A parameter value failed a format or range check.
    #[error("invalid value for \"{name}\": {reason}")]
    Validation {
        name: ParameterName,
        reason: String,
    },

    /// The remote service returned an error the operation did not recover.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A config or credential file could not be read or written.
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    /// An external process failed or could not be started.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A remote workflow step did not reach its expected state.
    #[error("{0}")]
    OperationFailed(String),

    /// The user declined a confirmation prompt.
    #[error("command cancelled")]
    Aborted,

    /// Input was required but stdin is not attached to a terminal.
    #[error("cannot prompt for input: stdin is not a terminal")]
    NotInteractive,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
