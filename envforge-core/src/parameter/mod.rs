//! Named, sourced, immutable configuration values.
//!
//! Every piece of configuration the tool works with is a [`Parameter`]: a
//! recognized name, a typed value, and the provenance [`ParameterSource`] it
//! came from. The source carries a fixed priority rank that governs which of
//! two competing values for the same name wins (see [`ParameterPool::put`]).

mod defaults;
mod pool;
mod validator;

pub use defaults::fill_defaults;
pub use pool::ParameterPool;
pub use validator::ParameterValidator;

use std::fmt;

/// Closed set of parameter names the tool recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParameterName {
    AccessKeyId,
    SecretAccessKey,
    Region,
    ServiceEndpoint,
    ApplicationName,
    ApplicationVersionName,
    EnvironmentName,
    EnvironmentId,
    SolutionStack,
    OriginalSolutionStack,
    OptionSettingFile,
    CredentialFile,
    DatabaseEnabled,
    DatabaseSnapshotName,
    DatabaseMasterPassword,
    DatabaseDeletionPolicy,
    DatabaseEndpoint,
    WaitTimeout,
    Verbose,
    Force,
}

impl ParameterName {
    /// Stable string form, also used as the key in the project config file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessKeyId => "AccessKeyId",
            Self::SecretAccessKey => "SecretAccessKey",
            Self::Region => "Region",
            Self::ServiceEndpoint => "ServiceEndpoint",
            Self::ApplicationName => "ApplicationName",
            Self::ApplicationVersionName => "ApplicationVersionName",
            Self::EnvironmentName => "EnvironmentName",
            Self::EnvironmentId => "EnvironmentId",
            Self::SolutionStack => "SolutionStack",
            Self::OriginalSolutionStack => "OriginalSolutionStack",
            Self::OptionSettingFile => "OptionSettingFile",
            Self::CredentialFile => "CredentialFile",
            Self::DatabaseEnabled => "DatabaseEnabled",
            Self::DatabaseSnapshotName => "DatabaseSnapshotName",
            Self::DatabaseMasterPassword => "DatabaseMasterPassword",
            Self::DatabaseDeletionPolicy => "DatabaseDeletionPolicy",
            Self::DatabaseEndpoint => "DatabaseEndpoint",
            Self::WaitTimeout => "WaitTimeout",
            Self::Verbose => "Verbose",
            Self::Force => "Force",
        }
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a parameter value.
///
/// The ordering encodes the resolution rule: a value the user just typed
/// interactively overrides one loaded from a file, while a value supplied on
/// the command line is never silently clobbered by a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParameterSource {
    /// Built-in default.
    Default,
    /// OS environment variable.
    OsEnvironment,
    /// Project config or credential file.
    ConfigFile,
    /// Produced by an earlier operation in the same run.
    OperationOutput,
    /// Command-line argument.
    CliArgument,
    /// Interactive terminal answer.
    Terminal,
}

impl ParameterSource {
    pub fn priority(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::OsEnvironment => 1,
            Self::ConfigFile => 2,
            Self::OperationOutput => 3,
            Self::CliArgument => 4,
            Self::Terminal => 5,
        }
    }

    /// True when `self` outranks `other` (strictly higher priority).
    pub fn is_ahead(self, other: Self) -> bool {
        self.priority() > other.priority()
    }
}

/// Typed parameter value. The expected variant is fixed by the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Str(String),
    Bool(bool),
    Int(u64),
}

impl ParameterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for ParameterValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

/// A named value tagged with its provenance. Immutable once constructed;
/// updating a parameter means constructing a new one.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: ParameterName,
    value: ParameterValue,
    source: ParameterSource,
}

impl Parameter {
    pub fn new(
        name: ParameterName,
        value: impl Into<ParameterValue>,
        source: ParameterSource,
    ) -> Self {
        Self {
            name,
            value: value.into(),
            source,
        }
    }

    pub fn name(&self) -> ParameterName {
        self.name
    }

    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    pub fn source(&self) -> ParameterSource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ordering_matches_priority() {
        assert!(ParameterSource::Terminal.is_ahead(ParameterSource::CliArgument));
        assert!(ParameterSource::CliArgument.is_ahead(ParameterSource::OperationOutput));
        assert!(ParameterSource::OperationOutput.is_ahead(ParameterSource::ConfigFile));
        assert!(ParameterSource::ConfigFile.is_ahead(ParameterSource::OsEnvironment));
        assert!(ParameterSource::OsEnvironment.is_ahead(ParameterSource::Default));
        assert!(!ParameterSource::Terminal.is_ahead(ParameterSource::Terminal));
    }

    #[test]
    fn value_accessors_are_typed() {
        let value = ParameterValue::from("us-east-1");
        assert_eq!(value.as_str(), Some("us-east-1"));
        assert_eq!(value.as_bool(), None);

        let flag = ParameterValue::from(true);
        assert_eq!(flag.as_bool(), Some(true));
        assert_eq!(flag.as_int(), None);
    }
}
