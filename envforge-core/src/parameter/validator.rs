//! Format and range checks for parameter values.

use super::{ParameterName, ParameterPool, ParameterSource};
use crate::constants;
use crate::error::{CliError, CliResult};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn environment_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new("^[A-Za-z0-9][A-Za-z0-9-]{3,22}$").expect("static regex must compile")
    })
}

/// Validates parameter values against the service's format rules.
pub struct ParameterValidator;

impl ParameterValidator {
    /// Validate every parameter currently in the pool.
    pub fn validate_all(pool: &ParameterPool) -> CliResult<()> {
        for parameter in pool.parameters() {
            Self::validate_one(pool, parameter.name())?;
        }
        Ok(())
    }

    /// Validate only the parameters that came from `source`. Used to reject
    /// malformed command-line arguments before the workflow starts.
    pub fn validate_source(pool: &ParameterPool, source: ParameterSource) -> CliResult<()> {
        for parameter in pool.parameters() {
            if parameter.source() == source {
                Self::validate_one(pool, parameter.name())?;
            }
        }
        Ok(())
    }

    fn validate_one(pool: &ParameterPool, name: ParameterName) -> CliResult<()> {
        match name {
            ParameterName::Region => {
                let region = pool.str_value(name)?;
                if !constants::is_known_region(region) {
                    return Err(CliError::Validation {
                        name,
                        reason: format!("\"{region}\" is not a recognized service region"),
                    });
                }
            }
            ParameterName::ApplicationName => {
                let value = pool.str_value(name)?;
                if value.is_empty() || value.len() > 100 {
                    return Err(CliError::Validation {
                        name,
                        reason: "application name must be 1 to 100 characters".to_string(),
                    });
                }
            }
            ParameterName::EnvironmentName => {
                let value = pool.str_value(name)?;
                if !environment_name_re().is_match(value) {
                    return Err(CliError::Validation {
                        name,
                        reason: format!(
                            "\"{value}\" must be 4 to {} letters, digits, or hyphens and \
                             start with a letter or digit",
                            constants::ENVIRONMENT_NAME_MAX_LEN
                        ),
                    });
                }
            }
            ParameterName::AccessKeyId | ParameterName::SecretAccessKey => {
                let value = pool.str_value(name)?;
                if value.is_empty() || value.chars().any(char::is_whitespace) {
                    return Err(CliError::Validation {
                        name,
                        reason: "credential must be non-empty and contain no whitespace"
                            .to_string(),
                    });
                }
            }
            ParameterName::ServiceEndpoint | ParameterName::DatabaseEndpoint => {
                let value = pool.str_value(name)?;
                let url = Url::parse(value).map_err(|err| CliError::Validation {
                    name,
                    reason: format!("\"{value}\" is not a valid URL: {err}"),
                })?;
                if url.scheme() != "https" && url.scheme() != "http" {
                    return Err(CliError::Validation {
                        name,
                        reason: format!("\"{value}\" must use http or https"),
                    });
                }
            }
            ParameterName::SolutionStack => {
                if pool.str_value(name)?.is_empty() {
                    return Err(CliError::Validation {
                        name,
                        reason: "solution stack must not be empty".to_string(),
                    });
                }
            }
            ParameterName::WaitTimeout => {
                if pool.int_value(name)? == 0 {
                    return Err(CliError::Validation {
                        name,
                        reason: "wait timeout must be greater than zero".to_string(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::Parameter;

    fn pool_with(name: ParameterName, value: &str, source: ParameterSource) -> ParameterPool {
        let mut pool = ParameterPool::new();
        pool.put(Parameter::new(name, value, source), false);
        pool
    }

    #[test]
    fn accepts_known_region() {
        let pool = pool_with(
            ParameterName::Region,
            "us-west-2",
            ParameterSource::CliArgument,
        );
        assert!(ParameterValidator::validate_all(&pool).is_ok());
    }

    #[test]
    fn rejects_unknown_region() {
        let pool = pool_with(
            ParameterName::Region,
            "antarctica-1",
            ParameterSource::CliArgument,
        );
        match ParameterValidator::validate_all(&pool) {
            Err(CliError::Validation { name, .. }) => assert_eq!(name, ParameterName::Region),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn rejects_short_environment_name() {
        let pool = pool_with(
            ParameterName::EnvironmentName,
            "ab",
            ParameterSource::Terminal,
        );
        assert!(ParameterValidator::validate_all(&pool).is_err());
    }

    #[test]
    fn accepts_typical_environment_name() {
        let pool = pool_with(
            ParameterName::EnvironmentName,
            "myapp-env",
            ParameterSource::Terminal,
        );
        assert!(ParameterValidator::validate_all(&pool).is_ok());
    }

    #[test]
    fn validate_source_ignores_other_sources() {
        let mut pool = ParameterPool::new();
        // Bad region, but loaded from the config file rather than the CLI.
        pool.put(
            Parameter::new(ParameterName::Region, "nowhere", ParameterSource::ConfigFile),
            false,
        );
        assert!(
            ParameterValidator::validate_source(&pool, ParameterSource::CliArgument).is_ok()
        );
        assert!(ParameterValidator::validate_all(&pool).is_err());
    }

    #[test]
    fn rejects_whitespace_in_credentials() {
        let pool = pool_with(
            ParameterName::AccessKeyId,
            "AKIA BAD",
            ParameterSource::CliArgument,
        );
        assert!(ParameterValidator::validate_all(&pool).is_err());
    }
}
