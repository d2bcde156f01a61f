//! The shared parameter pool and its source-priority resolution protocol.

use super::{Parameter, ParameterName, ParameterSource, ParameterValue};
use crate::error::{CliError, CliResult};
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from parameter name to the currently winning [`Parameter`].
///
/// Created once per command invocation and populated incrementally: defaults
/// first, then command-line arguments, then whatever the operations of the
/// compiled workflow load or ask for.
#[derive(Debug, Default)]
pub struct ParameterPool {
    entries: BTreeMap<ParameterName, Parameter>,
}

impl ParameterPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: ParameterName) -> bool {
        self.entries.contains_key(&name)
    }

    /// Insert or replace a parameter under the resolution protocol:
    ///
    /// - absent name: insert unconditionally;
    /// - `force`: replace unconditionally, regardless of relative priority;
    /// - otherwise: replace only when the incoming source outranks the
    ///   existing one; a lower or equal rank is a silent no-op.
    pub fn put(&mut self, parameter: Parameter, force: bool) {
        let name = parameter.name();
        match self.entries.get(&name) {
            None => {
                self.entries.insert(name, parameter);
            }
            Some(existing) => {
                if force || parameter.source().is_ahead(existing.source()) {
                    self.entries.insert(name, parameter);
                } else {
                    log::debug!(
                        "Ignored put of \"{name}\" from {:?}: {:?} already holds it.",
                        parameter.source(),
                        existing.source()
                    );
                }
            }
        }
    }

    pub fn get(&self, name: ParameterName) -> CliResult<&Parameter> {
        self.entries
            .get(&name)
            .ok_or(CliError::ParameterNotFound(name))
    }

    pub fn get_value(&self, name: ParameterName) -> CliResult<&ParameterValue> {
        self.get(name).map(Parameter::value)
    }

    pub fn get_source(&self, name: ParameterName) -> CliResult<ParameterSource> {
        self.get(name).map(Parameter::source)
    }

    /// String value of `name`, failing when absent or not a string.
    pub fn str_value(&self, name: ParameterName) -> CliResult<&str> {
        self.get_value(name)?
            .as_str()
            .ok_or_else(|| CliError::Validation {
                name,
                reason: "expected a string value".to_string(),
            })
    }

    /// Boolean value of `name`, failing when absent or not a boolean.
    pub fn bool_value(&self, name: ParameterName) -> CliResult<bool> {
        self.get_value(name)?
            .as_bool()
            .ok_or_else(|| CliError::Validation {
                name,
                reason: "expected a boolean value".to_string(),
            })
    }

    /// Integer value of `name`, failing when absent or not an integer.
    pub fn int_value(&self, name: ParameterName) -> CliResult<u64> {
        self.get_value(name)?
            .as_int()
            .ok_or_else(|| CliError::Validation {
                name,
                reason: "expected an integer value".to_string(),
            })
    }

    pub fn parameter_names(&self) -> BTreeSet<ParameterName> {
        self.entries.keys().copied().collect()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.entries.values()
    }
}
