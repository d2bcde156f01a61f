//! Workflow steps that talk to neither the service nor the filesystem.

use super::{Operation, OperationResult, QueueContext};
use crate::constants;
use crate::error::{CliError, CliResult};
use crate::parameter::{ParameterName, ParameterPool, ParameterValidator};
use crate::prompt;
use crate::services::Services;
use std::collections::BTreeSet;
use std::time::Duration;

/// Validate every parameter currently in the pool before anything talks to
/// the service.
pub struct ValidateParameterOperation {
    inputs: BTreeSet<ParameterName>,
}

impl ValidateParameterOperation {
    pub fn new(_services: Services) -> Self {
        Self {
            inputs: BTreeSet::new(),
        }
    }
}

impl Operation for ValidateParameterOperation {
    fn name(&self) -> &'static str {
        "ValidateParameter"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        ParameterValidator::validate_all(pool)?;
        Ok(OperationResult::new(self.name()))
    }
}

/// Confirm a destructive command with the user. `--force` skips the
/// question; declining cancels the whole queue.
pub struct AskConfirmationOperation {
    services: Services,
    message: String,
    inputs: BTreeSet<ParameterName>,
}

impl AskConfirmationOperation {
    pub fn new(services: Services, message: impl Into<String>) -> Self {
        Self {
            services,
            message: message.into(),
            inputs: BTreeSet::new(),
        }
    }
}

impl Operation for AskConfirmationOperation {
    fn name(&self) -> &'static str {
        "AskConfirmation"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        if pool.bool_value(ParameterName::Force).unwrap_or(false) {
            log::debug!("Confirmation skipped by --force.");
            return Ok(OperationResult::new(self.name()));
        }
        if self.services.terminal.confirm(&self.message, false)? {
            Ok(OperationResult::new(self.name()))
        } else {
            Err(CliError::Aborted)
        }
    }
}

/// Give the service a moment to register a freshly requested launch before
/// the first status poll.
pub struct SleepOperation {
    duration: Duration,
    inputs: BTreeSet<ParameterName>,
}

impl SleepOperation {
    pub fn new(_services: Services) -> Self {
        Self {
            duration: Duration::from_secs(constants::SLEEP_AFTER_LAUNCH_SECS),
            inputs: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

impl Operation for SleepOperation {
    fn name(&self) -> &'static str {
        "Sleep"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        _pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        prompt::info("Waiting for the launch request to settle.");
        std::thread::sleep(self.duration);
        Ok(OperationResult::new(self.name()))
    }
}
