//! Interactive operations that fill the pool from the terminal.

use super::{input_set, Operation, OperationResult, QueueContext};
use crate::error::CliResult;
use crate::parameter::{ParameterName, ParameterPool};
use crate::services::Services;
use crate::terminal::{ask_parameters, derive_endpoints};
use std::collections::BTreeSet;

/// Ask for whatever the rest of the queue needs and the pool does not have.
///
/// Two things happen before the missing set is computed. The endpoints are
/// derived from the region so a region on the command line or in the config
/// file never triggers an endpoint question. And when a database is enabled,
/// this operation's own input set grows by the database parameters, which
/// makes them part of the queue's requirements from this step onward.
pub struct AskForMissingParameterOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

impl AskForMissingParameterOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: BTreeSet::new(),
        }
    }
}

impl Operation for AskForMissingParameterOperation {
    fn name(&self) -> &'static str {
        "AskForMissingParameter"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        context: &QueueContext,
    ) -> CliResult<OperationResult> {
        if pool.has(ParameterName::Region) {
            let source = pool.get_source(ParameterName::Region)?;
            derive_endpoints(pool, source)?;
        }

        if pool.bool_value(ParameterName::DatabaseEnabled).unwrap_or(false) {
            self.inputs.extend([
                ParameterName::DatabaseMasterPassword,
                ParameterName::DatabaseSnapshotName,
                ParameterName::DatabaseDeletionPolicy,
            ]);
        }

        let required = context.required_with(&self.inputs);
        let missing: BTreeSet<ParameterName> = required
            .difference(&pool.parameter_names())
            .copied()
            .collect();
        if missing.is_empty() {
            return Ok(OperationResult::new(self.name()));
        }

        log::info!("Asking for {} missing parameter(s).", missing.len());
        ask_parameters(
            self.services.terminal.as_ref(),
            self.services.client.as_ref(),
            pool,
            &missing,
            true,
        )?;
        Ok(OperationResult::new(self.name()))
    }
}

/// The `init` questionnaire: always walk the full set of persisted
/// parameters, presenting current values as defaults.
pub struct AskForConfigFileParameterOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

/// Everything `init` asks about, whether or not a value is already known.
const CONFIG_QUESTIONS: &[ParameterName] = &[
    ParameterName::AccessKeyId,
    ParameterName::SecretAccessKey,
    ParameterName::Region,
    ParameterName::ApplicationName,
    ParameterName::EnvironmentName,
    ParameterName::SolutionStack,
    ParameterName::DatabaseEnabled,
];

impl AskForConfigFileParameterOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: BTreeSet::new(),
        }
    }
}

impl Operation for AskForConfigFileParameterOperation {
    fn name(&self) -> &'static str {
        "AskForConfigFileParameter"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        ask_parameters(
            self.services.terminal.as_ref(),
            self.services.client.as_ref(),
            pool,
            &input_set(CONFIG_QUESTIONS),
            false,
        )?;

        if pool.bool_value(ParameterName::DatabaseEnabled).unwrap_or(false) {
            ask_parameters(
                self.services.terminal.as_ref(),
                self.services.client.as_ref(),
                pool,
                &input_set(&[
                    ParameterName::DatabaseSnapshotName,
                    ParameterName::DatabaseMasterPassword,
                    ParameterName::DatabaseDeletionPolicy,
                ]),
                false,
            )?;
        }
        Ok(OperationResult::new(self.name()))
    }
}
