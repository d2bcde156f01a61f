//! Environment lifecycle operations, including the polling waits.

use super::{input_set, Operation, OperationResult, QueueContext};
use crate::api::model::{
    CreateEnvironmentRequest, EnvironmentDescription, EnvironmentHealth, EnvironmentStatus,
    OptionSetting,
};
use crate::api::{ApiCredentials, ServiceErrorKind};
use crate::config_file;
use crate::constants;
use crate::error::{CliError, CliResult};
use crate::parameter::{Parameter, ParameterName, ParameterPool, ParameterSource};
use crate::prompt;
use crate::services::Services;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::{Duration, Instant};

fn credential_inputs(extra: &[ParameterName]) -> BTreeSet<ParameterName> {
    let mut inputs = input_set(&[
        ParameterName::AccessKeyId,
        ParameterName::SecretAccessKey,
        ParameterName::ServiceEndpoint,
    ]);
    inputs.extend(extra.iter().copied());
    inputs
}

/// Database option settings derived from the pool, when a database was
/// requested.
fn database_option_settings(pool: &ParameterPool) -> Vec<OptionSetting> {
    if !pool.bool_value(ParameterName::DatabaseEnabled).unwrap_or(false) {
        return Vec::new();
    }
    let mut settings = vec![OptionSetting::new(
        constants::DATABASE_NAMESPACE,
        "DBEnabled",
        "true",
    )];
    if let Ok(password) = pool.str_value(ParameterName::DatabaseMasterPassword) {
        settings.push(OptionSetting::new(
            constants::DATABASE_NAMESPACE,
            "DBMasterPassword",
            password,
        ));
    }
    if let Ok(snapshot) = pool.str_value(ParameterName::DatabaseSnapshotName) {
        settings.push(OptionSetting::new(
            constants::DATABASE_NAMESPACE,
            "DBSnapshotIdentifier",
            snapshot,
        ));
    }
    if let Ok(policy) = pool.str_value(ParameterName::DatabaseDeletionPolicy) {
        settings.push(OptionSetting::new(
            constants::DATABASE_NAMESPACE,
            "DBDeletionPolicy",
            policy,
        ));
    }
    settings
}

pub struct CreateEnvironmentOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

impl CreateEnvironmentOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: credential_inputs(&[
                ParameterName::ApplicationName,
                ParameterName::EnvironmentName,
                ParameterName::ApplicationVersionName,
                ParameterName::SolutionStack,
            ]),
        }
    }
}

impl Operation for CreateEnvironmentOperation {
    fn name(&self) -> &'static str {
        "CreateEnvironment"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn output_parameters(&self) -> BTreeSet<ParameterName> {
        input_set(&[ParameterName::EnvironmentId])
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        let credentials = ApiCredentials::from_pool(pool)?;
        let environment_name = pool.str_value(ParameterName::EnvironmentName)?.to_string();
        let request = CreateEnvironmentRequest {
            application_name: pool.str_value(ParameterName::ApplicationName)?.to_string(),
            environment_name: environment_name.clone(),
            version_label: pool
                .str_value(ParameterName::ApplicationVersionName)
                .ok()
                .map(str::to_owned),
            solution_stack: pool
                .str_value(ParameterName::SolutionStack)
                .ok()
                .map(str::to_owned),
            option_settings: database_option_settings(pool),
        };

        prompt::action(format!("Launching environment \"{environment_name}\"."));
        match self.services.client.create_environment(&credentials, &request) {
            Ok(response) => {
                if let Some(environment_id) = response.result.environment_id {
                    pool.put(
                        Parameter::new(
                            ParameterName::EnvironmentId,
                            environment_id.as_str(),
                            ParameterSource::OperationOutput,
                        ),
                        false,
                    );
                }
                Ok(OperationResult::new(self.name())
                    .with_request_id(response.request_id)
                    .with_message(format!("Launched environment \"{environment_name}\".")))
            }
            Err(err) if err.kind() == Some(ServiceErrorKind::AlreadyExists) => {
                log::info!("Environment \"{environment_name}\" already exists, continuing.");
                Ok(OperationResult::new(self.name())
                    .with_message(format!("Environment \"{environment_name}\" already exists.")))
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub struct DescribeEnvironmentOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

impl DescribeEnvironmentOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: credential_inputs(&[
                ParameterName::ApplicationName,
                ParameterName::EnvironmentName,
            ]),
        }
    }

    fn describe_line(environment: &EnvironmentDescription) -> String {
        let url = environment
            .cname
            .as_deref()
            .or(environment.endpoint_url.as_deref())
            .unwrap_or("(no URL yet)");
        let id = environment.environment_id.as_deref().unwrap_or("-");
        let stack = environment.solution_stack_name.as_deref().unwrap_or("-");
        format!(
            "Environment \"{}\" [{id}] on \"{stack}\": {} ({}), {url}",
            environment.environment_name, environment.status, environment.health
        )
    }
}

impl Operation for DescribeEnvironmentOperation {
    fn name(&self) -> &'static str {
        "DescribeEnvironment"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        let credentials = ApiCredentials::from_pool(pool)?;
        let application_name = pool.str_value(ParameterName::ApplicationName)?.to_string();
        let environment_name = pool.str_value(ParameterName::EnvironmentName)?.to_string();

        let response = self.services.client.describe_environments(
            &credentials,
            &application_name,
            Some(&environment_name),
        )?;
        let mut result = OperationResult::new(self.name()).with_request_id(response.request_id);
        match response.result.first() {
            Some(environment) => {
                let line = Self::describe_line(environment);
                prompt::result(&line);
                if let Ok(payload) = serde_json::to_value(environment) {
                    result = result.with_payload(payload);
                }
                result = result.with_message(line);
            }
            None => {
                let line = format!("Environment \"{environment_name}\" does not exist.");
                prompt::result(&line);
                result = result.with_message(line);
            }
        }
        Ok(result)
    }
}

pub struct UpdateEnvironmentOptionSettingOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

impl UpdateEnvironmentOptionSettingOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: credential_inputs(&[
                ParameterName::EnvironmentName,
                ParameterName::OptionSettingFile,
            ]),
        }
    }
}

impl Operation for UpdateEnvironmentOptionSettingOperation {
    fn name(&self) -> &'static str {
        "UpdateEnvironmentOptionSetting"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        let credentials = ApiCredentials::from_pool(pool)?;
        let environment_name = pool.str_value(ParameterName::EnvironmentName)?.to_string();
        let file = pool.str_value(ParameterName::OptionSettingFile)?.to_string();

        let option_settings = match config_file::load_option_settings(Path::new(&file)) {
            Ok(settings) => settings,
            Err(config_file::ConfigFileError::NotFound(_)) => {
                prompt::info(format!(
                    "No local option settings found at \"{file}\", updating with none."
                ));
                log::warn!("Option setting file \"{file}\" is missing.");
                Vec::new()
            }
            Err(err) => return Err(err.into()),
        };

        prompt::action(format!("Updating environment \"{environment_name}\"."));
        match self.services.client.update_environment(
            &credentials,
            &environment_name,
            &option_settings,
        ) {
            Ok(response) => Ok(OperationResult::new(self.name())
                .with_request_id(response.request_id)
                .with_message(format!("Updating environment \"{environment_name}\"."))),
            Err(err) if err.kind() == Some(ServiceErrorKind::InProgress) => {
                log::info!("An update of \"{environment_name}\" is already in progress.");
                Ok(OperationResult::new(self.name()).with_message(format!(
                    "An update of \"{environment_name}\" is already in progress."
                )))
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub struct TerminateEnvironmentOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

impl TerminateEnvironmentOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: credential_inputs(&[ParameterName::EnvironmentName]),
        }
    }
}

impl Operation for TerminateEnvironmentOperation {
    fn name(&self) -> &'static str {
        "TerminateEnvironment"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        let credentials = ApiCredentials::from_pool(pool)?;
        let environment_name = pool.str_value(ParameterName::EnvironmentName)?.to_string();

        prompt::action(format!("Stopping environment \"{environment_name}\"."));
        match self
            .services
            .client
            .terminate_environment(&credentials, &environment_name)
        {
            Ok(response) => Ok(OperationResult::new(self.name())
                .with_request_id(response.request_id)
                .with_message(format!("Stopping environment \"{environment_name}\"."))),
            Err(err) if err.kind() == Some(ServiceErrorKind::NotFound) => {
                log::info!("Environment \"{environment_name}\" does not exist, nothing to stop.");
                Ok(OperationResult::new(self.name())
                    .with_message(format!("Environment \"{environment_name}\" does not exist.")))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Poll until the environment reaches `expected`, printing new events as
/// they appear. Times out after the pool's wait timeout.
fn wait_for_environment(
    services: &Services,
    pool: &ParameterPool,
    expected: EnvironmentStatus,
    poll_interval: Duration,
) -> CliResult<String> {
    let credentials = ApiCredentials::from_pool(pool)?;
    let application_name = pool.str_value(ParameterName::ApplicationName)?.to_string();
    let environment_name = pool.str_value(ParameterName::EnvironmentName)?.to_string();
    let timeout = Duration::from_secs(
        pool.int_value(ParameterName::WaitTimeout)
            .unwrap_or(constants::DEFAULT_WAIT_TIMEOUT_SECS),
    );
    let deadline = Instant::now() + timeout;
    let mut seen_events = 0usize;

    loop {
        let response = services.client.describe_environments(
            &credentials,
            &application_name,
            Some(&environment_name),
        )?;
        let environment = response.result.into_iter().next();

        match &environment {
            None if expected == EnvironmentStatus::Terminated => {
                return Ok(format!("Environment \"{environment_name}\" is terminated."));
            }
            None => {
                return Err(CliError::OperationFailed(format!(
                    "environment \"{environment_name}\" disappeared while waiting"
                )));
            }
            Some(environment) => {
                // Events arrive newest first; print the unseen tail oldest
                // first so the console reads chronologically.
                if let Ok(events) = services.client.describe_events(
                    &credentials,
                    &application_name,
                    &environment_name,
                ) {
                    let events = events.result;
                    if events.len() > seen_events {
                        for event in events[..events.len() - seen_events].iter().rev() {
                            prompt::info(format!("{}: {}", event.severity, event.message));
                        }
                        seen_events = events.len();
                    }
                }

                if environment.status == expected {
                    if expected == EnvironmentStatus::Ready
                        && environment.health == EnvironmentHealth::Red
                    {
                        return Err(CliError::OperationFailed(format!(
                            "environment \"{environment_name}\" is {} but its health is Red",
                            environment.status
                        )));
                    }
                    return Ok(format!(
                        "Environment \"{environment_name}\" is {} ({}).",
                        environment.status, environment.health
                    ));
                }
                if environment.status.is_terminal() {
                    return Err(CliError::OperationFailed(format!(
                        "environment \"{environment_name}\" reached {} while waiting for {expected}",
                        environment.status
                    )));
                }
                prompt::info(format!(
                    "Environment \"{environment_name}\" is {}.",
                    environment.status
                ));
            }
        }

        if Instant::now() >= deadline {
            return Err(CliError::OperationFailed(format!(
                "timed out after {}s waiting for environment \"{environment_name}\" to become {expected}",
                timeout.as_secs()
            )));
        }
        std::thread::sleep(poll_interval);
    }
}

macro_rules! wait_operation {
    ($(#[$doc:meta])* $name:ident, $op_name:literal, $expected:expr) => {
        $(#[$doc])*
        pub struct $name {
            services: Services,
            inputs: BTreeSet<ParameterName>,
            poll_interval: Duration,
        }

        impl $name {
            pub fn new(services: Services) -> Self {
                Self {
                    services,
                    inputs: credential_inputs(&[
                        ParameterName::ApplicationName,
                        ParameterName::EnvironmentName,
                        ParameterName::WaitTimeout,
                    ]),
                    poll_interval: Duration::from_secs(constants::POLL_INTERVAL_SECS),
                }
            }

            #[must_use]
            pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
                self.poll_interval = poll_interval;
                self
            }
        }

        impl Operation for $name {
            fn name(&self) -> &'static str {
                $op_name
            }

            fn input_parameters(&self) -> &BTreeSet<ParameterName> {
                &self.inputs
            }

            fn execute(
                &mut self,
                pool: &mut ParameterPool,
                _context: &QueueContext,
            ) -> CliResult<OperationResult> {
                let message =
                    wait_for_environment(&self.services, pool, $expected, self.poll_interval)?;
                prompt::result(&message);
                Ok(OperationResult::new(self.name()).with_message(message))
            }
        }
    };
}

wait_operation!(
    /// Wait for a freshly launched environment to become ready.
    WaitForCreateEnvironmentFinishOperation,
    "WaitForCreateEnvironmentFinish",
    EnvironmentStatus::Ready
);

wait_operation!(
    /// Wait for an option setting update to settle back to ready.
    WaitForUpdateEnvironmentOptionSettingFinishOperation,
    "WaitForUpdateEnvironmentOptionSettingFinish",
    EnvironmentStatus::Ready
);

wait_operation!(
    /// Wait for a stopping environment to finish terminating.
    WaitForTerminateEnvironmentFinishOperation,
    "WaitForTerminateEnvironmentFinish",
    EnvironmentStatus::Terminated
);
