//! Application version operations.

use super::{input_set, Operation, OperationResult, QueueContext};
use crate::api::{ApiCredentials, ServiceErrorKind};
use crate::error::CliResult;
use crate::parameter::{ParameterName, ParameterPool};
use crate::prompt;
use crate::services::Services;
use std::collections::BTreeSet;

pub struct CreateApplicationVersionOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

impl CreateApplicationVersionOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: input_set(&[
                ParameterName::AccessKeyId,
                ParameterName::SecretAccessKey,
                ParameterName::ServiceEndpoint,
                ParameterName::ApplicationName,
                ParameterName::ApplicationVersionName,
            ]),
        }
    }
}

impl Operation for CreateApplicationVersionOperation {
    fn name(&self) -> &'static str {
        "CreateApplicationVersion"
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
        let version_label = pool
            .str_value(ParameterName::ApplicationVersionName)?
            .to_string();

        prompt::action(format!("Creating application version \"{version_label}\"."));
        match self.services.client.create_application_version(
            &credentials,
            &application_name,
            &version_label,
        ) {
            Ok(response) => Ok(OperationResult::new(self.name())
                .with_request_id(response.request_id)
                .with_message(format!("Created application version \"{version_label}\"."))),
            Err(err) if err.kind() == Some(ServiceErrorKind::AlreadyExists) => {
                log::info!("Application version \"{version_label}\" already exists, continuing.");
                Ok(OperationResult::new(self.name()).with_message(format!(
                    "Application version \"{version_label}\" already exists."
                )))
            }
            Err(err) => Err(err.into()),
        }
    }
}
