//! Application lifecycle operations.

use super::{input_set, Operation, OperationResult, QueueContext};
use crate::api::{ApiCredentials, ServiceError, ServiceErrorKind};
use crate::config_file;
use crate::error::CliResult;
use crate::parameter::{ParameterName, ParameterPool};
use crate::prompt;
use crate::services::Services;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Credential file location: explicit parameter first, then the standard
/// per-user location.
pub(crate) fn credential_file_location(pool: &ParameterPool) -> Option<PathBuf> {
    pool.str_value(ParameterName::CredentialFile)
        .ok()
        .map(PathBuf::from)
        .or_else(config_file::default_credential_file_location)
}

pub struct CreateApplicationOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

impl CreateApplicationOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: input_set(&[
                ParameterName::AccessKeyId,
                ParameterName::SecretAccessKey,
                ParameterName::ServiceEndpoint,
                ParameterName::ApplicationName,
            ]),
        }
    }
}

impl Operation for CreateApplicationOperation {
    fn name(&self) -> &'static str {
        "CreateApplication"
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

        prompt::action(format!("Creating application \"{application_name}\"."));
        match self
            .services
            .client
            .create_application(&credentials, &application_name)
        {
            Ok(response) => Ok(OperationResult::new(self.name())
                .with_request_id(response.request_id)
                .with_message(format!("Created application \"{application_name}\"."))),
            Err(err)
                if matches!(
                    err.kind(),
                    Some(ServiceErrorKind::AlreadyExists | ServiceErrorKind::InProgress)
                ) =>
            {
                log::info!("Application \"{application_name}\" already exists, continuing.");
                Ok(OperationResult::new(self.name())
                    .with_message(format!("Application \"{application_name}\" already exists.")))
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub struct DeleteApplicationOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

impl DeleteApplicationOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: input_set(&[
                ParameterName::AccessKeyId,
                ParameterName::SecretAccessKey,
                ParameterName::ServiceEndpoint,
                ParameterName::ApplicationName,
                ParameterName::EnvironmentName,
            ]),
        }
    }

    /// Drop the per-environment database password from the credential file.
    /// A failure here never fails the delete itself.
    fn trim_stored_password(pool: &ParameterPool) {
        let Ok(environment_name) = pool.str_value(ParameterName::EnvironmentName) else {
            return;
        };
        let Some(path) = credential_file_location(pool) else {
            return;
        };
        if let Err(err) = config_file::trim_credential_file(&path, environment_name) {
            log::warn!("Cannot remove stored database password: {err}");
        }
    }
}

impl Operation for DeleteApplicationOperation {
    fn name(&self) -> &'static str {
        "DeleteApplication"
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

        prompt::action(format!("Deleting application \"{application_name}\"."));
        let result = match self
            .services
            .client
            .delete_application(&credentials, &application_name)
        {
            Ok(response) => OperationResult::new(self.name())
                .with_request_id(response.request_id)
                .with_message(format!("Deleted application \"{application_name}\".")),
            Err(ServiceError::Api(exception))
                if exception.kind() == ServiceErrorKind::InProgress =>
            {
                log::info!("Deletion of application \"{application_name}\" already in progress.");
                OperationResult::new(self.name()).with_message(format!(
                    "Deletion of application \"{application_name}\" is already in progress."
                ))
            }
            Err(ServiceError::Api(exception))
                if exception.kind() == ServiceErrorKind::NotFound =>
            {
                log::info!("Application \"{application_name}\" does not exist, nothing to delete.");
                OperationResult::new(self.name())
                    .with_message(format!("Application \"{application_name}\" does not exist."))
            }
            Err(err) => return Err(err.into()),
        };

        Self::trim_stored_password(pool);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ServiceException;
    use crate::testing::{pool_with_credentials, stub_services};

    #[test]
    fn create_swallows_already_exists() {
        let services = stub_services();
        services.client.fail_next(ServiceException {
            code: "InvalidParameterValue".to_string(),
            http_status: 400,
            message: "Application myapp already exists.".to_string(),
        });
        let mut pool = pool_with_credentials();
        let mut op = CreateApplicationOperation::new(services.services());
        let result = op
            .execute(&mut pool, &QueueContext::default())
            .expect("benign error is swallowed");
        assert!(result.message.expect("message").contains("already exists"));
    }

    #[test]
    fn create_propagates_other_service_errors() {
        let services = stub_services();
        services.client.fail_next(ServiceException {
            code: "InternalFailure".to_string(),
            http_status: 500,
            message: "boom".to_string(),
        });
        let mut pool = pool_with_credentials();
        let mut op = CreateApplicationOperation::new(services.services());
        assert!(op.execute(&mut pool, &QueueContext::default()).is_err());
    }

    #[test]
    fn delete_swallows_in_progress_deletion() {
        let services = stub_services();
        services.client.fail_next(ServiceException {
            code: "OperationInProgressFailure".to_string(),
            http_status: 400,
            message: "Deletion of application myapp is in progress.".to_string(),
        });
        let mut pool = pool_with_credentials();
        let mut op = DeleteApplicationOperation::new(services.services());
        let result = op
            .execute(&mut pool, &QueueContext::default())
            .expect("in-flight deletion is a no-op success");
        assert!(result.message.expect("message").contains("in progress"));
        assert!(result.request_id.is_none());
    }

    #[test]
    fn delete_swallows_not_found() {
        let services = stub_services();
        services.client.fail_next(ServiceException {
            code: "InvalidParameterValue".to_string(),
            http_status: 400,
            message: "Application myapp does not exist.".to_string(),
        });
        let mut pool = pool_with_credentials();
        let mut op = DeleteApplicationOperation::new(services.services());
        let result = op
            .execute(&mut pool, &QueueContext::default())
            .expect("missing application is not an error");
        assert!(result.message.expect("message").contains("does not exist"));
    }
}
