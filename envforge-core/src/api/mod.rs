//! Client interface to the remote environment service.
//!
//! The operations in this crate talk to the service exclusively through the
//! [`ServiceClient`] trait; the Query-protocol HTTP implementation lives in
//! [`http`]. Service failures surface as a [`ServiceException`] carrying the
//! service error code, and operations branch on its [`ServiceErrorKind`]
//! rather than on raw transport errors.

pub mod http;
pub mod model;
mod signature;

pub use http::HttpServiceClient;

use crate::error::CliResult;
use crate::parameter::{ParameterName, ParameterPool};
use model::{CreateEnvironmentRequest, EnvironmentDescription, EventDescription, OptionSetting};
use thiserror::Error;

/// An error returned by the service itself.
#[derive(Debug, Clone, Error)]
#[error("{code} (HTTP {http_status}): {message}")]
pub struct ServiceException {
    pub code: String,
    pub http_status: u16,
    pub message: String,
}

/// Categories the operations branch on. Benign kinds (AlreadyExists,
/// InProgress) are swallowed by the specific operations documented to
/// tolerate them; everything else aborts the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    NotFound,
    AlreadyExists,
    InProgress,
    Throttled,
    Other,
}

impl ServiceException {
    pub fn kind(&self) -> ServiceErrorKind {
        let message = self.message.to_ascii_lowercase();
        match self.code.as_str() {
            "Throttling" => ServiceErrorKind::Throttled,
            "OperationInProgressFailure" => ServiceErrorKind::InProgress,
            "ResourceNotFoundException" => ServiceErrorKind::NotFound,
            _ if message.contains("already exists") => ServiceErrorKind::AlreadyExists,
            _ if message.contains("in progress") => ServiceErrorKind::InProgress,
            _ if message.contains("does not exist") || message.contains("no environment found") => {
                ServiceErrorKind::NotFound
            }
            _ => ServiceErrorKind::Other,
        }
    }
}

/// Failure talking to the service: either a service-reported error or a
/// transport problem that exhausted the retry budget.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ServiceException),
    #[error("transport error: {0}")]
    Transport(String),
}

impl ServiceError {
    /// Kind of the underlying service exception, if there is one.
    pub fn kind(&self) -> Option<ServiceErrorKind> {
        match self {
            Self::Api(exception) => Some(exception.kind()),
            Self::Transport(_) => None,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Credentials and endpoint resolved from the parameter pool at call time.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: String,
}

impl ApiCredentials {
    pub fn from_pool(pool: &ParameterPool) -> CliResult<Self> {
        Ok(Self {
            access_key_id: pool.str_value(ParameterName::AccessKeyId)?.to_string(),
            secret_access_key: pool.str_value(ParameterName::SecretAccessKey)?.to_string(),
            endpoint: pool.str_value(ParameterName::ServiceEndpoint)?.to_string(),
        })
    }
}

/// A successful service response with its request identifier.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub request_id: Option<String>,
    pub result: T,
}

/// The calls the workflow operations need from the environment service.
pub trait ServiceClient {
    fn create_application(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
    ) -> ServiceResult<ApiResponse<()>>;

    fn delete_application(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
    ) -> ServiceResult<ApiResponse<()>>;

    fn create_application_version(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
        version_label: &str,
    ) -> ServiceResult<ApiResponse<()>>;

    fn create_environment(
        &self,
        credentials: &ApiCredentials,
        request: &CreateEnvironmentRequest,
    ) -> ServiceResult<ApiResponse<EnvironmentDescription>>;

    fn describe_environments(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
        environment_name: Option<&str>,
    ) -> ServiceResult<ApiResponse<Vec<EnvironmentDescription>>>;

    fn update_environment(
        &self,
        credentials: &ApiCredentials,
        environment_name: &str,
        option_settings: &[OptionSetting],
    ) -> ServiceResult<ApiResponse<EnvironmentDescription>>;

    fn terminate_environment(
        &self,
        credentials: &ApiCredentials,
        environment_name: &str,
    ) -> ServiceResult<ApiResponse<EnvironmentDescription>>;

    fn describe_configuration_settings(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
        environment_name: &str,
    ) -> ServiceResult<ApiResponse<Vec<OptionSetting>>>;

    fn list_available_solution_stacks(
        &self,
        credentials: &ApiCredentials,
    ) -> ServiceResult<ApiResponse<Vec<String>>>;

    fn describe_events(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
        environment_name: &str,
    ) -> ServiceResult<ApiResponse<Vec<EventDescription>>>;
}
