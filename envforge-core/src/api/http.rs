//! Query-protocol HTTP implementation of [`ServiceClient`].
//!
//! Each call is a signed form POST against the per-region endpoint. Throttle
//! responses and server-side failures are retried with exponential backoff;
//! every other service error is returned to the operation as a
//! [`ServiceException`] for kind-based handling.

use super::model::{
    CreateEnvironmentRequest, EnvironmentDescription, EventDescription, OptionSetting,
};
use super::{signature, ApiCredentials, ApiResponse, ServiceClient, ServiceError};
use super::{ServiceErrorKind, ServiceException, ServiceResult};
use crate::constants;
use crate::prompt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::thread;
use std::time::Duration;

const DEFAULT_MAX_TRIES: u32 = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpServiceClient {
    http: reqwest::blocking::Client,
    max_tries: u32,
}

impl HttpServiceClient {
    pub fn new() -> ServiceResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(constants::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ServiceError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            max_tries: DEFAULT_MAX_TRIES,
        })
    }

    /// Perform one Query API call, returning the request id and the
    /// `<Action>Result` subtree of the response body.
    fn call(
        &self,
        credentials: &ApiCredentials,
        action: &str,
        params: &[(String, String)],
    ) -> ServiceResult<(Option<String>, Value)> {
        let url = normalize_endpoint(&credentials.endpoint)?;
        let mut last_error = ServiceError::Transport("request was never sent".to_string());

        for attempt in 0..self.max_tries {
            if attempt > 0 {
                let wait = Duration::from_secs(1 << attempt);
                log::debug!("Waiting {}s before retrying {action}.", wait.as_secs());
                thread::sleep(wait);
            }

            let form = signature::signed_query(credentials, action, params);
            let response = match self.http.post(&url).form(&form).send() {
                Ok(response) => response,
                Err(err) => {
                    log::error!("Transport failure calling {action}: {err}");
                    last_error = ServiceError::Transport(err.to_string());
                    continue;
                }
            };

            let status = response.status().as_u16();
            let text = response
                .text()
                .map_err(|err| ServiceError::Transport(err.to_string()))?;

            if status == 200 {
                let body: Value = serde_json::from_str(&text).map_err(|err| {
                    ServiceError::Transport(format!("cannot parse {action} response: {err}"))
                })?;
                let request_id = body
                    .pointer(&format!("/{action}Response/ResponseMetadata/RequestId"))
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                let result = body
                    .pointer(&format!("/{action}Response/{action}Result"))
                    .cloned()
                    .unwrap_or(Value::Null);
                log::info!("Received response for {action} call.");
                return Ok((request_id, result));
            }

            let exception = extract_exception(&text, status);
            log::error!("{action} failed: {exception}");
            let retryable = exception.kind() == ServiceErrorKind::Throttled || status >= 500;
            if !retryable {
                return Err(ServiceError::Api(exception));
            }
            if exception.kind() == ServiceErrorKind::Throttled {
                prompt::info("Request is throttled, backing off.");
            }
            last_error = ServiceError::Api(exception);
        }

        Err(last_error)
    }

    fn call_decoded<T: DeserializeOwned>(
        &self,
        credentials: &ApiCredentials,
        action: &str,
        params: &[(String, String)],
        pointer: &str,
    ) -> ServiceResult<ApiResponse<T>> {
        let (request_id, result) = self.call(credentials, action, params)?;
        let subtree = result.pointer(pointer).cloned().unwrap_or(Value::Null);
        let decoded: T = serde_json::from_value(subtree).map_err(|err| {
            ServiceError::Transport(format!("malformed {action} result: {err}"))
        })?;
        Ok(ApiResponse {
            request_id,
            result: decoded,
        })
    }
}

fn normalize_endpoint(endpoint: &str) -> ServiceResult<String> {
    url::Url::parse(endpoint)
        .map_err(|err| ServiceError::Transport(format!("invalid endpoint \"{endpoint}\": {err}")))?;
    if endpoint.ends_with('/') {
        Ok(endpoint.to_string())
    } else {
        Ok(format!("{endpoint}/"))
    }
}

fn extract_exception(body: &str, http_status: u16) -> ServiceException {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let code = parsed
        .as_ref()
        .and_then(|value| value.pointer("/Error/Code"))
        .and_then(Value::as_str)
        .unwrap_or("Error")
        .to_string();
    let message = parsed
        .as_ref()
        .and_then(|value| value.pointer("/Error/Message"))
        .and_then(Value::as_str)
        .map_or_else(|| body.trim().to_string(), str::to_owned);
    ServiceException {
        code,
        http_status,
        message,
    }
}

fn option_setting_params(prefix: &str, settings: &[OptionSetting]) -> Vec<(String, String)> {
    let mut params = Vec::new();
    for (index, setting) in settings.iter().enumerate() {
        let member = index + 1;
        params.push((
            format!("{prefix}.member.{member}.Namespace"),
            setting.namespace.clone(),
        ));
        params.push((
            format!("{prefix}.member.{member}.OptionName"),
            setting.option_name.clone(),
        ));
        params.push((
            format!("{prefix}.member.{member}.Value"),
            setting.value.clone(),
        ));
    }
    params
}

impl ServiceClient for HttpServiceClient {
    fn create_application(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
    ) -> ServiceResult<ApiResponse<()>> {
        let params = vec![("ApplicationName".to_string(), application_name.to_string())];
        let (request_id, _) = self.call(credentials, "CreateApplication", &params)?;
        Ok(ApiResponse {
            request_id,
            result: (),
        })
    }

    fn delete_application(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
    ) -> ServiceResult<ApiResponse<()>> {
        let params = vec![
            ("ApplicationName".to_string(), application_name.to_string()),
            ("TerminateEnvByForce".to_string(), "true".to_string()),
        ];
        let (request_id, _) = self.call(credentials, "DeleteApplication", &params)?;
        Ok(ApiResponse {
            request_id,
            result: (),
        })
    }

    fn create_application_version(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
        version_label: &str,
    ) -> ServiceResult<ApiResponse<()>> {
        let params = vec![
            ("ApplicationName".to_string(), application_name.to_string()),
            ("VersionLabel".to_string(), version_label.to_string()),
        ];
        let (request_id, _) = self.call(credentials, "CreateApplicationVersion", &params)?;
        Ok(ApiResponse {
            request_id,
            result: (),
        })
    }

    fn create_environment(
        &self,
        credentials: &ApiCredentials,
        request: &CreateEnvironmentRequest,
    ) -> ServiceResult<ApiResponse<EnvironmentDescription>> {
        let mut params = vec![
            (
                "ApplicationName".to_string(),
                request.application_name.clone(),
            ),
            (
                "EnvironmentName".to_string(),
                request.environment_name.clone(),
            ),
        ];
        if let Some(version_label) = &request.version_label {
            params.push(("VersionLabel".to_string(), version_label.clone()));
        }
        if let Some(solution_stack) = &request.solution_stack {
            params.push(("SolutionStackName".to_string(), solution_stack.clone()));
        }
        params.extend(option_setting_params(
            "OptionSettings",
            &request.option_settings,
        ));
        self.call_decoded(credentials, "CreateEnvironment", &params, "")
    }

    fn describe_environments(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
        environment_name: Option<&str>,
    ) -> ServiceResult<ApiResponse<Vec<EnvironmentDescription>>> {
        let mut params = vec![
            ("ApplicationName".to_string(), application_name.to_string()),
            ("IncludeDeleted".to_string(), "false".to_string()),
        ];
        if let Some(environment_name) = environment_name {
            params.push((
                "EnvironmentNames.member.1".to_string(),
                environment_name.to_string(),
            ));
        }
        self.call_decoded(credentials, "DescribeEnvironments", &params, "/Environments")
    }

    fn update_environment(
        &self,
        credentials: &ApiCredentials,
        environment_name: &str,
        option_settings: &[OptionSetting],
    ) -> ServiceResult<ApiResponse<EnvironmentDescription>> {
        let mut params = vec![("EnvironmentName".to_string(), environment_name.to_string())];
        params.extend(option_setting_params("OptionSettings", option_settings));
        self.call_decoded(credentials, "UpdateEnvironment", &params, "")
    }

    fn terminate_environment(
        &self,
        credentials: &ApiCredentials,
        environment_name: &str,
    ) -> ServiceResult<ApiResponse<EnvironmentDescription>> {
        let params = vec![("EnvironmentName".to_string(), environment_name.to_string())];
        self.call_decoded(credentials, "TerminateEnvironment", &params, "")
    }

    fn describe_configuration_settings(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
        environment_name: &str,
    ) -> ServiceResult<ApiResponse<Vec<OptionSetting>>> {
        let params = vec![
            ("ApplicationName".to_string(), application_name.to_string()),
            ("EnvironmentName".to_string(), environment_name.to_string()),
        ];
        self.call_decoded(
            credentials,
            "DescribeConfigurationSettings",
            &params,
            "/ConfigurationSettings/0/OptionSettings",
        )
    }

    fn list_available_solution_stacks(
        &self,
        credentials: &ApiCredentials,
    ) -> ServiceResult<ApiResponse<Vec<String>>> {
        self.call_decoded(
            credentials,
            "ListAvailableSolutionStacks",
            &[],
            "/SolutionStacks",
        )
    }

    fn describe_events(
        &self,
        credentials: &ApiCredentials,
        application_name: &str,
        environment_name: &str,
    ) -> ServiceResult<ApiResponse<Vec<EventDescription>>> {
        let params = vec![
            ("ApplicationName".to_string(), application_name.to_string()),
            ("EnvironmentName".to_string(), environment_name.to_string()),
        ];
        self.call_decoded(credentials, "DescribeEvents", &params, "/Events")
    }
}
