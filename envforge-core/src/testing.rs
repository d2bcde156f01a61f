//! Scripted stand-ins for the service, the terminal, and the process
//! runner, shared by the operation and workflow tests.

use crate::api::model::{
    CreateEnvironmentRequest, EnvironmentDescription, EnvironmentHealth, EnvironmentStatus,
    EventDescription, OptionSetting,
};
use crate::api::{
    ApiCredentials, ApiResponse, ServiceClient, ServiceError, ServiceException, ServiceResult,
};
use crate::error::CliResult;
use crate::parameter::{fill_defaults, Parameter, ParameterName, ParameterPool, ParameterSource};
use crate::process::{ProcessError, ProcessResult, ProcessRunner};
use crate::services::Services;
use crate::terminal::Terminal;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::sync::Arc;

pub fn sample_environment(status: EnvironmentStatus) -> EnvironmentDescription {
    EnvironmentDescription {
        environment_name: "myapp-env".to_string(),
        environment_id: Some("e-abc123".to_string()),
        application_name: "myapp".to_string(),
        version_label: Some("Sample Application".to_string()),
        solution_stack_name: Some("64bit Linux running Ruby".to_string()),
        status,
        health: EnvironmentHealth::Green,
        cname: Some("myapp-env.us-east-1.cloudvine.io".to_string()),
        endpoint_url: None,
        date_updated: None,
    }
}

/// A pool the way it looks after command-line parsing for a fully specified
/// invocation.
pub fn pool_with_credentials() -> ParameterPool {
    let mut pool = ParameterPool::new();
    fill_defaults(&mut pool);
    let cli = ParameterSource::CliArgument;
    pool.put(Parameter::new(ParameterName::AccessKeyId, "AKID", cli), false);
    pool.put(
        Parameter::new(ParameterName::SecretAccessKey, "SECRET", cli),
        false,
    );
    pool.put(Parameter::new(ParameterName::Region, "us-east-1", cli), false);
    pool.put(
        Parameter::new(
            ParameterName::ServiceEndpoint,
            "https://envforge.us-east-1.cloudvine.io",
            cli,
        ),
        false,
    );
    pool.put(
        Parameter::new(ParameterName::ApplicationName, "myapp", cli),
        false,
    );
    pool.put(
        Parameter::new(ParameterName::EnvironmentName, "myapp-env", cli),
        false,
    );
    pool
}

/// Service client that replays scripted failures and environment listings.
#[derive(Default)]
pub struct StubClient {
    errors: RefCell<VecDeque<ServiceException>>,
    describe_results: RefCell<VecDeque<Vec<EnvironmentDescription>>>,
    solution_stacks: RefCell<Vec<String>>,
    events: RefCell<Vec<EventDescription>>,
    calls: RefCell<Vec<String>>,
}

impl StubClient {
    /// Fail the next service call with `exception`.
    pub fn fail_next(&self, exception: ServiceException) {
        self.errors.borrow_mut().push_back(exception);
    }

    /// Queue one describe result. The last queued result repeats.
    pub fn push_environments(&self, environments: Vec<EnvironmentDescription>) {
        self.describe_results.borrow_mut().push_back(environments);
    }

    pub fn set_solution_stacks(&self, stacks: Vec<String>) {
        *self.solution_stacks.borrow_mut() = stacks;
    }

    pub fn set_events(&self, events: Vec<EventDescription>) {
        *self.events.borrow_mut() = events;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &str) -> ServiceResult<()> {
        self.calls.borrow_mut().push(call.to_string());
        if let Some(exception) = self.errors.borrow_mut().pop_front() {
            return Err(ServiceError::Api(exception));
        }
        Ok(())
    }

    fn respond<T>(result: T) -> ApiResponse<T> {
        ApiResponse {
            request_id: Some("stub-request-id".to_string()),
            result,
        }
    }

    fn next_environments(&self) -> Vec<EnvironmentDescription> {
        let mut queue = self.describe_results.borrow_mut();
        match queue.len() {
            0 => vec![sample_environment(EnvironmentStatus::Ready)],
            1 => queue.front().cloned().unwrap_or_default(),
            _ => queue.pop_front().unwrap_or_default(),
        }
    }
}

impl ServiceClient for StubClient {
    fn create_application(
        &self,
        _credentials: &ApiCredentials,
        _application_name: &str,
    ) -> ServiceResult<ApiResponse<()>> {
        self.record("CreateApplication")?;
        Ok(Self::respond(()))
    }

    fn delete_application(
        &self,
        _credentials: &ApiCredentials,
        _application_name: &str,
    ) -> ServiceResult<ApiResponse<()>> {
        self.record("DeleteApplication")?;
        Ok(Self::respond(()))
    }

    fn create_application_version(
        &self,
        _credentials: &ApiCredentials,
        _application_name: &str,
        _version_label: &str,
    ) -> ServiceResult<ApiResponse<()>> {
        self.record("CreateApplicationVersion")?;
        Ok(Self::respond(()))
    }

    fn create_environment(
        &self,
        _credentials: &ApiCredentials,
        _request: &CreateEnvironmentRequest,
    ) -> ServiceResult<ApiResponse<EnvironmentDescription>> {
        self.record("CreateEnvironment")?;
        Ok(Self::respond(sample_environment(
            EnvironmentStatus::Launching,
        )))
    }

    fn describe_environments(
        &self,
        _credentials: &ApiCredentials,
        _application_name: &str,
        _environment_name: Option<&str>,
    ) -> ServiceResult<ApiResponse<Vec<EnvironmentDescription>>> {
        self.record("DescribeEnvironments")?;
        Ok(Self::respond(self.next_environments()))
    }

    fn update_environment(
        &self,
        _credentials: &ApiCredentials,
        _environment_name: &str,
        _option_settings: &[OptionSetting],
    ) -> ServiceResult<ApiResponse<EnvironmentDescription>> {
        self.record("UpdateEnvironment")?;
        Ok(Self::respond(sample_environment(EnvironmentStatus::Updating)))
    }

    fn terminate_environment(
        &self,
        _credentials: &ApiCredentials,
        _environment_name: &str,
    ) -> ServiceResult<ApiResponse<EnvironmentDescription>> {
        self.record("TerminateEnvironment")?;
        Ok(Self::respond(sample_environment(
            EnvironmentStatus::Terminating,
        )))
    }

    fn describe_configuration_settings(
        &self,
        _credentials: &ApiCredentials,
        _application_name: &str,
        _environment_name: &str,
    ) -> ServiceResult<ApiResponse<Vec<OptionSetting>>> {
        self.record("DescribeConfigurationSettings")?;
        Ok(Self::respond(vec![OptionSetting::new(
            "envforge:hostmanager",
            "LogPublicationControl",
            "false",
        )]))
    }

    fn list_available_solution_stacks(
        &self,
        _credentials: &ApiCredentials,
    ) -> ServiceResult<ApiResponse<Vec<String>>> {
        self.record("ListAvailableSolutionStacks")?;
        Ok(Self::respond(self.solution_stacks.borrow().clone()))
    }

    fn describe_events(
        &self,
        _credentials: &ApiCredentials,
        _application_name: &str,
        _environment_name: &str,
    ) -> ServiceResult<ApiResponse<Vec<EventDescription>>> {
        self.record("DescribeEvents")?;
        Ok(Self::respond(self.events.borrow().clone()))
    }
}

/// Terminal that replays scripted answers and panics on any unscripted
/// question, so tests notice unexpected prompts.
#[derive(Default)]
pub struct StubTerminal {
    answers: RefCell<VecDeque<String>>,
    optionals: RefCell<VecDeque<Option<String>>>,
    secrets: RefCell<VecDeque<Option<String>>>,
    confirms: RefCell<VecDeque<bool>>,
    choices: RefCell<VecDeque<usize>>,
}

impl StubTerminal {
    #[must_use]
    pub fn with_answers(self, answers: &[&str]) -> Self {
        for answer in answers {
            self.script_answer(answer);
        }
        self
    }

    #[must_use]
    pub fn with_choices(self, choices: &[usize]) -> Self {
        for choice in choices {
            self.script_choice(*choice);
        }
        self
    }

    pub fn script_answer(&self, answer: &str) {
        self.answers.borrow_mut().push_back(answer.to_string());
    }

    pub fn script_optional(&self, answer: Option<&str>) {
        self.optionals
            .borrow_mut()
            .push_back(answer.map(str::to_owned));
    }

    pub fn script_secret(&self, answer: Option<&str>) {
        self.secrets
            .borrow_mut()
            .push_back(answer.map(str::to_owned));
    }

    pub fn script_confirm(&self, answer: bool) {
        self.confirms.borrow_mut().push_back(answer);
    }

    pub fn script_choice(&self, choice: usize) {
        self.choices.borrow_mut().push_back(choice);
    }
}

impl Terminal for StubTerminal {
    fn ask(&self, prompt: &str, default: Option<&str>) -> CliResult<String> {
        match self.answers.borrow_mut().pop_front() {
            Some(answer) => Ok(answer),
            None => match default {
                Some(default) => Ok(default.to_string()),
                None => panic!("unscripted question: {prompt}"),
            },
        }
    }

    fn ask_optional(&self, prompt: &str) -> CliResult<Option<String>> {
        Ok(self
            .optionals
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted optional question: {prompt}")))
    }

    fn ask_secret(&self, prompt: &str) -> CliResult<Option<String>> {
        Ok(self
            .secrets
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted secret question: {prompt}")))
    }

    fn confirm(&self, prompt: &str, _default: bool) -> CliResult<bool> {
        Ok(self
            .confirms
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted confirmation: {prompt}")))
    }

    fn choose_one(
        &self,
        title: &str,
        options: &[String],
        _default: Option<usize>,
    ) -> CliResult<usize> {
        let choice = self
            .choices
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted menu: {title}"));
        assert!(choice < options.len(), "scripted choice out of range");
        Ok(choice)
    }
}

/// Process runner that records commands instead of spawning them.
#[derive(Default)]
pub struct StubRunner {
    fail: Cell<bool>,
    commands: RefCell<Vec<String>>,
}

impl StubRunner {
    /// Make every subsequent run fail.
    pub fn fail_all(&self) {
        self.fail.set(true);
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }
}

impl ProcessRunner for StubRunner {
    fn run(&self, program: &str, args: &[&str]) -> ProcessResult<String> {
        let rendered = format!("{program} {}", args.join(" "));
        self.commands.borrow_mut().push(rendered.clone());
        if self.fail.get() {
            return Err(ProcessError::Failed {
                command: rendered,
                status: "exit status: 1".to_string(),
                stderr: "stubbed failure".to_string(),
            });
        }
        Ok(String::new())
    }
}

/// The stub collaborators plus direct handles for scripting them.
pub struct StubServices {
    pub client: Arc<StubClient>,
    pub terminal: Arc<StubTerminal>,
    pub runner: Arc<StubRunner>,
}

impl StubServices {
    pub fn services(&self) -> Services {
        Services::new(
            self.client.clone(),
            self.terminal.clone(),
            self.runner.clone(),
        )
    }
}

pub fn stub_services() -> StubServices {
    StubServices {
        client: Arc::new(StubClient::default()),
        terminal: Arc::new(StubTerminal::default()),
        runner: Arc::new(StubRunner::default()),
    }
}
