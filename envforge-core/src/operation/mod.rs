//! The operation abstraction and the concrete workflow steps.
//!
//! A command compiles to an ordered queue of operations. Each operation
//! declares the parameter names it reads and the names it may produce; the
//! queue recomputes the union of requirements before every step, so an
//! operation that grows its own input set mid-run (the missing-parameter
//! prompt does this when a database is enabled) is always seen fresh.

mod application;
mod ask;
mod environment;
mod file;
mod pseudo;
mod queue;
mod version;

pub use application::{CreateApplicationOperation, DeleteApplicationOperation};
pub use ask::{AskForConfigFileParameterOperation, AskForMissingParameterOperation};
pub use environment::{
    CreateEnvironmentOperation, DescribeEnvironmentOperation, TerminateEnvironmentOperation,
    UpdateEnvironmentOptionSettingOperation, WaitForCreateEnvironmentFinishOperation,
    WaitForTerminateEnvironmentFinishOperation,
    WaitForUpdateEnvironmentOptionSettingFinishOperation,
};
pub use file::{
    CheckGitIgnoreFileOperation, LoadConfigFileOperation, ReadCredentialFileOperation,
    RotateOptionSettingFileOperation, SaveConfigFileOperation,
    SaveConfigurationSettingOperation, TryLoadConfigFileOperation,
    UpdateCredentialFileOperation, UpdateDevToolsConfigOperation,
};
pub use pseudo::{AskConfirmationOperation, SleepOperation, ValidateParameterOperation};
pub use queue::{OperationQueue, QueueState};
pub use version::CreateApplicationVersionOperation;

use crate::error::CliResult;
use crate::parameter::{ParameterName, ParameterPool};
use std::collections::BTreeSet;

/// Outcome of one executed operation.
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub operation: &'static str,
    pub request_id: Option<String>,
    pub message: Option<String>,
    pub payload: Option<serde_json::Value>,
}

impl OperationResult {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            request_id: None,
            message: None,
            payload: None,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Requirements of every *other* operation in the queue at the moment an
/// operation executes. Recomputed per step so requirement growth in earlier
/// steps is visible to later ones.
#[derive(Debug, Clone, Default)]
pub struct QueueContext {
    others: BTreeSet<ParameterName>,
}

impl QueueContext {
    pub fn new(others: BTreeSet<ParameterName>) -> Self {
        Self { others }
    }

    /// Union of the other operations' requirements with `own`, the
    /// executing operation's current input set.
    pub fn required_with(&self, own: &BTreeSet<ParameterName>) -> BTreeSet<ParameterName> {
        self.others.union(own).copied().collect()
    }
}

/// One step of a command workflow.
pub trait Operation {
    /// Stable name used in result reporting and queue introspection.
    fn name(&self) -> &'static str;

    /// Parameter names this operation reads. May grow while executing.
    fn input_parameters(&self) -> &BTreeSet<ParameterName>;

    /// Parameter names this operation may write into the pool.
    fn output_parameters(&self) -> BTreeSet<ParameterName> {
        BTreeSet::new()
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        context: &QueueContext,
    ) -> CliResult<OperationResult>;
}

/// Shorthand for building an input set.
pub(crate) fn input_set(names: &[ParameterName]) -> BTreeSet<ParameterName> {
    names.iter().copied().collect()
}
