//! Core engine for the envforge CLI: the parameter pool, the operation
//! queue, and the workflow operations each command compiles to.
//!
//! A command invocation is one pass through a fixed pipeline. Defaults and
//! command-line arguments seed a [`parameter::ParameterPool`], the command is
//! compiled into an [`operation::OperationQueue`], and the queue runs its
//! operations in order. Operations pull what they need from the pool, push
//! what they learn back into it, and stop the queue by returning an error.

pub mod api;
pub mod command;
pub mod config_file;
pub mod constants;
pub mod error;
pub mod operation;
pub mod parameter;
pub mod process;
pub mod prompt;
pub mod services;
pub mod terminal;

#[cfg(test)]
pub mod testing;

pub use command::{compile_operation_queue, Command};
pub use error::{CliError, CliResult};
pub use parameter::{Parameter, ParameterName, ParameterPool, ParameterSource, ParameterValue};
pub use services::Services;
