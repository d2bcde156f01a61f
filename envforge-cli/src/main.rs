//! Entry point: parse arguments, build the collaborators, compile the
//! command into its operation queue, run it, and report the results.

mod cli;

use anyhow::Result;
use clap::Parser;
use envforge_core::api::HttpServiceClient;
use envforge_core::operation::OperationResult;
use envforge_core::parameter::{fill_defaults, ParameterSource, ParameterValidator};
use envforge_core::process::SystemProcessRunner;
use envforge_core::prompt::{self, OutputLevel};
use envforge_core::terminal::ConsoleTerminal;
use envforge_core::{compile_operation_queue, ParameterPool, Services};
use std::sync::Arc;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("ENVFORGE_LOG", "warn"))
        .init();

    if let Err(err) = run() {
        prompt::error(format!("Error: {err:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::Cli::parse();
    prompt::set_level(if args.verbose {
        OutputLevel::Info
    } else {
        OutputLevel::ResultOnly
    });

    let mut pool = ParameterPool::new();
    fill_defaults(&mut pool);
    args.seed_pool(&mut pool);
    // Reject malformed arguments before any operation runs; values from
    // files and prompts are validated by the workflow itself.
    ParameterValidator::validate_source(&pool, ParameterSource::CliArgument)?;

    let services = Services::new(
        Arc::new(HttpServiceClient::new()?),
        Arc::new(ConsoleTerminal),
        Arc::new(SystemProcessRunner),
    );

    let command = args.workflow_command();
    log::info!("Compiling operation queue for \"{command}\".");
    let mut queue = compile_operation_queue(command, &services);

    let mut results = Vec::new();
    queue.run(&mut pool, &mut results)?;

    if args.verbose {
        print_results(&results);
    }
    Ok(())
}

fn print_results(results: &[OperationResult]) {
    for result in results {
        let mut line = result.operation.to_string();
        if let Some(request_id) = &result.request_id {
            line.push_str(&format!(" [{request_id}]"));
        }
        if let Some(message) = &result.message {
            line.push_str(&format!(": {message}"));
        }
        prompt::result(line);
    }
}
