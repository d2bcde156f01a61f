//! External process execution behind a trait so workflows can be tested
//! without spawning anything.

use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("program \"{0}\" was not found on PATH")]
    NotFound(String),

    #[error("\"{command}\" exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("cannot run \"{command}\": {source}")]
    Io {
        command: String,
        source: std::io::Error,
    },
}

pub type ProcessResult<T> = Result<T, ProcessError>;

pub trait ProcessRunner {
    /// Run `program` with `args`, returning trimmed stdout on success.
    fn run(&self, program: &str, args: &[&str]) -> ProcessResult<String>;
}

/// Runs programs through [`std::process::Command`].
#[derive(Debug, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> ProcessResult<String> {
        let rendered = format!("{program} {}", args.join(" "));
        log::debug!("Running \"{rendered}\".");
        let output = Command::new(program).args(args).output().map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ProcessError::NotFound(program.to_string())
            } else {
                ProcessError::Io {
                    command: rendered.clone(),
                    source: err,
                }
            }
        })?;
        if !output.status.success() {
            return Err(ProcessError::Failed {
                command: rendered,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
