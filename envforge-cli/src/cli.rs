//! Command-line surface and the mapping of arguments into the pool.

use clap::{Parser, Subcommand};
use envforge_core::{Command, Parameter, ParameterName, ParameterPool, ParameterSource};

#[derive(Debug, Parser)]
#[command(
    name = "envforge",
    version,
    about = "Deploy and manage cloud application environments",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Print progress output while the command runs.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts on destructive commands.
    #[arg(long, short, global = true)]
    pub force: bool,

    /// Access key id for the environment service.
    #[arg(long, global = true, value_name = "KEY", env = "ENVFORGE_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,

    /// Secret access key for the environment service.
    #[arg(long, global = true, value_name = "SECRET", env = "ENVFORGE_SECRET_KEY")]
    pub secret_key: Option<String>,

    /// Service region, e.g. us-east-1.
    #[arg(long, global = true, value_name = "REGION")]
    pub region: Option<String>,

    /// Application to operate on.
    #[arg(long, global = true, value_name = "NAME")]
    pub application_name: Option<String>,

    /// Environment to operate on.
    #[arg(long, global = true, value_name = "NAME")]
    pub environment_name: Option<String>,

    /// Solution stack to launch the environment on.
    #[arg(long, global = true, value_name = "STACK")]
    pub solution_stack: Option<String>,

    /// Credential file to read and store keys in.
    #[arg(long, global = true, value_name = "FILE")]
    pub credential_file: Option<String>,

    /// Seconds to wait for environment state transitions.
    #[arg(long, global = true, value_name = "SECONDS")]
    pub wait_timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum CliCommand {
    /// Set up the project interactively and store the configuration.
    Init,
    /// Create the application and launch its environment.
    Start,
    /// Push the local option settings to the running environment.
    Update,
    /// Show the environment's state and URL.
    Status,
    /// Terminate the environment, keeping the application.
    Stop,
    /// Terminate the environment and delete the application.
    Delete,
}

impl Cli {
    pub fn workflow_command(&self) -> Command {
        match self.command {
            CliCommand::Init => Command::Init,
            CliCommand::Start => Command::Start,
            CliCommand::Update => Command::Update,
            CliCommand::Status => Command::Status,
            CliCommand::Stop => Command::Stop,
            CliCommand::Delete => Command::Delete,
        }
    }

    /// Put every given argument into the pool at command-line rank. The two
    /// flags always land so operations can read them without a fallback.
    pub fn seed_pool(&self, pool: &mut ParameterPool) {
        let source = ParameterSource::CliArgument;
        let strings = [
            (ParameterName::AccessKeyId, &self.access_key_id),
            (ParameterName::SecretAccessKey, &self.secret_key),
            (ParameterName::Region, &self.region),
            (ParameterName::ApplicationName, &self.application_name),
            (ParameterName::EnvironmentName, &self.environment_name),
            (ParameterName::SolutionStack, &self.solution_stack),
            (ParameterName::CredentialFile, &self.credential_file),
        ];
        for (name, value) in strings {
            if let Some(value) = value {
                pool.put(Parameter::new(name, value.as_str(), source), false);
            }
        }
        if let Some(wait_timeout) = self.wait_timeout {
            pool.put(
                Parameter::new(ParameterName::WaitTimeout, wait_timeout, source),
                false,
            );
        }
        pool.put(Parameter::new(ParameterName::Verbose, self.verbose, source), false);
        pool.put(Parameter::new(ParameterName::Force, self.force, source), false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_seed_the_pool_at_cli_rank() {
        let cli = Cli::parse_from([
            "envforge",
            "status",
            "--region",
            "us-west-2",
            "--application-name",
            "myapp",
        ]);
        let mut pool = ParameterPool::new();
        cli.seed_pool(&mut pool);

        assert_eq!(
            pool.str_value(ParameterName::Region).expect("region"),
            "us-west-2"
        );
        assert_eq!(
            pool.get_source(ParameterName::Region).expect("region"),
            ParameterSource::CliArgument
        );
        assert!(!pool.bool_value(ParameterName::Force).expect("force flag"));
        assert!(!pool.has(ParameterName::EnvironmentName));
    }

    #[test]
    fn flags_are_global() {
        let cli = Cli::parse_from(["envforge", "stop", "--force"]);
        assert!(matches!(cli.command, CliCommand::Stop));
        assert!(cli.force);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
