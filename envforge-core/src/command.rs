//! Compilation of a command into its operation queue.

use crate::operation::{
    AskConfirmationOperation, AskForConfigFileParameterOperation,
    AskForMissingParameterOperation, CheckGitIgnoreFileOperation, CreateApplicationOperation,
    CreateApplicationVersionOperation, CreateEnvironmentOperation, DeleteApplicationOperation,
    DescribeEnvironmentOperation, LoadConfigFileOperation, OperationQueue,
    ReadCredentialFileOperation, RotateOptionSettingFileOperation, SaveConfigFileOperation,
    SaveConfigurationSettingOperation, SleepOperation, TerminateEnvironmentOperation,
    TryLoadConfigFileOperation, UpdateCredentialFileOperation, UpdateDevToolsConfigOperation,
    UpdateEnvironmentOptionSettingOperation, ValidateParameterOperation,
    WaitForCreateEnvironmentFinishOperation, WaitForTerminateEnvironmentFinishOperation,
    WaitForUpdateEnvironmentOptionSettingFinishOperation,
};
use crate::services::Services;
use std::fmt;

/// The commands the tool understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Set up the project: questionnaire, credential storage, config file.
    Init,
    /// Create the application and launch its environment.
    Start,
    /// Push the local option settings to the running environment.
    Update,
    /// Report the environment's state and URL.
    Status,
    /// Terminate the environment, keeping the application.
    Stop,
    /// Delete the application, force-terminating its environments.
    Delete,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Start => "start",
            Self::Update => "update",
            Self::Status => "status",
            Self::Stop => "stop",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the operation queue for `command`. The queue owns clones of the
/// collaborator bundle and is ready to run.
pub fn compile_operation_queue(command: Command, services: &Services) -> OperationQueue {
    let mut queue = OperationQueue::new();
    let s = || services.clone();
    match command {
        Command::Init => {
            queue.add(Box::new(TryLoadConfigFileOperation::new(s())));
            queue.add(Box::new(ReadCredentialFileOperation::new(s())));
            queue.add(Box::new(AskForConfigFileParameterOperation::new(s())));
            queue.add(Box::new(ValidateParameterOperation::new(s())));
            queue.add(Box::new(UpdateCredentialFileOperation::new(s())));
            queue.add(Box::new(SaveConfigFileOperation::new(s())));
            queue.add(Box::new(RotateOptionSettingFileOperation::new(s())));
            queue.add(Box::new(UpdateDevToolsConfigOperation::new(s())));
            queue.add(Box::new(CheckGitIgnoreFileOperation::new(s())));
        }
        Command::Start => {
            queue.add(Box::new(CheckGitIgnoreFileOperation::new(s())));
            queue.add(Box::new(LoadConfigFileOperation::new(s())));
            queue.add(Box::new(ReadCredentialFileOperation::new(s())));
            queue.add(Box::new(AskForMissingParameterOperation::new(s())));
            queue.add(Box::new(UpdateDevToolsConfigOperation::new(s())));
            queue.add(Box::new(ValidateParameterOperation::new(s())));
            queue.add(Box::new(CreateApplicationOperation::new(s())));
            queue.add(Box::new(CreateApplicationVersionOperation::new(s())));
            queue.add(Box::new(CreateEnvironmentOperation::new(s())));
            queue.add(Box::new(SleepOperation::new(s())));
            queue.add(Box::new(SaveConfigurationSettingOperation::new(s())));
            queue.add(Box::new(WaitForCreateEnvironmentFinishOperation::new(s())));
        }
        Command::Update => {
            queue.add(Box::new(CheckGitIgnoreFileOperation::new(s())));
            queue.add(Box::new(LoadConfigFileOperation::new(s())));
            queue.add(Box::new(ReadCredentialFileOperation::new(s())));
            queue.add(Box::new(AskForMissingParameterOperation::new(s())));
            queue.add(Box::new(ValidateParameterOperation::new(s())));
            queue.add(Box::new(AskConfirmationOperation::new(
                s(),
                "Update the environment with the local option settings?",
            )));
            queue.add(Box::new(UpdateEnvironmentOptionSettingOperation::new(s())));
            queue.add(Box::new(
                WaitForUpdateEnvironmentOptionSettingFinishOperation::new(s()),
            ));
        }
        Command::Status => {
            queue.add(Box::new(CheckGitIgnoreFileOperation::new(s())));
            queue.add(Box::new(LoadConfigFileOperation::new(s())));
            queue.add(Box::new(ReadCredentialFileOperation::new(s())));
            queue.add(Box::new(AskForMissingParameterOperation::new(s())));
            queue.add(Box::new(ValidateParameterOperation::new(s())));
            queue.add(Box::new(DescribeEnvironmentOperation::new(s())));
        }
        Command::Stop => {
            queue.add(Box::new(CheckGitIgnoreFileOperation::new(s())));
            queue.add(Box::new(LoadConfigFileOperation::new(s())));
            queue.add(Box::new(ReadCredentialFileOperation::new(s())));
            queue.add(Box::new(AskForMissingParameterOperation::new(s())));
            queue.add(Box::new(ValidateParameterOperation::new(s())));
            queue.add(Box::new(AskConfirmationOperation::new(
                s(),
                "Stop the environment?",
            )));
            queue.add(Box::new(SaveConfigurationSettingOperation::new(s())));
            queue.add(Box::new(TerminateEnvironmentOperation::new(s())));
            queue.add(Box::new(WaitForTerminateEnvironmentFinishOperation::new(s())));
        }
        Command::Delete => {
            queue.add(Box::new(CheckGitIgnoreFileOperation::new(s())));
            queue.add(Box::new(LoadConfigFileOperation::new(s())));
            queue.add(Box::new(ReadCredentialFileOperation::new(s())));
            queue.add(Box::new(AskForMissingParameterOperation::new(s())));
            queue.add(Box::new(ValidateParameterOperation::new(s())));
            queue.add(Box::new(AskConfirmationOperation::new(
                s(),
                "Delete the application and all its environments?",
            )));
            queue.add(Box::new(DeleteApplicationOperation::new(s())));
        }
    }
    queue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParameterName;
    use crate::testing::stub_services;

    #[test]
    fn start_compiles_to_the_launch_workflow() {
        let services = stub_services();
        let queue = compile_operation_queue(Command::Start, &services.services());
        assert_eq!(
            queue.operation_names(),
            vec![
                "CheckGitIgnoreFile",
                "LoadConfigFile",
                "ReadCredentialFile",
                "AskForMissingParameter",
                "UpdateDevToolsConfig",
                "ValidateParameter",
                "CreateApplication",
                "CreateApplicationVersion",
                "CreateEnvironment",
                "Sleep",
                "SaveConfigurationSetting",
                "WaitForCreateEnvironmentFinish",
            ]
        );
    }

    #[test]
    fn init_compiles_to_the_questionnaire_workflow() {
        let services = stub_services();
        let queue = compile_operation_queue(Command::Init, &services.services());
        assert_eq!(
            queue.operation_names(),
            vec![
                "TryLoadConfigFile",
                "ReadCredentialFile",
                "AskForConfigFileParameter",
                "ValidateParameter",
                "UpdateCredentialFile",
                "SaveConfigFile",
                "RotateOptionSettingFile",
                "UpdateDevToolsConfig",
                "CheckGitIgnoreFile",
            ]
        );
    }

    #[test]
    fn destructive_commands_confirm_before_acting() {
        let services = stub_services();
        for (command, destructive) in [
            (Command::Stop, "TerminateEnvironment"),
            (Command::Delete, "DeleteApplication"),
        ] {
            let names = compile_operation_queue(command, &services.services()).operation_names();
            let confirm = names
                .iter()
                .position(|name| *name == "AskConfirmation")
                .expect("confirmation present");
            let target = names
                .iter()
                .position(|name| *name == destructive)
                .expect("destructive step present");
            assert!(confirm < target);
        }
    }

    #[test]
    fn stop_snapshots_option_settings_before_terminating() {
        let services = stub_services();
        let names = compile_operation_queue(Command::Stop, &services.services()).operation_names();
        assert_eq!(
            names,
            vec![
                "CheckGitIgnoreFile",
                "LoadConfigFile",
                "ReadCredentialFile",
                "AskForMissingParameter",
                "ValidateParameter",
                "AskConfirmation",
                "SaveConfigurationSetting",
                "TerminateEnvironment",
                "WaitForTerminateEnvironmentFinish",
            ]
        );
    }

    #[test]
    fn every_command_keeps_the_ignore_file_current() {
        let services = stub_services();
        for command in [
            Command::Init,
            Command::Start,
            Command::Update,
            Command::Status,
            Command::Stop,
            Command::Delete,
        ] {
            let names = compile_operation_queue(command, &services.services()).operation_names();
            assert!(
                names.contains(&"CheckGitIgnoreFile"),
                "{command} skips the ignore file"
            );
        }
    }

    #[test]
    fn status_requires_the_environment_coordinates() {
        let services = stub_services();
        let queue = compile_operation_queue(Command::Status, &services.services());
        let required = queue.required_parameters();
        assert!(required.contains(&ParameterName::ApplicationName));
        assert!(required.contains(&ParameterName::EnvironmentName));
        assert!(required.contains(&ParameterName::AccessKeyId));
    }

    #[test]
    fn delete_ends_with_the_application_removal() {
        let services = stub_services();
        let names = compile_operation_queue(Command::Delete, &services.services()).operation_names();
        assert_eq!(names.last(), Some(&"DeleteApplication"));
        assert!(!names.contains(&"TerminateEnvironment"));
    }
}
