//! Operations over the local project state: config file, credential file,
//! option settings snapshot, ignore file, and the dev tools git config.

use super::application::credential_file_location;
use super::{input_set, Operation, OperationResult, QueueContext};
use crate::api::ApiCredentials;
use crate::config_file::{self, ConfigFileError};
use crate::constants;
use crate::error::{CliError, CliResult};
use crate::parameter::{Parameter, ParameterName, ParameterPool, ParameterSource};
use crate::prompt;
use crate::services::Services;
use crate::terminal;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Make sure the version control ignore file hides the local state
/// directory. Never fatal.
pub struct CheckGitIgnoreFileOperation {
    inputs: BTreeSet<ParameterName>,
}

impl CheckGitIgnoreFileOperation {
    pub fn new(_services: Services) -> Self {
        Self {
            inputs: BTreeSet::new(),
        }
    }
}

impl Operation for CheckGitIgnoreFileOperation {
    fn name(&self) -> &'static str {
        "CheckGitIgnoreFile"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        _pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        let dir_entry = format!("{}/", constants::LOCAL_DIR);
        let log_entry = format!("{}/{}", constants::LOCAL_DIR, constants::LOG_FILE_NAME);
        if let Err(err) = config_file::append_ignore_entries(
            Path::new(".gitignore"),
            &[dir_entry.as_str(), log_entry.as_str()],
        ) {
            log::warn!("Cannot update .gitignore: {err}");
        }
        Ok(OperationResult::new(self.name()))
    }
}

/// Candidate credential files in read order, each with the source rank its
/// values enter the pool with. Earlier files win because the read only
/// fills names the pool does not hold yet.
fn credential_read_locations(pool: &ParameterPool) -> Vec<(PathBuf, ParameterSource)> {
    let mut locations = Vec::new();
    if let Ok(path) = pool.str_value(ParameterName::CredentialFile) {
        locations.push((PathBuf::from(path), ParameterSource::ConfigFile));
    }
    if let Some(path) = std::env::var_os(constants::CREDENTIAL_FILE_ENV_VAR) {
        locations.push((PathBuf::from(path), ParameterSource::OsEnvironment));
    }
    if let Some(path) = config_file::default_credential_file_location() {
        locations.push((path, ParameterSource::ConfigFile));
    }
    locations
}

/// Quietly pull credentials out of the credential file. A missing or broken
/// file just means the missing-parameter prompt will ask instead.
pub struct ReadCredentialFileOperation {
    inputs: BTreeSet<ParameterName>,
}

impl ReadCredentialFileOperation {
    pub fn new(_services: Services) -> Self {
        Self {
            inputs: BTreeSet::new(),
        }
    }
}

impl Operation for ReadCredentialFileOperation {
    fn name(&self) -> &'static str {
        "ReadCredentialFile"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        for (path, source) in credential_read_locations(pool) {
            match config_file::read_credential_file(&path, pool, source) {
                Ok(()) => {}
                Err(ConfigFileError::NotFound(_)) => {
                    log::debug!("No credential file at \"{}\".", path.display());
                }
                Err(err) => log::warn!("Cannot read credential file: {err}"),
            }
        }
        Ok(OperationResult::new(self.name()))
    }
}

/// Persist interactively entered credentials so the next run does not ask
/// again. Write failures are reported but never abort the command.
pub struct UpdateCredentialFileOperation {
    inputs: BTreeSet<ParameterName>,
}

impl UpdateCredentialFileOperation {
    pub fn new(_services: Services) -> Self {
        Self {
            inputs: BTreeSet::new(),
        }
    }

    /// Credential names the user typed this run, paired with their file keys.
    fn terminal_updates(pool: &ParameterPool) -> Vec<(String, String)> {
        let mut updates = Vec::new();
        let keyed = [
            (
                ParameterName::AccessKeyId,
                constants::CREDENTIAL_KEY_ACCESS_KEY.to_string(),
            ),
            (
                ParameterName::SecretAccessKey,
                constants::CREDENTIAL_KEY_SECRET_KEY.to_string(),
            ),
        ];
        for (name, key) in keyed {
            if let Ok(parameter) = pool.get(name) {
                if parameter.source() == ParameterSource::Terminal {
                    updates.push((key, parameter.value().to_string()));
                }
            }
        }
        if let Ok(parameter) = pool.get(ParameterName::DatabaseMasterPassword) {
            if parameter.source() == ParameterSource::Terminal {
                if let Ok(environment_name) = pool.str_value(ParameterName::EnvironmentName) {
                    updates.push((
                        config_file::password_key_name(environment_name),
                        parameter.value().to_string(),
                    ));
                }
            }
        }
        updates
    }
}

impl Operation for UpdateCredentialFileOperation {
    fn name(&self) -> &'static str {
        "UpdateCredentialFile"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        let updates = Self::terminal_updates(pool);
        if updates.is_empty() {
            return Ok(OperationResult::new(self.name()));
        }
        let Some(path) = credential_file_location(pool) else {
            log::warn!("No home directory found, credentials will not be stored.");
            return Ok(OperationResult::new(self.name()));
        };
        match config_file::update_credential_file(&path, &updates) {
            Ok(()) => {
                pool.put(
                    Parameter::new(
                        ParameterName::CredentialFile,
                        path.display().to_string().as_str(),
                        ParameterSource::OperationOutput,
                    ),
                    true,
                );
                prompt::info(format!("Stored credentials in \"{}\".", path.display()));
            }
            Err(err) => prompt::error(format!("Cannot store credentials: {err}")),
        }
        Ok(OperationResult::new(self.name()))
    }
}

fn load_config(pool: &mut ParameterPool, required: bool) -> CliResult<()> {
    let path = config_file::project_config_location();
    match config_file::load_project_config(&path, pool) {
        Ok(()) => {
            if config_file::check_access_permission(&path).unwrap_or(false) {
                prompt::info(format!(
                    "Warning: \"{}\" is readable by other users.",
                    path.display()
                ));
            }
            if pool.has(ParameterName::Region) {
                terminal::derive_endpoints(pool, ParameterSource::ConfigFile)?;
            }
            Ok(())
        }
        Err(ConfigFileError::NotFound(_)) if !required => Ok(()),
        Err(ConfigFileError::NotFound(_)) => Err(CliError::OperationFailed(format!(
            "no project configuration found at \"{}\"; run \"envforge init\" first",
            path.display()
        ))),
        Err(err) => Err(err.into()),
    }
}

/// Load the project config file, failing when the project was never
/// initialized.
pub struct LoadConfigFileOperation {
    inputs: BTreeSet<ParameterName>,
}

impl LoadConfigFileOperation {
    pub fn new(_services: Services) -> Self {
        Self {
            inputs: BTreeSet::new(),
        }
    }
}

impl Operation for LoadConfigFileOperation {
    fn name(&self) -> &'static str {
        "LoadConfigFile"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        load_config(pool, true)?;
        Ok(OperationResult::new(self.name()))
    }
}

/// Load the project config file when it exists, for commands that also work
/// in an uninitialized directory.
pub struct TryLoadConfigFileOperation {
    inputs: BTreeSet<ParameterName>,
}

impl TryLoadConfigFileOperation {
    pub fn new(_services: Services) -> Self {
        Self {
            inputs: BTreeSet::new(),
        }
    }
}

impl Operation for TryLoadConfigFileOperation {
    fn name(&self) -> &'static str {
        "TryLoadConfigFile"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        load_config(pool, false)?;
        Ok(OperationResult::new(self.name()))
    }
}

/// Write the persisted parameters back to the project config file.
pub struct SaveConfigFileOperation {
    inputs: BTreeSet<ParameterName>,
}

impl SaveConfigFileOperation {
    pub fn new(_services: Services) -> Self {
        Self {
            inputs: input_set(&[
                ParameterName::ApplicationName,
                ParameterName::Region,
                ParameterName::EnvironmentName,
                ParameterName::SolutionStack,
            ]),
        }
    }
}

impl Operation for SaveConfigFileOperation {
    fn name(&self) -> &'static str {
        "SaveConfigFile"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        config_file::create_local_directory()?;
        let path = config_file::project_config_location();
        config_file::save_project_config(&path, pool)?;
        prompt::info(format!("Saved configuration to \"{}\".", path.display()));
        Ok(OperationResult::new(self.name())
            .with_message(format!("Saved configuration to \"{}\".", path.display())))
    }
}

/// Rotate the option settings snapshot aside when the solution stack
/// changed, so stale platform options are not pushed to the new stack.
pub struct RotateOptionSettingFileOperation {
    inputs: BTreeSet<ParameterName>,
}

impl RotateOptionSettingFileOperation {
    pub fn new(_services: Services) -> Self {
        Self {
            inputs: input_set(&[ParameterName::OptionSettingFile]),
        }
    }
}

impl Operation for RotateOptionSettingFileOperation {
    fn name(&self) -> &'static str {
        "RotateOptionSettingFile"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        let (Ok(current), Ok(original)) = (
            pool.str_value(ParameterName::SolutionStack),
            pool.str_value(ParameterName::OriginalSolutionStack),
        ) else {
            return Ok(OperationResult::new(self.name()));
        };
        if current == original {
            return Ok(OperationResult::new(self.name()));
        }
        let file = pool.str_value(ParameterName::OptionSettingFile)?.to_string();
        config_file::rotate_file(Path::new(&file))?;
        log::info!("Solution stack changed, rotated \"{file}\" aside.");
        Ok(OperationResult::new(self.name())
            .with_message(format!("Rotated \"{file}\" for the new solution stack.")))
    }
}

/// Snapshot the environment's current option settings to the local file.
/// Best effort only.
pub struct SaveConfigurationSettingOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

impl SaveConfigurationSettingOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: input_set(&[
                ParameterName::AccessKeyId,
                ParameterName::SecretAccessKey,
                ParameterName::ServiceEndpoint,
                ParameterName::ApplicationName,
                ParameterName::EnvironmentName,
                ParameterName::OptionSettingFile,
            ]),
        }
    }

    fn snapshot(&self, pool: &ParameterPool) -> CliResult<()> {
        let credentials = ApiCredentials::from_pool(pool)?;
        let application_name = pool.str_value(ParameterName::ApplicationName)?;
        let environment_name = pool.str_value(ParameterName::EnvironmentName)?;
        let file = pool.str_value(ParameterName::OptionSettingFile)?;

        let response = self.services.client.describe_configuration_settings(
            &credentials,
            application_name,
            environment_name,
        )?;
        config_file::save_option_settings(Path::new(file), &response.result)?;
        Ok(())
    }
}

impl Operation for SaveConfigurationSettingOperation {
    fn name(&self) -> &'static str {
        "SaveConfigurationSetting"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        if let Err(err) = self.snapshot(pool) {
            log::warn!("Cannot snapshot environment option settings: {err}");
        }
        Ok(OperationResult::new(self.name()))
    }
}

/// Write the deployment tooling settings into the local git config so the
/// push integration can find them. Failures are reported, never fatal.
pub struct UpdateDevToolsConfigOperation {
    services: Services,
    inputs: BTreeSet<ParameterName>,
}

impl UpdateDevToolsConfigOperation {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            inputs: input_set(&[
                ParameterName::AccessKeyId,
                ParameterName::SecretAccessKey,
                ParameterName::Region,
                ParameterName::ApplicationName,
                ParameterName::EnvironmentName,
            ]),
        }
    }

    fn write_git_config(&self, pool: &ParameterPool) -> CliResult<()> {
        let section = constants::DEV_TOOLS_CONFIG_SECTION;
        let entries = [
            ("application", pool.str_value(ParameterName::ApplicationName)?),
            ("environment", pool.str_value(ParameterName::EnvironmentName)?),
            ("region", pool.str_value(ParameterName::Region)?),
            ("access-key", pool.str_value(ParameterName::AccessKeyId)?),
            ("secret-key", pool.str_value(ParameterName::SecretAccessKey)?),
        ];
        for (key, value) in entries {
            self.services.runner.run(
                "git",
                &["config", "--local", &format!("{section}.{key}"), value],
            )?;
        }
        Ok(())
    }
}

impl Operation for UpdateDevToolsConfigOperation {
    fn name(&self) -> &'static str {
        "UpdateDevToolsConfig"
    }

    fn input_parameters(&self) -> &BTreeSet<ParameterName> {
        &self.inputs
    }

    fn execute(
        &mut self,
        pool: &mut ParameterPool,
        _context: &QueueContext,
    ) -> CliResult<OperationResult> {
        if let Err(err) = self.write_git_config(pool) {
            prompt::info(format!(
                "Cannot configure the deployment tooling integration: {err}"
            ));
            log::warn!("Dev tools git config update failed: {err}");
        }
        Ok(OperationResult::new(self.name()))
    }
}
