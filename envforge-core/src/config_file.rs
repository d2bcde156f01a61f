//! Local file store: project config, credential file, and the option
//! settings snapshot.
//!
//! Two small formats are used. The credential and project config files are
//! flat `key=value` files; the option settings snapshot groups `key=value`
//! lines under `[section]` headers, one section per option namespace. Both
//! formats tolerate blank lines and `#` comments.

use crate::constants;
use crate::parameter::{Parameter, ParameterName, ParameterPool, ParameterSource};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("file \"{0}\" was not found")]
    NotFound(PathBuf),

    #[error("file \"{path}\" is malformed: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("permission denied reading \"{0}\"")]
    PermissionDenied(PathBuf),

    #[error("cannot access \"{path}\": {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type ConfigFileResult<T> = Result<T, ConfigFileError>;

fn io_error(path: &Path, source: std::io::Error) -> ConfigFileError {
    match source.kind() {
        std::io::ErrorKind::NotFound => ConfigFileError::NotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => {
            ConfigFileError::PermissionDenied(path.to_path_buf())
        }
        _ => ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Parse a flat `key=value` file into a map, preserving nothing but the
/// last value for a repeated key.
fn parse_key_values(path: &Path, contents: &str) -> ConfigFileResult<BTreeMap<String, String>> {
    let mut entries = BTreeMap::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigFileError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("line {} has no \"=\" separator", index + 1),
            });
        };
        entries.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(entries)
}

/// Parse a sectioned file into section name -> `key=value` map. Lines before
/// the first section header are rejected.
fn parse_sections(
    path: &Path,
    contents: &str,
) -> ConfigFileResult<BTreeMap<String, BTreeMap<String, String>>> {
    let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    let mut current: Option<String> = None;
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let name = header.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }
        let Some(section) = &current else {
            return Err(ConfigFileError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("line {} appears before any [section] header", index + 1),
            });
        };
        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigFileError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("line {} has no \"=\" separator", index + 1),
            });
        };
        sections
            .entry(section.clone())
            .or_default()
            .insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(sections)
}

fn read_to_string(path: &Path) -> ConfigFileResult<String> {
    fs::read_to_string(path).map_err(|err| io_error(path, err))
}

fn write_string(path: &Path, contents: &str) -> ConfigFileResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
        }
    }
    let mut file = fs::File::create(path).map_err(|err| io_error(path, err))?;
    file.write_all(contents.as_bytes())
        .map_err(|err| io_error(path, err))
}

/// Parameter names persisted in the project config file, in write order.
const CONFIG_FILE_PARAMETERS: &[ParameterName] = &[
    ParameterName::ApplicationName,
    ParameterName::Region,
    ParameterName::EnvironmentName,
    ParameterName::SolutionStack,
    ParameterName::ServiceEndpoint,
    ParameterName::DatabaseEnabled,
    ParameterName::DatabaseSnapshotName,
    ParameterName::DatabaseDeletionPolicy,
];

/// Path of the project config file under the local state directory.
pub fn project_config_location() -> PathBuf {
    Path::new(constants::LOCAL_DIR).join(constants::CONFIG_FILE_NAME)
}

/// Path of the option settings snapshot under the local state directory.
pub fn option_setting_location() -> PathBuf {
    Path::new(constants::LOCAL_DIR).join(constants::OPTION_SETTING_FILE_NAME)
}

/// Default credential file location under the user's home directory, when a
/// home directory can be determined.
pub fn default_credential_file_location() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
    Some(
        PathBuf::from(home)
            .join(constants::CREDENTIAL_FILE_DIR)
            .join(constants::CREDENTIAL_FILE_NAME),
    )
}

/// Load the project config file into the pool at `ConfigFile` source.
///
/// The stored solution stack is additionally recorded under a separate name
/// so a later update can detect that the remote stack changed.
pub fn load_project_config(path: &Path, pool: &mut ParameterPool) -> ConfigFileResult<()> {
    let entries = parse_key_values(path, &read_to_string(path)?)?;
    for name in CONFIG_FILE_PARAMETERS {
        let Some(raw) = entries.get(name.as_str()) else {
            continue;
        };
        let parameter = match name {
            ParameterName::DatabaseEnabled => Parameter::new(
                *name,
                raw.eq_ignore_ascii_case("yes"),
                ParameterSource::ConfigFile,
            ),
            _ => Parameter::new(*name, raw.as_str(), ParameterSource::ConfigFile),
        };
        pool.put(parameter, false);
    }
    if let Some(stack) = entries.get(ParameterName::SolutionStack.as_str()) {
        pool.put(
            Parameter::new(
                ParameterName::OriginalSolutionStack,
                stack.as_str(),
                ParameterSource::ConfigFile,
            ),
            false,
        );
    }
    Ok(())
}

/// Write the persisted subset of the pool to the project config file.
pub fn save_project_config(path: &Path, pool: &ParameterPool) -> ConfigFileResult<()> {
    let mut contents = String::new();
    for name in CONFIG_FILE_PARAMETERS {
        let Ok(parameter) = pool.get(*name) else {
            continue;
        };
        let value = match name {
            ParameterName::DatabaseEnabled => {
                let enabled = parameter.value().as_bool().unwrap_or(false);
                if enabled { "yes" } else { "no" }.to_string()
            }
            _ => parameter.value().to_string(),
        };
        contents.push_str(&format!("{}={}\n", name.as_str(), value));
    }
    write_string(path, &contents)?;
    set_access_permission(path, false)?;
    Ok(())
}

/// Name of the per-environment master password key in the credential file.
pub fn password_key_name(environment_name: &str) -> String {
    format!("DatabaseMasterPassword.{environment_name}")
}

/// Names the credential file can supply for a given environment, paired with
/// their file keys.
fn credential_keys(environment_name: &str) -> Vec<(ParameterName, String)> {
    vec![
        (
            ParameterName::AccessKeyId,
            constants::CREDENTIAL_KEY_ACCESS_KEY.to_string(),
        ),
        (
            ParameterName::SecretAccessKey,
            constants::CREDENTIAL_KEY_SECRET_KEY.to_string(),
        ),
        (
            ParameterName::DatabaseMasterPassword,
            password_key_name(environment_name),
        ),
    ]
}

/// Read the credential file into the pool at the given source, touching only
/// names the pool does not already hold.
pub fn read_credential_file(
    path: &Path,
    pool: &mut ParameterPool,
    source: ParameterSource,
) -> ConfigFileResult<()> {
    let entries = parse_key_values(path, &read_to_string(path)?)?;
    let environment_name = pool
        .str_value(ParameterName::EnvironmentName)
        .map(str::to_owned)
        .unwrap_or_default();
    for (name, key) in credential_keys(&environment_name) {
        if pool.has(name) {
            continue;
        }
        if let Some(value) = entries.get(&key) {
            pool.put(Parameter::new(name, value.as_str(), source), false);
        }
    }
    Ok(())
}

/// Write the given keys into the credential file, preserving every other
/// entry already there. Creates the file when absent.
pub fn update_credential_file(
    path: &Path,
    updates: &[(String, String)],
) -> ConfigFileResult<()> {
    let mut entries = match read_to_string(path) {
        Ok(contents) => parse_key_values(path, &contents)?,
        Err(ConfigFileError::NotFound(_)) => BTreeMap::new(),
        Err(err) => return Err(err),
    };
    for (key, value) in updates {
        entries.insert(key.clone(), value.clone());
    }
    write_entries(path, &entries)
}

/// Remove the per-environment master password key from the credential file,
/// if the file exists and carries it.
pub fn trim_credential_file(path: &Path, environment_name: &str) -> ConfigFileResult<()> {
    let mut entries = match read_to_string(path) {
        Ok(contents) => parse_key_values(path, &contents)?,
        Err(ConfigFileError::NotFound(_)) => return Ok(()),
        Err(err) => return Err(err),
    };
    if entries.remove(&password_key_name(environment_name)).is_none() {
        return Ok(());
    }
    write_entries(path, &entries)
}

fn write_entries(path: &Path, entries: &BTreeMap<String, String>) -> ConfigFileResult<()> {
    let mut contents = String::new();
    for (key, value) in entries {
        contents.push_str(&format!("{key}={value}\n"));
    }
    write_string(path, &contents)?;
    set_access_permission(path, false)?;
    Ok(())
}

/// Write option settings grouped by namespace to the snapshot file.
pub fn save_option_settings(
    path: &Path,
    settings: &[crate::api::model::OptionSetting],
) -> ConfigFileResult<()> {
    let mut by_namespace: BTreeMap<&str, Vec<&crate::api::model::OptionSetting>> = BTreeMap::new();
    for setting in settings {
        by_namespace
            .entry(setting.namespace.as_str())
            .or_default()
            .push(setting);
    }
    let mut contents = String::new();
    for (namespace, group) in by_namespace {
        contents.push_str(&format!("[{namespace}]\n"));
        for setting in group {
            contents.push_str(&format!("{}={}\n", setting.option_name, setting.value));
        }
        contents.push('\n');
    }
    write_string(path, &contents)
}

/// Read the option settings snapshot back into a flat list.
pub fn load_option_settings(path: &Path) -> ConfigFileResult<Vec<crate::api::model::OptionSetting>> {
    let sections = parse_sections(path, &read_to_string(path)?)?;
    let mut settings = Vec::new();
    for (namespace, entries) in sections {
        for (option_name, value) in entries {
            settings.push(crate::api::model::OptionSetting::new(
                namespace.clone(),
                option_name,
                value,
            ));
        }
    }
    Ok(settings)
}

/// Rename `path` to the first free `path.N` slot. A missing file is fine.
pub fn rotate_file(path: &Path) -> ConfigFileResult<()> {
    if !path.exists() {
        return Ok(());
    }
    for index in 1..=constants::ROTATION_MAX_RETRY {
        let mut candidate = path.as_os_str().to_owned();
        candidate.push(format!(".{index}"));
        let candidate = PathBuf::from(candidate);
        if !candidate.exists() {
            return fs::rename(path, &candidate).map_err(|err| io_error(path, err));
        }
    }
    Err(ConfigFileError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::other("no free rotation slot"),
    })
}

/// Append any of `entries` not already present to the ignore file, creating
/// it when absent.
pub fn append_ignore_entries(path: &Path, entries: &[&str]) -> ConfigFileResult<()> {
    let existing = match read_to_string(path) {
        Ok(contents) => contents,
        Err(ConfigFileError::NotFound(_)) => String::new(),
        Err(err) => return Err(err),
    };
    let present: Vec<&str> = existing.lines().map(str::trim).collect();
    let missing: Vec<&str> = entries
        .iter()
        .copied()
        .filter(|entry| !present.contains(entry))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let mut contents = existing;
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    for entry in missing {
        contents.push_str(entry);
        contents.push('\n');
    }
    write_string(path, &contents)
}

/// True when the file is readable by anyone other than its owner.
#[cfg(unix)]
pub fn check_access_permission(path: &Path) -> ConfigFileResult<bool> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = fs::metadata(path).map_err(|err| io_error(path, err))?;
    Ok(metadata.permissions().mode() & 0o077 != 0)
}

#[cfg(not(unix))]
pub fn check_access_permission(_path: &Path) -> ConfigFileResult<bool> {
    Ok(false)
}

/// Restrict the file to owner read/write (plus execute when `executable`).
#[cfg(unix)]
pub fn set_access_permission(path: &Path, executable: bool) -> ConfigFileResult<()> {
    use std::os::unix::fs::PermissionsExt;
    let mode = if executable { 0o700 } else { 0o600 };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|err| io_error(path, err))
}

#[cfg(not(unix))]
pub fn set_access_permission(_path: &Path, _executable: bool) -> ConfigFileResult<()> {
    Ok(())
}

/// Create the local state directory if it does not exist.
pub fn create_local_directory() -> ConfigFileResult<()> {
    let path = Path::new(constants::LOCAL_DIR);
    fs::create_dir_all(path).map_err(|err| io_error(path, err))
}
