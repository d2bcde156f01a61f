//! Fixed names, locations, and service defaults shared across the tool.

/// Directory created next to the project sources for local tool state.
pub const LOCAL_DIR: &str = ".envforge";

/// Project configuration file inside [`LOCAL_DIR`].
pub const CONFIG_FILE_NAME: &str = "config";

/// Snapshot of remote environment option settings inside [`LOCAL_DIR`].
pub const OPTION_SETTING_FILE_NAME: &str = "optionsettings";

/// Log file written inside [`LOCAL_DIR`].
pub const LOG_FILE_NAME: &str = "envforge.log";

/// OS environment variable that may point at a credential file.
pub const CREDENTIAL_FILE_ENV_VAR: &str = "AWS_CREDENTIAL_FILE";

/// Directory under the user's home folder holding the shared credential file.
pub const CREDENTIAL_FILE_DIR: &str = ".envforge";

/// Name of the shared credential file.
pub const CREDENTIAL_FILE_NAME: &str = "credentials";

/// Credential file key for the access key id.
pub const CREDENTIAL_KEY_ACCESS_KEY: &str = "AWSAccessKeyId";

/// Credential file key for the secret access key.
pub const CREDENTIAL_KEY_SECRET_KEY: &str = "AWSSecretKey";

/// Regions the environment service is available in, with display names.
pub const AVAILABLE_REGIONS: &[(&str, &str)] = &[
    ("us-east-1", "US East (Virginia)"),
    ("us-west-1", "US West (North California)"),
    ("us-west-2", "US West (Oregon)"),
    ("eu-west-1", "EU West (Ireland)"),
    ("ap-northeast-1", "Asia Pacific (Tokyo)"),
    ("ap-southeast-1", "Asia Pacific (Singapore)"),
    ("sa-east-1", "South America (Sao Paulo)"),
];

/// Service endpoint for a region, if the region is recognized.
pub fn service_endpoint(region: &str) -> Option<String> {
    if is_known_region(region) {
        Some(format!("https://envforge.{region}.cloudvine.io"))
    } else {
        None
    }
}

/// Database service endpoint for a region, if the region is recognized.
pub fn database_endpoint(region: &str) -> Option<String> {
    if is_known_region(region) {
        Some(format!("https://db.envforge.{region}.cloudvine.io"))
    } else {
        None
    }
}

pub fn is_known_region(region: &str) -> bool {
    AVAILABLE_REGIONS.iter().any(|(id, _)| *id == region)
}

/// Option setting namespace used for the integrated database.
pub const DATABASE_NAMESPACE: &str = "envforge:database";

/// Characters stripped when deriving an environment name from an application name.
pub const ENVIRONMENT_NAME_FILTER: &str = "[^A-Za-z0-9-]";

/// Postfix appended to a derived environment name.
pub const ENVIRONMENT_NAME_POSTFIX: &str = "-env";

/// Maximum length of an environment name.
pub const ENVIRONMENT_NAME_MAX_LEN: usize = 23;

/// Default version label used when launching an application.
pub const DEFAULT_VERSION_LABEL: &str = "Sample Application";

/// Default number of seconds to wait for an environment state transition.
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 600;

/// Seconds between polls while waiting for an environment state transition.
pub const POLL_INTERVAL_SECS: u64 = 10;

/// Settling delay after requesting environment creation.
pub const SLEEP_AFTER_LAUNCH_SECS: u64 = 10;

/// Maximum number of rotated copies of a stale option settings file.
pub const ROTATION_MAX_RETRY: u32 = 1000;

/// Git config section used by the deployment tooling integration.
pub const DEV_TOOLS_CONFIG_SECTION: &str = "envforge";

/// User agent sent on every service request.
pub const USER_AGENT: &str = concat!("envforge-cli/", env!("CARGO_PKG_VERSION"));

/// Query API version sent on every service request.
pub const API_VERSION: &str = "2012-12-01";
