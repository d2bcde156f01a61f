//! Built-in parameter defaults filled in before any other source.

use super::{Parameter, ParameterName, ParameterPool, ParameterSource};
use crate::constants;

/// Seed the pool with defaults. They carry the lowest priority, so any other
/// source overrides them.
pub fn fill_defaults(pool: &mut ParameterPool) {
    let option_setting_file = format!(
        "{}/{}",
        constants::LOCAL_DIR,
        constants::OPTION_SETTING_FILE_NAME
    );
    pool.put(
        Parameter::new(
            ParameterName::OptionSettingFile,
            option_setting_file,
            ParameterSource::Default,
        ),
        false,
    );
    pool.put(
        Parameter::new(
            ParameterName::ApplicationVersionName,
            constants::DEFAULT_VERSION_LABEL,
            ParameterSource::Default,
        ),
        false,
    );
    pool.put(
        Parameter::new(
            ParameterName::WaitTimeout,
            constants::DEFAULT_WAIT_TIMEOUT_SECS,
            ParameterSource::Default,
        ),
        false,
    );
}
