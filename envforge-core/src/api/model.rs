//! Wire model for the environment service responses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state reported for an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvironmentStatus {
    Launching,
    Updating,
    Ready,
    Terminating,
    Terminated,
    #[serde(other)]
    Unknown,
}

impl EnvironmentStatus {
    /// States the environment cannot leave on its own.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Terminated)
    }
}

impl fmt::Display for EnvironmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Launching => "Launching",
            Self::Updating => "Updating",
            Self::Ready => "Ready",
            Self::Terminating => "Terminating",
            Self::Terminated => "Terminated",
            Self::Unknown => "Unknown",
        };
        f.write_str(text)
    }
}

/// Coarse health signal reported for an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnvironmentHealth {
    Green,
    Yellow,
    Red,
    #[default]
    #[serde(other)]
    Grey,
}

impl fmt::Display for EnvironmentHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Green => "Green",
            Self::Yellow => "Yellow",
            Self::Red => "Red",
            Self::Grey => "Grey",
        };
        f.write_str(text)
    }
}

/// One environment as described by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentDescription {
    pub environment_name: String,
    #[serde(default)]
    pub environment_id: Option<String>,
    pub application_name: String,
    #[serde(default)]
    pub version_label: Option<String>,
    #[serde(default)]
    pub solution_stack_name: Option<String>,
    pub status: EnvironmentStatus,
    #[serde(default)]
    pub health: EnvironmentHealth,
    #[serde(default, rename = "CNAME")]
    pub cname: Option<String>,
    #[serde(default, rename = "EndpointURL")]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
}

/// One configuration option setting (namespace, name, value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OptionSetting {
    pub namespace: String,
    pub option_name: String,
    pub value: String,
}

impl OptionSetting {
    pub fn new(
        namespace: impl Into<String>,
        option_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            option_name: option_name.into(),
            value: value.into(),
        }
    }
}

/// One event emitted by an environment while it changes state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventDescription {
    #[serde(default)]
    pub event_date: Option<String>,
    pub severity: String,
    pub message: String,
}

/// Request body for launching a new environment.
#[derive(Debug, Clone)]
pub struct CreateEnvironmentRequest {
    pub application_name: String,
    pub environment_name: String,
    pub version_label: Option<String>,
    pub solution_stack: Option<String>,
    pub option_settings: Vec<OptionSetting>,
}
