use super::logger::{LogLevel, LoggerConfig};

/// Configuration for kernel launches.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LaunchConfig {
    /// Logger used to report launches.
    #[serde(default)]
    pub logger: LoggerConfig<LaunchLogLevel>,
}

/// How much is logged for every launch.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LaunchLogLevel {
    /// Nothing is logged.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// The kernel name and launch geometry.
    #[serde(rename = "basic")]
    Basic,

    /// Everything in basic, plus the bindings metadata and the committed value.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for LaunchLogLevel {}
