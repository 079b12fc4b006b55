use super::{device::DeviceConfig, launch::LaunchConfig};
use std::sync::Arc;

/// Static mutex holding the global configuration, initialized as `None`.
static LANESUM_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

/// Represents the global configuration for lanesum, combining device and launch settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Configuration of the simulated device.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Configuration for kernel launches.
    #[serde(default)]
    pub launch: LaunchConfig,
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it from the current directory if not set.
    ///
    /// If no configuration is set, it attempts to load one from `lanesum.toml` or `LaneSum.toml` in
    /// the current directory or its parents. If no file is found, a default configuration is used.
    ///
    /// # Notes
    ///
    /// Calling this function is somewhat expensive, because of a global static lock. Runtimes read
    /// it once when their client is created.
    pub fn get() -> Arc<Self> {
        let mut state = LANESUM_GLOBAL_CONFIG.lock();

        if let Some(config) = state.as_ref() {
            return config.clone();
        }

        cfg_if::cfg_if! {
            if #[cfg(std_io)] {
                let config = Self::from_current_dir().override_from_env();
            } else {
                let config = Self::default();
            }
        }

        let config = Arc::new(config);
        *state = Some(config.clone());
        config
    }

    #[cfg(std_io)]
    /// Save the current configuration to the provided file path.
    pub fn save_default<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<()> {
        use std::io::Write;

        let config = Self::get();
        let content = toml::to_string_pretty(config.as_ref())
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(content.as_bytes())?;

        Ok(())
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    ///
    /// # Warning
    /// This method must be called at the start of the program, before any calls to `get`. Attempting
    /// to set the configuration after it has been initialized will cause a panic.
    pub fn set(config: Self) {
        let mut state = LANESUM_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    #[cfg(std_io)]
    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(mut self) -> Self {
        use super::launch::LaunchLogLevel;

        if let Ok(val) = std::env::var("LANESUM_DEBUG_LOG") {
            self.launch.logger.level = LaunchLogLevel::Full;

            match val.as_str() {
                "stdout" => {
                    self.launch.logger.stdout = true;
                }
                "stderr" => {
                    self.launch.logger.stderr = true;
                }
                "1" | "true" => {
                    self.launch.logger.file = Some("/tmp/lanesum.log".into());
                }
                "0" | "false" => {
                    self.launch.logger.level = LaunchLogLevel::Disabled;
                }
                file_path => {
                    self.launch.logger.file = Some(file_path.into());
                }
            }
        };

        if let Ok(val) = std::env::var("LANESUM_PLANE_DIM") {
            match val.parse::<u32>() {
                Ok(plane_dim) => self.device.plane_dim = plane_dim,
                Err(err) => log::warn!("Ignoring LANESUM_PLANE_DIM={val}: {err}"),
            }
        }

        self
    }

    // Loads configuration from `lanesum.toml` or `LaneSum.toml` in the current directory or its parents.
    //
    // Traverses up the directory tree until a valid configuration file is found or the root is reached.
    // Returns a default configuration if no file is found.
    #[cfg(std_io)]
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            if let Ok(content) = Self::from_file_path(dir.join("lanesum.toml")) {
                return content;
            }

            if let Ok(content) = Self::from_file_path(dir.join("LaneSum.toml")) {
                return content;
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }

    // Loads configuration from a specified file path.
    #[cfg(std_io)]
    pub(crate) fn from_file_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = match toml::from_str(&content) {
            Ok(val) => val,
            Err(err) => panic!("The file provided doesn't have the right format => {err:?}"),
        };

        Ok(config)
    }
}

#[cfg(all(test, std_io))]
mod tests {
    use super::*;
    use crate::config::launch::LaunchLogLevel;
    use crate::config::LogCrateLevel;
    use serial_test::serial;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("lanesum-{}-{name}", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn parses_partial_file() {
        let path = write_config(
            "partial.toml",
            r#"
            [device]
            plane_dim = 16

            [launch.logger]
            level = "basic"
            stderr = true
            log = "debug"
            "#,
        );

        let config = GlobalConfig::from_file_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.device.plane_dim, 16);
        assert_eq!(config.device.max_units_per_cube, 1024);
        assert_eq!(config.launch.logger.level, LaunchLogLevel::Basic);
        assert!(config.launch.logger.stderr);
        assert!(!config.launch.logger.stdout);
        assert!(config.launch.logger.append);
        assert_eq!(config.launch.logger.log, Some(LogCrateLevel::Debug));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("lanesum-does-not-exist.toml");
        assert!(GlobalConfig::from_file_path(path).is_err());
    }

    #[test]
    #[should_panic(expected = "doesn't have the right format")]
    fn malformed_file_panics() {
        let path = write_config("malformed.toml", "[device]\nplane_dim = \"wide\"\n");
        let _ = GlobalConfig::from_file_path(&path);
    }

    #[test]
    #[serial]
    fn env_overrides_logger_and_plane_dim() {
        std::env::set_var("LANESUM_DEBUG_LOG", "stdout");
        std::env::set_var("LANESUM_PLANE_DIM", "8");
        let config = GlobalConfig::default().override_from_env();
        std::env::remove_var("LANESUM_DEBUG_LOG");
        std::env::remove_var("LANESUM_PLANE_DIM");

        assert_eq!(config.launch.logger.level, LaunchLogLevel::Full);
        assert!(config.launch.logger.stdout);
        assert_eq!(config.device.plane_dim, 8);
    }

    #[test]
    #[serial]
    fn env_can_disable_logging() {
        std::env::set_var("LANESUM_DEBUG_LOG", "0");
        std::env::set_var("LANESUM_PLANE_DIM", "not-a-number");
        let config = GlobalConfig::default().override_from_env();
        std::env::remove_var("LANESUM_DEBUG_LOG");
        std::env::remove_var("LANESUM_PLANE_DIM");

        assert_eq!(config.launch.logger.level, LaunchLogLevel::Disabled);
        assert_eq!(config.device.plane_dim, 32);
    }

    #[test]
    fn non_power_of_two_plane_dim_falls_back() {
        let mut config = GlobalConfig::default();
        config.device.plane_dim = 24;
        assert_eq!(config.device.plane_dim_checked(), 32);

        config.device.plane_dim = 64;
        assert_eq!(config.device.plane_dim_checked(), 64);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let content = toml::to_string_pretty(&GlobalConfig::default()).unwrap();
        let config: GlobalConfig = toml::from_str(&content).unwrap();

        assert_eq!(config.device, DeviceConfig::default());
        assert_eq!(config.launch.logger.level, LaunchLogLevel::Disabled);
    }
}
