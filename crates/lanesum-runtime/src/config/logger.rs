use super::{launch::LaunchLogLevel, GlobalConfig};
use core::fmt::Display;
use std::sync::Arc;

#[cfg(std_io)]
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Where launch messages go and how verbose they are.
///
/// Every enabled sink receives every message.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// File receiving the messages (requires `std`).
    #[cfg(std_io)]
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Keep the previous content of `file` instead of truncating it.
    #[serde(default = "append_default")]
    pub append: bool,

    /// Print messages on stdout.
    #[serde(default)]
    pub stdout: bool,

    /// Print messages on stderr.
    #[serde(default)]
    pub stderr: bool,

    /// Forward messages to the `log` crate at this level.
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// Verbosity.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            #[cfg(std_io)]
            file: None,
            append: append_default(),
            stdout: false,
            stderr: false,
            log: None,
            level: L::default(),
        }
    }
}

fn append_default() -> bool {
    true
}

/// Level used when forwarding messages to the `log` crate.
#[derive(
    Clone, Copy, Debug, Default, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogCrateLevel {
    /// `log::info!`.
    #[default]
    Info,
    /// `log::debug!`.
    Debug,
    /// `log::trace!`.
    Trace,
}

impl From<LogCrateLevel> for log::Level {
    fn from(level: LogCrateLevel) -> Self {
        match level {
            LogCrateLevel::Info => log::Level::Info,
            LogCrateLevel::Debug => log::Level::Debug,
            LogCrateLevel::Trace => log::Level::Trace,
        }
    }
}

/// Verbosity enum of a [`LoggerConfig`].
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
}

/// Sends launch messages to the sinks enabled in the [global configuration](GlobalConfig).
#[derive(Debug)]
pub struct Logger {
    sinks: Vec<Sink>,
    /// The configuration the sinks were opened from.
    pub config: Arc<GlobalConfig>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Open the sinks of the global configuration.
    ///
    /// This opens files, so clients create their logger once.
    pub fn new() -> Self {
        Self::from_config(GlobalConfig::get())
    }

    /// Open the sinks of `config`.
    pub fn from_config(config: Arc<GlobalConfig>) -> Self {
        let settings = &config.launch.logger;
        let mut sinks = Vec::new();

        if settings.level == LaunchLogLevel::Disabled {
            return Self { sinks, config };
        }

        #[cfg(std_io)]
        if let Some(path) = &settings.file {
            match LogFile::open(path, settings.append) {
                Ok(file) => sinks.push(Sink::File(file)),
                Err(err) => log::warn!("Can't open log file {}: {err}", path.display()),
            }
        }

        if settings.stdout {
            sinks.push(Sink::Stdout);
        }
        if settings.stderr {
            sinks.push(Sink::Stderr);
        }
        if let Some(level) = settings.log {
            sinks.push(Sink::Log(level.into()));
        }

        Self { sinks, config }
    }

    /// Write a launch message to every sink.
    pub fn log_launch<S: Display>(&mut self, msg: &S) {
        match self.sinks.as_mut_slice() {
            [] => {}
            [sink] => sink.write(msg),
            sinks => {
                // Format once for all sinks.
                let msg = msg.to_string();
                sinks.iter_mut().for_each(|sink| sink.write(&msg));
            }
        }
    }

    /// The configured launch verbosity.
    pub fn log_level_launch(&self) -> LaunchLogLevel {
        self.config.launch.logger.level
    }

    /// Whether any sink receives launch messages.
    pub fn is_active(&self) -> bool {
        !self.sinks.is_empty()
    }
}

#[derive(Debug)]
enum Sink {
    #[cfg(std_io)]
    File(LogFile),
    Stdout,
    Stderr,
    Log(log::Level),
}

impl Sink {
    fn write<S: Display>(&mut self, msg: &S) {
        match self {
            #[cfg(std_io)]
            Sink::File(file) => file.write(msg),
            Sink::Stdout => println!("{msg}"),
            Sink::Stderr => eprintln!("{msg}"),
            Sink::Log(level) => log::log!(*level, "{msg}"),
        }
    }
}

/// Log file, flushed after every message.
#[cfg(std_io)]
#[derive(Debug)]
struct LogFile {
    writer: BufWriter<File>,
}

#[cfg(std_io)]
impl LogFile {
    fn open(path: &Path, append: bool) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write<S: Display>(&mut self, msg: &S) {
        let written = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush());

        if let Err(err) = written {
            log::warn!("Can't write to the launch log file: {err}");
        }
    }
}

#[cfg(all(test, std_io))]
mod tests {
    use super::*;

    #[test]
    fn disabled_logger_has_no_sink() {
        let logger = Logger::from_config(Arc::new(GlobalConfig::default()));
        assert!(!logger.is_active());
        assert_eq!(logger.log_level_launch(), LaunchLogLevel::Disabled);
    }

    #[test]
    fn sinks_need_a_level() {
        let mut config = GlobalConfig::default();
        config.launch.logger.stdout = true;

        assert!(!Logger::from_config(Arc::new(config)).is_active());
    }

    #[test]
    fn file_logger_writes_every_message() {
        let path = std::env::temp_dir().join(format!("lanesum-{}-launch.log", std::process::id()));

        let mut config = GlobalConfig::default();
        config.launch.logger.level = LaunchLogLevel::Basic;
        config.launch.logger.append = false;
        config.launch.logger.file = Some(path.clone());
        config.launch.logger.log = Some(LogCrateLevel::Trace);

        let mut logger = Logger::from_config(Arc::new(config));
        assert!(logger.is_active());
        logger.log_launch(&"first");
        logger.log_launch(&"second");
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn crate_levels_map_to_log_levels() {
        assert_eq!(log::Level::from(LogCrateLevel::Debug), log::Level::Debug);
        assert_eq!(log::Level::from(LogCrateLevel::Trace), log::Level::Trace);
    }
}
