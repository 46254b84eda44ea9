use std::error;
use std::fmt;
use std::path::PathBuf;

use log::LevelFilter;

/// Environment variable holding the log level
pub const LOG_ENV: &str = "LS8_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingArgument,
    TooManyArguments { count: usize },
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingArgument => f.write_str("missing input file"),
            ConfigError::TooManyArguments { count } => {
                write!(f, "expected one input file but got {} arguments", count)
            }
            ConfigError::InvalidLogLevel { value } => {
                write!(f, "invalid log level `{}` in {}", value, LOG_ENV)
            }
        }
    }
}

impl error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the program image
    pub program: PathBuf,
    pub log_level: LevelFilter,
}

impl Config {
    /// Reads the config from the process arguments and environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let log_level = std::env::var(LOG_ENV).ok();
        Self::from_args(std::env::args().skip(1), log_level.as_deref())
    }

    /// Builds the config from the arguments after the program name
    pub fn from_args<I>(args: I, log_level: Option<&str>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let program = match args.as_slice() {
            [] => return Err(ConfigError::MissingArgument),
            [program] => PathBuf::from(program),
            _ => return Err(ConfigError::TooManyArguments { count: args.len() }),
        };

        let log_level = match log_level {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidLogLevel {
                    value: value.to_string(),
                })?,
            None => LevelFilter::Warn,
        };

        Ok(Self { program, log_level })
    }
}
