use crate::constants::*;
use std::env;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub data_path: String,
    pub database_file: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(String),
    #[error("Invalid database file name: {0:?}")]
    InvalidDatabaseFile(String),
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first if a
    /// `.env` file should be honoured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("SERVER_PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
        let data_path = lookup("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
        let database_file =
            lookup("DATABASE_FILE").unwrap_or_else(|| DEFAULT_DATABASE_FILE.to_string());

        // Validate port is a valid number
        if port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidPort(port));
        }

        // The file must stay inside data_path
        let trimmed = database_file.trim();
        let mut components = Path::new(trimmed).components();
        let single_name = matches!(components.next(), Some(Component::Normal(_)))
            && components.next().is_none();
        if !single_name {
            return Err(ConfigError::InvalidDatabaseFile(database_file));
        }

        Ok(Config {
            host,
            port,
            data_path,
            database_file: trimmed.to_string(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn database_location(&self) -> PathBuf {
        Path::new(&self.data_path).join(&self.database_file)
    }
}
