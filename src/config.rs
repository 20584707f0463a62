//! Command-line and environment configuration.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".school-manager";
/// SQLite file name stored inside the application data directory.
pub const DB_FILE_NAME: &str = "school1.db";
/// Log file written next to the database unless overridden.
const LOG_FILE_NAME: &str = "school-manager.log";

/// Terminal front-end for the school records database.
#[derive(Parser, Debug, Clone)]
#[command(name = "school-manager", version, about)]
pub struct Config {
    /// SQLite database file (defaults to ~/.school-manager/school1.db)
    #[arg(long = "db", env = "SCHOOL_MANAGER_DB")]
    pub db_path: Option<PathBuf>,

    /// Where to write logs (defaults to a file next to the database)
    #[arg(long, env = "SCHOOL_MANAGER_LOG")]
    pub log_file: Option<PathBuf>,

    /// Default log filter; RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Database location after applying the home-directory default.
    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => default_db_path(),
        }
    }

    /// Log file location. Without an explicit path the log sits beside the
    /// database file.
    pub fn resolved_log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log_file {
            return Ok(path.clone());
        }
        let db_path = self.resolved_db_path()?;
        Ok(db_path
            .parent()
            .map(|dir| dir.join(LOG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME)))
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_paths_win() {
        let config =
            Config::try_parse_from(["school-manager", "--db", "/tmp/x/school.db", "--log-level", "debug"])
                .unwrap();
        assert_eq!(config.resolved_db_path().unwrap(), PathBuf::from("/tmp/x/school.db"));
        assert_eq!(
            config.resolved_log_path().unwrap(),
            PathBuf::from("/tmp/x/school-manager.log")
        );
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn log_file_can_be_overridden() {
        let config = Config::try_parse_from([
            "school-manager",
            "--db",
            "school.db",
            "--log-file",
            "/var/log/school.log",
        ])
        .unwrap();
        assert_eq!(config.resolved_log_path().unwrap(), PathBuf::from("/var/log/school.log"));
    }

    #[test]
    fn bare_file_name_logs_to_working_directory() {
        let config = Config::try_parse_from(["school-manager", "--db", "school.db"]).unwrap();
        assert_eq!(config.resolved_log_path().unwrap(), PathBuf::from("school-manager.log"));
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Config::try_parse_from(["school-manager", "--port", "80"]).is_err());
    }
}
