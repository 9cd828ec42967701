//! Layered configuration.
//!
//! Sources, lowest precedence first: built-in defaults, `config.toml` in the working directory,
//! an explicit config file, `DROPOUT_*` environment variables (with `__` between nested keys, as
//! in `DROPOUT_STORE__DATABASE_URL`), and finally `DATABASE_URL` (which may come from a `.env`
//! file).

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_DATABASE_URL: &str = "students.db";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Base name of the optional config file looked up in the working directory.
pub const WORKING_DIR_CONFIG: &str = "config";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub store: StoreSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StoreSettings {
    /// Path of the `sqlite3` file holding the student records.
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogSettings {
    /// A `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Settings {
    /// Loads the settings from every source, reading `.env` into the process environment first.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment: Map<String, String> = std::env::vars().collect();
        Self::from_sources(Some(WORKING_DIR_CONFIG), config_file, environment)
    }

    /// Builds the settings from explicit sources.
    ///
    /// `working_dir_config` is the base name of an optional config file, `config_file` a config
    /// file that must exist, and `environment` the variables to read `DROPOUT_*` and
    /// `DATABASE_URL` from.
    pub fn from_sources(
        working_dir_config: Option<&str>,
        config_file: Option<&Path>,
        environment: Map<String, String>,
    ) -> Result<Self, ConfigError> {
        let database_url = environment.get("DATABASE_URL").cloned();

        let mut builder = Config::builder()
            .set_default("store.database_url", DEFAULT_DATABASE_URL)?
            .set_default("log.filter", DEFAULT_LOG_FILTER)?;

        if let Some(name) = working_dir_config {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("DROPOUT")
                    .prefix_separator("_")
                    .separator("__")
                    .source(Some(environment)),
            )
            .set_override_option("store.database_url", database_url)?
            .build()?;

        settings.try_deserialize()
    }
}
