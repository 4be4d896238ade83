use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    /// Development builds get the demo users and messages on start-up.
    pub fn seeds_demo_data(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
}

impl Database {
    /// Filesystem path (or `:memory:`) for the configured URL.
    ///
    /// Accepts bare paths as well as `sqlite://` and `sqlite:` prefixed URLs.
    pub fn path(&self) -> &str {
        let url = self.url.trim();
        url.strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url)
    }
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub environment: Environment,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub ttl_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub app: App,
    pub session: Session,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // settings.toml is optional; look in the cwd, then in the crate dir for development
        let config_file_name = "settings.toml";

        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        let dev_path = PathBuf::from("warbler-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("database.url", "warbler.db")?
            .set_default("app.environment", "development")?
            .set_default("session.ttl_days", 30)?;

        // Environment variables win over everything else
        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }
        if let Ok(env) = std::env::var("WARBLER_ENV") {
            builder = builder.set_override("app.environment", env.to_lowercase())?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(host) = std::env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Ok(ttl) = std::env::var("SESSION_TTL_DAYS") {
            builder = builder.set_override("session.ttl_days", ttl)?;
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}
