//! Runtime configuration read once at startup.

mod env;

use std::{net::IpAddr, path::PathBuf};

use anyhow::{Context, Result};

use crate::{
    auth::AuthConfig,
    cors::{config as cors, CorsConfig},
};
pub use env::Env;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DIST_PATH: &str = "public/dist";
pub const DEFAULT_DATABASE_PATH: &str = "database/database.sqlite";
/// Optional file with default environment values, relative to the working directory.
pub const DOTENV_PATH: &str = ".env";

/// Where todos, settings and SEO entries are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Database {
    /// Process-local stores, emptied on restart.
    Memory,
    /// A SQLite file, created with its schema on first connect.
    Sqlite(PathBuf),
}

impl Database {
    fn load(env: &Env) -> Result<Self> {
        match env.get("DB_CONNECTION", "sqlite").as_str() {
            "sqlite" => Ok(Self::Sqlite(PathBuf::from(
                env.get("DB_DATABASE", DEFAULT_DATABASE_PATH),
            ))),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unsupported DB_CONNECTION: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the environment, e.g. `production` or `development`.
    pub env: String,
    /// Exposes fatal error details to clients outside development too.
    pub debug: bool,
    pub host: IpAddr,
    pub port: u16,
    /// Directory holding the built frontend.
    pub dist_path: PathBuf,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub database: Database,
}

impl Config {
    /// Reads the process environment, with defaults from [DOTENV_PATH] when present.
    pub fn from_env() -> Result<Self> {
        Self::load(&Env::with_dotenv(DOTENV_PATH)?)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load(&Env::from_fn(lookup))
    }

    pub fn load(env: &Env) -> Result<Self> {
        let host = env.get("HOST", DEFAULT_HOST);
        let port = env.get("PORT", &DEFAULT_PORT.to_string());
        Ok(Self {
            env: env.get("APP_ENV", "production"),
            debug: env.bool("APP_DEBUG", false),
            host: host
                .parse()
                .with_context(|| format!("Invalid HOST: {host}"))?,
            port: port
                .parse()
                .with_context(|| format!("Invalid PORT: {port}"))?,
            dist_path: PathBuf::from(env.get("DIST_PATH", DEFAULT_DIST_PATH)),
            cors: CorsConfig::new(
                &env.get("CORS_ALLOW_ORIGIN", cors::DEFAULT_ALLOW_ORIGIN),
                &env.get("CORS_ALLOW_METHODS", cors::DEFAULT_ALLOW_METHODS),
                &env.get("CORS_ALLOW_HEADERS", cors::DEFAULT_ALLOW_HEADERS),
            )?,
            auth: AuthConfig::new(env.raw("API_KEY")),
            database: Database::load(env)?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.env == "development"
    }

    pub fn shows_error_details(&self) -> bool {
        self.debug || self.is_development()
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_dist_path<P: Into<PathBuf>>(mut self, dist_path: P) -> Self {
        self.dist_path = dist_path.into();
        self
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.auth = AuthConfig::new(Some(api_key.into()));
        self
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = database;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: "production".to_string(),
            debug: false,
            host: IpAddr::from([127, 0, 0, 1]),
            port: DEFAULT_PORT,
            dist_path: PathBuf::from(DEFAULT_DIST_PATH),
            cors: CorsConfig::default(),
            auth: AuthConfig::default(),
            database: Database::Memory,
        }
    }
}
