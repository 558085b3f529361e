use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection string; when set it wins over the discrete parts below.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
    #[serde(default = "default_retry_delay")]
    pub connect_retry_delay_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            host: default_db_host(),
            port: default_db_port(),
            name: String::new(),
            user: String::new(),
            password: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            connect_attempts: default_connect_attempts(),
            connect_retry_delay_secs: default_retry_delay(),
            sqlx_logging: false,
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8000 }
fn default_db_host() -> String { "localhost".into() }
fn default_db_port() -> u16 { 5432 }
fn default_max_connections() -> u32 { 5 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 5 }
fn default_acquire_timeout() -> u64 { 5 }
fn default_connect_attempts() -> u32 { 5 }
fn default_retry_delay() -> u64 { 5 }

/// Read `CONFIG_PATH` (default `config.toml`). A missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    AppConfig::from_toml_str(&content)
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(content)?;
        Ok(cfg)
    }

    /// File (optional), then process environment, then validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env_with(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup.
    ///
    /// Recognised keys: `BIND_IP`, `LISTEN_PORT`, `TOKIO_WORKER_THREADS`,
    /// `DATABASE_URL`, `PSQL_HOST`, `PSQL_PORT`, `PSQL_NAME`, `PSQL_USER`,
    /// `PSQL_PASSWORD`.
    pub fn apply_env_with<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.server.apply_env_with(&get)?;
        self.database.apply_env_with(&get)?;
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.validate()?;
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| anyhow!("{key} has an invalid value: {raw:?}"))
}

impl ServerConfig {
    fn apply_env_with<F>(&mut self, get: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ip) = get("BIND_IP") {
            self.host = ip;
        }
        if let Some(port) = get("LISTEN_PORT") {
            self.port = parse_env("LISTEN_PORT", &port)?;
        }
        if let Some(threads) = get("TOKIO_WORKER_THREADS") {
            self.worker_threads = Some(parse_env("TOKIO_WORKER_THREADS", &threads)?);
        }
        Ok(())
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }

    /// Resolve `host:port`; hostnames such as `localhost` are looked up.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))?
            .next()
            .ok_or_else(|| anyhow!("listen address {}:{} resolved to nothing", self.host, self.port))
    }
}

impl DatabaseConfig {
    fn apply_env_with<F>(&mut self, get: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = get("DATABASE_URL") {
            self.url = url;
        }
        if let Some(host) = get("PSQL_HOST") {
            self.host = host;
        }
        if let Some(port) = get("PSQL_PORT") {
            self.port = parse_env("PSQL_PORT", &port)?;
        }
        if let Some(name) = get("PSQL_NAME") {
            self.name = name;
        }
        if let Some(user) = get("PSQL_USER") {
            self.user = user;
        }
        if let Some(password) = get("PSQL_PASSWORD") {
            self.password = password;
        }
        Ok(())
    }

    /// Connection string handed to the driver.
    pub fn url(&self) -> String {
        if !self.url.trim().is_empty() {
            return self.url.clone();
        }
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }

    /// Same as [`DatabaseConfig::url`] with the password masked, for logs.
    pub fn redacted_url(&self) -> String {
        if self.url.trim().is_empty() {
            return format!(
                "postgresql://{}:{{password}}@{}:{}/{}",
                self.user, self.host, self.port, self.name
            );
        }
        redact_password(&self.url)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            if self.host.trim().is_empty() {
                return Err(anyhow!("database host is empty; set PSQL_HOST or DATABASE_URL"));
            }
            if self.name.trim().is_empty() {
                return Err(anyhow!("database name is empty; set PSQL_NAME or DATABASE_URL"));
            }
            if self.user.trim().is_empty() {
                return Err(anyhow!("database user is empty; set PSQL_USER or DATABASE_URL"));
            }
            if self.port == 0 {
                return Err(anyhow!("database port must be in 1..=65535"));
            }
        } else {
            let lower = self.url.to_lowercase();
            if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
                return Err(anyhow!("database url must start with postgresql:// or postgres://"));
            }
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        if self.connect_attempts == 0 {
            return Err(anyhow!("database.connect_attempts must be >= 1"));
        }
        Ok(())
    }
}

fn redact_password(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else { return url.to_string() };
    let rest = &url[scheme_end + 3..];
    let Some(at) = rest.rfind('@') else { return url.to_string() };
    let userinfo = &rest[..at];
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{}{}:{{password}}{}", &url[..scheme_end + 3], user, &rest[at..]),
        None => url.to_string(),
    }
}
