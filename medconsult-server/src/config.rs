use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration loaded from YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 signing secret for issued tokens. Required to start.
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: u64,
    /// Allow anonymous `POST /auth/register`; otherwise only root may register users
    pub open_registration: bool,
    /// Argon2id memory cost
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    /// Root account created at startup if its email is not registered yet
    pub bootstrap_root: Option<BootstrapRoot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapRoot {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    pub service_name: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: 8,
            open_registration: false,
            hash_memory_kib: 19 * 1024,
            hash_iterations: 2,
            bootstrap_root: None,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            database: "medconsult.sqlite".to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            service_name: "medconsult".to_string(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = if let Some(path) = config_path {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from `MEDCONSULT_*` variables resolved by `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("MEDCONSULT_PORT")
            && let Ok(port_num) = port.parse()
        {
            self.server.port = port_num;
        }

        if let Some(host) = lookup("MEDCONSULT_HOST") {
            self.server.host = host;
        }

        if let Some(data_dir) = lookup("MEDCONSULT_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Some(secret) = lookup("MEDCONSULT_JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }

        if let Some(flag) = lookup("MEDCONSULT_OPEN_REGISTRATION")
            && let Some(open) = parse_flag(&flag)
        {
            self.auth.open_registration = open;
        }

        if let Some(level) = lookup("MEDCONSULT_LOG_LEVEL") {
            self.log.level = level;
        }

        if let Some(name) = lookup("MEDCONSULT_SERVICE_NAME") {
            self.log.service_name = name;
        }
    }

    /// Get the full path to the document database
    pub fn database_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.database)
    }
}
