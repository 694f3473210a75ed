use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentsConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub razorpay: RazorpayConfig,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            razorpay: RazorpayConfig::default(),
        }
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RazorpayConfig {
    #[serde(default)]
    pub enabled: bool,
    pub key_id: Option<String>,
    /// When set, webhook signatures are checked against it.
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub uploads_dir: String,
    pub public_base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: "uploads".to_string(),
            public_base_url: "http://localhost:8080/uploads".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct VisionConfig {
    #[serde(default)]
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    /// Empty means permissive.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("database.url", "sqlite://verdant.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("payments.currency", "INR")?
            .set_default("payments.razorpay.enabled", false)?
            .set_default("vision.enabled", false)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with VERDANT__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("VERDANT").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://verdant.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
            },
            payments: PaymentsConfig::default(),
            storage: StorageConfig::default(),
            vision: VisionConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}
