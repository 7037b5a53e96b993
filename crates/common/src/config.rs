use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(".")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/default")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(
                File::with_name(
                    path.as_ref()
                        .join("config/local")
                        .to_string_lossy()
                        .as_ref(),
                )
                .required(false),
            )
            .add_source(Environment::default().separator("__"))
            .build()?
            .try_deserialize()
    }
}

/// Location of the storefront backend and how to talk to it.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "ApiConfig::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "ApiConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    fn default_user_agent() -> String {
        "raffle-storefront".to_string()
    }

    const fn default_timeout_secs() -> u64 {
        15
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default = "CheckoutConfig::default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Visual reservation countdown. The backend owns the real expiry.
    #[serde(default = "CheckoutConfig::default_countdown_secs")]
    pub countdown_secs: u64,
    #[serde(default = "CheckoutConfig::default_min_quantity")]
    pub min_quantity: u32,
    #[serde(default = "CheckoutConfig::default_max_quantity")]
    pub max_quantity: u32,
    #[serde(default = "CheckoutConfig::default_contact_email")]
    pub contact_email: String,
}

impl CheckoutConfig {
    const fn default_poll_interval_secs() -> u64 {
        3
    }

    const fn default_countdown_secs() -> u64 {
        300
    }

    const fn default_min_quantity() -> u32 {
        4
    }

    const fn default_max_quantity() -> u32 {
        1000
    }

    fn default_contact_email() -> String {
        "contato@seudominio.com".to_string()
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: Self::default_poll_interval_secs(),
            countdown_secs: Self::default_countdown_secs(),
            min_quantity: Self::default_min_quantity(),
            max_quantity: Self::default_max_quantity(),
            contact_email: Self::default_contact_email(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "StoreConfig::default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub run_once: bool,
}

impl StoreConfig {
    const fn default_refresh_interval_secs() -> u64 {
        60
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: Self::default_refresh_interval_secs(),
            run_once: false,
        }
    }
}
