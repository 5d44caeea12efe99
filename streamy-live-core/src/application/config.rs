use crate::error::ConfigError;
use instant::Duration;
use serde::{Deserialize, Serialize};

const DEFAULT_APP_ID: u32 = 769_939_428;
const DEFAULT_SERVER: &str = "wss://webliveroom769939428-api.coolzcloud.com/ws";

/// Identity of the streaming application on the engine side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine application id
    pub app_id: u32,

    /// WebSocket endpoint of the engine's signalling server
    pub server: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID,
            server: DEFAULT_SERVER.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn new(app_id: u32, server: impl Into<String>) -> Self {
        Self {
            app_id,
            server: server.into(),
        }
    }

    /// Both values must be present before an engine can be constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id == 0 {
            return Err(ConfigError::MissingAppId);
        }
        if self.server.trim().is_empty() {
            return Err(ConfigError::MissingServer);
        }
        Ok(())
    }
}

/// Polling parameters of the SDK loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkLoaderConfig {
    /// Interval between checks in milliseconds
    pub poll_interval_ms: u64,

    /// Checks per load sequence
    pub max_check_attempts: u32,

    /// Manual retries before giving up for good
    pub max_retries: u32,
}

impl Default for SdkLoaderConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            max_check_attempts: 30,
            max_retries: 3,
        }
    }
}

impl SdkLoaderConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Configuration of the live session bootstrap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub engine: EngineConfig,
    pub sdk: SdkLoaderConfig,

    /// How long a fetched token is trusted for new activations (seconds)
    pub token_ttl_secs: u64,

    /// Display name used when the caller has no profile
    pub default_display_name: String,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            sdk: SdkLoaderConfig::default(),
            token_ttl_secs: 5 * 60,
            default_display_name: "Guest".to_string(),
        }
    }
}

impl LiveConfig {
    pub fn new(engine: EngineConfig) -> Self {
        Self {
            engine,
            ..Default::default()
        }
    }

    /// Defaults, overridden by `STREAMY_ZEGO_APP_ID` / `STREAMY_ZEGO_SERVER`
    /// when they were set at build time.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(app_id) = option_env!("STREAMY_ZEGO_APP_ID") {
            match app_id.parse::<u32>() {
                Ok(id) => config.engine.app_id = id,
                Err(_) => tracing::warn!("⚠️  Ignoring invalid STREAMY_ZEGO_APP_ID: {}", app_id),
            }
        }
        if let Some(server) = option_env!("STREAMY_ZEGO_SERVER") {
            config.engine.server = server.to_string();
        }

        config
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.engine.validate()?;
        Ok(config)
    }

    pub fn with_sdk(mut self, sdk: SdkLoaderConfig) -> Self {
        self.sdk = sdk;
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_default_display_name(mut self, name: impl Into<String>) -> Self {
        self.default_display_name = name.into();
        self
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}
