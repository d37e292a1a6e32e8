use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL for persisted state. In-memory store when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Endpoint of the recommendation flow
    #[serde(default)]
    pub recommendation_url: Option<String>,

    /// Timeout applied to every outbound request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Sources registered on first start, as `name=url` pairs separated by commas
    #[serde(default)]
    pub seed_sources: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            recommendation_url: None,
            request_timeout_secs: default_request_timeout_secs(),
            seed_sources: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Parses `SEED_SOURCES` into `(name, url)` pairs, skipping malformed entries
    pub fn seed_source_pairs(&self) -> Vec<(String, String)> {
        let Some(raw) = self.seed_sources.as_deref() else {
            return Vec::new();
        };

        raw.split(',')
            .filter_map(|entry| {
                let (name, url) = entry.split_once('=')?;
                let (name, url) = (name.trim(), url.trim());
                if name.is_empty() || url.is_empty() {
                    return None;
                }
                Some((name.to_string(), url.to_string()))
            })
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
