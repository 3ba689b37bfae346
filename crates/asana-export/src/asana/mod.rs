use crate::prelude::*;

pub mod client;
pub mod export;
pub mod list;
pub mod teams;

// Re-export the types the CLI and tests reach for most often
pub use client::{AsanaClient, FetchError, Listing};
pub use export::Exporter;

/// Asana configuration from environment variables
#[derive(Debug, Clone)]
pub struct AsanaConfig {
    pub base_url: String,
    pub access_token: String,
    pub workspace: String,
}

impl AsanaConfig {
    /// Default Asana REST API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://app.asana.com/api/1.0";

    /// Load configuration from environment variables.
    /// Uses ASANA_BASE_URL with default fallback; the token is supplied
    /// pre-validated, no auth flow happens here.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: std::env::var("ASANA_BASE_URL")
                .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string()),
            access_token: std::env::var("ASANA_ACCESS_TOKEN")
                .map_err(|_| eyre!("ASANA_ACCESS_TOKEN environment variable not set"))?,
            workspace: std::env::var("ASANA_WORKSPACE_GID")
                .map_err(|_| eyre!("ASANA_WORKSPACE_GID environment variable not set"))?,
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, base_url: Option<String>, workspace: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }
        self
    }
}

/// Create an HTTP client that carries the bearer token on every request
pub fn create_asana_client(config: &AsanaConfig) -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|e| eyre!("Invalid header value: {}", e))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}
