use std::env;
use std::path::PathBuf;

use crate::consts::{DEFAULT_AUTH_FILE, REST_API};
use crate::credential::Credential;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash.
    pub api_base: String,
    pub credential: Option<Credential>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base: REST_API.to_string(),
            credential: None,
        }
    }
}

impl ClientConfig {
    /// Load from `TWITTER_API_BASE`, `TWITTER_BEARER_TOKEN` and `TWITTER_AUTH_FILE`.
    /// A bearer token wins over the auth file, and a missing auth file means no credential.
    pub fn from_env() -> Result<ClientConfig> {
        let api_base = env::var("TWITTER_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| REST_API.to_string());

        let credential = match env::var("TWITTER_BEARER_TOKEN") {
            Ok(token) if !token.is_empty() => Some(Credential::Bearer(token)),
            _ => {
                let path = env::var("TWITTER_AUTH_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_AUTH_FILE));
                let credential = Credential::from_file_if_exists(&path)?;
                if credential.is_none() {
                    tracing::debug!("No auth file at {}, requests are unauthenticated", path.display());
                }
                credential
            }
        };

        Ok(ClientConfig { api_base, credential })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}
