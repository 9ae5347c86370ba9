//! Data object storing Warden's configuration.
use serde::Deserialize;
use serde::Serialize;

use super::TokenConf;

/// Global configuration for Warden processes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conf {
    /// Persistent Store service configuration.
    pub store: BackendConf,

    /// Token lifetime configuration.
    #[serde(default)]
    pub tokens: TokenConf,
}

/// Unstructured configuration for runtime selected service backends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendConf {
    /// ID of the backend selected to provide the service.
    pub backend: String,

    /// Backend specific configuration options.
    #[serde(default, flatten)]
    pub options: serde_json::Value,
}
