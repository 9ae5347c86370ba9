//! Configuration of token lifetimes.
use serde::Deserialize;
use serde::Serialize;

/// Default and maximum lifetime (768 hours) of tokens, in seconds.
const DEFAULT_TTL_SEC: u64 = 2_764_800;

/// Configuration of token lifetimes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TokenConf {
    /// Lifetime, in seconds, of tokens issued or renewed without an explicit TTL.
    #[serde(default = "TokenConf::default_ttl")]
    pub default_ttl_sec: u64,

    /// Upper bound, in seconds from issue time, to the expiry of any token.
    #[serde(default = "TokenConf::default_ttl")]
    pub max_ttl_sec: u64,
}

impl TokenConf {
    fn default_ttl() -> u64 {
        DEFAULT_TTL_SEC
    }
}

impl Default for TokenConf {
    fn default() -> Self {
        TokenConf {
            default_ttl_sec: Self::default_ttl(),
            max_ttl_sec: Self::default_ttl(),
        }
    }
}
