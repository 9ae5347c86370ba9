//! Tokens and the identity information captured when they are issued.
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

/// An issued session token and the policy resolution state attached to it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Opaque identifier of the token.
    pub id: String,

    /// Entity the token was issued to, `None` for tokens without an identity.
    pub entity_id: Option<String>,

    /// Cached IDs of external groups matched at issue or last renewal.
    #[serde(default)]
    pub external_group_ids: BTreeSet<String>,

    /// Raw external group names reported by the authentication method at issue time.
    #[serde(default)]
    pub external_group_names: Vec<String>,

    /// UTC time after which the token is no longer valid.
    #[serde(with = "time::serde::rfc3339")]
    pub expire_time: OffsetDateTime,

    /// UTC time the token was issued at.
    #[serde(with = "time::serde::rfc3339")]
    pub issue_time: OffsetDateTime,

    /// UTC time the token was last renewed at, if ever.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_renew_time: Option<OffsetDateTime>,

    /// Authentication mount the token was issued through, if any.
    pub mount_id: Option<String>,

    /// Ordered set of policies assigned directly to the token.
    #[serde(default)]
    pub policies: Vec<String>,

    /// Number of times the token was renewed.
    #[serde(default)]
    pub renew_count: u32,

    /// Whether the token can be renewed.
    pub renewable: bool,

    /// Lifecycle state of the token.
    pub state: TokenState,

    /// Time to live, in seconds, applied at issue time and by default on renewal.
    pub ttl_sec: u64,
}

impl Token {
    /// Check if the token expiry time has passed at the given time.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expire_time
    }
}

/// Lifecycle states of a persisted [`Token`].
///
/// Expiry is not a stored state: it is determined by comparing the current time
/// to [`Token::expire_time`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    /// The token was issued and has not been renewed yet.
    Active,

    /// The token was renewed at least once.
    Renewed,

    /// The token was explicitly revoked and can no longer be used.
    Revoked,
}

impl std::fmt::Display for TokenState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Renewed => write!(f, "renewed"),
            Self::Revoked => write!(f, "revoked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;
    use time::OffsetDateTime;

    use super::Token;
    use super::TokenState;

    fn token(issue_time: OffsetDateTime) -> Token {
        Token {
            id: "t1".into(),
            entity_id: Some("e1".into()),
            external_group_ids: Default::default(),
            external_group_names: vec!["g1".into()],
            expire_time: issue_time + Duration::seconds(60),
            issue_time,
            last_renew_time: None,
            mount_id: Some("ldap-1".into()),
            policies: vec!["default".into()],
            renew_count: 0,
            renewable: true,
            state: TokenState::Active,
            ttl_sec: 60,
        }
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let token = token(now);
        assert!(!token.is_expired(now + Duration::seconds(59)));
        assert!(token.is_expired(now + Duration::seconds(60)));
    }

    #[test]
    fn decode_encoded_token() {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::days(365);
        let token = token(now);
        let encoded = serde_json::to_string(&token).unwrap();
        let decoded: Token = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, token);
    }
}
