//! Common errors from and for the Warden policy engine.
//!
//! Operations return [`anyhow::Result`]s and raise one of the errors below when the failure
//! is part of the engine contract.
//! Callers classify failures with [`anyhow::Error::is`] or [`anyhow::Error::downcast_ref`]:
//!
//! ```ignore
//! match cache.lookup(&context, &token_id).await {
//!     Err(error) if error.is::<TokenExpired>() => ...,
//!     Err(error) if error.is::<TokenNotFound>() => ...,
//!     ...
//! }
//! ```
//!
//! Errors from the storage layer are never converted into these types.

/// The expected entity was not found.
#[derive(Debug, thiserror::Error)]
#[error("the expected entity '{entity_id}' was not found")]
pub struct EntityNotFound {
    pub entity_id: String,
}

impl EntityNotFound {
    /// The expected entity was not found.
    pub fn new<S: Into<String>>(entity_id: S) -> Self {
        Self {
            entity_id: entity_id.into(),
        }
    }
}

/// No entity owns an alias for the given mount and principal name.
#[derive(Debug, thiserror::Error)]
#[error("no entity has an alias named '{name}' for mount '{mount_id}'")]
pub struct EntityAliasNotFound {
    pub mount_id: String,
    pub name: String,
}

impl EntityAliasNotFound {
    /// No entity owns an alias for the given mount and principal name.
    pub fn new<S1: Into<String>, S2: Into<String>>(mount_id: S1, name: S2) -> Self {
        Self {
            mount_id: mount_id.into(),
            name: name.into(),
        }
    }
}

/// The alias is already owned by another entity.
#[derive(Debug, thiserror::Error)]
#[error("alias '{name}' for mount '{mount_id}' is already owned by entity '{owner_id}'")]
pub struct EntityAliasConflict {
    pub mount_id: String,
    pub name: String,
    pub owner_id: String,
}

impl EntityAliasConflict {
    /// The alias is already owned by another entity.
    pub fn new<S1, S2, S3>(mount_id: S1, name: S2, owner_id: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            mount_id: mount_id.into(),
            name: name.into(),
            owner_id: owner_id.into(),
        }
    }
}

/// The expected group was not found.
#[derive(Debug, thiserror::Error)]
#[error("the expected group '{group_id}' was not found")]
pub struct GroupNotFound {
    pub group_id: String,
}

impl GroupNotFound {
    /// The expected group was not found.
    pub fn new<S: Into<String>>(group_id: S) -> Self {
        Self {
            group_id: group_id.into(),
        }
    }
}

/// No group alias exists for the given mount and external group name.
#[derive(Debug, thiserror::Error)]
#[error("no group alias named '{name}' exists for mount '{mount_id}'")]
pub struct GroupAliasNotFound {
    pub mount_id: String,
    pub name: String,
}

impl GroupAliasNotFound {
    /// No group alias exists for the given mount and external group name.
    pub fn new<S1: Into<String>, S2: Into<String>>(mount_id: S1, name: S2) -> Self {
        Self {
            mount_id: mount_id.into(),
            name: name.into(),
        }
    }
}

/// A group alias for the same mount and external group name already exists.
#[derive(Debug, thiserror::Error)]
#[error("group alias '{name}' for mount '{mount_id}' already targets group '{group_id}'")]
pub struct GroupAliasConflict {
    pub group_id: String,
    pub mount_id: String,
    pub name: String,
}

impl GroupAliasConflict {
    /// A group alias for the same mount and external group name already exists.
    pub fn new<S1, S2, S3>(mount_id: S1, name: S2, group_id: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self {
            group_id: group_id.into(),
            mount_id: mount_id.into(),
            name: name.into(),
        }
    }
}

/// The operation is only valid for groups of a different kind.
#[derive(Debug, thiserror::Error)]
#[error("the group '{group_id}' is not an {expected} group")]
pub struct GroupKindMismatch {
    pub expected: &'static str,
    pub group_id: String,
}

impl GroupKindMismatch {
    /// The operation requires an external group.
    pub fn external<S: Into<String>>(group_id: S) -> Self {
        Self {
            expected: "external",
            group_id: group_id.into(),
        }
    }

    /// The operation requires an internal group.
    pub fn internal<S: Into<String>>(group_id: S) -> Self {
        Self {
            expected: "internal",
            group_id: group_id.into(),
        }
    }
}

/// A mutation referenced a record that does not exist.
#[derive(Debug, thiserror::Error)]
#[error("the referenced {kind} '{id}' does not exist")]
pub struct InvalidReference {
    pub id: String,
    pub kind: &'static str,
}

impl InvalidReference {
    /// The referenced entity does not exist.
    pub fn entity<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            kind: "entity",
        }
    }

    /// The referenced group does not exist.
    pub fn group<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            kind: "group",
        }
    }
}

/// The token is past its expiry time.
#[derive(Debug, thiserror::Error)]
#[error("the token '{token_id}' has expired")]
pub struct TokenExpired {
    pub token_id: String,
}

impl TokenExpired {
    /// The token is past its expiry time.
    pub fn new<S: Into<String>>(token_id: S) -> Self {
        Self {
            token_id: token_id.into(),
        }
    }
}

/// The token was not found.
#[derive(Debug, thiserror::Error)]
#[error("the token '{token_id}' was not found")]
pub struct TokenNotFound {
    pub token_id: String,
}

impl TokenNotFound {
    /// The token was not found.
    pub fn new<S: Into<String>>(token_id: S) -> Self {
        Self {
            token_id: token_id.into(),
        }
    }
}

/// The token was issued as non-renewable.
#[derive(Debug, thiserror::Error)]
#[error("the token '{token_id}' is not renewable")]
pub struct TokenNotRenewable {
    pub token_id: String,
}

impl TokenNotRenewable {
    /// The token was issued as non-renewable.
    pub fn new<S: Into<String>>(token_id: S) -> Self {
        Self {
            token_id: token_id.into(),
        }
    }
}

/// The token lifetime cannot be represented as an expiry time.
#[derive(Debug, thiserror::Error)]
#[error("a token lifetime of {ttl_sec} seconds is out of range")]
pub struct TokenTtlOutOfRange {
    pub ttl_sec: u64,
}

impl TokenTtlOutOfRange {
    /// The token lifetime cannot be represented as an expiry time.
    pub fn new(ttl_sec: u64) -> Self {
        Self { ttl_sec }
    }
}

/// The token was explicitly revoked.
#[derive(Debug, thiserror::Error)]
#[error("the token '{token_id}' was revoked")]
pub struct TokenRevoked {
    pub token_id: String,
}

impl TokenRevoked {
    /// The token was explicitly revoked.
    pub fn new<S: Into<String>>(token_id: S) -> Self {
        Self {
            token_id: token_id.into(),
        }
    }
}
