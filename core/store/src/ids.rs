//! Reusable containers for record IDs.
use serde::Deserialize;
use serde::Serialize;

use warden_models::EntityAlias;
use warden_models::GroupAliasKey;

/// Identify a record by the (mount, name) pair of one of its aliases.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct AliasID {
    /// Identifier of the authentication mount the alias is bound to.
    pub mount_id: String,

    /// Name of the principal or group as known to the authentication method.
    pub name: String,
}

impl AliasID {
    /// Identify the alias for the given mount and name.
    pub fn new<S1: Into<String>, S2: Into<String>>(mount_id: S1, name: S2) -> Self {
        Self {
            mount_id: mount_id.into(),
            name: name.into(),
        }
    }
}

impl From<&EntityAlias> for AliasID {
    fn from(value: &EntityAlias) -> Self {
        AliasID::new(value.mount_id.clone(), value.name.clone())
    }
}

impl From<&GroupAliasKey> for AliasID {
    fn from(value: &GroupAliasKey) -> Self {
        AliasID::new(value.mount_id.clone(), value.name.clone())
    }
}

impl From<GroupAliasKey> for AliasID {
    fn from(value: GroupAliasKey) -> Self {
        AliasID {
            mount_id: value.mount_id,
            name: value.name,
        }
    }
}
