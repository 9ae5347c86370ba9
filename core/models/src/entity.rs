//! Entities are the canonical representation of authenticated principals.
use serde::Deserialize;
use serde::Serialize;

/// An authenticated principal, independent of the authentication method used.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier of the entity.
    pub id: String,

    /// Bindings of the entity to (mount, external principal name) pairs.
    #[serde(default)]
    pub aliases: Vec<EntityAlias>,

    /// Ordered set of policies assigned directly to the entity.
    #[serde(default)]
    pub policies: Vec<String>,
}

impl Entity {
    /// Find the alias the entity holds for the given mount and name, if any.
    pub fn alias(&self, mount_id: &str, name: &str) -> Option<&EntityAlias> {
        self.aliases
            .iter()
            .find(|alias| alias.mount_id == mount_id && alias.name == name)
    }
}

/// Binding of an entity to an authentication mount and external principal name.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct EntityAlias {
    /// Identifier of the authentication mount the principal authenticated with.
    pub mount_id: String,

    /// Name of the principal as known to the authentication method.
    pub name: String,
}

impl EntityAlias {
    /// Bind the given mount and principal name.
    pub fn new<S1: Into<String>, S2: Into<String>>(mount_id: S1, name: S2) -> Self {
        Self {
            mount_id: mount_id.into(),
            name: name.into(),
        }
    }
}
