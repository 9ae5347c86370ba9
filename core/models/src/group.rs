//! Groups confer policies onto their members.
//!
//! Internal groups list their members explicitly while external groups only infer
//! membership through [`GroupAlias`]es matched against authentication responses.
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

/// A named collection of members conferring policies on them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier of the group.
    pub id: String,

    /// Kind specific group information.
    pub kind: GroupKind,

    /// Ordered set of policies assigned directly to the group.
    #[serde(default)]
    pub policies: Vec<String>,
}

impl Group {
    /// Initialise an empty group of the given type.
    pub fn new<S: Into<String>>(id: S, group_type: GroupType, policies: Vec<String>) -> Self {
        let kind = match group_type {
            GroupType::External => GroupKind::External(ExternalGroup::default()),
            GroupType::Internal => GroupKind::Internal(InternalGroup::default()),
        };
        Group {
            id: id.into(),
            kind,
            policies,
        }
    }

    /// Access external group information, if this is an external group.
    pub fn external(&self) -> Option<&ExternalGroup> {
        match &self.kind {
            GroupKind::External(external) => Some(external),
            GroupKind::Internal(_) => None,
        }
    }

    /// Mutable access to external group information, if this is an external group.
    pub fn external_mut(&mut self) -> Option<&mut ExternalGroup> {
        match &mut self.kind {
            GroupKind::External(external) => Some(external),
            GroupKind::Internal(_) => None,
        }
    }

    /// The type of this group.
    pub fn group_type(&self) -> GroupType {
        match self.kind {
            GroupKind::External(_) => GroupType::External,
            GroupKind::Internal(_) => GroupType::Internal,
        }
    }

    /// Access internal group information, if this is an internal group.
    pub fn internal(&self) -> Option<&InternalGroup> {
        match &self.kind {
            GroupKind::External(_) => None,
            GroupKind::Internal(internal) => Some(internal),
        }
    }

    /// Mutable access to internal group information, if this is an internal group.
    pub fn internal_mut(&mut self) -> Option<&mut InternalGroup> {
        match &mut self.kind {
            GroupKind::External(_) => None,
            GroupKind::Internal(internal) => Some(internal),
        }
    }
}

/// Kind specific information attached to a [`Group`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupKind {
    /// Membership is inferred from group aliases matched at token issue or renewal.
    External(ExternalGroup),

    /// Membership is explicitly managed.
    Internal(InternalGroup),
}

/// Information about an externally managed group.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExternalGroup {
    /// Group aliases that map external group names onto this group.
    #[serde(default)]
    pub aliases: BTreeSet<GroupAliasKey>,
}

/// Information about an internally managed group.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct InternalGroup {
    /// Entities that are direct members of the group.
    #[serde(default)]
    pub member_entity_ids: BTreeSet<String>,

    /// Groups that are direct members (children) of the group.
    #[serde(default)]
    pub member_group_ids: BTreeSet<String>,
}

impl InternalGroup {
    /// Add a member to the group, returning `false` if it was already a member.
    pub fn insert(&mut self, member: &Member) -> bool {
        match member {
            Member::Entity(id) => self.member_entity_ids.insert(id.clone()),
            Member::Group(id) => self.member_group_ids.insert(id.clone()),
        }
    }

    /// Remove a member from the group, returning `false` if it was not a member.
    pub fn remove(&mut self, member: &Member) -> bool {
        match member {
            Member::Entity(id) => self.member_entity_ids.remove(id),
            Member::Group(id) => self.member_group_ids.remove(id),
        }
    }
}

/// Types of groups that can be created.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    /// Membership is inferred from group aliases.
    External,

    /// Membership is explicitly managed.
    Internal,
}

impl std::fmt::Display for GroupType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::External => write!(f, "external"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Binding of an external group name under a mount to a canonical external [`Group`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupAlias {
    /// Unique identifier of the group alias.
    pub id: String,

    /// ID of the external group the alias resolves to.
    pub canonical_id: String,

    /// Identifier of the authentication mount reporting the external group.
    pub mount_id: String,

    /// Name of the group as reported by the authentication method.
    pub name: String,
}

impl GroupAlias {
    /// The (mount, name) pair that uniquely identifies this alias.
    pub fn key(&self) -> GroupAliasKey {
        GroupAliasKey {
            mount_id: self.mount_id.clone(),
            name: self.name.clone(),
        }
    }
}

/// The (mount, external group name) pair identifying a [`GroupAlias`].
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct GroupAliasKey {
    /// Identifier of the authentication mount reporting the external group.
    pub mount_id: String,

    /// Name of the group as reported by the authentication method.
    pub name: String,
}

impl GroupAliasKey {
    /// Identify the alias for the given mount and external group name.
    pub fn new<S1: Into<String>, S2: Into<String>>(mount_id: S1, name: S2) -> Self {
        Self {
            mount_id: mount_id.into(),
            name: name.into(),
        }
    }
}

/// A direct member of an internal group.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Member {
    /// An entity is a direct member of the group.
    Entity(String),

    /// A group is nested directly in the group.
    Group(String),
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Entity(id) => write!(f, "entity/{}", id),
            Self::Group(id) => write!(f, "group/{}", id),
        }
    }
}
