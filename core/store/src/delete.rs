//! Warden persistent store operations to delete records.
//!
//! Deleting a record that does not exist is not an error.
use warden_models::Entity;
use warden_models::Group;
use warden_models::GroupAlias;
use warden_models::Token;

use self::seal::SealDeleteOp;
use crate::ids::AliasID;

/// Internal trait to enable delete operations on the persistent store.
pub trait DeleteOp: Into<DeleteOps> + SealDeleteOp {
    /// Type returned by the matching delete operation.
    type Response: From<DeleteResponses>;
}

/// List of all delete operations the persistent store must implement.
pub enum DeleteOps {
    /// Delete an entity, and its alias index, by ID.
    Entity(DeleteEntity),

    /// Delete a group, and its membership index, by ID.
    Group(DeleteGroup),

    /// Delete a group alias by mount and external group name.
    GroupAlias(DeleteGroupAlias),

    /// Delete a token by ID.
    Token(DeleteToken),
}

/// List of all responses from delete operations.
pub enum DeleteResponses {
    /// The operation completed successfully and does not return data.
    Success,
}

// --- High level delete operations --- //
/// Request deletion of an [`Entity`] record.
pub struct DeleteEntity {
    /// Identifier of the [`Entity`] record to delete.
    pub id: String,
}
impl From<&Entity> for DeleteEntity {
    fn from(value: &Entity) -> Self {
        DeleteEntity {
            id: value.id.clone(),
        }
    }
}
impl From<&str> for DeleteEntity {
    fn from(value: &str) -> Self {
        DeleteEntity {
            id: value.to_string(),
        }
    }
}

/// Request deletion of a [`Group`] record.
pub struct DeleteGroup {
    /// Identifier of the [`Group`] record to delete.
    pub id: String,
}
impl From<&Group> for DeleteGroup {
    fn from(value: &Group) -> Self {
        DeleteGroup {
            id: value.id.clone(),
        }
    }
}
impl From<&str> for DeleteGroup {
    fn from(value: &str) -> Self {
        DeleteGroup {
            id: value.to_string(),
        }
    }
}

/// Request deletion of a [`GroupAlias`] record.
pub struct DeleteGroupAlias(pub AliasID);
impl From<&GroupAlias> for DeleteGroupAlias {
    fn from(value: &GroupAlias) -> Self {
        DeleteGroupAlias(AliasID::new(value.mount_id.clone(), value.name.clone()))
    }
}

/// Request deletion of a [`Token`] record.
pub struct DeleteToken {
    /// Identifier of the [`Token`] record to delete.
    pub id: String,
}
impl From<&Token> for DeleteToken {
    fn from(value: &Token) -> Self {
        DeleteToken {
            id: value.id.clone(),
        }
    }
}
impl From<&str> for DeleteToken {
    fn from(value: &str) -> Self {
        DeleteToken {
            id: value.to_string(),
        }
    }
}

// --- Internal implementation details follow --- //
/// Private module to seal implementation details.
mod seal {
    /// Super-trait to seal the [`DeleteOp`](super::DeleteOp) trait.
    pub trait SealDeleteOp {}
}

// --- Implement DeleteOp and super traits on types for transparent operations --- //
impl SealDeleteOp for DeleteEntity {}
impl DeleteOp for DeleteEntity {
    type Response = ();
}
impl From<DeleteEntity> for DeleteOps {
    fn from(value: DeleteEntity) -> Self {
        DeleteOps::Entity(value)
    }
}

impl SealDeleteOp for DeleteGroup {}
impl DeleteOp for DeleteGroup {
    type Response = ();
}
impl From<DeleteGroup> for DeleteOps {
    fn from(value: DeleteGroup) -> Self {
        DeleteOps::Group(value)
    }
}

impl SealDeleteOp for DeleteGroupAlias {}
impl DeleteOp for DeleteGroupAlias {
    type Response = ();
}
impl From<DeleteGroupAlias> for DeleteOps {
    fn from(value: DeleteGroupAlias) -> Self {
        DeleteOps::GroupAlias(value)
    }
}

impl SealDeleteOp for DeleteToken {}
impl DeleteOp for DeleteToken {
    type Response = ();
}
impl From<DeleteToken> for DeleteOps {
    fn from(value: DeleteToken) -> Self {
        DeleteOps::Token(value)
    }
}

// --- Implement DeleteResponses conversions on return types for transparent operations --- //
impl From<DeleteResponses> for () {
    fn from(value: DeleteResponses) -> Self {
        match value {
            DeleteResponses::Success => (),
        }
    }
}
