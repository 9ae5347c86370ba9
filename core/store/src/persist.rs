//! Warden persistent store operations to persist records.
//!
//! Records are always persisted as a whole: backends must replace the full record
//! (and any index derived from it) atomically so concurrent readers never observe
//! a partially updated record.
use warden_models::Entity;
use warden_models::Group;
use warden_models::GroupAlias;
use warden_models::Token;

use self::seal::SealPersistOp;

/// Internal trait to enable persist operations on the persistent store.
pub trait PersistOp: Into<PersistOps> + SealPersistOp {
    /// Type returned by the matching persist operation.
    type Response: From<PersistResponses>;
}

/// List of all persist operations the persistent store must implement.
pub enum PersistOps {
    /// Persist an entity record, including its alias index.
    Entity(Entity),

    /// Persist a group record, including its membership index.
    Group(Group),

    /// Persist a group alias record.
    GroupAlias(GroupAlias),

    /// Persist a token record.
    Token(Token),
}

/// List of all responses from persist operations.
pub enum PersistResponses {
    /// The operation completed successfully and does not return data.
    Success,
}

// --- Create internal implementation details follow --- //
/// Private module to seal implementation details.
mod seal {
    /// Super-trait to seal the [`PersistOp`](super::PersistOp) trait.
    pub trait SealPersistOp {}
}

// --- Implement PersistOp and super traits on types for transparent operations --- //
impl PersistOp for Entity {
    type Response = ();
}
impl SealPersistOp for Entity {}
impl From<Entity> for PersistOps {
    fn from(value: Entity) -> Self {
        PersistOps::Entity(value)
    }
}

impl PersistOp for Group {
    type Response = ();
}
impl SealPersistOp for Group {}
impl From<Group> for PersistOps {
    fn from(value: Group) -> Self {
        PersistOps::Group(value)
    }
}

impl PersistOp for GroupAlias {
    type Response = ();
}
impl SealPersistOp for GroupAlias {}
impl From<GroupAlias> for PersistOps {
    fn from(value: GroupAlias) -> Self {
        PersistOps::GroupAlias(value)
    }
}

impl PersistOp for Token {
    type Response = ();
}
impl SealPersistOp for Token {}
impl From<Token> for PersistOps {
    fn from(value: Token) -> Self {
        PersistOps::Token(value)
    }
}

// --- Implement PersistResponses conversions on return types for transparent operations --- //
impl From<PersistResponses> for () {
    fn from(value: PersistResponses) -> Self {
        match value {
            PersistResponses::Success => (),
        }
    }
}
