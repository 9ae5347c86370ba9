//! Data models for Warden identity entities, groups, group aliases and tokens.
//!
//! Records in this crate are plain data: they are persisted and loaded as a whole by the
//! store and carry no behaviour beyond simple accessors and constructors.
mod entity;
mod group;
mod policies;
mod token;

pub use self::entity::Entity;
pub use self::entity::EntityAlias;
pub use self::group::ExternalGroup;
pub use self::group::Group;
pub use self::group::GroupAlias;
pub use self::group::GroupAliasKey;
pub use self::group::GroupKind;
pub use self::group::GroupType;
pub use self::group::InternalGroup;
pub use self::group::Member;
pub use self::policies::normalise_policies;
pub use self::token::Token;
pub use self::token::TokenState;

/// Generate a new random record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
