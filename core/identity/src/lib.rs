//! Directories of Warden identities: entities, groups and the aliases binding
//! them to authentication mounts.
//!
//! Directories own the records they manage and validate every mutation against
//! the current state of the persistent store:
//!
//! - Mutations to a record are serialised through [`RecordLocks`].
//! - When an operation needs an alias and the record it binds to, the alias
//!   lock is acquired first.
//! - No derived data is recomputed on mutation: consumers resolve policies on demand.
mod entity;
mod group;
mod locks;

pub use self::entity::EntityDirectory;
pub use self::group::GroupDirectory;
pub use self::locks::RecordGuard;
pub use self::locks::RecordLocks;
