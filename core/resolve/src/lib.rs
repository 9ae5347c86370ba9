//! Resolve group memberships and aggregate the policies granted to tokens.
//!
//! Resolution never fails because of missing data: aliases with no match and
//! references to records that no longer exist contribute nothing.
//! Only errors from the persistent store are returned to callers.
mod external;
mod graph;
mod policies;

pub use self::external::match_external_groups;
pub use self::external::resolve_external_groups;
pub use self::graph::expand_parents;
pub use self::graph::resolve_internal_groups;
pub use self::policies::effective_policies;
pub use self::policies::EffectivePolicies;
