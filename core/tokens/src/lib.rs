//! Lifecycle of Warden tokens and the policies they grant.
//!
//! Tokens cache the external groups resolved for them at two checkpoints only:
//!
//! - When the token is issued.
//! - When the token is renewed.
//!
//! Every lookup aggregates policies from the current state of the entity and its
//! internal groups together with the cached external groups.
mod cache;
mod clock;
mod login;
mod telemetry;

#[cfg(test)]
mod tests;

pub use self::cache::IssueRequest;
pub use self::cache::TokenLookup;
pub use self::cache::TokenPolicyCache;
pub use self::clock::Clock;
pub use self::clock::SystemClock;
pub use self::login::AuthResponse;
pub use self::telemetry::register_metrics;

#[cfg(any(test, feature = "test-fixture"))]
pub use self::clock::ManualClock;
