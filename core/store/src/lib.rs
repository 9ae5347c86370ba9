//! Persistent storage interface for Warden entities, groups, group aliases and tokens.
//!
//! ## An ergonomic interface
//!
//! The [`Store`] API focuses on a small set of high level methods that accept different
//! request types and return different data, while leaving [`StoreBackend`]s free to pick
//! the most efficient implementation they can create.
//!
//! To achieve this:
//!
//! - The [`Store`] interface focuses on high level operations.
//! - Operations are grouped into a `query`, `persist` and `delete` families.
//! - This is implemented with a combination of an internal (sealed) `trait` and enums.
//!
//! For example to lookup an entity and the group alias for an external group name:
//!
//! ```ignore
//! use warden_store::ids::AliasID;
//! use warden_store::query::LookupEntity;
//! use warden_store::query::LookupGroupAlias;
//!
//! let entity = store.query(context, LookupEntity::from("entity-id")).await?;
//! let alias = AliasID::new("ldap-mount", "engineering");
//! let alias = store.query(context, LookupGroupAlias(alias)).await?;
//! ```
//!
//! ## Consistency expectations
//!
//! - Reads after writes on the same [`Store`] must observe the write.
//! - Persisting a record replaces it, and any index derived from it, atomically.
//!
//! ### Backend implementations
//!
//! Backends implement one method per operation family and receive the family `enum`.
//! Each backend must answer with the response variant matching the request variant:
//! a mismatch is a bug in the backend and the [`Store`] handle panics on conversion.
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value as Json;

use warden_context::Context;

pub mod delete;
pub mod ids;
pub mod persist;
pub mod query;

#[cfg(any(test, feature = "test-fixture"))]
mod fixture;
#[cfg(any(test, feature = "test-fixture"))]
pub use self::fixture::StoreFixture;

#[cfg(test)]
mod tests;

use self::delete::DeleteOp;
use self::delete::DeleteOps;
use self::delete::DeleteResponses;
use self::persist::PersistOp;
use self::persist::PersistOps;
use self::persist::PersistResponses;
use self::query::QueryOp;
use self::query::QueryOps;
use self::query::QueryResponses;

/// Query, persist and manipulate identity and token state with a database.
#[derive(Clone)]
pub struct Store {
    /// Runtime configured implementation of the persistent store.
    inner: Arc<dyn StoreBackend>,
}

impl Store {
    /// Delete individual records from the persistent store.
    pub async fn delete<O>(&self, context: &Context, op: O) -> Result<O::Response>
    where
        O: DeleteOp,
    {
        let op: DeleteOps = op.into();
        let response = self.inner.delete(context, op).await;
        response.map(O::Response::from)
    }

    /// Query records from the persistent store.
    pub async fn query<O>(&self, context: &Context, op: O) -> Result<O::Response>
    where
        O: QueryOp,
    {
        let op: QueryOps = op.into();
        let response = self.inner.query(context, op).await;
        response.map(O::Response::from)
    }

    /// Persist records into the persistent store.
    pub async fn persist<O>(&self, context: &Context, op: O) -> Result<O::Response>
    where
        O: PersistOp,
    {
        let op: PersistOps = op.into();
        let response = self.inner.persist(context, op).await;
        response.map(O::Response::from)
    }
}

impl<T> From<T> for Store
where
    T: StoreBackend + 'static,
{
    fn from(value: T) -> Self {
        Store {
            inner: Arc::new(value),
        }
    }
}

#[cfg(any(test, feature = "test-fixture"))]
impl Store {
    /// Initialise a new store backend fixture for unit tests.
    pub fn fixture() -> Self {
        let inner = StoreFixture::default();
        Self::from(inner)
    }
}

/// Operations implemented by Persistent Stores supported by Warden.
#[async_trait::async_trait]
pub trait StoreBackend: Send + Sync {
    /// Delete individual records from the persistent store.
    async fn delete(&self, context: &Context, op: DeleteOps) -> Result<DeleteResponses>;

    /// Query records from the persistent store.
    async fn query(&self, context: &Context, op: QueryOps) -> Result<QueryResponses>;

    /// Persist records into the persistent store.
    async fn persist(&self, context: &Context, op: PersistOps) -> Result<PersistResponses>;
}

/// Initialisation logic for the Persistent Store and the client to access it.
#[async_trait::async_trait]
pub trait StoreFactory: Send + Sync {
    /// Validate the user provided configuration for the backend.
    fn conf_check(&self, context: &Context, conf: &Json) -> Result<()>;

    /// Register backend specific metrics.
    fn register_metrics(&self, registry: &prometheus::Registry) -> Result<()>;

    /// Instantiate a [`Store`] object to access persistent state.
    async fn store<'a>(&self, args: StoreFactoryArgs<'a>) -> Result<Store>;

    /// Synchronise (initialise or migrate) the Persistent store to handle [`Store`] operations.
    async fn sync<'a>(&self, args: StoreFactorySyncArgs<'a>) -> Result<()>;
}

/// Arguments passed to the [`StoreFactory`] client initialisation method.
pub struct StoreFactoryArgs<'a> {
    /// The configuration block for the backend to initialise.
    pub conf: &'a Json,

    /// Container for operation scoped values.
    pub context: &'a Context,
}

/// Arguments passed to the [`StoreFactory`] client synchronisation method.
pub struct StoreFactorySyncArgs<'a> {
    /// The configuration block for the backend to synchronise.
    pub conf: &'a Json,

    /// Container for operation scoped values.
    pub context: &'a Context,
}
