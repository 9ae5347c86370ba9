//! SQL statements to implement the [`StoreBackend`] with SQLite.
use anyhow::Result;
use futures::StreamExt;
use tokio_rusqlite::Connection;

use warden_context::Context;
use warden_models::Group;
use warden_store::delete::DeleteOps;
use warden_store::delete::DeleteResponses;
use warden_store::persist::PersistOps;
use warden_store::persist::PersistResponses;
use warden_store::query::GroupStream;
use warden_store::query::QueryOps;
use warden_store::query::QueryResponses;
use warden_store::StoreBackend;

mod entity;
mod group;
mod group_alias;
mod token;

/// implementation of the [`StoreBackend`] interface using SQLite.
pub struct SQLiteStore {
    /// Connection to the SQLite DB persisting data.
    connection: Connection,
}

impl SQLiteStore {
    /// Initialise a new SQLite backed [`StoreBackend`].
    pub fn new(connection: Connection) -> Self {
        SQLiteStore { connection }
    }
}

#[async_trait::async_trait]
impl StoreBackend for SQLiteStore {
    async fn delete(&self, context: &Context, op: DeleteOps) -> Result<DeleteResponses> {
        match op {
            DeleteOps::Entity(entity) => self::entity::delete(context, &self.connection, entity)
                .await
                .map(|_| DeleteResponses::Success),
            DeleteOps::Group(group) => self::group::delete(context, &self.connection, group)
                .await
                .map(|_| DeleteResponses::Success),
            DeleteOps::GroupAlias(alias) => {
                self::group_alias::delete(context, &self.connection, alias)
                    .await
                    .map(|_| DeleteResponses::Success)
            }
            DeleteOps::Token(token) => self::token::delete(context, &self.connection, token)
                .await
                .map(|_| DeleteResponses::Success),
        }
    }

    async fn query(&self, context: &Context, op: QueryOps) -> Result<QueryResponses> {
        match op {
            QueryOps::Entity(lookup) => {
                let entity = self::entity::lookup(context, &self.connection, lookup).await?;
                Ok(QueryResponses::Entity(entity))
            }
            QueryOps::EntityByAlias(alias) => {
                let entity = self::entity::lookup_by_alias(context, &self.connection, alias).await?;
                Ok(QueryResponses::Entity(entity))
            }
            QueryOps::Group(lookup) => {
                let group = self::group::lookup(context, &self.connection, lookup).await?;
                Ok(QueryResponses::Group(group))
            }
            QueryOps::GroupAlias(alias) => {
                let alias = self::group_alias::lookup(context, &self.connection, alias).await?;
                Ok(QueryResponses::GroupAlias(alias))
            }
            QueryOps::ListGroups => {
                let groups = self::group::list(context, &self.connection).await?;
                Ok(QueryResponses::Groups(groups))
            }
            QueryOps::ListGroupsByMemberEntity(entity_id) => {
                let groups =
                    self::group::list_by_member_entity(context, &self.connection, entity_id)
                        .await?;
                Ok(QueryResponses::Groups(groups))
            }
            QueryOps::ListGroupsByMemberGroup(group_id) => {
                let groups =
                    self::group::list_by_member_group(context, &self.connection, group_id).await?;
                Ok(QueryResponses::Groups(groups))
            }
            QueryOps::ListTokens => {
                let tokens = self::token::list(context, &self.connection).await?;
                Ok(QueryResponses::Tokens(tokens))
            }
            QueryOps::Token(lookup) => {
                let token = self::token::lookup(context, &self.connection, lookup).await?;
                Ok(QueryResponses::Token(token))
            }
        }
    }

    async fn persist(&self, context: &Context, op: PersistOps) -> Result<PersistResponses> {
        match op {
            PersistOps::Entity(entity) => self::entity::persist(context, &self.connection, entity)
                .await
                .map(|_| PersistResponses::Success),
            PersistOps::Group(group) => self::group::persist(context, &self.connection, group)
                .await
                .map(|_| PersistResponses::Success),
            PersistOps::GroupAlias(alias) => {
                self::group_alias::persist(context, &self.connection, alias)
                    .await
                    .map(|_| PersistResponses::Success)
            }
            PersistOps::Token(token) => self::token::persist(context, &self.connection, token)
                .await
                .map(|_| PersistResponses::Success),
        }
    }
}

/// Decode JSON encoded group records into a [`GroupStream`].
fn decode_groups(records: Vec<String>) -> GroupStream {
    futures::stream::iter(records)
        .map(|record| {
            let group: Group = serde_json::from_str(&record)?;
            Ok(group)
        })
        .boxed()
}
