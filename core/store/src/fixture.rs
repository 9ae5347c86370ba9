//! Inefficient in-memory implementation of [`Store`](super::Store) for unit tests.
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use anyhow::Result;
use futures::StreamExt;

use warden_models::Entity;
use warden_models::Group;
use warden_models::GroupAlias;
use warden_models::Token;

use warden_context::Context;

use super::DeleteOps;
use super::DeleteResponses;
use super::PersistOps;
use super::PersistResponses;
use super::QueryOps;
use super::QueryResponses;
use super::StoreBackend;
use crate::ids::AliasID;
use crate::query::GroupStream;
use crate::query::TokenStream;

/// In-memory implementation of a mock [`Store`](super::Store) for unit tests.
#[derive(Clone)]
pub struct StoreFixture {
    /// Shared in-memory state to mock the DB with.
    inner: Arc<Mutex<StoreFixtureState>>,
}

impl StoreFixture {
    /// Lock and access the shared inner store.
    fn access(&self) -> MutexGuard<StoreFixtureState> {
        self.inner
            .lock()
            .expect("StoreFixture::inner state lock poisoned")
    }
}

impl Default for StoreFixture {
    fn default() -> Self {
        let inner = StoreFixtureState::default();
        let inner = Mutex::new(inner);
        let inner = Arc::new(inner);
        StoreFixture { inner }
    }
}

#[async_trait::async_trait]
impl StoreBackend for StoreFixture {
    async fn delete(&self, _: &Context, op: DeleteOps) -> Result<DeleteResponses> {
        let mut store = self.access();
        match op {
            DeleteOps::Entity(entity) => {
                store.entities.remove(&entity.id);
            }
            DeleteOps::Group(group) => {
                store.groups.remove(&group.id);
            }
            DeleteOps::GroupAlias(alias) => {
                store.group_aliases.remove(&alias.0);
            }
            DeleteOps::Token(token) => {
                store.tokens.remove(&token.id);
            }
        };
        Ok(DeleteResponses::Success)
    }

    async fn query(&self, _: &Context, op: QueryOps) -> Result<QueryResponses> {
        let store = self.access();
        match op {
            QueryOps::Entity(lookup) => {
                let entity = store.entities.get(&lookup.0).cloned();
                Ok(QueryResponses::Entity(entity))
            }
            QueryOps::EntityByAlias(alias) => {
                let entity = store
                    .entities
                    .values()
                    .find(|entity| entity.alias(&alias.mount_id, &alias.name).is_some())
                    .cloned();
                Ok(QueryResponses::Entity(entity))
            }
            QueryOps::Group(lookup) => {
                let group = store.groups.get(&lookup.0).cloned();
                Ok(QueryResponses::Group(group))
            }
            QueryOps::GroupAlias(alias) => {
                let alias = store.group_aliases.get(&alias).cloned();
                Ok(QueryResponses::GroupAlias(alias))
            }
            QueryOps::ListGroups => {
                let groups = store.groups.values().cloned().collect();
                Ok(QueryResponses::Groups(group_stream(groups)))
            }
            QueryOps::ListGroupsByMemberEntity(entity_id) => {
                let groups = store
                    .groups
                    .values()
                    .filter(|group| {
                        group
                            .internal()
                            .map(|internal| internal.member_entity_ids.contains(&entity_id))
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect();
                Ok(QueryResponses::Groups(group_stream(groups)))
            }
            QueryOps::ListGroupsByMemberGroup(group_id) => {
                let groups = store
                    .groups
                    .values()
                    .filter(|group| {
                        group
                            .internal()
                            .map(|internal| internal.member_group_ids.contains(&group_id))
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect();
                Ok(QueryResponses::Groups(group_stream(groups)))
            }
            QueryOps::ListTokens => {
                let tokens = store.tokens.values().cloned().collect();
                Ok(QueryResponses::Tokens(token_stream(tokens)))
            }
            QueryOps::Token(lookup) => {
                let token = store.tokens.get(&lookup.0).cloned();
                Ok(QueryResponses::Token(token))
            }
        }
    }

    async fn persist(&self, _: &Context, op: PersistOps) -> Result<PersistResponses> {
        let mut store = self.access();
        match op {
            PersistOps::Entity(entity) => {
                store.entities.insert(entity.id.clone(), entity);
            }
            PersistOps::Group(group) => {
                store.groups.insert(group.id.clone(), group);
            }
            PersistOps::GroupAlias(alias) => {
                let key = AliasID::new(alias.mount_id.clone(), alias.name.clone());
                store.group_aliases.insert(key, alias);
            }
            PersistOps::Token(token) => {
                store.tokens.insert(token.id.clone(), token);
            }
        };
        Ok(PersistResponses::Success)
    }
}

/// Convert a list of groups into a [`GroupStream`].
fn group_stream(groups: Vec<Group>) -> GroupStream {
    futures::stream::iter(groups.into_iter().map(Ok)).boxed()
}

/// Convert a list of tokens into a [`TokenStream`].
fn token_stream(tokens: Vec<Token>) -> TokenStream {
    futures::stream::iter(tokens.into_iter().map(Ok)).boxed()
}

/// Container for the shared state.
#[derive(Default)]
struct StoreFixtureState {
    entities: HashMap<String, Entity>,
    group_aliases: HashMap<AliasID, GroupAlias>,
    groups: BTreeMap<String, Group>,
    tokens: BTreeMap<String, Token>,
}
