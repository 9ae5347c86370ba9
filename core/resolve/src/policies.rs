//! Aggregate the policies granted to a token from all identity sources.
use std::collections::BTreeSet;

use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use warden_context::Context;
use warden_models::Token;
use warden_store::query::LookupEntity;
use warden_store::query::LookupGroup;
use warden_store::Store;

/// Policies granted to a token, split by source.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EffectivePolicies {
    /// Policies from the entity, its internal groups and the token's cached external groups.
    pub identity_policies: BTreeSet<String>,

    /// Policies assigned directly to the token.
    pub token_policies: BTreeSet<String>,
}

impl EffectivePolicies {
    /// Sorted union of token and identity policies.
    pub fn policies(&self) -> Vec<String> {
        self.token_policies
            .union(&self.identity_policies)
            .cloned()
            .collect()
    }
}

/// Compute the policies granted to a token from the current directory state.
///
/// Internal group membership is resolved on every call while external groups
/// come from the set cached on the token when it was issued or last renewed.
/// The internal parents of cached external groups are also resolved on every call.
/// Missing entities and groups contribute no policies.
pub async fn effective_policies(
    context: &Context,
    store: &Store,
    token: &Token,
) -> Result<EffectivePolicies> {
    let mut identity_policies = BTreeSet::new();
    let external = token.external_group_ids.iter().cloned();
    let mut groups = crate::expand_parents(context, store, external).await?;

    if let Some(entity_id) = &token.entity_id {
        let entity = store
            .query(context, LookupEntity::from(entity_id.as_str()))
            .await?;
        match entity {
            None => slog::debug!(
                context.logger, "Token references a missing entity";
                "token_id" => &token.id,
                "entity_id" => entity_id,
            ),
            Some(entity) => {
                identity_policies.extend(entity.policies);
                let internal = crate::resolve_internal_groups(context, store, entity_id).await?;
                groups.extend(internal);
            }
        }
    }

    for group_id in &groups {
        let group = store
            .query(context, LookupGroup::from(group_id.as_str()))
            .await?;
        match group {
            Some(group) => identity_policies.extend(group.policies),
            None => slog::debug!(
                context.logger, "Skipping missing group during policy aggregation";
                "token_id" => &token.id,
                "group_id" => group_id,
            ),
        }
    }

    let token_policies = token.policies.iter().cloned().collect();
    Ok(EffectivePolicies {
        identity_policies,
        token_policies,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use time::OffsetDateTime;

    use warden_context::Context;
    use warden_models::Entity;
    use warden_models::Group;
    use warden_models::GroupType;
    use warden_models::Member;
    use warden_models::Token;
    use warden_models::TokenState;
    use warden_store::Store;

    use super::effective_policies;
    use super::EffectivePolicies;

    fn token(entity_id: Option<&str>, external: &[&str]) -> Token {
        let now = OffsetDateTime::now_utc();
        Token {
            id: "t1".into(),
            entity_id: entity_id.map(String::from),
            external_group_ids: external.iter().map(|id| id.to_string()).collect(),
            external_group_names: vec![],
            expire_time: now,
            issue_time: now,
            last_renew_time: None,
            mount_id: None,
            policies: vec!["default".into()],
            renew_count: 0,
            renewable: true,
            state: TokenState::Active,
            ttl_sec: 0,
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[tokio::test]
    async fn token_without_identity() {
        let context = Context::fixture();
        let store = Store::fixture();
        let policies = effective_policies(&context, &store, &token(None, &[]))
            .await
            .unwrap();
        assert_eq!(
            policies,
            EffectivePolicies {
                identity_policies: BTreeSet::new(),
                token_policies: set(&["default"]),
            }
        );
        assert_eq!(policies.policies(), ["default"]);
    }

    #[tokio::test]
    async fn all_sources_are_merged() {
        let context = Context::fixture();
        let store = Store::fixture();
        let entity = Entity {
            id: "e1".into(),
            aliases: vec![],
            policies: vec!["p1".into(), "p2".into()],
        };
        store.persist(&context, entity).await.unwrap();

        let mut internal = Group::new("g", GroupType::Internal, vec!["p3".into(), "p1".into()]);
        internal
            .internal_mut()
            .unwrap()
            .insert(&Member::Entity("e1".into()));
        store.persist(&context, internal).await.unwrap();
        let external = Group::new("x", GroupType::External, vec!["p5".into()]);
        store.persist(&context, external).await.unwrap();

        let policies = effective_policies(&context, &store, &token(Some("e1"), &["x", "gone"]))
            .await
            .unwrap();
        assert_eq!(policies.identity_policies, set(&["p1", "p2", "p3", "p5"]));
        assert_eq!(
            policies.policies(),
            ["default", "p1", "p2", "p3", "p5"]
        );
    }

    #[tokio::test]
    async fn missing_entity_contributes_nothing() {
        let context = Context::fixture();
        let store = Store::fixture();
        let policies = effective_policies(&context, &store, &token(Some("e0"), &[]))
            .await
            .unwrap();
        assert!(policies.identity_policies.is_empty());
    }

    #[tokio::test]
    async fn parents_of_external_groups_are_resolved() {
        let context = Context::fixture();
        let store = Store::fixture();
        let external = Group::new("x", GroupType::External, vec!["p5".into()]);
        store.persist(&context, external).await.unwrap();
        let mut parent = Group::new("parent", GroupType::Internal, vec!["p8".into()]);
        parent
            .internal_mut()
            .unwrap()
            .insert(&Member::Group("x".into()));
        store.persist(&context, parent).await.unwrap();

        let policies = effective_policies(&context, &store, &token(None, &["x"]))
            .await
            .unwrap();
        assert_eq!(policies.identity_policies, set(&["p5", "p8"]));
    }
}
