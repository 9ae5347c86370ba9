//! Behaviour of token policies as the directories change.
use warden_conf::TokenConf;
use warden_context::Context;
use warden_identity::EntityDirectory;
use warden_identity::GroupDirectory;
use warden_identity::RecordLocks;
use warden_models::GroupType;
use warden_models::Member;
use warden_store::Store;

use crate::AuthResponse;
use crate::IssueRequest;
use crate::TokenPolicyCache;

struct Engine {
    entities: EntityDirectory,
    groups: GroupDirectory,
    tokens: TokenPolicyCache,
}

impl Engine {
    fn new() -> Engine {
        let store = Store::fixture();
        let locks = RecordLocks::default();
        Engine {
            entities: EntityDirectory::new(store.clone(), locks.clone()),
            groups: GroupDirectory::new(store.clone(), locks.clone()),
            tokens: TokenPolicyCache::new(store, locks, TokenConf::default()),
        }
    }

    async fn policies(&self, token_id: &str) -> Vec<String> {
        let context = Context::fixture();
        let lookup = self.tokens.lookup(&context, token_id).await.unwrap();
        lookup.policies.policies()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[tokio::test]
async fn login_renew_scenario() {
    let context = Context::fixture();
    let engine = Engine::new();
    let auth = AuthResponse {
        external_group_names: strings(&["g1"]),
        mount_id: "m1".into(),
        policies: vec![],
        principal_name: "e1".into(),
    };
    let token = engine.tokens.login(&context, auth).await.unwrap();
    let entity_id = token.entity_id.clone().unwrap();
    assert!(engine.policies(&token.id).await.is_empty());

    // Direct entity policies are visible immediately.
    engine
        .entities
        .set_policies(&context, &entity_id, strings(&["p1", "p2"]))
        .await
        .unwrap();
    assert_eq!(engine.policies(&token.id).await, ["p1", "p2"]);

    // Internal group policies are visible immediately.
    let internal = engine
        .groups
        .create_group(&context, GroupType::Internal, strings(&["p3", "p4"]))
        .await
        .unwrap();
    engine
        .groups
        .add_member(&context, &internal, Member::Entity(entity_id.clone()))
        .await
        .unwrap();
    assert_eq!(engine.policies(&token.id).await, ["p1", "p2", "p3", "p4"]);

    // External group policies wait for renewal.
    let external = engine
        .groups
        .create_group(&context, GroupType::External, strings(&["p5", "p6"]))
        .await
        .unwrap();
    engine
        .groups
        .create_group_alias(&context, &external, "m1", "g1")
        .await
        .unwrap();
    assert_eq!(engine.policies(&token.id).await, ["p1", "p2", "p3", "p4"]);

    engine.tokens.renew(&context, &token.id, None).await.unwrap();
    assert_eq!(
        engine.policies(&token.id).await,
        ["p1", "p2", "p3", "p4", "p5", "p6"]
    );
}

#[tokio::test]
async fn policy_changes_on_cached_groups_are_live() {
    let context = Context::fixture();
    let engine = Engine::new();
    let external = engine
        .groups
        .create_group(&context, GroupType::External, strings(&["p5"]))
        .await
        .unwrap();
    engine
        .groups
        .create_group_alias(&context, &external, "m1", "admins")
        .await
        .unwrap();
    let request = IssueRequest {
        external_group_names: strings(&["admins"]),
        mount_id: Some("m1".into()),
        renewable: true,
        ..Default::default()
    };
    let token = engine.tokens.issue(&context, request).await.unwrap();
    assert_eq!(engine.policies(&token.id).await, ["p5"]);

    engine
        .groups
        .set_policies(&context, &external, strings(&["p5", "p7"]))
        .await
        .unwrap();
    assert_eq!(engine.policies(&token.id).await, ["p5", "p7"]);
}

#[tokio::test]
async fn removed_alias_is_dropped_on_renew() {
    let context = Context::fixture();
    let engine = Engine::new();
    let external = engine
        .groups
        .create_group(&context, GroupType::External, strings(&["p5"]))
        .await
        .unwrap();
    engine
        .groups
        .create_group_alias(&context, &external, "m1", "admins")
        .await
        .unwrap();
    let request = IssueRequest {
        external_group_names: strings(&["admins"]),
        mount_id: Some("m1".into()),
        renewable: true,
        ..Default::default()
    };
    let token = engine.tokens.issue(&context, request).await.unwrap();

    engine
        .groups
        .delete_group_alias(&context, "m1", "admins")
        .await
        .unwrap();
    assert_eq!(engine.policies(&token.id).await, ["p5"]);
    engine.tokens.renew(&context, &token.id, None).await.unwrap();
    assert!(engine.policies(&token.id).await.is_empty());
}

#[tokio::test]
async fn no_false_external_grant() {
    let context = Context::fixture();
    let engine = Engine::new();
    let external = engine
        .groups
        .create_group(&context, GroupType::External, strings(&["p5"]))
        .await
        .unwrap();
    engine
        .groups
        .create_group_alias(&context, &external, "m1", "admins")
        .await
        .unwrap();

    // Wrong mount.
    let request = IssueRequest {
        external_group_names: strings(&["admins"]),
        mount_id: Some("m2".into()),
        renewable: true,
        ..Default::default()
    };
    let token = engine.tokens.issue(&context, request).await.unwrap();
    assert!(engine.policies(&token.id).await.is_empty());

    // Wrong name.
    let request = IssueRequest {
        external_group_names: strings(&["users"]),
        mount_id: Some("m1".into()),
        renewable: true,
        ..Default::default()
    };
    let token = engine.tokens.issue(&context, request).await.unwrap();
    engine.tokens.renew(&context, &token.id, None).await.unwrap();
    assert!(engine.policies(&token.id).await.is_empty());
}

#[tokio::test]
async fn external_group_nested_in_internal_group() {
    let context = Context::fixture();
    let engine = Engine::new();
    let external = engine
        .groups
        .create_group(&context, GroupType::External, strings(&["p5"]))
        .await
        .unwrap();
    engine
        .groups
        .create_group_alias(&context, &external, "m1", "admins")
        .await
        .unwrap();
    let parent = engine
        .groups
        .create_group(&context, GroupType::Internal, strings(&["p8"]))
        .await
        .unwrap();
    engine
        .groups
        .add_member(&context, &parent, Member::Group(external.clone()))
        .await
        .unwrap();

    let request = IssueRequest {
        external_group_names: strings(&["admins"]),
        mount_id: Some("m1".into()),
        renewable: true,
        ..Default::default()
    };
    let token = engine.tokens.issue(&context, request).await.unwrap();
    assert_eq!(engine.policies(&token.id).await, ["p5", "p8"]);
}

#[tokio::test]
async fn cyclic_groups_grant_policies_once() {
    let context = Context::fixture();
    let engine = Engine::new();
    let entity_id = engine
        .entities
        .create_entity(&context, vec![])
        .await
        .unwrap();
    let a = engine
        .groups
        .create_group(&context, GroupType::Internal, strings(&["pa"]))
        .await
        .unwrap();
    let b = engine
        .groups
        .create_group(&context, GroupType::Internal, strings(&["pb"]))
        .await
        .unwrap();
    engine
        .groups
        .add_member(&context, &a, Member::Entity(entity_id.clone()))
        .await
        .unwrap();
    engine
        .groups
        .add_member(&context, &a, Member::Group(b.clone()))
        .await
        .unwrap();
    engine
        .groups
        .add_member(&context, &b, Member::Group(a.clone()))
        .await
        .unwrap();

    let request = IssueRequest {
        entity_id: Some(entity_id),
        renewable: true,
        ..Default::default()
    };
    let token = engine.tokens.issue(&context, request).await.unwrap();
    let lookup = engine.tokens.lookup(&context, &token.id).await.unwrap();
    assert_eq!(lookup.policies.policies(), ["pa", "pb"]);
}

#[tokio::test]
async fn split_policy_report() {
    let context = Context::fixture();
    let engine = Engine::new();
    let entity_id = engine
        .entities
        .create_entity(&context, strings(&["shared", "p1"]))
        .await
        .unwrap();
    let request = IssueRequest {
        entity_id: Some(entity_id),
        policies: strings(&["shared", "default"]),
        renewable: true,
        ..Default::default()
    };
    let token = engine.tokens.issue(&context, request).await.unwrap();
    let lookup = engine.tokens.lookup(&context, &token.id).await.unwrap();

    let report = serde_json::to_value(&lookup.policies).unwrap();
    assert_eq!(
        report,
        serde_json::json!({
            "identity_policies": ["p1", "shared"],
            "token_policies": ["default", "shared"],
        })
    );
    assert_eq!(lookup.policies.policies(), ["default", "p1", "shared"]);
}

#[tokio::test]
async fn parents_of_cached_external_groups_are_live() {
    let context = Context::fixture();
    let engine = Engine::new();
    let external = engine
        .groups
        .create_group(&context, GroupType::External, strings(&["p5"]))
        .await
        .unwrap();
    engine
        .groups
        .create_group_alias(&context, &external, "m1", "admins")
        .await
        .unwrap();
    let request = IssueRequest {
        external_group_names: strings(&["admins"]),
        mount_id: Some("m1".into()),
        renewable: true,
        ..Default::default()
    };
    let token = engine.tokens.issue(&context, request).await.unwrap();
    assert_eq!(engine.policies(&token.id).await, ["p5"]);

    // Nesting the external group is internal membership and is visible without renewal.
    let parent = engine
        .groups
        .create_group(&context, GroupType::Internal, strings(&["p8"]))
        .await
        .unwrap();
    engine
        .groups
        .add_member(&context, &parent, Member::Group(external.clone()))
        .await
        .unwrap();
    assert_eq!(engine.policies(&token.id).await, ["p5", "p8"]);

    engine
        .groups
        .remove_member(&context, &parent, Member::Group(external.clone()))
        .await
        .unwrap();
    assert_eq!(engine.policies(&token.id).await, ["p5"]);
    assert_eq!(token.external_group_ids.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lookups_racing_renewal_see_whole_cache() {
    let context = Context::fixture();
    let engine = Engine::new();
    let request = IssueRequest {
        external_group_names: strings(&["admins"]),
        mount_id: Some("m1".into()),
        renewable: true,
        ..Default::default()
    };
    let token = engine.tokens.issue(&context, request).await.unwrap();
    let external = engine
        .groups
        .create_group(&context, GroupType::External, strings(&["p5", "p6"]))
        .await
        .unwrap();
    engine
        .groups
        .create_group_alias(&context, &external, "m1", "admins")
        .await
        .unwrap();

    let renewals = {
        let context = context.clone();
        let tokens = engine.tokens.clone();
        let token_id = token.id.clone();
        tokio::spawn(async move {
            for _ in 0..10 {
                tokens.renew(&context, &token_id, None).await.unwrap();
            }
        })
    };
    let mut lookups = Vec::new();
    for _ in 0..50 {
        let context = context.clone();
        let tokens = engine.tokens.clone();
        let token_id = token.id.clone();
        lookups.push(tokio::spawn(async move {
            tokens.lookup(&context, &token_id).await.unwrap()
        }));
    }

    renewals.await.unwrap();
    for lookup in lookups {
        let lookup = lookup.await.unwrap();
        if lookup.token.renew_count == 0 {
            assert!(lookup.token.external_group_ids.is_empty());
            assert!(lookup.policies.policies().is_empty());
        } else {
            assert!(lookup.token.external_group_ids.contains(&external));
            assert_eq!(lookup.policies.policies(), ["p5", "p6"]);
        }
    }
    let lookup = engine.tokens.lookup(&context, &token.id).await.unwrap();
    assert_eq!(lookup.token.renew_count, 10);
}
