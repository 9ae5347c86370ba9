//! Unit test to ensure Store interface type conversions work nicely.
use futures::TryStreamExt;

use warden_context::Context;
use warden_models::Entity;
use warden_models::EntityAlias;
use warden_models::Group;
use warden_models::GroupAlias;
use warden_models::GroupType;
use warden_models::Member;

use crate::delete::DeleteEntity;
use crate::delete::DeleteGroupAlias;
use crate::ids::AliasID;
use crate::query::ListGroups;
use crate::query::ListGroupsByMemberEntity;
use crate::query::ListGroupsByMemberGroup;
use crate::query::LookupEntity;
use crate::query::LookupEntityByAlias;
use crate::query::LookupGroupAlias;
use crate::Store;

fn internal_group(id: &str, members: &[Member]) -> Group {
    let mut group = Group::new(id, GroupType::Internal, vec![]);
    let internal = group.internal_mut().unwrap();
    for member in members {
        internal.insert(member);
    }
    group
}

#[tokio::test]
async fn check_delete_interface() {
    let context = Context::fixture();
    let store = Store::fixture();
    store
        .delete(&context, DeleteEntity::from("e1"))
        .await
        .expect("entity delete to be ok");
}

#[tokio::test]
async fn check_query_interface() {
    let context = Context::fixture();
    let store = Store::fixture();
    let entity = store
        .query(&context, LookupEntity::from("e1"))
        .await
        .expect("entity query to be ok");
    assert!(entity.is_none());
}

#[tokio::test]
async fn check_persist_interface() {
    let context = Context::fixture();
    let store = Store::fixture();
    let entity = Entity {
        id: "e1".into(),
        aliases: vec![EntityAlias::new("ldap-1", "tesla")],
        policies: vec!["default".into()],
    };
    store
        .persist(&context, entity.clone())
        .await
        .expect("entity persist to be ok");

    let alias = LookupEntityByAlias(AliasID::new("ldap-1", "tesla"));
    let found = store.query(&context, alias).await.unwrap();
    assert_eq!(found, Some(entity));
}

#[tokio::test]
async fn group_alias_lifecycle() {
    let context = Context::fixture();
    let store = Store::fixture();
    let alias = GroupAlias {
        id: "a1".into(),
        canonical_id: "g2".into(),
        mount_id: "ldap-1".into(),
        name: "testgroup1".into(),
    };
    store.persist(&context, alias.clone()).await.unwrap();

    let lookup = LookupGroupAlias(AliasID::new("ldap-1", "testgroup1"));
    let found = store.query(&context, lookup.clone()).await.unwrap();
    assert_eq!(found, Some(alias.clone()));

    store
        .delete(&context, DeleteGroupAlias::from(&alias))
        .await
        .unwrap();
    let found = store.query(&context, lookup).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn list_groups_by_member() {
    let context = Context::fixture();
    let store = Store::fixture();
    let g1 = internal_group("g1", &[Member::Entity("e1".into())]);
    let g2 = internal_group("g2", &[Member::Group("g1".into())]);
    let g3 = internal_group(
        "g3",
        &[Member::Entity("e1".into()), Member::Group("g1".into())],
    );
    let external = Group::new("g4", GroupType::External, vec![]);
    for group in [g3, g1, g2, external] {
        store.persist(&context, group).await.unwrap();
    }

    let op = ListGroupsByMemberEntity("e1".into());
    let groups: Vec<Group> = store
        .query(&context, op)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    let ids: Vec<&str> = groups.iter().map(|group| group.id.as_str()).collect();
    assert_eq!(ids, ["g1", "g3"]);

    let op = ListGroupsByMemberGroup("g1".into());
    let groups: Vec<Group> = store
        .query(&context, op)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    let ids: Vec<&str> = groups.iter().map(|group| group.id.as_str()).collect();
    assert_eq!(ids, ["g2", "g3"]);

    let groups: Vec<Group> = store
        .query(&context, ListGroups)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(groups.len(), 4);
}
