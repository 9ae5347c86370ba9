//! Persistent store operations on Groups and the index of their internal members.
use anyhow::Result;
use tokio_rusqlite::Connection;

use warden_context::Context;
use warden_models::Group;
use warden_store::delete::DeleteGroup;
use warden_store::query::GroupStream;
use warden_store::query::LookupGroup;

const DELETE_SQL: &str = r#"
DELETE FROM store_group
WHERE id = ?1;
"#;

const DELETE_MEMBER_ENTITIES_SQL: &str = r#"
DELETE FROM store_group_member_entity
WHERE group_id = ?1;
"#;

const DELETE_MEMBER_GROUPS_SQL: &str = r#"
DELETE FROM store_group_member_group
WHERE group_id = ?1;
"#;

const INSERT_MEMBER_ENTITY_SQL: &str = r#"
INSERT OR IGNORE INTO store_group_member_entity (group_id, entity_id)
VALUES (?1, ?2);
"#;

const INSERT_MEMBER_GROUP_SQL: &str = r#"
INSERT OR IGNORE INTO store_group_member_group (group_id, member_group_id)
VALUES (?1, ?2);
"#;

const LIST_SQL: &str = r#"
SELECT group_record
FROM store_group
ORDER BY id ASC;
"#;

const LIST_BY_MEMBER_ENTITY_SQL: &str = r#"
SELECT store_group.group_record AS group_record
FROM store_group_member_entity
JOIN store_group ON store_group.id = store_group_member_entity.group_id
WHERE store_group_member_entity.entity_id = ?1
ORDER BY store_group.id ASC;
"#;

const LIST_BY_MEMBER_GROUP_SQL: &str = r#"
SELECT store_group.group_record AS group_record
FROM store_group_member_group
JOIN store_group ON store_group.id = store_group_member_group.group_id
WHERE store_group_member_group.member_group_id = ?1
ORDER BY store_group.id ASC;
"#;

const LOOKUP_SQL: &str = r#"
SELECT group_record
FROM store_group
WHERE id = ?1;
"#;

const PERSIST_SQL: &str = r#"
INSERT INTO store_group (id, group_record)
VALUES (?1, ?2)
ON CONFLICT(id)
DO UPDATE SET
    group_record=?2
;
"#;

/// Delete a group, and its member index, from the store ignoring missing groups.
pub async fn delete(_: &Context, connection: &Connection, group: DeleteGroup) -> Result<()> {
    let call = connection.call(move |connection| {
        let tx = connection.transaction()?;
        tx.execute(DELETE_MEMBER_ENTITIES_SQL, rusqlite::params![&group.id])?;
        tx.execute(DELETE_MEMBER_GROUPS_SQL, rusqlite::params![&group.id])?;
        tx.execute(DELETE_SQL, rusqlite::params![&group.id])?;
        tx.commit()?;
        Ok(())
    });
    crate::telemetry::observe("group.delete", call).await
}

/// List all groups in the store, sorted by ID.
pub async fn list(_: &Context, connection: &Connection) -> Result<GroupStream> {
    let call = connection.call(move |connection| {
        let mut statement = connection.prepare_cached(LIST_SQL)?;
        let rows = statement.query_map([], |row| row.get::<_, String>("group_record"))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    });
    let records = crate::telemetry::observe("group.list", call).await?;
    Ok(super::decode_groups(records))
}

/// List groups with the given entity as a direct member, sorted by ID.
pub async fn list_by_member_entity(
    _: &Context,
    connection: &Connection,
    entity_id: String,
) -> Result<GroupStream> {
    let call = connection.call(move |connection| {
        let mut statement = connection.prepare_cached(LIST_BY_MEMBER_ENTITY_SQL)?;
        let rows = statement.query_map([entity_id], |row| row.get::<_, String>("group_record"))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    });
    let records = crate::telemetry::observe("group.list_by_member_entity", call).await?;
    Ok(super::decode_groups(records))
}

/// List groups with the given group as a direct member, sorted by ID.
pub async fn list_by_member_group(
    _: &Context,
    connection: &Connection,
    group_id: String,
) -> Result<GroupStream> {
    let call = connection.call(move |connection| {
        let mut statement = connection.prepare_cached(LIST_BY_MEMBER_GROUP_SQL)?;
        let rows = statement.query_map([group_id], |row| row.get::<_, String>("group_record"))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    });
    let records = crate::telemetry::observe("group.list_by_member_group", call).await?;
    Ok(super::decode_groups(records))
}

/// Lookup a group from the store, if one is available.
pub async fn lookup(
    _: &Context,
    connection: &Connection,
    group: LookupGroup,
) -> Result<Option<Group>> {
    let call = connection.call(move |connection| {
        let mut statement = connection.prepare_cached(LOOKUP_SQL)?;
        let mut rows = statement.query([group.0])?;
        let row = match rows.next()? {
            None => None,
            Some(row) => {
                let group: String = row.get("group_record")?;
                Some(group)
            }
        };
        Ok(row)
    });
    let group = crate::telemetry::observe("group.lookup", call).await?;
    match group {
        None => Ok(None),
        Some(group) => {
            let group = serde_json::from_str(&group)?;
            Ok(Some(group))
        }
    }
}

/// Persist a new or updated group and re-index its internal members.
pub async fn persist(_: &Context, connection: &Connection, group: Group) -> Result<()> {
    let record = serde_json::to_string(&group)?;
    let call = connection.call(move |connection| {
        let tx = connection.transaction()?;
        tx.execute(PERSIST_SQL, rusqlite::params![&group.id, record])?;
        tx.execute(DELETE_MEMBER_ENTITIES_SQL, rusqlite::params![&group.id])?;
        tx.execute(DELETE_MEMBER_GROUPS_SQL, rusqlite::params![&group.id])?;
        if let Some(internal) = group.internal() {
            for entity_id in &internal.member_entity_ids {
                tx.execute(
                    INSERT_MEMBER_ENTITY_SQL,
                    rusqlite::params![&group.id, entity_id],
                )?;
            }
            for member_id in &internal.member_group_ids {
                tx.execute(
                    INSERT_MEMBER_GROUP_SQL,
                    rusqlite::params![&group.id, member_id],
                )?;
            }
        }
        tx.commit()?;
        Ok(())
    });
    crate::telemetry::observe("group.persist", call).await
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use warden_models::Group;
    use warden_models::GroupType;
    use warden_models::Member;
    use warden_store::delete::DeleteGroup;
    use warden_store::query::ListGroups;
    use warden_store::query::ListGroupsByMemberEntity;
    use warden_store::query::ListGroupsByMemberGroup;
    use warden_store::query::LookupGroup;

    fn internal(id: &str, members: &[Member]) -> Group {
        let mut group = Group::new(id, GroupType::Internal, vec![format!("{}-policy", id)]);
        let internal = group.internal_mut().expect("group must be internal");
        for member in members {
            internal.insert(member);
        }
        group
    }

    #[tokio::test]
    async fn operations() {
        let context = warden_context::Context::fixture();
        let store = crate::statements::tests::store().await;
        let group = Group::new("g1", GroupType::External, vec!["p1".into()]);

        // Check lookup without record.
        let record = store
            .query(&context, LookupGroup::from("g1"))
            .await
            .expect("store lookup to pass");
        assert!(record.is_none());

        // Check deleting without record.
        store.delete(&context, DeleteGroup::from(&group)).await.unwrap();

        // Check persisting (and looking up) a record.
        store.persist(&context, group.clone()).await.unwrap();
        let record = store
            .query(&context, LookupGroup::from("g1"))
            .await
            .expect("store lookup to pass")
            .expect("group record not in store");
        assert_eq!(record, group);

        // Check deleting a record.
        store.delete(&context, DeleteGroup::from(&group)).await.unwrap();
        let record = store
            .query(&context, LookupGroup::from("g1"))
            .await
            .expect("store lookup to pass");
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn list_all_sorted() {
        let context = warden_context::Context::fixture();
        let store = crate::statements::tests::store().await;
        for id in ["g3", "g1", "g2"] {
            store.persist(&context, internal(id, &[])).await.unwrap();
        }

        let groups: Vec<Group> = store
            .query(&context, ListGroups)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let ids: Vec<String> = groups.into_iter().map(|group| group.id).collect();
        assert_eq!(ids, ["g1", "g2", "g3"]);
    }

    #[tokio::test]
    async fn list_by_member() {
        let context = warden_context::Context::fixture();
        let store = crate::statements::tests::store().await;
        let entity = Member::Entity("e1".into());
        let child = Member::Group("g1".into());
        store
            .persist(&context, internal("g1", &[entity.clone()]))
            .await
            .unwrap();
        store
            .persist(&context, internal("g2", &[child.clone()]))
            .await
            .unwrap();
        store
            .persist(&context, internal("g3", &[entity, child]))
            .await
            .unwrap();

        let groups: Vec<Group> = store
            .query(&context, ListGroupsByMemberEntity("e1".into()))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let ids: Vec<String> = groups.into_iter().map(|group| group.id).collect();
        assert_eq!(ids, ["g1", "g3"]);

        let groups: Vec<Group> = store
            .query(&context, ListGroupsByMemberGroup("g1".into()))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let ids: Vec<String> = groups.into_iter().map(|group| group.id).collect();
        assert_eq!(ids, ["g2", "g3"]);

        // Removing members updates the index.
        store.persist(&context, internal("g3", &[])).await.unwrap();
        let groups: Vec<Group> = store
            .query(&context, ListGroupsByMemberEntity("e1".into()))
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let ids: Vec<String> = groups.into_iter().map(|group| group.id).collect();
        assert_eq!(ids, ["g1"]);
    }
}
