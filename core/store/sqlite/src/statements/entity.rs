//! Persistent store operations on Entities and the index of their aliases.
use anyhow::Result;
use tokio_rusqlite::Connection;

use warden_context::Context;
use warden_models::Entity;
use warden_store::delete::DeleteEntity;
use warden_store::ids::AliasID;
use warden_store::query::LookupEntity;

const DELETE_SQL: &str = r#"
DELETE FROM store_entity
WHERE id = ?1;
"#;

const DELETE_ALIASES_SQL: &str = r#"
DELETE FROM store_entity_alias
WHERE entity_id = ?1;
"#;

const INSERT_ALIAS_SQL: &str = r#"
INSERT INTO store_entity_alias (mount_id, name, entity_id)
VALUES (?1, ?2, ?3)
ON CONFLICT(mount_id, name)
DO UPDATE SET
    entity_id=?3
;
"#;

const LOOKUP_SQL: &str = r#"
SELECT entity
FROM store_entity
WHERE id = ?1;
"#;

const LOOKUP_BY_ALIAS_SQL: &str = r#"
SELECT store_entity.entity AS entity
FROM store_entity_alias
JOIN store_entity ON store_entity.id = store_entity_alias.entity_id
WHERE store_entity_alias.mount_id = ?1
  AND store_entity_alias.name = ?2;
"#;

const PERSIST_SQL: &str = r#"
INSERT INTO store_entity (id, entity)
VALUES (?1, ?2)
ON CONFLICT(id)
DO UPDATE SET
    entity=?2
;
"#;

/// Delete an entity, and its aliases, from the store ignoring missing entities.
pub async fn delete(_: &Context, connection: &Connection, entity: DeleteEntity) -> Result<()> {
    let call = connection.call(move |connection| {
        let tx = connection.transaction()?;
        tx.execute(DELETE_ALIASES_SQL, rusqlite::params![&entity.id])?;
        tx.execute(DELETE_SQL, rusqlite::params![&entity.id])?;
        tx.commit()?;
        Ok(())
    });
    crate::telemetry::observe("entity.delete", call).await
}

/// Lookup an entity from the store, if one is available.
pub async fn lookup(
    _: &Context,
    connection: &Connection,
    entity: LookupEntity,
) -> Result<Option<Entity>> {
    let call = connection.call(move |connection| {
        let mut statement = connection.prepare_cached(LOOKUP_SQL)?;
        let mut rows = statement.query([entity.0])?;
        let row = match rows.next()? {
            None => None,
            Some(row) => {
                let entity: String = row.get("entity")?;
                Some(entity)
            }
        };
        Ok(row)
    });
    let entity = crate::telemetry::observe("entity.lookup", call).await?;
    match entity {
        None => Ok(None),
        Some(entity) => {
            let entity = serde_json::from_str(&entity)?;
            Ok(Some(entity))
        }
    }
}

/// Lookup the entity owning the given alias, if one is available.
pub async fn lookup_by_alias(
    _: &Context,
    connection: &Connection,
    alias: AliasID,
) -> Result<Option<Entity>> {
    let call = connection.call(move |connection| {
        let mut statement = connection.prepare_cached(LOOKUP_BY_ALIAS_SQL)?;
        let mut rows = statement.query(rusqlite::params![alias.mount_id, alias.name])?;
        let row = match rows.next()? {
            None => None,
            Some(row) => {
                let entity: String = row.get("entity")?;
                Some(entity)
            }
        };
        Ok(row)
    });
    let entity = crate::telemetry::observe("entity.lookup_by_alias", call).await?;
    match entity {
        None => Ok(None),
        Some(entity) => {
            let entity = serde_json::from_str(&entity)?;
            Ok(Some(entity))
        }
    }
}

/// Persist a new or updated entity and re-index its aliases.
pub async fn persist(_: &Context, connection: &Connection, entity: Entity) -> Result<()> {
    let record = serde_json::to_string(&entity)?;
    let call = connection.call(move |connection| {
        let tx = connection.transaction()?;
        tx.execute(PERSIST_SQL, rusqlite::params![&entity.id, record])?;
        tx.execute(DELETE_ALIASES_SQL, rusqlite::params![&entity.id])?;
        for alias in &entity.aliases {
            tx.execute(
                INSERT_ALIAS_SQL,
                rusqlite::params![&alias.mount_id, &alias.name, &entity.id],
            )?;
        }
        tx.commit()?;
        Ok(())
    });
    crate::telemetry::observe("entity.persist", call).await
}
