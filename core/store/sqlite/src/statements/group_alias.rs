//! Persistent store operations on Group Aliases.
use anyhow::Result;
use tokio_rusqlite::Connection;

use warden_context::Context;
use warden_models::GroupAlias;
use warden_store::delete::DeleteGroupAlias;
use warden_store::ids::AliasID;

const DELETE_SQL: &str = r#"
DELETE FROM store_group_alias
WHERE mount_id = ?1 AND name = ?2;
"#;

const LOOKUP_SQL: &str = r#"
SELECT group_alias
FROM store_group_alias
WHERE mount_id = ?1 AND name = ?2;
"#;

const PERSIST_SQL: &str = r#"
INSERT INTO store_group_alias (mount_id, name, canonical_id, group_alias)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(mount_id, name)
DO UPDATE SET
    canonical_id=?3,
    group_alias=?4
;
"#;

/// Delete a group alias from the store, ignoring missing aliases.
pub async fn delete(_: &Context, connection: &Connection, alias: DeleteGroupAlias) -> Result<()> {
    let alias = alias.0;
    let call = connection.call(move |connection| {
        connection.execute(DELETE_SQL, rusqlite::params![alias.mount_id, alias.name])?;
        Ok(())
    });
    crate::telemetry::observe("group_alias.delete", call).await
}

/// Lookup a group alias by mount and external name, if one is available.
pub async fn lookup(
    _: &Context,
    connection: &Connection,
    alias: AliasID,
) -> Result<Option<GroupAlias>> {
    let call = connection.call(move |connection| {
        let mut statement = connection.prepare_cached(LOOKUP_SQL)?;
        let mut rows = statement.query(rusqlite::params![alias.mount_id, alias.name])?;
        let row = match rows.next()? {
            None => None,
            Some(row) => {
                let alias: String = row.get("group_alias")?;
                Some(alias)
            }
        };
        Ok(row)
    });
    let alias = crate::telemetry::observe("group_alias.lookup", call).await?;
    match alias {
        None => Ok(None),
        Some(alias) => {
            let alias = serde_json::from_str(&alias)?;
            Ok(Some(alias))
        }
    }
}

/// Persist a new or updated group alias into the store.
pub async fn persist(_: &Context, connection: &Connection, alias: GroupAlias) -> Result<()> {
    let record = serde_json::to_string(&alias)?;
    let call = connection.call(move |connection| {
        connection.execute(
            PERSIST_SQL,
            rusqlite::params![alias.mount_id, alias.name, alias.canonical_id, record],
        )?;
        Ok(())
    });
    crate::telemetry::observe("group_alias.persist", call).await
}
