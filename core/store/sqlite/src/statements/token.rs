//! Persistent store operations on Tokens.
use anyhow::Result;
use futures::StreamExt;
use tokio_rusqlite::Connection;

use warden_context::Context;
use warden_models::Token;
use warden_store::delete::DeleteToken;
use warden_store::query::LookupToken;
use warden_store::query::TokenStream;

const DELETE_SQL: &str = r#"
DELETE FROM store_token
WHERE id = ?1;
"#;

const LIST_SQL: &str = r#"
SELECT token
FROM store_token
ORDER BY id ASC;
"#;

const LOOKUP_SQL: &str = r#"
SELECT token
FROM store_token
WHERE id = ?1;
"#;

const PERSIST_SQL: &str = r#"
INSERT INTO store_token (id, token)
VALUES (?1, ?2)
ON CONFLICT(id)
DO UPDATE SET
    token=?2
;
"#;

/// Delete a token from the store, ignoring missing tokens.
pub async fn delete(_: &Context, connection: &Connection, token: DeleteToken) -> Result<()> {
    let call = connection.call(move |connection| {
        connection.execute(DELETE_SQL, rusqlite::params![token.id])?;
        Ok(())
    });
    crate::telemetry::observe("token.delete", call).await
}

/// List all tokens in the store, sorted by ID.
pub async fn list(_: &Context, connection: &Connection) -> Result<TokenStream> {
    let call = connection.call(move |connection| {
        let mut statement = connection.prepare_cached(LIST_SQL)?;
        let rows = statement.query_map([], |row| row.get::<_, String>("token"))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    });
    let records = crate::telemetry::observe("token.list", call).await?;
    let tokens = futures::stream::iter(records)
        .map(|record| {
            let token: Token = serde_json::from_str(&record)?;
            Ok(token)
        })
        .boxed();
    Ok(tokens)
}

/// Lookup a token from the store, if one is available.
pub async fn lookup(
    _: &Context,
    connection: &Connection,
    token: LookupToken,
) -> Result<Option<Token>> {
    let call = connection.call(move |connection| {
        let mut statement = connection.prepare_cached(LOOKUP_SQL)?;
        let mut rows = statement.query([token.0])?;
        let row = match rows.next()? {
            None => None,
            Some(row) => {
                let token: String = row.get("token")?;
                Some(token)
            }
        };
        Ok(row)
    });
    let token = crate::telemetry::observe("token.lookup", call).await?;
    match token {
        None => Ok(None),
        Some(token) => {
            let token = serde_json::from_str(&token)?;
            Ok(Some(token))
        }
    }
}

/// Persist a new or updated token into the store.
pub async fn persist(_: &Context, connection: &Connection, token: Token) -> Result<()> {
    let record = serde_json::to_string(&token)?;
    let call = connection.call(move |connection| {
        connection.execute(PERSIST_SQL, rusqlite::params![token.id, record])?;
        Ok(())
    });
    crate::telemetry::observe("token.persist", call).await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use futures::TryStreamExt;
    use time::macros::datetime;

    use warden_models::Token;
    use warden_models::TokenState;
    use warden_store::delete::DeleteToken;
    use warden_store::query::ListTokens;
    use warden_store::query::LookupToken;

    fn token() -> Token {
        Token {
            id: "t1".into(),
            entity_id: Some("e1".into()),
            external_group_ids: BTreeSet::from(["g1".to_string()]),
            external_group_names: vec!["admins".into()],
            expire_time: datetime!(2024-01-02 00:00 UTC),
            issue_time: datetime!(2024-01-01 00:00 UTC),
            last_renew_time: None,
            mount_id: Some("m1".into()),
            policies: vec!["p1".into()],
            renew_count: 0,
            renewable: true,
            state: TokenState::Active,
            ttl_sec: 86400,
        }
    }

    #[tokio::test]
    async fn operations() {
        let context = warden_context::Context::fixture();
        let store = crate::statements::tests::store().await;
        let mut token = token();

        // Check lookup without record.
        let record = store
            .query(&context, LookupToken::from("t1"))
            .await
            .expect("store lookup to pass");
        assert!(record.is_none());

        // Check deleting without record.
        store.delete(&context, DeleteToken::from(&token)).await.unwrap();

        // Check persisting (and looking up) a record.
        store.persist(&context, token.clone()).await.unwrap();
        let record = store
            .query(&context, LookupToken::from("t1"))
            .await
            .expect("store lookup to pass")
            .expect("token record not in store");
        assert_eq!(record, token);

        // Check updating a record.
        token.state = TokenState::Revoked;
        store.persist(&context, token.clone()).await.unwrap();
        let record = store
            .query(&context, LookupToken::from("t1"))
            .await
            .unwrap()
            .expect("token record not in store");
        assert_eq!(record.state, TokenState::Revoked);

        // Check deleting a record.
        store.delete(&context, DeleteToken::from(&token)).await.unwrap();
        let record = store
            .query(&context, LookupToken::from("t1"))
            .await
            .expect("store lookup to pass");
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn list_sorted() {
        let context = warden_context::Context::fixture();
        let store = crate::statements::tests::store().await;
        for id in ["t3", "t1", "t2"] {
            let token = Token {
                id: id.into(),
                ..token()
            };
            store.persist(&context, token).await.unwrap();
        }

        let tokens: Vec<Token> = store
            .query(&context, ListTokens)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let ids: Vec<_> = tokens.into_iter().map(|token| token.id).collect();
        assert_eq!(ids, ["t1", "t2", "t3"]);
    }
}
