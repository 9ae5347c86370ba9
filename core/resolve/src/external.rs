//! Match external group names reported by authentication methods to groups.
use std::collections::BTreeSet;

use anyhow::Result;

use warden_context::Context;
use warden_store::ids::AliasID;
use warden_store::query::LookupGroup;
use warden_store::query::LookupGroupAlias;
use warden_store::Store;

/// Resolve external group names reported under a mount into group IDs.
///
/// Names without a matching group alias are dropped.
/// Matched groups are expanded with their internal parents so nested
/// external groups pass their membership on.
///
/// Given the same directory state the result is always the same.
pub async fn resolve_external_groups<S>(
    context: &Context,
    store: &Store,
    mount_id: &str,
    names: &[S],
) -> Result<BTreeSet<String>>
where
    S: AsRef<str>,
{
    let matched = match_external_groups(context, store, mount_id, names).await?;
    crate::expand_parents(context, store, matched).await
}

/// Match external group names reported under a mount to the external groups aliasing them.
///
/// Unlike [`resolve_external_groups`] the internal parents of matched groups are not included.
pub async fn match_external_groups<S>(
    context: &Context,
    store: &Store,
    mount_id: &str,
    names: &[S],
) -> Result<BTreeSet<String>>
where
    S: AsRef<str>,
{
    let mut matched = BTreeSet::new();
    for name in names {
        let name = name.as_ref();
        let lookup = LookupGroupAlias(AliasID::new(mount_id, name));
        let alias = match store.query(context, lookup).await? {
            Some(alias) => alias,
            None => {
                slog::debug!(
                    context.logger, "Ignoring external group name without alias";
                    "mount_id" => mount_id,
                    "name" => name,
                );
                continue;
            }
        };

        let group = store
            .query(context, LookupGroup::from(alias.canonical_id.as_str()))
            .await?;
        if group.is_none() {
            slog::debug!(
                context.logger, "Ignoring group alias targeting a missing group";
                "mount_id" => mount_id,
                "name" => name,
                "group_id" => &alias.canonical_id,
            );
            continue;
        }
        matched.insert(alias.canonical_id);
    }
    Ok(matched)
}
