//! Traversal of the internal group membership graph.
use std::collections::BTreeSet;
use std::collections::VecDeque;

use anyhow::Result;
use futures::TryStreamExt;

use warden_context::Context;
use warden_store::query::ListGroupsByMemberEntity;
use warden_store::query::ListGroupsByMemberGroup;
use warden_store::Store;

/// Expand a set of groups with all their ancestors, following parent edges upwards.
///
/// The returned set includes the starting groups.
/// Each group is visited once so cycles in the membership graph terminate.
pub async fn expand_parents<I>(context: &Context, store: &Store, groups: I) -> Result<BTreeSet<String>>
where
    I: IntoIterator<Item = String>,
{
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    for group in groups {
        if visited.insert(group.clone()) {
            queue.push_back(group);
        }
    }

    while let Some(group_id) = queue.pop_front() {
        let mut parents = store
            .query(context, ListGroupsByMemberGroup(group_id))
            .await?;
        while let Some(parent) = parents.try_next().await? {
            if visited.insert(parent.id.clone()) {
                queue.push_back(parent.id);
            }
        }
    }
    Ok(visited)
}

/// Compute the closure of internal groups an entity belongs to, directly or through nesting.
pub async fn resolve_internal_groups(
    context: &Context,
    store: &Store,
    entity_id: &str,
) -> Result<BTreeSet<String>> {
    let direct: Vec<String> = store
        .query(context, ListGroupsByMemberEntity(entity_id.to_string()))
        .await?
        .map_ok(|group| group.id)
        .try_collect()
        .await?;
    expand_parents(context, store, direct).await
}
