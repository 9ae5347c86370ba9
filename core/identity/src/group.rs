//! Directory of internal and external groups and the aliases of external groups.
use anyhow::Result;
use futures::TryStreamExt;

use warden_context::Context;
use warden_errors::GroupAliasConflict;
use warden_errors::GroupAliasNotFound;
use warden_errors::GroupKindMismatch;
use warden_errors::GroupNotFound;
use warden_errors::InvalidReference;
use warden_models::Group;
use warden_models::GroupAlias;
use warden_models::GroupAliasKey;
use warden_models::GroupType;
use warden_models::Member;
use warden_store::delete::DeleteGroup;
use warden_store::delete::DeleteGroupAlias;
use warden_store::ids::AliasID;
use warden_store::query::ListGroups;
use warden_store::query::LookupEntity;
use warden_store::query::LookupGroup;
use warden_store::query::LookupGroupAlias;
use warden_store::Store;

use crate::RecordLocks;

/// Manage [`Group`] records and [`GroupAlias`]es.
#[derive(Clone)]
pub struct GroupDirectory {
    locks: RecordLocks,
    store: Store,
}

impl GroupDirectory {
    pub fn new(store: Store, locks: RecordLocks) -> Self {
        GroupDirectory { locks, store }
    }

    /// Add an entity or a child group to the members of an internal group.
    ///
    /// ## Errors
    ///
    /// - [`GroupNotFound`] if the group does not exist.
    /// - [`GroupKindMismatch`] if the group is not internal.
    /// - [`InvalidReference`] if the member does not exist.
    pub async fn add_member(&self, context: &Context, group_id: &str, member: Member) -> Result<()> {
        let _group_lock = self.locks.group(group_id).await;
        let mut group = self.fetch(context, group_id).await?;
        let internal = match group.internal_mut() {
            Some(internal) => internal,
            None => anyhow::bail!(GroupKindMismatch::internal(group_id)),
        };

        match &member {
            Member::Entity(id) => {
                let entity = self.store.query(context, LookupEntity::from(id.as_str()));
                if entity.await?.is_none() {
                    anyhow::bail!(InvalidReference::entity(id));
                }
            }
            Member::Group(id) => {
                let child = self.store.query(context, LookupGroup::from(id.as_str()));
                if child.await?.is_none() {
                    anyhow::bail!(InvalidReference::group(id));
                }
            }
        }

        if !internal.insert(&member) {
            return Ok(());
        }
        self.store.persist(context, group).await?;
        slog::debug!(
            context.logger, "Added member to group";
            "group_id" => group_id,
            "member" => %member,
        );
        Ok(())
    }

    /// Bind an external group name under a mount to an external group.
    ///
    /// ## Errors
    ///
    /// - [`GroupAliasConflict`] if an alias with the same mount and name exists.
    /// - [`GroupNotFound`] if the group does not exist.
    /// - [`GroupKindMismatch`] if the group is not external.
    pub async fn create_group_alias(
        &self,
        context: &Context,
        group_id: &str,
        mount_id: &str,
        name: &str,
    ) -> Result<GroupAlias> {
        let _alias_lock = self.locks.group_alias(mount_id, name).await;
        let lookup = LookupGroupAlias(AliasID::new(mount_id, name));
        if let Some(existing) = self.store.query(context, lookup).await? {
            let error = GroupAliasConflict::new(mount_id, name, existing.canonical_id);
            anyhow::bail!(error);
        }

        let _group_lock = self.locks.group(group_id).await;
        let mut group = self.fetch(context, group_id).await?;
        let external = match group.external_mut() {
            Some(external) => external,
            None => anyhow::bail!(GroupKindMismatch::external(group_id)),
        };

        let alias = GroupAlias {
            id: warden_models::new_id(),
            canonical_id: group_id.to_string(),
            mount_id: mount_id.to_string(),
            name: name.to_string(),
        };
        // Persist the group first: an alias record never exists without its key on the group.
        external.aliases.insert(alias.key());
        self.store.persist(context, group).await?;
        self.store.persist(context, alias.clone()).await?;
        slog::debug!(
            context.logger, "Created group alias";
            "group_id" => group_id,
            "mount_id" => mount_id,
            "name" => name,
        );
        Ok(alias)
    }

    /// Create a new group of the given type and return its ID.
    pub async fn create_group(
        &self,
        context: &Context,
        group_type: GroupType,
        policies: Vec<String>,
    ) -> Result<String> {
        let policies = warden_models::normalise_policies(policies);
        let group = Group::new(warden_models::new_id(), group_type, policies);
        let id = group.id.clone();
        self.store.persist(context, group).await?;
        slog::debug!(
            context.logger, "Created group";
            "group_id" => &id,
            "type" => %group_type,
        );
        Ok(id)
    }

    /// Delete a group along with all the aliases targeting it.
    ///
    /// Internal groups that list the deleted group as a member are not updated:
    /// the dangling reference contributes nothing to policy resolution.
    pub async fn delete_group(&self, context: &Context, group_id: &str) -> Result<()> {
        let _group_lock = self.locks.group(group_id).await;
        let group = self.fetch(context, group_id).await?;
        if let Some(external) = group.external() {
            for key in &external.aliases {
                let alias = DeleteGroupAlias(AliasID::from(key));
                self.store.delete(context, alias).await?;
            }
        }
        self.store.delete(context, DeleteGroup::from(&group)).await?;
        slog::debug!(context.logger, "Deleted group"; "group_id" => group_id);
        Ok(())
    }

    /// Remove a group alias, detaching it from its group.
    pub async fn delete_group_alias(
        &self,
        context: &Context,
        mount_id: &str,
        name: &str,
    ) -> Result<()> {
        let _alias_lock = self.locks.group_alias(mount_id, name).await;
        let alias = self.fetch_alias(context, mount_id, name).await?;

        let _group_lock = self.locks.group(&alias.canonical_id).await;
        self.store
            .delete(context, DeleteGroupAlias::from(&alias))
            .await?;

        let lookup = LookupGroup::from(alias.canonical_id.as_str());
        if let Some(mut group) = self.store.query(context, lookup).await? {
            let key = GroupAliasKey::new(mount_id, name);
            let removed = group
                .external_mut()
                .map(|external| external.aliases.remove(&key))
                .unwrap_or(false);
            if removed {
                self.store.persist(context, group).await?;
            }
        }
        slog::debug!(
            context.logger, "Deleted group alias";
            "group_id" => &alias.canonical_id,
            "mount_id" => mount_id,
            "name" => name,
        );
        Ok(())
    }

    /// Fetch a group by ID.
    pub async fn get_group(&self, context: &Context, group_id: &str) -> Result<Group> {
        self.fetch(context, group_id).await
    }

    /// List all groups, sorted by ID.
    pub async fn list_groups(&self, context: &Context) -> Result<Vec<Group>> {
        let groups = self.store.query(context, ListGroups).await?;
        groups.try_collect().await
    }

    /// Find the group alias for an external group name under a mount.
    ///
    /// The returned alias carries the ID of the canonical group it targets.
    pub async fn lookup_group_alias(
        &self,
        context: &Context,
        mount_id: &str,
        name: &str,
    ) -> Result<GroupAlias> {
        self.fetch_alias(context, mount_id, name).await
    }

    /// Remove an entity or a child group from the members of an internal group.
    ///
    /// Removing something that is not a member is a no-op.
    pub async fn remove_member(
        &self,
        context: &Context,
        group_id: &str,
        member: Member,
    ) -> Result<()> {
        let _group_lock = self.locks.group(group_id).await;
        let mut group = self.fetch(context, group_id).await?;
        let internal = match group.internal_mut() {
            Some(internal) => internal,
            None => anyhow::bail!(GroupKindMismatch::internal(group_id)),
        };
        if !internal.remove(&member) {
            return Ok(());
        }
        self.store.persist(context, group).await?;
        slog::debug!(
            context.logger, "Removed member from group";
            "group_id" => group_id,
            "member" => %member,
        );
        Ok(())
    }

    /// Replace the policies directly assigned to a group.
    pub async fn set_policies(
        &self,
        context: &Context,
        group_id: &str,
        policies: Vec<String>,
    ) -> Result<()> {
        let _group_lock = self.locks.group(group_id).await;
        let mut group = self.fetch(context, group_id).await?;
        group.policies = warden_models::normalise_policies(policies);
        slog::debug!(
            context.logger, "Updating group policies";
            "group_id" => group_id,
            "policies" => ?group.policies,
        );
        self.store.persist(context, group).await
    }

    async fn fetch(&self, context: &Context, group_id: &str) -> Result<Group> {
        match self.store.query(context, LookupGroup::from(group_id)).await? {
            Some(group) => Ok(group),
            None => anyhow::bail!(GroupNotFound::new(group_id)),
        }
    }

    async fn fetch_alias(&self, context: &Context, mount_id: &str, name: &str) -> Result<GroupAlias> {
        let lookup = LookupGroupAlias(AliasID::new(mount_id, name));
        match self.store.query(context, lookup).await? {
            Some(alias) => Ok(alias),
            None => anyhow::bail!(GroupAliasNotFound::new(mount_id, name)),
        }
    }
}
