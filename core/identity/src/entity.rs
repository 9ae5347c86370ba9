//! Directory of entities and the aliases binding them to authentication mounts.
use anyhow::Result;

use warden_context::Context;
use warden_errors::EntityAliasConflict;
use warden_errors::EntityAliasNotFound;
use warden_errors::EntityNotFound;
use warden_models::Entity;
use warden_models::EntityAlias;
use warden_store::delete::DeleteEntity;
use warden_store::ids::AliasID;
use warden_store::query::LookupEntity;
use warden_store::query::LookupEntityByAlias;
use warden_store::Store;

use crate::RecordLocks;

/// Manage [`Entity`] records and their aliases.
#[derive(Clone)]
pub struct EntityDirectory {
    locks: RecordLocks,
    store: Store,
}

impl EntityDirectory {
    pub fn new(store: Store, locks: RecordLocks) -> Self {
        EntityDirectory { locks, store }
    }

    /// Bind an alias to an entity.
    ///
    /// Attaching an alias the entity already owns is a no-op.
    ///
    /// ## Errors
    ///
    /// - [`EntityNotFound`] if the entity does not exist.
    /// - [`EntityAliasConflict`] if another entity owns the alias.
    pub async fn attach_alias(
        &self,
        context: &Context,
        entity_id: &str,
        mount_id: &str,
        name: &str,
    ) -> Result<()> {
        let _alias_lock = self.locks.entity_alias(mount_id, name).await;
        let _entity_lock = self.locks.entity(entity_id).await;

        let owner = LookupEntityByAlias(AliasID::new(mount_id, name));
        if let Some(owner) = self.store.query(context, owner).await? {
            if owner.id == entity_id {
                return Ok(());
            }
            let error = EntityAliasConflict::new(mount_id, name, owner.id);
            anyhow::bail!(error);
        }

        let mut entity = self.fetch(context, entity_id).await?;
        entity.aliases.push(EntityAlias::new(mount_id, name));
        self.store.persist(context, entity).await?;
        slog::debug!(
            context.logger, "Attached alias to entity";
            "entity_id" => entity_id,
            "mount_id" => mount_id,
            "name" => name,
        );
        Ok(())
    }

    /// Create a new entity with the given policies and return its ID.
    pub async fn create_entity(&self, context: &Context, policies: Vec<String>) -> Result<String> {
        let entity = Entity {
            id: warden_models::new_id(),
            aliases: Vec::new(),
            policies: warden_models::normalise_policies(policies),
        };
        let id = entity.id.clone();
        self.store.persist(context, entity).await?;
        slog::debug!(context.logger, "Created entity"; "entity_id" => &id);
        Ok(id)
    }

    /// Delete an entity along with all of its aliases.
    pub async fn delete_entity(&self, context: &Context, entity_id: &str) -> Result<()> {
        let _entity_lock = self.locks.entity(entity_id).await;
        let entity = self.fetch(context, entity_id).await?;
        self.store
            .delete(context, DeleteEntity::from(&entity))
            .await?;
        slog::debug!(
            context.logger, "Deleted entity";
            "entity_id" => entity_id,
            "aliases" => entity.aliases.len(),
        );
        Ok(())
    }

    /// Remove an alias from an entity.
    ///
    /// ## Errors
    ///
    /// - [`EntityNotFound`] if the entity does not exist.
    /// - [`EntityAliasNotFound`] if the entity does not own the alias.
    pub async fn detach_alias(
        &self,
        context: &Context,
        entity_id: &str,
        mount_id: &str,
        name: &str,
    ) -> Result<()> {
        let _alias_lock = self.locks.entity_alias(mount_id, name).await;
        let _entity_lock = self.locks.entity(entity_id).await;

        let mut entity = self.fetch(context, entity_id).await?;
        let count = entity.aliases.len();
        entity
            .aliases
            .retain(|alias| alias.mount_id != mount_id || alias.name != name);
        if entity.aliases.len() == count {
            anyhow::bail!(EntityAliasNotFound::new(mount_id, name));
        }

        self.store.persist(context, entity).await?;
        slog::debug!(
            context.logger, "Detached alias from entity";
            "entity_id" => entity_id,
            "mount_id" => mount_id,
            "name" => name,
        );
        Ok(())
    }

    /// Fetch an entity by ID.
    pub async fn get_entity(&self, context: &Context, entity_id: &str) -> Result<Entity> {
        self.fetch(context, entity_id).await
    }

    /// Find the ID of the entity owning the given alias.
    pub async fn resolve_by_alias(
        &self,
        context: &Context,
        mount_id: &str,
        name: &str,
    ) -> Result<String> {
        let lookup = LookupEntityByAlias(AliasID::new(mount_id, name));
        match self.store.query(context, lookup).await? {
            Some(entity) => Ok(entity.id),
            None => anyhow::bail!(EntityAliasNotFound::new(mount_id, name)),
        }
    }

    /// Replace the policies directly assigned to an entity.
    pub async fn set_policies(
        &self,
        context: &Context,
        entity_id: &str,
        policies: Vec<String>,
    ) -> Result<()> {
        let _entity_lock = self.locks.entity(entity_id).await;
        let mut entity = self.fetch(context, entity_id).await?;
        entity.policies = warden_models::normalise_policies(policies);
        slog::debug!(
            context.logger, "Updating entity policies";
            "entity_id" => entity_id,
            "policies" => ?entity.policies,
        );
        self.store.persist(context, entity).await
    }

    async fn fetch(&self, context: &Context, entity_id: &str) -> Result<Entity> {
        match self.store.query(context, LookupEntity::from(entity_id)).await? {
            Some(entity) => Ok(entity),
            None => anyhow::bail!(EntityNotFound::new(entity_id)),
        }
    }
}
