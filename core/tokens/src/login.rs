//! Issue tokens for principals authenticated by an authentication method.
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use warden_context::Context;
use warden_errors::EntityAliasConflict;
use warden_errors::EntityAliasNotFound;
use warden_models::Token;

use crate::IssueRequest;
use crate::TokenPolicyCache;

/// Outcome of a successful authentication reported by an authentication method.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Raw names of the external groups the principal belongs to.
    #[serde(default)]
    pub external_group_names: Vec<String>,

    /// Authentication mount the principal authenticated with.
    pub mount_id: String,

    /// Policies the authentication method grants to the token.
    #[serde(default)]
    pub policies: Vec<String>,

    /// Name of the principal as known to the authentication method.
    pub principal_name: String,
}

impl TokenPolicyCache {
    /// Issue a renewable token for an authenticated principal.
    ///
    /// The entity owning the principal's alias is used or, on first login,
    /// a new entity is created and the alias attached to it.
    pub async fn login(&self, context: &Context, auth: AuthResponse) -> Result<Token> {
        let context = context
            .derive()
            .log_trace()
            .log_values(slog::o!(
                "mount_id" => auth.mount_id.clone(),
                "principal_name" => auth.principal_name.clone(),
            ))
            .build();
        let entity_id = self.login_entity(&context, &auth).await?;
        let request = IssueRequest {
            entity_id: Some(entity_id),
            external_group_names: auth.external_group_names,
            mount_id: Some(auth.mount_id),
            policies: auth.policies,
            renewable: true,
            ttl_sec: None,
        };
        self.issue(&context, request).await
    }

    async fn login_entity(&self, context: &Context, auth: &AuthResponse) -> Result<String> {
        let mount_id = &auth.mount_id;
        let name = &auth.principal_name;
        match self.entities.resolve_by_alias(context, mount_id, name).await {
            Ok(entity_id) => return Ok(entity_id),
            Err(error) if error.is::<EntityAliasNotFound>() => (),
            Err(error) => return Err(error),
        };

        let entity_id = self.entities.create_entity(context, Vec::new()).await?;
        match self
            .entities
            .attach_alias(context, &entity_id, mount_id, name)
            .await
        {
            Ok(()) => {
                slog::info!(
                    context.logger, "Created entity on first login";
                    "entity_id" => &entity_id,
                );
                Ok(entity_id)
            }
            // A concurrent login claimed the alias first.
            Err(error) if error.is::<EntityAliasConflict>() => {
                self.entities.delete_entity(context, &entity_id).await?;
                self.entities.resolve_by_alias(context, mount_id, name).await
            }
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use warden_conf::TokenConf;
    use warden_context::Context;
    use warden_identity::RecordLocks;
    use warden_store::Store;

    use super::AuthResponse;
    use crate::TokenPolicyCache;

    fn auth() -> AuthResponse {
        AuthResponse {
            external_group_names: vec!["g1".into()],
            mount_id: "m1".into(),
            policies: vec!["default".into()],
            principal_name: "alice".into(),
        }
    }

    #[tokio::test]
    async fn first_login_creates_entity() {
        let context = Context::fixture();
        let cache = TokenPolicyCache::new(Store::fixture(), RecordLocks::default(), TokenConf::default());
        let token = cache.login(&context, auth()).await.unwrap();

        let entity_id = token.entity_id.clone().expect("token must have an entity");
        let entity = cache.entities.get_entity(&context, &entity_id).await.unwrap();
        assert_eq!(entity.aliases.len(), 1);
        assert_eq!(entity.aliases[0].mount_id, "m1");
        assert_eq!(entity.aliases[0].name, "alice");
        assert_eq!(token.mount_id.as_deref(), Some("m1"));
        assert_eq!(token.external_group_names, ["g1"]);
        assert_eq!(token.policies, ["default"]);
        assert!(token.renewable);
    }

    #[tokio::test]
    async fn later_logins_reuse_entity() {
        let context = Context::fixture();
        let cache = TokenPolicyCache::new(Store::fixture(), RecordLocks::default(), TokenConf::default());
        let first = cache.login(&context, auth()).await.unwrap();
        let second = cache.login(&context, auth()).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(first.entity_id, second.entity_id);

        let other = AuthResponse {
            mount_id: "m2".into(),
            ..auth()
        };
        let third = cache.login(&context, other).await.unwrap();
        assert_ne!(first.entity_id, third.entity_id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_logins_share_entity() {
        let context = Context::fixture();
        let cache = TokenPolicyCache::new(Store::fixture(), RecordLocks::default(), TokenConf::default());

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let cache = cache.clone();
            let context = context.clone();
            tasks.push(tokio::spawn(async move {
                cache.login(&context, auth()).await.unwrap()
            }));
        }
        let mut entities = BTreeSet::new();
        for task in tasks {
            let token = task.await.unwrap();
            entities.insert(token.entity_id.expect("token must have an entity"));
        }
        assert_eq!(entities.len(), 1);

        let owner = cache
            .entities
            .resolve_by_alias(&context, "m1", "alice")
            .await
            .unwrap();
        assert!(entities.contains(&owner));
    }
}
