//! Issue, lookup, renew and revoke tokens.
use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use futures::TryStreamExt;
use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;

use warden_conf::TokenConf;
use warden_context::Context;
use warden_errors::EntityNotFound;
use warden_errors::TokenExpired;
use warden_errors::TokenNotFound;
use warden_errors::TokenNotRenewable;
use warden_errors::TokenRevoked;
use warden_errors::TokenTtlOutOfRange;
use warden_identity::EntityDirectory;
use warden_identity::RecordLocks;
use warden_models::Token;
use warden_models::TokenState;
use warden_resolve::EffectivePolicies;
use warden_store::delete::DeleteToken;
use warden_store::query::ListTokens;
use warden_store::query::LookupEntity;
use warden_store::query::LookupToken;
use warden_store::Store;

use crate::telemetry::TOKENS_ISSUED;
use crate::telemetry::TOKENS_LOOKUP;
use crate::telemetry::TOKENS_RENEWED;
use crate::telemetry::TOKENS_REVOKED;
use crate::telemetry::TOKENS_TIDIED;
use crate::Clock;
use crate::SystemClock;

/// Request to issue a new token.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct IssueRequest {
    /// Entity the token is issued to, if any.
    #[serde(default)]
    pub entity_id: Option<String>,

    /// Raw external group names reported by the authentication method.
    #[serde(default)]
    pub external_group_names: Vec<String>,

    /// Authentication mount the external group names were reported under.
    #[serde(default)]
    pub mount_id: Option<String>,

    /// Policies assigned directly to the token.
    #[serde(default)]
    pub policies: Vec<String>,

    /// Whether the token can be renewed.
    pub renewable: bool,

    /// Lifetime of the token in seconds, defaults to the configured TTL.
    #[serde(default)]
    pub ttl_sec: Option<u64>,
}

/// Result of a successful token lookup.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TokenLookup {
    /// Policies granted to the token, split by source.
    pub policies: EffectivePolicies,

    /// The token record that was looked up.
    pub token: Token,
}

/// Manage tokens and the external group resolution cached on them.
#[derive(Clone)]
pub struct TokenPolicyCache {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) conf: TokenConf,
    pub(crate) entities: EntityDirectory,
    pub(crate) locks: RecordLocks,
    pub(crate) store: Store,
}

impl TokenPolicyCache {
    pub fn new(store: Store, locks: RecordLocks, conf: TokenConf) -> Self {
        let entities = EntityDirectory::new(store.clone(), locks.clone());
        TokenPolicyCache {
            clock: Arc::new(SystemClock),
            conf,
            entities,
            locks,
            store,
        }
    }

    /// Replace the source of time used to compute expiry.
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Issue a new token, resolving external groups against the current directory state.
    pub async fn issue(&self, context: &Context, request: IssueRequest) -> Result<Token> {
        if let Some(entity_id) = &request.entity_id {
            let lookup = LookupEntity::from(entity_id.as_str());
            if self.store.query(context, lookup).await?.is_none() {
                anyhow::bail!(EntityNotFound::new(entity_id));
            }
        }

        let external_group_ids = self
            .resolve_external(context, &request.mount_id, &request.external_group_names)
            .await?;
        let now = self.clock.now();
        let ttl_sec = request
            .ttl_sec
            .unwrap_or(self.conf.default_ttl_sec)
            .min(self.conf.max_ttl_sec);
        let expire_time = expire_after(now, ttl_sec)?;
        let token = Token {
            id: warden_models::new_id(),
            entity_id: request.entity_id,
            external_group_ids,
            external_group_names: request.external_group_names,
            expire_time,
            issue_time: now,
            last_renew_time: None,
            mount_id: request.mount_id,
            policies: warden_models::normalise_policies(request.policies),
            renew_count: 0,
            renewable: request.renewable,
            state: TokenState::Active,
            ttl_sec,
        };

        self.store.persist(context, token.clone()).await?;
        TOKENS_ISSUED.inc();
        slog::info!(
            context.logger, "Issued token";
            "token_id" => &token.id,
            "entity_id" => token.entity_id.as_deref(),
            "external_groups" => token.external_group_ids.len(),
        );
        Ok(token)
    }

    /// Lookup a token and the policies it currently grants.
    ///
    /// External groups are not resolved again: the set cached on the token is used.
    ///
    /// ## Errors
    ///
    /// - [`TokenNotFound`] if the token does not exist.
    /// - [`TokenRevoked`] if the token was revoked.
    /// - [`TokenExpired`] if the token has expired.
    pub async fn lookup(&self, context: &Context, token_id: &str) -> Result<TokenLookup> {
        TOKENS_LOOKUP.inc();
        let result = self.lookup_inner(context, token_id).await;
        if let Err(error) = &result {
            crate::telemetry::count_lookup_error(error);
        }
        result
    }

    /// Renew a token, refreshing its cached external groups and extending its expiry.
    ///
    /// The new expiry is `now + increment` (or the token TTL when no increment is given)
    /// capped to the configured maximum lifetime from the token's issue time.
    pub async fn renew(
        &self,
        context: &Context,
        token_id: &str,
        increment_sec: Option<u64>,
    ) -> Result<Token> {
        let context = token_context(context, token_id);
        let _token_lock = self.locks.token(token_id).await;
        let mut token = self.fetch_usable(&context, token_id).await?;
        if !token.renewable {
            anyhow::bail!(TokenNotRenewable::new(token_id));
        }

        let external_group_ids = self
            .resolve_external(&context, &token.mount_id, &token.external_group_names)
            .await?;
        let now = self.clock.now();
        let increment = increment_sec
            .unwrap_or(token.ttl_sec)
            .min(self.conf.max_ttl_sec);
        let expire_time = expire_after(now, increment)?;
        token.expire_time = match expire_after(token.issue_time, self.conf.max_ttl_sec) {
            Ok(max_expire) => std::cmp::min(expire_time, max_expire),
            Err(_) => expire_time,
        };
        token.external_group_ids = external_group_ids;
        token.last_renew_time = Some(now);
        token.renew_count += 1;
        token.state = TokenState::Renewed;

        self.store.persist(&context, token.clone()).await?;
        TOKENS_RENEWED.inc();
        slog::info!(
            context.logger, "Renewed token";
            "expire_time" => %token.expire_time,
            "external_groups" => token.external_group_ids.len(),
            "renew_count" => token.renew_count,
        );
        Ok(token)
    }

    /// Revoke a token so it can no longer be used.
    ///
    /// The token record is kept so later use is reported as revoked.
    pub async fn revoke(&self, context: &Context, token_id: &str) -> Result<()> {
        let context = token_context(context, token_id);
        let _token_lock = self.locks.token(token_id).await;
        let mut token = self.fetch(&context, token_id).await?;
        if token.state == TokenState::Revoked {
            return Ok(());
        }

        token.state = TokenState::Revoked;
        self.store.persist(&context, token).await?;
        TOKENS_REVOKED.inc();
        slog::info!(context.logger, "Revoked token");
        Ok(())
    }

    /// Remove revoked and expired tokens from the store, returning how many were removed.
    ///
    /// Once removed, tokens are reported as not found instead of revoked or expired.
    pub async fn tidy(&self, context: &Context) -> Result<usize> {
        let candidates: Vec<String> = self
            .store
            .query(context, ListTokens)
            .await?
            .try_filter(|token| futures::future::ready(self.is_tidy(token)))
            .map_ok(|token| token.id)
            .try_collect()
            .await?;

        let mut removed = 0;
        for token_id in candidates {
            let context = token_context(context, &token_id);
            let _token_lock = self.locks.token(&token_id).await;
            let lookup = LookupToken::from(token_id.as_str());
            let token = match self.store.query(&context, lookup).await? {
                Some(token) if self.is_tidy(&token) => token,
                _ => continue,
            };
            self.store.delete(&context, DeleteToken::from(&token)).await?;
            TOKENS_TIDIED.inc();
            removed += 1;
            slog::debug!(context.logger, "Removed unusable token"; "state" => ?token.state);
        }
        slog::info!(context.logger, "Tidied tokens"; "removed" => removed);
        Ok(removed)
    }

    /// Check if a token can no longer be used and may be removed.
    fn is_tidy(&self, token: &Token) -> bool {
        token.state == TokenState::Revoked || token.is_expired(self.clock.now())
    }

    async fn fetch(&self, context: &Context, token_id: &str) -> Result<Token> {
        match self.store.query(context, LookupToken::from(token_id)).await? {
            Some(token) => Ok(token),
            None => anyhow::bail!(TokenNotFound::new(token_id)),
        }
    }

    /// Fetch a token and ensure it is neither revoked nor expired.
    async fn fetch_usable(&self, context: &Context, token_id: &str) -> Result<Token> {
        let token = self.fetch(context, token_id).await?;
        if token.state == TokenState::Revoked {
            anyhow::bail!(TokenRevoked::new(token_id));
        }
        if token.is_expired(self.clock.now()) {
            anyhow::bail!(TokenExpired::new(token_id));
        }
        Ok(token)
    }

    async fn lookup_inner(&self, context: &Context, token_id: &str) -> Result<TokenLookup> {
        let context = token_context(context, token_id);
        let token = self.fetch_usable(&context, token_id).await?;
        let policies = warden_resolve::effective_policies(&context, &self.store, &token).await?;
        slog::trace!(
            context.logger, "Resolved token policies";
            "policies" => ?policies.policies(),
        );
        Ok(TokenLookup { policies, token })
    }

    async fn resolve_external(
        &self,
        context: &Context,
        mount_id: &Option<String>,
        names: &[String],
    ) -> Result<BTreeSet<String>> {
        match mount_id {
            None => Ok(BTreeSet::new()),
            Some(mount_id) => {
                warden_resolve::match_external_groups(context, &self.store, mount_id, names)
                    .await
            }
        }
    }
}

/// Compute the time a lifetime of `ttl_sec` seconds starting at `start` ends.
///
/// ## Errors
///
/// - [`TokenTtlOutOfRange`] if the end time can not be represented.
fn expire_after(start: OffsetDateTime, ttl_sec: u64) -> Result<OffsetDateTime> {
    i64::try_from(ttl_sec)
        .ok()
        .and_then(|ttl_sec| start.checked_add(Duration::seconds(ttl_sec)))
        .ok_or_else(|| anyhow::anyhow!(TokenTtlOutOfRange::new(ttl_sec)))
}

/// Derive a [`Context`] to log about a specific token.
fn token_context(context: &Context, token_id: &str) -> Context {
    context
        .derive()
        .log_trace()
        .log_values(slog::o!("token_id" => token_id.to_string()))
        .build()
}
