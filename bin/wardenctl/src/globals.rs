//! Container for data made accessible to all `wardenctl` commands.
use anyhow::Result;

use warden_conf::Conf;
use warden_context::Context;
use warden_identity::EntityDirectory;
use warden_identity::GroupDirectory;
use warden_identity::RecordLocks;
use warden_store::Store;
use warden_store::StoreFactoryArgs;
use warden_tokens::TokenPolicyCache;

use crate::backends::Backends;
use crate::Cli;

/// Container for data made accessible to all `wardenctl` commands.
pub struct Globals {
    /// Backends supported by the process.
    pub backends: Backends,

    /// Parsed CLI arguments.
    pub cli: Cli,

    /// Loaded process configuration.
    pub conf: Conf,

    /// Root context for operations performed by commands.
    pub context: Context,

    /// Locks shared by all directories used by the process.
    locks: RecordLocks,

    /// Registry collecting metrics from the store backend and token lifecycle.
    pub metrics: prometheus::Registry,
}

impl Globals {
    /// Initialise `wardenctl` process [`Globals`].
    pub async fn initialise(cli: Cli) -> Result<Self> {
        let logger = crate::logging::configure(&cli.log)?;
        let context = Context::root(logger).build();
        let conf = warden_conf::load(&cli.config)?;
        let backends = Backends::with_defaults();
        let metrics = prometheus::Registry::new();
        let store = backends.store(&conf.store.backend)?;
        store.conf_check(&context, &conf.store.options)?;
        store.register_metrics(&metrics)?;
        warden_tokens::register_metrics(&metrics)?;
        Ok(Globals {
            backends,
            cli,
            conf,
            context,
            locks: RecordLocks::default(),
            metrics,
        })
    }

    /// Access the entity directory.
    pub async fn entities(&self) -> Result<EntityDirectory> {
        let store = self.store().await?;
        Ok(EntityDirectory::new(store, self.locks.clone()))
    }

    /// Access the group directory.
    pub async fn groups(&self) -> Result<GroupDirectory> {
        let store = self.store().await?;
        Ok(GroupDirectory::new(store, self.locks.clone()))
    }

    /// Access the token lifecycle manager.
    pub async fn tokens(&self) -> Result<TokenPolicyCache> {
        let store = self.store().await?;
        let conf = self.conf.tokens.clone();
        Ok(TokenPolicyCache::new(store, self.locks.clone(), conf))
    }

    /// Initialise a client to the configured persistent store.
    async fn store(&self) -> Result<Store> {
        let args = StoreFactoryArgs {
            conf: &self.conf.store.options,
            context: &self.context,
        };
        self.backends.store(&self.conf.store.backend)?.store(args).await
    }
}
