//! Registry of persistent store backends supported by the process.
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use warden_store::StoreFactory;

/// Persistent Store backend not recognised.
#[derive(Debug, thiserror::Error)]
#[error("persistent store backend '{0}' not recognised")]
pub struct BackendNotFound(String);

/// Registers of backend factories for implementations supported by the process.
#[derive(Clone, Default)]
pub struct Backends {
    /// Supported Persistent Store backends.
    stores: HashMap<String, Arc<dyn StoreFactory>>,
}

impl Backends {
    /// Register all backends included in the build.
    pub fn with_defaults() -> Self {
        let mut backends = Backends::default();
        backends.register_store("sqlite", warden_store_sqlite::SQLiteFactory);
        backends
    }

    /// Register a new factory for a Persistent Store implementation.
    ///
    /// # Panics
    ///
    /// This method panics if the identifier of the new Persistent Store backend is already in use.
    pub fn register_store<B, S>(&mut self, id: S, backend: B) -> &mut Self
    where
        B: StoreFactory + 'static,
        S: Into<String>,
    {
        match self.stores.entry(id.into()) {
            Entry::Occupied(entry) => {
                panic!(
                    "a StoreBackend with id '{}' is already registered",
                    entry.key()
                )
            }
            Entry::Vacant(entry) => entry.insert(Arc::new(backend)),
        };
        self
    }

    /// Lookup a [`StoreFactory`] by ID.
    pub fn store(&self, id: &str) -> Result<&dyn StoreFactory> {
        let factory = self
            .stores
            .get(id)
            .ok_or_else(|| BackendNotFound(id.to_string()))?;
        Ok(factory.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::BackendNotFound;
    use super::Backends;

    #[test]
    fn sqlite_is_registered() {
        let backends = Backends::with_defaults();
        backends.store("sqlite").unwrap();
    }

    #[test]
    fn unknown_backend() {
        let backends = Backends::with_defaults();
        let error = backends.store("postgres").err().unwrap();
        assert!(error.is::<BackendNotFound>());
    }

    #[test]
    #[should_panic(expected = "a StoreBackend with id 'sqlite' is already registered")]
    fn duplicate_backend() {
        let mut backends = Backends::with_defaults();
        backends.register_store("sqlite", warden_store_sqlite::SQLiteFactory);
    }
}
