use thiserror::Error;

use super::{LocalAdapter, StorageAdapter};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown adapter `{id}`")]
    UnknownAdapter { id: String },
}

/// In-memory set of available adapters plus the current selection. Created
/// once at application start and passed by reference to whoever needs it;
/// holds no business invariants and nothing survives the process.
pub struct AdapterRegistry {
    adapters: Vec<StorageAdapter>,
    current: usize,
}

impl AdapterRegistry {
    /// Registry seeded with the local-file adapter, which is also the
    /// initial selection.
    pub fn with_defaults() -> Self {
        Self {
            adapters: vec![StorageAdapter::Local(LocalAdapter)],
            current: 0,
        }
    }

    /// Add an adapter. Registering an id again replaces the previous entry
    /// and keeps the current selection pointing at the same id.
    pub fn register(&mut self, adapter: StorageAdapter) {
        if let Some(pos) = self.adapters.iter().position(|a| a.id() == adapter.id()) {
            self.adapters[pos] = adapter;
        } else {
            self.adapters.push(adapter);
        }
    }

    pub fn list(&self) -> &[StorageAdapter] {
        &self.adapters
    }

    pub fn select(&mut self, id: &str) -> Result<(), RegistryError> {
        match self.adapters.iter().position(|a| a.id() == id) {
            Some(pos) => {
                self.current = pos;
                Ok(())
            }
            None => Err(RegistryError::UnknownAdapter { id: id.to_string() }),
        }
    }

    pub fn current(&self) -> &StorageAdapter {
        &self.adapters[self.current]
    }

    pub fn current_mut(&mut self) -> &mut StorageAdapter {
        &mut self.adapters[self.current]
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{HostedAdapter, HostedConfig};

    fn hosted() -> StorageAdapter {
        StorageAdapter::Hosted(
            HostedAdapter::new(HostedConfig {
                base_url: "http://localhost:0".to_string(),
                token: None,
            })
            .unwrap(),
        )
    }

    #[test]
    fn defaults_select_local() {
        let registry = AdapterRegistry::with_defaults();
        assert_eq!(registry.current().id(), "local");
        assert!(!registry.current().capabilities().upload);
    }

    #[test]
    fn select_unknown_adapter_fails() {
        let mut registry = AdapterRegistry::with_defaults();
        let err = registry.select("dropbox").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownAdapter { id } if id == "dropbox"));
    }

    #[test]
    fn register_and_select_hosted() {
        let mut registry = AdapterRegistry::with_defaults();
        registry.register(hosted());
        registry.select("hosted").unwrap();
        assert_eq!(registry.current().id(), "hosted");
        assert!(registry.current().capabilities().download);
        assert_eq!(registry.list().len(), 2);
    }

    #[test]
    fn reregister_replaces_instead_of_duplicating() {
        let mut registry = AdapterRegistry::with_defaults();
        registry.register(hosted());
        registry.register(hosted());
        assert_eq!(registry.list().len(), 2);
    }
}
