use std::collections::BTreeMap;

use tokio::sync::{RwLock, RwLockWriteGuard};

use neuro_sdk_core::error::{NeuroError, Result};
use neuro_sdk_core::protocol::ActionDefinition;

use super::handler::SharedHandler;

/// Action registry: `name -> handler`, scoped to one client.
///
/// Lookups during dispatch take the shared lock; registration, removal and
/// re-advertisement take the exclusive one and keep it until their message
/// is on the wire, so the peer never sees a batch that disagrees with the map.
#[derive(Default)]
pub struct ActionRegistry {
    entries: RwLock<BTreeMap<String, SharedHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn get(&self, name: &str) -> Option<SharedHandler> {
        self.entries.read().await.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.entries.read().await.contains_key(name)
    }

    /// Registered names, sorted.
    pub async fn names(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub(crate) async fn write(&self) -> RegistryWriteGuard<'_> {
        RegistryWriteGuard {
            entries: self.entries.write().await,
        }
    }
}

/// Exclusive access to the registry.
pub(crate) struct RegistryWriteGuard<'a> {
    entries: RwLockWriteGuard<'a, BTreeMap<String, SharedHandler>>,
}

impl RegistryWriteGuard<'_> {
    /// Insert a batch, replacing same-named handlers.
    ///
    /// Every name is checked before anything is inserted: a batch with an
    /// empty name leaves the registry untouched.
    pub(crate) fn insert_all(&mut self, handlers: &[SharedHandler]) -> Result<Vec<ActionDefinition>> {
        if let Some(idx) = handlers.iter().position(|h| h.name().is_empty()) {
            return Err(NeuroError::Validation(format!(
                "action name cannot be empty (batch index {idx})"
            )));
        }

        let mut definitions = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let definition = handler.definition();
            if let Some(schema) = &definition.schema {
                let unsupported = schema.unsupported_keywords();
                if !unsupported.is_empty() {
                    tracing::warn!(
                        action = %definition.name,
                        keywords = ?unsupported,
                        "schema uses keywords the peer ignores"
                    );
                }
            }
            self.entries.insert(definition.name.clone(), handler.clone());
            definitions.push(definition);
        }
        Ok(definitions)
    }

    /// Remove names; missing ones are ignored. Returns how many were present.
    pub(crate) fn remove_all(&mut self, names: &[String]) -> usize {
        names
            .iter()
            .filter(|name| self.entries.remove(name.as_str()).is_some())
            .count()
    }

    /// Definitions of everything currently registered.
    pub(crate) fn definitions(&self) -> Vec<ActionDefinition> {
        self.entries.values().map(SharedHandler::definition).collect()
    }
}
