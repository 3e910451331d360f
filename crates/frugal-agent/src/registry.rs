// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider registry keyed by [`ProviderId`].

use std::collections::HashMap;
use std::sync::Arc;

use frugal_core::{ProviderAdapter, ProviderId};
use tracing::{info, warn};

/// Live provider adapters the router may dispatch to.
///
/// Providers from the catalog that are not registered are skipped by the
/// fallback chain.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter` under its own provider id, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        let id = adapter.provider_id();
        if self.providers.insert(id, adapter).is_some() {
            warn!(provider = %id, "provider registered twice, keeping the latest adapter");
        } else {
            info!(provider = %id, "provider registered");
        }
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn ProviderAdapter>> {
        self.providers.get(&id).cloned()
    }

    pub fn contains(&self, id: ProviderId) -> bool {
        self.providers.contains_key(&id)
    }

    /// Registered provider ids, sorted.
    pub fn ids(&self) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = self.providers.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frugal_test_utils::MockProvider;

    #[test]
    fn register_and_lookup_by_id() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProvider::new(ProviderId::Groq)));
        registry.register(Arc::new(MockProvider::new(ProviderId::OpenAi)));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(ProviderId::Groq));
        assert!(registry.get(ProviderId::Anthropic).is_none());
        assert_eq!(registry.ids(), vec![ProviderId::Groq, ProviderId::OpenAi]);
    }

    #[test]
    fn re_registering_replaces() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProvider::new(ProviderId::Groq)));
        registry.register(Arc::new(MockProvider::new(ProviderId::Groq)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.ids().is_empty());
    }
}
