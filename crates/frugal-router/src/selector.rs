// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model selection by category and subscription tier.
//!
//! Picks the cheapest catalog model the user's tier may reach that offers
//! the category's required capability. Non-strict categories accept a
//! chat-capable model, ranked after exact matches. Never fails: an empty
//! candidate set yields [`safe_default`].

use frugal_core::{Capability, Category, CostTier, ProviderId, UserTier};
use tracing::{debug, warn};

use crate::catalog::{ModelDescriptor, catalog, safe_default};

/// Chooses models from a catalog.
#[derive(Debug, Clone, Copy)]
pub struct ModelSelector {
    models: &'static [ModelDescriptor],
}

impl ModelSelector {
    /// Selector over the built-in catalog.
    pub fn new() -> Self {
        Self { models: catalog() }
    }

    /// Selector over a custom model list.
    pub fn with_models(models: &'static [ModelDescriptor]) -> Self {
        Self { models }
    }

    /// Cheapest suitable model for `category` that `user_tier` may use.
    pub fn select(&self, category: Category, user_tier: UserTier) -> &'static ModelDescriptor {
        let mut candidates = ranked(
            self.models
                .iter()
                .filter(|m| user_tier.allows(m.tier)),
            category,
        );
        candidates.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.unit_price().total_cmp(&b.1.unit_price())));

        match candidates.first() {
            Some((_, model)) => {
                debug!(%category, %user_tier, model = model.name, tier = %model.tier, "model selected");
                *model
            }
            None => {
                let fallback = safe_default();
                warn!(%category, %user_tier, model = fallback.name, "no candidate model, using safe default");
                fallback
            }
        }
    }

    /// Replacement model on `provider` after `failed` could not answer.
    ///
    /// Prefers the failed model's cost tier, then the cheapest model the
    /// user may reach. `None` when the provider has nothing suitable.
    pub fn fallback_on(
        &self,
        provider: ProviderId,
        failed: &ModelDescriptor,
        category: Category,
        user_tier: UserTier,
    ) -> Option<&'static ModelDescriptor> {
        let preferred: CostTier = failed.tier;
        let mut candidates = ranked(
            self.models
                .iter()
                .filter(|m| m.provider == provider && user_tier.allows(m.tier)),
            category,
        );
        candidates.sort_by(|a, b| {
            (a.1.tier != preferred)
                .cmp(&(b.1.tier != preferred))
                .then(a.0.cmp(&b.0))
                .then(a.1.unit_price().total_cmp(&b.1.unit_price()))
        });
        candidates.first().map(|(_, model)| *model)
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep models fit for `category`, tagged 0 for exact capability and 1 for
/// the chat fallback of non-strict categories.
fn ranked<'a>(
    models: impl Iterator<Item = &'a ModelDescriptor>,
    category: Category,
) -> Vec<(u8, &'a ModelDescriptor)> {
    let required = category.required_capability();
    models
        .filter_map(|m| {
            if m.has_capability(required) {
                Some((0, m))
            } else if !category.is_strict() && m.has_capability(Capability::Chat) {
                Some((1, m))
            } else {
                None
            }
        })
        .collect()
}
