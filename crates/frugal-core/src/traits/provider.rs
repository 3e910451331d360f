// SPDX-FileCopyrightText: 2026 Frugal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for LLM vendors.

use async_trait::async_trait;

use crate::error::FrugalError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderId, ProviderRequest, ProviderResponse};

/// Adapter for a single LLM vendor.
///
/// One adapter serves every catalog model of its [`ProviderId`]. Failures are
/// reported as [`FrugalError::Provider`] and drive the router's fallback chain.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// The vendor this adapter talks to.
    fn provider_id(&self) -> ProviderId;

    /// Sends a completion request and returns the full response.
    async fn invoke(&self, request: ProviderRequest) -> Result<ProviderResponse, FrugalError>;
}
