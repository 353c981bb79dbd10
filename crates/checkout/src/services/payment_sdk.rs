//! Payment provider SDK contract.
//!
//! The provider's hosted checkout UI runs out-of-process; its legacy
//! callback-style completion is reframed here as a single awaitable call that
//! resolves with a payment reference or rejects with a classified outcome.

use async_trait::async_trait;
use mockall::automock;
use swiftcart_core::PaymentReference;
use thiserror::Error;

use super::order_api::PaymentSession;

/// Failures from the hosted payment flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentSdkError {
    /// The user dismissed the hosted checkout without paying.
    #[error("payment cancelled by user")]
    Cancelled,

    /// The provider reported a charge failure.
    #[error("payment provider error: {0}")]
    Provider(String),
}

/// Provider-hosted payment surface.
#[automock]
#[async_trait]
pub trait PaymentSdk: Send + Sync {
    /// Open the hosted checkout for a payment session and wait for the
    /// provider's completion callback.
    async fn open(&self, session: &PaymentSession) -> Result<PaymentReference, PaymentSdkError>;
}
