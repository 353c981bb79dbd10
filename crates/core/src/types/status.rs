//! Status and method enums for orders and payments.

use serde::{Deserialize, Serialize};

/// How an order is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash collected by the rider at the door.
    CashOnDelivery,
    /// Provider-hosted online payment (UPI/card).
    Online,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CashOnDelivery => write!(f, "COD"),
            Self::Online => write!(f, "ONLINE"),
        }
    }
}

/// Settlement state of an order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Order created, no settlement decision yet.
    #[default]
    Pending,
    /// COD order accepted; cash will be collected on delivery.
    PendingCollection,
    /// Online payment confirmed by the provider callback.
    Paid,
    /// Online payment was cancelled or failed at the provider.
    NotCompleted,
}

impl PaymentStatus {
    /// Whether this status counts as settled for checkout purposes.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::PendingCollection | Self::Paid)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::PendingCollection => write!(f, "pending_collection"),
            Self::Paid => write!(f, "paid"),
            Self::NotCompleted => write!(f, "not_completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settled_statuses() {
        assert!(PaymentStatus::Paid.is_settled());
        assert!(PaymentStatus::PendingCollection.is_settled());
        assert!(!PaymentStatus::Pending.is_settled());
        assert!(!PaymentStatus::NotCompleted.is_settled());
    }

    #[test]
    fn test_method_serde_snake_case() {
        let json = serde_json::to_string(&PaymentMethod::CashOnDelivery).expect("serialize");
        assert_eq!(json, "\"cash_on_delivery\"");
    }
}
