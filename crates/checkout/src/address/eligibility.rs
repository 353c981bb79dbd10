//! Delivery-area eligibility policy.
//!
//! The shipped policy is a case-insensitive token match against the formatted
//! address text. It sits behind [`ServiceAreaPolicy`] so a polygon-based
//! replacement can drop in without touching the address book or the
//! orchestrator.

use crate::config::ServiceAreaConfig;
use crate::models::Address;

/// Verdict of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Ineligible,
}

impl Eligibility {
    /// Whether the verdict permits delivery.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Decides whether an address falls inside the serviceable area.
///
/// Implementations must be pure: the same address always yields the same
/// verdict for a given configuration.
pub trait ServiceAreaPolicy: Send + Sync {
    /// Check an address against the service area.
    fn check(&self, address: &Address) -> Eligibility;
}

/// Substring-match policy over the formatted address text.
#[derive(Debug, Clone)]
pub struct TokenPolicy {
    token: String,
    secondary_token: Option<String>,
}

impl TokenPolicy {
    /// Create a policy from configuration.
    #[must_use]
    pub fn new(config: &ServiceAreaConfig) -> Self {
        Self {
            token: config.token.to_lowercase(),
            secondary_token: config
                .secondary_token
                .as_ref()
                .map(|token| token.to_lowercase()),
        }
    }

    /// Create a policy from a bare token (tests, demos).
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        Self {
            token: token.to_lowercase(),
            secondary_token: None,
        }
    }

    /// Estimated delivery time for an address, in minutes.
    ///
    /// Tiered by zone token: the primary zone gets the headline short ETA,
    /// the adjacent zone a middle tier, anything else the default.
    #[must_use]
    pub fn delivery_eta_minutes(&self, address: &Address) -> u32 {
        let text = address.formatted_text.to_lowercase();
        if text.contains(&self.token) {
            14
        } else if self
            .secondary_token
            .as_ref()
            .is_some_and(|token| text.contains(token))
        {
            20
        } else {
            30
        }
    }
}

impl ServiceAreaPolicy for TokenPolicy {
    fn check(&self, address: &Address) -> Eligibility {
        if address
            .formatted_text
            .to_lowercase()
            .contains(&self.token)
        {
            Eligibility::Eligible
        } else {
            Eligibility::Ineligible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_match_is_case_insensitive() {
        let policy = TokenPolicy::from_token("bhiwandi");
        let address = Address::manual_entry("12 Market Rd, BHIWANDI");
        assert!(policy.check(&address).is_eligible());
    }

    #[test]
    fn test_wrong_area_is_ineligible() {
        let policy = TokenPolicy::from_token("thane");
        let address = Address::manual_entry("12 Market Rd, Bhiwandi");
        assert_eq!(policy.check(&address), Eligibility::Ineligible);
    }

    #[test]
    fn test_check_is_pure() {
        let policy = TokenPolicy::from_token("bhiwandi");
        let address = Address::manual_entry("12 Market Rd, Bhiwandi");
        let first = policy.check(&address);
        for _ in 0..10 {
            assert_eq!(policy.check(&address), first);
        }
    }

    #[test]
    fn test_eta_tiers() {
        let policy = TokenPolicy::new(&ServiceAreaConfig {
            token: "bhiwandi".into(),
            secondary_token: Some("thane".into()),
        });

        assert_eq!(
            policy.delivery_eta_minutes(&Address::manual_entry("Anjur Phata, Bhiwandi")),
            14
        );
        assert_eq!(
            policy.delivery_eta_minutes(&Address::manual_entry("Station Rd, Thane West")),
            20
        );
        assert_eq!(
            policy.delivery_eta_minutes(&Address::manual_entry("Andheri East, Mumbai")),
            30
        );
    }
}
