//! Business policy configuration.
//!
//! Tax, service charge, and loyalty rates are deployment policy, not user
//! input; they are configured here and nowhere else.

use serde::Deserialize;

use crate::interfaces::loyalty::Tier;

/// Order pricing policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Tax as a fraction of the subtotal.
    pub tax_rate: f64,
    /// Service charge as a fraction of the subtotal.
    pub service_charge_rate: f64,
    /// Currency value of one redeemed loyalty point.
    pub redemption_rate: f64,
    /// Points earned per unit of order total.
    pub points_rate: f64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: 0.10,
            service_charge_rate: 0.05,
            redemption_rate: 100.0,
            points_rate: 0.01,
        }
    }
}

/// Loyalty tier thresholds, applied to total (lifetime) points.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoyaltyPolicy {
    pub silver_threshold: f64,
    pub gold_threshold: f64,
    pub platinum_threshold: f64,
}

impl Default for LoyaltyPolicy {
    fn default() -> Self {
        Self {
            silver_threshold: 250.0,
            gold_threshold: 500.0,
            platinum_threshold: 1_000.0,
        }
    }
}

impl LoyaltyPolicy {
    /// Tier for a lifetime point total.
    pub fn tier_for(&self, total_points: f64) -> Tier {
        if total_points >= self.platinum_threshold {
            Tier::Platinum
        } else if total_points >= self.gold_threshold {
            Tier::Gold
        } else if total_points >= self.silver_threshold {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_defaults() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.tax_rate, 0.10);
        assert_eq!(policy.service_charge_rate, 0.05);
        assert_eq!(policy.redemption_rate, 100.0);
        assert_eq!(policy.points_rate, 0.01);
    }

    #[test]
    fn test_tier_thresholds() {
        let policy = LoyaltyPolicy::default();
        assert_eq!(policy.tier_for(0.0), Tier::Bronze);
        assert_eq!(policy.tier_for(249.9), Tier::Bronze);
        assert_eq!(policy.tier_for(250.0), Tier::Silver);
        assert_eq!(policy.tier_for(500.0), Tier::Gold);
        assert_eq!(policy.tier_for(999.9), Tier::Gold);
        assert_eq!(policy.tier_for(1_000.0), Tier::Platinum);
    }
}
