//! Interest Rate Model - price-sensitive borrow rate
//!
//! Computes a currency's annual borrow rate from its configured parameters
//! and the drift of its USD price since the last accrual:
//! - Base rate: rate charged while the currency trades at its baseline
//! - Sensitivity: rate increase per unit of appreciation against USD
//! - Min/max rate: clamp bounds on the model's output
//!
//! A currency appreciating against USD (fewer currency units per dollar)
//! pushes the rate above base, discouraging adverse-selection borrowing
//! during currency stress. The model is a pure function of its inputs.

use crate::errors::LendingError;
use crate::math::{FixedPoint, SafeMath};
use odra::casper_types::U256;
use odra::prelude::*;

/// Interest rate model parameters (annual rates, scaled by 1e18)
#[odra::odra_type]
pub struct RateParams {
    /// Base annual rate at the price baseline
    /// Example: 2% = 0.02 * 1e18 = 20000000000000000
    pub base_rate: U256,

    /// Lower clamp bound on the computed rate
    pub min_rate: U256,

    /// Upper clamp bound on the computed rate
    pub max_rate: U256,

    /// Rate increase per unit of price appreciation (WAD)
    /// Example: 10% per 1.0 of appreciation = 0.10 * 1e18
    pub sensitivity: U256,
}

impl RateParams {
    /// Validate the clamp window
    pub fn validate(&self) -> Result<(), LendingError> {
        if self.min_rate > self.max_rate {
            return Err(LendingError::InvalidConfiguration);
        }
        Ok(())
    }
}

/// Compute the annual borrow rate for a price ratio
///
/// Formula: `clamp(base_rate + sensitivity * (price_ratio - 1), min, max)`
///
/// # Arguments
/// * `params` - Rate parameters of the currency
/// * `price_ratio` - USD price of the currency relative to its baseline
///   (WAD; 1e18 = trading exactly at the baseline)
///
/// # Returns
/// Annual borrow rate (WAD)
pub fn borrow_rate(params: &RateParams, price_ratio: U256) -> U256 {
    let scale = FixedPoint::wad();

    let raw = if price_ratio >= scale {
        // Appreciation: base_rate + sensitivity * (ratio - 1)
        let premium = params
            .sensitivity
            .checked_mul(price_ratio - scale)
            .map(|p| p / scale)
            .unwrap_or(params.max_rate);
        params.base_rate.saturating_add(premium)
    } else {
        // Depreciation: base_rate - sensitivity * (1 - ratio), floored at zero
        let discount = params
            .sensitivity
            .checked_mul(scale - price_ratio)
            .map(|d| d / scale)
            .unwrap_or(params.base_rate);
        params.base_rate.saturating_sub(discount)
    };

    SafeMath::max(params.min_rate, SafeMath::min(raw, params.max_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::WAD;

    fn params() -> RateParams {
        RateParams {
            base_rate: U256::from(WAD / 50),     // 2%
            min_rate: U256::from(WAD / 100),     // 1%
            max_rate: U256::from(3 * WAD / 10),  // 30%
            sensitivity: U256::from(WAD / 10),   // 10%
        }
    }

    #[test]
    fn test_rate_at_baseline() {
        // ratio of exactly 1.0 yields the base rate
        let rate = borrow_rate(&params(), U256::from(WAD));
        assert_eq!(rate, U256::from(WAD / 50));
    }

    #[test]
    fn test_rate_rises_on_appreciation() {
        // ratio 1.5: 2% + 10% * 0.5 = 7%
        let rate = borrow_rate(&params(), U256::from(WAD + WAD / 2));
        assert_eq!(rate, U256::from(7 * WAD / 100));
    }

    #[test]
    fn test_rate_falls_on_depreciation() {
        // ratio 0.95: 2% - 10% * 0.05 = 1.5%
        let rate = borrow_rate(&params(), U256::from(WAD - WAD / 20));
        assert_eq!(rate, U256::from(15 * WAD / 1000));
    }

    #[test]
    fn test_rate_clamped_to_max() {
        // ratio 10.0 would push the raw rate to 92%; clamped at 30%
        let rate = borrow_rate(&params(), U256::from(10 * WAD));
        assert_eq!(rate, U256::from(3 * WAD / 10));
    }

    #[test]
    fn test_rate_clamped_to_min() {
        // ratio 0.5 would push the raw rate to zero; clamped at 1%
        let rate = borrow_rate(&params(), U256::from(WAD / 2));
        assert_eq!(rate, U256::from(WAD / 100));
    }

    #[test]
    fn test_same_inputs_same_output() {
        let p = params();
        let ratio = U256::from(WAD + WAD / 4);
        assert_eq!(borrow_rate(&p, ratio), borrow_rate(&p, ratio));
    }

    #[test]
    fn test_validate_rejects_crossed_window() {
        let p = RateParams {
            base_rate: U256::from(WAD / 50),
            min_rate: U256::from(WAD / 10),
            max_rate: U256::from(WAD / 100),
            sensitivity: U256::zero(),
        };
        assert_eq!(p.validate(), Err(LendingError::InvalidConfiguration));
    }
}
