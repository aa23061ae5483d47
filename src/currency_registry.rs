//! Currency Registry - per-currency risk configuration and borrow index
//!
//! Owns one `CurrencyConfig` record per supported fiat currency:
//! - Risk parameters (collateralization ratio, liquidation threshold)
//! - Interest rate model parameters
//! - The compounding borrow index and its lazy accrual state
//!
//! The borrow index converts a position's fixed scaled debt into the real,
//! interest-inclusive amount owed (`real = scaled * index / RAY`). Accrual
//! is lazy: `accrue` must run before any operation reads or writes a debt
//! position for that currency, so scaled debt stays convertible to real
//! debt at any call.

use crate::errors::LendingError;
use crate::events::{CurrencyAdded, IndexAccrued, OracleUpdated, RiskParamsUpdated};
use crate::interest_rate::{self, RateParams};
use crate::math::{FixedPoint, SafeMath, MILLIS_PER_YEAR};
use crate::price_feed::PriceSourceContractRef;
use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

/// Risk and rate configuration for a supported currency
#[odra::odra_type]
pub struct CurrencyConfig {
    /// Currency code
    pub currency: String,
    /// Price feed supplying the currency's USD price
    pub price_feed: Address,
    /// Minimum ratio of collateral value to borrowed value (WAD, >= 1.0)
    pub collateral_ratio: U256,
    /// Ratio below which a position becomes liquidatable
    /// (WAD, 1.0 <= threshold <= collateral_ratio)
    pub liquidation_threshold: U256,
    /// Interest rate model parameters
    pub rate_params: RateParams,
    /// Compounding borrow index (RAY, identity = 1e27)
    pub borrow_index: U256,
    /// Timestamp of the last accrual (milliseconds)
    pub last_accrual: u64,
    /// Price sampled at the last accrual; baseline for the next rate
    /// sample. Zero until the first accrual.
    pub price_snapshot: U256,
}

/// Currency Registry contract
#[odra::module]
pub struct CurrencyRegistry {
    /// Currency configurations by code
    configs: Mapping<String, CurrencyConfig>,

    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl CurrencyRegistry {
    /// Initialize the registry with its administrative account
    pub fn init(&mut self, admin: Address) {
        self.admin.set(admin);
    }

    // ========================================
    // Currency Configuration (Admin)
    // ========================================

    /// Add a currency, or overwrite its configuration entirely if the code
    /// is already registered (last write wins; the borrow index restarts
    /// at identity)
    ///
    /// # Arguments
    /// * `currency` - Currency code
    /// * `price_feed` - Price feed address for the currency
    /// * `collateral_ratio` - Required collateralization (WAD, >= 1.0)
    /// * `liquidation_threshold` - Liquidation bound (WAD, 1.0..=ratio)
    /// * `base_rate` / `min_rate` / `max_rate` / `sensitivity` - Rate
    ///   model parameters (WAD annual rates)
    pub fn add_currency(
        &mut self,
        currency: String,
        price_feed: Address,
        collateral_ratio: U256,
        liquidation_threshold: U256,
        base_rate: U256,
        min_rate: U256,
        max_rate: U256,
        sensitivity: U256,
    ) {
        self.only_admin();
        self.validate_ratios(collateral_ratio, liquidation_threshold);

        let rate_params = RateParams {
            base_rate,
            min_rate,
            max_rate,
            sensitivity,
        };
        if let Err(e) = rate_params.validate() {
            self.env().revert(e);
        }

        let config = CurrencyConfig {
            currency: currency.clone(),
            price_feed,
            collateral_ratio,
            liquidation_threshold,
            rate_params,
            borrow_index: FixedPoint::ray(),
            last_accrual: self.env().get_block_time(),
            price_snapshot: U256::zero(),
        };
        self.configs.set(&currency, config);

        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        self.env().emit_event(CurrencyAdded {
            currency,
            price_feed,
            collateral_ratio,
            liquidation_threshold,
            added_by: admin,
        });
    }

    /// Update a currency's risk and rate parameters in place; the borrow
    /// index and accrual state are untouched
    pub fn update_risk_params(
        &mut self,
        currency: String,
        collateral_ratio: U256,
        liquidation_threshold: U256,
        base_rate: U256,
        min_rate: U256,
        max_rate: U256,
        sensitivity: U256,
    ) {
        self.only_admin();
        self.validate_ratios(collateral_ratio, liquidation_threshold);

        let rate_params = RateParams {
            base_rate,
            min_rate,
            max_rate,
            sensitivity,
        };
        if let Err(e) = rate_params.validate() {
            self.env().revert(e);
        }

        let mut config = self
            .configs
            .get(&currency)
            .unwrap_or_revert_with(&self.env(), LendingError::NotSupported);

        config.collateral_ratio = collateral_ratio;
        config.liquidation_threshold = liquidation_threshold;
        config.rate_params = rate_params;
        self.configs.set(&currency, config);

        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        self.env().emit_event(RiskParamsUpdated {
            currency,
            collateral_ratio,
            liquidation_threshold,
            updated_by: admin,
        });
    }

    /// Replace a currency's price feed; index and snapshot state are kept
    pub fn update_oracle(&mut self, currency: String, price_feed: Address) {
        self.only_admin();

        let mut config = self
            .configs
            .get(&currency)
            .unwrap_or_revert_with(&self.env(), LendingError::NotSupported);

        config.price_feed = price_feed;
        self.configs.set(&currency, config);

        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        self.env().emit_event(OracleUpdated {
            currency,
            price_feed,
            updated_by: admin,
        });
    }

    // ========================================
    // Borrow Index Accrual
    // ========================================

    /// Advance the currency's borrow index to the current block time
    ///
    /// No-op when called twice within one block. Otherwise samples the
    /// price feed, derives the annual rate from the price drift since the
    /// previous accrual, and compounds the index linearly over the elapsed
    /// period:
    ///
    /// `index *= RAY + rate * elapsed / MILLIS_PER_YEAR`
    ///
    /// Anyone may poke accrual; the engine triggers it before every
    /// debt-affecting operation.
    pub fn accrue(&mut self, currency: String) {
        let mut config = self
            .configs
            .get(&currency)
            .unwrap_or_revert_with(&self.env(), LendingError::NotSupported);

        let now = self.env().get_block_time();
        if now == config.last_accrual {
            return;
        }

        let feed = PriceSourceContractRef::new(self.env(), config.price_feed);
        let price = feed.get_price(currency.clone());
        if price.is_zero() {
            self.env().revert(LendingError::PriceUnavailable);
        }

        // The feed quotes currency units per USD, so a currency
        // appreciating against USD shows a falling price: the ratio of
        // the snapshot over the current price exceeds 1.0 exactly when
        // the currency strengthened since the previous accrual.
        let price_ratio = if config.price_snapshot.is_zero() {
            FixedPoint::wad()
        } else {
            FixedPoint::wad_div(config.price_snapshot, price).unwrap_or_revert(&self.env())
        };

        let rate = interest_rate::borrow_rate(&config.rate_params, price_ratio);
        let new_index = compound(config.borrow_index, rate, now - config.last_accrual)
            .unwrap_or_revert(&self.env());

        config.borrow_index = new_index;
        config.last_accrual = now;
        config.price_snapshot = price;
        self.configs.set(&currency, config);

        self.env().emit_event(IndexAccrued {
            currency,
            borrow_index: new_index,
            borrow_rate: rate,
            price,
            timestamp: now,
        });
    }

    // ========================================
    // View Functions
    // ========================================

    /// Get a currency's configuration
    pub fn get_currency(&self, currency: String) -> CurrencyConfig {
        self.configs
            .get(&currency)
            .unwrap_or_revert_with(&self.env(), LendingError::NotSupported)
    }

    /// Current borrow index of a currency (RAY, as of the last accrual)
    pub fn borrow_index(&self, currency: String) -> U256 {
        self.get_currency(currency).borrow_index
    }

    /// Whether a currency has been configured
    pub fn is_supported(&self, currency: String) -> bool {
        self.configs.get(&currency).is_some()
    }

    // ========================================
    // Internal
    // ========================================

    fn validate_ratios(&self, collateral_ratio: U256, liquidation_threshold: U256) {
        let scale = FixedPoint::wad();
        if collateral_ratio < scale {
            self.env().revert(LendingError::InvalidConfiguration);
        }
        if liquidation_threshold < scale || liquidation_threshold > collateral_ratio {
            self.env().revert(LendingError::InvalidConfiguration);
        }
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        if caller != admin {
            self.env().revert(LendingError::Unauthorized);
        }
    }
}

/// index * (RAY + rate_ray * elapsed_ms / MILLIS_PER_YEAR) / RAY
fn compound(index: U256, rate_wad: U256, elapsed_ms: u64) -> Result<U256, LendingError> {
    let rate_ray = FixedPoint::wad_to_ray(rate_wad)?;
    let accumulated = SafeMath::div(
        SafeMath::mul(rate_ray, U256::from(elapsed_ms))?,
        U256::from(MILLIS_PER_YEAR),
    )?;
    let factor = SafeMath::add(FixedPoint::ray(), accumulated)?;
    FixedPoint::ray_mul(index, factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{RAY, WAD};

    #[test]
    fn test_compound_one_year_at_base() {
        // 2% over exactly one year on an identity index
        let index = compound(U256::from(RAY), U256::from(WAD / 50), MILLIS_PER_YEAR).unwrap();
        assert_eq!(index, U256::from(RAY + RAY / 50));
    }

    #[test]
    fn test_compound_zero_elapsed_is_identity() {
        let index = U256::from(RAY + RAY / 7);
        assert_eq!(
            compound(index, U256::from(WAD / 10), 0).unwrap(),
            index
        );
    }

    #[test]
    fn test_compound_is_monotonic() {
        // any non-negative rate keeps the index non-decreasing
        let index = U256::from(RAY);
        let grown = compound(index, U256::zero(), MILLIS_PER_YEAR).unwrap();
        assert_eq!(grown, index);
        let grown = compound(index, U256::from(WAD / 100), 86_400_000).unwrap();
        assert!(grown > index);
    }
}
