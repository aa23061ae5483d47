//! Currency Converter - values fiat currency amounts in USD
//!
//! Bridges the protocol's two value domains: 18-decimal native currency
//! amounts and the 6-decimal USD unit of account. Prices come from the
//! feed referenced in the currency's registry configuration, quoted as
//! 18-decimal "currency units per 1 USD". This is the only component that
//! samples the price feed for valuation; ledger code never mixes raw
//! integers from different decimal domains.

use crate::currency_registry::CurrencyRegistryContractRef;
use crate::errors::LendingError;
use crate::math::{FixedPoint, SafeMath, WAD_USD_GAP};
use crate::price_feed::PriceSourceContractRef;
use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

/// Currency Converter contract
#[odra::module]
pub struct CurrencyConverter {
    /// Currency registry holding per-currency feed references
    registry: Var<Address>,
}

#[odra::module]
impl CurrencyConverter {
    /// Initialize the converter with the currency registry address
    pub fn init(&mut self, registry: Address) {
        self.registry.set(registry);
    }

    /// Value a native currency amount in USD
    ///
    /// # Arguments
    /// * `currency` - Currency code
    /// * `amount` - Native amount (18-decimal)
    ///
    /// # Returns
    /// USD value (6-decimal)
    pub fn to_usd(&self, currency: String, amount: U256) -> U256 {
        let price = self.price_of(currency);

        // usd = amount * 1e18 / price / 1e12
        SafeMath::mul(amount, FixedPoint::wad())
            .and_then(|v| SafeMath::div(v, price))
            .and_then(|v| SafeMath::div(v, U256::from(WAD_USD_GAP)))
            .unwrap_or_revert(&self.env())
    }

    /// Convert a USD value into a native currency amount
    ///
    /// # Arguments
    /// * `currency` - Currency code
    /// * `usd_amount` - USD value (6-decimal)
    ///
    /// # Returns
    /// Native amount (18-decimal)
    pub fn from_usd(&self, currency: String, usd_amount: U256) -> U256 {
        let price = self.price_of(currency);

        // amount = usd * price / 1e6
        SafeMath::mul(usd_amount, price)
            .and_then(|v| SafeMath::div(v, FixedPoint::usd_scale()))
            .unwrap_or_revert(&self.env())
    }

    /// Current feed price for a currency; reverts when no quote exists
    pub fn price_of(&self, currency: String) -> U256 {
        let registry = self
            .registry
            .get_or_revert_with(LendingError::InvalidConfiguration);
        let config = CurrencyRegistryContractRef::new(self.env(), registry)
            .get_currency(currency.clone());

        let feed = PriceSourceContractRef::new(self.env(), config.price_feed);
        let price = feed.get_price(currency);
        if price.is_zero() {
            self.env().revert(LendingError::PriceUnavailable);
        }
        price
    }
}
