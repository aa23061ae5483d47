//! Price Feed - publishes currency prices against USD
//!
//! Prices are quoted as 18-decimal "currency units per 1 USD". A price of
//! zero means the quote is unavailable, never a real value. The registry
//! and converter consume feeds through the `PriceSource` interface, so any
//! publisher implementing it can be wired into a currency's configuration.

use crate::errors::LendingError;
use crate::events::PricePublished;
use odra::casper_types::U256;
use odra::prelude::*;

/// External interface every price publisher exposes
#[odra::external_contract]
pub trait PriceSource {
    /// Current price of the currency (18-decimal, currency units per USD);
    /// zero when no quote is available
    fn get_price(&self, currency: String) -> U256;
}

/// Admin-published price feed contract
#[odra::module]
pub struct PriceFeed {
    /// Published prices per currency code
    prices: Mapping<String, U256>,

    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl PriceFeed {
    /// Initialize the feed with its publishing admin
    pub fn init(&mut self, admin: Address) {
        self.admin.set(admin);
    }

    /// Publish a price for a currency (admin only)
    ///
    /// # Arguments
    /// * `currency` - Currency code
    /// * `price` - 18-decimal currency units per USD; zero marks the
    ///   quote unavailable
    pub fn set_price(&mut self, currency: String, price: U256) {
        self.only_admin();
        self.prices.set(&currency, price);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(PricePublished {
            currency,
            price,
            timestamp,
        });
    }

    /// Current price for a currency; zero when never published or
    /// explicitly marked unavailable
    pub fn get_price(&self, currency: String) -> U256 {
        self.prices.get(&currency).unwrap_or(U256::zero())
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        if caller != admin {
            self.env().revert(LendingError::Unauthorized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odra::host::Deployer;

    #[test]
    fn test_publish_and_read_price() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let mut feed = PriceFeed::deploy(&env, PriceFeedInitArgs { admin });

        // Never published: zero means unavailable
        assert_eq!(feed.get_price(String::from("BOB")), U256::zero());

        let price = U256::from(12_570_000_000_000_000_000u128);
        feed.set_price(String::from("BOB"), price);
        assert_eq!(feed.get_price(String::from("BOB")), price);
    }

    #[test]
    fn test_only_admin_publishes() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let mut feed = PriceFeed::deploy(&env, PriceFeedInitArgs { admin });

        env.set_caller(env.get_account(1));
        assert_eq!(
            feed.try_set_price(String::from("BOB"), U256::one()),
            Err(LendingError::Unauthorized.into())
        );
    }
}
