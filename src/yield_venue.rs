//! Yield Venue - custody of deposited collateral in a yield-bearing pool
//!
//! The ledger never depends on a concrete venue: every venue exposes the
//! `YieldVenue` capability interface, an index-based share system where a
//! deposit is receipted in scaled units and `exchange_rate` converts scaled
//! units back to underlying. `SavingsVault` is the concrete venue shipped
//! with the protocol; its exchange rate starts at identity and grows as
//! yield is accrued to depositors.

use crate::errors::LendingError;
use crate::events::{VenueDeposited, VenueWithdrawn, YieldAccrued};
use crate::math::{FixedPoint, SafeMath};
use odra::casper_types::U256;
use odra::prelude::*;

/// Capability interface every yield venue exposes
#[odra::external_contract]
pub trait YieldVenue {
    /// Deposit underlying and credit scaled units to the recipient;
    /// returns the scaled units minted
    fn deposit(&mut self, token: Address, amount: U256, recipient: Address) -> U256;

    /// Withdraw underlying against the caller's scaled units; returns the
    /// underlying amount released
    fn withdraw(&mut self, token: Address, amount: U256, recipient: Address) -> U256;

    /// Fixed-point index (RAY) converting scaled units to underlying
    fn exchange_rate(&self, token: Address) -> U256;
}

/// Index-based savings vault
#[odra::module]
pub struct SavingsVault {
    /// Scaled balances: (token, holder) -> scaled units
    scaled_balances: Mapping<(Address, Address), U256>,

    /// Total scaled units per token
    total_scaled: Mapping<Address, U256>,

    /// Total underlying per token, including accrued yield
    total_underlying: Mapping<Address, U256>,

    /// Admin address
    admin: Var<Address>,
}

#[odra::module]
impl SavingsVault {
    /// Initialize the vault with its administrative account
    pub fn init(&mut self, admin: Address) {
        self.admin.set(admin);
    }

    /// Deposit underlying for `recipient`
    ///
    /// # Returns
    /// Scaled units credited
    pub fn deposit(&mut self, token: Address, amount: U256, recipient: Address) -> U256 {
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let rate = self.exchange_rate(token);
        let scaled = FixedPoint::ray_div(amount, rate).unwrap_or_revert(&self.env());

        let balance = self
            .scaled_balances
            .get(&(token, recipient))
            .unwrap_or(U256::zero());
        self.scaled_balances.set(&(token, recipient), balance + scaled);

        let total_scaled = self.total_scaled.get(&token).unwrap_or(U256::zero());
        self.total_scaled.set(&token, total_scaled + scaled);

        let total_underlying = self.total_underlying.get(&token).unwrap_or(U256::zero());
        self.total_underlying.set(&token, total_underlying + amount);

        self.env().emit_event(VenueDeposited {
            token,
            amount,
            scaled_amount: scaled,
            recipient,
        });

        scaled
    }

    /// Withdraw underlying against the caller's scaled units
    ///
    /// # Returns
    /// Underlying amount released
    pub fn withdraw(&mut self, token: Address, amount: U256, recipient: Address) -> U256 {
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let caller = self.env().caller();
        let rate = self.exchange_rate(token);
        let scaled = FixedPoint::ray_div(amount, rate).unwrap_or_revert(&self.env());

        let balance = self
            .scaled_balances
            .get(&(token, caller))
            .unwrap_or(U256::zero());
        if balance < scaled {
            self.env().revert(LendingError::InsufficientBalance);
        }
        self.scaled_balances.set(&(token, caller), balance - scaled);

        let total_scaled = self.total_scaled.get(&token).unwrap_or(U256::zero());
        let new_total_scaled = SafeMath::sub(total_scaled, scaled).unwrap_or_revert(&self.env());
        self.total_scaled.set(&token, new_total_scaled);

        let total_underlying = self.total_underlying.get(&token).unwrap_or(U256::zero());
        let new_total_underlying =
            SafeMath::sub(total_underlying, amount).unwrap_or_revert(&self.env());
        self.total_underlying.set(&token, new_total_underlying);

        self.env().emit_event(VenueWithdrawn {
            token,
            amount,
            scaled_amount: scaled,
            recipient,
        });

        amount
    }

    /// Fixed-point index (RAY) converting scaled units to underlying;
    /// identity while the pool is empty
    pub fn exchange_rate(&self, token: Address) -> U256 {
        let total_scaled = self.total_scaled.get(&token).unwrap_or(U256::zero());
        if total_scaled.is_zero() {
            return FixedPoint::ray();
        }

        let total_underlying = self.total_underlying.get(&token).unwrap_or(U256::zero());
        FixedPoint::ray_div(total_underlying, total_scaled).unwrap_or_revert(&self.env())
    }

    /// Credit yield to the pool's depositors (admin only); raises the
    /// exchange rate without minting scaled units
    pub fn accrue_yield(&mut self, token: Address, amount: U256) {
        self.only_admin();

        let total_underlying = self.total_underlying.get(&token).unwrap_or(U256::zero());
        self.total_underlying.set(&token, total_underlying + amount);

        let exchange_rate = self.exchange_rate(token);
        self.env().emit_event(YieldAccrued {
            token,
            amount,
            exchange_rate,
        });
    }

    /// Scaled balance held by an account
    pub fn scaled_balance_of(&self, token: Address, holder: Address) -> U256 {
        self.scaled_balances
            .get(&(token, holder))
            .unwrap_or(U256::zero())
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
    use crate::math::RAY;
    use odra::host::Deployer;

    #[test]
    fn test_initial_exchange_rate_is_identity() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let vault = SavingsVault::deploy(&env, SavingsVaultInitArgs { admin });

        let token = env.get_account(9);
        assert_eq!(vault.exchange_rate(token), U256::from(RAY));
    }

    #[test]
    fn test_deposit_and_withdraw_round_trip() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let mut vault = SavingsVault::deploy(&env, SavingsVaultInitArgs { admin });

        let token = env.get_account(9);
        let amount = U256::from(1_000_000u64); // 1.0 USD-unit underlying
        let scaled = vault.deposit(token, amount, admin);
        assert_eq!(scaled, amount); // 1:1 at identity rate
        assert_eq!(vault.scaled_balance_of(token, admin), scaled);

        let released = vault.withdraw(token, amount, admin);
        assert_eq!(released, amount);
        assert_eq!(vault.scaled_balance_of(token, admin), U256::zero());
    }

    #[test]
    fn test_yield_raises_exchange_rate() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let mut vault = SavingsVault::deploy(&env, SavingsVaultInitArgs { admin });

        let token = env.get_account(9);
        vault.deposit(token, U256::from(1_000_000u64), admin);
        vault.accrue_yield(token, U256::from(100_000u64)); // +10%

        assert_eq!(vault.exchange_rate(token), U256::from(RAY + RAY / 10));
    }

    #[test]
    fn test_withdraw_more_than_held_fails() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let mut vault = SavingsVault::deploy(&env, SavingsVaultInitArgs { admin });

        let token = env.get_account(9);
        vault.deposit(token, U256::from(500u64), admin);
        assert_eq!(
            vault.try_withdraw(token, U256::from(501u64), admin),
            Err(LendingError::InsufficientBalance.into())
        );
    }
}
