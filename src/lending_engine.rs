//! Lending Engine - orchestrates supply, borrow, repay and liquidate
//!
//! Coordinates the currency registry, converter, collateral ledger and
//! debt ledger:
//! - Supplying and withdrawing collateral (via the yield venue)
//! - Borrowing against collateral, with an approval gate
//! - Repayments against the index-scaled debt
//! - The liquidation decision
//!
//! Every debt-affecting entrypoint accrues the currency's borrow index
//! first, values collateral and debt in USD through the converter, and
//! commits ledger mutations only after all validation and external calls
//! have succeeded, so a failing feed or venue aborts the operation with no
//! partial state.

use crate::collateral_ledger::{
    CollateralLedger, CollateralPosition, CollateralStatus, TokenConfig,
};
use crate::currency_converter::CurrencyConverterContractRef;
use crate::currency_registry::{CurrencyConfig, CurrencyRegistryContractRef};
use crate::debt_ledger::{DebtLedger, DebtPosition, DebtStatus};
use crate::errors::LendingError;
use crate::events::*;
use crate::math::{FixedPoint, SafeMath};
use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

/// Lending Engine contract
#[odra::module]
pub struct LendingEngine {
    /// Currency registry address
    registry: Var<Address>,
    /// Currency converter address
    converter: Var<Address>,
    /// Collateral positions and token registry
    collateral: SubModule<CollateralLedger>,
    /// Debt positions and state machine
    debts: SubModule<DebtLedger>,
    /// Admin address
    admin: Var<Address>,
    /// Paused state
    paused: Var<bool>,
}

#[odra::module]
impl LendingEngine {
    /// Initialize the engine
    pub fn init(&mut self, registry: Address, converter: Address, admin: Address) {
        self.registry.set(registry);
        self.converter.set(converter);
        self.collateral.set_converter(converter);
        self.admin.set(admin);
        self.paused.set(false);
    }

    // ========================================
    // Collateral Supply
    // ========================================

    /// Supply collateral into the token's yield venue
    pub fn supply(&mut self, token: Address, amount: U256) {
        self.ensure_not_paused();
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let caller = self.env().caller();
        self.collateral.deposit(caller, token, amount);
    }

    /// Withdraw supplied collateral
    ///
    /// A position locked in a loan may shed collateral only while the
    /// remaining value keeps every backing debt at a health factor of at
    /// least 1.0; collateral backing a liquidated debt stays reserved for
    /// disposal.
    pub fn withdraw_supply(&mut self, token: Address, amount: U256) {
        self.ensure_not_paused();
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let caller = self.env().caller();
        let pos = self
            .collateral
            .position(caller, token)
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound);
        if matches!(pos.status, CollateralStatus::Withdrawn) {
            self.env().revert(LendingError::PositionNotFound);
        }

        let rate = self.collateral.exchange_rate(token);
        let scaled_delta = FixedPoint::ray_div(amount, rate).unwrap_or_revert(&self.env());
        if scaled_delta > pos.scaled_balance {
            self.env().revert(LendingError::InsufficientBalance);
        }

        if matches!(pos.status, CollateralStatus::LockedInLoan) {
            if self.debts.has_seized_debt_against(caller, token) {
                self.env().revert(LendingError::NotWithdrawable);
            }
            let debt_usd = self.live_debt_usd(caller, token);
            if !debt_usd.is_zero() {
                let remaining = pos.scaled_balance - scaled_delta;
                let remaining_usd = self.collateral.value_scaled_usd(token, remaining);
                // health factor = collateralUSD / debtUSD must stay >= 1.0
                if remaining_usd < debt_usd {
                    self.env().revert(LendingError::NotWithdrawable);
                }
            }
        }

        self.collateral.withdraw(caller, token, amount);
    }

    // ========================================
    // Borrowing
    // ========================================

    /// Borrow a currency against a collateral position
    ///
    /// The post-borrow debt must be covered by the collateral's USD value
    /// at the currency's collateralization ratio. New positions start
    /// Pending and need `process_borrow` before repayment or liquidation.
    pub fn borrow(&mut self, currency: String, amount: U256, collateral_token: Address) {
        self.ensure_not_paused();
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let caller = self.env().caller();
        let config = self.accrue_and_get(currency.clone());

        let collateral_pos = self
            .collateral
            .position(caller, collateral_token)
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound);
        if matches!(collateral_pos.status, CollateralStatus::Withdrawn) {
            self.env().revert(LendingError::PositionNotFound);
        }

        // Current owed on a live position counts toward the requirement;
        // terminal positions start over from zero
        let owed_before = match self.debts.position(caller, currency.clone()) {
            Some(pos) if pos.status.is_live() => {
                if pos.collateral_token != collateral_token {
                    self.env().revert(LendingError::CollateralMismatch);
                }
                pos.owed(config.borrow_index).unwrap_or_revert(&self.env())
            }
            _ => U256::zero(),
        };

        let debt_after = owed_before + amount;
        let debt_usd = self.converter_ref().to_usd(currency.clone(), debt_after);
        let required_usd =
            FixedPoint::wad_mul(debt_usd, config.collateral_ratio).unwrap_or_revert(&self.env());

        let collateral_usd = self
            .collateral
            .value_scaled_usd(collateral_token, collateral_pos.scaled_balance);
        if collateral_usd < required_usd {
            self.env().revert(LendingError::InsufficientCollateral);
        }

        let scaled_delta =
            FixedPoint::ray_div(amount, config.borrow_index).unwrap_or_revert(&self.env());
        self.debts
            .open_or_increase(caller, currency.clone(), collateral_token, scaled_delta);
        self.collateral
            .set_status(caller, collateral_token, CollateralStatus::LockedInLoan);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(Borrowed {
            borrower: caller,
            currency,
            amount,
            collateral_token,
            borrow_index: config.borrow_index,
            timestamp,
        });
    }

    /// Approve a pending borrow (admin only)
    pub fn process_borrow(&mut self, user: Address, currency: String) {
        self.only_admin();
        self.accrue_and_get(currency.clone());

        self.debts
            .set_status(user, currency.clone(), DebtStatus::Processed);

        let caller = self.env().caller();
        self.env().emit_event(BorrowProcessed {
            borrower: user,
            currency,
            processed_by: caller,
        });
    }

    /// Reject a pending borrow (admin only); releases the collateral lock
    /// unless another live debt holds it
    pub fn cancel_borrow(&mut self, user: Address, currency: String) {
        self.only_admin();
        self.accrue_and_get(currency.clone());

        let pos = self
            .debts
            .position(user, currency.clone())
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound);

        self.debts
            .set_status(user, currency.clone(), DebtStatus::Canceled);
        self.release_lock_if_unencumbered(user, pos.collateral_token);

        let caller = self.env().caller();
        self.env().emit_event(BorrowCanceled {
            borrower: user,
            currency,
            canceled_by: caller,
        });
    }

    /// Repay part or all of a processed loan
    pub fn repay_loan(&mut self, currency: String, amount: U256) {
        self.ensure_not_paused();
        if amount.is_zero() {
            self.env().revert(LendingError::ZeroAmount);
        }

        let caller = self.env().caller();
        let config = self.accrue_and_get(currency.clone());

        let pos = self
            .debts
            .position(caller, currency.clone())
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound);
        if !matches!(pos.status, DebtStatus::Processed) {
            self.env().revert(LendingError::NotProcessed);
        }

        let owed = pos.owed(config.borrow_index).unwrap_or_revert(&self.env());
        if amount > owed {
            self.env().revert(LendingError::ExceedsOwed);
        }

        self.debts
            .record_repayment(caller, currency.clone(), amount);

        let remaining = owed - amount;
        if remaining.is_zero() {
            self.debts
                .set_status(caller, currency.clone(), DebtStatus::Repaid);
            self.release_lock_if_unencumbered(caller, pos.collateral_token);
        }

        let timestamp = self.env().get_block_time();
        self.env().emit_event(Repaid {
            borrower: caller,
            currency,
            amount,
            remaining,
            timestamp,
        });
    }

    // ========================================
    // Liquidation
    // ========================================

    /// Liquidate an undercollateralized processed loan
    ///
    /// Succeeds exactly when `collateralUSD / debtUSD` has fallen below
    /// the currency's liquidation threshold; only flips the position to
    /// Liquidated, disposal of the seized collateral happens elsewhere.
    pub fn liquidate(&mut self, user: Address, currency: String) {
        self.ensure_not_paused();

        let liquidator = self.env().caller();
        let config = self.accrue_and_get(currency.clone());

        let pos = self
            .debts
            .position(user, currency.clone())
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound);
        if !matches!(pos.status, DebtStatus::Processed) {
            self.env().revert(LendingError::NotProcessed);
        }

        let owed = pos.owed(config.borrow_index).unwrap_or_revert(&self.env());
        if owed.is_zero() {
            self.env().revert(LendingError::NotLiquidatable);
        }

        let debt_usd = self.converter_ref().to_usd(currency.clone(), owed);
        if debt_usd.is_zero() {
            self.env().revert(LendingError::NotLiquidatable);
        }
        let collateral_usd = self.collateral.value_usd(user, pos.collateral_token);

        let ratio = FixedPoint::wad_div(collateral_usd, debt_usd).unwrap_or_revert(&self.env());
        if ratio >= config.liquidation_threshold {
            self.env().revert(LendingError::NotLiquidatable);
        }

        self.debts
            .set_status(user, currency.clone(), DebtStatus::Liquidated);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(Liquidated {
            borrower: user,
            liquidator,
            currency,
            debt_usd,
            collateral_usd,
            timestamp,
        });
    }

    // ========================================
    // Admin Functions
    // ========================================

    /// Register or update a supported collateral token (admin only)
    pub fn set_supported_token(
        &mut self,
        token: Address,
        venue: Address,
        pricing_currency: Option<String>,
        enabled: bool,
    ) {
        self.only_admin();
        let caller = self.env().caller();
        self.collateral
            .set_supported_token(token, venue, pricing_currency, enabled, caller);
    }

    /// Pause public entrypoints (admin only)
    pub fn pause(&mut self) {
        self.only_admin();
        self.paused.set(true);

        let caller = self.env().caller();
        let timestamp = self.env().get_block_time();
        self.env().emit_event(EnginePaused {
            paused_by: caller,
            timestamp,
        });
    }

    /// Resume public entrypoints (admin only)
    pub fn unpause(&mut self) {
        self.only_admin();
        self.paused.set(false);

        let caller = self.env().caller();
        let timestamp = self.env().get_block_time();
        self.env().emit_event(EngineUnpaused {
            unpaused_by: caller,
            timestamp,
        });
    }

    // ========================================
    // View Functions
    // ========================================

    /// A user's collateral position in a token
    pub fn collateral_position(&self, user: Address, token: Address) -> Option<CollateralPosition> {
        self.collateral.position(user, token)
    }

    /// A user's debt position in a currency
    pub fn debt_position(&self, user: Address, currency: String) -> Option<DebtPosition> {
        self.debts.position(user, currency)
    }

    /// Amount owed on a debt position, at the index of the last accrual
    pub fn debt_owed(&self, user: Address, currency: String) -> U256 {
        let pos = self
            .debts
            .position(user, currency.clone())
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound);
        let config = self.registry_ref().get_currency(currency);
        pos.owed(config.borrow_index).unwrap_or_revert(&self.env())
    }

    /// USD value (6-decimal) of a user's collateral position
    pub fn collateral_value_usd(&self, user: Address, token: Address) -> U256 {
        self.collateral.value_usd(user, token)
    }

    /// Health factor of a debt position (WAD): collateralUSD / debtUSD,
    /// at the index of the last accrual; U256::MAX when nothing is owed
    pub fn health_factor(&self, user: Address, currency: String) -> U256 {
        let pos = match self.debts.position(user, currency.clone()) {
            Some(p) => p,
            None => return U256::MAX,
        };
        if !pos.status.is_live() {
            return U256::MAX;
        }
        let config = self.registry_ref().get_currency(currency.clone());
        let owed = pos.owed(config.borrow_index).unwrap_or_revert(&self.env());
        if owed.is_zero() {
            return U256::MAX;
        }

        let debt_usd = self.converter_ref().to_usd(currency, owed);
        if debt_usd.is_zero() {
            return U256::MAX;
        }
        let collateral_usd = self.collateral.value_usd(user, pos.collateral_token);
        FixedPoint::wad_div(collateral_usd, debt_usd).unwrap_or_revert(&self.env())
    }

    /// Configuration of a supported collateral token
    pub fn token_config(&self, token: Address) -> TokenConfig {
        self.collateral.token_config(token)
    }

    /// Whether the engine is paused
    pub fn is_paused(&self) -> bool {
        self.paused.get_or_default()
    }

    // ========================================
    // Internal
    // ========================================

    /// Accrue a currency's borrow index and return its fresh config
    fn accrue_and_get(&mut self, currency: String) -> CurrencyConfig {
        let registry = self
            .registry
            .get_or_revert_with(LendingError::InvalidConfiguration);
        let mut registry_ref = CurrencyRegistryContractRef::new(self.env(), registry);
        registry_ref.accrue(currency.clone());
        registry_ref.get_currency(currency)
    }

    /// USD value of every live debt of the user backed by the token,
    /// accruing each currency before its debt is read
    fn live_debt_usd(&mut self, user: Address, token: Address) -> U256 {
        let positions = self.debts.live_positions_against(user, token);
        let mut total = U256::zero();
        for pos in positions {
            let config = self.accrue_and_get(pos.currency.clone());
            let owed = pos.owed(config.borrow_index).unwrap_or_revert(&self.env());
            if owed.is_zero() {
                continue;
            }
            let usd = self.converter_ref().to_usd(pos.currency, owed);
            total = SafeMath::add(total, usd).unwrap_or_revert(&self.env());
        }
        total
    }

    /// Return a locked collateral position to Active when no live debt
    /// references it anymore
    fn release_lock_if_unencumbered(&mut self, user: Address, token: Address) {
        if self.debts.has_live_debt_against(user, token) {
            return;
        }
        if let Some(pos) = self.collateral.position(user, token) {
            if matches!(pos.status, CollateralStatus::LockedInLoan) {
                self.collateral
                    .set_status(user, token, CollateralStatus::Active);
            }
        }
    }

    fn registry_ref(&self) -> CurrencyRegistryContractRef {
        let registry = self
            .registry
            .get_or_revert_with(LendingError::InvalidConfiguration);
        CurrencyRegistryContractRef::new(self.env(), registry)
    }

    fn converter_ref(&self) -> CurrencyConverterContractRef {
        let converter = self
            .converter
            .get_or_revert_with(LendingError::InvalidConfiguration);
        CurrencyConverterContractRef::new(self.env(), converter)
    }

    fn only_admin(&self) {
        let caller = self.env().caller();
        let admin = self.admin.get_or_revert_with(LendingError::Unauthorized);
        if caller != admin {
            self.env().revert(LendingError::Unauthorized);
        }
    }

    fn ensure_not_paused(&self) {
        if self.paused.get_or_default() {
            self.env().revert(LendingError::ContractPaused);
        }
    }
}
