//! Debt Ledger - per-user borrow positions scaled by the currency index
//!
//! Tracks each user's debt per currency in units of that currency's
//! compounding borrow index: the stored scaled debt never changes as
//! interest accrues, and the real amount owed is always
//! `scaled * index / RAY - total_repaid`. Repayments accumulate in
//! `total_repaid` rather than shrinking the scaled debt.
//!
//! Positions move through an approval-gated state machine:
//! Pending -> {Processed, Canceled}; Processed -> {Repaid, Liquidated};
//! terminal states are final. This module is composed into the lending
//! engine, which exclusively owns the records.

use crate::errors::LendingError;
use crate::math::FixedPoint;
use odra::casper_types::U256;
use odra::prelude::*;

/// Lifecycle of a debt position
#[odra::odra_type]
pub enum DebtStatus {
    /// Requested, awaiting administrative approval
    Pending,
    /// Approved; may be repaid or liquidated
    Processed,
    /// Rejected before approval (terminal)
    Canceled,
    /// Fully repaid (terminal)
    Repaid,
    /// Liquidated while undercollateralized (terminal)
    Liquidated,
}

impl DebtStatus {
    /// Whether the position still represents an open claim
    pub fn is_live(&self) -> bool {
        matches!(self, DebtStatus::Pending | DebtStatus::Processed)
    }
}

/// A user's borrow position in one currency
#[odra::odra_type]
pub struct DebtPosition {
    /// Owner address
    pub owner: Address,
    /// Borrowed currency code
    pub currency: String,
    /// Collateral position backing this debt
    pub collateral_token: Address,
    /// Debt in units of the currency's borrow index (RAY-scaled)
    pub scaled_debt: U256,
    /// Cumulative amount repaid (18-decimal currency units)
    pub total_repaid: U256,
    /// Position status
    pub status: DebtStatus,
}

impl DebtPosition {
    /// Real amount owed at the given borrow index:
    /// `scaled * index / RAY - total_repaid`, floored at zero
    pub fn owed(&self, index: U256) -> Result<U256, LendingError> {
        let gross = FixedPoint::ray_mul(self.scaled_debt, index)?;
        Ok(gross.saturating_sub(self.total_repaid))
    }
}

/// Debt Ledger module
#[odra::module]
pub struct DebtLedger {
    /// Positions: (user, currency) -> position
    positions: Mapping<(Address, String), DebtPosition>,

    /// Currencies a user has ever borrowed: (user, slot) -> code
    user_currencies: Mapping<(Address, u32), String>,

    /// Number of currency slots recorded for a user
    user_currency_count: Mapping<Address, u32>,
}

#[odra::module]
impl DebtLedger {
    /// Look up a position
    pub fn position(&self, user: Address, currency: String) -> Option<DebtPosition> {
        self.positions.get(&(user, currency))
    }

    /// Create a position or increase an existing one
    ///
    /// A live position is incremented and must reference the same
    /// collateral token; a terminal position is replaced by a fresh
    /// Pending record.
    pub fn open_or_increase(
        &mut self,
        user: Address,
        currency: String,
        collateral_token: Address,
        scaled_delta: U256,
    ) -> DebtPosition {
        let position = match self.positions.get(&(user, currency.clone())) {
            Some(mut pos) if pos.status.is_live() => {
                if pos.collateral_token != collateral_token {
                    self.env().revert(LendingError::CollateralMismatch);
                }
                pos.scaled_debt = pos.scaled_debt + scaled_delta;
                pos
            }
            _ => {
                let pos = DebtPosition {
                    owner: user,
                    currency: currency.clone(),
                    collateral_token,
                    scaled_debt: scaled_delta,
                    total_repaid: U256::zero(),
                    status: DebtStatus::Pending,
                };
                self.track_currency(user, currency.clone());
                pos
            }
        };
        self.positions.set(&(user, currency), position.clone());
        position
    }

    /// Add a repayment to a position's cumulative total
    pub fn record_repayment(&mut self, user: Address, currency: String, amount: U256) {
        let mut pos = self
            .positions
            .get(&(user, currency.clone()))
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound);
        pos.total_repaid = pos.total_repaid + amount;
        self.positions.set(&(user, currency), pos);
    }

    /// Transition a position's status, enforcing the state machine
    pub fn set_status(&mut self, user: Address, currency: String, status: DebtStatus) {
        let mut pos = self
            .positions
            .get(&(user, currency.clone()))
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound);

        if !transition_allowed(&pos.status, &status) {
            self.env().revert(LendingError::InvalidTransition);
        }
        pos.status = status;
        self.positions.set(&(user, currency), pos);
    }

    /// Live (Pending or Processed) positions of a user backed by a token
    pub fn live_positions_against(&self, user: Address, token: Address) -> Vec<DebtPosition> {
        let count = self.user_currency_count.get(&user).unwrap_or(0);
        let mut out = Vec::new();
        for slot in 0..count {
            if let Some(currency) = self.user_currencies.get(&(user, slot)) {
                if let Some(pos) = self.positions.get(&(user, currency)) {
                    if pos.status.is_live() && pos.collateral_token == token {
                        out.push(pos);
                    }
                }
            }
        }
        out
    }

    /// Whether any live debt of the user references the token
    pub fn has_live_debt_against(&self, user: Address, token: Address) -> bool {
        !self.live_positions_against(user, token).is_empty()
    }

    /// Whether a liquidated debt of the user references the token; the
    /// collateral behind it stays reserved for disposal
    pub fn has_seized_debt_against(&self, user: Address, token: Address) -> bool {
        let count = self.user_currency_count.get(&user).unwrap_or(0);
        for slot in 0..count {
            if let Some(currency) = self.user_currencies.get(&(user, slot)) {
                if let Some(pos) = self.positions.get(&(user, currency)) {
                    if matches!(pos.status, DebtStatus::Liquidated) && pos.collateral_token == token
                    {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Remember a currency the user borrowed, once per (user, currency)
    fn track_currency(&mut self, user: Address, currency: String) {
        let count = self.user_currency_count.get(&user).unwrap_or(0);
        for slot in 0..count {
            if let Some(existing) = self.user_currencies.get(&(user, slot)) {
                if existing == currency {
                    return;
                }
            }
        }
        self.user_currencies.set(&(user, count), currency);
        self.user_currency_count.set(&user, count + 1);
    }
}

/// Allowed transitions of the debt state machine
fn transition_allowed(from: &DebtStatus, to: &DebtStatus) -> bool {
    matches!(
        (from, to),
        (DebtStatus::Pending, DebtStatus::Processed)
            | (DebtStatus::Pending, DebtStatus::Canceled)
            | (DebtStatus::Processed, DebtStatus::Repaid)
            | (DebtStatus::Processed, DebtStatus::Liquidated)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{RAY, WAD};

    #[test]
    fn test_transition_matrix() {
        assert!(transition_allowed(&DebtStatus::Pending, &DebtStatus::Processed));
        assert!(transition_allowed(&DebtStatus::Pending, &DebtStatus::Canceled));
        assert!(transition_allowed(&DebtStatus::Processed, &DebtStatus::Repaid));
        assert!(transition_allowed(&DebtStatus::Processed, &DebtStatus::Liquidated));

        assert!(!transition_allowed(&DebtStatus::Pending, &DebtStatus::Repaid));
        assert!(!transition_allowed(&DebtStatus::Pending, &DebtStatus::Liquidated));
        assert!(!transition_allowed(&DebtStatus::Processed, &DebtStatus::Canceled));
        assert!(!transition_allowed(&DebtStatus::Canceled, &DebtStatus::Processed));
        assert!(!transition_allowed(&DebtStatus::Repaid, &DebtStatus::Liquidated));
        assert!(!transition_allowed(&DebtStatus::Liquidated, &DebtStatus::Repaid));
        assert!(!transition_allowed(&DebtStatus::Processed, &DebtStatus::Processed));
    }

    #[test]
    fn test_owed_tracks_index_and_repayments() {
        let env = odra_test::env();
        let pos = DebtPosition {
            owner: env.get_account(0),
            currency: String::from("BOB"),
            collateral_token: env.get_account(1),
            scaled_debt: U256::from(1_000u128 * WAD), // scaled at identity index
            total_repaid: U256::from(300u128 * WAD),
            status: DebtStatus::Processed,
        };

        // At identity: 1000 - 300 = 700
        assert_eq!(
            pos.owed(U256::from(RAY)).unwrap(),
            U256::from(700u128 * WAD)
        );

        // After 2% accrual: 1020 - 300 = 720
        assert_eq!(
            pos.owed(U256::from(RAY + RAY / 50)).unwrap(),
            U256::from(720u128 * WAD)
        );
    }

    #[test]
    fn test_owed_floors_at_zero() {
        let env = odra_test::env();
        let pos = DebtPosition {
            owner: env.get_account(0),
            currency: String::from("BOB"),
            collateral_token: env.get_account(1),
            scaled_debt: U256::from(100u128),
            total_repaid: U256::from(200u128),
            status: DebtStatus::Repaid,
        };
        assert_eq!(pos.owed(U256::from(RAY)).unwrap(), U256::zero());
    }
}
