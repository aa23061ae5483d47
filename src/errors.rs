//! Error definitions for the Meridian lending protocol
use odra::prelude::*;

/// Errors that can occur in the lending protocol
#[odra::odra_error]
pub enum LendingError {
    // Configuration Errors
    /// Currency was never configured in the registry
    NotSupported = 1,

    /// Collateral token is not registered or is disabled
    UnsupportedToken = 2,

    /// Invalid risk or rate configuration parameter
    InvalidConfiguration = 3,

    // State Errors
    /// No position exists for the requested key
    PositionNotFound = 4,

    /// Debt position is not in the Processed status
    NotProcessed = 5,

    /// Requested status transition is not allowed
    InvalidTransition = 6,

    /// Repeat borrow references a different collateral token
    CollateralMismatch = 7,

    // Collateral Errors
    /// Collateral value is below the required collateralization
    InsufficientCollateral = 8,

    /// Withdrawal would drop the backing debt's health factor below 1.0
    NotWithdrawable = 9,

    /// Position is above the liquidation threshold
    NotLiquidatable = 10,

    /// Repayment exceeds the amount owed
    ExceedsOwed = 11,

    /// Scaled balance cannot cover the requested amount
    InsufficientBalance = 12,

    // Oracle Errors
    /// Price feed returned no quote for the currency
    PriceUnavailable = 13,

    // Arithmetic Errors
    /// Overflow error
    MathOverflow = 14,

    /// Underflow error
    MathUnderflow = 15,

    /// Division by zero
    DivisionByZero = 16,

    // Access Control Errors
    /// Unauthorized access
    Unauthorized = 17,

    /// Contract is paused
    ContractPaused = 18,

    /// Zero amount not allowed
    ZeroAmount = 19,
}
