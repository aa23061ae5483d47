//! Mathematical utilities for the lending protocol
//! Implements safe math operations and the fixed-point domains used by the
//! ledger: WAD (1e18) for rates, ratios and currency amounts, RAY (1e27)
//! for compounding indexes, and a 6-decimal USD unit of account.
use crate::errors::LendingError;
use odra::casper_types::U256;

/// WAD fixed-point scale (18 decimals); also the scale of currency amounts
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// RAY fixed-point scale (27 decimals); scale of compounding indexes
pub const RAY: u128 = 1_000_000_000_000_000_000_000_000_000;

/// Scale of the USD unit of account (6 decimals)
pub const USD_SCALE: u128 = 1_000_000;

/// Gap between the 18-decimal currency domain and the 6-decimal USD domain
pub const WAD_USD_GAP: u128 = 1_000_000_000_000;

/// Factor lifting a WAD value into the RAY domain
pub const WAD_TO_RAY: u128 = 1_000_000_000;

/// One year in milliseconds (block time is millisecond-based)
pub const MILLIS_PER_YEAR: u64 = 31_536_000_000;

/// Safe math operations for U256
pub struct SafeMath;

impl SafeMath {
    /// Safe addition with overflow check
    pub fn add(a: U256, b: U256) -> Result<U256, LendingError> {
        a.checked_add(b).ok_or(LendingError::MathOverflow)
    }

    /// Safe subtraction with underflow check
    pub fn sub(a: U256, b: U256) -> Result<U256, LendingError> {
        a.checked_sub(b).ok_or(LendingError::MathUnderflow)
    }

    /// Safe multiplication with overflow check
    pub fn mul(a: U256, b: U256) -> Result<U256, LendingError> {
        a.checked_mul(b).ok_or(LendingError::MathOverflow)
    }

    /// Safe division with zero check
    pub fn div(a: U256, b: U256) -> Result<U256, LendingError> {
        if b.is_zero() {
            return Err(LendingError::DivisionByZero);
        }
        Ok(a / b)
    }

    /// Returns the minimum of two U256 values
    pub fn min(a: U256, b: U256) -> U256 {
        if a < b { a } else { b }
    }

    /// Returns the maximum of two U256 values
    pub fn max(a: U256, b: U256) -> U256 {
        if a > b { a } else { b }
    }
}

/// Fixed-point operations across the protocol's scaling domains
pub struct FixedPoint;

impl FixedPoint {
    /// WAD scale as U256
    pub fn wad() -> U256 {
        U256::from(WAD)
    }

    /// RAY scale as U256
    pub fn ray() -> U256 {
        U256::from(RAY)
    }

    /// USD scale as U256
    pub fn usd_scale() -> U256 {
        U256::from(USD_SCALE)
    }

    /// Multiply two WAD numbers: a * b / 1e18
    pub fn wad_mul(a: U256, b: U256) -> Result<U256, LendingError> {
        SafeMath::div(SafeMath::mul(a, b)?, Self::wad())
    }

    /// Divide two WAD numbers: a * 1e18 / b
    pub fn wad_div(a: U256, b: U256) -> Result<U256, LendingError> {
        SafeMath::div(SafeMath::mul(a, Self::wad())?, b)
    }

    /// Multiply a RAY-scaled amount by a RAY index: a * b / 1e27
    pub fn ray_mul(a: U256, b: U256) -> Result<U256, LendingError> {
        SafeMath::div(SafeMath::mul(a, b)?, Self::ray())
    }

    /// Divide into the RAY domain: a * 1e27 / b
    pub fn ray_div(a: U256, b: U256) -> Result<U256, LendingError> {
        SafeMath::div(SafeMath::mul(a, Self::ray())?, b)
    }

    /// Lift a WAD-scaled rate into the RAY domain
    pub fn wad_to_ray(a: U256) -> Result<U256, LendingError> {
        SafeMath::mul(a, U256::from(WAD_TO_RAY))
    }
}
