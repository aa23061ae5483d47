//! Events for the Meridian lending protocol

use odra::casper_types::U256;
use odra::prelude::*;

// ============================================================================
// Currency Configuration Events
// ============================================================================

/// Event emitted when a currency is added to the registry
#[odra::event]
pub struct CurrencyAdded {
    /// Currency code
    pub currency: String,
    /// Price feed address
    pub price_feed: Address,
    /// Collateralization ratio (WAD)
    pub collateral_ratio: U256,
    /// Liquidation threshold (WAD)
    pub liquidation_threshold: U256,
    /// Added by
    pub added_by: Address,
}

/// Event emitted when a currency's risk parameters are updated
#[odra::event]
pub struct RiskParamsUpdated {
    /// Currency code
    pub currency: String,
    /// New collateralization ratio (WAD)
    pub collateral_ratio: U256,
    /// New liquidation threshold (WAD)
    pub liquidation_threshold: U256,
    /// Updated by
    pub updated_by: Address,
}

/// Event emitted when a currency's price feed is replaced
#[odra::event]
pub struct OracleUpdated {
    /// Currency code
    pub currency: String,
    /// New price feed address
    pub price_feed: Address,
    /// Updated by
    pub updated_by: Address,
}

/// Event emitted when a currency's borrow index is accrued
#[odra::event]
pub struct IndexAccrued {
    /// Currency code
    pub currency: String,
    /// Borrow index after accrual (RAY)
    pub borrow_index: U256,
    /// Annual borrow rate applied over the elapsed period (WAD)
    pub borrow_rate: U256,
    /// Price sampled at accrual (18-decimal, currency units per USD)
    pub price: U256,
    /// Timestamp of accrual
    pub timestamp: u64,
}

// ============================================================================
// Price Feed Events
// ============================================================================

/// Event emitted when a price is published to the feed
#[odra::event]
pub struct PricePublished {
    /// Currency code
    pub currency: String,
    /// Price (18-decimal, currency units per USD; zero marks unavailable)
    pub price: U256,
    /// Timestamp of publication
    pub timestamp: u64,
}

// ============================================================================
// Collateral Events
// ============================================================================

/// Event emitted when a collateral token is configured
#[odra::event]
pub struct TokenConfigured {
    /// Collateral token address
    pub token: Address,
    /// Yield venue custodying the token
    pub venue: Address,
    /// Whether new deposits are accepted
    pub enabled: bool,
    /// Configured by
    pub configured_by: Address,
}

/// Event emitted when collateral is supplied
#[odra::event]
pub struct Supplied {
    /// Address that supplied
    pub user: Address,
    /// Collateral token address
    pub token: Address,
    /// Underlying amount supplied
    pub amount: U256,
    /// Scaled units credited by the venue
    pub scaled_amount: U256,
    /// Timestamp of supply
    pub timestamp: u64,
}

/// Event emitted when supplied collateral is withdrawn
#[odra::event]
pub struct SupplyWithdrawn {
    /// Address that withdrew
    pub user: Address,
    /// Collateral token address
    pub token: Address,
    /// Underlying amount withdrawn
    pub amount: U256,
    /// Scaled units debited
    pub scaled_amount: U256,
    /// Timestamp of withdrawal
    pub timestamp: u64,
}

// ============================================================================
// Borrowing Events
// ============================================================================

/// Event emitted when a currency is borrowed
#[odra::event]
pub struct Borrowed {
    /// Address that borrowed
    pub borrower: Address,
    /// Borrowed currency code
    pub currency: String,
    /// Amount borrowed (18-decimal currency units)
    pub amount: U256,
    /// Collateral token backing the loan
    pub collateral_token: Address,
    /// Borrow index at the time of borrow (RAY)
    pub borrow_index: U256,
    /// Timestamp of borrow
    pub timestamp: u64,
}

/// Event emitted when a pending borrow is approved
#[odra::event]
pub struct BorrowProcessed {
    /// Borrower address
    pub borrower: Address,
    /// Borrowed currency code
    pub currency: String,
    /// Processed by
    pub processed_by: Address,
}

/// Event emitted when a pending borrow is canceled
#[odra::event]
pub struct BorrowCanceled {
    /// Borrower address
    pub borrower: Address,
    /// Borrowed currency code
    pub currency: String,
    /// Canceled by
    pub canceled_by: Address,
}

/// Event emitted when borrowed currency is repaid
#[odra::event]
pub struct Repaid {
    /// Address that repaid
    pub borrower: Address,
    /// Repaid currency code
    pub currency: String,
    /// Amount repaid (18-decimal currency units)
    pub amount: U256,
    /// Amount still owed after this repayment
    pub remaining: U256,
    /// Timestamp of repayment
    pub timestamp: u64,
}

// ============================================================================
// Liquidation Events
// ============================================================================

/// Event emitted when a position is liquidated
#[odra::event]
pub struct Liquidated {
    /// Address of the borrower being liquidated
    pub borrower: Address,
    /// Address of the liquidator
    pub liquidator: Address,
    /// Borrowed currency code
    pub currency: String,
    /// Outstanding debt at liquidation, in USD (6-decimal)
    pub debt_usd: U256,
    /// Collateral value at liquidation, in USD (6-decimal)
    pub collateral_usd: U256,
    /// Timestamp of liquidation
    pub timestamp: u64,
}

// ============================================================================
// Yield Venue Events
// ============================================================================

/// Event emitted when underlying is deposited into the venue
#[odra::event]
pub struct VenueDeposited {
    /// Token deposited
    pub token: Address,
    /// Underlying amount
    pub amount: U256,
    /// Scaled units credited
    pub scaled_amount: U256,
    /// Recipient of the scaled units
    pub recipient: Address,
}

/// Event emitted when underlying is withdrawn from the venue
#[odra::event]
pub struct VenueWithdrawn {
    /// Token withdrawn
    pub token: Address,
    /// Underlying amount
    pub amount: U256,
    /// Scaled units debited
    pub scaled_amount: U256,
    /// Recipient of the underlying
    pub recipient: Address,
}

/// Event emitted when yield is accrued to a venue's depositors
#[odra::event]
pub struct YieldAccrued {
    /// Token the yield accrued on
    pub token: Address,
    /// Underlying amount added
    pub amount: U256,
    /// Exchange rate after accrual (RAY)
    pub exchange_rate: U256,
}

// ============================================================================
// Admin Events
// ============================================================================

/// Event emitted when the engine is paused
#[odra::event]
pub struct EnginePaused {
    /// Address that paused
    pub paused_by: Address,
    /// Timestamp
    pub timestamp: u64,
}

/// Event emitted when the engine is unpaused
#[odra::event]
pub struct EngineUnpaused {
    /// Address that unpaused
    pub unpaused_by: Address,
    /// Timestamp
    pub timestamp: u64,
}
