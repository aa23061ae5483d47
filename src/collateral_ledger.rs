//! Collateral Ledger - per-user collateral positions in venue scaled units
//!
//! Tracks each user's deposited collateral per token and the registry of
//! supported collateral tokens. Balances are held in the yield venue's
//! scaled units so deposits keep earning venue yield; valuation converts
//! scaled units through the venue's exchange rate, then through the
//! currency converter when the token is priced against a non-USD currency.
//!
//! This module is composed into the lending engine, which exclusively owns
//! the position records; the venue is the only external collaborator
//! invoked here.

use crate::currency_converter::CurrencyConverterContractRef;
use crate::errors::LendingError;
use crate::events::{Supplied, SupplyWithdrawn, TokenConfigured};
use crate::math::FixedPoint;
use crate::yield_venue::YieldVenueContractRef;
use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

/// Lifecycle of a collateral position
#[odra::odra_type]
pub enum CollateralStatus {
    /// Deposited and unencumbered
    Active,
    /// Referenced by at least one live debt position
    LockedInLoan,
    /// Balance fully withdrawn
    Withdrawn,
}

/// A user's collateral position in one token
#[odra::odra_type]
pub struct CollateralPosition {
    /// Owner address
    pub owner: Address,
    /// Collateral token
    pub token: Address,
    /// Balance in venue scaled units
    pub scaled_balance: U256,
    /// Position status
    pub status: CollateralStatus,
}

/// Configuration of a supported collateral token
#[odra::odra_type]
pub struct TokenConfig {
    /// Token address
    pub token: Address,
    /// Yield venue custodying deposits of this token
    pub venue: Address,
    /// Currency the venue underlying is denominated in; `None` when the
    /// underlying is already the 6-decimal USD unit
    pub pricing_currency: Option<String>,
    /// Whether new deposits are accepted
    pub is_enabled: bool,
}

/// Collateral Ledger module
#[odra::module]
pub struct CollateralLedger {
    /// Supported token configurations
    token_configs: Mapping<Address, TokenConfig>,

    /// Positions: (user, token) -> position
    positions: Mapping<(Address, Address), CollateralPosition>,

    /// Currency converter used for non-USD valuation
    converter: Var<Address>,
}

#[odra::module]
impl CollateralLedger {
    /// Wire the currency converter (engine init)
    pub fn set_converter(&mut self, converter: Address) {
        self.converter.set(converter);
    }

    /// Register or update a supported collateral token
    pub fn set_supported_token(
        &mut self,
        token: Address,
        venue: Address,
        pricing_currency: Option<String>,
        enabled: bool,
        configured_by: Address,
    ) {
        let config = TokenConfig {
            token,
            venue,
            pricing_currency,
            is_enabled: enabled,
        };
        self.token_configs.set(&token, config);

        self.env().emit_event(TokenConfigured {
            token,
            venue,
            enabled,
            configured_by,
        });
    }

    /// Configuration of a supported token; reverts for unknown tokens
    pub fn token_config(&self, token: Address) -> TokenConfig {
        self.token_configs
            .get(&token)
            .unwrap_or_revert_with(&self.env(), LendingError::UnsupportedToken)
    }

    /// Look up a position
    pub fn position(&self, user: Address, token: Address) -> Option<CollateralPosition> {
        self.positions.get(&(user, token))
    }

    /// Forward a deposit to the venue and credit the position
    ///
    /// Creates the position (Active) on first deposit, increments it
    /// otherwise; a fully withdrawn position is reactivated.
    ///
    /// # Returns
    /// Scaled units credited by the venue
    pub fn deposit(&mut self, user: Address, token: Address, amount: U256) -> U256 {
        let config = self.token_config(token);
        if !config.is_enabled {
            self.env().revert(LendingError::UnsupportedToken);
        }

        let custodian = self.env().self_address();
        let mut venue = YieldVenueContractRef::new(self.env(), config.venue);
        let scaled = venue.deposit(token, amount, custodian);

        let position = match self.positions.get(&(user, token)) {
            Some(mut pos) => {
                pos.scaled_balance = pos.scaled_balance + scaled;
                if let CollateralStatus::Withdrawn = pos.status {
                    pos.status = CollateralStatus::Active;
                }
                pos
            }
            None => CollateralPosition {
                owner: user,
                token,
                scaled_balance: scaled,
                status: CollateralStatus::Active,
            },
        };
        self.positions.set(&(user, token), position);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(Supplied {
            user,
            token,
            amount,
            scaled_amount: scaled,
            timestamp,
        });

        scaled
    }

    /// Forward a withdrawal to the venue and debit the position
    ///
    /// The caller (engine) has already validated the withdrawal against
    /// any backing debt; this only performs the balance mechanics. The
    /// position moves to Withdrawn when the balance reaches zero.
    ///
    /// # Returns
    /// Scaled units debited
    pub fn withdraw(&mut self, user: Address, token: Address, amount: U256) -> U256 {
        let config = self.token_config(token);

        let mut pos = self
            .positions
            .get(&(user, token))
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound);

        let mut venue = YieldVenueContractRef::new(self.env(), config.venue);
        let rate = venue.exchange_rate(token);
        let scaled = FixedPoint::ray_div(amount, rate).unwrap_or_revert(&self.env());
        if pos.scaled_balance < scaled {
            self.env().revert(LendingError::InsufficientBalance);
        }

        venue.withdraw(token, amount, user);

        pos.scaled_balance = pos.scaled_balance - scaled;
        if pos.scaled_balance.is_zero() {
            pos.status = CollateralStatus::Withdrawn;
        }
        self.positions.set(&(user, token), pos);

        let timestamp = self.env().get_block_time();
        self.env().emit_event(SupplyWithdrawn {
            user,
            token,
            amount,
            scaled_amount: scaled,
            timestamp,
        });

        scaled
    }

    /// Set a position's status; reverts for missing positions
    pub fn set_status(&mut self, user: Address, token: Address, status: CollateralStatus) {
        let mut pos = self
            .positions
            .get(&(user, token))
            .unwrap_or_revert_with(&self.env(), LendingError::PositionNotFound);
        pos.status = status;
        self.positions.set(&(user, token), pos);
    }

    /// USD value (6-decimal) of a user's position
    pub fn value_usd(&self, user: Address, token: Address) -> U256 {
        match self.positions.get(&(user, token)) {
            Some(pos) => self.value_scaled_usd(token, pos.scaled_balance),
            None => U256::zero(),
        }
    }

    /// USD value (6-decimal) of an arbitrary scaled balance of a token;
    /// used to evaluate post-withdrawal health before committing
    pub fn value_scaled_usd(&self, token: Address, scaled: U256) -> U256 {
        if scaled.is_zero() {
            return U256::zero();
        }
        let config = self.token_config(token);

        let venue = YieldVenueContractRef::new(self.env(), config.venue);
        let rate = venue.exchange_rate(token);
        let underlying = FixedPoint::ray_mul(scaled, rate).unwrap_or_revert(&self.env());

        match config.pricing_currency {
            // Underlying is already the 6-decimal USD unit
            None => underlying,
            Some(currency) => {
                let converter = self
                    .converter
                    .get_or_revert_with(LendingError::InvalidConfiguration);
                CurrencyConverterContractRef::new(self.env(), converter)
                    .to_usd(currency, underlying)
            }
        }
    }

    /// Venue exchange rate for a token (RAY)
    pub fn exchange_rate(&self, token: Address) -> U256 {
        let config = self.token_config(token);
        YieldVenueContractRef::new(self.env(), config.venue).exchange_rate(token)
    }
}
