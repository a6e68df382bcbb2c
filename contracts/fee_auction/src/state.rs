use cosmwasm_std::{Addr, Coin, Decimal, Uint128};
use cw_storage_plus::{Index, IndexList, IndexedMap, Item, Map, MultiIndex};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Config {
    /// Settlement token. Bids pay in it and emission distributes it.
    pub native_denom: String,
    pub reward_collector: Addr,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Params {
    /// Blocks between auction trigger passes.
    pub auction_interval: u64,
    pub auction_threshold_usd_value: Decimal,
    pub initial_price_decrease_rate: Decimal,
    pub price_decrease_block_interval: u64,
    /// Blocks over which a reward peak is emitted.
    pub reward_emission_period: u64,
    /// Blocks per oracle voting window.
    pub vote_period: u64,
    /// Share of bonded power a ballot needs to finalize.
    pub vote_threshold: Decimal,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            auction_interval: 1_000,
            auction_threshold_usd_value: Decimal::from_ratio(10_000u128, 1u128),
            initial_price_decrease_rate: Decimal::percent(5),
            price_decrease_block_interval: 10,
            reward_emission_period: 100_000,
            vote_period: 5,
            vote_threshold: Decimal::percent(50),
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.auction_interval == 0 {
            return Err(ValidationError::InvalidParam {
                field: "auction_interval",
            });
        }
        if self.auction_threshold_usd_value.is_zero() {
            return Err(ValidationError::InvalidParam {
                field: "auction_threshold_usd_value",
            });
        }
        if !is_open_unit_interval(self.initial_price_decrease_rate) {
            return Err(ValidationError::InvalidDecreaseRate {
                field: "initial_price_decrease_rate",
                rate: self.initial_price_decrease_rate,
            });
        }
        if self.price_decrease_block_interval == 0 {
            return Err(ValidationError::InvalidBlockDecreaseInterval {});
        }
        if self.reward_emission_period == 0 {
            return Err(ValidationError::InvalidParam {
                field: "reward_emission_period",
            });
        }
        if self.vote_period == 0 {
            return Err(ValidationError::InvalidParam {
                field: "vote_period",
            });
        }
        if self.vote_threshold.is_zero() || self.vote_threshold > Decimal::one() {
            return Err(ValidationError::InvalidParam {
                field: "vote_threshold",
            });
        }
        Ok(())
    }
}

fn is_open_unit_interval(rate: Decimal) -> bool {
    !rate.is_zero() && rate < Decimal::one()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Auction {
    pub id: u32,
    pub starting_tokens_for_sale: Coin,
    pub start_block: u64,
    pub initial_price_decrease_rate: Decimal,
    pub current_price_decrease_rate: Decimal,
    pub price_decrease_block_interval: u64,
    pub initial_unit_price_in_usomm: Decimal,
    pub current_unit_price_in_usomm: Decimal,
    pub remaining_tokens_for_sale: Coin,
    pub funding_module_account: String,
    pub proceeds_module_account: String,
}

impl Auction {
    pub fn validate_basic(&self, native_denom: &str) -> Result<(), ValidationError> {
        if self.id == 0 {
            return Err(ValidationError::AuctionIdMustBeNonZero {});
        }

        let starting = &self.starting_tokens_for_sale;
        if starting.amount.is_zero() {
            return Err(ValidationError::StartingAmountMustBePositive {
                amount: starting.amount,
                denom: starting.denom.clone(),
            });
        }
        if starting.denom.is_empty() {
            return Err(ValidationError::DenomCannotBeEmpty {});
        }
        if starting.denom == native_denom {
            return Err(ValidationError::CannotAuctionNative {
                denom: starting.denom.clone(),
            });
        }

        if self.start_block == 0 {
            return Err(ValidationError::InvalidStartBlock {});
        }

        if !is_open_unit_interval(self.initial_price_decrease_rate) {
            return Err(ValidationError::InvalidDecreaseRate {
                field: "initial_price_decrease_rate",
                rate: self.initial_price_decrease_rate,
            });
        }
        if !is_open_unit_interval(self.current_price_decrease_rate) {
            return Err(ValidationError::InvalidDecreaseRate {
                field: "current_price_decrease_rate",
                rate: self.current_price_decrease_rate,
            });
        }

        if self.price_decrease_block_interval == 0 {
            return Err(ValidationError::InvalidBlockDecreaseInterval {});
        }

        if self.initial_unit_price_in_usomm.is_zero() {
            return Err(ValidationError::PriceMustBePositive {
                field: "initial_unit_price_in_usomm",
            });
        }
        if self.current_unit_price_in_usomm.is_zero() {
            return Err(ValidationError::PriceMustBePositive {
                field: "current_unit_price_in_usomm",
            });
        }
        if self.current_unit_price_in_usomm > self.initial_unit_price_in_usomm {
            return Err(ValidationError::CurrentPriceAboveInitial {
                initial: self.initial_unit_price_in_usomm,
                current: self.current_unit_price_in_usomm,
            });
        }

        let remaining = &self.remaining_tokens_for_sale;
        if remaining.denom.is_empty() {
            return Err(ValidationError::DenomCannotBeEmpty {});
        }
        if remaining.denom != starting.denom {
            return Err(ValidationError::RemainingDenomMismatch {
                starting: starting.denom.clone(),
                remaining: remaining.denom.clone(),
            });
        }
        if remaining.amount > starting.amount {
            return Err(ValidationError::RemainingExceedsStarting {
                starting: starting.amount,
                remaining: remaining.amount,
            });
        }

        if self.funding_module_account.is_empty() {
            return Err(ValidationError::EmptyModuleAccount { field: "funding" });
        }
        if self.proceeds_module_account.is_empty() {
            return Err(ValidationError::EmptyModuleAccount { field: "proceeds" });
        }

        Ok(())
    }

    pub fn sale_denom(&self) -> &str {
        &self.starting_tokens_for_sale.denom
    }

    pub fn is_sold_out(&self) -> bool {
        self.remaining_tokens_for_sale.amount.is_zero()
    }

    /// Whether `height` is one of this auction's price decrease heights.
    pub fn decays_at(&self, height: u64) -> bool {
        height > self.start_block
            && (height - self.start_block) % self.price_decrease_block_interval == 0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Bid {
    pub id: u64,
    pub auction_id: u32,
    pub bidder: Addr,
    pub max_bid_in_usomm: Coin,
    pub sale_token_minimum_amount: Coin,
    pub total_fulfilled_sale_tokens: Coin,
    pub sale_token_unit_price_in_usomm: Decimal,
    pub total_usomm_paid: Coin,
    pub block_height: u64,
}

impl Bid {
    pub fn validate_basic(&self, native_denom: &str) -> Result<(), ValidationError> {
        if self.id == 0 {
            return Err(ValidationError::BidIdMustBeNonZero {});
        }
        if self.auction_id == 0 {
            return Err(ValidationError::AuctionIdMustBeNonZero {});
        }
        if self.bidder.as_str().is_empty() {
            return Err(ValidationError::InvalidAddress {
                address: self.bidder.to_string(),
            });
        }

        if self.max_bid_in_usomm.amount.is_zero() {
            return Err(ValidationError::AmountMustBePositive {
                field: "max_bid_in_usomm",
            });
        }
        if self.max_bid_in_usomm.denom != native_denom {
            return Err(ValidationError::BidMustBeInNative {
                expected: native_denom.to_string(),
                denom: self.max_bid_in_usomm.denom.clone(),
            });
        }

        if self.sale_token_minimum_amount.denom.is_empty() {
            return Err(ValidationError::DenomCannotBeEmpty {});
        }
        if self.sale_token_minimum_amount.denom == native_denom {
            return Err(ValidationError::CannotAuctionNative {
                denom: self.sale_token_minimum_amount.denom.clone(),
            });
        }
        if self.sale_token_minimum_amount.amount.is_zero() {
            return Err(ValidationError::AmountMustBePositive {
                field: "sale_token_minimum_amount",
            });
        }

        if self.sale_token_unit_price_in_usomm.is_zero() {
            return Err(ValidationError::PriceMustBePositive {
                field: "sale_token_unit_price_in_usomm",
            });
        }

        if self.total_usomm_paid.denom != native_denom {
            return Err(ValidationError::BidMustBeInNative {
                expected: native_denom.to_string(),
                denom: self.total_usomm_paid.denom.clone(),
            });
        }
        if self.total_usomm_paid.amount > self.max_bid_in_usomm.amount {
            return Err(ValidationError::PaymentExceedsMaxBid {
                paid: self.total_usomm_paid.amount,
                max_bid: self.max_bid_in_usomm.amount,
            });
        }

        Ok(())
    }
}

/// USD price of one base unit of `denom`. The smallest expressible price is
/// `1e-18` USD per base unit.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct TokenPrice {
    pub denom: String,
    pub usd_price: Decimal,
    pub last_updated_block: u64,
}

impl TokenPrice {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.denom.is_empty() {
            return Err(ValidationError::DenomCannotBeEmpty {});
        }
        if self.usd_price.is_zero() {
            return Err(ValidationError::PriceMustBePositive { field: "usd_price" });
        }
        if self.last_updated_block == 0 {
            return Err(ValidationError::InvalidLastUpdatedBlock {});
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ProposedTokenPrice {
    pub denom: String,
    pub usd_price: Decimal,
}

impl ProposedTokenPrice {
    pub fn validate_basic(&self) -> Result<(), ValidationError> {
        if self.denom.is_empty() {
            return Err(ValidationError::DenomCannotBeEmpty {});
        }
        if self.usd_price.is_zero() {
            return Err(ValidationError::PriceMustBePositive { field: "usd_price" });
        }
        Ok(())
    }
}

/// Status of a validator as reported by the staking collaborator.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ValidatorInfo {
    pub operator: String,
    pub bonded: bool,
    pub jailed: bool,
    pub consensus_power: u64,
}

impl ValidatorInfo {
    pub fn is_active(&self) -> bool {
        self.bonded && !self.jailed
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ExchangeRateTuple {
    pub denom: String,
    /// Zero is an abstention.
    pub exchange_rate: Decimal,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct AggregateExchangeRateVote {
    pub voter: String,
    pub exchange_rate_tuples: Vec<ExchangeRateTuple>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ExchangeRateVote {
    pub voter: String,
    pub denom: String,
    pub exchange_rate: Decimal,
}

pub struct BidIndexes<'a> {
    pub auction: MultiIndex<'a, u32, Bid, u64>,
}

impl<'a> IndexList<Bid> for BidIndexes<'a> {
    fn get_indexes(&'_ self) -> Box<dyn Iterator<Item = &'_ dyn Index<Bid>> + '_> {
        let v: Vec<&dyn Index<Bid>> = vec![&self.auction];
        Box::new(v.into_iter())
    }
}

pub fn bids<'a>() -> IndexedMap<'a, u64, Bid, BidIndexes<'a>> {
    let indexes = BidIndexes {
        auction: MultiIndex::new(|_pk, bid: &Bid| bid.auction_id, "bids", "bids__auction"),
    };
    IndexedMap::new("bids", indexes)
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const PARAMS: Item<Params> = Item::new("params");

pub const ACTIVE_AUCTIONS: Map<u32, Auction> = Map::new("active_auctions");
pub const ENDED_AUCTIONS: Map<u32, Auction> = Map::new("ended_auctions");
pub const ACTIVE_AUCTION_BY_DENOM: Map<&str, u32> = Map::new("active_auction_by_denom");
pub const LAST_AUCTION_ID: Item<u32> = Item::new("last_auction_id");
pub const LAST_BID_ID: Item<u64> = Item::new("last_bid_id");

pub const TOKEN_PRICES: Map<&str, TokenPrice> = Map::new("token_prices");
pub const PROPOSED_TOKEN_PRICES: Map<&str, ProposedTokenPrice> =
    Map::new("proposed_token_prices");

/// Keyed by the raw voter string so the tally sees exactly what was stored.
pub const AGGREGATE_VOTES: Map<&str, AggregateExchangeRateVote> = Map::new("aggregate_votes");
/// Keyed by (voter, denom).
pub const EXCHANGE_RATE_VOTES: Map<(&str, &str), ExchangeRateVote> =
    Map::new("exchange_rate_votes");
pub const VALIDATORS: Map<&str, ValidatorInfo> = Map::new("validators");

pub const LAST_REWARD_SUPPLY_PEAK: Item<Uint128> = Item::new("last_reward_supply_peak");
