use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Coin, Decimal, Uint128};

use crate::state::{
    Auction, Bid, Config, ExchangeRateTuple, Params, ProposedTokenPrice, TokenPrice,
    ValidatorInfo,
};

#[cw_serde]
pub struct InstantiateMsg {
    pub native_denom: String,
    /// Receives emissions and auction proceeds.
    pub reward_collector: String,
    /// Defaults apply when omitted.
    pub params: Option<Params>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Buy from an active auction. The max bid is the native amount attached
    /// to the message; whatever is not spent is refunded.
    SubmitBid {
        auction_id: u32,
        sale_token_minimum_amount: Coin,
    },
    /// Validator vote covering several denoms at once
    AggregateExchangeRateVote {
        exchange_rates: Vec<ExchangeRateTuple>,
    },
    /// Validator vote for a single denom
    ExchangeRateVote {
        denom: String,
        exchange_rate: Decimal,
    },
}

/// Host and governance hooks.
#[cw_serde]
pub enum SudoMsg {
    BeginBlock {},
    UpdateParams { params: Params },
    /// Replaces the validator snapshot used to weigh votes.
    SetValidators { validators: Vec<ValidatorInfo> },
    /// Staged prices, promoted at the next tally.
    ProposeTokenPrices { prices: Vec<ProposedTokenPrice> },
    CancelAuction { auction_id: u32 },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Params)]
    Params {},
    #[returns(Config)]
    Config {},
    #[returns(TokenPrice)]
    TokenPrice { denom: String },
    #[returns(TokenPricesResponse)]
    TokenPrices {
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(Auction)]
    ActiveAuction { auction_id: u32 },
    #[returns(AuctionsResponse)]
    ActiveAuctions {
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    #[returns(Auction)]
    EndedAuction { auction_id: u32 },
    #[returns(Bid)]
    Bid { bid_id: u64 },
    #[returns(BidsResponse)]
    BidsByAuction {
        auction_id: u32,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(Uint128)]
    LastRewardSupplyPeak {},
}

#[cw_serde]
pub struct TokenPricesResponse {
    pub token_prices: Vec<TokenPrice>,
}

#[cw_serde]
pub struct AuctionsResponse {
    pub auctions: Vec<Auction>,
}

#[cw_serde]
pub struct BidsResponse {
    pub bids: Vec<Bid>,
}

/// Set as the response data of `SubmitBid`.
#[cw_serde]
pub struct SubmitBidResponse {
    pub bid: Bid,
}
