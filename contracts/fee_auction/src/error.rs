use cosmwasm_std::{Decimal, StdError, Uint128};
use cw_utils::PaymentError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Payment(#[from] PaymentError),

    #[error("invalid: {0}")]
    Validation(#[from] ValidationError),

    #[error("rejected: {0}")]
    Rejected(#[from] BidRejection),

    #[error("fault: {0}")]
    Fault(#[from] Fault),
}

impl ContractError {
    /// Faults mean the ledger broke an invariant. The host must halt instead of
    /// continuing with the block.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ContractError::Fault(_))
    }
}

/// Malformed input, rejected before any state is touched.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("auction id must be non-zero")]
    AuctionIdMustBeNonZero {},

    #[error("bid id must be non-zero")]
    BidIdMustBeNonZero {},

    #[error("starting tokens for sale must be positive: {amount}{denom}")]
    StartingAmountMustBePositive { amount: Uint128, denom: String },

    #[error("denom cannot be empty")]
    DenomCannotBeEmpty {},

    #[error("cannot auction the native denom {denom}")]
    CannotAuctionNative { denom: String },

    #[error("remaining tokens denom {remaining} does not match starting denom {starting}")]
    RemainingDenomMismatch { starting: String, remaining: String },

    #[error("remaining tokens {remaining} exceed starting tokens {starting}")]
    RemainingExceedsStarting { starting: Uint128, remaining: Uint128 },

    #[error("start block must be non-zero")]
    InvalidStartBlock {},

    #[error("{field} must be strictly between 0 and 1, got {rate}")]
    InvalidDecreaseRate { field: &'static str, rate: Decimal },

    #[error("price decrease block interval must be non-zero")]
    InvalidBlockDecreaseInterval {},

    #[error("{field} must be positive")]
    PriceMustBePositive { field: &'static str },

    #[error("current unit price {current} exceeds initial unit price {initial}")]
    CurrentPriceAboveInitial { initial: Decimal, current: Decimal },

    #[error("{field} module account cannot be empty")]
    EmptyModuleAccount { field: &'static str },

    #[error("invalid address {address}")]
    InvalidAddress { address: String },

    #[error("bid must be paid in {expected}, got {denom}")]
    BidMustBeInNative { expected: String, denom: String },

    #[error("{field} must be positive")]
    AmountMustBePositive { field: &'static str },

    #[error("paid {paid} exceeds max bid {max_bid}")]
    PaymentExceedsMaxBid { paid: Uint128, max_bid: Uint128 },

    #[error("last updated block must be non-zero")]
    InvalidLastUpdatedBlock {},

    #[error("duplicate denom {denom} in vote")]
    DuplicateVoteDenom { denom: String },

    #[error("vote must carry at least one exchange rate")]
    EmptyVote {},

    #[error("{voter} is not a registered validator")]
    UnknownValidator { voter: String },

    #[error("param {field} is invalid")]
    InvalidParam { field: &'static str },
}

/// Business rule rejections. The request was well formed but cannot be served
/// in the current auction state; it may be retried later or with different
/// parameters.
#[derive(Error, Debug, PartialEq)]
pub enum BidRejection {
    #[error("an auction for {denom} is already active")]
    AuctionAlreadyActive { denom: String },

    #[error("auction {auction_id} is not active")]
    AuctionNotActive { auction_id: u32 },

    #[error("bid denom {bid_denom} does not match auction denom {auction_denom}")]
    DenomMismatch {
        auction_denom: String,
        bid_denom: String,
    },

    #[error("fill of {fill} is below the requested minimum {minimum}")]
    BelowMinimumFill { fill: Uint128, minimum: Uint128 },

    #[error("bidder could not pay {amount}: {reason}")]
    PaymentFailed { amount: Uint128, reason: String },
}

/// Invariant violations. Replicas halt on these; they are never user errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Fault {
    #[error("transfer of {amount}{denom} from {from} to {to} failed: {reason}")]
    TransferFailed {
        from: String,
        to: String,
        amount: Uint128,
        denom: String,
        reason: String,
    },

    #[error("malformed voter address {voter} in stored votes")]
    MalformedVoter { voter: String },

    #[error("malformed module account {address} on auction {auction_id}")]
    MalformedAccount { auction_id: u32, address: String },

    #[error("fixed point overflow while computing {context}")]
    Overflow { context: &'static str },
}
