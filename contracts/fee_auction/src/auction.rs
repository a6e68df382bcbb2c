//! Dutch auction engine: creation, price decay, bid fulfillment and closure.

use cosmwasm_std::{Addr, Coin, Decimal, Event, Order, StdResult, Storage};
use cw_storage_plus::Bound;

use crate::error::{BidRejection, ContractError, Fault, ValidationError};
use crate::keepers::{send_or_fault, BankKeeper, BlockContext};
use crate::math;
use crate::state::{
    bids, Auction, Bid, CONFIG, ACTIVE_AUCTIONS, ACTIVE_AUCTION_BY_DENOM, ENDED_AUCTIONS,
    LAST_AUCTION_ID, LAST_BID_ID,
};

/// Chooses the decrease rate applied at each decay step.
pub trait DecayPolicy {
    fn next_rate(&self, auction: &Auction, height: u64) -> Decimal;
}

/// Keeps the rate an auction was created with.
pub struct FixedRate;

impl DecayPolicy for FixedRate {
    fn next_rate(&self, auction: &Auction, _height: u64) -> Decimal {
        auction.current_price_decrease_rate
    }
}

pub struct NewAuction {
    pub starting_tokens_for_sale: Coin,
    pub initial_unit_price_in_usomm: Decimal,
    pub initial_price_decrease_rate: Decimal,
    pub price_decrease_block_interval: u64,
    pub funding_module_account: Addr,
    pub proceeds_module_account: Addr,
}

/// Starts an auction at the current height. Fails if one is already active
/// for the same denom.
pub fn begin_auction(ctx: &mut BlockContext, request: NewAuction) -> Result<Auction, ContractError> {
    let config = CONFIG.load(ctx.storage)?;
    let denom = request.starting_tokens_for_sale.denom.clone();
    if ACTIVE_AUCTION_BY_DENOM.has(ctx.storage, &denom) {
        return Err(BidRejection::AuctionAlreadyActive { denom }.into());
    }

    let id = LAST_AUCTION_ID
        .may_load(ctx.storage)?
        .unwrap_or_default()
        .checked_add(1)
        .ok_or(Fault::Overflow {
            context: "auction id",
        })?;

    let auction = Auction {
        id,
        starting_tokens_for_sale: request.starting_tokens_for_sale.clone(),
        start_block: ctx.height,
        initial_price_decrease_rate: request.initial_price_decrease_rate,
        current_price_decrease_rate: request.initial_price_decrease_rate,
        price_decrease_block_interval: request.price_decrease_block_interval,
        initial_unit_price_in_usomm: request.initial_unit_price_in_usomm,
        current_unit_price_in_usomm: request.initial_unit_price_in_usomm,
        remaining_tokens_for_sale: request.starting_tokens_for_sale,
        funding_module_account: request.funding_module_account.to_string(),
        proceeds_module_account: request.proceeds_module_account.to_string(),
    };
    auction.validate_basic(&config.native_denom)?;

    ACTIVE_AUCTIONS.save(ctx.storage, id, &auction)?;
    ACTIVE_AUCTION_BY_DENOM.save(ctx.storage, &denom, &id)?;
    LAST_AUCTION_ID.save(ctx.storage, &id)?;
    Ok(auction)
}

pub fn auction_started_event(auction: &Auction) -> Event {
    Event::new("auction_started")
        .add_attribute("auction_id", auction.id.to_string())
        .add_attribute("tokens_for_sale", auction.starting_tokens_for_sale.to_string())
        .add_attribute(
            "unit_price_in_usomm",
            auction.initial_unit_price_in_usomm.to_string(),
        )
        .add_attribute("start_block", auction.start_block.to_string())
}

/// Applies one decay step to every active auction whose interval elapses at
/// this height.
pub fn decay_auction_prices(
    ctx: &mut BlockContext,
    policy: &dyn DecayPolicy,
) -> Result<Vec<Event>, ContractError> {
    let config = CONFIG.load(ctx.storage)?;
    let height = ctx.height;
    let due = ACTIVE_AUCTIONS
        .range(ctx.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, auction)| auction))
        .filter(|item| item.as_ref().map_or(true, |a| a.decays_at(height)))
        .collect::<StdResult<Vec<_>>>()?;

    let mut events = Vec::with_capacity(due.len());
    for mut auction in due {
        let rate = policy.next_rate(&auction, height);
        auction.current_price_decrease_rate = rate;
        auction.current_unit_price_in_usomm =
            math::decay(auction.current_unit_price_in_usomm, rate)?;
        auction.validate_basic(&config.native_denom)?;
        ACTIVE_AUCTIONS.save(ctx.storage, auction.id, &auction)?;

        events.push(
            Event::new("auction_price_decreased")
                .add_attribute("auction_id", auction.id.to_string())
                .add_attribute(
                    "unit_price_in_usomm",
                    auction.current_unit_price_in_usomm.to_string(),
                )
                .add_attribute("decrease_rate", rate.to_string()),
        );
    }
    Ok(events)
}

fn close_auction(storage: &mut dyn Storage, auction: &Auction) -> StdResult<()> {
    ACTIVE_AUCTIONS.remove(storage, auction.id);
    ACTIVE_AUCTION_BY_DENOM.remove(storage, auction.sale_denom());
    ENDED_AUCTIONS.save(storage, auction.id, auction)
}

/// Operator cancellation. Unsold tokens stay with the funding account.
pub fn cancel_auction(storage: &mut dyn Storage, auction_id: u32) -> Result<Auction, ContractError> {
    let auction = ACTIVE_AUCTIONS
        .may_load(storage, auction_id)?
        .ok_or(BidRejection::AuctionNotActive { auction_id })?;
    close_auction(storage, &auction)?;
    Ok(auction)
}

pub struct BidRequest {
    pub auction_id: u32,
    pub bidder: Addr,
    pub max_bid_in_usomm: Coin,
    pub sale_token_minimum_amount: Coin,
}

impl BidRequest {
    fn validate_basic(&self, native_denom: &str) -> Result<(), ValidationError> {
        if self.auction_id == 0 {
            return Err(ValidationError::AuctionIdMustBeNonZero {});
        }
        if self.max_bid_in_usomm.denom != native_denom {
            return Err(ValidationError::BidMustBeInNative {
                expected: native_denom.to_string(),
                denom: self.max_bid_in_usomm.denom.clone(),
            });
        }
        if self.max_bid_in_usomm.amount.is_zero() {
            return Err(ValidationError::AmountMustBePositive {
                field: "max_bid_in_usomm",
            });
        }
        if self.sale_token_minimum_amount.denom.is_empty() {
            return Err(ValidationError::DenomCannotBeEmpty {});
        }
        if self.sale_token_minimum_amount.amount.is_zero() {
            return Err(ValidationError::AmountMustBePositive {
                field: "sale_token_minimum_amount",
            });
        }
        Ok(())
    }
}

/// Fills as much of `request` as the current price and remaining supply allow.
///
/// Rejections leave storage and balances untouched. Once the bidder has paid,
/// a failure to deliver the sale tokens is a fault.
pub fn submit_bid(
    ctx: &mut BlockContext,
    bank: &mut dyn BankKeeper,
    request: BidRequest,
) -> Result<(Bid, Event), ContractError> {
    let config = CONFIG.load(ctx.storage)?;
    request.validate_basic(&config.native_denom)?;
    let auction_id = request.auction_id;

    let mut auction = ACTIVE_AUCTIONS
        .may_load(ctx.storage, auction_id)?
        .ok_or(BidRejection::AuctionNotActive { auction_id })?;

    if request.sale_token_minimum_amount.denom != auction.sale_denom() {
        return Err(BidRejection::DenomMismatch {
            auction_denom: auction.sale_denom().to_string(),
            bid_denom: request.sale_token_minimum_amount.denom,
        }
        .into());
    }

    let price = auction.current_unit_price_in_usomm;
    let affordable = math::div_floor(request.max_bid_in_usomm.amount, price)?;
    let fill = affordable.min(auction.remaining_tokens_for_sale.amount);
    if fill < request.sale_token_minimum_amount.amount {
        return Err(BidRejection::BelowMinimumFill {
            fill,
            minimum: request.sale_token_minimum_amount.amount,
        }
        .into());
    }
    let payment = math::mul_ceil(fill, price)?;

    let id = LAST_BID_ID
        .may_load(ctx.storage)?
        .unwrap_or_default()
        .checked_add(1)
        .ok_or(Fault::Overflow { context: "bid id" })?;
    let bid = Bid {
        id,
        auction_id,
        bidder: request.bidder,
        max_bid_in_usomm: request.max_bid_in_usomm,
        sale_token_minimum_amount: request.sale_token_minimum_amount,
        total_fulfilled_sale_tokens: Coin::new(fill.u128(), auction.sale_denom()),
        sale_token_unit_price_in_usomm: price,
        total_usomm_paid: Coin::new(payment.u128(), config.native_denom.as_str()),
        block_height: ctx.height,
    };
    bid.validate_basic(&config.native_denom)?;

    let funding = module_account(ctx, &auction, &auction.funding_module_account)?;
    let proceeds = module_account(ctx, &auction, &auction.proceeds_module_account)?;

    bank.send(&bid.bidder, &proceeds, bid.total_usomm_paid.clone())
        .map_err(|err| BidRejection::PaymentFailed {
            amount: payment,
            reason: err.to_string(),
        })?;
    send_or_fault(bank, &funding, &bid.bidder, bid.total_fulfilled_sale_tokens.clone())?;

    auction.remaining_tokens_for_sale.amount -= fill;
    if auction.is_sold_out() {
        close_auction(ctx.storage, &auction)?;
    } else {
        ACTIVE_AUCTIONS.save(ctx.storage, auction_id, &auction)?;
    }
    bids().save(ctx.storage, id, &bid)?;
    LAST_BID_ID.save(ctx.storage, &id)?;

    let event = Event::new("bid_fulfilled")
        .add_attribute("bid_id", id.to_string())
        .add_attribute("auction_id", auction_id.to_string())
        .add_attribute("bidder", bid.bidder.as_str())
        .add_attribute("fulfilled", bid.total_fulfilled_sale_tokens.to_string())
        .add_attribute("paid", bid.total_usomm_paid.to_string())
        .add_attribute("unit_price_in_usomm", price.to_string())
        .add_attribute(
            "remaining",
            auction.remaining_tokens_for_sale.amount.to_string(),
        )
        .add_attribute("closed", auction.is_sold_out().to_string());
    Ok((bid, event))
}

fn module_account(ctx: &BlockContext, auction: &Auction, raw: &str) -> Result<Addr, Fault> {
    ctx.api
        .addr_validate(raw)
        .map_err(|_| Fault::MalformedAccount {
            auction_id: auction.id,
            address: raw.to_string(),
        })
}

/// Bids placed on `auction_id`, ascending by bid id.
pub fn bids_by_auction(
    storage: &dyn Storage,
    auction_id: u32,
    start_after: Option<u64>,
    limit: usize,
) -> StdResult<Vec<Bid>> {
    bids()
        .idx
        .auction
        .prefix(auction_id)
        .range(storage, start_after.map(Bound::exclusive), None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, bid)| bid))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Config;
    use crate::testing::{accounts, MockBank, NATIVE, SALE_DENOM};
    use cosmwasm_std::testing::{MockApi, MockStorage};
    use cosmwasm_std::{coin, Uint128};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn setup(storage: &mut MockStorage) {
        CONFIG
            .save(
                storage,
                &Config {
                    native_denom: NATIVE.to_string(),
                    reward_collector: accounts().reward_collector,
                },
            )
            .unwrap();
    }

    fn new_auction(amount: u128) -> NewAuction {
        NewAuction {
            starting_tokens_for_sale: coin(amount, SALE_DENOM),
            initial_unit_price_in_usomm: dec("10"),
            initial_price_decrease_rate: dec("0.05"),
            price_decrease_block_interval: 50,
            funding_module_account: accounts().fee_pool,
            proceeds_module_account: accounts().reward_collector,
        }
    }

    fn bid_request(max_bid: u128, minimum: u128) -> BidRequest {
        BidRequest {
            auction_id: 1,
            bidder: Addr::unchecked("bidder"),
            max_bid_in_usomm: coin(max_bid, NATIVE),
            sale_token_minimum_amount: coin(minimum, SALE_DENOM),
        }
    }

    fn started(storage: &mut MockStorage, api: &MockApi, amount: u128) -> Auction {
        setup(storage);
        let mut ctx = BlockContext::new(storage, api, 100);
        begin_auction(&mut ctx, new_auction(amount)).unwrap()
    }

    fn decay_at(storage: &mut MockStorage, api: &MockApi, height: u64) {
        let mut ctx = BlockContext::new(storage, api, height);
        decay_auction_prices(&mut ctx, &FixedRate).unwrap();
    }

    fn active(storage: &MockStorage, id: u32) -> Auction {
        ACTIVE_AUCTIONS.load(storage, id).unwrap()
    }

    #[test]
    fn one_active_auction_per_denom() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        let auction = started(&mut storage, &api, 1_000);
        assert_eq!(auction.id, 1);
        assert_eq!(auction.current_unit_price_in_usomm, dec("10"));
        assert_eq!(auction.remaining_tokens_for_sale, coin(1_000, SALE_DENOM));

        let mut ctx = BlockContext::new(&mut storage, &api, 101);
        let err = begin_auction(&mut ctx, new_auction(5)).unwrap_err();
        assert_eq!(
            err,
            ContractError::Rejected(BidRejection::AuctionAlreadyActive {
                denom: SALE_DENOM.to_string()
            })
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn native_denom_cannot_be_auctioned() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        setup(&mut storage);
        let mut ctx = BlockContext::new(&mut storage, &api, 100);
        let request = NewAuction {
            starting_tokens_for_sale: coin(10, NATIVE),
            ..new_auction(10)
        };
        assert!(matches!(
            begin_auction(&mut ctx, request),
            Err(ContractError::Validation(_))
        ));
        assert!(ACTIVE_AUCTIONS.may_load(&storage, 1).unwrap().is_none());
    }

    #[test]
    fn price_decays_on_interval_heights_only() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 1_000);

        decay_at(&mut storage, &api, 100);
        decay_at(&mut storage, &api, 149);
        assert_eq!(active(&storage, 1).current_unit_price_in_usomm, dec("10"));

        decay_at(&mut storage, &api, 150);
        assert_eq!(active(&storage, 1).current_unit_price_in_usomm, dec("9.5"));

        decay_at(&mut storage, &api, 200);
        let auction = active(&storage, 1);
        assert_eq!(auction.current_unit_price_in_usomm, dec("9.025"));
        assert_eq!(auction.initial_unit_price_in_usomm, dec("10"));
        assert_eq!(
            auction.current_price_decrease_rate,
            auction.initial_price_decrease_rate
        );
    }

    #[test]
    fn price_never_increases_and_stays_positive() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 1_000);

        let mut last = active(&storage, 1).current_unit_price_in_usomm;
        for step in 1..=1_000u64 {
            decay_at(&mut storage, &api, 100 + step * 50);
            let price = active(&storage, 1).current_unit_price_in_usomm;
            assert!(price <= last);
            assert!(!price.is_zero());
            last = price;
        }
        assert_eq!(last, Decimal::raw(1));
    }

    struct Accelerating;

    impl DecayPolicy for Accelerating {
        fn next_rate(&self, auction: &Auction, _height: u64) -> Decimal {
            (auction.current_price_decrease_rate * Decimal::percent(200)).min(dec("0.5"))
        }
    }

    #[test]
    fn decay_policy_can_adapt_the_rate() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 1_000);

        let mut ctx = BlockContext::new(&mut storage, &api, 150);
        decay_auction_prices(&mut ctx, &Accelerating).unwrap();
        let auction = active(&storage, 1);
        assert_eq!(auction.current_price_decrease_rate, dec("0.1"));
        assert_eq!(auction.initial_price_decrease_rate, dec("0.05"));
        assert_eq!(auction.current_unit_price_in_usomm, dec("9"));
    }

    #[test]
    fn bid_fills_at_current_price() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 1_000);
        decay_at(&mut storage, &api, 150);

        let mut bank = MockBank::with_balances(&[
            ("fee_pool", coin(1_000, SALE_DENOM)),
            ("bidder", coin(95, NATIVE)),
        ]);
        let mut ctx = BlockContext::new(&mut storage, &api, 151);
        let (bid, _) = submit_bid(&mut ctx, &mut bank, bid_request(95, 9)).unwrap();

        assert_eq!(bid.id, 1);
        assert_eq!(bid.total_fulfilled_sale_tokens, coin(10, SALE_DENOM));
        assert_eq!(bid.total_usomm_paid, coin(95, NATIVE));
        assert_eq!(bid.sale_token_unit_price_in_usomm, dec("9.5"));
        assert_eq!(
            bid.total_usomm_paid.amount,
            math::mul_ceil(bid.total_fulfilled_sale_tokens.amount, bid.sale_token_unit_price_in_usomm)
                .unwrap()
        );

        assert_eq!(bank.amount("bidder", NATIVE), 0);
        assert_eq!(bank.amount("bidder", SALE_DENOM), 10);
        assert_eq!(bank.amount("reward_collector", NATIVE), 95);
        assert_eq!(bank.amount("fee_pool", SALE_DENOM), 990);
        assert_eq!(
            active(&storage, 1).remaining_tokens_for_sale.amount,
            Uint128::new(990)
        );
        assert_eq!(bids_by_auction(&storage, 1, None, 10).unwrap(), vec![bid]);
    }

    #[test]
    fn bid_below_minimum_changes_nothing() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 1_000);
        decay_at(&mut storage, &api, 150);
        let before = active(&storage, 1);

        let mut bank = MockBank::with_balances(&[
            ("fee_pool", coin(1_000, SALE_DENOM)),
            ("bidder", coin(95, NATIVE)),
        ]);
        let mut ctx = BlockContext::new(&mut storage, &api, 151);
        let err = submit_bid(&mut ctx, &mut bank, bid_request(95, 20)).unwrap_err();
        assert_eq!(
            err,
            ContractError::Rejected(BidRejection::BelowMinimumFill {
                fill: Uint128::new(10),
                minimum: Uint128::new(20),
            })
        );
        assert!(!err.is_fatal());

        assert_eq!(active(&storage, 1), before);
        assert_eq!(bank.amount("bidder", NATIVE), 95);
        assert_eq!(bank.amount("fee_pool", SALE_DENOM), 1_000);
        assert!(LAST_BID_ID.may_load(&storage).unwrap().is_none());
    }

    #[test]
    fn partial_fill_then_close() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 15);

        let mut bank = MockBank::with_balances(&[
            ("fee_pool", coin(15, SALE_DENOM)),
            ("bidder", coin(1_000, NATIVE)),
        ]);
        let mut ctx = BlockContext::new(&mut storage, &api, 101);
        let (first, _) = submit_bid(&mut ctx, &mut bank, bid_request(100, 1)).unwrap();
        assert_eq!(first.total_fulfilled_sale_tokens.amount, Uint128::new(10));

        // only 5 left, bidder could afford 50
        let mut ctx = BlockContext::new(&mut storage, &api, 102);
        let (second, event) = submit_bid(&mut ctx, &mut bank, bid_request(500, 1)).unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(second.total_fulfilled_sale_tokens.amount, Uint128::new(5));
        assert_eq!(second.total_usomm_paid.amount, Uint128::new(50));
        assert!(event
            .attributes
            .iter()
            .any(|a| a.key == "closed" && a.value == "true"));

        assert!(ACTIVE_AUCTIONS.may_load(&storage, 1).unwrap().is_none());
        assert!(!ACTIVE_AUCTION_BY_DENOM.has(&storage, SALE_DENOM));
        let ended = ENDED_AUCTIONS.load(&storage, 1).unwrap();
        assert!(ended.is_sold_out());
        assert_eq!(bank.amount("bidder", NATIVE), 850);

        let mut ctx = BlockContext::new(&mut storage, &api, 103);
        assert_eq!(
            submit_bid(&mut ctx, &mut bank, bid_request(100, 1)).unwrap_err(),
            ContractError::Rejected(BidRejection::AuctionNotActive { auction_id: 1 })
        );

        // the denom can be auctioned again under a fresh id
        let mut ctx = BlockContext::new(&mut storage, &api, 104);
        assert_eq!(begin_auction(&mut ctx, new_auction(3)).unwrap().id, 2);
    }

    #[test]
    fn huge_bid_at_floor_price_fills_remaining() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        setup(&mut storage);
        let mut ctx = BlockContext::new(&mut storage, &api, 100);
        begin_auction(
            &mut ctx,
            NewAuction {
                initial_unit_price_in_usomm: Decimal::raw(1),
                ..new_auction(1_000)
            },
        )
        .unwrap();

        let max_bid = 1_000_000_000_000_000_000_000u128;
        let mut bank = MockBank::with_balances(&[
            ("fee_pool", coin(1_000, SALE_DENOM)),
            ("bidder", coin(max_bid, NATIVE)),
        ]);
        let mut ctx = BlockContext::new(&mut storage, &api, 101);
        let (bid, _) = submit_bid(&mut ctx, &mut bank, bid_request(max_bid, 1)).unwrap();

        assert_eq!(bid.total_fulfilled_sale_tokens, coin(1_000, SALE_DENOM));
        assert_eq!(bid.total_usomm_paid, coin(1, NATIVE));
        assert_eq!(bank.amount("bidder", SALE_DENOM), 1_000);
        assert!(ENDED_AUCTIONS.has(&storage, 1));
    }

    #[test]
    fn malformed_bid_is_invalid() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 1_000);

        let mut bank = MockBank::default();
        let mut ctx = BlockContext::new(&mut storage, &api, 101);
        let request = BidRequest {
            max_bid_in_usomm: coin(100, "uatom"),
            ..bid_request(100, 1)
        };
        assert!(matches!(
            submit_bid(&mut ctx, &mut bank, request),
            Err(ContractError::Validation(ValidationError::BidMustBeInNative { .. }))
        ));
        assert!(matches!(
            submit_bid(&mut ctx, &mut bank, bid_request(100, 0)),
            Err(ContractError::Validation(ValidationError::AmountMustBePositive { .. }))
        ));
    }

    #[test]
    fn wrong_denom_is_rejected() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 1_000);

        let mut bank = MockBank::default();
        let mut ctx = BlockContext::new(&mut storage, &api, 101);
        let request = BidRequest {
            sale_token_minimum_amount: coin(1, "gravity0xdef"),
            ..bid_request(100, 1)
        };
        assert!(matches!(
            submit_bid(&mut ctx, &mut bank, request),
            Err(ContractError::Rejected(BidRejection::DenomMismatch { .. }))
        ));
    }

    #[test]
    fn bidder_without_funds_is_rejected_cleanly() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 1_000);

        let mut bank = MockBank::with_balances(&[("fee_pool", coin(1_000, SALE_DENOM))]);
        let mut ctx = BlockContext::new(&mut storage, &api, 101);
        let err = submit_bid(&mut ctx, &mut bank, bid_request(100, 1)).unwrap_err();
        assert!(matches!(
            err,
            ContractError::Rejected(BidRejection::PaymentFailed { .. })
        ));
        assert_eq!(bank.amount("fee_pool", SALE_DENOM), 1_000);
    }

    #[test]
    fn undeliverable_sale_tokens_are_a_fault() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 1_000);

        let mut bank = MockBank::with_balances(&[
            ("fee_pool", coin(1_000, SALE_DENOM)),
            ("bidder", coin(100, NATIVE)),
        ]);
        bank.frozen = Some(accounts().fee_pool);
        let mut ctx = BlockContext::new(&mut storage, &api, 101);
        let err = submit_bid(&mut ctx, &mut bank, bid_request(100, 1)).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn cancelled_auction_is_closed() {
        let mut storage = MockStorage::new();
        let api = MockApi::default();
        started(&mut storage, &api, 1_000);

        let cancelled = cancel_auction(&mut storage, 1).unwrap();
        assert_eq!(cancelled.remaining_tokens_for_sale.amount, Uint128::new(1_000));
        assert!(ENDED_AUCTIONS.has(&storage, 1));
        assert!(!ACTIVE_AUCTION_BY_DENOM.has(&storage, SALE_DENOM));
        assert_eq!(
            cancel_auction(&mut storage, 1).unwrap_err(),
            ContractError::Rejected(BidRejection::AuctionNotActive { auction_id: 1 })
        );
    }
}
