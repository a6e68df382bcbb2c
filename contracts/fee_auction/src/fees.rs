//! Per-block handling of the fee pool: reward emission and auction triggers.

use cosmwasm_std::{Coin, Decimal256, Event, StdResult, Storage, Uint128};

use crate::auction::{auction_started_event, begin_auction, NewAuction};
use crate::error::ContractError;
use crate::keepers::{send_or_fault, BankKeeper, BlockContext, ModuleAccounts};
use crate::math;
use crate::oracle::get_token_price;
use crate::state::{ACTIVE_AUCTION_BY_DENOM, CONFIG, LAST_REWARD_SUPPLY_PEAK, PARAMS};

/// Per-block emission for `remaining_supply`. Emissions are a constant share
/// of the highest supply seen in the current cycle, so the pool drains
/// linearly, and never exceed what is left.
pub fn get_emission(
    storage: &mut dyn Storage,
    remaining_supply: Uint128,
    emission_period: u64,
) -> StdResult<Uint128> {
    let previous_peak = LAST_REWARD_SUPPLY_PEAK
        .may_load(storage)?
        .unwrap_or_default();

    let peak = if remaining_supply > previous_peak {
        LAST_REWARD_SUPPLY_PEAK.save(storage, &remaining_supply)?;
        remaining_supply
    } else {
        previous_peak
    };

    let emission = peak.checked_div(Uint128::from(emission_period))?;
    Ok(emission.min(remaining_supply))
}

/// Moves this block's emission from the fee pool to the reward collector.
pub fn handle_reward_emission(
    ctx: &mut BlockContext,
    bank: &mut dyn BankKeeper,
    accounts: &ModuleAccounts,
) -> Result<Vec<Event>, ContractError> {
    let config = CONFIG.load(ctx.storage)?;
    let params = PARAMS.load(ctx.storage)?;

    let remaining = bank.balance(&accounts.fee_pool, &config.native_denom)?;
    if remaining.is_zero() {
        return Ok(vec![]);
    }

    let emission = get_emission(ctx.storage, remaining, params.reward_emission_period)?;
    if emission.is_zero() {
        return Ok(vec![]);
    }

    send_or_fault(
        bank,
        &accounts.fee_pool,
        &accounts.reward_collector,
        Coin::new(emission.u128(), config.native_denom.as_str()),
    )?;

    // pool drained, next deposit starts a new cycle
    if emission == remaining {
        LAST_REWARD_SUPPLY_PEAK.save(ctx.storage, &Uint128::zero())?;
    }

    Ok(vec![Event::new("reward_emission")
        .add_attribute("amount", emission)
        .add_attribute("denom", config.native_denom)
        .add_attribute("remaining", remaining - emission)
        .add_attribute("recipient", accounts.reward_collector.as_str())])
}

/// Starts an auction for every non-native fee balance worth at least the
/// configured USD threshold. Runs every `auction_interval` blocks.
pub fn handle_fee_auctions(
    ctx: &mut BlockContext,
    bank: &dyn BankKeeper,
    accounts: &ModuleAccounts,
) -> Result<Vec<Event>, ContractError> {
    let config = CONFIG.load(ctx.storage)?;
    let params = PARAMS.load(ctx.storage)?;
    if ctx.height % params.auction_interval != 0 {
        return Ok(vec![]);
    }

    let threshold = Decimal256::from(params.auction_threshold_usd_value);
    let native_price = get_token_price(ctx.storage, &config.native_denom)?;
    let mut events = vec![];

    let balances = bank
        .all_balances(&accounts.fee_pool)?
        .into_iter()
        .filter(|balance| balance.denom != config.native_denom)
        .filter(|balance| !balance.amount.is_zero());

    for balance in balances {
        let Some(token_price) = get_token_price(ctx.storage, &balance.denom)? else {
            continue;
        };

        let usd_value = math::usd_value(balance.amount, token_price.usd_price)?;
        if usd_value < threshold {
            continue;
        }

        if ACTIVE_AUCTION_BY_DENOM.has(ctx.storage, &balance.denom) {
            continue;
        }

        let Some(native_price) = &native_price else {
            events.push(deferred_event(&balance, "no native token price"));
            continue;
        };
        let Ok(unit_price) = token_price.usd_price.checked_div(native_price.usd_price) else {
            events.push(deferred_event(&balance, "unit price out of range"));
            continue;
        };
        if unit_price.is_zero() {
            events.push(deferred_event(&balance, "unit price rounds to zero"));
            continue;
        }

        let auction = begin_auction(
            ctx,
            NewAuction {
                starting_tokens_for_sale: balance,
                initial_unit_price_in_usomm: unit_price,
                initial_price_decrease_rate: params.initial_price_decrease_rate,
                price_decrease_block_interval: params.price_decrease_block_interval,
                funding_module_account: accounts.fee_pool.clone(),
                proceeds_module_account: accounts.reward_collector.clone(),
            },
        )?;
        events.push(auction_started_event(&auction).add_attribute("usd_value", usd_value.to_string()));
    }

    Ok(events)
}

fn deferred_event(balance: &Coin, reason: &str) -> Event {
    Event::new("auction_deferred")
        .add_attribute("denom", &balance.denom)
        .add_attribute("amount", balance.amount)
        .add_attribute("reason", reason)
}
