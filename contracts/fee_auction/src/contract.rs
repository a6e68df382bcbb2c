#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Binary, Deps, DepsMut, Env, Event, MessageInfo, Order, Response, StdResult,
};
use cw2::set_contract_version;
use cw_storage_plus::Bound;
use cw_utils::{must_pay, nonpayable};

use crate::abci::begin_block;
use crate::auction::{bids_by_auction, cancel_auction, submit_bid, BidRequest, FixedRate};
use crate::error::{ContractError, ValidationError};
use crate::host::{ContractBank, ValidatorSet};
use crate::keepers::{BlockContext, ModuleAccounts, StakingKeeper};
use crate::msg::{
    AuctionsResponse, BidsResponse, ExecuteMsg, InstantiateMsg, QueryMsg, SubmitBidResponse,
    SudoMsg, TokenPricesResponse,
};
use crate::oracle::{stage_proposed_price, submit_aggregate_vote, submit_exchange_rate_vote};
use crate::state::{
    bids, Config, ExchangeRateTuple, Params, ProposedTokenPrice, ValidatorInfo, ACTIVE_AUCTIONS,
    CONFIG, ENDED_AUCTIONS, LAST_REWARD_SUPPLY_PEAK, PARAMS, TOKEN_PRICES, VALIDATORS,
};

const CONTRACT_NAME: &str = "crates.io:fee_auction";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LIMIT: u32 = 30;
const MAX_LIMIT: u32 = 100;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.native_denom.is_empty() {
        return Err(ValidationError::DenomCannotBeEmpty {}.into());
    }
    let reward_collector = deps
        .api
        .addr_validate(&msg.reward_collector)
        .map_err(|_| ValidationError::InvalidAddress {
            address: msg.reward_collector.clone(),
        })?;
    let params = msg.params.unwrap_or_default();
    params.validate()?;

    let config = Config {
        native_denom: msg.native_denom,
        reward_collector,
    };
    CONFIG.save(deps.storage, &config)?;
    PARAMS.save(deps.storage, &params)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("creator", info.sender)
        .add_attribute("native_denom", config.native_denom)
        .add_attribute("reward_collector", config.reward_collector))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::SubmitBid {
            auction_id,
            sale_token_minimum_amount,
        } => execute_submit_bid(deps, env, info, auction_id, sale_token_minimum_amount),
        ExecuteMsg::AggregateExchangeRateVote { exchange_rates } => {
            execute_aggregate_vote(deps, info, exchange_rates)
        }
        ExecuteMsg::ExchangeRateVote {
            denom,
            exchange_rate,
        } => execute_exchange_rate_vote(deps, info, denom, exchange_rate),
    }
}

pub fn execute_submit_bid(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    auction_id: u32,
    sale_token_minimum_amount: cosmwasm_std::Coin,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let max_bid = must_pay(&info, &config.native_denom)?;

    let mut bank = ContractBank::new(deps.querier, env.contract.address)
        .with_payer(info.sender.clone(), info.funds);
    let mut ctx = BlockContext::new(deps.storage, deps.api, env.block.height);
    let (bid, event) = submit_bid(
        &mut ctx,
        &mut bank,
        BidRequest {
            auction_id,
            bidder: info.sender,
            max_bid_in_usomm: cosmwasm_std::coin(max_bid.u128(), config.native_denom),
            sale_token_minimum_amount,
        },
    )?;

    Ok(Response::new()
        .add_messages(bank.into_messages())
        .add_event(event)
        .add_attribute("method", "submit_bid")
        .add_attribute("bid_id", bid.id.to_string())
        .set_data(to_json_binary(&SubmitBidResponse { bid })?))
}

pub fn execute_aggregate_vote(
    deps: DepsMut,
    info: MessageInfo,
    exchange_rates: Vec<ExchangeRateTuple>,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let validators = ValidatorSet::load(deps.storage)?;
    let denoms = exchange_rates.len();
    submit_aggregate_vote(deps.storage, &validators, &info.sender, exchange_rates)?;

    Ok(Response::new()
        .add_attribute("method", "aggregate_exchange_rate_vote")
        .add_attribute("voter", info.sender)
        .add_attribute("denoms", denoms.to_string()))
}

pub fn execute_exchange_rate_vote(
    deps: DepsMut,
    info: MessageInfo,
    denom: String,
    exchange_rate: cosmwasm_std::Decimal,
) -> Result<Response, ContractError> {
    nonpayable(&info)?;
    let validators = ValidatorSet::load(deps.storage)?;
    submit_exchange_rate_vote(
        deps.storage,
        &validators,
        &info.sender,
        denom.clone(),
        exchange_rate,
    )?;

    Ok(Response::new()
        .add_attribute("method", "exchange_rate_vote")
        .add_attribute("voter", info.sender)
        .add_attribute("denom", denom)
        .add_attribute("exchange_rate", exchange_rate.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn sudo(deps: DepsMut, env: Env, msg: SudoMsg) -> Result<Response, ContractError> {
    match msg {
        SudoMsg::BeginBlock {} => sudo_begin_block(deps, env),
        SudoMsg::UpdateParams { params } => sudo_update_params(deps, params),
        SudoMsg::SetValidators { validators } => sudo_set_validators(deps, validators),
        SudoMsg::ProposeTokenPrices { prices } => sudo_propose_token_prices(deps, prices),
        SudoMsg::CancelAuction { auction_id } => {
            let auction = cancel_auction(deps.storage, auction_id)?;
            Ok(Response::new()
                .add_attribute("method", "cancel_auction")
                .add_event(
                    Event::new("auction_cancelled")
                        .add_attribute("auction_id", auction.id.to_string())
                        .add_attribute("unsold", auction.remaining_tokens_for_sale.to_string()),
                ))
        }
    }
}

pub fn sudo_begin_block(deps: DepsMut, env: Env) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let validators = ValidatorSet::load(deps.storage)?;
    let accounts = ModuleAccounts {
        fee_pool: env.contract.address.clone(),
        reward_collector: config.reward_collector,
    };

    let mut bank = ContractBank::new(deps.querier, env.contract.address);
    let mut ctx = BlockContext::new(deps.storage, deps.api, env.block.height);
    let events = begin_block(&mut ctx, &mut bank, &validators, &accounts, &FixedRate)?;

    Ok(Response::new()
        .add_messages(bank.into_messages())
        .add_events(events)
        .add_attribute("method", "begin_block")
        .add_attribute("height", env.block.height.to_string()))
}

pub fn sudo_update_params(deps: DepsMut, params: Params) -> Result<Response, ContractError> {
    params.validate()?;
    PARAMS.save(deps.storage, &params)?;
    Ok(Response::new().add_attribute("method", "update_params"))
}

/// Replaces the stored validator snapshot wholesale.
pub fn sudo_set_validators(
    deps: DepsMut,
    validators: Vec<ValidatorInfo>,
) -> Result<Response, ContractError> {
    for validator in &validators {
        deps.api
            .addr_validate(&validator.operator)
            .map_err(|_| ValidationError::InvalidAddress {
                address: validator.operator.clone(),
            })?;
    }
    ValidatorSet::from_validators(validators.iter().cloned()).total_bonded_power()?;

    let existing = VALIDATORS
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for operator in existing {
        VALIDATORS.remove(deps.storage, &operator);
    }
    for validator in &validators {
        VALIDATORS.save(deps.storage, &validator.operator, validator)?;
    }

    Ok(Response::new()
        .add_attribute("method", "set_validators")
        .add_attribute("count", validators.len().to_string()))
}

pub fn sudo_propose_token_prices(
    deps: DepsMut,
    prices: Vec<ProposedTokenPrice>,
) -> Result<Response, ContractError> {
    for price in &prices {
        stage_proposed_price(deps.storage, price)?;
    }
    Ok(Response::new()
        .add_attribute("method", "propose_token_prices")
        .add_attribute("count", prices.len().to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Params {} => to_json_binary(&PARAMS.load(deps.storage)?),
        QueryMsg::Config {} => to_json_binary(&CONFIG.load(deps.storage)?),
        QueryMsg::TokenPrice { denom } => to_json_binary(&TOKEN_PRICES.load(deps.storage, &denom)?),
        QueryMsg::TokenPrices { start_after, limit } => {
            to_json_binary(&query_token_prices(deps, start_after, limit)?)
        }
        QueryMsg::ActiveAuction { auction_id } => {
            to_json_binary(&ACTIVE_AUCTIONS.load(deps.storage, auction_id)?)
        }
        QueryMsg::ActiveAuctions { start_after, limit } => {
            to_json_binary(&query_active_auctions(deps, start_after, limit)?)
        }
        QueryMsg::EndedAuction { auction_id } => {
            to_json_binary(&ENDED_AUCTIONS.load(deps.storage, auction_id)?)
        }
        QueryMsg::Bid { bid_id } => to_json_binary(&bids().load(deps.storage, bid_id)?),
        QueryMsg::BidsByAuction {
            auction_id,
            start_after,
            limit,
        } => to_json_binary(&BidsResponse {
            bids: bids_by_auction(deps.storage, auction_id, start_after, page_size(limit))?,
        }),
        QueryMsg::LastRewardSupplyPeak {} => to_json_binary(
            &LAST_REWARD_SUPPLY_PEAK
                .may_load(deps.storage)?
                .unwrap_or_default(),
        ),
    }
}

fn page_size(limit: Option<u32>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize
}

fn query_token_prices(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<TokenPricesResponse> {
    let start = start_after.as_deref().map(Bound::exclusive);
    let token_prices = TOKEN_PRICES
        .range(deps.storage, start, None, Order::Ascending)
        .take(page_size(limit))
        .map(|item| item.map(|(_, price)| price))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(TokenPricesResponse { token_prices })
}

fn query_active_auctions(
    deps: Deps,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<AuctionsResponse> {
    let auctions = ACTIVE_AUCTIONS
        .range(
            deps.storage,
            start_after.map(Bound::exclusive),
            None,
            Order::Ascending,
        )
        .take(page_size(limit))
        .map(|item| item.map(|(_, auction)| auction))
        .collect::<StdResult<Vec<_>>>()?;
    Ok(AuctionsResponse { auctions })
}
