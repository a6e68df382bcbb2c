//! Validator price votes, ballot tallying and the finalized price store.

use std::collections::{BTreeMap, BTreeSet};

use cosmwasm_std::{Addr, Api, Decimal, Event, Order, StdResult, Storage};

use crate::error::{ContractError, Fault, ValidationError};
use crate::keepers::{BlockContext, StakingKeeper};
use crate::state::{
    AggregateExchangeRateVote, ExchangeRateTuple, ExchangeRateVote, ProposedTokenPrice,
    TokenPrice, AGGREGATE_VOTES, EXCHANGE_RATE_VOTES, PARAMS, PROPOSED_TOKEN_PRICES,
    TOKEN_PRICES,
};

/// One validator's rate for one denom, weighted for a single tally pass.
#[derive(Clone, Debug, PartialEq)]
pub struct VoteForTally {
    pub denom: String,
    pub exchange_rate: Decimal,
    pub voter: Addr,
    /// Weight in the median. Zero for abstentions.
    pub power: u64,
    /// The voter's full power, which counts toward quorum even when abstaining.
    pub consensus_power: u64,
}

impl VoteForTally {
    pub fn new(denom: String, exchange_rate: Decimal, voter: Addr, consensus_power: u64) -> Self {
        let power = if exchange_rate.is_zero() {
            0
        } else {
            consensus_power
        };
        VoteForTally {
            denom,
            exchange_rate,
            voter,
            power,
            consensus_power,
        }
    }
}

pub type Ballots = BTreeMap<String, Vec<VoteForTally>>;

/// Resolves a stored voter to an active validator. `None` for unknown,
/// unbonded or jailed voters.
fn resolve_voter(
    api: &dyn Api,
    staking: &dyn StakingKeeper,
    raw: &str,
) -> Result<Option<(Addr, u64)>, ContractError> {
    let voter = api.addr_validate(raw).map_err(|_| Fault::MalformedVoter {
        voter: raw.to_string(),
    })?;
    let validator = staking.validator(&voter)?.filter(|v| v.is_active());
    Ok(validator.map(|v| (voter, v.consensus_power)))
}

/// Collects every vote of the current period into one ballot per denom.
///
/// Aggregate votes come first in voter order, then individual votes from
/// validators that did not cast an accepted aggregate vote.
pub fn organize_ballot_by_denom(
    storage: &dyn Storage,
    api: &dyn Api,
    staking: &dyn StakingKeeper,
) -> Result<Ballots, ContractError> {
    let mut ballots = Ballots::new();
    let mut aggregate_voters = BTreeSet::new();

    let aggregate_votes = AGGREGATE_VOTES
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, vote)| vote));
    for vote in aggregate_votes {
        let vote = vote?;
        let Some((voter, power)) = resolve_voter(api, staking, &vote.voter)? else {
            continue;
        };
        aggregate_voters.insert(voter.clone());

        let mut seen = BTreeSet::new();
        let tuples = vote
            .exchange_rate_tuples
            .into_iter()
            .filter(|tuple| seen.insert(tuple.denom.clone()));
        for tuple in tuples {
            ballots
                .entry(tuple.denom.clone())
                .or_default()
                .push(VoteForTally::new(tuple.denom, tuple.exchange_rate, voter.clone(), power));
        }
    }

    let votes = EXCHANGE_RATE_VOTES
        .range(storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, vote)| vote));
    for vote in votes {
        let vote = vote?;
        let Some((voter, power)) = resolve_voter(api, staking, &vote.voter)? else {
            continue;
        };
        if aggregate_voters.contains(&voter) {
            continue;
        }
        ballots
            .entry(vote.denom.clone())
            .or_default()
            .push(VoteForTally::new(vote.denom, vote.exchange_rate, voter, power));
    }

    Ok(ballots)
}

/// Power-weighted median rate. Ties in rate are ordered by voter so every
/// replica picks the same vote.
pub fn weighted_median(ballot: &[VoteForTally]) -> Option<Decimal> {
    let mut sorted: Vec<&VoteForTally> = ballot.iter().filter(|v| v.power > 0).collect();
    sorted.sort_by(|a, b| {
        a.exchange_rate
            .cmp(&b.exchange_rate)
            .then_with(|| a.voter.cmp(&b.voter))
    });

    let total: u128 = sorted.iter().map(|v| u128::from(v.power)).sum();
    let mut pivot = 0u128;
    for vote in sorted {
        pivot += u128::from(vote.power);
        if pivot * 2 >= total {
            return Some(vote.exchange_rate);
        }
    }
    None
}

/// Whether the voters on `ballot` hold at least `threshold` of bonded power.
pub fn has_quorum(ballot: &[VoteForTally], total_bonded_power: u64, threshold: Decimal) -> bool {
    if total_bonded_power == 0 {
        return false;
    }
    let participating: u128 = ballot.iter().map(|v| u128::from(v.consensus_power)).sum();
    Decimal::from_ratio(participating, total_bonded_power) >= threshold
}

pub fn get_token_price(storage: &dyn Storage, denom: &str) -> StdResult<Option<TokenPrice>> {
    TOKEN_PRICES.may_load(storage, denom)
}

pub fn set_token_price(storage: &mut dyn Storage, price: &TokenPrice) -> Result<(), ContractError> {
    price.validate_basic()?;
    TOKEN_PRICES.save(storage, &price.denom, price)?;
    Ok(())
}

pub fn stage_proposed_price(
    storage: &mut dyn Storage,
    proposed: &ProposedTokenPrice,
) -> Result<(), ContractError> {
    proposed.validate_basic()?;
    PROPOSED_TOKEN_PRICES.save(storage, &proposed.denom, proposed)?;
    Ok(())
}

/// Ends a voting window: stages the median of every ballot that reached
/// quorum, drops staged prices whose ballot did not, promotes everything staged
/// to a finalized price and clears the window's votes.
pub fn tally_and_finalize(
    ctx: &mut BlockContext,
    staking: &dyn StakingKeeper,
) -> Result<Vec<Event>, ContractError> {
    let params = PARAMS.load(ctx.storage)?;
    if ctx.height % params.vote_period != 0 {
        return Ok(vec![]);
    }

    let ballots = organize_ballot_by_denom(ctx.storage, ctx.api, staking)?;
    let total_bonded_power = staking.total_bonded_power()?;
    let mut events = vec![];

    for (denom, ballot) in &ballots {
        let median = weighted_median(ballot)
            .filter(|_| has_quorum(ballot, total_bonded_power, params.vote_threshold));
        match median {
            Some(usd_price) => stage_proposed_price(
                ctx.storage,
                &ProposedTokenPrice {
                    denom: denom.clone(),
                    usd_price,
                },
            )?,
            None => {
                PROPOSED_TOKEN_PRICES.remove(ctx.storage, denom);
                events.push(
                    Event::new("ballot_failed")
                        .add_attribute("denom", denom)
                        .add_attribute("votes", ballot.len().to_string()),
                );
            }
        }
    }

    let proposed = PROPOSED_TOKEN_PRICES
        .range(ctx.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, price)| price))
        .collect::<StdResult<Vec<_>>>()?;
    for price in proposed {
        set_token_price(
            ctx.storage,
            &TokenPrice {
                denom: price.denom.clone(),
                usd_price: price.usd_price,
                last_updated_block: ctx.height,
            },
        )?;
        PROPOSED_TOKEN_PRICES.remove(ctx.storage, &price.denom);
        events.push(
            Event::new("token_price_updated")
                .add_attribute("denom", price.denom)
                .add_attribute("usd_price", price.usd_price.to_string())
                .add_attribute("height", ctx.height.to_string()),
        );
    }

    clear_votes(ctx.storage)?;
    Ok(events)
}

fn clear_votes(storage: &mut dyn Storage) -> StdResult<()> {
    let aggregate_voters = AGGREGATE_VOTES
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for voter in aggregate_voters {
        AGGREGATE_VOTES.remove(storage, voter.as_str());
    }

    let votes = EXCHANGE_RATE_VOTES
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    for (voter, denom) in votes {
        EXCHANGE_RATE_VOTES.remove(storage, (voter.as_str(), denom.as_str()));
    }
    Ok(())
}

fn ensure_validator(staking: &dyn StakingKeeper, voter: &Addr) -> Result<(), ContractError> {
    match staking.validator(voter)? {
        Some(_) => Ok(()),
        None => Err(ValidationError::UnknownValidator {
            voter: voter.to_string(),
        }
        .into()),
    }
}

/// Records `voter`'s rates for every listed denom, replacing its previous
/// aggregate vote in this window.
pub fn submit_aggregate_vote(
    storage: &mut dyn Storage,
    staking: &dyn StakingKeeper,
    voter: &Addr,
    exchange_rate_tuples: Vec<ExchangeRateTuple>,
) -> Result<(), ContractError> {
    ensure_validator(staking, voter)?;
    if exchange_rate_tuples.is_empty() {
        return Err(ValidationError::EmptyVote {}.into());
    }
    let mut denoms = BTreeSet::new();
    for tuple in &exchange_rate_tuples {
        if tuple.denom.is_empty() {
            return Err(ValidationError::DenomCannotBeEmpty {}.into());
        }
        if !denoms.insert(tuple.denom.as_str()) {
            return Err(ValidationError::DuplicateVoteDenom {
                denom: tuple.denom.clone(),
            }
            .into());
        }
    }

    let vote = AggregateExchangeRateVote {
        voter: voter.to_string(),
        exchange_rate_tuples,
    };
    AGGREGATE_VOTES.save(storage, voter.as_str(), &vote)?;
    Ok(())
}

pub fn submit_exchange_rate_vote(
    storage: &mut dyn Storage,
    staking: &dyn StakingKeeper,
    voter: &Addr,
    denom: String,
    exchange_rate: Decimal,
) -> Result<(), ContractError> {
    ensure_validator(staking, voter)?;
    if denom.is_empty() {
        return Err(ValidationError::DenomCannotBeEmpty {}.into());
    }

    let vote = ExchangeRateVote {
        voter: voter.to_string(),
        denom,
        exchange_rate,
    };
    EXCHANGE_RATE_VOTES.save(storage, (voter.as_str(), vote.denom.as_str()), &vote)?;
    Ok(())
}
