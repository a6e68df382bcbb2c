//! Start-of-block transition.

use cosmwasm_std::Event;

use crate::auction::{decay_auction_prices, DecayPolicy};
use crate::error::ContractError;
use crate::fees::{handle_fee_auctions, handle_reward_emission};
use crate::keepers::{BankKeeper, BlockContext, ModuleAccounts, StakingKeeper};
use crate::oracle::tally_and_finalize;

/// Runs the per-block steps in a fixed order: oracle tally, reward emission,
/// auction trigger, price decay. An auction started at this height is not
/// decayed until its first interval elapses.
pub fn begin_block(
    ctx: &mut BlockContext,
    bank: &mut dyn BankKeeper,
    staking: &dyn StakingKeeper,
    accounts: &ModuleAccounts,
    policy: &dyn DecayPolicy,
) -> Result<Vec<Event>, ContractError> {
    let mut events = tally_and_finalize(ctx, staking)?;
    events.extend(handle_reward_emission(ctx, bank, accounts)?);
    events.extend(handle_fee_auctions(ctx, bank, accounts)?);
    events.extend(decay_auction_prices(ctx, policy)?);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::FixedRate;
    use crate::host::ValidatorSet;
    use crate::oracle::{get_token_price, submit_aggregate_vote};
    use crate::state::{
        Config, ExchangeRateTuple, Params, ValidatorInfo, ACTIVE_AUCTIONS, CONFIG, PARAMS,
    };
    use crate::testing::{accounts, MockBank, NATIVE, SALE_DENOM};
    use cosmwasm_std::testing::{MockApi, MockStorage};
    use cosmwasm_std::{coin, Addr, Decimal};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn validators() -> ValidatorSet {
        ValidatorSet::from_validators(vec![ValidatorInfo {
            operator: "val1".to_string(),
            bonded: true,
            jailed: false,
            consensus_power: 100,
        }])
    }

    fn setup() -> MockStorage {
        let mut storage = MockStorage::new();
        CONFIG
            .save(
                &mut storage,
                &Config {
                    native_denom: NATIVE.to_string(),
                    reward_collector: accounts().reward_collector,
                },
            )
            .unwrap();
        PARAMS
            .save(
                &mut storage,
                &Params {
                    auction_interval: 10,
                    auction_threshold_usd_value: dec("100000"),
                    price_decrease_block_interval: 10,
                    reward_emission_period: 10,
                    vote_period: 5,
                    ..Params::default()
                },
            )
            .unwrap();
        storage
    }

    fn run(storage: &mut MockStorage, bank: &mut MockBank, height: u64) -> Vec<Event> {
        let api = MockApi::default();
        let mut ctx = BlockContext::new(storage, &api, height);
        begin_block(&mut ctx, bank, &validators(), &accounts(), &FixedRate).unwrap()
    }

    #[test]
    fn prices_finalized_in_the_same_block_feed_the_trigger() {
        let mut storage = setup();
        let mut bank = MockBank::with_balances(&[("fee_pool", coin(1_000_000, SALE_DENOM))]);
        submit_aggregate_vote(
            &mut storage,
            &validators(),
            &Addr::unchecked("val1"),
            vec![
                ExchangeRateTuple {
                    denom: SALE_DENOM.to_string(),
                    exchange_rate: dec("0.5"),
                },
                ExchangeRateTuple {
                    denom: NATIVE.to_string(),
                    exchange_rate: dec("0.05"),
                },
            ],
        )
        .unwrap();

        let events = run(&mut storage, &mut bank, 10);
        let kinds: Vec<&str> = events.iter().map(|e| e.ty.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["token_price_updated", "token_price_updated", "auction_started"]
        );
        assert_eq!(
            get_token_price(&storage, SALE_DENOM).unwrap().unwrap().last_updated_block,
            10
        );

        let auction = ACTIVE_AUCTIONS.load(&storage, 1).unwrap();
        assert_eq!(auction.current_unit_price_in_usomm, dec("10"));

        // first decay one interval later
        run(&mut storage, &mut bank, 15);
        let auction = ACTIVE_AUCTIONS.load(&storage, 1).unwrap();
        assert_eq!(auction.current_unit_price_in_usomm, dec("10"));
        run(&mut storage, &mut bank, 20);
        let auction = ACTIVE_AUCTIONS.load(&storage, 1).unwrap();
        assert_eq!(auction.current_unit_price_in_usomm, dec("9.5"));
    }

    #[test]
    fn emission_runs_every_block() {
        let mut storage = setup();
        let mut bank = MockBank::with_balances(&[("fee_pool", coin(1_000, NATIVE))]);

        for height in 1..=3 {
            run(&mut storage, &mut bank, height);
        }
        assert_eq!(bank.amount("reward_collector", NATIVE), 300);
    }

    #[test]
    fn faults_abort_the_block() {
        let mut storage = setup();
        let mut bank = MockBank::with_balances(&[("fee_pool", coin(1_000, NATIVE))]);
        bank.frozen = Some(accounts().fee_pool);

        let api = MockApi::default();
        let mut ctx = BlockContext::new(&mut storage, &api, 1);
        let err = begin_block(&mut ctx, &mut bank, &validators(), &accounts(), &FixedRate)
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
