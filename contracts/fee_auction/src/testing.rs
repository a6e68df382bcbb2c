use std::collections::BTreeMap;

use cosmwasm_std::{coin, Addr, Coin, StdError, StdResult, Uint128};

use crate::keepers::{BankKeeper, ModuleAccounts};

pub const NATIVE: &str = "usomm";
pub const SALE_DENOM: &str = "gravity0xABC";

pub fn accounts() -> ModuleAccounts {
    ModuleAccounts {
        fee_pool: Addr::unchecked("fee_pool"),
        reward_collector: Addr::unchecked("reward_collector"),
    }
}

/// In-memory ledger with an optional account whose outgoing sends fail.
#[derive(Default)]
pub struct MockBank {
    balances: BTreeMap<String, BTreeMap<String, Uint128>>,
    pub frozen: Option<Addr>,
}

impl MockBank {
    pub fn with_balances(balances: &[(&str, Coin)]) -> Self {
        let mut bank = MockBank::default();
        for (account, amount) in balances {
            bank.mint(&Addr::unchecked(*account), amount.clone());
        }
        bank
    }

    pub fn mint(&mut self, account: &Addr, amount: Coin) {
        *self
            .balances
            .entry(account.to_string())
            .or_default()
            .entry(amount.denom)
            .or_default() += amount.amount;
    }

    pub fn amount(&self, account: &str, denom: &str) -> u128 {
        self.balance(&Addr::unchecked(account), denom).unwrap().u128()
    }
}

impl BankKeeper for MockBank {
    fn balance(&self, account: &Addr, denom: &str) -> StdResult<Uint128> {
        Ok(self
            .balances
            .get(account.as_str())
            .and_then(|coins| coins.get(denom))
            .copied()
            .unwrap_or_default())
    }

    fn all_balances(&self, account: &Addr) -> StdResult<Vec<Coin>> {
        Ok(self
            .balances
            .get(account.as_str())
            .map(|coins| {
                coins
                    .iter()
                    .filter(|(_, amount)| !amount.is_zero())
                    .map(|(denom, amount)| coin(amount.u128(), denom))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn send(&mut self, from: &Addr, to: &Addr, amount: Coin) -> StdResult<()> {
        if self.frozen.as_ref() == Some(from) {
            return Err(StdError::generic_err(format!("{from} is frozen")));
        }
        let available = self.balance(from, &amount.denom)?;
        let left = available
            .checked_sub(amount.amount)
            .map_err(|_| StdError::generic_err(format!("insufficient funds: {available}")))?;
        self.balances
            .entry(from.to_string())
            .or_default()
            .insert(amount.denom.clone(), left);
        self.mint(to, amount);
        Ok(())
    }
}
