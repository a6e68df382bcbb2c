//! Keeper implementations backed by the CosmWasm host.
//!
//! The contract account is the fee pool. Outgoing transfers become `BankMsg`s
//! that the host executes after the entry point returns; the whole transaction
//! reverts if any of them fails, so a call either moves every coin or none.

use std::collections::BTreeMap;

use cosmwasm_std::{
    coin, Addr, BankMsg, Coin, Order, QuerierWrapper, StdError, StdResult, Storage, Uint128,
};

use crate::keepers::{BankKeeper, StakingKeeper};
use crate::state::{ValidatorInfo, VALIDATORS};

pub struct ContractBank<'a> {
    querier: QuerierWrapper<'a>,
    contract: Addr,
    /// Sender of the current message and the funds it attached.
    payer: Option<(Addr, Vec<Coin>)>,
    /// Amounts already committed out of the contract in this call, by denom.
    outflows: BTreeMap<String, Uint128>,
    messages: Vec<BankMsg>,
}

impl<'a> ContractBank<'a> {
    pub fn new(querier: QuerierWrapper<'a>, contract: Addr) -> Self {
        ContractBank {
            querier,
            contract,
            payer: None,
            outflows: BTreeMap::new(),
            messages: vec![],
        }
    }

    /// Funds attached to the message, spendable on behalf of `payer`.
    pub fn with_payer(mut self, payer: Addr, funds: Vec<Coin>) -> Self {
        self.payer = Some((payer, funds));
        self
    }

    /// Pending transfers, followed by a refund of whatever the payer did not
    /// spend.
    pub fn into_messages(self) -> Vec<BankMsg> {
        let mut messages = self.messages;
        if let Some((payer, funds)) = self.payer {
            let refund: Vec<Coin> = funds.into_iter().filter(|c| !c.amount.is_zero()).collect();
            if !refund.is_empty() {
                messages.push(BankMsg::Send {
                    to_address: payer.to_string(),
                    amount: refund,
                });
            }
        }
        messages
    }

    fn committed(&self, denom: &str) -> Uint128 {
        self.outflows.get(denom).copied().unwrap_or_default()
    }

    fn push_send(&mut self, to: &Addr, amount: Coin) {
        if *to != self.contract {
            self.messages.push(BankMsg::Send {
                to_address: to.to_string(),
                amount: vec![amount],
            });
        }
    }
}

impl<'a> BankKeeper for ContractBank<'a> {
    fn balance(&self, account: &Addr, denom: &str) -> StdResult<Uint128> {
        let queried = self.querier.query_balance(account, denom)?.amount;
        if *account == self.contract {
            return Ok(queried.saturating_sub(self.committed(denom)));
        }
        Ok(queried)
    }

    fn all_balances(&self, account: &Addr) -> StdResult<Vec<Coin>> {
        let mut balances = self.querier.query_all_balances(account)?;
        if *account == self.contract {
            balances = balances
                .into_iter()
                .map(|c| coin(c.amount.saturating_sub(self.committed(&c.denom)).u128(), c.denom))
                .filter(|c| !c.amount.is_zero())
                .collect();
        }
        balances.sort_by(|a, b| a.denom.cmp(&b.denom));
        Ok(balances)
    }

    fn send(&mut self, from: &Addr, to: &Addr, amount: Coin) -> StdResult<()> {
        if amount.amount.is_zero() {
            return Ok(());
        }

        if *from == self.contract {
            let available = self.balance(from, &amount.denom)?;
            if available < amount.amount {
                return Err(StdError::generic_err(format!(
                    "insufficient funds: {available}{} available",
                    amount.denom
                )));
            }
            *self.outflows.entry(amount.denom.clone()).or_default() += amount.amount;
            self.push_send(to, amount);
            return Ok(());
        }

        let escrow = match &mut self.payer {
            Some((payer, funds)) if *payer == *from => funds
                .iter_mut()
                .find(|c| c.denom == amount.denom)
                .filter(|c| c.amount >= amount.amount),
            _ => {
                return Err(StdError::generic_err(format!(
                    "cannot move funds of {from}"
                )))
            }
        };
        match escrow {
            Some(escrow) => {
                escrow.amount -= amount.amount;
                self.push_send(to, amount);
                Ok(())
            }
            None => Err(StdError::generic_err(format!(
                "insufficient funds attached for {}{}",
                amount.amount, amount.denom
            ))),
        }
    }
}

/// Validator statuses pushed by the host through sudo, read once per call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidatorSet {
    validators: BTreeMap<String, ValidatorInfo>,
}

impl ValidatorSet {
    pub fn load(storage: &dyn Storage) -> StdResult<Self> {
        let validators = VALIDATORS
            .range(storage, None, None, Order::Ascending)
            .collect::<StdResult<BTreeMap<_, _>>>()?;
        Ok(ValidatorSet { validators })
    }

    pub fn from_validators(validators: impl IntoIterator<Item = ValidatorInfo>) -> Self {
        ValidatorSet {
            validators: validators
                .into_iter()
                .map(|v| (v.operator.clone(), v))
                .collect(),
        }
    }
}

impl StakingKeeper for ValidatorSet {
    fn validator(&self, operator: &Addr) -> StdResult<Option<ValidatorInfo>> {
        Ok(self.validators.get(operator.as_str()).cloned())
    }

    fn total_bonded_power(&self) -> StdResult<u64> {
        self.validators
            .values()
            .filter(|v| v.is_active())
            .try_fold(0u64, |total, v| total.checked_add(v.consensus_power))
            .ok_or_else(|| StdError::generic_err("total bonded power overflows u64"))
    }
}
