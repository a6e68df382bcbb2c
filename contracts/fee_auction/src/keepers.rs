//! Capabilities the core consumes from the surrounding ledger, and the block
//! context every core operation receives explicitly.

use cosmwasm_std::{Addr, Api, Coin, StdResult, Storage, Uint128};

use crate::error::Fault;
use crate::state::ValidatorInfo;

/// Balances and transfers. Each `send` moves one coin atomically: it either
/// fully applies or leaves every balance untouched.
pub trait BankKeeper {
    fn balance(&self, account: &Addr, denom: &str) -> StdResult<Uint128>;

    /// Every non-zero balance of `account`, ordered by denom.
    fn all_balances(&self, account: &Addr) -> StdResult<Vec<Coin>>;

    fn send(&mut self, from: &Addr, to: &Addr, amount: Coin) -> StdResult<()>;
}

pub trait StakingKeeper {
    fn validator(&self, operator: &Addr) -> StdResult<Option<ValidatorInfo>>;

    /// Sum of consensus power over bonded, unjailed validators.
    fn total_bonded_power(&self) -> StdResult<u64>;
}

/// State visible to one step of the block transition.
pub struct BlockContext<'a> {
    pub storage: &'a mut dyn Storage,
    pub api: &'a dyn Api,
    pub height: u64,
}

impl<'a> BlockContext<'a> {
    pub fn new(storage: &'a mut dyn Storage, api: &'a dyn Api, height: u64) -> Self {
        BlockContext {
            storage,
            api,
            height,
        }
    }
}

/// Accounts the subsystem custodies or pays into.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleAccounts {
    pub fee_pool: Addr,
    pub reward_collector: Addr,
}

/// A send the ledger guaranteed would succeed. Failure is a fault.
pub fn send_or_fault(
    bank: &mut dyn BankKeeper,
    from: &Addr,
    to: &Addr,
    amount: Coin,
) -> Result<(), Fault> {
    bank.send(from, to, amount.clone())
        .map_err(|err| Fault::TransferFailed {
            from: from.to_string(),
            to: to.to_string(),
            amount: amount.amount,
            denom: amount.denom,
            reason: err.to_string(),
        })
}
