pub mod abci;
pub mod auction;
pub mod contract;
mod error;
pub mod fees;
pub mod host;
pub mod keepers;
pub mod math;
pub mod msg;
pub mod oracle;
pub mod state;

#[cfg(test)]
mod testing;

pub use crate::error::{BidRejection, ContractError, Fault, ValidationError};
