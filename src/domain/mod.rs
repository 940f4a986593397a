//! Chain-agnostic reference data types.

mod account;
mod backend;
mod chain;
mod maker;
mod token;

pub mod address;
pub mod amount;
pub mod dtc;

pub use account::Account;
pub use backend::Backend;
pub use chain::{ChainInfo, GasToken};
pub use dtc::{Dtc, SelectedFee, Tier};
pub use maker::{MakerAddress, MakerAddressGroup};
pub use token::TokenInfo;
