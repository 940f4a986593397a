//! Application services (use cases).
//!
//! Reference data managers built on [`snapshot::Snapshot`], the chain token
//! caches, and the background scheduler that keeps them fresh.

pub mod account;
pub mod chain;
pub mod dtc;
pub mod maker;
pub mod refresh_cache;
pub mod scheduler;
pub mod snapshot;
pub mod swap_token;
pub mod token;
pub mod token_cache;

pub use account::AccountManager;
pub use chain::{ChainIndex, ChainRegistry, ClientConnector};
pub use dtc::DtcManager;
pub use maker::MakerAddressManager;
pub use refresh_cache::{RefreshPolicy, RefreshingCache};
pub use scheduler::Scheduler;
pub use snapshot::{Reload, ReloadReport, Snapshot};
pub use swap_token::SwapTokenInfoManager;
pub use token::TokenInfoManager;
pub use token_cache::TokenCache;
