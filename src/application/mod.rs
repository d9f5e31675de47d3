// Application layer - the account ledger and its policy.
// The ledger never prints; callers render its results.

pub mod config;
pub mod error;
pub mod ledger;
pub mod statement;

pub use config::*;
pub use error::*;
pub use ledger::*;
pub use statement::*;
