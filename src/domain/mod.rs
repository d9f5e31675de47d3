mod holder;
mod money;
mod pin;
mod transaction;

pub use holder::*;
pub use money::*;
pub use pin::*;
pub use transaction::*;
