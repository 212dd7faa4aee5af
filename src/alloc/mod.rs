//! Control block allocators.

mod hold;
mod tally;

pub use self::hold::{Hold, HoldError, GlobalHold, global_hold};
pub use self::tally::TallyHold;
