//! Name caches shared across requests

mod case;
mod clock;

pub use case::{CacheLookup, CaseCache};
pub use clock::{Clock, ManualClock, SystemClock};
