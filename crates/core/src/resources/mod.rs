//! The five yard-operations resources, each wiring the generic engines with
//! its cache keys, fetcher ports, and derived helpers.

mod livestock;
mod notifications;
mod orders;
mod tasks;
mod yards;

pub use livestock::*;
pub use notifications::*;
pub use orders::*;
pub use tasks::*;
pub use yards::*;
