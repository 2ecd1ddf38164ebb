//! Offline-first sync engines and their supporting pieces.

mod engine;
mod model;
mod overlay;
mod resync;
mod scheduler;

pub use engine::*;
pub use model::*;
pub use overlay::*;
pub use resync::*;
pub use scheduler::*;

#[cfg(test)]
pub(crate) mod tests;
