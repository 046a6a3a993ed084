//! Shared test doubles and utilities for the Foodgram recipe backend.

mod clock;
mod failing;
mod images;
mod store;

pub use clock::{FixedClock, ManualClock, fixed_now};
pub use failing::FailingStore;
pub use images::InMemoryImageStore;
pub use store::InMemoryStore;
