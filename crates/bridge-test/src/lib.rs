//! Shared test fixtures for Bridge crates.
//!
//! Fixtures go through the public roster, check-in and commit operations
//! of `bridge-core`, so every state they produce is one an operator could
//! reach.
//!
//! - [`guest`] - roster entry builder with deterministic phones
//! - [`event`] - whole-event builder (roster, check-ins, past batches, requests)
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! bridge-test = { workspace = true }
//! ```
//!
//! ```ignore
//! use bridge_test::{guest, key, EventBuilder};
//! ```

pub mod event;
pub mod guest;

pub use event::{fixture_time, EventBuilder};
pub use guest::{guest, key, phone_for, GuestBuilder};
