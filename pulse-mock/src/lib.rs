//! pulse-mock
//!
//! Source connectors for tests and offline demos.
//!
//! - [`FixtureConnector`]: deterministic synthetic data for every upstream kind.
//! - [`DynamicMockConnector`]: behavior scripted per series from a
//!   [`DynamicMockController`], with call counting and a request log.
#![warn(missing_docs)]

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};
pub use fixtures::FixtureConnector;
