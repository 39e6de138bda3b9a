//! Common test utilities for tg-notify integration tests

#[allow(dead_code)]
pub mod assertions;
pub mod config;
#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
pub use config::*;
#[allow(unused_imports)]
pub use fixtures::*;
