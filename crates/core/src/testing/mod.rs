//! Mock transport for exercising tools without a network.

pub mod mocks;

pub use mocks::*;
