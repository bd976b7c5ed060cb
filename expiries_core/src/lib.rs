//! Tile math and expiry-list parsing shared by the other `expiries` crates.

pub mod io;

pub mod types;
pub use types::*;
