//! Readers for expiry lists.

mod expiry_reader;
pub use expiry_reader::*;
