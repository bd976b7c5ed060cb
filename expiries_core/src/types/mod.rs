//! Contains tile coordinates, zoom ranges and expiry-list entries.

mod expiry_entry;
pub use expiry_entry::*;

mod tile;
pub use tile::*;

mod zoom_range;
pub use zoom_range::*;
