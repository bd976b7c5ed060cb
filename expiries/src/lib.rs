//! Converts tile expiry lists into polygon containers.
//!
//! Every `zoom/x/y` line of the input files becomes one square polygon covering the tile in
//! Web Mercator, optionally reprojected. The output is split into `<base>_1`, `<base>_2`, …
//! so that no container outgrows the limits of the Shapefile format.
//!
//! ## Example
//! ```rust,no_run
//! use expiries::{ConvertOptions, convert};
//!
//! let options = ConvertOptions::new("expire/*.list", "expired.shp");
//! let summary = convert(&options).unwrap();
//! println!("{summary}");
//! ```

mod convert;
mod input;

pub use convert::*;
pub use input::*;
