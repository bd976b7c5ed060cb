//! One line of an expiry list: `<zoom>/<x>/<y>`.
//!
//! Tile renderers write these lists when tiles become stale. Fields after the third
//! separator are ignored. All three numbers are signed: a zoom outside the exported range is
//! filtered by the caller, and indices outside the map are kept.
//!
//! ```
//! use expiries_core::ExpiryEntry;
//!
//! let entry: ExpiryEntry = "10/512/256".parse().unwrap();
//! assert_eq!((entry.zoom, entry.x, entry.y), (10, 512, 256));
//! ```

use crate::{MAX_ZOOM, Tile};
use anyhow::{Context, Error, Result, anyhow};
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExpiryEntry {
	pub zoom: i64,
	pub x: i64,
	pub y: i64,
}

impl ExpiryEntry {
	/// Convert the entry into a [`Tile`].
	///
	/// # Errors
	/// Returns an error if the zoom level is negative or beyond the supported pyramid.
	pub fn to_tile(&self) -> Result<Tile> {
		let zoom = u8::try_from(self.zoom)
			.with_context(|| format!("zoom level ({}) must be between 0 and {MAX_ZOOM}", self.zoom))?;
		Tile::new(self.x, self.y, zoom)
	}
}

impl FromStr for ExpiryEntry {
	type Err = Error;

	fn from_str(line: &str) -> Result<Self> {
		let mut parts = line.split('/');
		let mut next = |name: &str| {
			parts
				.next()
				.map(str::trim)
				.filter(|token| !token.is_empty())
				.ok_or_else(|| anyhow!("missing {name} in expiry entry '{line}'"))
		};

		let zoom = next("zoom level")?;
		let x = next("x index")?;
		let y = next("y index")?;

		Ok(ExpiryEntry {
			zoom: zoom
				.parse()
				.with_context(|| format!("invalid zoom level '{zoom}' in expiry entry '{line}'"))?,
			x: x
				.parse()
				.with_context(|| format!("invalid x index '{x}' in expiry entry '{line}'"))?,
			y: y
				.parse()
				.with_context(|| format!("invalid y index '{y}' in expiry entry '{line}'"))?,
		})
	}
}

impl fmt::Display for ExpiryEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
	}
}
