//! Tile indices of the Web Mercator tile pyramid and their projected footprint.
//!
//! A [`Tile`] is addressed by zoom level and x/y index, counted from the north-west corner
//! of the map. Its footprint is an axis-aligned square in EPSG:3857 metres.
//!
//! # Examples
//!
//! ```
//! use expiries_core::Tile;
//!
//! let tile = Tile::new(0, 0, 1).unwrap();
//! assert_eq!(tile.size(), 20_037_508.34);
//! assert_eq!(tile.corners()[0], [-20_037_508.34, 20_037_508.34]);
//! ```

use anyhow::{Result, ensure};
use std::fmt;

/// Circumference of the spherical Web Mercator earth in metres.
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_016.68;

/// Highest zoom level whose map width still fits the index arithmetic.
pub const MAX_ZOOM: u8 = 30;

/// A tile of the Web Mercator pyramid.
///
/// Indices outside `[0, 2^zoom)`, negative ones included, are accepted and simply describe a
/// square outside the visible map.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tile {
	x: i64,
	y: i64,
	zoom: u8,
}

impl Tile {
	/// Create a tile from its `x` and `y` index at `zoom`.
	///
	/// # Errors
	/// Returns an error if `zoom` > [`MAX_ZOOM`].
	pub fn new(x: i64, y: i64, zoom: u8) -> Result<Tile> {
		ensure!(zoom <= MAX_ZOOM, "zoom level ({zoom}) must be <= {MAX_ZOOM}");
		Ok(Tile { x, y, zoom })
	}

	#[must_use]
	pub fn x(&self) -> i64 {
		self.x
	}

	#[must_use]
	pub fn y(&self) -> i64 {
		self.y
	}

	#[must_use]
	pub fn zoom(&self) -> u8 {
		self.zoom
	}

	/// Number of tiles along one side of the map at this tile's zoom level.
	#[must_use]
	pub fn map_width(&self) -> u32 {
		1u32 << self.zoom
	}

	/// Edge length of the tile in Mercator metres.
	#[must_use]
	pub fn size(&self) -> f64 {
		EARTH_CIRCUMFERENCE / f64::from(self.map_width())
	}

	/// Mercator x coordinate of the western edge.
	#[must_use]
	pub fn west(&self) -> f64 {
		index_to_merc_x(self.x as f64, self.map_width())
	}

	/// Mercator x coordinate of the eastern edge.
	///
	/// Computed as the western edge of the right neighbour so that adjacent tiles share
	/// their edge exactly.
	#[must_use]
	pub fn east(&self) -> f64 {
		index_to_merc_x(self.x as f64 + 1.0, self.map_width())
	}

	/// Mercator y coordinate of the northern edge.
	#[must_use]
	pub fn north(&self) -> f64 {
		index_to_merc_y(self.y as f64, self.map_width())
	}

	/// Mercator y coordinate of the southern edge.
	#[must_use]
	pub fn south(&self) -> f64 {
		index_to_merc_y(self.y as f64 + 1.0, self.map_width())
	}

	/// Corners of the footprint in the order NW, NE, SE, SW.
	#[must_use]
	pub fn corners(&self) -> [[f64; 2]; 4] {
		let (west, east, north, south) = (self.west(), self.east(), self.north(), self.south());
		[[west, north], [east, north], [east, south], [west, south]]
	}
}

impl fmt::Display for Tile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
	}
}

fn index_to_merc_x(index: f64, map_width: u32) -> f64 {
	EARTH_CIRCUMFERENCE * (index / f64::from(map_width) - 0.5)
}

fn index_to_merc_y(index: f64, map_width: u32) -> f64 {
	EARTH_CIRCUMFERENCE * (0.5 - index / f64::from(map_width))
}
