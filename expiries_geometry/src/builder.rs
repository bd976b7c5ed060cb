//! Builds the polygon footprint of a tile in the output CRS.
//!
//! Footprints are computed in Web Mercator. They are reprojected only if the output CRS is
//! built on a different geographic coordinate system than Web Mercator (WGS 84). Projections
//! that share the datum, e.g. EPSG:4326 or the WGS 84 UTM zones, receive the Mercator
//! coordinates unchanged.

use crate::{CoordTransform, SpatialRef};
use anyhow::{Context, Result};
use expiries_core::Tile;
use geo::{LineString, Polygon};

/// Closed square ring NW, NE, SE, SW, NW of `tile` in Mercator metres.
#[must_use]
pub fn mercator_footprint(tile: &Tile) -> Polygon<f64> {
	let corners = tile.corners().map(|[x, y]| (x, y));
	Polygon::new(LineString::from(corners.to_vec()), vec![])
}

#[derive(Debug)]
pub struct TileGeometryBuilder {
	source: SpatialRef,
	target: SpatialRef,
	transform: Option<CoordTransform>,
}

impl TileGeometryBuilder {
	/// Creates a builder for footprints defined in `source` and written in `target`.
	pub fn new(source: SpatialRef, target: SpatialRef) -> Result<TileGeometryBuilder> {
		let transform = if source.same_geog_cs(&target) {
			if source.epsg() != target.epsg() {
				log::warn!(
					"{target} shares its geographic coordinate system with {source}; coordinates are written without reprojection"
				);
			}
			None
		} else {
			Some(CoordTransform::new(&source, &target)?)
		};

		Ok(TileGeometryBuilder {
			source,
			target,
			transform,
		})
	}

	/// Creates a builder for Web Mercator tiles written in `target`.
	pub fn for_target(target: SpatialRef) -> Result<TileGeometryBuilder> {
		TileGeometryBuilder::new(SpatialRef::web_mercator(), target)
	}

	#[must_use]
	pub fn source(&self) -> &SpatialRef {
		&self.source
	}

	#[must_use]
	pub fn target(&self) -> &SpatialRef {
		&self.target
	}

	/// Whether footprints pass through a coordinate transformation.
	#[must_use]
	pub fn reprojects(&self) -> bool {
		self.transform.is_some()
	}

	pub fn build_footprint(&self, tile: &Tile) -> Result<Polygon<f64>> {
		let polygon = mercator_footprint(tile);
		match &self.transform {
			Some(transform) => transform
				.transform_polygon(&polygon)
				.with_context(|| format!("Failed to reproject tile {tile} to {}", self.target)),
			None => Ok(polygon),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;
	use expiries_core::EARTH_CIRCUMFERENCE;
	use geo::{Area, BoundingRect, Coord};
	use rstest::rstest;

	fn tile(x: i64, y: i64, zoom: u8) -> Tile {
		Tile::new(x, y, zoom).unwrap()
	}

	fn exterior(polygon: &Polygon<f64>) -> Vec<(f64, f64)> {
		polygon.exterior().coords().map(|c| (c.x, c.y)).collect()
	}

	#[test]
	fn footprint_ring_is_closed_and_clockwise() {
		let polygon = mercator_footprint(&tile(0, 0, 1));
		assert_eq!(
			exterior(&polygon),
			vec![
				(-20_037_508.34, 20_037_508.34),
				(0.0, 20_037_508.34),
				(0.0, 0.0),
				(-20_037_508.34, 0.0),
				(-20_037_508.34, 20_037_508.34),
			]
		);
		assert!(polygon.interiors().is_empty());
		assert!(polygon.signed_area() < 0.0);
	}

	#[rstest]
	#[case(0, 0, 0)]
	#[case(3, 2, 5)]
	#[case(512, 256, 10)]
	#[case(70_000, 40_000, 17)]
	fn footprint_side_matches_zoom(#[case] x: i64, #[case] y: i64, #[case] zoom: u8) {
		let rect = mercator_footprint(&tile(x, y, zoom)).bounding_rect().unwrap();
		let side = EARTH_CIRCUMFERENCE / 2f64.powi(i32::from(zoom));
		assert_abs_diff_eq!(rect.width(), side, epsilon = side * 1e-9);
		assert_abs_diff_eq!(rect.height(), side, epsilon = side * 1e-9);
	}

	#[rstest]
	#[case(4326)]
	#[case(3857)]
	#[case(32632)]
	fn same_datum_keeps_mercator_coordinates(#[case] code: u32) {
		let builder = TileGeometryBuilder::for_target(SpatialRef::from_epsg(code).unwrap()).unwrap();
		assert!(!builder.reprojects());
		let tile = tile(512, 256, 10);
		assert_eq!(builder.build_footprint(&tile).unwrap(), mercator_footprint(&tile));
	}

	#[test]
	fn different_datum_reprojects_to_degrees() {
		let builder = TileGeometryBuilder::for_target(SpatialRef::from_epsg(4258).unwrap()).unwrap();
		assert!(builder.reprojects());

		let polygon = builder.build_footprint(&tile(2, 1, 2)).unwrap();
		let expected = [(0.0, 66.513_260_443_111_86), (90.0, 66.513_260_443_111_86), (90.0, 0.0), (0.0, 0.0)];
		for (Coord { x, y }, (ex, ey)) in polygon.exterior().coords().zip(expected) {
			assert_abs_diff_eq!(*x, ex, epsilon = 1e-6);
			assert_abs_diff_eq!(*y, ey, epsilon = 1e-6);
		}
		assert_eq!(polygon.exterior().0.len(), 5);
		assert!(polygon.exterior().is_closed());
	}

	#[test]
	fn different_datum_reprojects_to_utm() {
		let builder = TileGeometryBuilder::for_target(SpatialRef::from_epsg(25832).unwrap()).unwrap();
		let rect = builder.build_footprint(&tile(544, 355, 10)).unwrap().bounding_rect().unwrap();
		assert!((600_000.0..750_000.0).contains(&rect.min().x), "{rect:?}");
		assert!((5_200_000.0..5_500_000.0).contains(&rect.min().y), "{rect:?}");
		assert!(rect.width() > 20_000.0 && rect.width() < 30_000.0, "{rect:?}");
	}

	#[test]
	fn keeps_source_and_target() {
		let builder = TileGeometryBuilder::for_target(SpatialRef::from_epsg(25833).unwrap()).unwrap();
		assert_eq!(builder.source().epsg(), 3857);
		assert_eq!(builder.target().epsg(), 25833);
	}
}
