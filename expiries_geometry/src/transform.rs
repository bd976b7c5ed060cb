use crate::SpatialRef;
use anyhow::{Context, Result};
use geo::{Coord, MapCoords, Polygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};
use std::fmt;

/// Transforms coordinates between two spatial reference systems.
///
/// Geographic systems take and return degrees; PROJ.4 itself works in radians.
pub struct CoordTransform {
	source: Proj4,
	target: Proj4,
	source_geographic: bool,
	target_geographic: bool,
	description: String,
}

impl CoordTransform {
	pub fn new(source: &SpatialRef, target: &SpatialRef) -> Result<CoordTransform> {
		let from = Proj4::from_proj_string(source.proj4())
			.with_context(|| format!("failed to build source PROJ.4 for {source}: {}", source.proj4()))?;
		let to = Proj4::from_proj_string(target.proj4())
			.with_context(|| format!("failed to build target PROJ.4 for {target}: {}", target.proj4()))?;

		Ok(CoordTransform {
			source: from,
			target: to,
			source_geographic: source.is_geographic(),
			target_geographic: target.is_geographic(),
			description: format!("{source} -> {target}"),
		})
	}

	pub fn transform_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
		let mut point = if self.source_geographic {
			(coord.x.to_radians(), coord.y.to_radians(), 0.0)
		} else {
			(coord.x, coord.y, 0.0)
		};

		transform(&self.source, &self.target, &mut point)
			.with_context(|| format!("failed to transform ({}, {}) {}", coord.x, coord.y, self.description))?;

		Ok(if self.target_geographic {
			Coord {
				x: point.0.to_degrees(),
				y: point.1.to_degrees(),
			}
		} else {
			Coord { x: point.0, y: point.1 }
		})
	}

	/// Transform every vertex of `polygon`.
	pub fn transform_polygon(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>> {
		polygon.try_map_coords(|coord| self.transform_coord(coord))
	}
}

impl fmt::Debug for CoordTransform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("CoordTransform").field(&self.description).finish()
	}
}
