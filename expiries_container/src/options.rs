use crate::{DEFAULT_MAX_CONTAINER_SIZE, Schema, SizeTracker};
use anyhow::{Context, Result};
use expiries_geometry::SpatialRef;

/// Settings shared by all containers of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputOptions {
	/// Adds the `x` and `y` columns.
	pub tile_ids: bool,
	/// Ceiling for the geometry and the attribute size of a single container, in bytes.
	pub max_container_size: u64,
	/// Spatial reference system of the written coordinates.
	pub srs: SpatialRef,
}

impl OutputOptions {
	#[must_use]
	pub fn schema(&self) -> Schema {
		Schema::expiries(self.tile_ids)
	}

	/// Checks that an empty container can take at least one feature.
	pub fn validate(&self) -> Result<()> {
		SizeTracker::new(&self.schema(), self.max_container_size)
			.map(|_| ())
			.context("invalid output options")
	}
}

impl Default for OutputOptions {
	fn default() -> Self {
		OutputOptions {
			tile_ids: false,
			max_container_size: DEFAULT_MAX_CONTAINER_SIZE,
			srs: SpatialRef::web_mercator(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let options = OutputOptions::default();
		assert!(!options.tile_ids);
		assert_eq!(options.max_container_size, 2_040_109_465);
		assert_eq!(options.srs.epsg(), 3857);
		assert!(options.validate().is_ok());
	}

	#[test]
	fn rejects_tiny_limit() {
		let options = OutputOptions {
			max_container_size: 100,
			..OutputOptions::default()
		};
		let error = options.validate().unwrap_err();
		assert_eq!(error.to_string(), "invalid output options");
		assert_eq!(
			error.root_cause().to_string(),
			"container size limit of 100 bytes is too small to hold a single feature"
		);
	}
}
