//! Running size estimate of the active container.
//!
//! Shapefiles consist of a geometry file and a dBase attribute table that grow independently;
//! either of them must stay below 2 GiB. The tracker estimates both from fixed per-container
//! and per-feature costs instead of asking the driver.

use crate::Schema;
use anyhow::{Result, ensure};

/// Default ceiling for either running total, in bytes.
pub const DEFAULT_MAX_CONTAINER_SIZE: u64 = 2_040_109_465;

/// Header of the geometry file.
pub const GEOMETRY_HEADER_SIZE: u64 = 100;
/// Geometry cost of one rectangle (record header, bounding box, one part of five points).
pub const GEOMETRY_FEATURE_SIZE: u64 = 120;
/// Fixed header of the attribute table including its terminator byte.
pub const ATTRIBUTE_HEADER_SIZE: u64 = 33;
/// Field descriptor per column in the attribute table header.
pub const ATTRIBUTE_FIELD_DESCRIPTOR_SIZE: u64 = 32;
/// Deletion flag preceding every attribute record.
pub const ATTRIBUTE_RECORD_FLAG_SIZE: u64 = 1;

/// Geometry and attribute totals of the active container.
///
/// The capacity check looks one feature ahead, so containers are split one feature earlier
/// than by `expiries2shp` releases that only rolled over once a total had reached the limit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SizeTracker {
	limit: u64,
	geometry_bytes: u64,
	attribute_bytes: u64,
	attribute_header_size: u64,
	record_size: u64,
}

impl SizeTracker {
	/// Creates a tracker for containers of `schema` that must stay within `limit` bytes.
	///
	/// # Errors
	/// Returns an error if an empty container could not take a single feature.
	pub fn new(schema: &Schema, limit: u64) -> Result<SizeTracker> {
		let attribute_header_size =
			ATTRIBUTE_HEADER_SIZE + ATTRIBUTE_FIELD_DESCRIPTOR_SIZE * schema.fields().len() as u64;
		let record_size = ATTRIBUTE_RECORD_FLAG_SIZE + schema.total_width();

		let tracker = SizeTracker {
			limit,
			geometry_bytes: GEOMETRY_HEADER_SIZE,
			attribute_bytes: attribute_header_size,
			attribute_header_size,
			record_size,
		};
		ensure!(
			tracker.has_room(),
			"container size limit of {limit} bytes is too small to hold a single feature"
		);
		Ok(tracker)
	}

	/// Back to the overhead of an empty container.
	pub fn reset(&mut self) {
		self.geometry_bytes = GEOMETRY_HEADER_SIZE;
		self.attribute_bytes = self.attribute_header_size;
	}

	pub fn add_feature(&mut self) {
		self.geometry_bytes += GEOMETRY_FEATURE_SIZE;
		self.attribute_bytes += self.record_size;
	}

	/// Whether one more feature keeps both totals within the limit.
	#[must_use]
	pub fn has_room(&self) -> bool {
		self.geometry_bytes + GEOMETRY_FEATURE_SIZE <= self.limit && self.attribute_bytes + self.record_size <= self.limit
	}

	#[must_use]
	pub fn limit(&self) -> u64 {
		self.limit
	}

	#[must_use]
	pub fn geometry_bytes(&self) -> u64 {
		self.geometry_bytes
	}

	#[must_use]
	pub fn attribute_bytes(&self) -> u64 {
		self.attribute_bytes
	}

	/// Attribute bytes added by every feature.
	#[must_use]
	pub fn record_size(&self) -> u64 {
		self.record_size
	}
}
