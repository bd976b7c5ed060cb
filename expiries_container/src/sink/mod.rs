//! Format drivers the container manager writes through.
//!
//! A [`VectorSink`] receives the calls for one container after the other:
//!
//! ```text
//! create_container → define_field* → begin_transaction → append_feature* → commit
//! ```
//!
//! and `close` once after the last container. The manager never touches the encoded files
//! itself apart from the `.cpg` companion.
//!
//! ## Implementations
//! - [`ShapefileSink`]: `.shp`/`.shx`/`.dbf` triples via the `shapefile` crate
//! - [`GeoJsonSink`]: one `FeatureCollection` per container
//! - [`MockSink`]: records the calls, for tests

mod geojson;
mod mock;
mod shapefile;

pub use self::geojson::*;
pub use self::mock::*;
pub use self::shapefile::*;

use crate::{AttributeRecord, FieldDef, OutputFormat};
use anyhow::Result;
use expiries_geometry::SpatialRef;
use geo::Polygon;
use std::{fmt::Debug, path::Path};

pub trait VectorSink: Debug {
	fn format(&self) -> OutputFormat;

	/// Starts a new, empty container called `name` in the sink's directory.
	///
	/// # Errors
	/// Returns an error if a previous container is still open or the container cannot be created.
	fn create_container(&mut self, name: &str, srs: &SpatialRef) -> Result<()>;

	/// Adds an attribute column to the current container.
	fn define_field(&mut self, field: &FieldDef) -> Result<()>;

	fn begin_transaction(&mut self) -> Result<()>;

	fn append_feature(&mut self, polygon: &Polygon<f64>, attributes: &AttributeRecord) -> Result<()>;

	/// Finishes the current container and flushes it to durable storage.
	fn commit(&mut self) -> Result<()>;

	/// Releases the sink. No container may be created afterwards.
	fn close(&mut self) -> Result<()>;
}

impl<T: VectorSink + ?Sized> VectorSink for Box<T> {
	fn format(&self) -> OutputFormat {
		(**self).format()
	}

	fn create_container(&mut self, name: &str, srs: &SpatialRef) -> Result<()> {
		(**self).create_container(name, srs)
	}

	fn define_field(&mut self, field: &FieldDef) -> Result<()> {
		(**self).define_field(field)
	}

	fn begin_transaction(&mut self) -> Result<()> {
		(**self).begin_transaction()
	}

	fn append_feature(&mut self, polygon: &Polygon<f64>, attributes: &AttributeRecord) -> Result<()> {
		(**self).append_feature(polygon, attributes)
	}

	fn commit(&mut self) -> Result<()> {
		(**self).commit()
	}

	fn close(&mut self) -> Result<()> {
		(**self).close()
	}
}

/// Creates the driver for `format` writing into `directory`.
#[must_use]
pub fn new_sink(format: OutputFormat, directory: &Path) -> Box<dyn VectorSink> {
	match format {
		OutputFormat::Shapefile => Box::new(ShapefileSink::new(directory)),
		OutputFormat::GeoJson => Box::new(GeoJsonSink::new(directory)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(OutputFormat::Shapefile)]
	#[case(OutputFormat::GeoJson)]
	fn factory_matches_format(#[case] format: OutputFormat) {
		assert_eq!(new_sink(format, Path::new(".")).format(), format);
	}
}
