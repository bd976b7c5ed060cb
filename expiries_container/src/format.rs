//! Vector formats the containers can be written in.
//!
//! # Examples
//!
//! ```
//! use expiries_container::OutputFormat;
//! use std::path::Path;
//!
//! assert_eq!(OutputFormat::from_path(Path::new("tiles.GeoJSON")), OutputFormat::GeoJson);
//! assert_eq!(OutputFormat::from_path(Path::new("tiles.shp")).extension(), "shp");
//! ```

use anyhow::{Result, bail};
#[cfg(feature = "cli")]
use clap::ValueEnum;
use std::{
	fmt::{Display, Formatter},
	path::Path,
};

#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
	#[default]
	Shapefile,
	#[cfg_attr(feature = "cli", value(name = "geojson"))]
	GeoJson,
}

impl OutputFormat {
	/// Name of the matching OGR driver.
	#[must_use]
	pub fn driver_name(&self) -> &'static str {
		match self {
			OutputFormat::Shapefile => "ESRI Shapefile",
			OutputFormat::GeoJson => "GeoJSON",
		}
	}

	/// File extension of the main container file, without the dot.
	#[must_use]
	pub fn extension(&self) -> &'static str {
		match self {
			OutputFormat::Shapefile => "shp",
			OutputFormat::GeoJson => "geojson",
		}
	}

	/// Whether a `.cpg` file has to declare the attribute encoding.
	#[must_use]
	pub fn needs_encoding_file(&self) -> bool {
		matches!(self, OutputFormat::Shapefile)
	}

	pub fn try_from_str(value: &str) -> Result<OutputFormat> {
		Ok(match value.trim().to_lowercase().as_str() {
			"shp" | "shapefile" | "esri shapefile" => OutputFormat::Shapefile,
			"geojson" | "json" => OutputFormat::GeoJson,
			_ => bail!("Unknown output format: '{value}'"),
		})
	}

	/// Infers the format from the extension of `path`; anything unknown is a Shapefile.
	#[must_use]
	pub fn from_path(path: &Path) -> OutputFormat {
		path
			.extension()
			.and_then(|ext| ext.to_str())
			.and_then(|ext| OutputFormat::try_from_str(ext).ok())
			.unwrap_or_default()
	}
}

impl Display for OutputFormat {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.driver_name())
	}
}
