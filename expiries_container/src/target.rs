//! Location and naming of the rolled over containers.

use crate::OutputFormat;
use anyhow::{Result, ensure};
use std::{
	ffi::OsStr,
	path::{Path, PathBuf},
};

/// Directory and base name shared by all containers of one run.
///
/// The output path `out/expired.shp` results in the containers `out/expired_1.shp`,
/// `out/expired_2.shp`, …
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputTarget {
	directory: PathBuf,
	base_name: String,
	format: OutputFormat,
}

impl OutputTarget {
	/// Splits `path` into directory and base name.
	///
	/// The extension of `format` is removed from the file name if present, ignoring case.
	/// Other dots stay part of the base name.
	pub fn from_path(path: &Path, format: OutputFormat) -> Result<OutputTarget> {
		let file_name = path
			.file_name()
			.and_then(OsStr::to_str)
			.ok_or_else(|| anyhow::anyhow!("output path {path:?} has no valid file name"))?;

		let suffix = format!(".{}", format.extension());
		let base_name = match file_name.len().checked_sub(suffix.len()) {
			Some(split)
				if file_name.is_char_boundary(split) && file_name[split..].eq_ignore_ascii_case(&suffix) =>
			{
				&file_name[..split]
			}
			_ => file_name,
		};
		ensure!(!base_name.is_empty(), "output path {path:?} has an empty base name");

		let directory = match path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
			_ => PathBuf::from("."),
		};

		Ok(OutputTarget {
			directory,
			base_name: base_name.to_owned(),
			format,
		})
	}

	#[must_use]
	pub fn directory(&self) -> &Path {
		&self.directory
	}

	#[must_use]
	pub fn base_name(&self) -> &str {
		&self.base_name
	}

	#[must_use]
	pub fn format(&self) -> OutputFormat {
		self.format
	}

	/// Name of the container with the 1-based `index`, e.g. `expired_3`.
	#[must_use]
	pub fn container_name(&self, index: u32) -> String {
		format!("{}_{index}", self.base_name)
	}

	/// Path of a file belonging to container `index` with the given extension.
	#[must_use]
	pub fn companion_path(&self, index: u32, extension: &str) -> PathBuf {
		self.directory.join(format!("{}.{extension}", self.container_name(index)))
	}

	/// Path of the main file of container `index`.
	#[must_use]
	pub fn container_path(&self, index: u32) -> PathBuf {
		self.companion_path(index, self.format.extension())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("out/expired.shp", OutputFormat::Shapefile, "out", "expired")]
	#[case("expired.SHP", OutputFormat::Shapefile, ".", "expired")]
	#[case("/tmp/ship.shop", OutputFormat::Shapefile, "/tmp", "ship.shop")]
	#[case("hash", OutputFormat::Shapefile, ".", "hash")]
	#[case("a/b/tiles.2024.geojson", OutputFormat::GeoJson, "a/b", "tiles.2024")]
	#[case("tiles.shp", OutputFormat::GeoJson, ".", "tiles.shp")]
	fn splits_directory_and_base_name(
		#[case] path: &str,
		#[case] format: OutputFormat,
		#[case] directory: &str,
		#[case] base_name: &str,
	) {
		let target = OutputTarget::from_path(Path::new(path), format).unwrap();
		assert_eq!(target.directory(), Path::new(directory));
		assert_eq!(target.base_name(), base_name);
	}

	#[test]
	fn names_containers() {
		let target = OutputTarget::from_path(Path::new("out/expired.shp"), OutputFormat::Shapefile).unwrap();
		assert_eq!(target.container_name(1), "expired_1");
		assert_eq!(target.container_path(2), Path::new("out/expired_2.shp"));
		assert_eq!(target.companion_path(3, "cpg"), Path::new("out/expired_3.cpg"));
	}

	#[rstest]
	#[case(".shp")]
	#[case("..")]
	fn rejects_paths_without_base_name(#[case] path: &str) {
		assert!(OutputTarget::from_path(Path::new(path), OutputFormat::Shapefile).is_err());
	}
}
