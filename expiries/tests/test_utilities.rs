#![allow(unused)]

use assert_cmd::{Command, cargo};
use std::{
	fs,
	path::{Path, PathBuf},
};
use tempfile::{TempDir, tempdir};

#[cfg(windows)]
pub const BINARY_NAME: &str = "expiries2shp.exe";
#[cfg(not(windows))]
pub const BINARY_NAME: &str = "expiries2shp";

/// Helper to create a Command for the expiries2shp binary.
pub fn expiries_cmd() -> Command {
	Command::new(cargo::cargo_bin!("expiries2shp"))
}

/// Helper to create a temp directory holding one expiry list.
pub fn expiry_list(filename: &str, content: &str) -> (TempDir, PathBuf) {
	let dir = tempdir().expect("failed to create temp dir");
	let path = dir.path().join(filename);
	fs::write(&path, content).expect("failed to write expiry list");
	(dir, path)
}

pub fn path_str(path: &Path) -> &str {
	path.to_str().unwrap()
}

/// Reads all polygons and attribute records of a written shapefile.
pub fn read_shapefile(path: &Path) -> Vec<(shapefile::Polygon, shapefile::dbase::Record)> {
	shapefile::read_as::<_, shapefile::Polygon, shapefile::dbase::Record>(path).unwrap()
}

pub fn numeric(record: &shapefile::dbase::Record, name: &str) -> f64 {
	match record.get(name) {
		Some(shapefile::dbase::FieldValue::Numeric(Some(value))) => *value,
		other => panic!("field {name} is not numeric: {other:?}"),
	}
}

pub fn character(record: &shapefile::dbase::Record, name: &str) -> String {
	match record.get(name) {
		Some(shapefile::dbase::FieldValue::Character(Some(value))) => value.clone(),
		other => panic!("field {name} is not a string: {other:?}"),
	}
}
