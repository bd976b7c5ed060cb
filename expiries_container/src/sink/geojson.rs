//! GeoJSON driver.
//!
//! Features are streamed into `<name>.geojson.part`, one per line. Commit closes the
//! `FeatureCollection`, syncs the file and renames it to `<name>.geojson`, so only complete
//! collections ever carry the final name.

use super::VectorSink;
use crate::{AttributeRecord, AttributeValue, FieldDef, OutputFormat};
use anyhow::{Context, Result, anyhow, bail, ensure};
use expiries_geometry::SpatialRef;
use geo::Polygon;
use serde_json::{Map, Value, json};
use std::{
	fs::{self, File},
	io::{BufWriter, Write},
	path::{Path, PathBuf},
};

const WGS84: u32 = 4326;

#[derive(Debug)]
struct OpenCollection {
	name: String,
	srs: SpatialRef,
	fields: Vec<FieldDef>,
	writer: Option<BufWriter<File>>,
	feature_count: u64,
}

#[derive(Debug)]
pub struct GeoJsonSink {
	directory: PathBuf,
	current: Option<OpenCollection>,
	closed: bool,
}

impl GeoJsonSink {
	#[must_use]
	pub fn new(directory: &Path) -> GeoJsonSink {
		GeoJsonSink {
			directory: directory.to_path_buf(),
			current: None,
			closed: false,
		}
	}

	fn final_path(&self, name: &str) -> PathBuf {
		self.directory.join(format!("{name}.geojson"))
	}

	fn part_path(&self, name: &str) -> PathBuf {
		self.directory.join(format!("{name}.geojson.part"))
	}

	fn current_mut(&mut self, operation: &str) -> Result<&mut OpenCollection> {
		self.current
			.as_mut()
			.ok_or_else(|| anyhow!("cannot {operation}: no GeoJSON collection is open"))
	}
}

impl VectorSink for GeoJsonSink {
	fn format(&self) -> OutputFormat {
		OutputFormat::GeoJson
	}

	fn create_container(&mut self, name: &str, srs: &SpatialRef) -> Result<()> {
		ensure!(!self.closed, "cannot create GeoJSON collection '{name}': sink is closed");
		if let Some(current) = &self.current {
			bail!("cannot create GeoJSON collection '{name}': '{}' is still open", current.name);
		}
		fs::create_dir_all(&self.directory)
			.with_context(|| format!("Failed to create output directory {:?}", self.directory))?;

		self.current = Some(OpenCollection {
			name: name.to_owned(),
			srs: srs.clone(),
			fields: Vec::new(),
			writer: None,
			feature_count: 0,
		});
		Ok(())
	}

	fn define_field(&mut self, field: &FieldDef) -> Result<()> {
		let current = self.current_mut("define a field")?;
		ensure!(
			current.writer.is_none(),
			"cannot define field '{}' of '{}' after writing started",
			field.name,
			current.name
		);
		current.fields.push(field.clone());
		Ok(())
	}

	fn begin_transaction(&mut self) -> Result<()> {
		let directory = self.directory.clone();
		let current = self.current_mut("begin a transaction")?;
		ensure!(current.writer.is_none(), "transaction of '{}' already started", current.name);

		let path = directory.join(format!("{}.geojson.part", current.name));
		let file = File::create(&path).with_context(|| format!("Failed to create {path:?}"))?;
		let mut writer = BufWriter::new(file);
		writer
			.write_all(collection_header(&current.name, &current.srs).as_bytes())
			.with_context(|| format!("Failed to write to {path:?}"))?;

		current.writer = Some(writer);
		current.feature_count = 0;
		Ok(())
	}

	fn append_feature(&mut self, polygon: &Polygon<f64>, attributes: &AttributeRecord) -> Result<()> {
		let current = self.current_mut("append a feature")?;
		let name = current.name.clone();

		let mut properties = Map::new();
		for (key, value) in attributes.iter() {
			ensure!(
				current.fields.iter().any(|field| field.name == key),
				"unknown field '{key}' in GeoJSON collection '{name}'"
			);
			let value = match value {
				AttributeValue::String(v) => Value::from(v.as_str()),
				AttributeValue::Integer(v) => Value::from(*v),
			};
			properties.insert(key.to_owned(), value);
		}
		let feature = json!({
			"type": "Feature",
			"properties": properties,
			"geometry": polygon_geometry(polygon),
		});

		let separator = if current.feature_count == 0 { "\n" } else { ",\n" };
		let writer = current
			.writer
			.as_mut()
			.ok_or_else(|| anyhow!("cannot append a feature to '{name}': no transaction started"))?;
		writer
			.write_all(separator.as_bytes())
			.and_then(|()| serde_json::to_writer(&mut *writer, &feature).map_err(std::io::Error::from))
			.with_context(|| format!("Failed to append feature to GeoJSON collection '{name}'"))?;

		current.feature_count += 1;
		Ok(())
	}

	fn commit(&mut self) -> Result<()> {
		let current = self
			.current
			.take()
			.ok_or_else(|| anyhow!("cannot commit: no GeoJSON collection is open"))?;
		let Some(mut writer) = current.writer else {
			bail!("cannot commit '{}': no transaction started", current.name);
		};

		let part = self.part_path(&current.name);
		writer
			.write_all(b"\n]}\n")
			.and_then(|()| writer.flush())
			.and_then(|()| writer.get_ref().sync_all())
			.with_context(|| format!("Failed to flush {part:?}"))?;
		drop(writer);

		let path = self.final_path(&current.name);
		fs::rename(&part, &path).with_context(|| format!("Failed to rename {part:?} to {path:?}"))?;
		log::debug!(
			"committed GeoJSON collection '{}' with {} features",
			current.name,
			current.feature_count
		);
		Ok(())
	}

	fn close(&mut self) -> Result<()> {
		if let Some(current) = self.current.take() {
			log::warn!("GeoJSON collection '{}' was closed without a commit", current.name);
		}
		self.closed = true;
		Ok(())
	}
}

/// Everything up to the opening bracket of the `features` array.
fn collection_header(name: &str, srs: &SpatialRef) -> String {
	let mut header = Map::new();
	header.insert("type".to_owned(), json!("FeatureCollection"));
	header.insert("name".to_owned(), json!(name));
	if srs.epsg() != WGS84 {
		header.insert("crs".to_owned(), json!({ "type": "name", "properties": { "name": srs.urn() } }));
	}
	let header = Value::Object(header).to_string();
	// reopen the object to append the feature array
	format!("{},\"features\":[", &header[..header.len() - 1])
}

fn polygon_geometry(polygon: &Polygon<f64>) -> Value {
	let ring = |line: &geo::LineString<f64>| line.coords().map(|c| json!([c.x, c.y])).collect::<Vec<_>>();
	let mut rings = vec![ring(polygon.exterior())];
	rings.extend(polygon.interiors().iter().map(ring));
	json!({ "type": "Polygon", "coordinates": rings })
}
