//! ESRI Shapefile driver.
//!
//! Each container is the triple `<name>.shp`, `<name>.shx` and `<name>.dbf`, plus a `.prj`
//! file if the ESRI WKT of the output SRS is known. The writer is created once all fields
//! are defined, i.e. at [`VectorSink::begin_transaction`].

use super::VectorSink;
use crate::{AttributeRecord, AttributeValue, FieldDef, FieldType, OutputFormat};
use anyhow::{Context, Result, anyhow, bail, ensure};
use expiries_geometry::SpatialRef;
use geo::Polygon;
use shapefile::{
	Point, PolygonRing, Writer,
	dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
};
use std::{
	fmt,
	fs::{self, File},
	io::{BufWriter, Read},
	path::{Path, PathBuf},
};

/// Longest field name a dBase table can store.
const MAX_FIELD_NAME_LENGTH: usize = 10;

/// Companion files flushed on commit.
const DATA_EXTENSIONS: [&str; 3] = ["shp", "shx", "dbf"];

/// Files starting with the main shapefile header, which stores the file length.
const HEADER_EXTENSIONS: [&str; 2] = ["shp", "shx"];

struct OpenShapefile {
	name: String,
	fields: Vec<FieldDef>,
	writer: Option<Writer<BufWriter<File>>>,
}

pub struct ShapefileSink {
	directory: PathBuf,
	current: Option<OpenShapefile>,
	closed: bool,
}

impl ShapefileSink {
	#[must_use]
	pub fn new(directory: &Path) -> ShapefileSink {
		ShapefileSink {
			directory: directory.to_path_buf(),
			current: None,
			closed: false,
		}
	}

	fn path(&self, name: &str, extension: &str) -> PathBuf {
		self.directory.join(format!("{name}.{extension}"))
	}

	fn current_mut(&mut self, operation: &str) -> Result<&mut OpenShapefile> {
		self.current
			.as_mut()
			.ok_or_else(|| anyhow!("cannot {operation}: no shapefile is open"))
	}
}

impl VectorSink for ShapefileSink {
	fn format(&self) -> OutputFormat {
		OutputFormat::Shapefile
	}

	fn create_container(&mut self, name: &str, srs: &SpatialRef) -> Result<()> {
		ensure!(!self.closed, "cannot create shapefile '{name}': sink is closed");
		if let Some(current) = &self.current {
			bail!("cannot create shapefile '{name}': '{}' is still open", current.name);
		}

		fs::create_dir_all(&self.directory)
			.with_context(|| format!("Failed to create output directory {:?}", self.directory))?;

		if let Some(wkt) = srs.esri_wkt() {
			let prj = self.path(name, "prj");
			fs::write(&prj, wkt).with_context(|| format!("Failed to write projection file {prj:?}"))?;
		} else {
			log::debug!("no ESRI WKT known for {srs}, skipping the .prj file of '{name}'");
		}

		self.current = Some(OpenShapefile {
			name: name.to_owned(),
			fields: Vec::new(),
			writer: None,
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
		ensure!(
			field.name.len() <= MAX_FIELD_NAME_LENGTH,
			"field name '{}' is longer than {MAX_FIELD_NAME_LENGTH} characters",
			field.name
		);
		current.fields.push(field.clone());
		Ok(())
	}

	fn begin_transaction(&mut self) -> Result<()> {
		let directory = self.directory.clone();
		let current = self.current_mut("begin a transaction")?;
		ensure!(current.writer.is_none(), "transaction of '{}' already started", current.name);
		let path = directory.join(format!("{}.shp", current.name));

		let mut builder = TableWriterBuilder::new();
		for field in &current.fields {
			let name = FieldName::try_from(field.name.as_str())
				.map_err(|e| anyhow!("invalid field name '{}': {e}", field.name))?;
			builder = match field.field_type {
				FieldType::String => builder.add_character_field(name, field.width),
				FieldType::Integer => builder.add_numeric_field(name, field.width, 0),
			};
		}

		let writer = Writer::from_path(&path, builder).with_context(|| format!("Failed to create shapefile {path:?}"))?;
		current.writer = Some(writer);
		Ok(())
	}

	fn append_feature(&mut self, polygon: &Polygon<f64>, attributes: &AttributeRecord) -> Result<()> {
		let current = self.current_mut("append a feature")?;
		let name = current.name.clone();

		let mut record = Record::default();
		for (key, value) in attributes.iter() {
			let field = current
				.fields
				.iter()
				.find(|field| field.name == key)
				.ok_or_else(|| anyhow!("unknown field '{key}' in shapefile '{name}'"))?;
			record.insert(key.to_owned(), to_field_value(field, value));
		}

		let shape = to_shape(polygon);
		let writer = current
			.writer
			.as_mut()
			.ok_or_else(|| anyhow!("cannot append a feature to '{name}': no transaction started"))?;
		writer
			.write_shape_and_record(&shape, &record)
			.with_context(|| format!("Failed to append feature to shapefile '{name}'"))
	}

	fn commit(&mut self) -> Result<()> {
		let current = self
			.current
			.take()
			.ok_or_else(|| anyhow!("cannot commit: no shapefile is open"))?;
		ensure!(current.writer.is_some(), "cannot commit '{}': no transaction started", current.name);

		// Dropping the writer rewrites the headers of all three files. The writers have no
		// fallible close and discard errors of that rewrite, so the headers are checked below.
		drop(current.writer);

		for extension in DATA_EXTENSIONS {
			let path = self.path(&current.name, extension);
			File::options()
				.write(true)
				.open(&path)
				.and_then(|file| file.sync_all())
				.with_context(|| format!("Failed to flush {path:?}"))?;
		}
		for extension in HEADER_EXTENSIONS {
			check_header_length(&self.path(&current.name, extension))?;
		}
		log::debug!("committed shapefile '{}'", current.name);
		Ok(())
	}

	fn close(&mut self) -> Result<()> {
		if let Some(current) = self.current.take() {
			log::warn!("shapefile '{}' was closed without a commit", current.name);
		}
		self.closed = true;
		Ok(())
	}
}

impl fmt::Debug for ShapefileSink {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ShapefileSink")
			.field("directory", &self.directory)
			.field("current", &self.current.as_ref().map(|c| &c.name))
			.field("closed", &self.closed)
			.finish()
	}
}

/// Compares the file length declared in a shapefile header with the actual size.
///
/// The length is stored big-endian at byte 24, counted in 16-bit words.
fn check_header_length(path: &Path) -> Result<()> {
	let mut file = File::open(path).with_context(|| format!("Failed to open {path:?}"))?;
	let mut header = [0u8; 28];
	file
		.read_exact(&mut header)
		.with_context(|| format!("Failed to read the header of {path:?}"))?;
	let declared = u64::from(u32::from_be_bytes([header[24], header[25], header[26], header[27]])) * 2;
	let actual = file.metadata()?.len();
	ensure!(
		declared == actual,
		"header of {path:?} declares {declared} bytes but the file has {actual}"
	);
	Ok(())
}

fn to_shape(polygon: &Polygon<f64>) -> shapefile::Polygon {
	let points = polygon.exterior().coords().map(|c| Point::new(c.x, c.y)).collect();
	shapefile::Polygon::new(PolygonRing::Outer(points))
}

fn to_field_value(field: &FieldDef, value: &AttributeValue) -> FieldValue {
	match (field.field_type, value) {
		(FieldType::Integer, AttributeValue::Integer(v)) => FieldValue::Numeric(Some(*v as f64)),
		(FieldType::Integer, AttributeValue::String(v)) => FieldValue::Numeric(v.trim().parse().ok()),
		(FieldType::String, value) => {
			let text = value.to_string();
			FieldValue::Character(Some(truncate(&text, usize::from(field.width), &field.name).to_owned()))
		}
	}
}

/// Cuts `text` to at most `width` bytes on a char boundary.
fn truncate<'a>(text: &'a str, width: usize, field: &str) -> &'a str {
	if text.len() <= width {
		return text;
	}
	let mut end = width;
	while !text.is_char_boundary(end) {
		end -= 1;
	}
	log::debug!("value '{text}' of field '{field}' truncated to {width} bytes");
	&text[..end]
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Schema;
	use assert_fs::TempDir;
	use geo::{LineString, polygon};
	use shapefile::dbase;

	fn square() -> Polygon<f64> {
		polygon![(x: 0.0, y: 10.0), (x: 10.0, y: 10.0), (x: 10.0, y: 0.0), (x: 0.0, y: 0.0), (x: 0.0, y: 10.0)]
	}

	fn record(sequence: &str, zoom: i64) -> AttributeRecord {
		AttributeRecord::new()
			.with(Schema::SEQUENCE, AttributeValue::String(sequence.to_owned()))
			.with(Schema::ZOOM, AttributeValue::Integer(zoom))
	}

	fn open(sink: &mut ShapefileSink, name: &str, srs: &SpatialRef) {
		sink.create_container(name, srs).unwrap();
		for field in Schema::expiries(false).fields() {
			sink.define_field(field).unwrap();
		}
		sink.begin_transaction().unwrap();
	}

	#[test]
	fn writes_readable_shapefile() {
		let dir = TempDir::new().unwrap();
		let mut sink = ShapefileSink::new(dir.path());
		open(&mut sink, "tiles_1", &SpatialRef::web_mercator());
		sink.append_feature(&square(), &record("0042", 10)).unwrap();
		sink.append_feature(&square(), &record("0043", 11)).unwrap();
		sink.commit().unwrap();
		sink.close().unwrap();

		for extension in ["shp", "shx", "dbf", "prj"] {
			assert!(dir.path().join(format!("tiles_1.{extension}")).is_file(), "{extension}");
		}

		let shapes = shapefile::read_as::<_, shapefile::Polygon, dbase::Record>(dir.path().join("tiles_1.shp")).unwrap();
		assert_eq!(shapes.len(), 2);
		let (polygon, record) = &shapes[1];
		assert_eq!(polygon.rings().len(), 1);
		assert_eq!(polygon.rings()[0].points().len(), 5);
		assert_eq!(record.get("sequence"), Some(&FieldValue::Character(Some("0043".to_owned()))));
		assert_eq!(record.get("zoom"), Some(&FieldValue::Numeric(Some(11.0))));
	}

	#[test]
	fn committed_headers_match_file_length() {
		let dir = TempDir::new().unwrap();
		let mut sink = ShapefileSink::new(dir.path());
		open(&mut sink, "empty_1", &SpatialRef::web_mercator());
		sink.commit().unwrap();
		open(&mut sink, "tiles_1", &SpatialRef::web_mercator());
		sink.append_feature(&square(), &record("0042", 10)).unwrap();
		sink.commit().unwrap();

		for name in ["empty_1", "tiles_1"] {
			for extension in HEADER_EXTENSIONS {
				check_header_length(&dir.path().join(format!("{name}.{extension}"))).unwrap();
			}
		}
	}

	#[test]
	fn detects_stale_header_length() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("stale.shp");
		let mut header = vec![0u8; 100];
		header[24..28].copy_from_slice(&50u32.to_be_bytes());
		fs::write(&path, &header).unwrap();
		check_header_length(&path).unwrap();

		header.extend_from_slice(&[0u8; 136]);
		fs::write(&path, &header).unwrap();
		assert_eq!(
			check_header_length(&path).unwrap_err().to_string(),
			format!("header of {path:?} declares 100 bytes but the file has 236")
		);
	}

	#[test]
	fn skips_prj_without_wkt() {
		let dir = TempDir::new().unwrap();
		let mut sink = ShapefileSink::new(dir.path());
		open(&mut sink, "utm_1", &SpatialRef::from_epsg(25832).unwrap());
		sink.commit().unwrap();
		assert!(dir.path().join("utm_1.shp").is_file());
		assert!(!dir.path().join("utm_1.prj").exists());
	}

	#[test]
	fn rejects_long_field_names() {
		let dir = TempDir::new().unwrap();
		let mut sink = ShapefileSink::new(dir.path());
		sink.create_container("x_1", &SpatialRef::web_mercator()).unwrap();
		let error = sink
			.define_field(&FieldDef::new("much_too_long", FieldType::String, 4))
			.unwrap_err();
		assert_eq!(error.to_string(), "field name 'much_too_long' is longer than 10 characters");
	}

	#[test]
	fn enforces_call_order() {
		let dir = TempDir::new().unwrap();
		let mut sink = ShapefileSink::new(dir.path());
		assert!(sink.begin_transaction().is_err());
		assert!(sink.commit().is_err());

		sink.create_container("a_1", &SpatialRef::web_mercator()).unwrap();
		assert!(sink.append_feature(&square(), &AttributeRecord::new()).is_err());
		assert!(sink.create_container("a_2", &SpatialRef::web_mercator()).is_err());

		sink.close().unwrap();
		assert!(sink.create_container("a_3", &SpatialRef::web_mercator()).is_err());
	}

	#[test]
	fn truncates_long_strings_on_char_boundary() {
		assert_eq!(truncate("0123456789abcdef", 12, "sequence"), "0123456789ab");
		assert_eq!(truncate("short", 12, "sequence"), "short");
		assert_eq!(truncate("ääääää", 5, "sequence"), "ää");
	}

	#[test]
	fn converts_exterior_ring() {
		let polygon = Polygon::new(LineString::from(vec![(0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]), vec![]);
		let shape = to_shape(&polygon);
		assert_eq!(shape.rings()[0].points().first(), Some(&Point::new(0.0, 1.0)));
		assert_eq!(shape.rings()[0].points().len(), 5);
	}
}
