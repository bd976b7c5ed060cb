//! In-memory sink for testing the container manager.

use super::VectorSink;
use crate::{AttributeRecord, FieldDef, OutputFormat};
use anyhow::{Result, bail};
use expiries_geometry::SpatialRef;
use geo::Polygon;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SinkOperation {
	CreateContainer,
	DefineField,
	BeginTransaction,
	AppendFeature,
	Commit,
	Close,
}

/// A successful call on the [`MockSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum SinkEvent {
	CreateContainer { name: String, epsg: u32 },
	DefineField(FieldDef),
	BeginTransaction,
	AppendFeature(Polygon<f64>, AttributeRecord),
	Commit,
	Close,
}

impl SinkEvent {
	fn operation(&self) -> SinkOperation {
		match self {
			SinkEvent::CreateContainer { .. } => SinkOperation::CreateContainer,
			SinkEvent::DefineField(_) => SinkOperation::DefineField,
			SinkEvent::BeginTransaction => SinkOperation::BeginTransaction,
			SinkEvent::AppendFeature(..) => SinkOperation::AppendFeature,
			SinkEvent::Commit => SinkOperation::Commit,
			SinkEvent::Close => SinkOperation::Close,
		}
	}
}

/// Summary of one container written to a [`MockSink`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MockContainer {
	pub name: String,
	pub epsg: u32,
	pub fields: Vec<FieldDef>,
	pub features: Vec<(Polygon<f64>, AttributeRecord)>,
	pub committed: bool,
}

#[derive(Debug, Default)]
pub struct MockSink {
	format: OutputFormat,
	events: Vec<SinkEvent>,
	failure: Option<(SinkOperation, usize)>,
	calls: Vec<SinkOperation>,
}

impl MockSink {
	#[must_use]
	pub fn new(format: OutputFormat) -> MockSink {
		MockSink {
			format,
			..MockSink::default()
		}
	}

	/// Makes the `nth` call (1-based) of `operation` fail.
	#[must_use]
	pub fn fail_on(mut self, operation: SinkOperation, nth: usize) -> MockSink {
		self.failure = Some((operation, nth));
		self
	}

	#[must_use]
	pub fn events(&self) -> &[SinkEvent] {
		&self.events
	}

	/// Number of successful calls of `operation`.
	#[must_use]
	pub fn count(&self, operation: SinkOperation) -> usize {
		self.events.iter().filter(|event| event.operation() == operation).count()
	}

	/// The containers in creation order, assembled from the recorded events.
	#[must_use]
	pub fn containers(&self) -> Vec<MockContainer> {
		let mut containers: Vec<MockContainer> = Vec::new();
		for event in &self.events {
			match event {
				SinkEvent::CreateContainer { name, epsg } => containers.push(MockContainer {
					name: name.clone(),
					epsg: *epsg,
					..MockContainer::default()
				}),
				SinkEvent::DefineField(field) => {
					if let Some(container) = containers.last_mut() {
						container.fields.push(field.clone());
					}
				}
				SinkEvent::AppendFeature(polygon, attributes) => {
					if let Some(container) = containers.last_mut() {
						container.features.push((polygon.clone(), attributes.clone()));
					}
				}
				SinkEvent::Commit => {
					if let Some(container) = containers.last_mut() {
						container.committed = true;
					}
				}
				SinkEvent::BeginTransaction | SinkEvent::Close => {}
			}
		}
		containers
	}

	fn record(&mut self, event: SinkEvent) -> Result<()> {
		let operation = event.operation();
		self.calls.push(operation);
		if let Some((failing, nth)) = self.failure {
			let call = self.calls.iter().filter(|op| **op == operation).count();
			if failing == operation && call == nth {
				bail!("mock failure in {operation:?} call {nth}");
			}
		}
		self.events.push(event);
		Ok(())
	}
}

impl VectorSink for MockSink {
	fn format(&self) -> OutputFormat {
		self.format
	}

	fn create_container(&mut self, name: &str, srs: &SpatialRef) -> Result<()> {
		self.record(SinkEvent::CreateContainer {
			name: name.to_owned(),
			epsg: srs.epsg(),
		})
	}

	fn define_field(&mut self, field: &FieldDef) -> Result<()> {
		self.record(SinkEvent::DefineField(field.clone()))
	}

	fn begin_transaction(&mut self) -> Result<()> {
		self.record(SinkEvent::BeginTransaction)
	}

	fn append_feature(&mut self, polygon: &Polygon<f64>, attributes: &AttributeRecord) -> Result<()> {
		self.record(SinkEvent::AppendFeature(polygon.clone(), attributes.clone()))
	}

	fn commit(&mut self) -> Result<()> {
		self.record(SinkEvent::Commit)
	}

	fn close(&mut self) -> Result<()> {
		self.record(SinkEvent::Close)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{FieldType, Schema};

	#[test]
	fn records_calls_per_container() {
		let mut sink = MockSink::new(OutputFormat::GeoJson);
		sink.create_container("a_1", &SpatialRef::web_mercator()).unwrap();
		sink.define_field(&FieldDef::new(Schema::ZOOM, FieldType::Integer, 3)).unwrap();
		sink.begin_transaction().unwrap();
		sink.commit().unwrap();
		sink.create_container("a_2", &SpatialRef::web_mercator()).unwrap();
		sink.close().unwrap();

		let containers = sink.containers();
		assert_eq!(containers.len(), 2);
		assert_eq!(containers[0].fields.len(), 1);
		assert!(containers[0].committed);
		assert!(!containers[1].committed);
		assert_eq!(sink.count(SinkOperation::Close), 1);
		assert_eq!(sink.format(), OutputFormat::GeoJson);
	}

	#[test]
	fn fails_on_requested_call() {
		let mut sink = MockSink::default().fail_on(SinkOperation::Commit, 2);
		assert!(sink.commit().is_ok());
		assert_eq!(sink.commit().unwrap_err().to_string(), "mock failure in Commit call 2");
		assert!(sink.commit().is_ok());
		assert_eq!(sink.count(SinkOperation::Commit), 2);
	}
}
