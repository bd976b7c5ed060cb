//! Writes tile footprints into a series of size-limited containers.
//!
//! The manager owns the sink for the whole run. Containers are named `<base>_1`, `<base>_2`,
//! … and share one schema. Before every feature the manager checks whether the active
//! container can take it without passing the size limit; if not, the container is committed
//! and the next one is opened.
//!
//! ## Example
//! ```rust
//! use expiries_container::*;
//! use expiries_core::Tile;
//! use std::path::Path;
//!
//! let target = OutputTarget::from_path(Path::new("expired.geojson"), OutputFormat::GeoJson).unwrap();
//! let sink = MockSink::new(OutputFormat::GeoJson);
//! let mut manager = OutputContainerManager::new(sink, target, OutputOptions::default()).unwrap();
//!
//! manager.write_tile(&Tile::new(512, 256, 10).unwrap(), "0042").unwrap();
//! manager.finish().unwrap();
//!
//! assert_eq!(manager.sink().containers()[0].name, "expired_1");
//! ```

use crate::{
	AttributeRecord, AttributeValue, OutputOptions, OutputTarget, Schema, SizeTracker, VectorSink,
};
use anyhow::{Context, Result, bail, ensure};
use expiries_core::Tile;
use expiries_geometry::TileGeometryBuilder;
use std::fs;

/// Content of the `.cpg` file declaring the attribute encoding.
const ENCODING: &str = "UTF-8";

/// Lifecycle of the active container.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContainerState {
	Unopened,
	Writing,
	/// The commit has started or failed.
	Closing,
	Closed,
}

#[derive(Debug)]
pub struct OutputContainerManager<S: VectorSink> {
	sink: S,
	target: OutputTarget,
	options: OutputOptions,
	schema: Schema,
	builder: TileGeometryBuilder,
	sizes: SizeTracker,
	state: ContainerState,
	index: u32,
	container_features: u64,
	total_features: u64,
	finished: bool,
}

impl<S: VectorSink> OutputContainerManager<S> {
	/// Creates the manager and opens the first container.
	///
	/// # Errors
	/// Returns an error if the options are invalid, the sink does not write the format of
	/// `target`, or the first container cannot be opened.
	pub fn new(sink: S, target: OutputTarget, options: OutputOptions) -> Result<OutputContainerManager<S>> {
		ensure!(
			sink.format() == target.format(),
			"sink writes {} but the output target expects {}",
			sink.format(),
			target.format()
		);

		let schema = options.schema();
		let sizes = SizeTracker::new(&schema, options.max_container_size)?;
		let builder = TileGeometryBuilder::for_target(options.srs.clone())?;

		let mut manager = OutputContainerManager {
			sink,
			target,
			options,
			schema,
			builder,
			sizes,
			state: ContainerState::Unopened,
			index: 0,
			container_features: 0,
			total_features: 0,
			finished: false,
		};
		manager.open()?;
		Ok(manager)
	}

	fn current_name(&self) -> String {
		self.target.container_name(self.index)
	}

	/// Starts the next container.
	fn open(&mut self) -> Result<()> {
		ensure!(
			matches!(self.state, ContainerState::Unopened | ContainerState::Closed),
			"cannot open a new container while the current one is {:?}",
			self.state
		);

		self.index += 1;
		let name = self.current_name();
		log::debug!("opening container '{name}' in {:?}", self.target.directory());

		self.sink
			.create_container(&name, &self.options.srs)
			.with_context(|| format!("Failed to create container '{name}'"))?;

		for field in self.schema.fields() {
			self.sink
				.define_field(field)
				.with_context(|| format!("Failed to create field '{}' in container '{name}'", field.name))?;
		}

		if self.sink.format().needs_encoding_file() {
			let path = self.target.companion_path(self.index, "cpg");
			fs::write(&path, ENCODING).with_context(|| format!("Failed to write encoding file {path:?}"))?;
		}

		self.sizes.reset();
		self.container_features = 0;

		self.sink
			.begin_transaction()
			.with_context(|| format!("Failed to begin transaction on container '{name}'"))?;
		self.state = ContainerState::Writing;
		Ok(())
	}

	/// Commits the active container.
	fn close(&mut self) -> Result<()> {
		ensure!(
			self.state == ContainerState::Writing,
			"cannot close a container that is {:?}",
			self.state
		);
		let name = self.current_name();

		self.state = ContainerState::Closing;
		self.sink
			.commit()
			.with_context(|| format!("Failed to commit transaction on container '{name}'"))?;
		self.state = ContainerState::Closed;

		log::debug!(
			"committed container '{name}': {} features, {} geometry bytes, {} attribute bytes",
			self.container_features,
			self.sizes.geometry_bytes(),
			self.sizes.attribute_bytes()
		);
		Ok(())
	}

	/// Makes sure the active container can take one more feature, rolling over if necessary.
	fn ensure_writeable(&mut self) -> Result<()> {
		ensure!(!self.finished, "output containers are already finished");
		match self.state {
			ContainerState::Writing if self.sizes.has_room() => Ok(()),
			ContainerState::Writing => {
				log::info!(
					"container '{}' reached the size limit of {} bytes after {} features",
					self.current_name(),
					self.sizes.limit(),
					self.container_features
				);
				self.close()?;
				self.open()
			}
			ContainerState::Closing => bail!(
				"container '{}' failed to commit, refusing further writes",
				self.current_name()
			),
			ContainerState::Unopened | ContainerState::Closed => self.open(),
		}
	}

	/// Writes the footprint of `tile` tagged with `sequence`.
	pub fn write_tile(&mut self, tile: &Tile, sequence: &str) -> Result<()> {
		self.ensure_writeable()?;

		let polygon = self.builder.build_footprint(tile)?;

		let mut record = AttributeRecord::new()
			.with(Schema::SEQUENCE, AttributeValue::String(sequence.to_owned()))
			.with(Schema::ZOOM, AttributeValue::Integer(i64::from(tile.zoom())));
		if self.schema.has_tile_ids() {
			record.set(Schema::X, AttributeValue::Integer(tile.x()));
			record.set(Schema::Y, AttributeValue::Integer(tile.y()));
		}

		self.sink
			.append_feature(&polygon, &record)
			.with_context(|| format!("Failed to append tile {tile} to container '{}'", self.current_name()))?;

		self.sizes.add_feature();
		self.container_features += 1;
		self.total_features += 1;
		log::trace!("wrote tile {tile} to container '{}'", self.current_name());
		Ok(())
	}

	/// Commits the last container and closes the sink.
	///
	/// Calling it again does nothing.
	pub fn finish(&mut self) -> Result<()> {
		if self.finished {
			return Ok(());
		}
		self.finished = true;

		let committed = if self.state == ContainerState::Writing {
			self.close()
		} else {
			Ok(())
		};
		let closed = self.sink.close().context("Failed to close the output sink");
		committed.and(closed)?;

		log::info!(
			"wrote {} features into {} container(s) named '{}_N'",
			self.total_features,
			self.index,
			self.target.base_name()
		);
		Ok(())
	}

	#[must_use]
	pub fn sink(&self) -> &S {
		&self.sink
	}

	#[must_use]
	pub fn target(&self) -> &OutputTarget {
		&self.target
	}

	#[must_use]
	pub fn schema(&self) -> &Schema {
		&self.schema
	}

	#[must_use]
	pub fn state(&self) -> ContainerState {
		self.state
	}

	#[must_use]
	pub fn sizes(&self) -> &SizeTracker {
		&self.sizes
	}

	/// Number of containers opened so far.
	#[must_use]
	pub fn container_count(&self) -> u32 {
		self.index
	}

	/// Number of features written over all containers.
	#[must_use]
	pub fn feature_count(&self) -> u64 {
		self.total_features
	}
}

impl<S: VectorSink> Drop for OutputContainerManager<S> {
	fn drop(&mut self) {
		if let Err(error) = self.finish() {
			log::error!("Failed to finish output containers: {error:#}");
		}
	}
}
