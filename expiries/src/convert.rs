use crate::{expand_input_pattern, sequence_from_path};
use anyhow::Result;
use expiries_container::{OutputContainerManager, OutputFormat, OutputOptions, OutputTarget, new_sink};
use expiries_core::{ZoomRange, io::ExpiryReader};
use std::{
	fmt::{Display, Formatter},
	path::{Path, PathBuf},
};

/// Everything a conversion run needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvertOptions {
	/// Glob pattern of the expiry lists, `~` is expanded.
	pub input_pattern: String,
	/// Output path; its file name without extension is the base name of the containers.
	pub output_path: PathBuf,
	/// Sequence tag for all features. Defaults to the stem of each input file.
	pub sequence: Option<String>,
	/// Entries outside this range are skipped.
	pub zoom_range: ZoomRange,
	/// Output format. Inferred from `output_path` if unset.
	pub format: Option<OutputFormat>,
	pub output: OutputOptions,
}

impl ConvertOptions {
	pub fn new(input_pattern: &str, output_path: impl AsRef<Path>) -> ConvertOptions {
		ConvertOptions {
			input_pattern: input_pattern.to_owned(),
			output_path: output_path.as_ref().to_path_buf(),
			..ConvertOptions::default()
		}
	}

	#[must_use]
	pub fn output_format(&self) -> OutputFormat {
		self.format.unwrap_or_else(|| OutputFormat::from_path(&self.output_path))
	}
}

/// Counters of a finished conversion.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConvertSummary {
	pub files: usize,
	pub entries: u64,
	pub filtered: u64,
	pub features: u64,
	pub containers: u32,
}

impl Display for ConvertSummary {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"read {} entries from {} file(s), skipped {} outside the zoom range, wrote {} features into {} container(s)",
			self.entries, self.files, self.filtered, self.features, self.containers
		)
	}
}

/// Reads all input files and writes one feature per entry within the zoom range.
///
/// The run stops at the first error; containers written up to then stay on disk.
pub fn convert(options: &ConvertOptions) -> Result<ConvertSummary> {
	options.output.validate()?;
	let inputs = expand_input_pattern(&options.input_pattern)?;

	let format = options.output_format();
	let target = OutputTarget::from_path(&options.output_path, format)?;
	let sink = new_sink(format, target.directory());
	let mut manager = OutputContainerManager::new(sink, target, options.output.clone())?;

	let mut summary = ConvertSummary {
		files: inputs.len(),
		..ConvertSummary::default()
	};

	for path in &inputs {
		let sequence = options
			.sequence
			.clone()
			.unwrap_or_else(|| sequence_from_path(path));
		log::info!("reading {path:?} as sequence '{sequence}'");

		for entry in ExpiryReader::open(path)? {
			let entry = entry?;
			summary.entries += 1;

			if !options.zoom_range.contains(entry.zoom) {
				log::trace!("skipping {entry}, zoom is outside {}", options.zoom_range);
				summary.filtered += 1;
				continue;
			}

			manager.write_tile(&entry.to_tile()?, &sequence)?;
		}
	}

	manager.finish()?;
	summary.features = manager.feature_count();
	summary.containers = manager.container_count();
	log::info!("{summary}");
	Ok(summary)
}
