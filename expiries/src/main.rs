use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use expiries::{ConvertOptions, convert};
use expiries_container::{DEFAULT_MAX_CONTAINER_SIZE, OutputFormat, OutputOptions};
use expiries_core::{MAX_ZOOM, ZoomRange};
use expiries_geometry::SpatialRef;
use std::{path::PathBuf, process::ExitCode};

/// Converts tile expiry lists into Shapefiles of the expired tile footprints.
///
/// Every `zoom/x/y` line becomes one square polygon. The output is split into
/// <OUTPUT>_1, <OUTPUT>_2, … before a file grows beyond the Shapefile size limit.
#[derive(Parser, Debug)]
#[command(name = "expiries2shp", author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
	/// glob pattern of the expiry lists, e.g. "/var/expire/*.list"
	#[arg()]
	input_files: String,

	/// output file, e.g. expired.shp or expired.geojson
	#[arg()]
	output_file: PathBuf,

	/// EPSG code of the output projection
	#[arg(long, short, value_name = "EPSG", default_value_t = SpatialRef::WEB_MERCATOR, display_order = 1)]
	projection: u32,

	/// sequence tag of all features, instead of the input file name
	#[arg(long, short, display_order = 1)]
	sequence: Option<String>,

	/// add the tile columns "x" and "y"
	#[arg(long, short, display_order = 1)]
	ids: bool,

	/// minimum exported zoom level
	#[arg(long, short = 'z', value_name = "ZOOM", default_value_t = ZoomRange::DEFAULT_MIN, display_order = 2)]
	min_zoom: u8,

	/// maximum exported zoom level
	#[arg(
		long,
		short = 'Z',
		value_name = "ZOOM",
		default_value_t = ZoomRange::DEFAULT_MAX,
		value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_ZOOM)),
		display_order = 2
	)]
	max_zoom: u8,

	/// output format, by default derived from the output file extension
	#[arg(long, short, value_enum, display_order = 3)]
	format: Option<OutputFormat>,

	/// maximum size of the geometry and of the attribute file of one output container, in bytes
	#[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_CONTAINER_SIZE, display_order = 3)]
	max_container_size: u64,

	#[command(flatten)]
	verbose: Verbosity<WarnLevel>,
}

impl Cli {
	fn to_options(&self) -> Result<ConvertOptions> {
		Ok(ConvertOptions {
			input_pattern: self.input_files.clone(),
			output_path: self.output_file.clone(),
			sequence: self.sequence.clone(),
			zoom_range: ZoomRange::new(self.min_zoom, self.max_zoom)?,
			format: self.format,
			output: OutputOptions {
				tile_ids: self.ids,
				max_container_size: self.max_container_size,
				srs: SpatialRef::from_epsg(self.projection)?,
			},
		})
	}
}

fn main() -> ExitCode {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	match run(&cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(error) => {
			log::error!("{error:?}");
			ExitCode::FAILURE
		}
	}
}

fn run(cli: &Cli) -> Result<()> {
	let options = cli.to_options()?;
	log::debug!("converting with {options:?}");
	convert(&options)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
		Cli::try_parse_from([&["expiries2shp"][..], args].concat())
	}

	#[test]
	fn defaults() {
		let options = parse(&["in/*.list", "out.shp"]).unwrap().to_options().unwrap();
		assert_eq!(options, ConvertOptions::new("in/*.list", "out.shp"));
	}

	#[test]
	fn all_flags() {
		let cli = parse(&[
			"-p",
			"4326",
			"-s",
			"0042",
			"-i",
			"-z",
			"6",
			"-Z",
			"18",
			"-f",
			"geojson",
			"--max-container-size",
			"5000",
			"in.list",
			"out",
		])
		.unwrap();
		let options = cli.to_options().unwrap();
		assert_eq!(options.sequence.as_deref(), Some("0042"));
		assert_eq!(options.zoom_range, ZoomRange::new(6, 18).unwrap());
		assert_eq!(options.format, Some(OutputFormat::GeoJson));
		assert_eq!(options.output.srs.epsg(), 4326);
		assert!(options.output.tile_ids);
		assert_eq!(options.output.max_container_size, 5000);
	}

	#[test]
	fn rejects_zoom_beyond_pyramid() {
		assert!(parse(&["-Z", "31", "in.list", "out.shp"]).is_err());
		assert!(parse(&["-Z", "30", "in.list", "out.shp"]).is_ok());
	}

	#[test]
	fn rejects_inverted_zoom_range() {
		let cli = parse(&["-z", "12", "-Z", "10", "in.list", "out.shp"]).unwrap();
		assert_eq!(
			cli.to_options().unwrap_err().to_string(),
			"minimum zoom (12) must be <= maximum zoom (10)"
		);
	}

	#[test]
	fn rejects_unknown_projection() {
		let cli = parse(&["-p", "1234", "in.list", "out.shp"]).unwrap();
		assert_eq!(cli.to_options().unwrap_err().to_string(), "unsupported EPSG code 1234");
	}

	#[test]
	fn requires_arguments() {
		assert!(parse(&[]).is_err());
		assert!(parse(&["in.list"]).is_err());
	}
}
