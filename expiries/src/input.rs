use anyhow::{Context, Result, ensure};
use std::path::{Path, PathBuf};

/// Replaces a leading `~` with the home directory of the current user.
#[must_use]
pub fn expand_tilde(pattern: &str) -> String {
	let rest = match pattern.strip_prefix('~') {
		Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with(std::path::MAIN_SEPARATOR) => rest,
		_ => return pattern.to_owned(),
	};
	match dirs::home_dir() {
		Some(home) => format!("{}{rest}", home.to_string_lossy()),
		None => pattern.to_owned(),
	}
}

/// Lists the files matching the glob `pattern`, in alphabetical order.
///
/// # Errors
/// Returns an error if the pattern is invalid, a match cannot be read, or nothing matches.
pub fn expand_input_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
	let expanded = expand_tilde(pattern);
	let mut paths = Vec::new();
	for entry in glob::glob(&expanded).with_context(|| format!("invalid input pattern '{pattern}'"))? {
		let path = entry.with_context(|| format!("Failed to read a match of '{pattern}'"))?;
		if path.is_file() {
			paths.push(path);
		} else {
			log::debug!("skipping {path:?}, it is not a file");
		}
	}
	ensure!(!paths.is_empty(), "no input file matches '{pattern}'");
	Ok(paths)
}

/// Default sequence tag of an input file: its name without the last extension.
#[must_use]
pub fn sequence_from_path(path: &Path) -> String {
	path
		.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_default()
}
