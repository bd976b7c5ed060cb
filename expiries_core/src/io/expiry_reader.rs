//! This module provides a line reader for expiry lists.
//!
//! # Overview
//!
//! `ExpiryReader` wraps any `BufRead` source and yields one [`ExpiryEntry`] per non-blank
//! line. A malformed line produces an error naming the source and the line number; the
//! caller is expected to abort on the first error.
//!
//! # Examples
//!
//! ```rust
//! use expiries_core::io::ExpiryReader;
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let data = "10/512/256\n\n11/1024/512\n";
//!     let entries = ExpiryReader::new(data.as_bytes(), "inline").collect::<Result<Vec<_>>>()?;
//!     assert_eq!(entries.len(), 2);
//!     Ok(())
//! }
//! ```

use crate::ExpiryEntry;
use anyhow::{Context, Result, ensure};
use std::{
	fs::File,
	io::{BufRead, BufReader, Lines},
	path::Path,
};

/// Iterator over the entries of an expiry list.
#[derive(Debug)]
pub struct ExpiryReader<R: BufRead> {
	name: String,
	lines: Lines<R>,
	line_number: usize,
}

impl ExpiryReader<BufReader<File>> {
	/// Opens the expiry list at `path`.
	pub fn open(path: &Path) -> Result<Self> {
		ensure!(path.is_file(), "expiry list {path:?} is not a file");
		let file = File::open(path).with_context(|| format!("Failed to open expiry list {path:?}"))?;
		log::debug!("opened expiry list {path:?}");
		Ok(ExpiryReader::new(BufReader::new(file), &path.to_string_lossy()))
	}
}

impl<R: BufRead> ExpiryReader<R> {
	/// Reads entries from `reader`; `name` is used in error messages.
	pub fn new(reader: R, name: &str) -> Self {
		ExpiryReader {
			name: name.to_owned(),
			lines: reader.lines(),
			line_number: 0,
		}
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Number of lines consumed so far, blank lines included.
	#[must_use]
	pub fn line_number(&self) -> usize {
		self.line_number
	}
}

impl<R: BufRead> Iterator for ExpiryReader<R> {
	type Item = Result<ExpiryEntry>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let line = match self.lines.next()? {
				Ok(line) => line,
				Err(err) => {
					return Some(Err(err).with_context(|| {
						format!("Failed to read line {} of '{}'", self.line_number + 1, self.name)
					}));
				}
			};
			self.line_number += 1;

			if line.trim().is_empty() {
				log::trace!("skipping blank line {} of '{}'", self.line_number, self.name);
				continue;
			}

			return Some(
				line
					.parse::<ExpiryEntry>()
					.with_context(|| format!("Failed to parse line {} of '{}'", self.line_number, self.name)),
			);
		}
	}
}
