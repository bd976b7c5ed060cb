use crate::MAX_ZOOM;
use anyhow::{Result, ensure};
use std::fmt;

/// Inclusive range of zoom levels selected for export.
///
/// Entries whose zoom lies outside the range are dropped silently by the reader's caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ZoomRange {
	min: u8,
	max: u8,
}

impl ZoomRange {
	pub const DEFAULT_MIN: u8 = 0;
	pub const DEFAULT_MAX: u8 = 25;

	/// Create a range from `min` to `max`, both inclusive.
	///
	/// # Errors
	/// Returns an error if `min` > `max` or if `max` exceeds [`MAX_ZOOM`].
	pub fn new(min: u8, max: u8) -> Result<ZoomRange> {
		ensure!(min <= max, "minimum zoom ({min}) must be <= maximum zoom ({max})");
		ensure!(max <= MAX_ZOOM, "maximum zoom ({max}) must be <= {MAX_ZOOM}");
		Ok(ZoomRange { min, max })
	}

	#[must_use]
	pub fn min(&self) -> u8 {
		self.min
	}

	#[must_use]
	pub fn max(&self) -> u8 {
		self.max
	}

	/// Whether `zoom` lies within the range. Takes the raw value of an expiry entry, which
	/// may be negative or far beyond the pyramid.
	#[must_use]
	pub fn contains(&self, zoom: i64) -> bool {
		(i64::from(self.min)..=i64::from(self.max)).contains(&zoom)
	}
}

impl Default for ZoomRange {
	fn default() -> Self {
		ZoomRange {
			min: Self::DEFAULT_MIN,
			max: Self::DEFAULT_MAX,
		}
	}
}

impl fmt::Display for ZoomRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}, {}]", self.min, self.max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(0, true)]
	#[case(10, true)]
	#[case(25, true)]
	#[case(26, false)]
	#[case(30, false)]
	#[case(300, false)]
	#[case(-1, false)]
	fn default_range(#[case] zoom: i64, #[case] expected: bool) {
		assert_eq!(ZoomRange::default().contains(zoom), expected);
	}

	#[test]
	fn custom_range_excludes_lower_levels() {
		let range = ZoomRange::new(6, 25).unwrap();
		assert!(!range.contains(5));
		assert!(range.contains(6));
		assert_eq!(range.to_string(), "[6, 25]");
	}

	#[test]
	fn rejects_inverted_range() {
		assert_eq!(
			ZoomRange::new(12, 10).unwrap_err().to_string(),
			"minimum zoom (12) must be <= maximum zoom (10)"
		);
	}

	#[test]
	fn rejects_zoom_beyond_pyramid() {
		assert_eq!(
			ZoomRange::new(0, 31).unwrap_err().to_string(),
			"maximum zoom (31) must be <= 30"
		);
	}
}
