//! Attribute schema of the expiry containers and the records written against it.
//!
//! Every container of a run carries the same fields:
//!
//! | name       | type    | width |
//! |------------|---------|-------|
//! | `sequence` | string  | 12    |
//! | `zoom`     | integer | 3     |
//! | `x`        | integer | 8     |
//! | `y`        | integer | 8     |
//!
//! `x` and `y` are only present when tile ids are requested.

use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldType {
	String,
	Integer,
}

/// Definition of one attribute column.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDef {
	pub name: String,
	pub field_type: FieldType,
	/// Maximum width in characters, as reserved by fixed-width attribute tables.
	pub width: u8,
}

impl FieldDef {
	pub fn new(name: &str, field_type: FieldType, width: u8) -> FieldDef {
		FieldDef {
			name: name.to_owned(),
			field_type,
			width,
		}
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schema {
	fields: Vec<FieldDef>,
}

impl Schema {
	pub const SEQUENCE: &'static str = "sequence";
	pub const ZOOM: &'static str = "zoom";
	pub const X: &'static str = "x";
	pub const Y: &'static str = "y";

	/// The expiry schema, with `x` and `y` columns if `tile_ids` is set.
	#[must_use]
	pub fn expiries(tile_ids: bool) -> Schema {
		let mut fields = vec![
			FieldDef::new(Self::SEQUENCE, FieldType::String, 12),
			FieldDef::new(Self::ZOOM, FieldType::Integer, 3),
		];
		if tile_ids {
			fields.push(FieldDef::new(Self::X, FieldType::Integer, 8));
			fields.push(FieldDef::new(Self::Y, FieldType::Integer, 8));
		}
		Schema { fields }
	}

	#[must_use]
	pub fn fields(&self) -> &[FieldDef] {
		&self.fields
	}

	#[must_use]
	pub fn field(&self, name: &str) -> Option<&FieldDef> {
		self.fields.iter().find(|field| field.name == name)
	}

	#[must_use]
	pub fn has_tile_ids(&self) -> bool {
		self.field(Self::X).is_some() && self.field(Self::Y).is_some()
	}

	/// Sum of the declared widths of all fields.
	#[must_use]
	pub fn total_width(&self) -> u64 {
		self.fields.iter().map(|field| u64::from(field.width)).sum()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
	String(String),
	Integer(i64),
}

impl fmt::Display for AttributeValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AttributeValue::String(value) => f.write_str(value),
			AttributeValue::Integer(value) => write!(f, "{value}"),
		}
	}
}

/// Attribute values of one feature, in schema order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeRecord(Vec<(String, AttributeValue)>);

impl AttributeRecord {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(&mut self, name: &str, value: AttributeValue) {
		match self.0.iter_mut().find(|(key, _)| key == name) {
			Some((_, slot)) => *slot = value,
			None => self.0.push((name.to_owned(), value)),
		}
	}

	#[must_use]
	pub fn with(mut self, name: &str, value: AttributeValue) -> Self {
		self.set(name, value);
		self
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&AttributeValue> {
		self.0.iter().find(|(key, _)| key == name).map(|(_, value)| value)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn schema_without_ids() {
		let schema = Schema::expiries(false);
		let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
		assert_eq!(names, vec!["sequence", "zoom"]);
		assert_eq!(schema.total_width(), 15);
		assert!(!schema.has_tile_ids());
	}

	#[test]
	fn schema_with_ids() {
		let schema = Schema::expiries(true);
		assert_eq!(
			schema.fields(),
			&[
				FieldDef::new("sequence", FieldType::String, 12),
				FieldDef::new("zoom", FieldType::Integer, 3),
				FieldDef::new("x", FieldType::Integer, 8),
				FieldDef::new("y", FieldType::Integer, 8),
			]
		);
		assert_eq!(schema.total_width(), 31);
		assert!(schema.has_tile_ids());
	}

	#[test]
	fn record_keeps_insertion_order_and_overwrites() {
		let mut record = AttributeRecord::new()
			.with("sequence", AttributeValue::String("0042".into()))
			.with("zoom", AttributeValue::Integer(10));
		record.set("sequence", AttributeValue::String("0043".into()));

		let entries: Vec<String> = record.iter().map(|(k, v)| format!("{k}={v}")).collect();
		assert_eq!(entries, vec!["sequence=0043", "zoom=10"]);
		assert_eq!(record.get("zoom"), Some(&AttributeValue::Integer(10)));
		assert_eq!(record.get("x"), None);
		assert_eq!(record.len(), 2);
	}
}
