//! Settings value helpers

use serde_json::Value;

pub use worksuite_types::settings_adapter::{SettingEntry, SettingScope};

/// JSON type of a stored setting value, used for explicit type assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
	Null,
	Bool,
	Int,
	Float,
	String,
	List,
	Map,
}

impl ValueType {
	pub fn of(value: &Value) -> Self {
		match value {
			Value::Null => ValueType::Null,
			Value::Bool(_) => ValueType::Bool,
			Value::Number(n) if n.is_i64() || n.is_u64() => ValueType::Int,
			Value::Number(_) => ValueType::Float,
			Value::String(_) => ValueType::String,
			Value::Array(_) => ValueType::List,
			Value::Object(_) => ValueType::Map,
		}
	}

	/// Get the type name for error messages
	pub fn name(&self) -> &'static str {
		match self {
			ValueType::Null => "null",
			ValueType::Bool => "bool",
			ValueType::Int => "int",
			ValueType::Float => "float",
			ValueType::String => "string",
			ValueType::List => "list",
			ValueType::Map => "map",
		}
	}
}

/// Whether `key` is tagged with `category`.
///
/// Categories are a dot-prefix convention over keys: `"hrcore"` and `"hrcore.*"` both
/// match `"hrcore"` itself and every `"hrcore.<anything>"` key.
pub fn key_in_category(key: &str, category: &str) -> bool {
	let category = category.strip_suffix(".*").unwrap_or(category);
	if category.is_empty() {
		return false;
	}
	match key.strip_prefix(category) {
		Some("") => true,
		Some(rest) => rest.starts_with('.'),
		None => false,
	}
}


// vim: ts=4
