//! Error type shared by the core, the adapters and the application crate.

use std::time::Duration;

pub type SuiteResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Adapter-internal "row not found". Never surfaced by settings or capability reads,
	/// which resolve absence to a default or `None`.
	NotFound,
	PermissionDenied,
	/// A caller asserted a type for a setting value that the stored value does not have
	InvalidType {
		key: Box<str>,
		expected: &'static str,
		actual: &'static str,
	},
	/// The operation needs the module to exist in the registry
	ModuleNotRegistered(Box<str>),
	/// Any storage-layer error
	PersistenceFailure(String),
	/// Rejected by the rate gate at the given tier ("global" or "user")
	RateLimitExceeded {
		scope: &'static str,
		retry_after: Duration,
	},
	ValidationError(String),
	ConfigError(String),
	Internal(String),
	Parse,

	// externals
	Io(std::io::Error),
}

impl Error {
	/// True for rejections that warrant a retry-later response
	pub fn is_rate_limited(&self) -> bool {
		matches!(self, Error::RateLimitExceeded { .. })
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::debug!("JSON error: {}", err);
		Self::Parse
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::InvalidType { key, expected, actual } => {
				write!(f, "setting '{}' is not {}, got {}", key, expected, actual)
			}
			Error::ModuleNotRegistered(name) => write!(f, "module '{}' is not registered", name),
			Error::PersistenceFailure(msg) => write!(f, "persistence failure: {}", msg),
			Error::RateLimitExceeded { scope, retry_after } => {
				write!(f, "rate limited at {} level, retry after {:?}", scope, retry_after)
			}
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Parse => write!(f, "parse error"),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_invalid_type_display() {
		let err = Error::InvalidType { key: "hrcore.max_leave".into(), expected: "int", actual: "string" };
		assert_eq!(err.to_string(), "setting 'hrcore.max_leave' is not int, got string");
	}

	#[test]
	fn test_rate_limited_is_distinguishable() {
		let limited = Error::RateLimitExceeded { scope: "user", retry_after: Duration::from_secs(12) };
		assert!(limited.is_rate_limited());
		assert!(!Error::PersistenceFailure("disk full".into()).is_rate_limited());
		assert!(!Error::PermissionDenied.is_rate_limited());
	}

	#[test]
	fn test_serde_json_error_maps_to_parse() {
		let res: Result<serde_json::Value, _> = serde_json::from_str("{not json");
		let err: Error = res.unwrap_err().into();
		assert!(matches!(err, Error::Parse));
	}
}

// vim: ts=4
