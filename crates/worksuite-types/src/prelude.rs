pub use crate::error::{Error, SuiteResult};
pub use crate::types::{OwnerId, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
