pub use worksuite_types::error::{Error, SuiteResult};
pub use worksuite_types::types::{OwnerId, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
