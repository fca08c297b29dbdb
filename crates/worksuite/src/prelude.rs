pub use worksuite_types::prelude::*;

// vim: ts=4
