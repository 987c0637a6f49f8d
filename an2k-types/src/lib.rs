//! Type definitions for an2k

pub mod date;
pub mod error;
pub mod record_type;
pub mod summary;
pub mod version;

pub use error::{Error, Result};
pub use record_type::{Encoding, RecordType};
pub use summary::{RecordSummary, Summary};
pub use version::Version;
