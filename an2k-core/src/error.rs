//! Error types for an2k-core

use an2k_types::RecordType;

/// Result type alias for an2k operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core codec errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Buffer reservation failed
    #[error("Allocation of {requested} bytes failed")]
    Allocation {
        requested: usize,
    },
    
    /// Declared lengths or structure do not match the actual content
    #[error("Malformed input at offset {offset}: {reason}")]
    MalformedInput {
        offset: usize,
        reason: String,
    },
    
    /// Field 1.002 declares a revision this codec does not know
    #[error("Unsupported AN2K version: {0}")]
    UnsupportedVersion(String),
    
    /// Positional access past the end of a collection
    #[error("Index {index} out of range (count: {count})")]
    IndexOutOfRange {
        index: usize,
        count: usize,
    },
    
    /// No field matches the lookup key
    #[error("Field not found in type-{record_type} record: {key}")]
    FieldNotFound {
        record_type: RecordType,
        key: String,
    },
    
    /// New payload violates the field's mandated width
    #[error("Invalid length for field {field}: {actual} bytes (allowed: {allowed})")]
    InvalidLength {
        field: String,
        actual: usize,
        allowed: String,
    },
    
    /// In-memory state cannot be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
    
    /// Operation not valid for the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
    
    /// Caller buffer too small; retry with at least `required` bytes
    #[error("Insufficient buffer: {required} bytes required, {provided} provided")]
    InsufficientBuffer {
        required: usize,
        provided: usize,
    },
}

impl Error {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            offset,
            reason: reason.into(),
        }
    }
    
    /// Check if this is the non-fatal buffer sizing signal
    pub fn is_sizing_signal(&self) -> bool {
        matches!(self, Self::InsufficientBuffer { .. })
    }
    
    /// Check if the input bytes were rejected
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedInput { .. }
                | Self::UnsupportedVersion(_)
        )
    }
}

