//! High-level error types

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Codec error: {0}")]
    Core(#[from] an2k_core::Error),
    
    #[error("Type error: {0}")]
    Types(#[from] an2k_types::Error),
    
    /// Input path missing or unreadable (directory, permissions, short read)
    #[error("File not found or unreadable: {}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is the non-fatal buffer sizing signal
    pub fn is_sizing_signal(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_sizing_signal())
    }
    
    /// Check if the input bytes were rejected
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_malformed())
    }
}
