//! # an2k
//!
//! Reader and writer for ANSI/NIST-ITL (AN2K) biometric transaction files.
//!
//! ## Features
//!
//! - Load transactions from files or byte buffers
//! - Field access by index, field number or mnemonic
//! - In-place mutation with automatic LEN and CNT re-derivation on save
//! - Tagged and binary (types 3-8) records
//!
//! ## Quick Start
//!
//! ```no_run
//! use an2k::Transaction;
//!
//! fn main() -> an2k::Result<()> {
//!     let mut tr = Transaction::from_file("pass-all-supported-types.an2")?;
//!     println!("{}", tr.summary()?);
//!
//!     // Field 1.005 DAT of the transaction information record
//!     let dat = tr.get_mut(0)?.field_by_mnemonic_mut("DAT")?;
//!     let mut data = dat.data().to_vec();
//!     data[..4].copy_from_slice(b"2022");
//!     dat.set_data(data)?;
//!
//!     tr.to_file("saved-transaction.an2")?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod shared;
pub mod transaction;

// Re-exports
pub use error::{Error, Result};
pub use shared::SharedTransaction;
pub use transaction::Transaction;

// Re-export types
pub use an2k_core::{Field, FieldKey, Record};
pub use an2k_types::{RecordSummary, RecordType, Summary, Version};
