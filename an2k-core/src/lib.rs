//! # an2k-core
//!
//! Core codec for ANSI/NIST-ITL (AN2K) transaction files.
//!
//! This crate provides the low-level building blocks:
//! - Field and record containers
//! - Field dictionary (mnemonics, descriptions, widths)
//! - Tagged and binary record encoding/decoding
//! - Transaction-level decoding driven by the CNT field
//! - Caller-buffer output for the size-then-fetch convention

pub mod binary;
pub mod buffer;
pub mod codec;
pub mod constants;
pub mod dictionary;
pub mod error;
pub mod field;
pub mod record;
pub mod tagged;

pub use codec::ContentEntry;
pub use dictionary::{FieldDef, Width};
pub use error::{Error, Result};
pub use field::{Field, FieldKey};
pub use record::Record;
