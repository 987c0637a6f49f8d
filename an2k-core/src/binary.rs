//! Binary record encoding/decoding (types 3-8)
//!
//! # Record Structure
//!
//! ```text
//! ┌───────────┬───────────┬─────────────────────────┬──────────────┐
//! │    LEN    │    IDC    │  type-specific header   │     DATA     │
//! │  4 bytes  │  1 byte   │  fixed widths per type  │   N bytes    │
//! │ (BE u32)  │           │                         │              │
//! └───────────┴───────────┴─────────────────────────┴──────────────┘
//! ```
//!
//! Field widths come from the dictionary: every entry of a binary type is
//! fixed-width except the trailing data field.

use byteorder::{BigEndian, ByteOrder};
use bytes::{BufMut, Bytes};
use an2k_types::RecordType;
use tracing::trace;

use crate::{
    constants::BINARY_LEN_WIDTH,
    dictionary::{self, FieldDef},
    error::{Error, Result},
    field::Field,
    record::Record,
};

/// Field layout of a binary record type, header first, data last
fn layout(record_type: RecordType) -> Result<Vec<&'static FieldDef>> {
    let defs: Vec<_> = dictionary::fields_of(record_type).collect();
    if !record_type.is_binary() || defs.is_empty() {
        return Err(Error::InvalidState(format!(
            "type {} has no binary layout",
            record_type
        )));
    }
    Ok(defs)
}

/// Size of the fixed header of a binary record type
pub fn header_len(record_type: RecordType) -> Result<usize> {
    Ok(layout(record_type)?
        .iter()
        .filter_map(|d| d.width.fixed())
        .sum())
}

/// Decode one binary record from the front of `buf`
///
/// Returns the record and the bytes consumed.
pub fn decode(buf: &Bytes, offset: usize, record_type: RecordType) -> Result<(Record, usize)> {
    let defs = layout(record_type)?;
    let header = header_len(record_type)?;

    if buf.len() < BINARY_LEN_WIDTH {
        return Err(Error::malformed(
            offset,
            format!("type-{} record truncated before its length prefix", record_type),
        ));
    }

    let len = BigEndian::read_u32(&buf[..BINARY_LEN_WIDTH]) as usize;

    if len < header {
        return Err(Error::malformed(
            offset,
            format!("type-{} LEN {} is shorter than its {}-byte header", record_type, len, header),
        ));
    }
    if len > buf.len() {
        return Err(Error::malformed(
            offset,
            format!("type-{} LEN declares {} bytes, only {} available", record_type, len, buf.len()),
        ));
    }

    let mut fields = Vec::with_capacity(defs.len());
    let mut pos = 0;

    for def in defs {
        let end = match def.width.fixed() {
            Some(w) => pos + w,
            None => len,
        };
        fields.push(Field::new(record_type, def.number, buf.slice(pos..end)));
        pos = end;
    }

    trace!(
        record_type = %record_type,
        len,
        header = %hex::encode(&buf[..header]),
        "Decoded binary record"
    );

    Ok((Record::from_fields(record_type, fields)?, len))
}

/// Derive LEN for `record` and append its encoding to `out`
///
/// # Errors
///
/// [`Error::Serialization`] if a layout field is missing, has the wrong
/// width, or the record holds fields outside its layout.
pub fn encode(record: &mut Record, out: &mut Vec<u8>) -> Result<usize> {
    let record_type = record.record_type();
    let defs = layout(record_type)?;

    if record.count() != defs.len() {
        return Err(Error::Serialization(format!(
            "type-{} record has {} fields, layout defines {}",
            record_type,
            record.count(),
            defs.len()
        )));
    }

    let mut total = 0usize;
    for def in &defs {
        let field = record.field_by_number(def.number).map_err(|_| {
            Error::Serialization(format!("type-{} record lacks field {}", record_type, def.mnemonic))
        })?;

        if let Some(w) = def.width.fixed() {
            if field.data_len() != w {
                return Err(Error::Serialization(format!(
                    "field {} is {} bytes, layout requires {}",
                    field.key(),
                    field.data_len(),
                    w
                )));
            }
        }
        total += field.data_len();
    }

    let len = u32::try_from(total).map_err(|_| {
        Error::Serialization(format!("type-{} record of {} bytes exceeds LEN range", record_type, total))
    })?;

    let mut prefix = [0u8; BINARY_LEN_WIDTH];
    BigEndian::write_u32(&mut prefix, len);
    record.len_field_mut()?.replace_data(Bytes::copy_from_slice(&prefix));

    for def in &defs {
        out.put_slice(record.field_by_number(def.number)?.data());
    }

    trace!(record_type = %record_type, len = total, "Encoded binary record");

    Ok(total)
}
