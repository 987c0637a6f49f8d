//! Transaction-level encoding/decoding
//!
//! A transaction is a type-1 record followed by the records its CNT field
//! (1.003) lists, in that order:
//!
//! ```text
//! CNT = 1 <US> N  { <RS> type <US> IDC }×N
//! ```
//!
//! CNT is the only place the record types of a stream are declared, and it
//! decides whether each following record is tagged or binary.

use bytes::Bytes;
use an2k_types::{Encoding, RecordType, Version};
use tracing::{debug, trace, warn};

use crate::{
    binary,
    constants::{type1, RS, US},
    error::{Error, Result},
    field::Field,
    record::Record,
    tagged,
};

const T1: RecordType = RecordType::TRANSACTION_INFORMATION;

/// One CNT entry: the type and IDC of a record following type 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentEntry {
    pub record_type: RecordType,
    pub idc: u32,
}

/// Decode a complete transaction
///
/// # Errors
///
/// - [`Error::MalformedInput`] if any declared length, tag, or CNT entry
///   disagrees with the content, or bytes remain after the last record
/// - [`Error::UnsupportedVersion`] if 1.002 names an unknown revision
///
/// # Examples
///
/// ```
/// use an2k_core::codec;
/// use bytes::Bytes;
///
/// let buf = Bytes::from_static(
///     b"1.001:45\x1d1.002:0502\x1d1.003:1\x1f0\x1d1.005:20200115\x1c",
/// );
/// let mut records = codec::decode(buf.clone()).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(codec::encode(&mut records).unwrap(), buf);
/// ```
pub fn decode(buf: Bytes) -> Result<Vec<Record>> {
    if buf.is_empty() {
        return Err(Error::malformed(0, "empty input"));
    }

    let (header, mut offset) = tagged::decode(&buf, 0, T1)?;
    let version = read_version(&header)?;
    let entries = read_content(&header)?;

    debug!(%version, records = entries.len() + 1, len = buf.len(), "Decoding transaction");

    let mut records = Vec::with_capacity(entries.len() + 1);
    records.push(header);

    for (i, entry) in entries.iter().enumerate() {
        if offset >= buf.len() {
            return Err(Error::malformed(
                offset,
                format!("transaction ends after {} of {} listed records", i, entries.len()),
            ));
        }

        let rest = buf.slice(offset..);
        let (record, used) = match entry.record_type.encoding() {
            Encoding::Tagged => tagged::decode(&rest, offset, entry.record_type)?,
            Encoding::Binary => binary::decode(&rest, offset, entry.record_type)?,
        };

        match record.idc() {
            Ok(idc) if idc != entry.idc => warn!(
                index = i + 1,
                listed = entry.idc,
                found = idc,
                "IDC disagrees with transaction content field"
            ),
            Ok(_) => {}
            Err(e) => warn!(index = i + 1, error = %e, "Record has no readable IDC"),
        }

        trace!(index = i + 1, record_type = %entry.record_type, offset, len = used, "Decoded record");

        records.push(record);
        offset += used;
    }

    if offset != buf.len() {
        return Err(Error::malformed(
            offset,
            format!("{} trailing bytes after last record", buf.len() - offset),
        ));
    }

    Ok(records)
}

/// Encode a transaction, re-deriving every LEN field and the CNT field
///
/// # Errors
///
/// - [`Error::InvalidState`] if `records` is empty
/// - [`Error::Serialization`] if record 0 is not type 1, another type-1
///   record follows, the header's VER would be rejected on load, a record
///   type does not fit a tag, or any record cannot be encoded
/// - [`Error::Allocation`] if the output buffer cannot be reserved
pub fn encode(records: &mut [Record]) -> Result<Bytes> {
    let (header, rest) = records
        .split_first_mut()
        .ok_or_else(|| Error::InvalidState("transaction has no records".into()))?;

    if header.record_type() != T1 {
        return Err(Error::Serialization(format!(
            "first record must be type 1, found type {}",
            header.record_type()
        )));
    }

    read_version(header)
        .map_err(|e| Error::Serialization(format!("transaction header cannot be reloaded: {}", e)))?;

    let entries = rest
        .iter()
        .enumerate()
        .map(|(i, record)| {
            if !record.record_type().is_valid() {
                return Err(Error::Serialization(format!(
                    "record {} has type {}, outside 1..={}",
                    i + 1,
                    record.record_type(),
                    RecordType::MAX
                )));
            }
            if record.record_type() == T1 {
                return Err(Error::Serialization(format!(
                    "record {} is a second transaction information record",
                    i + 1
                )));
            }
            let idc = record.idc().map_err(|e| {
                Error::Serialization(format!("record {} has no IDC: {}", i + 1, e))
            })?;
            Ok(ContentEntry {
                record_type: record.record_type(),
                idc,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    write_content(header, &entries)?;

    let estimate = estimate_len(header) + rest.iter().map(estimate_len).sum::<usize>();
    let mut out = Vec::new();
    out.try_reserve(estimate)
        .map_err(|_| Error::Allocation { requested: estimate })?;

    tagged::encode(header, &mut out)?;
    for record in rest.iter_mut() {
        match record.record_type().encoding() {
            Encoding::Tagged => tagged::encode(record, &mut out)?,
            Encoding::Binary => binary::encode(record, &mut out)?,
        };
    }

    debug!(records = entries.len() + 1, len = out.len(), "Encoded transaction");

    Ok(Bytes::from(out))
}

/// Minimal transaction information record: LEN, VER and an empty CNT
pub fn new_header(version: Version) -> Result<Record> {
    let mut header = Record::new(T1);
    header.insert_field(Field::with_data(T1, type1::VERSION, version.to_string())?)?;
    write_content(&mut header, &[])?;
    Ok(header)
}

/// Parse field 1.003 into its entries
pub fn read_content(header: &Record) -> Result<Vec<ContentEntry>> {
    let field = header
        .field_by_number(type1::CONTENT)
        .map_err(|_| Error::malformed(0, "transaction has no CNT field"))?;

    let mut subfields = field.data().split(|&b| b == RS);

    let first = subfields
        .next()
        .ok_or_else(|| Error::malformed(0, "CNT is empty"))?;
    let declared = match split_items(first) {
        Some((b"1", count)) => parse_number(count)?,
        _ => return Err(Error::malformed(0, "CNT must start with 1<US>count")),
    };

    let entries = subfields
        .map(|sub| {
            let (t, idc) = split_items(sub)
                .ok_or_else(|| Error::malformed(0, "CNT entry is not type<US>IDC"))?;
            let record_type = std::str::from_utf8(t)
                .map_err(|_| Error::malformed(0, "CNT record type is not ASCII"))?
                .parse::<RecordType>()
                .map_err(|e| Error::malformed(0, format!("CNT entry: {}", e)))?;
            if record_type == T1 {
                return Err(Error::malformed(0, "CNT lists a second type-1 record"));
            }
            Ok(ContentEntry {
                record_type,
                idc: parse_number(idc)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if entries.len() != declared as usize {
        return Err(Error::malformed(
            0,
            format!("CNT declares {} records but lists {}", declared, entries.len()),
        ));
    }

    Ok(entries)
}

/// Parse field 1.002
pub fn read_version(header: &Record) -> Result<Version> {
    let field = header
        .field_by_number(type1::VERSION)
        .map_err(|_| Error::malformed(0, "transaction has no VER field"))?;
    let text = field.string_data();

    let version = Version::parse(&text).map_err(|e| Error::malformed(0, e.to_string()))?;
    if !version.is_supported() {
        return Err(Error::UnsupportedVersion(text.into_owned()));
    }
    Ok(version)
}

fn write_content(header: &mut Record, entries: &[ContentEntry]) -> Result<()> {
    let mut cnt = format!("1{}{}", US as char, entries.len());
    for entry in entries {
        cnt.push(RS as char);
        cnt.push_str(&format!("{}{}{:02}", entry.record_type, US as char, entry.idc));
    }

    match header.field_by_number_mut(type1::CONTENT) {
        Ok(field) => field.replace_data(cnt),
        Err(_) => {
            header.insert_field(Field::new(T1, type1::CONTENT, cnt))?;
        }
    }
    Ok(())
}

fn estimate_len(record: &Record) -> usize {
    // tag plus separator is at most 9 bytes for tagged fields
    record.fields().map(|f| f.data_len() + 9).sum()
}

fn split_items(subfield: &[u8]) -> Option<(&[u8], &[u8])> {
    let at = subfield.iter().position(|&b| b == US)?;
    Some((&subfield[..at], &subfield[at + 1..]))
}

fn parse_number(digits: &[u8]) -> Result<u32> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::malformed(0, format!("expected a number in CNT, got {:?}", String::from_utf8_lossy(digits))))
}
