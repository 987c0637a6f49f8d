//! Tagged (ASCII) record encoding/decoding
//!
//! # Record Structure
//!
//! ```text
//! T.001:LEN <GS> T.002:IDC <GS> ... <GS> T.NNN:value <FS>
//! ```
//!
//! LEN counts every byte of the record including its own digits and the
//! trailing FS. Field 999 holds image data that may contain separator
//! bytes, so it always runs to the end of the record.

use bytes::{BufMut, Bytes};
use an2k_types::RecordType;
use tracing::trace;

use crate::{
    constants::{FS, GS, IMAGE_DATA_FIELD, LEN_FIELD, TAG_COLON, TAG_DOT, TAG_NUMBER_DIGITS},
    error::{Error, Result},
    field::Field,
    record::Record,
};

/// Decode one tagged record from the front of `buf`
///
/// `offset` is the position of `buf` within the whole transaction and is
/// only used in error reports. Returns the record and the bytes consumed.
pub fn decode(buf: &Bytes, offset: usize, expected: RecordType) -> Result<(Record, usize)> {
    let (record_type, number, value_start) = parse_tag(buf, 0, offset)?;
    if record_type != expected || number != LEN_FIELD {
        return Err(Error::malformed(
            offset,
            format!("expected {}.001 LEN, found {}.{:03}", expected, record_type, number),
        ));
    }

    let value_end = buf[value_start..]
        .iter()
        .position(|&b| b == GS || b == FS)
        .map(|p| value_start + p)
        .ok_or_else(|| Error::malformed(offset, "unterminated LEN field"))?;
    let len = parse_decimal(&buf[value_start..value_end])
        .ok_or_else(|| Error::malformed(offset, "LEN is not a decimal number"))?;

    if len > buf.len() {
        return Err(Error::malformed(
            offset,
            format!("type-{} LEN declares {} bytes, only {} available", expected, len, buf.len()),
        ));
    }
    if len <= value_end || buf[len - 1] != FS {
        return Err(Error::malformed(
            offset,
            format!("type-{} LEN {} does not end on a record separator", expected, len),
        ));
    }

    let body = buf.slice(..len - 1);
    let mut fields = Vec::new();
    let mut pos = 0;

    while pos < body.len() {
        let (field_type, number, start) = parse_tag(&body, pos, offset)?;
        if field_type != expected {
            return Err(Error::malformed(
                offset + pos,
                format!("field {}.{:03} inside type-{} record", field_type, number, expected),
            ));
        }

        let end = if number == IMAGE_DATA_FIELD {
            body.len()
        } else {
            let end = body[start..]
                .iter()
                .position(|&b| b == GS)
                .map_or(body.len(), |p| start + p);
            if body[start..end].contains(&FS) {
                return Err(Error::malformed(
                    offset + start,
                    format!("field {}.{:03} runs past a record terminator", field_type, number),
                ));
            }
            end
        };

        trace!(field_type = %field_type, number, len = end - start, "Decoded field");
        fields.push(Field::new(field_type, number, body.slice(start..end)));

        pos = end + 1;
        if pos == body.len() {
            return Err(Error::malformed(offset + end, "empty field after group separator"));
        }
    }

    let record = Record::from_fields(expected, fields).map_err(|e| match e {
        Error::MalformedInput { offset: _, reason } => Error::MalformedInput { offset, reason },
        other => other,
    })?;

    Ok((record, len))
}

/// Derive LEN for `record` and append its encoding to `out`
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// [`Error::Serialization`] if LEN is not the first field, the image data
/// field is not the last, or a text value contains a field/group separator.
pub fn encode(record: &mut Record, out: &mut Vec<u8>) -> Result<usize> {
    let record_type = record.record_type();
    let count = record.count();

    let mut content = 0;
    for (i, field) in record.fields().enumerate() {
        match (i, field.number()) {
            (0, LEN_FIELD) => continue,
            (0, n) => {
                return Err(Error::Serialization(format!(
                    "type-{} record starts with field {:03} instead of LEN",
                    record_type, n
                )));
            }
            (_, IMAGE_DATA_FIELD) if i + 1 != count => {
                return Err(Error::Serialization(format!(
                    "field {} must be the last field of its record",
                    field.key()
                )));
            }
            (_, IMAGE_DATA_FIELD) => {}
            _ if field.data().iter().any(|&b| b == FS || b == GS) => {
                return Err(Error::Serialization(format!(
                    "field {} contains a field or group separator",
                    field.key()
                )));
            }
            _ => {}
        }
        content += tag_len(record_type, field.number()) + field.data_len();
    }

    // one separator after every field, GS between and FS at the end
    let base = content + count + tag_len(record_type, LEN_FIELD);
    let total = solve_len(base);

    record.len_field_mut()?.replace_data(Bytes::from(total.to_string()));

    for (i, field) in record.fields().enumerate() {
        put_tag(out, record_type, field.number());
        out.put_slice(field.data());
        out.put_u8(if i + 1 == count { FS } else { GS });
    }

    trace!(record_type = %record_type, fields = count, len = total, "Encoded tagged record");

    Ok(total)
}

/// Find the record length when LEN's own digits are part of it
fn solve_len(base: usize) -> usize {
    let mut digits = 1;
    loop {
        let total = base + digits;
        if decimal_digits(total) == digits {
            return total;
        }
        digits += 1;
    }
}

fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

fn tag_len(record_type: RecordType, number: u16) -> usize {
    decimal_digits(record_type.value() as usize)
        + 1
        + decimal_digits(number as usize).max(TAG_NUMBER_DIGITS)
        + 1
}

fn put_tag(out: &mut Vec<u8>, record_type: RecordType, number: u16) {
    out.put_slice(format!("{}.{:03}:", record_type, number).as_bytes());
}

/// Parse `T.NNN:` starting at `pos`; returns type, number and value start
fn parse_tag(buf: &[u8], pos: usize, offset: usize) -> Result<(RecordType, u16, usize)> {
    let bad_tag = || Error::malformed(offset + pos, "invalid field tag");

    let rest = buf.get(pos..).ok_or_else(bad_tag)?;
    let dot = rest.iter().position(|&b| b == TAG_DOT).ok_or_else(bad_tag)?;
    let colon = rest[dot + 1..]
        .iter()
        .position(|&b| b == TAG_COLON)
        .map(|p| dot + 1 + p)
        .ok_or_else(bad_tag)?;

    let record_type = parse_decimal(&rest[..dot])
        .and_then(|t| u32::try_from(t).ok())
        .and_then(|t| RecordType::try_from(t).ok())
        .ok_or_else(bad_tag)?;
    let number = parse_decimal(&rest[dot + 1..colon])
        .and_then(|n| u16::try_from(n).ok())
        .ok_or_else(bad_tag)?;

    Ok((record_type, number, pos + colon + 1))
}

/// Parse ASCII digits; `None` on empty input, a non-digit, or overflow
fn parse_decimal(digits: &[u8]) -> Option<usize> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0usize, |acc, &d| {
        if !d.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(usize::from(d - b'0'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const T2: RecordType = RecordType::DESCRIPTIVE_TEXT;
    const TYPE2: &[u8] = b"2.001:30\x1d2.002:00\x1d2.003:HELLO\x1c";

    #[test]
    fn test_decode_type2() {
        let (rec, used) = decode(&Bytes::from_static(TYPE2), 0, T2).unwrap();

        assert_eq!(used, 30);
        assert_eq!(rec.count(), 3);
        assert_eq!(rec.declared_len().unwrap(), 30);
        assert_eq!(rec.idc().unwrap(), 0);
        assert_eq!(rec.field_by_number(3).unwrap().string_data(), "HELLO");
    }

    #[test]
    fn test_decode_stops_at_len() {
        let mut buf = TYPE2.to_vec();
        buf.extend_from_slice(b"trailing");
        let (_, used) = decode(&Bytes::from(buf), 0, T2).unwrap();
        assert_eq!(used, 30);
    }

    #[test]
    fn test_encode_is_inverse() {
        let (mut rec, _) = decode(&Bytes::from_static(TYPE2), 0, T2).unwrap();
        let mut out = Vec::new();
        let written = encode(&mut rec, &mut out).unwrap();

        assert_eq!(written, 30);
        assert_eq!(out.as_slice(), TYPE2);
    }

    #[test]
    fn test_len_digit_rollover() {
        // 2.001:LL<GS>2.002:00<GS>2.003:<value><FS> is 25 bytes plus the value
        let mut rec = Record::new(T2);
        rec.insert_field(Field::new(T2, 2, "00")).unwrap();
        rec.insert_field(Field::new(T2, 3, "x".repeat(74))).unwrap();

        let mut out = Vec::new();
        let total = encode(&mut rec, &mut out).unwrap();
        assert_eq!(total, 99);
        assert_eq!(out.len(), 99);

        // one more byte would be 100, which needs a third LEN digit
        rec.field_by_number_mut(3).unwrap().set_data("x".repeat(75)).unwrap();
        out.clear();
        let total = encode(&mut rec, &mut out).unwrap();
        assert_eq!(total, 101);
        assert_eq!(out.len(), 101);
        assert_eq!(rec.field(0).unwrap().string_data(), "101");

        let (decoded, used) = decode(&Bytes::from(out), 0, T2).unwrap();
        assert_eq!(used, 101);
        assert_eq!(decoded, rec);
    }

    #[test]
    fn test_image_data_may_contain_separators() {
        let t14 = RecordType::FINGERPRINT_IMAGE;
        let mut rec = Record::new(t14);
        rec.insert_field(Field::new(t14, 2, "01")).unwrap();
        rec.insert_field(Field::new(t14, 999, vec![0x1Cu8, 0x1D, 0x00, 0xFF])).unwrap();

        let mut out = Vec::new();
        encode(&mut rec, &mut out).unwrap();

        let (decoded, used) = decode(&Bytes::from(out.clone()), 0, t14).unwrap();
        assert_eq!(used, out.len());
        assert_eq!(decoded.field_by_mnemonic("DATA").unwrap().data(), &[0x1C, 0x1D, 0x00, 0xFF]);
    }

    #[test]
    fn test_encode_rejects_separator_in_text() {
        let mut rec = Record::new(T2);
        rec.insert_field(Field::new(T2, 3, "a\x1db")).unwrap();
        let err = encode(&mut rec, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_encode_rejects_image_data_not_last() {
        let t14 = RecordType::FINGERPRINT_IMAGE;
        let mut rec = Record::from_fields(
            t14,
            vec![
                Field::new(t14, 1, ""),
                Field::new(t14, 999, "img"),
                Field::new(t14, 2, "01"),
            ],
        )
        .unwrap();
        assert!(matches!(encode(&mut rec, &mut Vec::new()), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_len_too_long() {
        let buf = b"2.001:31\x1d2.002:00\x1d2.003:HELLO\x1c";
        let err = decode(&Bytes::from_static(buf), 0, T2).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_len_too_short() {
        let buf = b"2.001:29\x1d2.002:00\x1d2.003:HELLO\x1c";
        let err = decode(&Bytes::from_static(buf), 0, T2).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_len_overruns_into_next_record() {
        let mut buf = b"2.001:39\x1d2.002:00\x1d2.003:HELLO\x1c".to_vec();
        buf.extend_from_slice(b"2.001:10\x1c");
        assert_eq!(buf.len(), 39);
        let err = decode(&Bytes::from(buf), 0, T2).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_wrong_record_type() {
        let err = decode(&Bytes::from_static(TYPE2), 0, RecordType::MINUTIAE).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_bad_tags() {
        for buf in [
            &b"2.001:17\x1d2002:00\x1c"[..],
            &b"2.001:17\x1d2.0x2:00\x1c"[..],
            &b"x.001:10\x1c"[..],
            &b"2.001\x1c"[..],
        ] {
            assert!(decode(&Bytes::copy_from_slice(buf), 0, T2).is_err(), "{:?}", buf);
        }
    }

    #[test]
    fn test_duplicate_field() {
        let buf = b"2.001:27\x1d2.002:00\x1d2.002:01\x1c";
        let err = decode(&Bytes::from_static(buf), 0, T2).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_offset_reported() {
        let err = decode(&Bytes::from_static(b"2.001:99\x1c"), 120, T2).unwrap_err();
        match err {
            Error::MalformedInput { offset, .. } => assert_eq!(offset, 120),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_solve_len() {
        assert_eq!(solve_len(7), 8);
        assert_eq!(solve_len(8), 9);
        assert_eq!(solve_len(9), 11);
        assert_eq!(solve_len(97), 99);
        assert_eq!(solve_len(98), 101);
    }

    #[test]
    fn test_parse_decimal_has_no_digit_cap() {
        assert_eq!(parse_decimal(b"1000000000"), Some(1_000_000_000));
        assert_eq!(parse_decimal(b"0000000000042"), Some(42));
        assert_eq!(parse_decimal(b""), None);
        assert_eq!(parse_decimal(b"12a"), None);
        assert_eq!(parse_decimal(b"99999999999999999999999"), None);
    }

    #[test]
    fn test_ten_digit_len_is_read() {
        let err = decode(&Bytes::from_static(b"2.001:1000000000\x1c"), 0, T2).unwrap_err();
        match err {
            Error::MalformedInput { reason, .. } => assert!(reason.contains("1000000000"), "{}", reason),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
