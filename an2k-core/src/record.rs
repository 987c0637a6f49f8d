//! Record: a typed, ordered collection of fields

use std::fmt;

use bytes::Bytes;
use an2k_types::RecordType;
use tracing::trace;

use crate::{
    constants::{IDC_FIELD, LEN_FIELD},
    dictionary,
    error::{Error, Result},
    field::Field,
};

/// A logical record
///
/// Field numbers are unique and field 1 (LEN) is always present. Fields keep
/// the order they were decoded in; [`Record::insert_field`] places new fields
/// by number.
///
/// # Examples
///
/// ```
/// use an2k_core::{Field, Record};
/// use an2k_types::RecordType;
///
/// let mut rec = Record::new(RecordType::DESCRIPTIVE_TEXT);
/// rec.insert_field(Field::new(RecordType::DESCRIPTIVE_TEXT, 2, "00")).unwrap();
///
/// assert_eq!(rec.count(), 2);
/// assert_eq!(rec.idc().unwrap(), 0);
/// assert_eq!(rec.field_by_mnemonic("IDC").unwrap().number(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    record_type: RecordType,
    fields: Vec<Field>,
}

impl Record {
    /// Create a record holding only its mandatory fields
    ///
    /// Tagged records start with an empty LEN; binary records get every
    /// fixed header field zero-filled and an empty data field.
    pub fn new(record_type: RecordType) -> Self {
        let fields = if record_type.is_binary() {
            dictionary::fields_of(record_type)
                .map(|d| {
                    let fill = d.width.fixed().unwrap_or(0);
                    Field::new(record_type, d.number, vec![0u8; fill])
                })
                .collect()
        } else {
            vec![Field::new(record_type, LEN_FIELD, Bytes::new())]
        };

        Self { record_type, fields }
    }

    /// Build a record from decoded fields
    ///
    /// # Errors
    ///
    /// [`Error::MalformedInput`] if a field belongs to another record type,
    /// a number repeats, or LEN is missing.
    pub fn from_fields(record_type: RecordType, fields: Vec<Field>) -> Result<Self> {
        let mut seen = std::collections::HashSet::with_capacity(fields.len());

        for field in &fields {
            if field.record_type() != record_type {
                return Err(Error::malformed(
                    0,
                    format!("field {} inside type-{} record", field.key(), record_type),
                ));
            }
            if !seen.insert(field.number()) {
                return Err(Error::malformed(0, format!("duplicate field {}", field.key())));
            }
        }

        if !seen.contains(&LEN_FIELD) {
            return Err(Error::malformed(
                0,
                format!("type-{} record has no LEN field", record_type),
            ));
        }

        Ok(Self { record_type, fields })
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn is_binary(&self) -> bool {
        self.record_type.is_binary()
    }

    /// Number of fields
    pub fn count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.fields.iter_mut()
    }

    /// Field at position `index`
    pub fn field(&self, index: usize) -> Result<&Field> {
        let count = self.count();
        self.fields
            .get(index)
            .ok_or_else(|| self.not_found(format!("index {} (count: {})", index, count)))
    }

    pub fn field_mut(&mut self, index: usize) -> Result<&mut Field> {
        let count = self.count();
        if index >= count {
            return Err(self.not_found(format!("index {} (count: {})", index, count)));
        }
        Ok(&mut self.fields[index])
    }

    /// Field with number `number` (e.g. 5 for 1.005)
    pub fn field_by_number(&self, number: u16) -> Result<&Field> {
        self.position(number)
            .map(|i| &self.fields[i])
            .ok_or_else(|| self.not_found(format!("number {}", number)))
    }

    pub fn field_by_number_mut(&mut self, number: u16) -> Result<&mut Field> {
        match self.position(number) {
            Some(i) => Ok(&mut self.fields[i]),
            None => Err(self.not_found(format!("number {}", number))),
        }
    }

    /// Field with mnemonic `mnemonic` (e.g. `DAT`), case-insensitive
    pub fn field_by_mnemonic(&self, mnemonic: &str) -> Result<&Field> {
        let number = self.resolve_mnemonic(mnemonic)?;
        self.field_by_number(number)
    }

    pub fn field_by_mnemonic_mut(&mut self, mnemonic: &str) -> Result<&mut Field> {
        let number = self.resolve_mnemonic(mnemonic)?;
        self.field_by_number_mut(number)
    }

    /// Information Designation Character
    ///
    /// Tagged records store it as decimal text in field 2, binary records as
    /// a single byte. The transaction information record has none.
    pub fn idc(&self) -> Result<u32> {
        if self.record_type == RecordType::TRANSACTION_INFORMATION {
            return Err(self.not_found("IDC".to_string()));
        }

        let field = self.field_by_number(IDC_FIELD)?;

        if self.is_binary() {
            return match field.data() {
                [b] => Ok(u32::from(*b)),
                other => Err(Error::malformed(
                    0,
                    format!("binary IDC must be 1 byte, got {}", other.len()),
                )),
            };
        }

        let text = field.string_data();
        text.trim().parse().map_err(|_| {
            Error::malformed(0, format!("IDC {:?} is not a number", text))
        })
    }

    /// Set the IDC, encoded for this record's layout
    pub fn set_idc(&mut self, idc: u32) -> Result<()> {
        if self.record_type == RecordType::TRANSACTION_INFORMATION {
            return Err(self.not_found("IDC".to_string()));
        }

        let data = if self.is_binary() {
            let b = u8::try_from(idc).map_err(|_| Error::InvalidLength {
                field: format!("{}.{:03}", self.record_type, IDC_FIELD),
                actual: idc.to_string().len(),
                allowed: "0..=255".to_string(),
            })?;
            Bytes::copy_from_slice(&[b])
        } else {
            Bytes::from(format!("{:02}", idc))
        };

        match self.position(IDC_FIELD) {
            Some(i) => self.fields[i].set_data(data),
            None => self.insert_field(Field::with_data(self.record_type, IDC_FIELD, data)?).map(|_| ()),
        }
    }

    /// Value of the LEN field as decoded or last derived
    pub fn declared_len(&self) -> Result<usize> {
        let field = self.field_by_number(LEN_FIELD)?;

        if self.is_binary() {
            let raw: [u8; 4] = field.data().try_into().map_err(|_| {
                Error::malformed(0, format!("binary LEN must be 4 bytes, got {}", field.data_len()))
            })?;
            return Ok(u32::from_be_bytes(raw) as usize);
        }

        let text = field.string_data();
        text.parse().map_err(|_| {
            Error::malformed(0, format!("LEN {:?} is not a number", text))
        })
    }

    /// Add a field, replacing any field with the same number
    ///
    /// New fields are placed before the first field with a higher number.
    /// Returns the replaced field, if any.
    pub fn insert_field(&mut self, field: Field) -> Result<Option<Field>> {
        if field.record_type() != self.record_type {
            return Err(Error::InvalidState(format!(
                "cannot insert field {} into type-{} record",
                field.key(),
                self.record_type
            )));
        }

        trace!(field = %field.key(), len = field.data_len(), "Inserting field");

        if let Some(i) = self.position(field.number()) {
            return Ok(Some(std::mem::replace(&mut self.fields[i], field)));
        }

        let at = self
            .fields
            .iter()
            .position(|f| f.number() > field.number())
            .unwrap_or(self.fields.len());
        self.fields.insert(at, field);
        Ok(None)
    }

    /// Remove the field with number `number`
    ///
    /// LEN cannot be removed, nor can the fixed header of a binary record.
    pub fn remove_field(&mut self, number: u16) -> Result<Field> {
        let fixed = self.is_binary()
            && dictionary::lookup(self.record_type, number)
                .is_some_and(|d| d.width.fixed().is_some());

        if number == LEN_FIELD || fixed {
            return Err(Error::InvalidState(format!(
                "field {}.{:03} is mandatory",
                self.record_type, number
            )));
        }

        match self.position(number) {
            Some(i) => Ok(self.fields.remove(i)),
            None => Err(self.not_found(format!("number {}", number))),
        }
    }

    pub(crate) fn len_field_mut(&mut self) -> Result<&mut Field> {
        self.field_by_number_mut(LEN_FIELD)
    }

    fn position(&self, number: u16) -> Option<usize> {
        self.fields.iter().position(|f| f.number() == number)
    }

    fn resolve_mnemonic(&self, mnemonic: &str) -> Result<u16> {
        dictionary::field_number(self.record_type, mnemonic)
            .ok_or_else(|| self.not_found(format!("mnemonic {}", mnemonic)))
    }

    fn not_found(&self, key: String) -> Error {
        Error::FieldNotFound {
            record_type: self.record_type,
            key,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record[type {}](fields={})",
            self.record_type,
            self.fields.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const T1: RecordType = RecordType::TRANSACTION_INFORMATION;
    const T2: RecordType = RecordType::DESCRIPTIVE_TEXT;

    fn type1() -> Record {
        Record::from_fields(
            T1,
            vec![
                Field::new(T1, 1, "45"),
                Field::new(T1, 2, "0502"),
                Field::new(T1, 3, "1\x1F0"),
                Field::new(T1, 5, "20200115"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_three_ways_to_the_same_field() {
        let rec = type1();

        let by_index = rec.field(3).unwrap();
        let by_number = rec.field_by_number(5).unwrap();
        let by_mnemonic = rec.field_by_mnemonic("DAT").unwrap();

        assert_eq!(by_index, by_number);
        assert_eq!(by_number, by_mnemonic);
        assert_eq!(by_mnemonic.string_data(), "20200115");
    }

    #[test]
    fn test_field_not_found() {
        let rec = type1();

        assert!(matches!(rec.field(4), Err(Error::FieldNotFound { .. })));
        assert!(matches!(rec.field_by_number(9), Err(Error::FieldNotFound { .. })));
        assert!(matches!(rec.field_by_mnemonic("TCN"), Err(Error::FieldNotFound { .. })));
        assert!(matches!(rec.field_by_mnemonic("NOPE"), Err(Error::FieldNotFound { .. })));
    }

    #[test]
    fn test_mutation_through_record() {
        let mut rec = type1();
        rec.field_by_mnemonic_mut("dat").unwrap().set_data("20220115").unwrap();
        assert_eq!(rec.field_by_number(5).unwrap().string_data(), "20220115");
    }

    #[test]
    fn test_from_fields_rejects_duplicates() {
        let result = Record::from_fields(
            T2,
            vec![Field::new(T2, 1, "0"), Field::new(T2, 2, "00"), Field::new(T2, 2, "01")],
        );
        assert!(matches!(result, Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn test_from_fields_requires_len() {
        let result = Record::from_fields(T2, vec![Field::new(T2, 2, "00")]);
        assert!(matches!(result, Err(Error::MalformedInput { .. })));
    }

    #[test]
    fn test_from_fields_rejects_foreign_field() {
        let result = Record::from_fields(T2, vec![Field::new(T2, 1, "0"), Field::new(T1, 5, "x")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_insert_field_ordering_and_replace() {
        let mut rec = Record::new(T2);
        rec.insert_field(Field::new(T2, 5, "five")).unwrap();
        rec.insert_field(Field::new(T2, 3, "three")).unwrap();
        let old = rec.insert_field(Field::new(T2, 5, "FIVE")).unwrap();

        let numbers: Vec<u16> = rec.fields().map(Field::number).collect();
        assert_eq!(numbers, vec![1, 3, 5]);
        assert_eq!(old.unwrap().string_data(), "five");
        assert_eq!(rec.field_by_number(5).unwrap().string_data(), "FIVE");
    }

    #[test]
    fn test_remove_field() {
        let mut rec = type1();
        assert!(rec.remove_field(1).is_err());

        let removed = rec.remove_field(5).unwrap();
        assert_eq!(removed.number(), 5);
        assert_eq!(rec.count(), 3);
        assert!(rec.remove_field(5).is_err());
    }

    #[test]
    fn test_idc_tagged() {
        let mut rec = Record::new(T2);
        assert!(rec.idc().is_err());

        rec.set_idc(7).unwrap();
        assert_eq!(rec.field_by_number(2).unwrap().string_data(), "07");
        assert_eq!(rec.idc().unwrap(), 7);
    }

    #[test]
    fn test_idc_binary() {
        let mut rec = Record::new(RecordType::HIGH_RES_GRAYSCALE);
        assert_eq!(rec.count(), 9);
        assert_eq!(rec.idc().unwrap(), 0);

        rec.set_idc(3).unwrap();
        assert_eq!(rec.field_by_mnemonic("IDC").unwrap().data(), &[3]);
        assert!(rec.set_idc(256).is_err());
        assert!(rec.remove_field(4).is_err());
    }

    #[test]
    fn test_type1_has_no_idc() {
        let rec = type1();
        assert!(matches!(rec.idc(), Err(Error::FieldNotFound { .. })));
    }

    #[test]
    fn test_declared_len() {
        assert_eq!(type1().declared_len().unwrap(), 45);

        let mut bin = Record::new(RecordType::SIGNATURE_IMAGE);
        bin.len_field_mut().unwrap().replace_data(vec![0u8, 0, 1, 0]);
        assert_eq!(bin.declared_len().unwrap(), 256);
    }
}
