//! Field: one numbered data unit inside a record

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use an2k_types::RecordType;

use crate::{
    buffer,
    dictionary::{self, Width},
    error::{Error, Result},
};

/// Composite field identifier, displayed as `T.NNN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    pub record_type: RecordType,
    pub number: u16,
}

impl FieldKey {
    pub const fn new(record_type: RecordType, number: u16) -> Self {
        Self { record_type, number }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.record_type, self.number)
    }
}

/// A single field
///
/// The raw payload is the only stored form; [`Field::string_data`] decodes it
/// on every call, so the byte and text views always agree. Subfield and item
/// separators are left in place for the caller to interpret.
///
/// # Examples
///
/// ```
/// use an2k_core::Field;
/// use an2k_types::RecordType;
///
/// let mut dat = Field::new(RecordType::TRANSACTION_INFORMATION, 5, "20200115");
/// assert_eq!(dat.mnemonic(), Some("DAT"));
///
/// let mut data = dat.data().to_vec();
/// data[..4].copy_from_slice(b"2022");
/// dat.set_data(data).unwrap();
/// assert_eq!(dat.string_data(), "20220115");
///
/// // DAT is fixed-width
/// assert!(dat.set_data("2022").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Field {
    key: FieldKey,
    data: Bytes,
}

impl Field {
    /// Create a field without width validation
    ///
    /// The codec uses this for decoded input; payloads from callers should
    /// go through [`Field::set_data`] or [`Field::with_data`].
    pub fn new(record_type: RecordType, number: u16, data: impl Into<Bytes>) -> Self {
        Self {
            key: FieldKey::new(record_type, number),
            data: data.into(),
        }
    }

    /// Create a field, enforcing the dictionary width
    pub fn with_data(record_type: RecordType, number: u16, data: impl Into<Bytes>) -> Result<Self> {
        let mut field = Self::new(record_type, number, Bytes::new());
        field.set_data(data)?;
        Ok(field)
    }

    pub fn key(&self) -> FieldKey {
        self.key
    }

    pub fn record_type(&self) -> RecordType {
        self.key.record_type
    }

    pub fn number(&self) -> u16 {
        self.key.number
    }

    /// Short alias from the dictionary, e.g. `DAT` for 1.005
    pub fn mnemonic(&self) -> Option<&'static str> {
        dictionary::lookup(self.key.record_type, self.key.number).map(|d| d.mnemonic)
    }

    /// Static human-readable label
    pub fn description(&self) -> &'static str {
        dictionary::description(self.key.record_type, self.key.number)
    }

    /// Width constraint enforced by [`Field::set_data`]
    pub fn width(&self) -> Width {
        dictionary::width(self.key.record_type, self.key.number)
    }

    /// Raw payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Raw payload as a cheaply clonable buffer
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// Payload size, for callers that pre-size their own buffers
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Text view of the payload (invalid UTF-8 is replaced)
    pub fn string_data(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Replace the payload
    ///
    /// # Errors
    ///
    /// [`Error::InvalidLength`] if the dictionary mandates a width the new
    /// payload violates. The field is left unchanged in that case.
    pub fn set_data(&mut self, data: impl Into<Bytes>) -> Result<()> {
        let data = data.into();
        let width = self.width();

        if !width.accepts(data.len()) {
            return Err(Error::InvalidLength {
                field: self.key.to_string(),
                actual: data.len(),
                allowed: width.to_string(),
            });
        }

        self.data = data;
        Ok(())
    }

    /// Replace the payload with UTF-8 text
    pub fn set_string_data(&mut self, text: &str) -> Result<()> {
        self.set_data(Bytes::copy_from_slice(text.as_bytes()))
    }

    /// Copy the raw payload into `buf`
    pub fn read_data_into(&self, buf: &mut [u8]) -> Result<usize> {
        buffer::copy_into(&self.data, buf)
    }

    /// Copy the text view into `buf`
    pub fn read_string_into(&self, buf: &mut [u8]) -> Result<usize> {
        buffer::copy_into(self.string_data().as_bytes(), buf)
    }

    /// Copy the description into `buf`
    pub fn read_description_into(&self, buf: &mut [u8]) -> Result<usize> {
        buffer::copy_into(self.description().as_bytes(), buf)
    }

    /// Overwrite the payload without width validation (LEN/CNT derivation)
    pub(crate) fn replace_data(&mut self, data: impl Into<Bytes>) {
        self.data = data.into();
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 16;
        let shown = self.data.len().min(PREVIEW);

        f.debug_struct("Field")
            .field("key", &self.key.to_string())
            .field("mnemonic", &self.mnemonic())
            .field("len", &self.data.len())
            .field("data", &hex::encode(&self.data[..shown]))
            .finish()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(m) => write!(f, "{} {}: {}", self.key, m, self.string_data()),
            None => write!(f, "{}: {}", self.key, self.string_data()),
        }
    }
}
