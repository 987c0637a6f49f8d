//! High-level transaction interface

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use bytes::Bytes;
use chrono::NaiveDate;
use tracing::{debug, info};

use an2k_core::{buffer, codec, constants::type1, Field, Record};
use an2k_types::{date, RecordSummary, RecordType, Summary, Version};

use crate::error::{Error, Result};

/// AN2K transaction
///
/// Ordered records, where record 0 is always the transaction information
/// record (type 1). Records and fields are reached through borrows, so none
/// can outlive the transaction that owns them.
///
/// # Examples
///
/// ```
/// use an2k::Transaction;
///
/// let buf = b"1.001:45\x1d1.002:0502\x1d1.003:1\x1f0\x1d1.005:20200115\x1c";
/// let mut tr = Transaction::from_bytes(&buf[..]).unwrap();
///
/// let header = tr.get(0).unwrap();
/// assert_eq!(header.field_by_mnemonic("DAT").unwrap().string_data(), "20200115");
///
/// assert_eq!(tr.to_bytes().unwrap().as_ref(), &buf[..]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    records: Vec<Record>,
}

impl Transaction {
    /// Create an empty transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transaction at the latest supported revision, dated `day`
    pub fn create(day: NaiveDate) -> Result<Self> {
        let mut header = codec::new_header(Version::LATEST)?;
        header.insert_field(Field::with_data(
            RecordType::TRANSACTION_INFORMATION,
            type1::DATE,
            date::format_date(day),
        )?)?;

        Ok(Self {
            records: vec![header],
        })
    }

    /// Parse a transaction from a byte buffer
    pub fn from_bytes(buf: impl AsRef<[u8]>) -> Result<Self> {
        let mut tr = Self::new();
        tr.load_from_bytes(Bytes::copy_from_slice(buf.as_ref()))?;
        Ok(tr)
    }

    /// Read and parse a transaction file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut tr = Self::new();
        tr.load_from_file(path)?;
        Ok(tr)
    }

    /// Replace the contents with a parsed byte buffer
    ///
    /// # Errors
    ///
    /// Fails with a malformed-input or unsupported-version error. The
    /// transaction is left empty on failure, never partially loaded.
    pub fn load_from_bytes(&mut self, buf: impl Into<Bytes>) -> Result<()> {
        self.records.clear();
        self.records = codec::decode(buf.into())?;

        debug!(records = self.records.len(), "Transaction loaded");
        Ok(())
    }

    /// Replace the contents with a parsed file
    ///
    /// # Errors
    ///
    /// [`Error::FileNotFound`] if `path` is missing or cannot be read, plus everything
    /// [`Transaction::load_from_bytes`] reports.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.records.clear();

        info!("Loading transaction from {}", path.display());

        let buf = read_file(path)?;
        self.load_from_bytes(buf)
    }

    /// Serialize, re-deriving every LEN field and the CNT field first
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the transaction is empty
    /// - `Serialization` if an invariant is violated
    pub fn to_bytes(&mut self) -> Result<Bytes> {
        Ok(codec::encode(&mut self.records)?)
    }

    /// Serialize to `path`, replacing any existing file
    pub fn to_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        std::fs::write(path, &bytes)?;

        info!("Saved transaction to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Record at `index`
    pub fn get(&self, index: usize) -> Result<&Record> {
        self.records.get(index).ok_or_else(|| self.out_of_range(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Record> {
        let err = self.out_of_range(index);
        self.records.get_mut(index).ok_or(err)
    }

    /// The transaction information record
    pub fn header(&self) -> Result<&Record> {
        self.records.first().ok_or_else(empty)
    }

    pub fn header_mut(&mut self) -> Result<&mut Record> {
        self.records.first_mut().ok_or_else(empty)
    }

    /// Append a record
    ///
    /// The first record of an empty transaction must be type 1; later
    /// records must not be.
    pub fn push(&mut self, record: Record) -> Result<()> {
        self.check_placement(self.records.len(), &record)?;
        self.records.push(record);
        Ok(())
    }

    /// Insert a record at `index` (1..=len)
    pub fn insert(&mut self, index: usize, record: Record) -> Result<()> {
        if index > self.records.len() {
            return Err(self.out_of_range(index));
        }
        self.check_placement(index, &record)?;
        self.records.insert(index, record);
        Ok(())
    }

    /// Remove and return the record at `index`; record 0 cannot be removed
    pub fn remove(&mut self, index: usize) -> Result<Record> {
        if index >= self.records.len() {
            return Err(self.out_of_range(index));
        }
        if index == 0 {
            return Err(invalid_state("the transaction information record cannot be removed"));
        }
        Ok(self.records.remove(index))
    }

    /// Standard revision from field 1.002
    pub fn version(&self) -> Result<Version> {
        Ok(codec::read_version(self.header()?)?)
    }

    /// Transaction date from field 1.005
    pub fn date(&self) -> Result<NaiveDate> {
        let field = self.header()?.field_by_number(type1::DATE)?;
        Ok(date::parse_date(&field.string_data())?)
    }

    /// Overwrite field 1.005
    pub fn set_date(&mut self, value: NaiveDate) -> Result<()> {
        let field = self.header_mut()?.field_by_number_mut(type1::DATE)?;
        field.set_string_data(&date::format_date(value))?;
        Ok(())
    }

    /// Record count, version and per-record sizes
    ///
    /// Sizes reflect current content, including unsaved mutations.
    pub fn summary(&self) -> Result<Summary> {
        let mut records = self.records.clone();
        codec::encode(&mut records)?;

        let mut summary = Summary::new(codec::read_version(&records[0]).ok());
        for (index, record) in records.iter().enumerate() {
            summary.records.push(RecordSummary {
                index,
                record_type: record.record_type(),
                idc: record.idc().ok(),
                field_count: record.count(),
                byte_len: record.declared_len()?,
            });
        }
        Ok(summary)
    }

    /// Rendered summary text
    pub fn summary_text(&self) -> Result<String> {
        Ok(self.summary()?.to_string())
    }

    /// Copy the rendered summary into `buf`
    ///
    /// Reports the required size through the sizing signal when `buf` is
    /// too small.
    pub fn read_summary_into(&self, buf: &mut [u8]) -> Result<usize> {
        let text = self.summary_text()?;
        Ok(buffer::copy_into(text.as_bytes(), buf)?)
    }

    fn check_placement(&self, index: usize, record: &Record) -> Result<()> {
        let is_header = record.record_type() == RecordType::TRANSACTION_INFORMATION;
        match (index, is_header) {
            (0, true) if self.records.is_empty() => Ok(()),
            (0, _) => Err(invalid_state("record 0 must stay the transaction information record")),
            (_, true) => Err(invalid_state("a transaction holds one transaction information record")),
            (_, false) => Ok(()),
        }
    }

    fn out_of_range(&self, index: usize) -> Error {
        an2k_core::Error::IndexOutOfRange {
            index,
            count: self.records.len(),
        }
        .into()
    }
}

fn empty() -> Error {
    invalid_state("transaction has no records")
}

fn invalid_state(reason: &str) -> Error {
    an2k_core::Error::InvalidState(reason.to_string()).into()
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let unreadable = |source: io::Error| Error::FileNotFound {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(unreadable)?;
    let size = usize::try_from(file.metadata().map_err(unreadable)?.len()).unwrap_or(0);

    let mut buf = Vec::new();
    buf.try_reserve_exact(size)
        .map_err(|_| an2k_core::Error::Allocation { requested: size })?;
    file.read_to_end(&mut buf).map_err(unreadable)?;

    debug!(path = %path.display(), len = buf.len(), "Read transaction file");
    Ok(buf)
}
