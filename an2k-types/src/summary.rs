//! Transaction summary structures

use std::fmt;

use crate::{RecordType, Version};

/// One line of a transaction summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    /// Position in the transaction
    pub index: usize,

    pub record_type: RecordType,

    /// Information Designation Character (absent for type 1)
    pub idc: Option<u32>,

    pub field_count: usize,

    /// Value of the record's LEN field
    pub byte_len: usize,
}

/// Transaction summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Declared standard revision
    pub version: Option<Version>,

    /// Per-record details, in transaction order
    pub records: Vec<RecordSummary>,
}

impl Summary {
    pub fn new(version: Option<Version>) -> Self {
        Self {
            version,
            records: Vec::new(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Sum of all record lengths
    pub fn total_len(&self) -> usize {
        self.records.iter().map(|r| r.byte_len).sum()
    }
}

impl fmt::Display for RecordSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} type {} ({})",
            self.index,
            self.record_type,
            self.record_type.name()
        )?;
        if let Some(idc) = self.idc {
            write!(f, " IDC {}", idc)?;
        }
        write!(f, ", {} fields, {} bytes", self.field_count, self.byte_len)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) => writeln!(f, "Transaction[version: {}, records: {}, bytes: {}]", v, self.record_count(), self.total_len())?,
            None => writeln!(f, "Transaction[records: {}, bytes: {}]", self.record_count(), self.total_len())?,
        }
        for record in &self.records {
            writeln!(f, "  {}", record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_display() {
        let mut summary = Summary::new(Some(Version::new(5, 2)));
        summary.records.push(RecordSummary {
            index: 0,
            record_type: RecordType::TRANSACTION_INFORMATION,
            idc: None,
            field_count: 4,
            byte_len: 50,
        });
        summary.records.push(RecordSummary {
            index: 1,
            record_type: RecordType::DESCRIPTIVE_TEXT,
            idc: Some(0),
            field_count: 3,
            byte_len: 30,
        });

        let text = summary.to_string();
        assert!(text.starts_with("Transaction[version: 0502, records: 2, bytes: 80]"));
        assert!(text.contains("#1 type 2 (User-defined descriptive text) IDC 0, 3 fields, 30 bytes"));
        assert_eq!(summary.total_len(), 80);
    }
}
