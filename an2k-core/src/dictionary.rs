//! Field dictionary
//!
//! Static table of known fields per record type: mnemonic, description and
//! width constraint. Lookups go through indexes built once on first use.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use an2k_types::RecordType;

use crate::constants::{IDC_FIELD, IMAGE_DATA_FIELD, LEN_FIELD};

/// Width constraint on a field payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Any length
    Variable,

    /// Exactly `n` bytes
    Fixed(usize),

    /// Between `min` and `max` bytes inclusive
    Range { min: usize, max: usize },
}

impl Width {
    pub fn accepts(self, len: usize) -> bool {
        match self {
            Self::Variable => true,
            Self::Fixed(n) => len == n,
            Self::Range { min, max } => (min..=max).contains(&len),
        }
    }

    /// Fixed width, if any
    pub fn fixed(self) -> Option<usize> {
        match self {
            Self::Fixed(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable => write!(f, "any"),
            Self::Fixed(n) => write!(f, "exactly {}", n),
            Self::Range { min, max } => write!(f, "{}..={}", min, max),
        }
    }
}

/// Dictionary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Record type, or 0 for entries shared by every type
    pub record_type: u8,
    pub number: u16,
    pub mnemonic: &'static str,
    pub description: &'static str,
    pub width: Width,
}

const fn def(
    record_type: u8,
    number: u16,
    mnemonic: &'static str,
    description: &'static str,
    width: Width,
) -> FieldDef {
    FieldDef {
        record_type,
        number,
        mnemonic,
        description,
        width,
    }
}

use Width::{Fixed, Range, Variable};

/// Entries shared by every record type except type 1
const GENERIC: u8 = 0;

#[rustfmt::skip]
static FIELDS: &[FieldDef] = &[
    def(GENERIC, LEN_FIELD, "LEN", "Logical record length", Variable),
    def(GENERIC, IDC_FIELD, "IDC", "Information designation character", Range { min: 1, max: 2 }),
    def(GENERIC, IMAGE_DATA_FIELD, "DATA", "Image data", Variable),

    // Type 1: transaction information
    def(1, 1, "LEN", "Logical record length", Variable),
    def(1, 2, "VER", "Version number", Fixed(4)),
    def(1, 3, "CNT", "File content", Variable),
    def(1, 4, "TOT", "Type of transaction", Range { min: 1, max: 16 }),
    def(1, 5, "DAT", "Date", Fixed(8)),
    def(1, 6, "PRY", "Priority", Fixed(1)),
    def(1, 7, "DAI", "Destination agency identifier", Variable),
    def(1, 8, "ORI", "Originating agency identifier", Variable),
    def(1, 9, "TCN", "Transaction control number", Variable),
    def(1, 10, "TCR", "Transaction control reference", Variable),
    def(1, 11, "NSR", "Native scanning resolution", Fixed(5)),
    def(1, 12, "NTR", "Nominal transmitting resolution", Fixed(5)),
    def(1, 13, "DOM", "Domain name", Variable),
    def(1, 14, "GMT", "Greenwich mean time", Fixed(15)),
    def(1, 15, "DCS", "Directory of character sets", Variable),
    def(1, 16, "APS", "Application profile specifications", Variable),
    def(1, 17, "ANM", "Agency names", Variable),
    def(1, 18, "GNS", "Geographic name set", Variable),

    // Type 3: low-resolution grayscale fingerprint image
    def(3, 1, "LEN", "Logical record length", Fixed(4)),
    def(3, 2, "IDC", "Information designation character", Fixed(1)),
    def(3, 3, "IMP", "Impression type", Fixed(1)),
    def(3, 4, "FGP", "Finger position", Fixed(6)),
    def(3, 5, "ISR", "Image scanning resolution", Fixed(1)),
    def(3, 6, "HLL", "Horizontal line length", Fixed(2)),
    def(3, 7, "VLL", "Vertical line length", Fixed(2)),
    def(3, 8, "GCA", "Grayscale compression algorithm", Fixed(1)),
    def(3, 9, "DATA", "Image data", Variable),

    // Type 4: high-resolution grayscale fingerprint image
    def(4, 1, "LEN", "Logical record length", Fixed(4)),
    def(4, 2, "IDC", "Information designation character", Fixed(1)),
    def(4, 3, "IMP", "Impression type", Fixed(1)),
    def(4, 4, "FGP", "Finger position", Fixed(6)),
    def(4, 5, "ISR", "Image scanning resolution", Fixed(1)),
    def(4, 6, "HLL", "Horizontal line length", Fixed(2)),
    def(4, 7, "VLL", "Vertical line length", Fixed(2)),
    def(4, 8, "GCA", "Grayscale compression algorithm", Fixed(1)),
    def(4, 9, "DATA", "Image data", Variable),

    // Type 5: low-resolution binary fingerprint image
    def(5, 1, "LEN", "Logical record length", Fixed(4)),
    def(5, 2, "IDC", "Information designation character", Fixed(1)),
    def(5, 3, "IMP", "Impression type", Fixed(1)),
    def(5, 4, "FGP", "Finger position", Fixed(6)),
    def(5, 5, "ISR", "Image scanning resolution", Fixed(1)),
    def(5, 6, "HLL", "Horizontal line length", Fixed(2)),
    def(5, 7, "VLL", "Vertical line length", Fixed(2)),
    def(5, 8, "BCA", "Binary compression algorithm", Fixed(1)),
    def(5, 9, "DATA", "Image data", Variable),

    // Type 6: high-resolution binary fingerprint image
    def(6, 1, "LEN", "Logical record length", Fixed(4)),
    def(6, 2, "IDC", "Information designation character", Fixed(1)),
    def(6, 3, "IMP", "Impression type", Fixed(1)),
    def(6, 4, "FGP", "Finger position", Fixed(6)),
    def(6, 5, "ISR", "Image scanning resolution", Fixed(1)),
    def(6, 6, "HLL", "Horizontal line length", Fixed(2)),
    def(6, 7, "VLL", "Vertical line length", Fixed(2)),
    def(6, 8, "BCA", "Binary compression algorithm", Fixed(1)),
    def(6, 9, "DATA", "Image data", Variable),

    // Type 7: user-defined image
    def(7, 1, "LEN", "Logical record length", Fixed(4)),
    def(7, 2, "IDC", "Information designation character", Fixed(1)),
    def(7, 3, "DATA", "User-defined image data", Variable),

    // Type 8: signature image
    def(8, 1, "LEN", "Logical record length", Fixed(4)),
    def(8, 2, "IDC", "Information designation character", Fixed(1)),
    def(8, 3, "SIG", "Signature type", Fixed(1)),
    def(8, 4, "SRT", "Signature representation type", Fixed(1)),
    def(8, 5, "ISR", "Image scanning resolution", Fixed(1)),
    def(8, 6, "HLL", "Horizontal line length", Fixed(2)),
    def(8, 7, "VLL", "Vertical line length", Fixed(2)),
    def(8, 8, "DATA", "Signature image data", Variable),

    // Type 9: minutiae data
    def(9, 3, "IMP", "Impression type", Variable),
    def(9, 4, "FMT", "Minutiae format", Fixed(1)),
    def(9, 5, "OFR", "Originating fingerprint reading system", Variable),
    def(9, 6, "FGP", "Finger position", Variable),
    def(9, 7, "FPC", "Fingerprint pattern classification", Variable),
    def(9, 8, "CRP", "Core position", Variable),
    def(9, 9, "DLT", "Delta position", Variable),
    def(9, 10, "MIN", "Number of minutiae", Variable),
    def(9, 11, "RDG", "Minutiae ridge count indicator", Fixed(1)),
    def(9, 12, "MRC", "Minutiae and ridge count data", Variable),

    // Type 10: photographic body part image
    def(10, 3, "IMT", "Image type", Variable),
    def(10, 4, "SRC", "Source agency", Variable),
    def(10, 5, "PHD", "Photo capture date", Fixed(8)),
    def(10, 6, "HLL", "Horizontal line length", Variable),
    def(10, 7, "VLL", "Vertical line length", Variable),
    def(10, 8, "SLC", "Scale units", Fixed(1)),
    def(10, 9, "THPS", "Transmitted horizontal pixel scale", Variable),
    def(10, 10, "TVPS", "Transmitted vertical pixel scale", Variable),
    def(10, 11, "CGA", "Compression algorithm", Variable),
    def(10, 12, "CSP", "Color space", Variable),
    def(10, 13, "SAP", "Subject acquisition profile", Variable),

    // Type 13: variable-resolution latent friction ridge image
    def(13, 3, "IMP", "Impression type", Variable),
    def(13, 4, "SRC", "Source agency", Variable),
    def(13, 5, "LCD", "Latent capture date", Fixed(8)),
    def(13, 6, "HLL", "Horizontal line length", Variable),
    def(13, 7, "VLL", "Vertical line length", Variable),
    def(13, 8, "SLC", "Scale units", Fixed(1)),
    def(13, 9, "THPS", "Transmitted horizontal pixel scale", Variable),
    def(13, 10, "TVPS", "Transmitted vertical pixel scale", Variable),
    def(13, 11, "CGA", "Compression algorithm", Variable),
    def(13, 12, "BPX", "Bits per pixel", Variable),
    def(13, 13, "FGP", "Friction ridge generalized position", Variable),

    // Type 14: variable-resolution fingerprint image
    def(14, 3, "IMP", "Impression type", Variable),
    def(14, 4, "SRC", "Source agency", Variable),
    def(14, 5, "FCD", "Fingerprint capture date", Fixed(8)),
    def(14, 6, "HLL", "Horizontal line length", Variable),
    def(14, 7, "VLL", "Vertical line length", Variable),
    def(14, 8, "SLC", "Scale units", Fixed(1)),
    def(14, 9, "THPS", "Transmitted horizontal pixel scale", Variable),
    def(14, 10, "TVPS", "Transmitted vertical pixel scale", Variable),
    def(14, 11, "CGA", "Compression algorithm", Variable),
    def(14, 12, "BPX", "Bits per pixel", Variable),
    def(14, 13, "FGP", "Friction ridge generalized position", Variable),

    // Type 15: variable-resolution palm print image
    def(15, 3, "IMP", "Impression type", Variable),
    def(15, 4, "SRC", "Source agency", Variable),
    def(15, 5, "PCD", "Palm print capture date", Fixed(8)),
    def(15, 6, "HLL", "Horizontal line length", Variable),
    def(15, 7, "VLL", "Vertical line length", Variable),
    def(15, 8, "SLC", "Scale units", Fixed(1)),
    def(15, 9, "THPS", "Transmitted horizontal pixel scale", Variable),
    def(15, 10, "TVPS", "Transmitted vertical pixel scale", Variable),
    def(15, 11, "CGA", "Compression algorithm", Variable),
    def(15, 12, "BPX", "Bits per pixel", Variable),
    def(15, 13, "PLP", "Palm print position", Variable),

    // Type 17: iris image
    def(17, 3, "ELR", "Eye label", Fixed(1)),
    def(17, 4, "SRC", "Source agency", Variable),
    def(17, 5, "ICD", "Iris capture date", Fixed(8)),
    def(17, 6, "HLL", "Horizontal line length", Variable),
    def(17, 7, "VLL", "Vertical line length", Variable),
    def(17, 8, "SLC", "Scale units", Fixed(1)),
    def(17, 9, "THPS", "Transmitted horizontal pixel scale", Variable),
    def(17, 10, "TVPS", "Transmitted vertical pixel scale", Variable),
    def(17, 11, "CGA", "Compression algorithm", Variable),
    def(17, 12, "BPX", "Bits per pixel", Variable),
];

static BY_NUMBER: LazyLock<HashMap<(u8, u16), &'static FieldDef>> = LazyLock::new(|| {
    FIELDS
        .iter()
        .map(|d| ((d.record_type, d.number), d))
        .collect()
});

static BY_MNEMONIC: LazyLock<HashMap<u8, HashMap<&'static str, &'static FieldDef>>> =
    LazyLock::new(|| {
        let mut index: HashMap<u8, HashMap<&'static str, &'static FieldDef>> = HashMap::new();
        for d in FIELDS {
            index.entry(d.record_type).or_default().insert(d.mnemonic, d);
        }
        index
    });

fn by_mnemonic(record_type: u8, mnemonic: &str) -> Option<&'static FieldDef> {
    BY_MNEMONIC
        .get(&record_type)
        .and_then(|m| m.get(mnemonic))
        .copied()
}

/// Generic entries apply to every type but the transaction information record
fn generic_applies(record_type: RecordType) -> bool {
    record_type != RecordType::TRANSACTION_INFORMATION
}

/// Look up a field definition by number
pub fn lookup(record_type: RecordType, number: u16) -> Option<&'static FieldDef> {
    BY_NUMBER
        .get(&(record_type.value(), number))
        .or_else(|| {
            if generic_applies(record_type) {
                BY_NUMBER.get(&(GENERIC, number))
            } else {
                None
            }
        })
        .copied()
}

/// Resolve a mnemonic to a field number (case-insensitive)
///
/// # Examples
///
/// ```
/// use an2k_core::dictionary;
/// use an2k_types::RecordType;
///
/// let dat = dictionary::field_number(RecordType::TRANSACTION_INFORMATION, "DAT");
/// assert_eq!(dat, Some(5));
/// ```
pub fn field_number(record_type: RecordType, mnemonic: &str) -> Option<u16> {
    let upper = mnemonic.to_ascii_uppercase();
    let key = upper.as_str();

    by_mnemonic(record_type.value(), key)
        .or_else(|| {
            if generic_applies(record_type) {
                by_mnemonic(GENERIC, key)
            } else {
                None
            }
        })
        .map(|d| d.number)
}

/// All entries specific to `record_type`, in field-number order
pub fn fields_of(record_type: RecordType) -> impl Iterator<Item = &'static FieldDef> {
    FIELDS
        .iter()
        .filter(move |d| d.record_type == record_type.value())
}

/// Width constraint for a field; unknown fields are unconstrained
pub fn width(record_type: RecordType, number: u16) -> Width {
    lookup(record_type, number)
        .map(|d| d.width)
        .unwrap_or(Width::Variable)
}

/// Description for a field, with a fallback for numbers not in the table
pub fn description(record_type: RecordType, number: u16) -> &'static str {
    match lookup(record_type, number) {
        Some(d) => d.description,
        None if record_type == RecordType::DESCRIPTIVE_TEXT => "User-defined field",
        None => "Undefined field",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T1: RecordType = RecordType::TRANSACTION_INFORMATION;

    #[test]
    fn test_mnemonic_lookup() {
        assert_eq!(field_number(T1, "DAT"), Some(5));
        assert_eq!(field_number(T1, "dat"), Some(5));
        assert_eq!(field_number(T1, "CNT"), Some(3));
        assert_eq!(field_number(RecordType::FINGERPRINT_IMAGE, "FCD"), Some(5));
        assert_eq!(field_number(RecordType::FINGERPRINT_IMAGE, "DATA"), Some(999));
    }

    #[test]
    fn test_generic_entries_skip_type1() {
        assert_eq!(field_number(RecordType::DESCRIPTIVE_TEXT, "IDC"), Some(2));
        assert_eq!(field_number(T1, "IDC"), None);
        assert_eq!(description(T1, 2), "Version number");
        assert_eq!(description(RecordType::MINUTIAE, 2), "Information designation character");
    }

    #[test]
    fn test_unknown_fields() {
        assert_eq!(field_number(T1, "XYZ"), None);
        assert_eq!(description(RecordType::DESCRIPTIVE_TEXT, 300), "User-defined field");
        assert_eq!(description(T1, 300), "Undefined field");
        assert_eq!(width(RecordType::DESCRIPTIVE_TEXT, 300), Width::Variable);
    }

    #[test]
    fn test_widths() {
        assert_eq!(width(T1, 5), Width::Fixed(8));
        assert!(width(T1, 4).accepts(3));
        assert!(!width(T1, 4).accepts(0));
        assert_eq!(width(RecordType::HIGH_RES_GRAYSCALE, 4), Width::Fixed(6));
    }

    #[test]
    fn test_binary_layouts_end_with_data() {
        for t in 3..=8 {
            let defs: Vec<_> = fields_of(RecordType::new(t)).collect();
            let (last, header) = defs.split_last().unwrap();
            assert_eq!(last.width, Width::Variable);
            assert_eq!(header[0].number, LEN_FIELD);
            assert_eq!(header[0].width, Width::Fixed(4));
            assert!(header.iter().all(|d| d.width.fixed().is_some()));
        }
    }

    #[test]
    fn test_table_has_no_duplicates() {
        assert_eq!(BY_NUMBER.len(), FIELDS.len());
        let mnemonics: usize = BY_MNEMONIC.values().map(HashMap::len).sum();
        assert_eq!(mnemonics, FIELDS.len());
    }
}
