//! Format constants

/// File separator: terminates every tagged record
pub const FS: u8 = 0x1C;

/// Group separator: between fields of a tagged record
pub const GS: u8 = 0x1D;

/// Record separator: between subfields
pub const RS: u8 = 0x1E;

/// Unit separator: between information items
pub const US: u8 = 0x1F;

/// Separates record type from field number in a tag (`1.005`)
pub const TAG_DOT: u8 = b'.';

/// Ends a tag (`1.005:`)
pub const TAG_COLON: u8 = b':';

/// Field number of LEN in every record
pub const LEN_FIELD: u16 = 1;

/// Field number of IDC in every record except type 1
pub const IDC_FIELD: u16 = 2;

/// Type-1 field numbers
pub mod type1 {
    /// VER
    pub const VERSION: u16 = 2;
    
    /// CNT
    pub const CONTENT: u16 = 3;
    
    /// DAT
    pub const DATE: u16 = 5;
}

/// Tagged image-data field; runs to the record terminator and may hold any byte
pub const IMAGE_DATA_FIELD: u16 = 999;

/// Width of the big-endian length prefix in binary records
pub const BINARY_LEN_WIDTH: usize = 4;

/// Digits written for field numbers in encoded tags
pub const TAG_NUMBER_DIGITS: usize = 3;
