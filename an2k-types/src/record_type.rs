//! Record type tags

use std::fmt;

use crate::error::{Error, Result};

/// How a record lays out its fields on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// ASCII `T.NNN:value` fields separated by GS, terminated by FS
    Tagged,
    
    /// Fixed-width big-endian header followed by image data
    Binary,
}

/// Logical record type (the `T` in field tag `T.NNN`)
///
/// Unknown types are still representable; they are treated as tagged
/// records with no dictionary entries beyond LEN and IDC.
///
/// # Examples
///
/// ```
/// use an2k_types::{Encoding, RecordType};
///
/// assert_eq!(RecordType::HIGH_RES_GRAYSCALE.encoding(), Encoding::Binary);
/// assert_eq!(RecordType::MINUTIAE.encoding(), Encoding::Tagged);
/// assert_eq!(RecordType::new(14).name(), "Variable-resolution fingerprint image");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordType(u8);

impl RecordType {
    pub const TRANSACTION_INFORMATION: Self = Self(1);
    pub const DESCRIPTIVE_TEXT: Self = Self(2);
    pub const LOW_RES_GRAYSCALE: Self = Self(3);
    pub const HIGH_RES_GRAYSCALE: Self = Self(4);
    pub const LOW_RES_BINARY: Self = Self(5);
    pub const HIGH_RES_BINARY: Self = Self(6);
    pub const USER_DEFINED_IMAGE: Self = Self(7);
    pub const SIGNATURE_IMAGE: Self = Self(8);
    pub const MINUTIAE: Self = Self(9);
    pub const FACIAL_AND_SMT: Self = Self(10);
    pub const LATENT_IMAGE: Self = Self(13);
    pub const FINGERPRINT_IMAGE: Self = Self(14);
    pub const PALMPRINT_IMAGE: Self = Self(15);
    pub const IRIS_IMAGE: Self = Self(17);
    
    /// Highest type number allowed by the standard
    pub const MAX: u8 = 99;
    
    pub const fn new(value: u8) -> Self {
        Self(value)
    }
    
    pub const fn value(self) -> u8 {
        self.0
    }
    
    /// Whether the number fits in a field tag (1 through [`RecordType::MAX`])
    pub const fn is_valid(self) -> bool {
        self.0 >= 1 && self.0 <= Self::MAX
    }
    
    /// Types 3 through 8 are binary; everything else is tagged
    pub const fn encoding(self) -> Encoding {
        match self.0 {
            3..=8 => Encoding::Binary,
            _ => Encoding::Tagged,
        }
    }
    
    pub const fn is_binary(self) -> bool {
        matches!(self.encoding(), Encoding::Binary)
    }
    
    /// Human-readable record type name
    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "Transaction information",
            2 => "User-defined descriptive text",
            3 => "Low-resolution grayscale fingerprint image",
            4 => "High-resolution grayscale fingerprint image",
            5 => "Low-resolution binary fingerprint image",
            6 => "High-resolution binary fingerprint image",
            7 => "User-defined image",
            8 => "Signature image",
            9 => "Minutiae data",
            10 => "Photographic body part image",
            11 => "Forensic and investigatory voice data",
            12 => "Forensic dental and oral data",
            13 => "Variable-resolution latent friction ridge image",
            14 => "Variable-resolution fingerprint image",
            15 => "Variable-resolution palm print image",
            16 => "User-defined variable-resolution testing image",
            17 => "Iris image",
            18 => "DNA data",
            19 => "Variable-resolution plantar image",
            20 => "Source representation",
            21 => "Associated context",
            22 => "Non-photographic imagery",
            98 => "Information assurance",
            99 => "CBEFF biometric data",
            _ => "Unknown record type",
        }
    }
}

impl From<RecordType> for u8 {
    fn from(rt: RecordType) -> u8 {
        rt.0
    }
}

impl TryFrom<u32> for RecordType {
    type Error = Error;
    
    fn try_from(value: u32) -> Result<Self> {
        match u8::try_from(value) {
            Ok(v) if (1..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(Error::Validation(format!("record type out of range: {}", value))),
        }
    }
}

impl std::str::FromStr for RecordType {
    type Err = Error;
    
    fn from_str(s: &str) -> Result<Self> {
        let value: u32 = s
            .parse()
            .map_err(|_| Error::Parse(format!("invalid record type: {:?}", s)))?;
        Self::try_from(value)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_binary_range() {
        for t in 3..=8 {
            assert!(RecordType::new(t).is_binary());
        }
        assert!(!RecordType::TRANSACTION_INFORMATION.is_binary());
        assert!(!RecordType::FINGERPRINT_IMAGE.is_binary());
        assert!(!RecordType::new(99).is_binary());
    }
    
    #[test]
    fn test_parse() {
        assert_eq!("14".parse::<RecordType>().unwrap(), RecordType::FINGERPRINT_IMAGE);
        assert!("0".parse::<RecordType>().is_err());
        assert!("100".parse::<RecordType>().is_err());
        assert!("x".parse::<RecordType>().is_err());
    }
    
    #[test]
    fn test_valid_range() {
        assert!(RecordType::new(1).is_valid());
        assert!(RecordType::new(99).is_valid());
        assert!(!RecordType::new(0).is_valid());
        assert!(!RecordType::new(100).is_valid());
    }
}
