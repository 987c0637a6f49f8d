//! ANSI/NIST-ITL version numbers (field 1.002)

use std::fmt;

use crate::error::{Error, Result};

/// Standard revision declared by a transaction
///
/// Encoded on the wire as four digits: two for the major revision and two
/// for the minor, e.g. `0502` for ANSI/NIST-ITL 1-2011 Update:2013.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    /// Every revision this codec reads and writes
    pub const SUPPORTED: [Version; 7] = [
        Version::new(2, 0),
        Version::new(2, 1),
        Version::new(3, 0),
        Version::new(4, 0),
        Version::new(5, 0),
        Version::new(5, 1),
        Version::new(5, 2),
    ];
    
    /// Revision written into new transactions
    pub const LATEST: Version = Version::new(5, 2);
    
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
    
    /// Parse the four-digit wire form
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Parse(format!("version must be four digits, got {:?}", s)));
        }
        
        let major = s[..2]
            .parse()
            .map_err(|_| Error::Parse(format!("invalid major version in {:?}", s)))?;
        let minor = s[2..]
            .parse()
            .map_err(|_| Error::Parse(format!("invalid minor version in {:?}", s)))?;
        
        Ok(Self { major, minor })
    }
    
    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_version_parse_display() {
        let v = Version::parse("0502").unwrap();
        assert_eq!(v, Version::new(5, 2));
        assert_eq!(v.to_string(), "0502");
        assert!(v.is_supported());
    }
    
    #[test]
    fn test_version_unsupported() {
        let v = Version::parse("0900").unwrap();
        assert!(!v.is_supported());
    }
    
    #[test]
    fn test_version_malformed() {
        assert!(Version::parse("502").is_err());
        assert!(Version::parse("05a2").is_err());
        assert!(Version::parse("").is_err());
    }
}
