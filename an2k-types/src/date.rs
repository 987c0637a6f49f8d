//! Calendar dates as stored in DAT-style fields (`YYYYMMDD`)

use chrono::NaiveDate;

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y%m%d";

/// Width of an encoded date
pub const DATE_WIDTH: usize = 8;

/// Parse a `YYYYMMDD` date
///
/// # Examples
///
/// ```
/// use an2k_types::date;
///
/// let d = date::parse_date("20220115").unwrap();
/// assert_eq!(date::format_date(d), "20220115");
/// ```
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    if s.len() != DATE_WIDTH {
        return Err(Error::Parse(format!("date must be {} digits, got {:?}", DATE_WIDTH, s)));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| Error::Parse(format!("invalid date {:?}: {}", s, e)))
}

/// Format a date as `YYYYMMDD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_parse_date() {
        let d = parse_date("20200115").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 1, 15).unwrap());
    }
    
    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("20201315").is_err());
        assert!(parse_date("2020-01-15").is_err());
        assert!(parse_date("2020011").is_err());
    }
    
    #[test]
    fn test_format_date_pads() {
        let d = NaiveDate::from_ymd_opt(2022, 3, 4).unwrap();
        assert_eq!(format_date(d), "20220304");
    }
}
