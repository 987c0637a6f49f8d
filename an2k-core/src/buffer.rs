//! Caller-buffer output
//!
//! Every variable-length getter has a `read_*_into` twin that copies into a
//! caller-provided slice. A slice that is too small (including an empty one)
//! yields [`Error::InsufficientBuffer`] carrying the exact size to allocate,
//! so callers can size first and fetch second.

use crate::error::{Error, Result};

/// Copy `src` into the front of `dst`, returning the number of bytes written
///
/// # Examples
///
/// ```
/// use an2k_core::{buffer, Error};
///
/// let err = buffer::copy_into(b"20220115", &mut []).unwrap_err();
/// let required = match err {
///     Error::InsufficientBuffer { required, .. } => required,
///     other => panic!("unexpected error: {other}"),
/// };
///
/// let mut buf = vec![0u8; required];
/// assert_eq!(buffer::copy_into(b"20220115", &mut buf).unwrap(), 8);
/// assert_eq!(&buf, b"20220115");
/// ```
pub fn copy_into(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    if dst.len() < src.len() {
        return Err(Error::InsufficientBuffer {
            required: src.len(),
            provided: dst.len(),
        });
    }
    
    dst[..src.len()].copy_from_slice(src);
    Ok(src.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_empty_buffer_reports_size() {
        let err = copy_into(b"abc", &mut []).unwrap_err();
        assert!(err.is_sizing_signal());
        assert!(matches!(err, Error::InsufficientBuffer { required: 3, provided: 0 }));
    }
    
    #[test]
    fn test_exact_buffer_succeeds() {
        let mut buf = [0u8; 3];
        assert_eq!(copy_into(b"abc", &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc");
    }
    
    #[test]
    fn test_larger_buffer_leaves_tail() {
        let mut buf = [0xFFu8; 5];
        assert_eq!(copy_into(b"ab", &mut buf).unwrap(), 2);
        assert_eq!(buf, [b'a', b'b', 0xFF, 0xFF, 0xFF]);
    }
    
    #[test]
    fn test_empty_value_needs_no_buffer() {
        assert_eq!(copy_into(b"", &mut []).unwrap(), 0);
    }
}
