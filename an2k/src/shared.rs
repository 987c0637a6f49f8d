//! Thread-safe transaction handle
//!
//! Wraps a [`Transaction`] behind a read/write lock so one loaded file can
//! be inspected from many threads. Cheap to clone (Arc internally).

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::Result;
use crate::transaction::Transaction;

/// Shared transaction
///
/// Readers run concurrently; mutation and saving (which re-derives LEN and
/// CNT in place) take the write lock.
#[derive(Debug, Clone, Default)]
pub struct SharedTransaction {
    inner: Arc<RwLock<Transaction>>,
}

impl SharedTransaction {
    pub fn new(transaction: Transaction) -> Self {
        Self {
            inner: Arc::new(RwLock::new(transaction)),
        }
    }

    /// Load a transaction file into a new handle
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Transaction::from_file(path)?))
    }

    /// Run `f` with shared access
    pub fn read<R>(&self, f: impl FnOnce(&Transaction) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access
    pub fn write<R>(&self, f: impl FnOnce(&mut Transaction) -> R) -> R {
        f(&mut self.inner.write())
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        self.inner.write().to_bytes()
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.inner.write().to_file(path)
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> Transaction {
        self.inner.read().clone()
    }
}

impl From<Transaction> for SharedTransaction {
    fn from(transaction: Transaction) -> Self {
        Self::new(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &[u8] = b"1.001:50\x1d1.002:0502\x1d1.003:1\x1f1\x1e2\x1f00\x1d1.005:20200115\x1c\
2.001:30\x1d2.002:00\x1d2.003:HELLO\x1c";

    fn shared() -> SharedTransaction {
        Transaction::from_bytes(SAMPLE).unwrap().into()
    }

    #[test]
    fn test_concurrent_readers() {
        let tr = shared();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let tr = tr.clone();
                    s.spawn(move || {
                        tr.read(|t| {
                            t.get(1)
                                .unwrap()
                                .field_by_number(3)
                                .unwrap()
                                .string_data()
                                .into_owned()
                        })
                    })
                })
                .collect();

            for h in handles {
                assert_eq!(h.join().unwrap(), "HELLO");
            }
        });
    }

    #[test]
    fn test_write_visible_to_clones() {
        let tr = shared();
        let other = tr.clone();

        tr.write(|t| {
            t.get_mut(1)
                .unwrap()
                .field_by_number_mut(3)
                .unwrap()
                .set_string_data("WORLD")
        })
        .unwrap();

        let text = other.read(|t| t.get(1).unwrap().field_by_number(3).unwrap().string_data().into_owned());
        assert_eq!(text, "WORLD");
    }

    #[test]
    fn test_to_bytes_and_snapshot() {
        let tr = shared();
        assert_eq!(tr.to_bytes().unwrap().as_ref(), SAMPLE);

        let snap = tr.snapshot();
        tr.write(|t| t.remove(1)).unwrap();

        assert_eq!(snap.len(), 2);
        assert_eq!(tr.read(Transaction::len), 1);
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.an2");

        shared().to_file(&path).unwrap();
        let reopened = SharedTransaction::from_file(&path).unwrap();
        assert_eq!(reopened.snapshot(), Transaction::from_bytes(SAMPLE).unwrap());
    }
}
