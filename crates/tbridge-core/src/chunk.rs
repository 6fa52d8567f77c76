//! Chunk - the unit of byte handoff across the thread boundary
//!
//! A chunk is an immutable, owned byte sequence. Ownership moves into a
//! queue on push and back out on pop, so the producing and consuming
//! threads never alias the same buffer.

/// An atomic, ordered unit of buffered bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    bytes: Vec<u8>,
}

impl Chunk {
    /// Wrap an owned byte buffer.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Number of bytes in the chunk.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the chunk carries no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the payload.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the payload back out.
    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Chunk {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl From<&str> for Chunk {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_roundtrip() {
        let c = Chunk::from("hello");
        assert_eq!(c.len(), 5);
        assert!(!c.is_empty());
        assert_eq!(c.as_slice(), b"hello");
        assert_eq!(c.into_vec(), b"hello".to_vec());
    }

    #[test]
    fn test_empty_chunk() {
        let c = Chunk::new(Vec::new());
        assert_eq!(c.len(), 0);
        assert!(c.is_empty());
    }
}
