//! Content hashing for cache keys and change detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read};

/// A 128-bit content hash computed using XXH3.
///
/// Two files with the same `ContentHash` are assumed to have identical content.
/// The [`Display`](fmt::Display) form is 32 lowercase hex characters, the same
/// width as the token embedded into cached output filenames.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Computes a content hash by streaming `reader` in `chunk_size` chunks.
    ///
    /// Only one chunk is held in memory at a time, so arbitrarily large inputs
    /// hash in bounded working memory. The result equals [`from_bytes`](Self::from_bytes)
    /// over the same bytes.
    pub fn from_reader(mut reader: impl Read, chunk_size: usize) -> io::Result<Self> {
        let mut hasher = xxhash_rust::xxh3::Xxh3::new();
        let mut buf = vec![0_u8; chunk_size.max(1)];
        loop {
            let read = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buf[..read]);
        }
        Ok(Self(hasher.digest128().to_le_bytes()))
    }

    /// Returns the lowercase hex rendering of this hash.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"hello world");
        let b = ContentHash::from_bytes(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::from_bytes(b"hello");
        let b = ContentHash::from_bytes(b"world");
        assert_ne!(a, b);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let one_shot = ContentHash::from_bytes(&data);
        for chunk in [1, 7, 8192, 1 << 20] {
            let streamed = ContentHash::from_reader(&data[..], chunk).unwrap();
            assert_eq!(streamed, one_shot, "chunk size {chunk}");
        }
    }

    #[test]
    fn streaming_empty_input() {
        let streamed = ContentHash::from_reader(&b""[..], 8192).unwrap();
        assert_eq!(streamed, ContentHash::from_bytes(b""));
    }

    #[test]
    fn display_format() {
        let h = ContentHash::from_bytes(b"test");
        let s = format!("{h}");
        assert_eq!(s.len(), 32, "Display should be 32 hex chars");
        assert!(s.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(h.to_hex(), s);
    }

    #[test]
    fn debug_abbreviated() {
        let h = ContentHash::from_bytes(b"test");
        let s = format!("{h:?}");
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with(")"));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_bytes(b"serde test");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
