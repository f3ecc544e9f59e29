//! Stored Value Module
//!
//! The primitive kinds that can be stored, and the decoders used to read
//! them back.

use serde::Serialize;

use crate::error::{CacheError, Result};

// == Stored Value ==
/// A value of one of the supported primitive kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StoredValue {
    Text(String),
    Bytes(Vec<u8>),
    Integer(i64),
    Float(f64),
}

impl StoredValue {
    /// Encodes the value the way Redis clients do: text as UTF-8, bytes
    /// unchanged, numbers as decimal text.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            StoredValue::Text(text) => text.as_bytes().to_vec(),
            StoredValue::Bytes(bytes) => bytes.clone(),
            StoredValue::Integer(n) => n.to_string().into_bytes(),
            StoredValue::Float(f) => f.to_string().into_bytes(),
        }
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Text(value.to_string())
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Text(value)
    }
}

impl From<&[u8]> for StoredValue {
    fn from(value: &[u8]) -> Self {
        StoredValue::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for StoredValue {
    fn from(value: Vec<u8>) -> Self {
        StoredValue::Bytes(value)
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Integer(value)
    }
}

impl From<i32> for StoredValue {
    fn from(value: i32) -> Self {
        StoredValue::Integer(value.into())
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Float(value)
    }
}

// == Decoders ==
/// Interprets raw bytes as UTF-8 text.
pub fn decode_utf8(raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| CacheError::Decode(format!("invalid UTF-8: {}", e)))
}

/// Interprets raw bytes as a decimal integer.
pub fn decode_int(raw: Vec<u8>) -> Result<i64> {
    let text = decode_utf8(raw)?;
    text.trim()
        .parse()
        .map_err(|_| CacheError::Decode(format!("'{}' is not an integer", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes() {
        assert_eq!(StoredValue::from("foo").to_bytes(), b"foo".to_vec());
        assert_eq!(StoredValue::from(b"\x00\xff".as_slice()).to_bytes(), vec![0, 255]);
        assert_eq!(StoredValue::from(-123).to_bytes(), b"-123".to_vec());
        assert_eq!(StoredValue::from(1.5).to_bytes(), b"1.5".to_vec());
    }

    #[test]
    fn test_snapshot_is_plain_json() {
        assert_eq!(serde_json::to_string(&StoredValue::from("foo")).unwrap(), r#""foo""#);
        assert_eq!(serde_json::to_string(&StoredValue::from(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&StoredValue::from(vec![1u8, 2])).unwrap(), "[1,2]");
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_utf8(b"hello".to_vec()).unwrap(), "hello");
        assert!(matches!(
            decode_utf8(vec![0xff, 0xfe]),
            Err(CacheError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_int() {
        assert_eq!(decode_int(b"42".to_vec()).unwrap(), 42);
        assert_eq!(decode_int(b"-7".to_vec()).unwrap(), -7);
        assert!(matches!(decode_int(b"4.2".to_vec()), Err(CacheError::Decode(_))));
        assert!(matches!(decode_int(b"abc".to_vec()), Err(CacheError::Decode(_))));
    }
}
