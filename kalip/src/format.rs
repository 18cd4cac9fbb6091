//! Conversion strategies from wire bytes to session values.

use serde::{Deserialize, Serialize};

use crate::session::Value;

/// How a stage converts a complete record into a [`Value`] before storing it.
///
/// Conversion is a pure function of `(buffer, offset, length)`: it copies out
/// whatever it keeps and never retains a reference to the input, since the
/// buffer may be recycled right after the call. Any byte range converts —
/// an empty range yields the format's empty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// Identity copy of the raw bytes.
    Raw,
    /// UTF-8 text; invalid sequences are replaced so conversion stays total.
    #[default]
    #[serde(rename = "string", alias = "text")]
    Text,
}

impl DataFormat {
    pub fn convert(&self, buf: &[u8], offset: usize, length: usize) -> Value {
        let range = slice_range(buf, offset, length);
        match self {
            DataFormat::Raw => Value::Bytes(range.to_vec()),
            DataFormat::Text => Value::Text(String::from_utf8_lossy(range).into_owned()),
        }
    }
}

/// Clamped view of `buf[offset..offset + length]`; out-of-bounds ranges
/// shrink to what the buffer holds instead of panicking.
pub(crate) fn slice_range(buf: &[u8], offset: usize, length: usize) -> &[u8] {
    let start = offset.min(buf.len());
    let end = offset.saturating_add(length).min(buf.len());
    &buf[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_copies_bytes() {
        let v = DataFormat::Raw.convert(b"xxhelloxx", 2, 5);
        assert_eq!(v, Value::Bytes(b"hello".to_vec()));
    }

    #[test]
    fn text_decodes_utf8() {
        let v = DataFormat::Text.convert(b"hello", 0, 5);
        assert_eq!(v, Value::Text("hello".into()));
    }

    #[test]
    fn text_is_total_over_invalid_utf8() {
        let v = DataFormat::Text.convert(&[0xff, 0xfe], 0, 2);
        assert!(matches!(v, Value::Text(_)));
    }

    #[test]
    fn empty_range_yields_empty_value() {
        assert_eq!(DataFormat::Raw.convert(b"abc", 1, 0), Value::Bytes(vec![]));
        assert_eq!(DataFormat::Text.convert(b"", 0, 0), Value::Text(String::new()));
    }

    #[test]
    fn out_of_bounds_range_is_clamped() {
        assert_eq!(DataFormat::Raw.convert(b"ab", 1, 10), Value::Bytes(b"b".to_vec()));
        assert_eq!(DataFormat::Raw.convert(b"ab", 5, 3), Value::Bytes(vec![]));
    }

    #[test]
    fn string_is_the_default_config_name() {
        let f: DataFormat = serde_json::from_str("\"string\"").unwrap();
        assert_eq!(f, DataFormat::Text);
        let f: DataFormat = serde_json::from_str("\"raw\"").unwrap();
        assert_eq!(f, DataFormat::Raw);
    }
}
