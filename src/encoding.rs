//! Character encoding support for tabular text.
//!
//! Delimited files often arrive in a legacy Japanese encoding (Shift_JIS,
//! a.k.a. cp932) while LTSV is usually UTF-8. All decoding and encoding
//! goes through `encoding_rs`; labels follow the WHATWG Encoding Standard
//! with a few extra aliases.
//!
//! Readers split physical lines and fields on ASCII bytes *before*
//! decoding, so only ASCII-compatible encodings are accepted.

use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use std::borrow::Cow;

use crate::error::{Result, TabError};

/// Resolve an encoding label such as `utf-8`, `cp932` or `euc-jp`.
///
/// # Errors
///
/// Returns [`TabError::UnknownEncoding`] for an unrecognized label and
/// [`TabError::UnsupportedEncoding`] for encodings (such as UTF-16) whose
/// line and field separators are not plain ASCII bytes.
pub fn lookup(label: &str) -> Result<&'static Encoding> {
    let normalized = label.trim().to_ascii_lowercase();
    let encoding = match normalized.as_str() {
        "cp932" | "ms932" | "ms-932" => Some(SHIFT_JIS),
        other => Encoding::for_label(other.as_bytes()),
    }
    .ok_or_else(|| TabError::UnknownEncoding(label.to_string()))?;

    if !encoding.is_ascii_compatible() {
        return Err(TabError::UnsupportedEncoding(encoding.name().to_string()));
    }
    Ok(encoding)
}

/// Decode bytes using the specified encoding.
///
/// Malformed sequences are replaced with U+FFFD; the flag reports whether
/// any replacement happened.
#[must_use]
pub fn decode<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> (Cow<'a, str>, bool) {
    encoding.decode_without_bom_handling(bytes)
}

/// Encode text using the specified encoding.
///
/// Characters the encoding cannot represent are written as HTML numeric
/// character references; the flag reports whether that happened.
#[must_use]
pub fn encode<'a>(text: &'a str, encoding: &'static Encoding) -> (Cow<'a, [u8]>, bool) {
    let (bytes, _, unmappable) = encoding.encode(text);
    (bytes, unmappable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_whatwg_labels() {
        assert_eq!(lookup("utf-8").unwrap(), UTF_8);
        assert_eq!(lookup("Shift_JIS").unwrap(), SHIFT_JIS);
        assert_eq!(lookup("euc-jp").unwrap().name(), "EUC-JP");
    }

    #[test]
    fn test_lookup_aliases() {
        assert_eq!(lookup("cp932").unwrap(), SHIFT_JIS);
        assert_eq!(lookup("CP932").unwrap(), SHIFT_JIS);
        assert_eq!(lookup("utf8").unwrap(), UTF_8);
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(matches!(
            lookup("klingon"),
            Err(TabError::UnknownEncoding(label)) if label == "klingon"
        ));
    }

    #[test]
    fn test_lookup_rejects_utf16() {
        assert!(matches!(
            lookup("utf-16le"),
            Err(TabError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_shift_jis_round_trip() {
        let (bytes, unmappable) = encode("あいう", SHIFT_JIS);
        assert!(!unmappable);
        assert_eq!(&bytes[..], b"\x82\xa0\x82\xa2\x82\xa4");

        let (text, malformed) = decode(&bytes, SHIFT_JIS);
        assert!(!malformed);
        assert_eq!(text, "あいう");
    }

    #[test]
    fn test_decode_malformed_utf8() {
        let (text, malformed) = decode(b"ok\xff", UTF_8);
        assert!(malformed);
        assert_eq!(text, "ok\u{fffd}");
    }

    #[test]
    fn test_encode_unmappable() {
        let (bytes, unmappable) = encode("\u{1f600}", SHIFT_JIS);
        assert!(unmappable);
        assert_eq!(&bytes[..], b"&#128512;");
    }
}
