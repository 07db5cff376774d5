//! Text decoding helpers: byte-order marks, legacy encodings and base64.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use encoding_rs::{SHIFT_JIS, WINDOWS_1252};

use crate::error::ConsoleResult;

/// Minimum hits before [`guess_encoding`] reports a non-ASCII encoding.
pub const DEFAULT_GUESS_MATCHES: usize = 5;

const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A byte-order mark at the start of a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bom {
    Utf8,
    Utf16Be,
    Utf16Le,
}

impl Bom {
    /// Length of the mark in bytes.
    pub fn len(self) -> usize {
        match self {
            Bom::Utf8 => 3,
            Bom::Utf16Be | Bom::Utf16Le => 2,
        }
    }
}

/// Legacy encodings told apart by [`guess_encoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Windows1252,
    ShiftJis,
}

pub fn detect_bom(bytes: &[u8]) -> Option<Bom> {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => Some(Bom::Utf8),
        [0xFE, 0xFF, ..] => Some(Bom::Utf16Be),
        [0xFF, 0xFE, ..] => Some(Bom::Utf16Le),
        _ => None,
    }
}

/// Guess the legacy encoding of text that failed to decode as Unicode.
///
/// Counts Shift-JIS lead/trail pairs and stray high bytes; whichever first
/// reaches `matches` wins, Shift-JIS taking priority. Does not detect UTF-8
/// or UTF-16.
pub fn guess_encoding(bytes: &[u8], matches: usize) -> Encoding {
    let mut extended = 0;
    let mut shift_jis = 0;

    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if (0x81..=0x9F).contains(&c) || (0xE0..=0xEF).contains(&c) {
            // A trail byte must exist and must not be the final byte
            if i + 2 < bytes.len() {
                let next = bytes[i + 1];
                if ((0x40..=0x9E).contains(&next) && next != 0x7F) || (0x9F..=0xFC).contains(&next) {
                    i += 1;
                    shift_jis += 1;
                } else {
                    extended += 1;
                }
            } else {
                extended += 1;
            }
        } else if c > 127 {
            extended += 1;
        }
        i += 1;
    }

    if shift_jis >= matches {
        Encoding::ShiftJis
    } else if extended >= matches {
        Encoding::Windows1252
    } else {
        Encoding::Ascii
    }
}

pub fn windows1252_to_string(bytes: &[u8]) -> String {
    WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned()
}

/// Decode Shift-JIS. Invalid sequences become U+FFFD.
pub fn shift_jis_to_string(bytes: &[u8]) -> String {
    let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::debug!("Malformed Shift-JIS sequences replaced");
    }
    text.into_owned()
}

/// Decode UTF-16 code units, replacing unpaired surrogates. A trailing odd byte is dropped.
pub fn utf16_to_string(bytes: &[u8], big_endian: bool) -> String {
    let units = bytes.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decode standard-alphabet base64. Padding is optional; surrounding whitespace is ignored.
pub fn base64_decode(text: &str) -> ConsoleResult<Vec<u8>> {
    Ok(BASE64.decode(text.trim())?)
}

/// Decode a text file's bytes.
///
/// Honors a BOM, then tries UTF-8. Anything else is decoded as Shift-JIS or
/// Windows-1252, whichever [`guess_encoding`] picks.
pub fn decode_text(bytes: &[u8]) -> String {
    match detect_bom(bytes) {
        Some(Bom::Utf8) => String::from_utf8_lossy(&bytes[Bom::Utf8.len()..]).into_owned(),
        Some(bom @ Bom::Utf16Be) => utf16_to_string(&bytes[bom.len()..], true),
        Some(bom @ Bom::Utf16Le) => utf16_to_string(&bytes[bom.len()..], false),
        None => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => match guess_encoding(bytes, DEFAULT_GUESS_MATCHES) {
                Encoding::ShiftJis => shift_jis_to_string(bytes),
                Encoding::Ascii | Encoding::Windows1252 => windows1252_to_string(bytes),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_bom() {
        assert_eq!(detect_bom(b"\xEF\xBB\xBFhi"), Some(Bom::Utf8));
        assert_eq!(detect_bom(b"\xFE\xFF\x00h"), Some(Bom::Utf16Be));
        assert_eq!(detect_bom(b"\xFF\xFEh\x00"), Some(Bom::Utf16Le));
        assert_eq!(detect_bom(b"\xEF\xBB"), None);
        assert_eq!(detect_bom(b""), None);
    }

    #[test]
    fn test_windows1252() {
        assert_eq!(windows1252_to_string(b"caf\xE9 \x80 \x93q\x94"), "café € “q”");
        // Undefined in the code page, passed through as C1 controls
        assert_eq!(windows1252_to_string(b"\x81\x9D"), "\u{81}\u{9D}");
    }

    #[test]
    fn test_utf16() {
        assert_eq!(utf16_to_string(&[0x00, 0x68, 0x00, 0x69], true), "hi");
        assert_eq!(utf16_to_string(&[0x68, 0x00, 0x69, 0x00, 0x21], false), "hi");
        assert_eq!(utf16_to_string(&[0x00, 0xD8], false), "\u{FFFD}");
    }

    #[test]
    fn test_shift_jis() {
        assert_eq!(shift_jis_to_string(b"\x93\xfa\x96\x7b\x8c\xea"), "日本語");
        assert_eq!(shift_jis_to_string(b"abc \xb1\xb2"), "abc ｱｲ");
        assert_eq!(shift_jis_to_string(b"\x82"), "\u{FFFD}");
    }

    #[test]
    fn test_guess_encoding() {
        assert_eq!(guess_encoding(b"plain ascii text", 5), Encoding::Ascii);
        assert_eq!(guess_encoding(b"\xE9\xE8\xE0\xF4\xFB!", 5), Encoding::Windows1252);
        assert_eq!(
            guess_encoding(b"\x82\xA0\x82\xA2\x82\xA4\x82\xA6\x82\xA8..", 5),
            Encoding::ShiftJis
        );
    }

    #[test]
    fn test_base64_decode() {
        assert_eq!(base64_decode("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(base64_decode("aGVsbG8").unwrap(), b"hello");
        assert_eq!(base64_decode(" aGk= \n").unwrap(), b"hi");
        assert!(matches!(base64_decode("@@@"), Err(crate::ConsoleError::Base64(_))));
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFhello"), "hello");
        assert_eq!(decode_text(b"\xFF\xFEh\x00i\x00"), "hi");
        assert_eq!(decode_text("naïve".as_bytes()), "naïve");
        assert_eq!(decode_text(b"na\xEFve"), "naïve");
        assert_eq!(
            decode_text(b"\x82\xa0\x82\xa2\x82\xa4\x82\xa6\x82\xa8 ok"),
            "あいうえお ok"
        );
        // Too few pairs for the heuristic, read as Windows-1252
        assert_eq!(decode_text(b"\x82\xa0 ok"), "‚\u{a0} ok");
    }
}
