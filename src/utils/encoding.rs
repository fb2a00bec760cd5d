// Encoding utilities

use std::borrow::Cow;

use encoding_rs::UTF_8;

/// Decode externally supplied comment text as UTF-8.
///
/// A leading byte order mark is dropped and malformed sequences are replaced
/// with U+FFFD, so a stray byte in a tag list never aborts the run.
pub fn decode_utf8_lossy(data: &[u8]) -> String {
    let (text, _had_errors) = UTF_8.decode_with_bom_removal(data);
    text.into_owned()
}

/// Show stored tag bytes as text, replacing malformed sequences.
///
/// Unlike [`decode_utf8_lossy`] a leading BOM is kept, since it is part of
/// the stored value.
pub fn display_text(data: &[u8]) -> Cow<'_, str> {
    let (text, _had_errors) = UTF_8.decode_without_bom_handling(data);
    text
}
