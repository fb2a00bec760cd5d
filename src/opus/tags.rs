// OpusTags comment header
//
// Layout (RFC 7845 section 5.2):
// - Magic "OpusTags" (8 bytes)
// - Vendor string length (little-endian 32-bit), vendor string
// - Comment count (little-endian 32-bit)
// - For each comment: length (little-endian 32-bit), "FIELD=value"
// - Optional trailing data, kept as is
//
// Vendor and comments are meant to be UTF-8 but files in the wild carry
// other encodings, so they are stored as the raw bytes found in the packet.

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::opus::OPUS_TAGS;
use crate::utils::encoding::display_text;
use crate::utils::io::ByteCursor;

/// Parsed comment header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpusTags {
    #[serde(serialize_with = "text")]
    pub vendor: Vec<u8>,
    #[serde(serialize_with = "text_list")]
    pub comments: Vec<Vec<u8>>,
    /// Bytes following the last comment
    #[serde(skip)]
    pub extra_data: Vec<u8>,
}

impl OpusTags {
    pub fn new(vendor: impl Into<Vec<u8>>) -> Self {
        OpusTags {
            vendor: vendor.into(),
            ..Default::default()
        }
    }

    /// Parse an OpusTags packet.
    ///
    /// Only the framing is checked. Existing comments may lack the
    /// `FIELD=value` form or hold invalid UTF-8 and are kept byte for byte.
    pub fn parse(packet: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(packet);

        let magic = cursor.read_bytes(OPUS_TAGS.len()).ok_or(Error::BadCommentHeader(
            "comment header too short for the magic number",
        ))?;
        if magic != OPUS_TAGS {
            return Err(Error::BadCommentHeader(
                "comment header did not start with OpusTags",
            ));
        }

        let vendor = cursor.read_prefixed().ok_or(Error::BadCommentHeader(
            "vendor string did not fit the comment header",
        ))?;

        let count = cursor.read_le_u32().ok_or(Error::BadCommentHeader(
            "comment count did not fit the comment header",
        ))?;

        // Each comment takes at least 4 bytes, so the count cannot exceed what remains
        let mut comments = Vec::with_capacity((count as usize).min(cursor.remaining().len() / 4));
        for _ in 0..count {
            let comment = cursor.read_prefixed().ok_or(Error::BadCommentHeader(
                "comment did not fit the comment header",
            ))?;
            comments.push(comment.to_vec());
        }

        Ok(OpusTags {
            vendor: vendor.to_vec(),
            comments,
            extra_data: cursor.remaining().to_vec(),
        })
    }

    /// Serialize back into an OpusTags packet
    pub fn render(&self) -> Vec<u8> {
        let size = OPUS_TAGS.len()
            + 4
            + self.vendor.len()
            + 4
            + self.comments.iter().map(|c| 4 + c.len()).sum::<usize>()
            + self.extra_data.len();

        let mut packet = Vec::with_capacity(size);
        packet.extend_from_slice(OPUS_TAGS);
        push_prefixed(&mut packet, &self.vendor);
        packet.extend_from_slice(&(self.comments.len() as u32).to_le_bytes());
        for comment in &self.comments {
            push_prefixed(&mut packet, comment);
        }
        packet.extend_from_slice(&self.extra_data);
        packet
    }

    /// Append a comment after the existing ones
    pub fn push(&mut self, comment: impl Into<Vec<u8>>) {
        self.comments.push(comment.into());
    }

    /// Remove every comment whose field name is exactly `field`
    pub fn delete_field(&mut self, field: &str) {
        self.comments
            .retain(|comment| field_name(comment) != Some(field.as_bytes()));
    }
}

/// Check that a comment is `FIELD=value` with a non-empty field of printable
/// ASCII. The value is free-form.
pub fn validate_comment(comment: &str) -> bool {
    match comment.split_once('=') {
        Some((field, _)) => {
            !field.is_empty() && field.bytes().all(|b| (0x20..=0x7e).contains(&b))
        }
        None => false,
    }
}

fn field_name(comment: &[u8]) -> Option<&[u8]> {
    let end = comment.iter().position(|&b| b == b'=')?;
    Some(&comment[..end])
}

fn push_prefixed(packet: &mut Vec<u8>, bytes: &[u8]) {
    packet.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    packet.extend_from_slice(bytes);
}

fn text<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&display_text(bytes))
}

fn text_list<S: Serializer>(
    list: &[Vec<u8>],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(list.iter().map(|bytes| display_text(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_field_matches_whole_name_only() {
        let mut tags = OpusTags::new("v");
        for comment in ["TITLE=a", "TITLEX=b", "title=c", "TITLE=", "TITLE"] {
            tags.push(comment);
        }
        tags.push(&b"TITLE=Caf\xe9"[..]);
        tags.delete_field("TITLE");
        assert_eq!(
            tags.comments,
            vec![b"TITLEX=b".to_vec(), b"title=c".to_vec(), b"TITLE".to_vec()]
        );
    }

    #[test]
    fn keeps_non_utf8_bytes() {
        let mut tags = OpusTags::new(&b"enc\xff"[..]);
        tags.push(&b"TITLE=Caf\xe9"[..]);
        let parsed = OpusTags::parse(&tags.render()).unwrap();
        assert_eq!(parsed, tags);

        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["vendor"], "enc\u{fffd}");
        assert_eq!(json["comments"][0], "TITLE=Caf\u{fffd}");
    }
}
