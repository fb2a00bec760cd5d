// OPUS format support (in OGG container)
//
// OPUS File Structure:
// - Identification header: "OpusHead" (8 bytes) alone on the first page
// - Comment header: "OpusTags" (8 bytes) followed by a Vorbis-style comment
//   list; it starts on the second page, may span several pages and ends the
//   page it completes on
// - Audio data pages
//
// Reference:
// - https://wiki.xiph.org/OggOpus
// - RFC 7845: Ogg Encapsulation for the Opus Audio Codec

pub mod head;
pub mod tags;

pub use head::validate_identification_header;
pub use tags::{validate_comment, OpusTags};

pub const OPUS_SIGNATURE: &[u8; 8] = b"OpusHead";
pub const OPUS_TAGS: &[u8; 8] = b"OpusTags";
