// OGG container support
//
// OGG File Structure:
// - OGG Page Header (27 bytes)
//   - Capture Pattern: "OggS" (4 bytes)
//   - Version: 0 (1 byte)
//   - Header Type: 1=continuation, 2=bos, 4=eos (1 byte)
//   - Granule Position (8 bytes)
//   - Bitstream Serial Number (4 bytes)
//   - Page Sequence Number (4 bytes)
//   - CRC Checksum (4 bytes)
//   - Number of Page Segments (1 byte)
//   - Segment Table (variable)
//
// Packets are split into 255-byte segments; a shorter segment (possibly
// empty) ends the packet. All multi-byte fields are little-endian.

pub mod crc32;
pub mod demux;
pub mod mux;
pub mod page;

pub use demux::{Packet, PacketDemuxer};
pub use mux::PacketMuxer;
pub use page::{OggPage, OggPageHeader, PageReader};

// OGG signature
pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

// Only stream structure version 0 exists
pub const OGG_VERSION: u8 = 0;

// Fixed part of the page header, before the segment table
pub const OGG_HEADER_SIZE: usize = 27;

// Lacing values a single page can carry
pub const MAX_SEGMENTS: usize = 255;

// Granule position of a page on which no packet completes
pub const NO_GRANULE: u64 = u64::MAX;

// OGG page header types
pub const OGG_HEADER_TYPE_CONTINUATION: u8 = 0x01;
pub const OGG_HEADER_TYPE_BOS: u8 = 0x02; // Beginning of Stream
pub const OGG_HEADER_TYPE_EOS: u8 = 0x04; // End of Stream
