//! Shared helpers for building Ogg Opus streams by hand.

#![allow(dead_code)]

use opustags::ogg::{OggPage, PacketDemuxer, PageReader, OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_EOS};
use opustags::OpusTags;

pub const SERIAL: u32 = 0x5eed_0001;

/// Minimal valid OpusHead: version 1, stereo, 312 pre-skip, 48 kHz, family 0
pub fn opus_head() -> Vec<u8> {
    let mut head = b"OpusHead".to_vec();
    head.extend_from_slice(&[1, 2, 0x38, 0x01, 0x80, 0xbb, 0x00, 0x00, 0, 0, 0]);
    head
}

/// OpusTags packet laid out byte by byte, independently of the codec
pub fn opus_tags(vendor: &str, comments: &[&str]) -> Vec<u8> {
    let comments: Vec<&[u8]> = comments.iter().map(|c| c.as_bytes()).collect();
    opus_tags_raw(vendor.as_bytes(), &comments)
}

/// Same as [`opus_tags`] for text in any encoding
pub fn opus_tags_raw(vendor: &[u8], comments: &[&[u8]]) -> Vec<u8> {
    let mut packet = b"OpusTags".to_vec();
    packet.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    packet.extend_from_slice(vendor);
    packet.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for comment in comments {
        packet.extend_from_slice(&(comment.len() as u32).to_le_bytes());
        packet.extend_from_slice(comment);
    }
    packet
}

/// Comments of `tags` as text; they must be UTF-8
pub fn texts(tags: &OpusTags) -> Vec<String> {
    tags.comments
        .iter()
        .map(|c| String::from_utf8(c.clone()).expect("UTF-8 comment"))
        .collect()
}

/// Tags with the given vendor and comments
pub fn tags_with(vendor: &str, comments: &[&str]) -> OpusTags {
    let mut tags = OpusTags::new(vendor);
    for comment in comments {
        tags.push(*comment);
    }
    tags
}

/// Fake audio packet of `len` bytes with a recognizable pattern
pub fn audio(seed: u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}

/// Lacing values for one complete packet
pub fn lacing(len: usize) -> Vec<u8> {
    let mut table = vec![255u8; len / 255];
    table.push((len % 255) as u8);
    table
}

/// Writes pages with consecutive sequence numbers
pub struct StreamBuilder {
    serial: u32,
    sequence: u32,
    bytes: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::with_serial(SERIAL)
    }

    pub fn with_serial(serial: u32) -> Self {
        StreamBuilder {
            serial,
            sequence: 0,
            bytes: Vec::new(),
        }
    }

    /// Append a raw page
    pub fn page(&mut self, flags: u8, granule: u64, lacing: Vec<u8>, data: Vec<u8>) -> &mut Self {
        let page = OggPage::new(flags, granule, self.serial, self.sequence, lacing, data);
        self.bytes.extend(page.to_bytes());
        self.sequence += 1;
        self
    }

    /// Append a page holding exactly the given complete packets
    pub fn packets(&mut self, flags: u8, granule: u64, packets: &[&[u8]]) -> &mut Self {
        let mut table = Vec::new();
        let mut data = Vec::new();
        for packet in packets {
            table.extend(lacing(packet.len()));
            data.extend_from_slice(packet);
        }
        self.page(flags, granule, table, data)
    }

    pub fn skip_sequence(&mut self) -> &mut Self {
        self.sequence += 1;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// Head page, tags page, then one page per audio packet, the last one with EOS
pub fn simple_stream(comments: &[&str], audio_packets: &[Vec<u8>]) -> Vec<u8> {
    let mut builder = StreamBuilder::new();
    builder.packets(OGG_HEADER_TYPE_BOS, 0, &[opus_head().as_slice()]);
    let tags = opus_tags("libopus 1.3.1", comments);
    if audio_packets.is_empty() {
        builder.packets(OGG_HEADER_TYPE_EOS, 0, &[tags.as_slice()]);
        return builder.build();
    }
    builder.packets(0, 0, &[tags.as_slice()]);
    let last = audio_packets.len() - 1;
    for (i, packet) in audio_packets.iter().enumerate() {
        let flags = if i == last { OGG_HEADER_TYPE_EOS } else { 0 };
        builder.packets(flags, 960 * (i as u64 + 1), &[packet.as_slice()]);
    }
    builder.build()
}

/// Every packet of a stream
pub fn packets_of(bytes: &[u8]) -> Vec<Vec<u8>> {
    let mut demuxer = PacketDemuxer::new(bytes);
    let mut packets = Vec::new();
    while let Some(packet) = demuxer.next_packet().expect("valid stream") {
        packets.push(packet.data);
    }
    packets
}

/// Every page of a stream, checksums verified
pub fn pages_of(bytes: &[u8]) -> Vec<OggPage> {
    let mut reader = PageReader::new(bytes);
    let mut pages = Vec::new();
    while let Some(page) = reader.next_page().expect("valid page") {
        pages.push(page);
    }
    pages
}

/// Check the framing invariants every written stream must satisfy
pub fn assert_well_framed(bytes: &[u8], serial: u32) {
    let pages = pages_of(bytes);
    assert!(!pages.is_empty());
    let last = pages.len() - 1;
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.header.bitstream_serial, serial);
        assert_eq!(page.header.page_sequence, i as u32);
        assert_eq!(page.header.is_bos(), i == 0, "BOS flag on page {}", i);
        assert_eq!(page.header.is_eos(), i == last, "EOS flag on page {}", i);
    }
}

/// Every page on which a packet completes must carry a granule position
pub fn assert_granule_where_packets_complete(bytes: &[u8]) {
    for page in pages_of(bytes) {
        let completes = page.header.segment_table.iter().any(|&l| l < 255);
        if completes {
            assert!(
                page.granule().is_some(),
                "page {} completes a packet without a granule",
                page.header.page_sequence
            );
        }
    }
}
