// Packet demultiplexer
//
// Reassembles the logical packets of a single Ogg bitstream from its pages.
// A segment shorter than 255 bytes terminates a packet; a packet whose last
// segment is 255 bytes long continues on the next page, which must carry the
// continuation flag.

use std::collections::VecDeque;
use std::io::Read;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::ogg::page::{OggPage, PageReader};
use crate::ogg::NO_GRANULE;

/// A complete logical packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub data: Vec<u8>,
    /// 1-based position in the logical stream
    pub index: u64,
    /// Granule of the source page if this is the last packet completing on it
    pub granule_position: u64,
    /// Whether no other packet completes after this one on its source page
    pub ends_page: bool,
    /// Lacing values this packet had on each source page before the one it
    /// completes on; empty for a packet that fits on one page
    pub page_breaks: Vec<usize>,
}

impl Packet {
    /// A packet that is not tied to any source page
    pub fn new(data: Vec<u8>, index: u64) -> Self {
        Packet {
            data,
            index,
            granule_position: NO_GRANULE,
            ends_page: false,
            page_breaks: Vec::new(),
        }
    }
}

/// A packet that continues on the next page
struct Partial {
    data: Vec<u8>,
    page_breaks: Vec<usize>,
}

/// Forward-only packet source over a page reader
pub struct PacketDemuxer<R> {
    pages: PageReader<R>,
    serial: Option<u32>,
    last_sequence: Option<u32>,
    partial: Option<Partial>,
    ready: VecDeque<Packet>,
    packets_out: u64,
}

impl<R: Read> PacketDemuxer<R> {
    pub fn new(reader: R) -> Self {
        PacketDemuxer {
            pages: PageReader::new(reader),
            serial: None,
            last_sequence: None,
            partial: None,
            ready: VecDeque::new(),
            packets_out: 0,
        }
    }

    /// Serial number of the stream, known once the first page was read
    pub fn serial(&self) -> Option<u32> {
        self.serial
    }

    /// Number of pages consumed so far
    pub fn pages_read(&self) -> u64 {
        self.pages.pages_read()
    }

    /// Next complete packet, or `None` once the input is exhausted
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        loop {
            if let Some(packet) = self.ready.pop_front() {
                trace!(
                    index = packet.index,
                    bytes = packet.data.len(),
                    ends_page = packet.ends_page,
                    "packet out"
                );
                return Ok(Some(packet));
            }

            match self.pages.next_page()? {
                Some(page) => self.push_page(page)?,
                None => {
                    if let Some(partial) = &self.partial {
                        return Err(Error::framing(format!(
                            "stream ended inside a packet ({} bytes pending)",
                            partial.data.len()
                        )));
                    }
                    debug!(
                        pages = self.pages.pages_read(),
                        packets = self.packets_out,
                        "end of stream"
                    );
                    return Ok(None);
                }
            }
        }
    }

    fn push_page(&mut self, page: OggPage) -> Result<()> {
        let header = &page.header;

        match self.serial {
            None => {
                debug!(serial = header.bitstream_serial, "stream serial number");
                self.serial = Some(header.bitstream_serial);
            }
            Some(serial) if serial != header.bitstream_serial => {
                return Err(Error::framing(format!(
                    "page belongs to stream {:#010x}, expected {:#010x}",
                    header.bitstream_serial, serial
                )));
            }
            Some(_) => {}
        }

        if let Some(last) = self.last_sequence {
            let expected = last.wrapping_add(1);
            if header.page_sequence != expected {
                return Err(Error::framing(format!(
                    "page sequence number {} follows {}",
                    header.page_sequence, last
                )));
            }
        }
        self.last_sequence = Some(header.page_sequence);

        let mut current = match (header.is_continuation(), self.partial.take()) {
            (true, Some(partial)) => partial,
            (true, None) => {
                return Err(Error::framing(format!(
                    "page {} continues a packet that was never started",
                    header.page_sequence
                )))
            }
            (false, Some(partial)) => {
                return Err(Error::framing(format!(
                    "page {} drops an incomplete packet of {} bytes",
                    header.page_sequence,
                    partial.data.len()
                )))
            }
            (false, None) => Partial {
                data: Vec::new(),
                page_breaks: Vec::new(),
            },
        };

        let first_new = self.ready.len();
        let mut offset = 0;
        let mut segments = 0;
        for &lacing in &header.segment_table {
            let len = lacing as usize;
            current.data.extend_from_slice(&page.data[offset..offset + len]);
            offset += len;
            segments += 1;
            if len < 255 {
                self.packets_out += 1;
                let mut packet = Packet::new(std::mem::take(&mut current.data), self.packets_out);
                packet.page_breaks = std::mem::take(&mut current.page_breaks);
                self.ready.push_back(packet);
                segments = 0;
            }
        }

        // an empty continued page keeps the pending packet alive
        let continues = header.segment_table.last() == Some(&255)
            || (header.is_continuation() && header.segment_table.is_empty());
        if continues {
            if segments > 0 {
                current.page_breaks.push(segments);
            }
            self.partial = Some(current);
        }

        if self.ready.len() > first_new {
            if let Some(last) = self.ready.back_mut() {
                last.granule_position = header.granule_position;
                last.ends_page = true;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ogg::{OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION};

    fn page(flags: u8, sequence: u32, granule: u64, lacing: Vec<u8>) -> Vec<u8> {
        let size: usize = lacing.iter().map(|&l| l as usize).sum();
        let data = (0..size).map(|i| i as u8).collect();
        OggPage::new(flags, granule, 7, sequence, lacing, data).to_bytes()
    }

    #[test]
    fn marks_last_packet_of_each_page() {
        let mut stream = page(OGG_HEADER_TYPE_BOS, 0, 0, vec![3]);
        stream.extend(page(0, 1, 960, vec![2, 4, 1]));

        let mut demuxer = PacketDemuxer::new(&stream[..]);
        let first = demuxer.next_packet().unwrap().unwrap();
        assert_eq!((first.index, first.ends_page, first.granule_position), (1, true, 0));
        assert_eq!(demuxer.serial(), Some(7));

        let second = demuxer.next_packet().unwrap().unwrap();
        assert_eq!(second.data, vec![0, 1]);
        assert!(!second.ends_page);
        assert_eq!(second.granule_position, NO_GRANULE);
        let third = demuxer.next_packet().unwrap().unwrap();
        assert_eq!(third.data, vec![2, 3, 4, 5]);
        let fourth = demuxer.next_packet().unwrap().unwrap();
        assert_eq!((fourth.index, fourth.ends_page, fourth.granule_position), (4, true, 960));
        assert!(demuxer.next_packet().unwrap().is_none());
        assert_eq!(demuxer.pages_read(), 2);
    }

    #[test]
    fn joins_packets_across_pages() {
        let mut stream = page(OGG_HEADER_TYPE_BOS, 0, NO_GRANULE, vec![255]);
        stream.extend(page(OGG_HEADER_TYPE_CONTINUATION, 1, 10, vec![255, 0]));

        let mut demuxer = PacketDemuxer::new(&stream[..]);
        let packet = demuxer.next_packet().unwrap().unwrap();
        assert_eq!(packet.data.len(), 510);
        assert_eq!(packet.granule_position, 10);
        assert_eq!(packet.page_breaks, vec![1]);
        assert!(demuxer.next_packet().unwrap().is_none());
    }

    #[test]
    fn rejects_orphan_continuation() {
        let stream = page(OGG_HEADER_TYPE_CONTINUATION, 0, 0, vec![4]);
        let err = PacketDemuxer::new(&stream[..]).next_packet().unwrap_err();
        assert!(matches!(err, Error::Framing(msg) if msg.contains("never started")));
    }
}
