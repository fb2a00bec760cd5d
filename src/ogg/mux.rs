// Packet multiplexer and page writer
//
// Packets are queued until the caller flushes, then laced into as many pages
// as needed (255 lacing values per page at most). A packet that spanned pages
// in its source is broken where its source pages ended, so every page that
// completes a packet also carries that packet's granule. The most recent page
// is held back so that the end-of-stream flag can be set on it by `finish`.

use std::io::Write;

use tracing::{debug, trace};

use crate::error::Result;
use crate::ogg::demux::Packet;
use crate::ogg::page::OggPage;
use crate::ogg::{
    MAX_SEGMENTS, NO_GRANULE, OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION,
    OGG_HEADER_TYPE_EOS,
};

/// Re-segments packets into pages of a single logical stream
pub struct PacketMuxer<W: Write> {
    writer: W,
    serial: u32,
    next_sequence: u32,
    queue: Vec<Packet>,
    held: Option<OggPage>,
    started: bool,
    pages_written: u64,
}

impl<W: Write> PacketMuxer<W> {
    pub fn new(writer: W, serial: u32) -> Self {
        PacketMuxer {
            writer,
            serial,
            next_sequence: 0,
            queue: Vec::new(),
            held: None,
            started: false,
            pages_written: 0,
        }
    }

    /// Queue a packet for the next flush
    pub fn push(&mut self, packet: Packet) {
        self.queue.push(packet);
    }

    /// Turn every queued packet into pages, ending the last page at the last packet
    pub fn flush(&mut self) -> Result<()> {
        let queue = std::mem::take(&mut self.queue);

        let mut lacing = Vec::new();
        let mut body = Vec::new();
        let mut granule = NO_GRANULE;
        let mut continued = false;

        for packet in queue {
            let mut breaks = packet
                .page_breaks
                .iter()
                .scan(0, |total, &segments| {
                    *total += segments;
                    Some(*total)
                })
                .peekable();
            let mut rest = &packet.data[..];
            let mut segment = 0;
            loop {
                let len = rest.len().min(255);
                lacing.push(len as u8);
                body.extend_from_slice(&rest[..len]);
                rest = &rest[len..];
                segment += 1;

                let complete = len < 255;
                if complete {
                    granule = packet.granule_position;
                }

                let source_break = breaks.next_if_eq(&segment).is_some();
                if lacing.len() == MAX_SEGMENTS || (source_break && !complete) {
                    let page_lacing = std::mem::take(&mut lacing);
                    let page_body = std::mem::take(&mut body);
                    self.emit(page_lacing, page_body, granule, continued)?;
                    continued = !complete;
                    granule = NO_GRANULE;
                }

                if complete {
                    break;
                }
            }
        }

        if !lacing.is_empty() {
            self.emit(lacing, body, granule, continued)?;
        }
        Ok(())
    }

    /// Flush what is queued, write the last page with the end-of-stream flag
    /// and hand back the writer
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        if let Some(mut page) = self.held.take() {
            page.header.header_type |= OGG_HEADER_TYPE_EOS;
            self.write_page(&page)?;
        }
        self.writer.flush()?;
        debug!(pages = self.pages_written, "stream finished");
        Ok(self.writer)
    }

    fn emit(&mut self, lacing: Vec<u8>, body: Vec<u8>, granule: u64, continued: bool) -> Result<()> {
        let mut header_type = 0;
        if continued {
            header_type |= OGG_HEADER_TYPE_CONTINUATION;
        }
        if !self.started {
            header_type |= OGG_HEADER_TYPE_BOS;
            self.started = true;
        }

        let page = OggPage::new(
            header_type,
            granule,
            self.serial,
            self.next_sequence,
            lacing,
            body,
        );
        self.next_sequence = self.next_sequence.wrapping_add(1);

        if let Some(previous) = self.held.replace(page) {
            self.write_page(&previous)?;
        }
        Ok(())
    }

    fn write_page(&mut self, page: &OggPage) -> Result<()> {
        let bytes = page.to_bytes();
        self.writer.write_all(&bytes)?;
        self.pages_written += 1;
        trace!(
            sequence = page.header.page_sequence,
            bytes = bytes.len(),
            "wrote page"
        );
        Ok(())
    }
}
