//! Ogg Opus rewrite pipeline.
//!
//! Packets flow from a [`PacketDemuxer`] through a small state machine into
//! an optional [`PacketMuxer`]:
//!
//! 1. the first packet must be an OpusHead and is copied as is;
//! 2. the second packet is parsed as OpusTags, edited, rendered and written
//!    on a page of its own;
//! 3. every later packet is copied byte for byte.
//!
//! Without an output the run stops right after the comment header.

use std::io::{self, Read, Write};

use tracing::debug;

use crate::edit::{self, EditRequest};
use crate::error::{Error, Result};
use crate::ogg::{Packet, PacketDemuxer, PacketMuxer};
use crate::opus::{validate_identification_header, OpusTags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    AwaitingIdPacket,
    AwaitingCommentPacket,
    Passthrough,
    Done,
}

struct Rewriter<R, W: Write> {
    demuxer: PacketDemuxer<R>,
    output: Option<W>,
    muxer: Option<PacketMuxer<W>>,
    state: State,
}

/// Copy `input` to `output`, replacing its comment header with the edited one.
///
/// Returns the tags that were written.
pub fn rewrite<R: Read, W: Write>(input: R, output: W, request: &EditRequest) -> Result<OpusTags> {
    Rewriter::new(input, Some(output)).run(request)
}

/// Read the comment header of `input` and apply `request` without writing anything.
///
/// Reading stops after the second packet.
pub fn read_tags<R: Read>(input: R, request: &EditRequest) -> Result<OpusTags> {
    Rewriter::<R, io::Sink>::new(input, None).run(request)
}

impl<R: Read, W: Write> Rewriter<R, W> {
    fn new(input: R, output: Option<W>) -> Self {
        Rewriter {
            demuxer: PacketDemuxer::new(input),
            output,
            muxer: None,
            state: State::Start,
        }
    }

    fn run(mut self, request: &EditRequest) -> Result<OpusTags> {
        let mut tags = None;

        while let Some(mut packet) = self.demuxer.next_packet()? {
            if self.state == State::Start {
                self.start()?;
            }

            match self.state {
                State::AwaitingIdPacket => {
                    validate_identification_header(&packet.data)?;
                    // header pages carry granule 0
                    packet.granule_position = 0;
                    self.forward(packet)?;
                    self.advance(State::AwaitingCommentPacket);
                }
                State::AwaitingCommentPacket => {
                    let edited = edit::apply(OpusTags::parse(&packet.data)?, request)?;
                    if self.muxer.is_none() {
                        self.advance(State::Done);
                        return Ok(edited);
                    }
                    self.write_comment_packet(&packet, &edited)?;
                    tags = Some(edited);
                    self.advance(State::Passthrough);
                }
                State::Passthrough => self.forward(packet)?,
                State::Start | State::Done => unreachable!("no packet is read in {:?}", self.state),
            }
        }

        let tags = tags.ok_or(Error::InvalidFile)?;
        if let Some(muxer) = self.muxer.take() {
            muxer.finish()?;
        }
        self.advance(State::Done);
        debug!(pages_read = self.demuxer.pages_read(), "rewrite complete");
        Ok(tags)
    }

    /// The first page is in, so the stream serial number is known
    fn start(&mut self) -> Result<()> {
        if let Some(output) = self.output.take() {
            let serial = self
                .demuxer
                .serial()
                .ok_or_else(|| Error::framing("packet produced before any page"))?;
            self.muxer = Some(PacketMuxer::new(output, serial));
        }
        self.advance(State::AwaitingIdPacket);
        Ok(())
    }

    fn forward(&mut self, packet: Packet) -> Result<()> {
        if let Some(muxer) = &mut self.muxer {
            let ends_page = packet.ends_page;
            muxer.push(packet);
            if ends_page {
                muxer.flush()?;
            }
        }
        Ok(())
    }

    /// The rewritten header gets pages of its own, whatever its neighbours are
    fn write_comment_packet(&mut self, original: &Packet, tags: &OpusTags) -> Result<()> {
        if let Some(muxer) = &mut self.muxer {
            muxer.flush()?;
            let mut packet = Packet::new(tags.render(), original.index);
            packet.granule_position = if original.ends_page {
                original.granule_position
            } else {
                0
            };
            packet.ends_page = true;
            muxer.push(packet);
            muxer.flush()?;
        }
        Ok(())
    }

    fn advance(&mut self, next: State) {
        debug!(from = ?self.state, to = ?next, "pipeline state");
        self.state = next;
    }
}
