use std::io::Read;

use tracing::trace;

use crate::error::{Error, Result};
use crate::ogg::{
    crc32, NO_GRANULE, OGG_HEADER_SIZE, OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION,
    OGG_HEADER_TYPE_EOS, OGG_SIGNATURE, OGG_VERSION,
};
use crate::utils::io::read_full;

/// Byte offset of the checksum inside the page header
const CRC_OFFSET: usize = 22;

/// OGG Page Header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggPageHeader {
    pub header_type: u8,
    pub granule_position: u64,
    pub bitstream_serial: u32,
    pub page_sequence: u32,
    pub crc: u32,
    pub segment_table: Vec<u8>,
}

/// OGG Page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggPage {
    pub header: OggPageHeader,
    pub data: Vec<u8>,
}

impl OggPageHeader {
    /// Read OGG page header from a reader
    ///
    /// Returns `Ok(None)` when the input ends cleanly before the first byte.
    pub fn read<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let mut header = [0u8; OGG_HEADER_SIZE];
        match read_full(reader, &mut header)? {
            0 => return Ok(None),
            OGG_HEADER_SIZE => {}
            n => {
                return Err(Error::framing(format!(
                    "truncated page header ({} of {} bytes)",
                    n, OGG_HEADER_SIZE
                )))
            }
        }

        // Check OGG signature
        if &header[0..4] != OGG_SIGNATURE {
            return Err(Error::framing("missing OggS capture pattern"));
        }

        let version = header[4];
        if version != OGG_VERSION {
            return Err(Error::framing(format!(
                "unsupported stream structure version {}",
                version
            )));
        }

        let header_type = header[5];
        let granule_position = u64::from_le_bytes(le_array(&header[6..14]));
        let bitstream_serial = u32::from_le_bytes(le_array(&header[14..18]));
        let page_sequence = u32::from_le_bytes(le_array(&header[18..22]));
        let crc = u32::from_le_bytes(le_array(&header[22..26]));
        let segment_count = header[26] as usize;

        // Read segment table
        let mut segment_table = vec![0u8; segment_count];
        if read_full(reader, &mut segment_table)? != segment_count {
            return Err(Error::framing("truncated segment table"));
        }

        Ok(Some(OggPageHeader {
            header_type,
            granule_position,
            bitstream_serial,
            page_sequence,
            crc,
            segment_table,
        }))
    }

    /// Calculate total page data size from segment table
    pub fn get_data_size(&self) -> usize {
        self.segment_table.iter().map(|&x| x as usize).sum()
    }

    /// Whether the first segment continues a packet from the previous page
    pub fn is_continuation(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_CONTINUATION != 0
    }

    /// Check if this is the beginning of a stream
    pub fn is_bos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_BOS != 0
    }

    /// Check if this is the end of a stream
    pub fn is_eos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_EOS != 0
    }

    /// Serialize the header with the checksum field zeroed
    fn to_bytes_without_crc(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(OGG_HEADER_SIZE + self.segment_table.len());
        bytes.extend_from_slice(OGG_SIGNATURE);
        bytes.push(OGG_VERSION);
        bytes.push(self.header_type);
        bytes.extend_from_slice(&self.granule_position.to_le_bytes());
        bytes.extend_from_slice(&self.bitstream_serial.to_le_bytes());
        bytes.extend_from_slice(&self.page_sequence.to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);
        bytes.push(self.segment_table.len() as u8);
        bytes.extend_from_slice(&self.segment_table);
        bytes
    }
}

impl OggPage {
    /// Build a page from its parts; the checksum is filled in by [`OggPage::to_bytes`]
    pub fn new(
        header_type: u8,
        granule_position: u64,
        bitstream_serial: u32,
        page_sequence: u32,
        segment_table: Vec<u8>,
        data: Vec<u8>,
    ) -> Self {
        debug_assert!(segment_table.len() <= 255);
        OggPage {
            header: OggPageHeader {
                header_type,
                granule_position,
                bitstream_serial,
                page_sequence,
                crc: 0,
                segment_table,
            },
            data,
        }
    }

    /// Read OGG page from a reader and verify its checksum
    pub fn read<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let header = match OggPageHeader::read(reader)? {
            Some(header) => header,
            None => return Ok(None),
        };

        // Read page data
        let data_size = header.get_data_size();
        let mut data = vec![0u8; data_size];
        let read = read_full(reader, &mut data)?;
        if read != data_size {
            return Err(Error::framing(format!(
                "truncated page body ({} of {} bytes)",
                read, data_size
            )));
        }

        let page = OggPage { header, data };
        let computed = page.compute_crc();
        if computed != page.header.crc {
            return Err(Error::framing(format!(
                "checksum mismatch on page {}: stored {:#010x}, computed {:#010x}",
                page.header.page_sequence, page.header.crc, computed
            )));
        }

        Ok(Some(page))
    }

    /// Checksum of the page as it would be written
    pub fn compute_crc(&self) -> u32 {
        let mut digest = crc32::digest();
        digest.update(&self.header.to_bytes_without_crc());
        digest.update(&self.data);
        digest.finalize()
    }

    /// Serialize the page, computing its checksum
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.header.to_bytes_without_crc();
        bytes.extend_from_slice(&self.data);
        let crc = crc32::checksum(&bytes);
        bytes[CRC_OFFSET..CRC_OFFSET + 4].copy_from_slice(&crc.to_le_bytes());
        bytes
    }

    /// Granule position, or `None` when no packet completes on this page
    pub fn granule(&self) -> Option<u64> {
        match self.header.granule_position {
            NO_GRANULE => None,
            granule => Some(granule),
        }
    }
}

/// Pulls pages one at a time from a byte source
pub struct PageReader<R> {
    inner: R,
    pages_read: u64,
}

impl<R: Read> PageReader<R> {
    pub fn new(inner: R) -> Self {
        PageReader {
            inner,
            pages_read: 0,
        }
    }

    /// Next page, or `None` at a clean end of input
    pub fn next_page(&mut self) -> Result<Option<OggPage>> {
        let page = OggPage::read(&mut self.inner)?;
        if let Some(page) = &page {
            self.pages_read += 1;
            trace!(
                sequence = page.header.page_sequence,
                segments = page.header.segment_table.len(),
                bytes = page.data.len(),
                granule = ?page.granule(),
                "read page"
            );
        }
        Ok(page)
    }

    pub fn pages_read(&self) -> u64 {
        self.pages_read
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut array = [0u8; N];
    array.copy_from_slice(bytes);
    array
}
