// OpusHead identification header
//
// Only the magic and the size of the fixed part are checked. Channel mapping
// and sample rate do not matter for tag editing, and the packet is always
// copied through untouched.

use crate::error::{Error, Result};
use crate::opus::OPUS_SIGNATURE;

/// Magic, version, channel count, pre-skip, input rate, gain, mapping family
pub const OPUS_HEAD_MIN_SIZE: usize = 19;

/// Check that `packet` looks like an OpusHead identification header
pub fn validate_identification_header(packet: &[u8]) -> Result<()> {
    if packet.len() < OPUS_SIGNATURE.len() || &packet[..8] != OPUS_SIGNATURE {
        return Err(Error::InvalidIdentificationHeader(
            "first packet does not start with OpusHead",
        ));
    }
    if packet.len() < OPUS_HEAD_MIN_SIZE {
        return Err(Error::InvalidIdentificationHeader(
            "identification header is too short",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_minimal_header() {
        let mut packet = OPUS_SIGNATURE.to_vec();
        packet.extend_from_slice(&[1, 2, 0x38, 1, 0x80, 0xbb, 0, 0, 0, 0, 0]);
        assert!(validate_identification_header(&packet).is_ok());
    }

    #[test]
    fn rejects_wrong_magic_and_short_packets() {
        assert!(matches!(
            validate_identification_header(b"OpusTags\x01\x02\x00\x00\x00\x00\x00\x00\x00\x00\x00"),
            Err(Error::InvalidIdentificationHeader(_))
        ));
        assert!(matches!(
            validate_identification_header(b"Opus"),
            Err(Error::InvalidIdentificationHeader(_))
        ));
        assert!(matches!(
            validate_identification_header(b"OpusHead\x01"),
            Err(Error::InvalidIdentificationHeader(msg)) if msg.contains("short")
        ));
    }
}
