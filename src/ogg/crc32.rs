// Ogg page checksum
//
// CRC-32 with polynomial 0x04C11DB7, initial value 0, no bit reflection and
// no final XOR. It is computed over the whole page with the checksum field
// set to zero.

use crc::{Algorithm, Crc, Digest};

/// The Ogg flavour of CRC-32; not in the crc catalog
pub const CRC_32_OGG: Algorithm<u32> = Algorithm {
    width: 32,
    poly: 0x04c1_1db7,
    init: 0,
    refin: false,
    refout: false,
    xorout: 0,
    check: 0x89a1_897f,
    residue: 0,
};

static OGG_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_OGG);

/// Running checksum, for pages whose header and body live in separate buffers
pub fn digest() -> Digest<'static, u32> {
    OGG_CRC.digest()
}

/// Checksum of a complete buffer
pub fn checksum(data: &[u8]) -> u32 {
    OGG_CRC.checksum(data)
}
