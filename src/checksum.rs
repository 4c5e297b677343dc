//! CRC-16 checksums for datagram integrity.
//!
//! The wire protocol stamps a CRC-16/CCITT checksum (poly `0x1021`, init
//! `0xFFFF`) into a fixed field of every datagram. Verification recomputes
//! the checksum over the whole datagram with the checksum field's own bytes
//! treated as zero, so the field can be validated in place.

use crc::{Crc, CRC_16_IBM_3740};

/// The CRC-16/CCITT algorithm used by the wire protocol.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Compute the CRC-16 of `data`.
#[inline]
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Compute the CRC-16 of `data` with the bytes at the `skip` indices
/// treated as zero.
///
/// `skip` holds absolute indices into `data` and must be ascending.
/// Indices past the end of `data` are ignored.
pub fn crc16_with_skip(data: &[u8], skip: &[usize]) -> u16 {
    let mut digest = CRC16.digest();
    let mut start = 0;

    for &index in skip {
        if index >= data.len() {
            break;
        }
        if index < start {
            continue;
        }
        digest.update(&data[start..index]);
        digest.update(&[0]);
        start = index + 1;
    }

    digest.update(&data[start..]);
    digest.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_check_value() {
        // CRC-16/CCITT-FALSE check value for "123456789".
        assert_eq!(crc16(b"123456789"), 0x29B1);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(crc16(b""), 0xFFFF);
        assert_eq!(crc16_with_skip(b"", &[0, 1]), 0xFFFF);
    }

    #[test]
    fn test_skip_matches_zeroed_copy() {
        let data: Vec<u8> = (0u8..64).map(|i| i.wrapping_mul(37)).collect();

        let mut zeroed = data.clone();
        zeroed[8] = 0;
        zeroed[9] = 0;

        assert_eq!(crc16_with_skip(&data, &[8, 9]), crc16(&zeroed));
    }

    #[test]
    fn test_empty_skip_set() {
        let data = b"datagram payload";
        assert_eq!(crc16_with_skip(data, &[]), crc16(data));
    }

    #[test]
    fn test_skip_at_boundaries() {
        let data = b"abcdef";

        let mut first = data.to_vec();
        first[0] = 0;
        assert_eq!(crc16_with_skip(data, &[0]), crc16(&first));

        let mut last = data.to_vec();
        last[5] = 0;
        assert_eq!(crc16_with_skip(data, &[5]), crc16(&last));
    }

    #[test]
    fn test_out_of_range_indices_ignored() {
        let data = b"abcdef";
        assert_eq!(crc16_with_skip(data, &[100]), crc16(data));
    }

    #[test]
    fn test_sensitive_to_every_byte() {
        let data = vec![0xAB; 32];
        let base = crc16(&data);

        for i in 0..data.len() {
            let mut copy = data.clone();
            copy[i] ^= 0x01;
            assert_ne!(crc16(&copy), base, "flip at {} went undetected", i);
        }
    }
}
