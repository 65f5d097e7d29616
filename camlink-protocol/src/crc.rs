//! Image checksum
//!
//! CRC-16 with the reflected polynomial 0xA001, initial value 0xFFFF,
//! processed LSB-first with no final XOR. This parameter set is catalogued
//! as CRC-16/MODBUS; the same register update with a zero initial value is
//! CRC-16/ARC.

/// Reflected CRC-16 polynomial (0x8005 bit-reversed)
pub const CRC16_POLY: u16 = 0xA001;

/// Initial register value
pub const CRC16_INIT: u16 = 0xFFFF;

/// Compute the image checksum over `data`
///
/// An empty slice yields the initial value, 0xFFFF.
pub fn crc16(data: &[u8]) -> u16 {
    crc16_update(CRC16_INIT, data)
}

/// Continue a checksum over another block of bytes
///
/// Lets the master checksum a chunked transfer as it arrives.
pub fn crc16_update(mut crc: u16, data: &[u8]) -> u16 {
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CHECK_INPUT: &[u8] = b"123456789";

    #[test]
    fn test_empty_is_initial_value() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn test_modbus_check_value() {
        // Published check value for poly 0xA001 / init 0xFFFF
        assert_eq!(crc16(CHECK_INPUT), 0x4B37);
    }

    #[test]
    fn test_arc_check_value_with_zero_init() {
        // Same polynomial from a zero register is CRC-16/ARC
        assert_eq!(crc16_update(0x0000, CHECK_INPUT), 0xBB3D);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let (a, b) = data.split_at(17);
        assert_eq!(crc16_update(crc16(a), b), crc16(data));
    }

    proptest! {
        #[test]
        fn prop_checksum_is_stable(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            prop_assert_eq!(crc16(&data), crc16(&data));
        }

        #[test]
        fn prop_split_anywhere(data in proptest::collection::vec(any::<u8>(), 0..512), split in 0usize..512) {
            let split = split.min(data.len());
            let (a, b) = data.split_at(split);
            prop_assert_eq!(crc16_update(crc16(a), b), crc16(&data));
        }

        #[test]
        fn prop_single_bit_flip_detected(data in proptest::collection::vec(any::<u8>(), 1..256), idx in 0usize..256, bit in 0u8..8) {
            let idx = idx % data.len();
            let mut flipped = data.clone();
            flipped[idx] ^= 1 << bit;
            prop_assert_ne!(crc16(&data), crc16(&flipped));
        }
    }
}
