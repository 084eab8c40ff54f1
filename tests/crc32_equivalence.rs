//! CRC-32: hardware path vs portable fallback bit-identity, alignment
//! sweep, and seed chaining over split spans.

use veilkv::checksum::{crc32, crc32_hardware, crc32_portable};

#[test]
fn known_check_value() {
    // The standard IEEE CRC-32 check value.
    assert_eq!(crc32(0, b"123456789"), 0xcbf4_3926);
    assert_eq!(crc32_portable(0, b"123456789"), 0xcbf4_3926);
}

#[test]
fn empty_and_single_byte() {
    assert_eq!(crc32(0, &[]), 0);
    assert_eq!(crc32(0x1234_5678, &[]), 0x1234_5678);
    assert_eq!(crc32(0, &[0x00]), crc32_portable(0, &[0x00]));
    assert_eq!(crc32(0, &[0xff]), crc32_portable(0, &[0xff]));
}

#[test]
fn hardware_matches_portable_across_alignments_and_sizes() {
    let data: Vec<u8> = (0..8192u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();

    for offset in 0..8usize {
        for len in [0usize, 1, 2, 3, 7, 8, 9, 15, 16, 63, 64, 65, 255, 4096] {
            let span = &data[offset..offset + len];
            let soft = crc32_portable(0, span);
            assert_eq!(crc32(0, span), soft, "offset {} len {}", offset, len);
            if let Some(hard) = crc32_hardware(0, span) {
                assert_eq!(hard, soft, "hw offset {} len {}", offset, len);
            }
        }
    }
}

#[test]
fn seed_chaining_equals_single_span() {
    let data: Vec<u8> = (0..3000u32).map(|i| (i * 31 + 7) as u8).collect();
    for split in [0usize, 1, 5, 8, 16, 100, 2999, 3000] {
        let (a, b) = data.split_at(split);
        let chained = crc32(crc32(0, a), b);
        assert_eq!(chained, crc32(0, &data), "split {}", split);
        if let (Some(ha), Some(h)) = (crc32_hardware(0, a), crc32_hardware(0, &data)) {
            let hb = crc32_hardware(ha, b).unwrap();
            assert_eq!(hb, h, "hw split {}", split);
        }
    }
}

#[test]
fn nonzero_seed_agrees_between_paths() {
    let data: Vec<u8> = (0..777u32).map(|i| (i ^ 0xa5) as u8).collect();
    for seed in [0u32, 1, 0xdead_beef, u32::MAX] {
        let soft = crc32_portable(seed, &data);
        assert_eq!(crc32(seed, &data), soft);
        if let Some(hard) = crc32_hardware(seed, &data) {
            assert_eq!(hard, soft);
        }
    }
}
