//! Storage layouts for packed integer arrays
//!
//! A [`Format`] describes how fixed-width values are laid out in the backing
//! buffer and computes exact buffer sizes. Two layouts exist: the dense
//! spanning layout, where a value may straddle two adjacent 64-bit words, and
//! the block-aligned layout, where every value lives entirely inside one word
//! at the cost of unused padding bits.

use crate::error::{PackoraError, Result};
use crate::packed::single_block::Packed64SingleBlock;
use crate::packed::{COMPACT, FASTEST, VERSION_BYTE_ALIGNED};

/// Identifies the layout of values inside the word/byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Dense layout: values occupy consecutive bit positions with no padding;
    /// a value may span two adjacent 64-bit words.
    Packed,
    /// Block-aligned layout: `floor(64 / bits)` values per word, the
    /// remaining high bits of each word are padding. No value ever spans two
    /// words.
    PackedSingleBlock,
}

impl Format {
    /// Numeric identifier used in the serialized header.
    pub fn id(&self) -> u32 {
        match self {
            Format::Packed => 0,
            Format::PackedSingleBlock => 1,
        }
    }

    /// Look up a format by its serialized identifier.
    pub fn by_id(id: u32) -> Result<Format> {
        match id {
            0 => Ok(Format::Packed),
            1 => Ok(Format::PackedSingleBlock),
            _ => Err(PackoraError::invalid_argument(format!(
                "Unknown format id: {}",
                id
            ))),
        }
    }

    /// Minimum number of bytes needed to store `value_count` values of
    /// `bits_per_value` bits each.
    ///
    /// For the [`Format::Packed`] layout the result depends on the stream
    /// version: streams older than the byte-aligned layout padded every value
    /// run out to whole 64-bit words, so their byte count is exactly
    /// `8 * word_count`.
    pub fn byte_count(&self, version: u32, value_count: usize, bits_per_value: u32) -> u64 {
        debug_assert!(bits_per_value >= 1 && bits_per_value <= 64);
        match self {
            Format::Packed => {
                let bit_count = value_count as u64 * bits_per_value as u64;
                if version < VERSION_BYTE_ALIGNED {
                    8 * ((bit_count + 63) / 64)
                } else {
                    (bit_count + 7) / 8
                }
            }
            Format::PackedSingleBlock => {
                8 * self.word_count(version, value_count, bits_per_value) as u64
            }
        }
    }

    /// Minimum number of 64-bit words needed to store `value_count` values of
    /// `bits_per_value` bits each.
    pub fn word_count(&self, version: u32, value_count: usize, bits_per_value: u32) -> usize {
        debug_assert!(bits_per_value >= 1 && bits_per_value <= 64);
        match self {
            Format::Packed => {
                let byte_count = self.byte_count(version, value_count, bits_per_value);
                ((byte_count + 7) / 8) as usize
            }
            Format::PackedSingleBlock => {
                let values_per_block = (64 / bits_per_value) as usize;
                (value_count + values_per_block - 1) / values_per_block
            }
        }
    }

    /// Whether this format can store values of the given width.
    pub fn is_supported(&self, bits_per_value: u32) -> bool {
        match self {
            Format::Packed => (1..=64).contains(&bits_per_value),
            Format::PackedSingleBlock => Packed64SingleBlock::is_supported(bits_per_value),
        }
    }

    /// Average number of padding bits spent per stored value.
    pub fn overhead_per_value(&self, bits_per_value: u32) -> f32 {
        debug_assert!(self.is_supported(bits_per_value));
        match self {
            Format::Packed => 0.0,
            Format::PackedSingleBlock => {
                let values_per_block = 64 / bits_per_value;
                let overhead = 64 % bits_per_value;
                overhead as f32 / values_per_block as f32
            }
        }
    }

    /// Padding overhead relative to the value width.
    pub fn overhead_ratio(&self, bits_per_value: u32) -> f32 {
        debug_assert!(self.is_supported(bits_per_value));
        self.overhead_per_value(bits_per_value) / bits_per_value as f32
    }
}

/// A layout decision: which format to use and at what width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatAndBits {
    /// The chosen storage format
    pub format: Format,
    /// The actual bits per value the array will be allocated with
    pub bits_per_value: u32,
}

/// Pick the fastest layout that stores `bits_per_value`-bit values without
/// exceeding the acceptable memory overhead.
///
/// With a permissive budget the width is rounded up to the nearest of
/// 8/16/32/64 bits (fast shift/mask access in the dense layout); otherwise
/// the block-aligned widths are probed in order, and if none fits the budget
/// the exact dense layout is used.
pub fn fastest_format_and_bits(bits_per_value: u32, acceptable_overhead_ratio: f32) -> FormatAndBits {
    let acceptable_overhead_ratio = acceptable_overhead_ratio.max(COMPACT).min(FASTEST);
    let acceptable_overhead_per_value = acceptable_overhead_ratio * bits_per_value as f32;

    let max_bits_per_value = bits_per_value + acceptable_overhead_per_value as u32;

    if bits_per_value <= 8 && max_bits_per_value >= 8 {
        return FormatAndBits {
            format: Format::Packed,
            bits_per_value: 8,
        };
    }
    if bits_per_value <= 16 && max_bits_per_value >= 16 {
        return FormatAndBits {
            format: Format::Packed,
            bits_per_value: 16,
        };
    }
    if bits_per_value <= 32 && max_bits_per_value >= 32 {
        return FormatAndBits {
            format: Format::Packed,
            bits_per_value: 32,
        };
    }
    if bits_per_value <= 64 && max_bits_per_value >= 64 {
        return FormatAndBits {
            format: Format::Packed,
            bits_per_value: 64,
        };
    }

    for bpv in bits_per_value..=max_bits_per_value {
        if Format::PackedSingleBlock.is_supported(bpv) {
            let overhead = Format::PackedSingleBlock.overhead_per_value(bpv);
            let acceptable_overhead =
                acceptable_overhead_per_value + bits_per_value as f32 - bpv as f32;
            if overhead <= acceptable_overhead {
                return FormatAndBits {
                    format: Format::PackedSingleBlock,
                    bits_per_value: bpv,
                };
            }
        }
    }

    FormatAndBits {
        format: Format::Packed,
        bits_per_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packed::{COMPACT, DEFAULT, FASTEST, VERSION_CURRENT, VERSION_START};

    #[test]
    fn test_format_ids() {
        assert_eq!(Format::Packed.id(), 0);
        assert_eq!(Format::PackedSingleBlock.id(), 1);
        assert_eq!(Format::by_id(0).unwrap(), Format::Packed);
        assert_eq!(Format::by_id(1).unwrap(), Format::PackedSingleBlock);
        assert!(Format::by_id(2).is_err());
    }

    #[test]
    fn test_packed_byte_count_is_exact() {
        // ceil(n * bits / 8)
        assert_eq!(Format::Packed.byte_count(VERSION_CURRENT, 10, 3), 4);
        assert_eq!(Format::Packed.byte_count(VERSION_CURRENT, 8, 8), 8);
        assert_eq!(Format::Packed.byte_count(VERSION_CURRENT, 9, 7), 8);
        assert_eq!(Format::Packed.byte_count(VERSION_CURRENT, 0, 13), 0);
        assert_eq!(Format::Packed.byte_count(VERSION_CURRENT, 1, 64), 8);
    }

    #[test]
    fn test_legacy_byte_count_is_word_padded() {
        // Streams older than the byte-aligned layout pad out to whole words
        for &(n, bits) in &[(10usize, 3u32), (9, 7), (1, 1), (100, 63)] {
            let words = Format::Packed.word_count(VERSION_START, n, bits) as u64;
            assert_eq!(Format::Packed.byte_count(VERSION_START, n, bits), 8 * words);
        }
    }

    #[test]
    fn test_packed_word_count() {
        // ceil(30 / 64) = 1 word for 10 3-bit values
        assert_eq!(Format::Packed.word_count(VERSION_CURRENT, 10, 3), 1);
        assert_eq!(Format::Packed.word_count(VERSION_CURRENT, 0, 5), 0);
        assert_eq!(Format::Packed.word_count(VERSION_CURRENT, 64, 1), 1);
        assert_eq!(Format::Packed.word_count(VERSION_CURRENT, 65, 1), 2);
        assert_eq!(Format::Packed.word_count(VERSION_CURRENT, 3, 64), 3);
    }

    #[test]
    fn test_single_block_counts() {
        // bits=8: 8 values per block, 9 values -> 2 words
        assert_eq!(Format::PackedSingleBlock.word_count(VERSION_CURRENT, 9, 8), 2);
        assert_eq!(
            Format::PackedSingleBlock.byte_count(VERSION_CURRENT, 9, 8),
            16
        );
        // bits=21: 3 values per block
        assert_eq!(Format::PackedSingleBlock.word_count(VERSION_CURRENT, 3, 21), 1);
        assert_eq!(Format::PackedSingleBlock.word_count(VERSION_CURRENT, 4, 21), 2);
        assert_eq!(Format::PackedSingleBlock.word_count(VERSION_CURRENT, 0, 21), 0);
    }

    #[test]
    fn test_byte_count_matches_word_count_for_single_block() {
        for &bits in &[1u32, 3, 8, 12, 21, 32] {
            for n in [0usize, 1, 7, 63, 64, 65, 1000] {
                let words = Format::PackedSingleBlock.word_count(VERSION_CURRENT, n, bits) as u64;
                assert_eq!(
                    Format::PackedSingleBlock.byte_count(VERSION_CURRENT, n, bits),
                    8 * words
                );
            }
        }
    }

    #[test]
    fn test_is_supported() {
        assert!(Format::Packed.is_supported(1));
        assert!(Format::Packed.is_supported(64));
        assert!(!Format::Packed.is_supported(0));
        assert!(!Format::Packed.is_supported(65));

        assert!(Format::PackedSingleBlock.is_supported(21));
        assert!(!Format::PackedSingleBlock.is_supported(11));
        assert!(!Format::PackedSingleBlock.is_supported(64));
    }

    #[test]
    fn test_overhead() {
        assert_eq!(Format::Packed.overhead_per_value(7), 0.0);
        // bits=21: 3 per block, 1 padding bit
        let overhead = Format::PackedSingleBlock.overhead_per_value(21);
        assert!((overhead - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(Format::PackedSingleBlock.overhead_per_value(32), 0.0);
    }

    #[test]
    fn test_fastest_format_rounds_to_byte_widths() {
        let picked = fastest_format_and_bits(7, FASTEST);
        assert_eq!(picked.format, Format::Packed);
        assert_eq!(picked.bits_per_value, 8);

        let picked = fastest_format_and_bits(13, FASTEST);
        assert_eq!(picked.bits_per_value, 16);

        let picked = fastest_format_and_bits(60, FASTEST);
        assert_eq!(picked.bits_per_value, 64);
    }

    #[test]
    fn test_compact_keeps_exact_width() {
        let picked = fastest_format_and_bits(7, COMPACT);
        assert_eq!(picked.format, Format::Packed);
        assert_eq!(picked.bits_per_value, 7);
    }

    #[test]
    fn test_single_block_is_picked_within_budget() {
        // 21 bits with a default overhead budget: padding (1 bit over 3
        // values) is affordable, full 32-bit rounding is not.
        let picked = fastest_format_and_bits(21, DEFAULT);
        assert_eq!(picked.format, Format::PackedSingleBlock);
        assert_eq!(picked.bits_per_value, 21);
    }
}
