//! General-purpose packed array with dense bit layout
//!
//! [`Packed64`] stores values at consecutive bit positions counted from the
//! most-significant bit of word 0 onward, with no padding. A value may span
//! exactly two adjacent 64-bit words, never three.

use crate::error::Result;
use crate::io::DataInput;
use crate::packed::bulk::BulkOperationPacked;
use crate::packed::format::Format;
use crate::packed::{max_value, unsigned_bits_required, PackedMutable, PackedReader, VERSION_CURRENT};

const BLOCK_SIZE: u32 = 64;
const BLOCK_BITS: u32 = 6;
const MOD_MASK: u64 = (BLOCK_SIZE - 1) as u64;

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Mutable packed array storing `value_count` values of 1 to 64 bits each,
/// densely packed across word boundaries.
#[derive(Clone)]
pub struct Packed64 {
    value_count: usize,
    bits_per_value: u32,
    blocks: Vec<u64>,
    mask_right: u64,
    bpv_minus_block_size: i32,
}

impl Packed64 {
    /// Create a zero-filled array.
    ///
    /// # Panics
    ///
    /// Panics if `bits_per_value` is not in `[1, 64]`.
    pub fn new(value_count: usize, bits_per_value: u32) -> Self {
        assert!(
            (1..=64).contains(&bits_per_value),
            "bits_per_value must be in [1, 64], got {}",
            bits_per_value
        );
        let blocks_size = Format::Packed.word_count(VERSION_CURRENT, value_count, bits_per_value);
        Self {
            value_count,
            bits_per_value,
            blocks: vec![0u64; blocks_size],
            mask_right: max_value(bits_per_value),
            bpv_minus_block_size: bits_per_value as i32 - BLOCK_SIZE as i32,
        }
    }

    /// Hydrate an array from its serialized form.
    ///
    /// Reads whole big-endian words first; when the byte count of the stream
    /// version is not a multiple of 8, the trailing bytes are assembled into
    /// the final word's most-significant bytes so the buffer matches a word
    /// that would have been read as a plain 8-byte big-endian integer.
    pub fn from_input<I: DataInput>(
        version: u32,
        input: &mut I,
        value_count: usize,
        bits_per_value: u32,
    ) -> Result<Self> {
        let mut array = Self::new(value_count, bits_per_value);
        let byte_count = Format::Packed.byte_count(version, value_count, bits_per_value);

        for i in 0..(byte_count / 8) as usize {
            array.blocks[i] = input.read_u64()?;
        }

        let remaining = (byte_count % 8) as u32;
        if remaining != 0 {
            let mut last_word = 0u64;
            for i in 0..remaining {
                last_word |= (input.read_u8()? as u64) << (56 - i * 8);
            }
            let last = array.blocks.len() - 1;
            array.blocks[last] = last_word;
        }

        Ok(array)
    }

    /// Direct access to the backing words (for tests and serialization)
    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }
}

impl PackedReader for Packed64 {
    fn get(&self, index: usize) -> u64 {
        debug_assert!(index < self.value_count);
        let major_bit_pos = index as u64 * self.bits_per_value as u64;
        let element_pos = (major_bit_pos >> BLOCK_BITS) as usize;
        let end_bits = (major_bit_pos & MOD_MASK) as i64 + self.bpv_minus_block_size as i64;

        if end_bits <= 0 {
            // Single word
            (self.blocks[element_pos] >> (-end_bits) as u32) & self.mask_right
        } else {
            // The value spans two words
            ((self.blocks[element_pos] << end_bits as u32)
                | (self.blocks[element_pos + 1] >> (BLOCK_SIZE as i64 - end_bits) as u32))
                & self.mask_right
        }
    }

    fn len(&self) -> usize {
        self.value_count
    }

    fn get_bulk(&self, index: usize, dst: &mut [u64]) -> usize {
        let mut len = dst.len().min(self.value_count.saturating_sub(index));
        if len == 0 {
            return 0;
        }

        let decoder = BulkOperationPacked::new(self.bits_per_value);
        let word_value_count = decoder.word_value_count();
        let mut index = index;
        let mut off = 0;

        // Walk to the next position where values are word-aligned
        let offset_in_blocks = index % word_value_count;
        if offset_in_blocks != 0 {
            let mut i = offset_in_blocks;
            while i < word_value_count && len > 0 {
                dst[off] = self.get(index);
                off += 1;
                index += 1;
                len -= 1;
                i += 1;
            }
            if len == 0 {
                return off;
            }
        }

        // Bulk get
        debug_assert_eq!(index % word_value_count, 0);
        let block_index = ((index as u64 * self.bits_per_value as u64) >> BLOCK_BITS) as usize;
        debug_assert_eq!((index as u64 * self.bits_per_value as u64) & MOD_MASK, 0);
        let iterations = len / word_value_count;
        decoder.decode(&self.blocks[block_index..], &mut dst[off..], iterations);
        let got = iterations * word_value_count;
        index += got;
        len -= got;
        off += got;

        // Tail shorter than one codec iteration
        for i in 0..len {
            dst[off + i] = self.get(index + i);
        }
        off + len
    }
}

impl PackedMutable for Packed64 {
    fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    fn set(&mut self, index: usize, value: u64) {
        debug_assert!(index < self.value_count);
        debug_assert_eq!(value & !self.mask_right, 0);
        let major_bit_pos = index as u64 * self.bits_per_value as u64;
        let element_pos = (major_bit_pos >> BLOCK_BITS) as usize;
        let end_bits = (major_bit_pos & MOD_MASK) as i64 + self.bpv_minus_block_size as i64;

        if end_bits <= 0 {
            // Single word
            let shift = (-end_bits) as u32;
            self.blocks[element_pos] =
                (self.blocks[element_pos] & !(self.mask_right << shift)) | (value << shift);
        } else {
            // The value spans two words
            let end_bits = end_bits as u32;
            self.blocks[element_pos] = (self.blocks[element_pos] & !(self.mask_right >> end_bits))
                | (value >> end_bits);
            self.blocks[element_pos + 1] = (self.blocks[element_pos + 1]
                & (u64::MAX >> end_bits))
                | (value << (BLOCK_SIZE - end_bits));
        }
    }

    fn set_bulk(&mut self, index: usize, src: &[u64]) -> usize {
        let mut len = src.len().min(self.value_count.saturating_sub(index));
        if len == 0 {
            return 0;
        }

        let encoder = BulkOperationPacked::new(self.bits_per_value);
        let word_value_count = encoder.word_value_count();
        let mut index = index;
        let mut off = 0;

        // Walk to the next position where values are word-aligned
        let offset_in_blocks = index % word_value_count;
        if offset_in_blocks != 0 {
            let mut i = offset_in_blocks;
            while i < word_value_count && len > 0 {
                self.set(index, src[off]);
                off += 1;
                index += 1;
                len -= 1;
                i += 1;
            }
            if len == 0 {
                return off;
            }
        }

        // Bulk set
        debug_assert_eq!(index % word_value_count, 0);
        let block_index = ((index as u64 * self.bits_per_value as u64) >> BLOCK_BITS) as usize;
        debug_assert_eq!((index as u64 * self.bits_per_value as u64) & MOD_MASK, 0);
        let iterations = len / word_value_count;
        encoder.encode(&src[off..], &mut self.blocks[block_index..], iterations);
        let set = iterations * word_value_count;
        index += set;
        len -= set;
        off += set;

        // Tail shorter than one codec iteration
        for i in 0..len {
            self.set(index + i, src[off + i]);
        }
        off + len
    }

    fn fill(&mut self, from: usize, to: usize, value: u64) {
        debug_assert!(unsigned_bits_required(value) <= self.bits_per_value);
        debug_assert!(from <= to && to <= self.value_count);

        // Minimum number of values that use an exact number of full words
        let n_aligned_values = 64 / gcd(64, self.bits_per_value as usize);
        let span = to - from;
        if span <= 3 * n_aligned_values {
            // Not worth the bulk setup below
            for i in from..to {
                self.set(i, value);
            }
            return;
        }

        // Fill the first values naively until the next aligned group start
        let mut from = from;
        let from_mod = from % n_aligned_values;
        if from_mod != 0 {
            for _ in from_mod..n_aligned_values {
                self.set(from, value);
                from += 1;
            }
        }
        debug_assert_eq!(from % n_aligned_values, 0);

        // Build the word pattern of one aligned group and replicate it
        // cyclically across the destination words without any shift or mask
        let n_aligned_blocks = (n_aligned_values * self.bits_per_value as usize) >> 6;
        let pattern = {
            let mut values = Packed64::new(n_aligned_values, self.bits_per_value);
            for i in 0..n_aligned_values {
                values.set(i, value);
            }
            values.blocks
        };
        debug_assert!(n_aligned_blocks <= pattern.len());

        let start_block = ((from as u64 * self.bits_per_value as u64) >> 6) as usize;
        let end_block = ((to as u64 * self.bits_per_value as u64) >> 6) as usize;
        for block in start_block..end_block {
            self.blocks[block] = pattern[block % n_aligned_blocks];
        }

        // Fill the gap after the last whole word
        for i in (((end_block as u64) << 6) / self.bits_per_value as u64) as usize..to {
            self.set(i, value);
        }
    }

    fn clear(&mut self) {
        self.blocks.fill(0);
    }
}

impl std::fmt::Debug for Packed64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packed64")
            .field("value_count", &self.value_count)
            .field("bits_per_value", &self.bits_per_value)
            .field("blocks", &self.blocks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SliceDataInput;
    use crate::packed::VERSION_START;

    #[test]
    fn test_basic_round_trip() {
        let value_count = 1000;
        let bits = 9;
        let mut p64 = Packed64::new(value_count, bits);

        for i in 0..value_count {
            p64.set(i, (i as u64) & ((1 << bits) - 1));
        }
        for i in 0..value_count {
            assert_eq!(p64.get(i), (i as u64) & ((1 << bits) - 1));
        }
    }

    #[test]
    fn test_round_trip_all_widths() {
        for bits in 1..=64u32 {
            let n = 131;
            let mask = max_value(bits);
            let mut p64 = Packed64::new(n, bits);
            for i in 0..n {
                p64.set(i, (i as u64).wrapping_mul(0x9E3779B97F4A7C15) & mask);
            }
            for i in 0..n {
                assert_eq!(
                    p64.get(i),
                    (i as u64).wrapping_mul(0x9E3779B97F4A7C15) & mask,
                    "bits={} i={}",
                    bits,
                    i
                );
            }
        }
    }

    #[test]
    fn test_ten_3bit_values_fit_one_word() {
        // 10 3-bit values occupy ceil(30/64) = 1 word
        let values = [5u64, 3, 7, 0, 1, 6, 2, 4, 7, 1];
        let mut p64 = Packed64::new(10, 3);
        assert_eq!(p64.blocks().len(), 1);

        for (i, &v) in values.iter().enumerate() {
            p64.set(i, v);
        }

        let mut buf = [0u64; 10];
        assert_eq!(p64.get_bulk(0, &mut buf), 10);
        assert_eq!(buf, values);
    }

    #[test]
    fn test_bulk_get_matches_scalar() {
        let n = 500;
        let bits = 7;
        let mut p64 = Packed64::new(n, bits);
        for i in 0..n {
            p64.set(i, (i as u64 * 13) & 127);
        }

        for &(from, len) in &[(0usize, 500usize), (3, 200), (63, 65), (499, 1), (100, 0)] {
            let mut buf = vec![0u64; len];
            let got = p64.get_bulk(from, &mut buf);
            assert_eq!(got, len.min(n - from));
            for (o, i) in (from..from + got).enumerate() {
                assert_eq!(buf[o], p64.get(i), "from={} len={}", from, len);
            }
        }
    }

    #[test]
    fn test_bulk_get_clamps() {
        let mut p64 = Packed64::new(10, 4);
        for i in 0..10 {
            p64.set(i, i as u64);
        }
        let mut buf = [99u64; 20];
        assert_eq!(p64.get_bulk(6, &mut buf), 4);
        assert_eq!(&buf[..4], &[6, 7, 8, 9]);
    }

    #[test]
    fn test_bulk_set_matches_scalar() {
        for &bits in &[1u32, 3, 12, 20, 33, 64] {
            let n = 300;
            let mask = max_value(bits);
            let src: Vec<u64> = (0..n as u64).map(|i| (i * 31 + 5) & mask).collect();

            let mut bulk = Packed64::new(n, bits);
            let mut scalar = Packed64::new(n, bits);
            for &(from, len) in &[(0usize, 300usize), (5, 250), (77, 64)] {
                let set = bulk.set_bulk(from, &src[..len.min(n - from)]);
                assert_eq!(set, len.min(n - from));
                for (o, i) in (from..from + set).enumerate() {
                    scalar.set(i, src[o]);
                }
                for i in 0..n {
                    assert_eq!(bulk.get(i), scalar.get(i), "bits={} from={}", bits, from);
                }
            }
        }
    }

    #[test]
    fn test_fill() {
        for &bits in &[3u32, 8, 21, 64] {
            let n = 400;
            let mask = max_value(bits);
            let val = 0x5A5A5A5A5A5A5A5Au64 & mask;
            let mut p64 = Packed64::new(n, bits);
            for i in 0..n {
                p64.set(i, 1 & mask);
            }

            p64.fill(17, 350, val);
            for i in 0..n {
                if (17..350).contains(&i) {
                    assert_eq!(p64.get(i), val, "bits={} i={}", bits, i);
                } else {
                    assert_eq!(p64.get(i), 1 & mask, "bits={} i={}", bits, i);
                }
            }
        }
    }

    #[test]
    fn test_fill_small_span() {
        let mut p64 = Packed64::new(100, 5);
        p64.fill(10, 13, 31);
        for i in 0..100 {
            assert_eq!(p64.get(i), if (10..13).contains(&i) { 31 } else { 0 });
        }
    }

    #[test]
    fn test_fill_whole_array() {
        let mut p64 = Packed64::new(777, 11);
        p64.fill(0, 777, 2047);
        for i in 0..777 {
            assert_eq!(p64.get(i), 2047);
        }
    }

    #[test]
    fn test_clear() {
        let mut p64 = Packed64::new(100, 13);
        p64.fill(0, 100, 8191);
        p64.clear();
        for i in 0..100 {
            assert_eq!(p64.get(i), 0);
        }
    }

    #[test]
    fn test_empty_array() {
        let p64 = Packed64::new(0, 17);
        assert_eq!(p64.len(), 0);
        assert!(p64.is_empty());
        let mut buf = [0u64; 4];
        assert_eq!(p64.get_bulk(0, &mut buf), 0);
    }

    #[test]
    fn test_boundary_widths() {
        let mut p1 = Packed64::new(200, 1);
        for i in 0..200 {
            p1.set(i, (i % 2) as u64);
        }
        for i in 0..200 {
            assert_eq!(p1.get(i), (i % 2) as u64);
        }

        let mut p64 = Packed64::new(10, 64);
        p64.set(0, u64::MAX);
        p64.set(9, 0x0123456789ABCDEF);
        assert_eq!(p64.get(0), u64::MAX);
        assert_eq!(p64.get(9), 0x0123456789ABCDEF);
    }

    #[test]
    fn test_hydration_round_trip() {
        for &bits in &[3u32, 8, 13, 31, 64] {
            let n = 100;
            let mask = max_value(bits);
            let mut original = Packed64::new(n, bits);
            for i in 0..n {
                original.set(i, (i as u64 * 7 + 1) & mask);
            }

            // Serialize: whole words, then the byte tail
            let byte_count = Format::Packed.byte_count(VERSION_CURRENT, n, bits) as usize;
            let mut bytes = Vec::with_capacity(byte_count);
            for word in original.blocks() {
                bytes.extend_from_slice(&word.to_be_bytes());
            }
            bytes.truncate(byte_count);

            let mut input = SliceDataInput::new(&bytes);
            let hydrated = Packed64::from_input(VERSION_CURRENT, &mut input, n, bits).unwrap();
            for i in 0..n {
                assert_eq!(hydrated.get(i), original.get(i), "bits={} i={}", bits, i);
            }
        }
    }

    #[test]
    fn test_hydration_legacy_version_reads_whole_words() {
        let n = 10;
        let bits = 3;
        let mut original = Packed64::new(n, bits);
        for i in 0..n {
            original.set(i, i as u64 & 7);
        }

        // Legacy streams carry the full zero-padded word
        let byte_count = Format::Packed.byte_count(VERSION_START, n, bits);
        assert_eq!(byte_count, 8);
        let mut bytes = Vec::new();
        for word in original.blocks() {
            bytes.extend_from_slice(&word.to_be_bytes());
        }

        let mut input = SliceDataInput::new(&bytes);
        let hydrated = Packed64::from_input(VERSION_START, &mut input, n, bits).unwrap();
        for i in 0..n {
            assert_eq!(hydrated.get(i), original.get(i));
        }
    }

    #[test]
    fn test_hydration_truncated_input() {
        let bytes = [0u8; 3];
        let mut input = SliceDataInput::new(&bytes);
        assert!(Packed64::from_input(VERSION_CURRENT, &mut input, 100, 8).is_err());
    }

    #[test]
    fn test_msb_first_layout() {
        // Value 0 occupies the most-significant bits of word 0
        let mut p64 = Packed64::new(2, 8);
        p64.set(0, 0xAB);
        p64.set(1, 0xCD);
        assert_eq!(p64.blocks()[0] >> 48, 0xABCD);
    }
}
