//! Block-aligned packed array
//!
//! [`Packed64SingleBlock`] trades padding bits for the guarantee that no
//! value ever spans two words: every value lives entirely inside word
//! `index / values_per_block` at bit offset `(index % values_per_block) *
//! bits`, counting from the least-significant bit. Only widths that divide a
//! word into a useful number of slots are supported.

use crate::error::{PackoraError, Result};
use crate::io::DataInput;
use crate::packed::bulk::BulkOperationPackedSingleBlock;
use crate::packed::format::Format;
use crate::packed::{max_value, unsigned_bits_required, PackedMutable, PackedReader, VERSION_CURRENT};

/// Widths the block-aligned layout supports.
pub const SUPPORTED_BITS_PER_VALUE: [u32; 14] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 16, 21, 32];

/// Largest supported width.
pub const MAX_SUPPORTED_BITS_PER_VALUE: u32 = 32;

/// Mutable packed array where every value lies entirely within one 64-bit
/// word.
#[derive(Clone)]
pub struct Packed64SingleBlock {
    value_count: usize,
    bits_per_value: u32,
    values_per_block: usize,
    blocks: Vec<u64>,
    mask: u64,
}

impl Packed64SingleBlock {
    /// Whether the block-aligned layout supports the given width.
    pub fn is_supported(bits_per_value: u32) -> bool {
        SUPPORTED_BITS_PER_VALUE.binary_search(&bits_per_value).is_ok()
    }

    /// Create a zero-filled array.
    ///
    /// Fails with an invalid-argument condition for unsupported widths.
    pub fn create(value_count: usize, bits_per_value: u32) -> Result<Self> {
        if !Self::is_supported(bits_per_value) {
            return Err(PackoraError::invalid_argument(format!(
                "Unsupported number of bits per value: {}",
                bits_per_value
            )));
        }

        let values_per_block = (64 / bits_per_value) as usize;
        let blocks_size =
            Format::PackedSingleBlock.word_count(VERSION_CURRENT, value_count, bits_per_value);
        Ok(Self {
            value_count,
            bits_per_value,
            values_per_block,
            blocks: vec![0u64; blocks_size],
            mask: max_value(bits_per_value),
        })
    }

    /// Hydrate an array from its serialized form.
    ///
    /// The block-aligned layout never has a fractional trailing word, so this
    /// reads exactly `word_count` big-endian words.
    pub fn from_input<I: DataInput>(
        input: &mut I,
        value_count: usize,
        bits_per_value: u32,
    ) -> Result<Self> {
        let mut array = Self::create(value_count, bits_per_value)?;
        for i in 0..array.blocks.len() {
            array.blocks[i] = input.read_u64()?;
        }
        Ok(array)
    }

    /// Number of values stored per 64-bit word
    pub fn values_per_block(&self) -> usize {
        self.values_per_block
    }

    /// Direct access to the backing words (for tests and serialization)
    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }
}

impl PackedReader for Packed64SingleBlock {
    fn get(&self, index: usize) -> u64 {
        debug_assert!(index < self.value_count);
        let o = index / self.values_per_block;
        let b = index % self.values_per_block;
        let shift = b as u32 * self.bits_per_value;
        (self.blocks[o] >> shift) & self.mask
    }

    fn len(&self) -> usize {
        self.value_count
    }

    fn get_bulk(&self, index: usize, dst: &mut [u64]) -> usize {
        let mut len = dst.len().min(self.value_count.saturating_sub(index));
        if len == 0 {
            return 0;
        }

        let values_per_block = self.values_per_block;
        let mut index = index;
        let mut off = 0;

        // Walk to the next block boundary
        let offset_in_block = index % values_per_block;
        if offset_in_block != 0 {
            let mut i = offset_in_block;
            while i < values_per_block && len > 0 {
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
        debug_assert_eq!(index % values_per_block, 0);
        let decoder = BulkOperationPackedSingleBlock::new(self.bits_per_value);
        let block_index = index / values_per_block;
        let nblocks = (index + len) / values_per_block - block_index;
        decoder.decode(&self.blocks[block_index..], &mut dst[off..], nblocks);
        let got = nblocks * values_per_block;
        index += got;
        len -= got;
        off += got;

        // Tail inside the last partial block
        for i in 0..len {
            dst[off + i] = self.get(index + i);
        }
        off + len
    }
}

impl PackedMutable for Packed64SingleBlock {
    fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    fn set(&mut self, index: usize, value: u64) {
        debug_assert!(index < self.value_count);
        debug_assert_eq!(value & !self.mask, 0);
        let o = index / self.values_per_block;
        let b = index % self.values_per_block;
        let shift = b as u32 * self.bits_per_value;
        self.blocks[o] = (self.blocks[o] & !(self.mask << shift)) | (value << shift);
    }

    fn set_bulk(&mut self, index: usize, src: &[u64]) -> usize {
        let mut len = src.len().min(self.value_count.saturating_sub(index));
        if len == 0 {
            return 0;
        }

        let values_per_block = self.values_per_block;
        let mut index = index;
        let mut off = 0;

        // Walk to the next block boundary
        let offset_in_block = index % values_per_block;
        if offset_in_block != 0 {
            let mut i = offset_in_block;
            while i < values_per_block && len > 0 {
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
        debug_assert_eq!(index % values_per_block, 0);
        let encoder = BulkOperationPackedSingleBlock::new(self.bits_per_value);
        let block_index = index / values_per_block;
        let nblocks = (index + len) / values_per_block - block_index;
        encoder.encode(&src[off..], &mut self.blocks[block_index..], nblocks);
        let set = nblocks * values_per_block;
        index += set;
        len -= set;
        off += set;

        // Tail inside the last partial block
        for i in 0..len {
            self.set(index + i, src[off + i]);
        }
        off + len
    }

    fn fill(&mut self, from: usize, to: usize, value: u64) {
        debug_assert!(unsigned_bits_required(value) <= self.bits_per_value);
        debug_assert!(from <= to && to <= self.value_count);

        let values_per_block = self.values_per_block;
        if to - from <= values_per_block << 1 {
            // Too short for the block approach to pay off
            for i in from..to {
                self.set(i, value);
            }
            return;
        }

        // Fill the head naively until the next block start
        let mut from = from;
        let from_offset_in_block = from % values_per_block;
        if from_offset_in_block != 0 {
            for _ in from_offset_in_block..values_per_block {
                self.set(from, value);
                from += 1;
            }
            debug_assert_eq!(from % values_per_block, 0);
        }

        // Bulk set of the inner blocks: one word pattern, replicated
        let from_block = from / values_per_block;
        let to_block = to / values_per_block;
        debug_assert_eq!(from_block * values_per_block, from);

        let mut block_value = 0u64;
        for i in 0..values_per_block {
            block_value |= value << (i as u32 * self.bits_per_value);
        }
        self.blocks[from_block..to_block].fill(block_value);

        // Fill the gap
        for i in values_per_block * to_block..to {
            self.set(i, value);
        }
    }

    fn clear(&mut self) {
        self.blocks.fill(0);
    }

    fn format(&self) -> Format {
        Format::PackedSingleBlock
    }
}

impl std::fmt::Debug for Packed64SingleBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packed64SingleBlock")
            .field("value_count", &self.value_count)
            .field("bits_per_value", &self.bits_per_value)
            .field("values_per_block", &self.values_per_block)
            .finish()
    }
}
