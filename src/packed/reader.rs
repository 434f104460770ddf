//! Streaming decoder for packed integer arrays
//!
//! [`PackedReaderIterator`] reads the packed wire layout from a
//! [`DataInput`] and decodes it in bounded-memory chunks, without ever
//! materializing the whole array.

use crate::error::{PackoraError, Result};
use crate::io::DataInput;
use crate::packed::bulk::BulkOperation;
use crate::packed::format::Format;
use crate::packed::check_version;

/// Streaming reader over the packed wire layout.
///
/// The buffer sizes derive from [`BulkOperation::compute_iterations`], so the
/// value buffer plus the byte-block buffer stay within the requested RAM
/// budget (but always cover at least one codec iteration).
pub struct PackedReaderIterator<I: DataInput> {
    input: I,
    format: Format,
    version: u32,
    value_count: usize,
    bits_per_value: u32,
    decoder: BulkOperation,
    iterations: usize,
    next_blocks: Vec<u8>,
    next_values: Vec<u64>,
    off: usize,
    position: usize,
}

impl<I: DataInput> PackedReaderIterator<I> {
    /// Create a streaming reader for `value_count` values of
    /// `bits_per_value` bits written in `format` at stream `version`.
    pub fn new(
        input: I,
        format: Format,
        version: u32,
        value_count: usize,
        bits_per_value: u32,
        ram_budget: usize,
    ) -> Result<Self> {
        check_version(version)?;
        let decoder = BulkOperation::of(format, bits_per_value)?;
        let iterations = decoder.compute_iterations(value_count, ram_budget);
        debug_assert!(iterations > 0);
        let capacity = iterations * decoder.byte_value_count();
        Ok(Self {
            input,
            format,
            version,
            value_count,
            bits_per_value,
            decoder,
            iterations,
            next_blocks: vec![0u8; iterations * decoder.byte_block_count()],
            next_values: vec![0u64; capacity],
            off: capacity,
            position: 0,
        })
    }

    /// Bits per value being read
    pub fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    /// Total number of values in the stream
    pub fn len(&self) -> usize {
        self.value_count
    }

    /// Whether the stream holds no values
    pub fn is_empty(&self) -> bool {
        self.value_count == 0
    }

    /// Number of values already returned
    pub fn values_read(&self) -> usize {
        self.position
    }

    /// Recover the underlying input.
    pub fn into_inner(self) -> I {
        self.input
    }

    /// Decode and return the next value.
    pub fn next(&mut self) -> Result<u64> {
        let chunk = self.next_chunk(1)?;
        Ok(chunk[0])
    }

    /// Decode and return up to `count` values.
    ///
    /// The returned slice is never empty and never longer than `count`;
    /// reading past the end of the stream is an error.
    pub fn next_chunk(&mut self, count: usize) -> Result<&[u64]> {
        debug_assert!(count > 0);
        if self.position >= self.value_count {
            return Err(PackoraError::end_of_stream("Reading past end of stream"));
        }
        let remaining = self.value_count - self.position;
        let count = count.min(remaining);

        if self.off == self.next_values.len() {
            // Refill: read as many serialized bytes as are left, zero-pad the
            // final partial block buffer, and decode at byte granularity
            let remaining_bytes =
                self.format
                    .byte_count(self.version, remaining, self.bits_per_value);
            let to_read = (remaining_bytes as usize).min(self.next_blocks.len());
            self.input.read_bytes(&mut self.next_blocks[..to_read])?;
            self.next_blocks[to_read..].fill(0);
            self.decoder
                .decode_bytes(&self.next_blocks, &mut self.next_values, self.iterations);
            self.off = 0;
        }

        let len = (self.next_values.len() - self.off).min(count);
        let start = self.off;
        self.off += len;
        self.position += len;
        Ok(&self.next_values[start..start + len])
    }
}
