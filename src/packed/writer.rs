//! Streaming encoder for packed integer arrays
//!
//! [`PackedWriter`] buffers values and flushes them through the bulk codec in
//! whole iterations, so arbitrarily large arrays can be serialized with a
//! bounded amount of memory.

use crate::error::{PackoraError, Result};
use crate::io::DataOutput;
use crate::packed::bulk::BulkOperation;
use crate::packed::format::Format;
use crate::packed::{unsigned_bits_required, write_codec_header, CODEC_NAME, VERSION_CURRENT};

/// Streaming writer producing the packed wire layout on a [`DataOutput`].
pub struct PackedWriter<O: DataOutput> {
    out: O,
    format: Format,
    value_count: usize,
    bits_per_value: u32,
    encoder: BulkOperation,
    iterations: usize,
    next_values: Vec<u64>,
    next_blocks: Vec<u8>,
    off: usize,
    written: usize,
    finished: bool,
}

impl<O: DataOutput> PackedWriter<O> {
    /// Create a writer for `value_count` values of `bits_per_value` bits,
    /// buffering at most `ram_budget` bytes between flushes.
    pub fn new(
        out: O,
        format: Format,
        value_count: usize,
        bits_per_value: u32,
        ram_budget: usize,
    ) -> Result<Self> {
        let encoder = BulkOperation::of(format, bits_per_value)?;
        let iterations = encoder.compute_iterations(value_count, ram_budget);
        Ok(Self {
            out,
            format,
            value_count,
            bits_per_value,
            encoder,
            iterations,
            next_values: vec![0u64; iterations * encoder.byte_value_count()],
            next_blocks: vec![0u8; iterations * encoder.byte_block_count()],
            off: 0,
            written: 0,
            finished: false,
        })
    }

    /// The format this writer produces
    pub fn format(&self) -> Format {
        self.format
    }

    /// Bits per value being written
    pub fn bits_per_value(&self) -> u32 {
        self.bits_per_value
    }

    /// Number of values added so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Write the codec header followed by the array metadata.
    pub fn write_header(&mut self) -> Result<()> {
        write_codec_header(&mut self.out, CODEC_NAME, VERSION_CURRENT)?;
        self.out.write_var_int(self.bits_per_value as u64)?;
        self.out.write_var_int(self.value_count as u64)?;
        self.out.write_var_int(self.format.id() as u64)?;
        Ok(())
    }

    /// Append one value.
    ///
    /// Fails when more than `value_count` values are added.
    pub fn add(&mut self, value: u64) -> Result<()> {
        debug_assert!(unsigned_bits_required(value) <= self.bits_per_value);
        debug_assert!(!self.finished);
        if self.written >= self.value_count {
            return Err(PackoraError::end_of_stream("Writing past end of stream"));
        }

        self.next_values[self.off] = value;
        self.off += 1;
        if self.off == self.next_values.len() {
            self.flush()?;
        }
        self.written += 1;
        Ok(())
    }

    /// Zero-pad to `value_count`, flush buffered values and finish the
    /// stream.
    pub fn finish(&mut self) -> Result<()> {
        debug_assert!(!self.finished);
        while self.written < self.value_count {
            self.add(0)?;
        }
        self.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Recover the underlying output.
    pub fn into_inner(self) -> O {
        self.out
    }

    fn flush(&mut self) -> Result<()> {
        self.encoder
            .encode_bytes(&self.next_values, &mut self.next_blocks, self.iterations);
        let block_count =
            self.format
                .byte_count(VERSION_CURRENT, self.off, self.bits_per_value) as usize;
        self.out.write_bytes(&self.next_blocks[..block_count])?;
        self.next_values.fill(0);
        self.off = 0;
        Ok(())
    }
}
