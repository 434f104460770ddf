//! Compact fixed-width integer arrays
//!
//! This module stores N integers, each representable in B bits
//! (1 ≤ B ≤ 64, chosen per array instance), packed contiguously into a word
//! buffer, with random-access get/set, bulk get/set, range-fill, and
//! streaming load from a serialized byte source.
//!
//! ## Core types
//!
//! - **[`Format`]** - layout descriptor (bit-spanning vs. block-aligned) with
//!   exact buffer-size equations
//! - **[`BulkOperation`]** - the encode/decode engine, keyed by
//!   `(Format, bits-per-value)`
//! - **[`Packed64`]** - general array; values may straddle word boundaries
//! - **[`Packed64SingleBlock`]** - block-aligned array; values never straddle
//!   a word, at the cost of padding bits
//! - **[`PackedWriter`]** / **[`PackedReaderIterator`]** - bounded-memory
//!   streaming serialization
//!
//! ## Example
//!
//! ```rust
//! use packora::packed::{Packed64, PackedMutable, PackedReader};
//!
//! let mut arr = Packed64::new(10, 3);
//! arr.set(0, 5);
//! arr.set(1, 7);
//! assert_eq!(arr.get(0), 5);
//!
//! let mut buf = [0u64; 10];
//! assert_eq!(arr.get_bulk(0, &mut buf), 10);
//! ```

pub mod bulk;
pub mod format;
pub mod packed64;
pub mod reader;
pub mod single_block;
pub mod writer;

pub use bulk::{BulkOperation, BulkOperationPacked, BulkOperationPackedSingleBlock};
pub use format::{fastest_format_and_bits, Format, FormatAndBits};
pub use packed64::Packed64;
pub use reader::PackedReaderIterator;
pub use single_block::{Packed64SingleBlock, MAX_SUPPORTED_BITS_PER_VALUE, SUPPORTED_BITS_PER_VALUE};
pub use writer::PackedWriter;

use crate::error::{check_range, PackoraError, Result};
use crate::io::{DataInput, DataOutput};

/// Overhead budget that always rounds up to the fastest layout
pub const FASTEST: f32 = 7.0;
/// Overhead budget that trades at most 50% memory for speed
pub const FAST: f32 = 0.5;
/// Default overhead budget (at most 25% memory overhead)
pub const DEFAULT: f32 = 0.25;
/// No memory overhead at all, even if the layout is slower
pub const COMPACT: f32 = 0.0;

/// Default RAM budget for streaming readers and writers, in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Codec name embedded in the serialized header
pub const CODEC_NAME: &str = "PackedInts";

/// Magic number opening every codec header
pub const CODEC_MAGIC: u32 = 0x3FD7_6C17;

/// First supported stream version: byte counts are padded to whole words
pub const VERSION_START: u32 = 0;
/// Version that introduced byte-aligned (unpadded) byte counts
pub const VERSION_BYTE_ALIGNED: u32 = 1;
/// Version that dropped zigzag encoding from monotonic readers
pub const VERSION_MONOTONIC_WITHOUT_ZIGZAG: u32 = 2;
/// Version written by this crate
pub const VERSION_CURRENT: u32 = VERSION_MONOTONIC_WITHOUT_ZIGZAG;

/// Validate a stream version.
pub fn check_version(version: u32) -> Result<()> {
    if (VERSION_START..=VERSION_CURRENT).contains(&version) {
        Ok(())
    } else {
        Err(PackoraError::invalid_argument(format!(
            "Unsupported version: {} (supported: {} to {})",
            version, VERSION_START, VERSION_CURRENT
        )))
    }
}

/// Largest value storable in `bits_per_value` bits.
#[inline]
pub fn max_value(bits_per_value: u32) -> u64 {
    debug_assert!(bits_per_value >= 1 && bits_per_value <= 64);
    if bits_per_value == 64 {
        u64::MAX
    } else {
        (1u64 << bits_per_value) - 1
    }
}

/// Number of bits needed to store `value`, at least 1.
#[inline]
pub fn unsigned_bits_required(value: u64) -> u32 {
    (64 - value.leading_zeros()).max(1)
}

/// Number of bits needed to store any value up to `max_value`, at least 1.
#[inline]
pub fn bits_required(max_value: u64) -> u32 {
    unsigned_bits_required(max_value)
}

/// Read-only view of a packed integer array.
pub trait PackedReader {
    /// Get the value at `index`.
    ///
    /// Single-index access assumes a pre-validated index; out-of-range
    /// indices are caller error.
    fn get(&self, index: usize) -> u64;

    /// Number of values in the array
    fn len(&self) -> usize;

    /// Whether the array holds no values
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read at most `dst.len()` values starting at `index` into `dst`,
    /// clamping to the end of the array. Returns the number of values read.
    fn get_bulk(&self, index: usize, dst: &mut [u64]) -> usize {
        let len = dst.len().min(self.len().saturating_sub(index));
        for (o, i) in (index..index + len).enumerate() {
            dst[o] = self.get(i);
        }
        len
    }
}

/// Mutable packed integer array.
pub trait PackedMutable: PackedReader {
    /// Fixed number of bits used to store each value
    fn bits_per_value(&self) -> u32;

    /// Set the value at `index`.
    ///
    /// `value` must fit in `bits_per_value` bits; single-index access assumes
    /// a pre-validated index.
    fn set(&mut self, index: usize, value: u64);

    /// Write at most `src.len()` values starting at `index`, clamping to the
    /// end of the array. Returns the number of values written.
    fn set_bulk(&mut self, index: usize, src: &[u64]) -> usize {
        let len = src.len().min(self.len().saturating_sub(index));
        for (o, i) in (index..index + len).enumerate() {
            self.set(i, src[o]);
        }
        len
    }

    /// Set every index in `[from, to)` to `value`.
    fn fill(&mut self, from: usize, to: usize, value: u64) {
        for i in from..to {
            self.set(i, value);
        }
    }

    /// Reset every value to 0.
    fn clear(&mut self) {
        self.fill(0, self.len(), 0);
    }

    /// The storage format of this array
    fn format(&self) -> Format {
        Format::Packed
    }

    /// Serialize the array: codec header, metadata, then the packed payload.
    fn save(&self, out: &mut dyn DataOutput) -> Result<()> {
        let mut writer = PackedWriter::new(
            out,
            self.format(),
            self.len(),
            self.bits_per_value(),
            DEFAULT_BUFFER_SIZE,
        )?;
        writer.write_header()?;
        for i in 0..self.len() {
            writer.add(self.get(i))?;
        }
        writer.finish()
    }
}

/// Write a codec header: magic, codec name, version.
pub fn write_codec_header<O: DataOutput + ?Sized>(
    out: &mut O,
    codec: &str,
    version: u32,
) -> Result<()> {
    out.write_u32(CODEC_MAGIC)?;
    out.write_length_prefixed_string(codec)?;
    out.write_u32(version)
}

/// Validate a codec header and return the stream version.
pub fn check_codec_header<I: DataInput + ?Sized>(
    input: &mut I,
    codec: &str,
    min_version: u32,
    max_version: u32,
) -> Result<u32> {
    let magic = input.read_u32()?;
    if magic != CODEC_MAGIC {
        return Err(PackoraError::invalid_data(format!(
            "Codec header mismatch: expected magic {:#x}, got {:#x}",
            CODEC_MAGIC, magic
        )));
    }
    let name = input.read_length_prefixed_string()?;
    if name != codec {
        return Err(PackoraError::invalid_data(format!(
            "Codec header mismatch: expected codec '{}', got '{}'",
            codec, name
        )));
    }
    let version = input.read_u32()?;
    if version < min_version || version > max_version {
        return Err(PackoraError::invalid_data(format!(
            "Unsupported version: {} (expected {} to {})",
            version, min_version, max_version
        )));
    }
    Ok(version)
}

/// Get the decode half of the codec for the given format and width.
pub fn get_decoder(format: Format, version: u32, bits_per_value: u32) -> Result<BulkOperation> {
    check_version(version)?;
    BulkOperation::of(format, bits_per_value)
}

/// Get the encode half of the codec for the given format and width.
pub fn get_encoder(format: Format, version: u32, bits_per_value: u32) -> Result<BulkOperation> {
    check_version(version)?;
    BulkOperation::of(format, bits_per_value)
}

/// Create an empty mutable array in the given format.
pub fn get_mutable_with_format(
    value_count: usize,
    bits_per_value: u32,
    format: Format,
) -> Result<Box<dyn PackedMutable>> {
    match format {
        Format::Packed => {
            if !format.is_supported(bits_per_value) {
                return Err(PackoraError::invalid_argument(format!(
                    "bits_per_value must be in [1, 64], got {}",
                    bits_per_value
                )));
            }
            Ok(Box::new(Packed64::new(value_count, bits_per_value)))
        }
        Format::PackedSingleBlock => Ok(Box::new(Packed64SingleBlock::create(
            value_count,
            bits_per_value,
        )?)),
    }
}

/// Create an empty mutable array, trading memory for speed within the given
/// acceptable overhead ratio (see [`FASTEST`], [`FAST`], [`DEFAULT`],
/// [`COMPACT`]).
pub fn get_mutable(
    value_count: usize,
    bits_per_value: u32,
    acceptable_overhead_ratio: f32,
) -> Result<Box<dyn PackedMutable>> {
    let picked = fastest_format_and_bits(bits_per_value, acceptable_overhead_ratio);
    get_mutable_with_format(value_count, picked.bits_per_value, picked.format)
}

/// Hydrate an array whose header has already been consumed.
pub fn get_reader_no_header<I: DataInput>(
    input: &mut I,
    format: Format,
    version: u32,
    value_count: usize,
    bits_per_value: u32,
) -> Result<Box<dyn PackedMutable>> {
    check_version(version)?;
    match format {
        Format::Packed => Ok(Box::new(Packed64::from_input(
            version,
            input,
            value_count,
            bits_per_value,
        )?)),
        Format::PackedSingleBlock => Ok(Box::new(Packed64SingleBlock::from_input(
            input,
            value_count,
            bits_per_value,
        )?)),
    }
}

/// Read a codec header and hydrate the array it describes.
pub fn get_reader<I: DataInput>(input: &mut I) -> Result<Box<dyn PackedMutable>> {
    let version = check_codec_header(input, CODEC_NAME, VERSION_START, VERSION_CURRENT)?;
    let bits_per_value = input.read_var_int()? as u32;
    if !(1..=64).contains(&bits_per_value) {
        return Err(PackoraError::invalid_data(format!(
            "Corrupted stream: bits_per_value must be in [1, 64], got {}",
            bits_per_value
        )));
    }
    let value_count = input.read_var_int()? as usize;
    let format = Format::by_id(input.read_var_int()? as u32)?;
    log::debug!(
        "Reading packed array: format={:?} version={} value_count={} bits_per_value={}",
        format,
        version,
        value_count,
        bits_per_value
    );
    get_reader_no_header(input, format, version, value_count, bits_per_value)
}

/// Create a streaming writer without emitting a header.
pub fn get_writer_no_header<O: DataOutput>(
    out: O,
    format: Format,
    value_count: usize,
    bits_per_value: u32,
    ram_budget: usize,
) -> Result<PackedWriter<O>> {
    PackedWriter::new(out, format, value_count, bits_per_value, ram_budget)
}

/// Create a streaming reader without consuming a header.
pub fn get_reader_iterator_no_header<I: DataInput>(
    input: I,
    format: Format,
    version: u32,
    value_count: usize,
    bits_per_value: u32,
    ram_budget: usize,
) -> Result<PackedReaderIterator<I>> {
    PackedReaderIterator::new(input, format, version, value_count, bits_per_value, ram_budget)
}

/// Read a codec header and create a streaming reader for the stream it
/// describes.
pub fn get_reader_iterator<I: DataInput>(
    mut input: I,
    ram_budget: usize,
) -> Result<PackedReaderIterator<I>> {
    let version = check_codec_header(&mut input, CODEC_NAME, VERSION_START, VERSION_CURRENT)?;
    let bits_per_value = input.read_var_int()? as u32;
    if !(1..=64).contains(&bits_per_value) {
        return Err(PackoraError::invalid_data(format!(
            "Corrupted stream: bits_per_value must be in [1, 64], got {}",
            bits_per_value
        )));
    }
    let value_count = input.read_var_int()? as usize;
    let format = Format::by_id(input.read_var_int()? as u32)?;
    PackedReaderIterator::new(input, format, version, value_count, bits_per_value, ram_budget)
}

/// Copy `len` values from `src` starting at `src_pos` into `dst` starting at
/// `dst_pos`, buffering at most `mem` bytes.
pub fn copy(
    src: &dyn PackedReader,
    src_pos: usize,
    dst: &mut dyn PackedMutable,
    dst_pos: usize,
    len: usize,
    mem: usize,
) -> Result<()> {
    check_range(src_pos, src_pos + len, src.len())?;
    check_range(dst_pos, dst_pos + len, dst.len())?;

    let capacity = mem >> 3;
    if capacity == 0 {
        for i in 0..len {
            dst.set(dst_pos + i, src.get(src_pos + i));
        }
        return Ok(());
    }

    let buf_size = capacity.min(len);
    let mut buf = vec![0u64; buf_size];
    let mut copied = 0;
    while copied < len {
        let chunk = (len - copied).min(buf_size);
        let read = src.get_bulk(src_pos + copied, &mut buf[..chunk]);
        debug_assert_eq!(read, chunk);
        let written = dst.set_bulk(dst_pos + copied, &buf[..chunk]);
        debug_assert_eq!(written, chunk);
        copied += chunk;
    }
    Ok(())
}
