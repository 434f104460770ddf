//! # Packora: Compact Fixed-Width Integer Arrays
//!
//! This crate provides the bit-packed integer array engine underlying a
//! search-index storage layer: N integers, each representable in B bits
//! (1 ≤ B ≤ 64, chosen per array), packed contiguously into a word buffer
//! with random-access get/set, bulk get/set, range-fill, and streaming load
//! from a serialized byte source.
//!
//! ## Key Features
//!
//! - **Two layouts**: dense bit-spanning storage ([`Packed64`]) and
//!   block-aligned storage with branch-free per-value access
//!   ([`Packed64SingleBlock`])
//! - **Bulk codec**: iteration-based encode/decode at word and byte
//!   granularity with no fractional-bit carry across iterations
//! - **Streaming serialization**: bounded-memory [`PackedWriter`] and
//!   [`PackedReaderIterator`] over pluggable byte sources
//! - **Layout selection**: [`packed::fastest_format_and_bits`] trades memory
//!   for access speed within a caller-supplied overhead budget
//!
//! ## Quick Start
//!
//! ```rust
//! use packora::{Packed64, PackedMutable, PackedReader};
//!
//! // 1000 values of 9 bits each, packed into 141 words
//! let mut arr = Packed64::new(1000, 9);
//! arr.set(0, 511);
//! arr.set(999, 137);
//! assert_eq!(arr.get(0), 511);
//!
//! // Bulk access through the codec
//! let mut buf = vec![0u64; 1000];
//! assert_eq!(arr.get_bulk(0, &mut buf), 1000);
//!
//! // Serialize and hydrate
//! let mut out = packora::io::to_vec();
//! arr.save(&mut out).unwrap();
//! let bytes = out.into_vec();
//! let mut input = packora::io::from_slice(&bytes);
//! let hydrated = packora::packed::get_reader(&mut input).unwrap();
//! assert_eq!(hydrated.get(999), 137);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod error;
pub mod io;
pub mod packed;

// Re-export core types
pub use error::{PackoraError, Result};
pub use io::{DataInput, DataOutput, SliceDataInput, VecDataOutput};
pub use packed::{
    BulkOperation, Format, FormatAndBits, Packed64, Packed64SingleBlock, PackedMutable,
    PackedReader, PackedReaderIterator, PackedWriter,
};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently no-op, for future use)
pub fn init() {
    log::debug!("Initializing packora v{}", VERSION);
}
