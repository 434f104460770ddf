//! I/O operations and streaming
//!
//! This module provides the byte-oriented sequential input and output
//! abstractions used to hydrate and serialize packed integer arrays:
//! forward-only reads of fixed-size big-endian integers, varints, and raw
//! byte runs.

pub mod data_input;
pub mod data_output;
pub mod var_int;

// Re-export core types
pub use data_input::{DataInput, ReaderDataInput, SliceDataInput};
pub use data_output::{DataOutput, VecDataOutput, WriterDataOutput};
pub use var_int::VarInt;

#[cfg(feature = "mmap")]
pub use data_input::MmapDataInput;

// Convenience functions
pub use data_input::{from_reader, from_slice};
pub use data_output::{to_vec, to_vec_with_capacity, to_writer};

#[cfg(feature = "mmap")]
pub use data_input::from_file;
