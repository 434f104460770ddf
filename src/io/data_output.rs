//! Data output abstractions and implementations
//!
//! This module provides traits and implementations for writing structured
//! data to different destinations including byte vectors and writers.
//!
//! Fixed-size integers are written most-significant byte first, matching the
//! packed array wire layout read back by [`crate::io::DataInput`].

use std::io::Write;

use crate::error::Result;
use crate::io::var_int::VarInt;

/// Trait for writing structured data to various destinations
pub trait DataOutput {
    /// Write a single byte
    fn write_u8(&mut self, value: u8) -> Result<()>;

    /// Write a 16-bit unsigned integer, most-significant byte first
    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_u8((value >> 8) as u8)?;
        self.write_u8(value as u8)
    }

    /// Write a 32-bit unsigned integer, most-significant byte first
    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_u16((value >> 16) as u16)?;
        self.write_u16(value as u16)
    }

    /// Write a 64-bit unsigned integer, most-significant byte first
    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write_u32((value >> 32) as u32)?;
        self.write_u32(value as u32)
    }

    /// Write a variable-length encoded integer
    fn write_var_int(&mut self, value: u64) -> Result<()>;

    /// Write bytes from the provided buffer
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Write a length-prefixed string (length as varint, UTF-8 encoded)
    fn write_length_prefixed_string(&mut self, s: &str) -> Result<()> {
        self.write_var_int(s.len() as u64)?;
        self.write_bytes(s.as_bytes())
    }

    /// Flush any buffered data to the underlying destination
    fn flush(&mut self) -> Result<()>;

    /// Get the current position (if supported)
    fn position(&self) -> Option<u64> {
        None
    }
}

impl<D: DataOutput + ?Sized> DataOutput for &mut D {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        (**self).write_u8(value)
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        (**self).write_u16(value)
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        (**self).write_u32(value)
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        (**self).write_u64(value)
    }

    fn write_var_int(&mut self, value: u64) -> Result<()> {
        (**self).write_var_int(value)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_bytes(data)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn position(&self) -> Option<u64> {
        (**self).position()
    }
}

/// DataOutput implementation for Vec<u8>
pub struct VecDataOutput {
    data: Vec<u8>,
}

impl VecDataOutput {
    /// Create a new VecDataOutput
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a new VecDataOutput with the specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of bytes written
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if no bytes have been written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a reference to the underlying data
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Convert into the underlying Vec<u8>
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl Default for VecDataOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl DataOutput for VecDataOutput {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.data.push(value);
        Ok(())
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.data.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    fn write_var_int(&mut self, value: u64) -> Result<()> {
        VarInt::write_to(self, value)?;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.data.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn position(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}

/// DataOutput implementation for std::io::Write types
pub struct WriterDataOutput<W> {
    writer: W,
    position: u64,
}

impl<W: Write> WriterDataOutput<W> {
    /// Create a new WriterDataOutput from a Write type
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
        }
    }

    /// Get the current position
    pub fn pos(&self) -> u64 {
        self.position
    }

    /// Convert back to the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DataOutput for WriterDataOutput<W> {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_all(&[value])?;
        self.position += 1;
        Ok(())
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        self.writer.write_all(&value.to_be_bytes())?;
        self.position += 8;
        Ok(())
    }

    fn write_var_int(&mut self, value: u64) -> Result<()> {
        VarInt::write_to(self, value)?;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn position(&self) -> Option<u64> {
        Some(self.position)
    }
}

/// Create a DataOutput backed by a fresh Vec<u8>
pub fn to_vec() -> VecDataOutput {
    VecDataOutput::new()
}

/// Create a DataOutput backed by a Vec<u8> with the given capacity
pub fn to_vec_with_capacity(capacity: usize) -> VecDataOutput {
    VecDataOutput::with_capacity(capacity)
}

/// Create a DataOutput from a Write type
pub fn to_writer<W: Write>(writer: W) -> WriterDataOutput<W> {
    WriterDataOutput::new(writer)
}
