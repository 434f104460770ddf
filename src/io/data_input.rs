//! Data input abstractions and implementations
//!
//! This module provides traits and implementations for reading structured
//! data from different sources including byte slices, readers, and
//! memory-mapped regions.
//!
//! Fixed-size integers are stored most-significant byte first: the packed
//! array wire layout is big-endian 64-bit words, and hydration reads them
//! back with `read_u64`.

use std::io::Read;

use crate::error::{PackoraError, Result};
use crate::io::var_int::VarInt;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
#[cfg(feature = "mmap")]
use std::fs::File;
#[cfg(feature = "mmap")]
use std::path::Path;

/// Trait for reading structured data from various sources
///
/// Reads are sequential and forward-only; no seeking is required by the
/// packed array engine.
pub trait DataInput {
    /// Read a single byte
    fn read_u8(&mut self) -> Result<u8>;

    /// Read a 16-bit unsigned integer, most-significant byte first
    fn read_u16(&mut self) -> Result<u16> {
        let hi = self.read_u8()? as u16;
        let lo = self.read_u8()? as u16;
        Ok((hi << 8) | lo)
    }

    /// Read a 32-bit unsigned integer, most-significant byte first
    fn read_u32(&mut self) -> Result<u32> {
        let hi = self.read_u16()? as u32;
        let lo = self.read_u16()? as u32;
        Ok((hi << 16) | lo)
    }

    /// Read a 64-bit unsigned integer, most-significant byte first
    fn read_u64(&mut self) -> Result<u64> {
        let hi = self.read_u32()? as u64;
        let lo = self.read_u32()? as u64;
        Ok((hi << 32) | lo)
    }

    /// Read a variable-length encoded integer
    fn read_var_int(&mut self) -> Result<u64>;

    /// Read exact number of bytes into the provided buffer
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Read a vector of bytes with the specified length
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_bytes(&mut buf)?;
        Ok(buf)
    }

    /// Read a string with the specified length (UTF-8 encoded)
    fn read_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_vec(len)?;
        String::from_utf8(bytes)
            .map_err(|e| PackoraError::invalid_data(format!("Invalid UTF-8 string: {}", e)))
    }

    /// Read a length-prefixed string (length as varint, UTF-8 encoded)
    fn read_length_prefixed_string(&mut self) -> Result<String> {
        let len = self.read_var_int()? as usize;
        self.read_string(len)
    }

    /// Skip the specified number of bytes
    fn skip(&mut self, n: usize) -> Result<()>;

    /// Get the current position (if supported)
    fn position(&self) -> Option<u64> {
        None
    }
}

impl<D: DataInput + ?Sized> DataInput for &mut D {
    fn read_u8(&mut self) -> Result<u8> {
        (**self).read_u8()
    }

    fn read_u16(&mut self) -> Result<u16> {
        (**self).read_u16()
    }

    fn read_u32(&mut self) -> Result<u32> {
        (**self).read_u32()
    }

    fn read_u64(&mut self) -> Result<u64> {
        (**self).read_u64()
    }

    fn read_var_int(&mut self) -> Result<u64> {
        (**self).read_var_int()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_bytes(buf)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        (**self).skip(n)
    }

    fn position(&self) -> Option<u64> {
        (**self).position()
    }
}

/// DataInput implementation for byte slices
pub struct SliceDataInput<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceDataInput<'a> {
    /// Create a new SliceDataInput from a byte slice
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Get the number of remaining bytes
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are more bytes to read
    pub fn has_more(&self) -> bool {
        self.position < self.data.len()
    }
}

impl<'a> DataInput for SliceDataInput<'a> {
    fn read_u8(&mut self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(PackoraError::end_of_stream("Unexpected end of data"));
        }
        let value = self.data[self.position];
        self.position += 1;
        Ok(value)
    }

    fn read_u64(&mut self) -> Result<u64> {
        if self.position + 8 > self.data.len() {
            return Err(PackoraError::end_of_stream("Unexpected end of data"));
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.data[self.position..self.position + 8]);
        self.position += 8;
        Ok(u64::from_be_bytes(bytes))
    }

    fn read_var_int(&mut self) -> Result<u64> {
        VarInt::read_from(self)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.position + buf.len() > self.data.len() {
            return Err(PackoraError::end_of_stream("Unexpected end of data"));
        }
        buf.copy_from_slice(&self.data[self.position..self.position + buf.len()]);
        self.position += buf.len();
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if self.position + n > self.data.len() {
            return Err(PackoraError::end_of_stream("Cannot skip past end of data"));
        }
        self.position += n;
        Ok(())
    }

    fn position(&self) -> Option<u64> {
        Some(self.position as u64)
    }
}

/// DataInput implementation for std::io::Read types
pub struct ReaderDataInput<R> {
    reader: R,
    position: u64,
}

impl<R: Read> ReaderDataInput<R> {
    /// Create a new ReaderDataInput from a Read type
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            position: 0,
        }
    }

    /// Get the current position
    pub fn pos(&self) -> u64 {
        self.position
    }

    /// Convert back to the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> DataInput for ReaderDataInput<R> {
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf)?;
        self.position += 1;
        Ok(buf[0])
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.reader.read_exact(&mut buf)?;
        self.position += 8;
        Ok(u64::from_be_bytes(buf))
    }

    fn read_var_int(&mut self) -> Result<u64> {
        VarInt::read_from(self)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader.read_exact(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        let mut remaining = n;
        let mut chunk = [0u8; 256];
        while remaining > 0 {
            let to_read = remaining.min(chunk.len());
            self.reader.read_exact(&mut chunk[..to_read])?;
            remaining -= to_read;
        }
        self.position += n as u64;
        Ok(())
    }

    fn position(&self) -> Option<u64> {
        Some(self.position)
    }
}

/// DataInput implementation for memory-mapped files
#[cfg(feature = "mmap")]
pub struct MmapDataInput {
    mmap: Mmap,
    position: usize,
}

#[cfg(feature = "mmap")]
impl MmapDataInput {
    /// Create a new MmapDataInput from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and kept alive by this struct
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap, position: 0 })
    }

    /// Get the total length of the mapped region
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Check if the mapped region is empty
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }
}

#[cfg(feature = "mmap")]
impl DataInput for MmapDataInput {
    fn read_u8(&mut self) -> Result<u8> {
        if self.position >= self.mmap.len() {
            return Err(PackoraError::end_of_stream("Unexpected end of data"));
        }
        let value = self.mmap[self.position];
        self.position += 1;
        Ok(value)
    }

    fn read_var_int(&mut self) -> Result<u64> {
        VarInt::read_from(self)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.position + buf.len() > self.mmap.len() {
            return Err(PackoraError::end_of_stream("Unexpected end of data"));
        }
        buf.copy_from_slice(&self.mmap[self.position..self.position + buf.len()]);
        self.position += buf.len();
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if self.position + n > self.mmap.len() {
            return Err(PackoraError::end_of_stream("Cannot skip past end of data"));
        }
        self.position += n;
        Ok(())
    }

    fn position(&self) -> Option<u64> {
        Some(self.position as u64)
    }
}

/// Create a DataInput from a byte slice
pub fn from_slice(data: &[u8]) -> SliceDataInput<'_> {
    SliceDataInput::new(data)
}

/// Create a DataInput from a Read type
pub fn from_reader<R: Read>(reader: R) -> ReaderDataInput<R> {
    ReaderDataInput::new(reader)
}

/// Create a DataInput from a file path via memory mapping
#[cfg(feature = "mmap")]
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<MmapDataInput> {
    MmapDataInput::open(path)
}
