//! Uncompressed TGA header handling.
//!
//! Only what the engine's TGA primitives need: an 18-byte little-endian
//! header, an optional id field, and an optional (skipped) color map.

use alloc::vec::Vec;

use crate::error::{TranscodeError, Unsupported};

pub const HEADER_SIZE: usize = 18;

/// Image type 2: uncompressed true-color.
const TYPE_TRUE_COLOR: u8 = 2;
/// Descriptor bit 5: rows stored top to bottom.
const DESC_TOP_LEFT: u8 = 0x20;

/// Parsed TGA header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargaHeader {
    pub image_type: u8,
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u8,
    pub descriptor: u8,
    /// Offset of the first pixel byte (header, id field and palette skipped).
    pub data_offset: usize,
}

impl TargaHeader {
    pub fn parse(data: &[u8]) -> Result<Self, TranscodeError> {
        let header: &[u8; HEADER_SIZE] = data
            .get(..HEADER_SIZE)
            .and_then(|h| h.try_into().ok())
            .ok_or(TranscodeError::InvalidInput("truncated TGA header"))?;
        let le16 = |i: usize| u16::from_le_bytes([header[i], header[i + 1]]);

        let id_len = header[0] as usize;
        let image_type = header[2];
        let cmap_len = le16(5) as usize;
        let cmap_entry_size = header[7] as usize;
        let palette_size = cmap_len * (cmap_entry_size / 8);

        Ok(Self {
            image_type,
            width: le16(12),
            height: le16(14),
            bits_per_pixel: header[16],
            descriptor: header[17],
            data_offset: HEADER_SIZE + id_len + palette_size,
        })
    }

    /// Rows are stored bottom-up unless the descriptor says otherwise.
    pub fn bottom_up(&self) -> bool {
        self.descriptor & DESC_TOP_LEFT == 0
    }

    /// Channel count of a 24- or 32-bit uncompressed image.
    ///
    /// RLE types (above 8) and other depths are rejected.
    pub fn channels(&self) -> Result<u32, TranscodeError> {
        if self.image_type > 8 {
            return Err(Unsupported::TargaType(self.image_type).into());
        }
        match self.bits_per_pixel {
            24 => Ok(3),
            32 => Ok(4),
            other => Err(Unsupported::BitDepth(u32::from(other)).into()),
        }
    }

    /// Pixel bytes following the header, checked for length.
    pub fn pixels<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], TranscodeError> {
        let channels = self.channels()? as usize;
        let needed = self.width as usize * self.height as usize * channels;
        let end = self.data_offset + needed;
        data.get(self.data_offset..end)
            .ok_or(TranscodeError::BufferTooSmall {
                needed: end,
                actual: data.len(),
            })
    }
}

/// Write an uncompressed true-color header.
pub fn write_header(out: &mut Vec<u8>, bits_per_pixel: u8, width: u16, height: u16, top_left: bool) {
    out.extend_from_slice(&[0, 0, TYPE_TRUE_COLOR]);
    // color map index, length, entry size; x/y origin
    out.extend_from_slice(&[0; 9]);
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.push(bits_per_pixel);
    let mut descriptor = 8;
    if top_left {
        descriptor |= DESC_TOP_LEFT;
    }
    out.push(descriptor);
}
