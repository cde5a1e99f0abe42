use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use crate::engine::{CodingEngine, EngineStatus, ScopedBuffer};
use crate::error::{TranscodeError, Unsupported};
use crate::limits::{self, Limits};
use crate::pixel::PixelLayout;
use crate::planar::PlanarImage;
use crate::raster::RasterBuffer;

/// What a [`RawImage`] holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawKind {
    /// Tightly packed pixels, see [`DecodeRequest::to_raw_bitmap`].
    Bitmap,
    /// A complete TGA file, header included.
    Targa,
}

/// Owned output of the raw conversions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawImage {
    data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub kind: RawKind,
}

impl RawImage {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Builder for turning decompressed engine images back into rasters.
///
/// Alpha is exported by default.
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    include_alpha: bool,
    limits: Option<&'a Limits>,
}

impl Default for DecodeRequest<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DecodeRequest<'a> {
    pub fn new() -> Self {
        Self {
            include_alpha: true,
            limits: None,
        }
    }

    /// When false, 4-channel output carries opaque alpha (255).
    pub fn include_alpha(mut self, include: bool) -> Self {
        self.include_alpha = include;
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Convert to a display raster.
    ///
    /// | channels | layout  | bytes per pixel          |
    /// |----------|---------|--------------------------|
    /// | 1        | `Gray8` | gray                     |
    /// | 3        | `Rgbx8` | R, G, B, untouched pad   |
    /// | 4        | `Bgra8` | B, G, R, A (or 255)      |
    ///
    /// Three-channel pixels keep component order while four-channel pixels
    /// are reversed; both match what the respective display formats expect.
    pub fn to_bitmap<E: CodingEngine + ?Sized>(
        &self,
        engine: &E,
        image: &PlanarImage,
        stop: impl Stop,
    ) -> Result<RasterBuffer, TranscodeError> {
        self.transcode(engine, image, display_layout, &stop)
    }

    /// Convert to tightly packed raw pixels: gray, `B,G,R` or `B,G,R,A`.
    pub fn to_raw_bitmap<E: CodingEngine + ?Sized>(
        &self,
        engine: &E,
        image: &PlanarImage,
        stop: impl Stop,
    ) -> Result<RawImage, TranscodeError> {
        let raster = self.transcode(engine, image, raw_layout, &stop)?;
        Ok(RawImage {
            width: raster.width(),
            height: raster.height(),
            channels: raster.channel_count(),
            kind: RawKind::Bitmap,
            data: raster.into_data(),
        })
    }

    /// Let the engine render a TGA file and take an owned copy of it.
    pub fn to_targa<E: CodingEngine + ?Sized>(
        &self,
        engine: &E,
        image: &PlanarImage,
        stop: impl Stop,
    ) -> Result<RawImage, TranscodeError> {
        let out = engine.convert_to_targa_buffer(image);
        let tga = ScopedBuffer::new(engine, out.buffer);
        if out.status != EngineStatus::Ok {
            tracing::debug!("engine TGA conversion failed");
            return Err(TranscodeError::EngineConvertFailed);
        }
        let bytes = tga
            .bytes()
            .get(..out.size)
            .ok_or(TranscodeError::BufferTooSmall {
                needed: out.size,
                actual: tga.bytes().len(),
            })?;
        limits::enforce(self.limits, out.width, out.height, out.size)?;
        stop.check()?;
        tracing::trace!(width = out.width, height = out.height, size = out.size, "TGA copied");
        Ok(RawImage {
            data: bytes.to_vec(),
            width: out.width,
            height: out.height,
            channels: out.channels,
            kind: RawKind::Targa,
        })
    }

    fn transcode<E: CodingEngine + ?Sized>(
        &self,
        engine: &E,
        image: &PlanarImage,
        target: fn(u32) -> Option<PixelLayout>,
        stop: &dyn Stop,
    ) -> Result<RasterBuffer, TranscodeError> {
        let out = engine.convert_to_interleaved_buffer(image);
        let planes = ScopedBuffer::new(engine, out.buffer);
        if out.status != EngineStatus::Ok {
            tracing::debug!("engine bitmap conversion failed");
            return Err(TranscodeError::EngineConvertFailed);
        }
        if out.bit_depth != 8 {
            return Err(Unsupported::BitDepth(out.bit_depth).into());
        }
        let layout = target(out.channels).ok_or(Unsupported::ChannelCount(out.channels))?;

        let (width, height) = (out.width, out.height);
        if width == 0 || height == 0 {
            return Err(TranscodeError::EngineConvertFailed);
        }
        let too_large = || TranscodeError::DimensionsTooLarge { width, height };
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(too_large)?;
        let needed = pixels
            .checked_mul(out.channels as usize)
            .ok_or_else(too_large)?;
        let src = planes.bytes();
        if src.len() < needed {
            return Err(TranscodeError::BufferTooSmall {
                needed,
                actual: src.len(),
            });
        }
        if src.len() != needed {
            // planes of unequal size cannot be split by width * height
            tracing::debug!(needed, actual = src.len(), "engine plane buffer size mismatch");
            return Err(TranscodeError::EngineConvertFailed);
        }
        let dst_len = pixels
            .checked_mul(layout.bytes_per_pixel())
            .ok_or_else(too_large)?;
        limits::enforce(self.limits, width, height, dst_len)?;
        stop.check()?;

        let mut dst = vec![0u8; dst_len];
        write_pixels(&mut dst, src, width as usize, pixels, layout, self.include_alpha, stop)?;
        tracing::trace!(width, height, ?layout, "planes transcoded");
        Ok(RasterBuffer::packed(dst, width, height, layout))
    }
}

fn display_layout(channels: u32) -> Option<PixelLayout> {
    match channels {
        1 => Some(PixelLayout::Gray8),
        3 => Some(PixelLayout::Rgbx8),
        4 => Some(PixelLayout::Bgra8),
        _ => None,
    }
}

fn raw_layout(channels: u32) -> Option<PixelLayout> {
    match channels {
        1 => Some(PixelLayout::Gray8),
        3 => Some(PixelLayout::Bgr8),
        4 => Some(PixelLayout::Bgra8),
        _ => None,
    }
}

fn plane_of(src: &[u8], pixels: usize, channel: usize) -> &[u8] {
    &src[channel * pixels..(channel + 1) * pixels]
}

/// Interleave byte planes (`pixels` samples each) into `dst`.
fn write_pixels(
    dst: &mut [u8],
    src: &[u8],
    width: usize,
    pixels: usize,
    layout: PixelLayout,
    include_alpha: bool,
    stop: &dyn Stop,
) -> Result<(), TranscodeError> {
    let plane = |c: usize| plane_of(src, pixels, c);
    let bpp = layout.bytes_per_pixel();

    for (y, row) in dst.chunks_exact_mut(width * bpp).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        let base = y * width;
        match layout {
            PixelLayout::Gray8 => row.copy_from_slice(&plane(0)[base..base + width]),
            PixelLayout::Rgbx8 => {
                let (r, g, b) = (plane(0), plane(1), plane(2));
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let i = base + x;
                    px[0] = r[i];
                    px[1] = g[i];
                    px[2] = b[i];
                }
            }
            PixelLayout::Bgr8 => {
                let (r, g, b) = (plane(0), plane(1), plane(2));
                for (x, px) in row.chunks_exact_mut(3).enumerate() {
                    let i = base + x;
                    px[0] = b[i];
                    px[1] = g[i];
                    px[2] = r[i];
                }
            }
            PixelLayout::Bgra8 => {
                let (r, g, b, a) = (plane(0), plane(1), plane(2), plane(3));
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let i = base + x;
                    px[0] = b[i];
                    px[1] = g[i];
                    px[2] = r[i];
                    px[3] = if include_alpha { a[i] } else { 255 };
                }
            }
            other => return Err(Unsupported::ChannelCount(other.bytes_per_pixel() as u32).into()),
        }
    }
    Ok(())
}
