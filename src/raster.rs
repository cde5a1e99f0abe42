//! Byte rasters: the interleaved (or planar 8-bit) side of the conversion.
//!
//! Every raster validates its geometry once at construction, so the sample
//! accessors and row iterators below never index outside the buffer.

use alloc::vec::Vec;

use crate::error::{TranscodeError, Unsupported};
use crate::pixel::{PixelLayout, SourceFormat};

/// Validated addressing for an 8-bit raster.
///
/// Interleaved: sample `(x, y, c)` lives at `y*stride + x*spp + c`.
/// Planar: at `c*stride*height + y*stride + x`, where `stride` is the row
/// pitch of a single plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Geometry {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    /// Samples (bytes) per pixel.
    pub spp: usize,
    pub interleaved: bool,
}

impl Geometry {
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        spp: usize,
        interleaved: bool,
        len: usize,
    ) -> Result<Self, TranscodeError> {
        if width == 0 || height == 0 || len == 0 {
            return Err(TranscodeError::InvalidInput("empty raster"));
        }
        let too_large = TranscodeError::DimensionsTooLarge { width, height };
        let w = width as usize;
        let h = height as usize;
        let packed_row = if interleaved {
            w.checked_mul(spp).ok_or(too_large)?
        } else {
            w
        };
        if stride < packed_row {
            return Err(TranscodeError::InvalidInput("stride shorter than a packed row"));
        }
        let plane = (h - 1)
            .checked_mul(stride)
            .and_then(|v| v.checked_add(packed_row))
            .ok_or(TranscodeError::DimensionsTooLarge { width, height })?;
        let needed = if interleaved {
            plane
        } else {
            stride
                .checked_mul(h)
                .and_then(|v| v.checked_mul(spp - 1))
                .and_then(|v| v.checked_add(plane))
                .ok_or(TranscodeError::DimensionsTooLarge { width, height })?
        };
        if len < needed {
            return Err(TranscodeError::BufferTooSmall {
                needed,
                actual: len,
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            spp,
            interleaved,
        })
    }

    /// Bytes at the end of each row that carry no samples.
    pub fn row_gap(&self) -> usize {
        let packed = if self.interleaved {
            self.width as usize * self.spp
        } else {
            self.width as usize
        };
        self.stride - packed
    }

    pub fn offset(&self, x: u32, y: u32, channel: usize) -> usize {
        let row_start = y as usize * self.stride;
        if self.interleaved {
            row_start + x as usize * self.spp + channel
        } else {
            channel * self.stride * self.height as usize + row_start + x as usize
        }
    }

    /// Samples of one channel across row `y`, row gap excluded.
    pub fn channel_row<'a>(
        &self,
        data: &'a [u8],
        y: u32,
        channel: usize,
    ) -> impl Iterator<Item = u8> + use<'a> {
        let start = self.offset(0, y, channel);
        let w = self.width as usize;
        let (end, step) = if self.interleaved {
            (start + (w - 1) * self.spp + 1, self.spp)
        } else {
            (start + w, 1)
        };
        data[start..end].iter().step_by(step).copied()
    }
}

/// An owned 8-bit raster with explicit stride.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterBuffer {
    geometry: Geometry,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Wrap `data` as a raster of `channels` 8-bit samples per pixel.
    ///
    /// `stride` is bytes per row (per plane when not interleaved). Channel
    /// counts outside {1, 3, 4} are rejected before any size arithmetic.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        stride: u32,
        channels: u32,
        interleaved: bool,
    ) -> Result<Self, TranscodeError> {
        let layout = PixelLayout::for_channels(channels)?;
        Self::with_layout(data, width, height, stride, layout, interleaved)
    }

    /// Like [`RasterBuffer::new`] with an explicit byte order.
    pub fn with_layout(
        data: Vec<u8>,
        width: u32,
        height: u32,
        stride: u32,
        layout: PixelLayout,
        interleaved: bool,
    ) -> Result<Self, TranscodeError> {
        let geometry = Geometry::new(
            width,
            height,
            stride as usize,
            layout.bytes_per_pixel(),
            interleaved,
            data.len(),
        )?;
        Ok(Self {
            geometry,
            layout,
            data,
        })
    }

    /// Tightly packed interleaved raster built by the decoder.
    pub(crate) fn packed(data: Vec<u8>, width: u32, height: u32, layout: PixelLayout) -> Self {
        let spp = layout.bytes_per_pixel();
        debug_assert_eq!(data.len(), width as usize * height as usize * spp);
        Self {
            geometry: Geometry {
                width,
                height,
                stride: width as usize * spp,
                spp,
                interleaved: true,
            },
            layout,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    pub fn stride(&self) -> usize {
        self.geometry.stride
    }

    /// Samples stored per pixel, padding included.
    pub fn channel_count(&self) -> u32 {
        self.geometry.spp as u32
    }

    /// Only 8-bit samples exist on this side of the engine.
    pub fn bytes_per_sample(&self) -> u32 {
        1
    }

    pub fn is_interleaved(&self) -> bool {
        self.geometry.interleaved
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn row_gap(&self) -> usize {
        self.geometry.row_gap()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Sample of `channel` at `(x, y)`, or `None` outside the raster.
    pub fn sample(&self, x: u32, y: u32, channel: u32) -> Option<u8> {
        if x >= self.width() || y >= self.height() || channel as usize >= self.geometry.spp {
            return None;
        }
        self.data
            .get(self.geometry.offset(x, y, channel as usize))
            .copied()
    }

    pub(crate) fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Reinterpret an unpadded interleaved raster as typed pixels.
    #[cfg(feature = "rgb")]
    pub fn as_pixels<P: RasterPixel>(&self) -> Result<&[P], TranscodeError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        use rgb::AsPixels as _;

        if self.layout != P::LAYOUT {
            return Err(TranscodeError::InvalidInput("pixel type does not match layout"));
        }
        if !self.is_interleaved() || self.row_gap() != 0 {
            return Err(TranscodeError::InvalidInput("raster is not tightly packed"));
        }
        let len = self.width() as usize * self.height() as usize * self.geometry.spp;
        Ok(self.data[..len].as_pixels())
    }

    /// Build an interleaved raster from an [`imgref::ImgRef`], dropping its stride padding.
    #[cfg(feature = "imgref")]
    pub fn from_imgref<P: RasterPixel>(img: imgref::ImgRef<'_, P>) -> Result<Self, TranscodeError> {
        let width = u32::try_from(img.width()).map_err(|_| TranscodeError::InvalidInput("width"))?;
        let height =
            u32::try_from(img.height()).map_err(|_| TranscodeError::InvalidInput("height"))?;
        let bpp = P::LAYOUT.bytes_per_pixel();
        let mut data = Vec::with_capacity(img.width() * img.height() * bpp);
        for row in img.rows() {
            for px in row {
                px.push_bytes(&mut data);
            }
        }
        let stride = u32::try_from(img.width() * bpp)
            .map_err(|_| TranscodeError::DimensionsTooLarge { width, height })?;
        Self::with_layout(data, width, height, stride, P::LAYOUT, true)
    }

    /// Copy into an [`imgref::ImgVec`] of typed pixels.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec<P: RasterPixel>(&self) -> Result<imgref::ImgVec<P>, TranscodeError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgVec::new(
            pixels.to_vec(),
            self.width() as usize,
            self.height() as usize,
        ))
    }
}

/// Typed pixels that map onto a [`PixelLayout`].
#[cfg(feature = "rgb")]
pub trait RasterPixel: Copy + 'static {
    const LAYOUT: PixelLayout;
    fn push_bytes(&self, out: &mut Vec<u8>);
}

#[cfg(feature = "rgb")]
impl RasterPixel for rgb::Gray<u8> {
    const LAYOUT: PixelLayout = PixelLayout::Gray8;
    fn push_bytes(&self, out: &mut Vec<u8>) {
        out.push(self.0);
    }
}

#[cfg(feature = "rgb")]
impl RasterPixel for rgb::Rgb<u8> {
    const LAYOUT: PixelLayout = PixelLayout::Rgb8;
    fn push_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.r, self.g, self.b]);
    }
}

#[cfg(feature = "rgb")]
impl RasterPixel for rgb::Rgba<u8> {
    const LAYOUT: PixelLayout = PixelLayout::Rgba8;
    fn push_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.r, self.g, self.b, self.a]);
    }
}

#[cfg(feature = "rgb")]
impl RasterPixel for rgb::alt::BGRA<u8> {
    const LAYOUT: PixelLayout = PixelLayout::Bgra8;
    fn push_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&[self.b, self.g, self.r, self.a]);
    }
}

/// A borrowed, locked view of a structured bitmap (pixel format + stride).
#[derive(Clone, Copy, Debug)]
pub struct BitmapRef<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Bytes per row.
    pub stride: u32,
    pub format: SourceFormat,
}

impl<'a> BitmapRef<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, stride: u32, format: SourceFormat) -> Self {
        Self {
            data,
            width,
            height,
            stride,
            format,
        }
    }

    /// Validate addressing for the mapped channel count.
    pub(crate) fn geometry(&self, channels: u32) -> Result<Geometry, TranscodeError> {
        if channels * 8 != self.format.bits_per_pixel() {
            return Err(Unsupported::BitDepth(self.format.bits_per_pixel() / channels).into());
        }
        Geometry::new(
            self.width,
            self.height,
            self.stride as usize,
            channels as usize,
            true,
            self.data.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn row_gap_is_skipped_per_row() {
        // 2x2 RGB, stride 8 -> 2 gap bytes per row.
        let data = vec![
            1, 2, 3, 4, 5, 6, 0xEE, 0xEE, //
            7, 8, 9, 10, 11, 12,
        ];
        let raster = RasterBuffer::new(data, 2, 2, 8, 3, true).unwrap();
        assert_eq!(raster.row_gap(), 2);
        assert_eq!(raster.sample(1, 0, 2), Some(6));
        assert_eq!(raster.sample(0, 1, 0), Some(7));
        assert_eq!(raster.sample(2, 0, 0), None);
        let g = raster.geometry();
        let greens: Vec<u8> = g.channel_row(raster.data(), 1, 1).collect();
        assert_eq!(greens, vec![8, 11]);
    }

    #[test]
    fn planar_addressing() {
        // 2x1, 3 planes, stride 3 (1 gap byte per plane row).
        let data = vec![1, 2, 0, 3, 4, 0, 5, 6];
        let raster = RasterBuffer::new(data, 2, 1, 3, 3, false).unwrap();
        assert_eq!(raster.sample(0, 0, 1), Some(3));
        assert_eq!(raster.sample(1, 0, 2), Some(6));
        let blues: Vec<u8> = raster.geometry().channel_row(raster.data(), 0, 2).collect();
        assert_eq!(blues, vec![5, 6]);
    }

    #[test]
    fn rejects_bad_geometry() {
        assert!(matches!(
            RasterBuffer::new(vec![0; 12], 2, 2, 6, 5, true),
            Err(TranscodeError::NotSupported(Unsupported::ChannelCount(5)))
        ));
        assert!(matches!(
            RasterBuffer::new(vec![0; 12], 2, 2, 5, 3, true),
            Err(TranscodeError::InvalidInput(_))
        ));
        assert!(matches!(
            RasterBuffer::new(vec![0; 11], 2, 2, 6, 3, true),
            Err(TranscodeError::BufferTooSmall {
                needed: 12,
                actual: 11
            })
        ));
        assert!(matches!(
            RasterBuffer::new(Vec::new(), 0, 0, 0, 1, true),
            Err(TranscodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn bitmap_depth_must_match_channels() {
        let data = [0u8; 4];
        let bmp = BitmapRef::new(&data, 2, 1, 4, SourceFormat::Gray16);
        assert!(matches!(
            bmp.geometry(1),
            Err(TranscodeError::NotSupported(Unsupported::BitDepth(16)))
        ));
    }

    #[cfg(feature = "imgref")]
    #[test]
    fn imgref_roundtrip_drops_stride() {
        use rgb::Rgb;
        let pixels = vec![
            Rgb::new(1u8, 2, 3),
            Rgb::new(4, 5, 6),
            Rgb::new(0, 0, 0), // stride padding
            Rgb::new(7, 8, 9),
            Rgb::new(10, 11, 12),
            Rgb::new(0, 0, 0),
        ];
        let img = imgref::Img::new_stride(pixels, 2, 2, 3);
        let raster = RasterBuffer::from_imgref(img.as_ref()).unwrap();
        assert_eq!(raster.layout(), PixelLayout::Rgb8);
        assert_eq!(raster.row_gap(), 0);
        assert_eq!(raster.sample(0, 1, 2), Some(9));

        let back = raster.to_imgvec::<Rgb<u8>>().unwrap();
        assert_eq!(back.buf()[3], Rgb::new(10, 11, 12));
        assert!(raster.as_pixels::<rgb::Rgba<u8>>().is_err());
    }
}
