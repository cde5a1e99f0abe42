use crate::error::Unsupported;
use crate::planar::ColorSpace;

/// Pixel format of a structured bitmap source handed to the encoder.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// 8 bits per pixel, single channel.
    Gray8,
    /// 24 bits per pixel, three 8-bit channels.
    Rgb24,
    /// 32 bits per pixel, four 8-bit channels.
    Argb32,
    /// 16 bits per pixel, single channel.
    Gray16,
    /// 16 bits per pixel, packed 5-6-5.
    Rgb565,
    /// 64 bits per pixel, four 16-bit channels.
    Rgba64,
}

impl SourceFormat {
    pub fn bits_per_pixel(&self) -> u32 {
        match self {
            Self::Gray8 => 8,
            Self::Rgb24 => 24,
            Self::Argb32 => 32,
            Self::Gray16 | Self::Rgb565 => 16,
            Self::Rgba64 => 64,
        }
    }

    /// Channel count and color space on the planar side.
    ///
    /// Only 8-bit-per-channel formats map; everything else is rejected
    /// before any buffer arithmetic happens. `Gray8` is tagged
    /// [`ColorSpace::Gray`], not `Srgb`.
    pub fn planar_mapping(&self) -> Result<(u32, ColorSpace), Unsupported> {
        match self {
            Self::Gray8 => Ok((1, ColorSpace::Gray)),
            Self::Rgb24 => Ok((3, ColorSpace::Srgb)),
            Self::Argb32 => Ok((4, ColorSpace::Srgb)),
            other => Err(Unsupported::Format(*other)),
        }
    }
}

/// Byte meaning of one interleaved raster pixel.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// Single channel, 8-bit grayscale.
    Gray8,
    /// 3 channels, 8-bit RGB.
    Rgb8,
    /// 4 channels, 8-bit RGBA.
    Rgba8,
    /// 3 channels, 8-bit BGR.
    Bgr8,
    /// 4 channels, 8-bit BGRA.
    Bgra8,
    /// 4 bytes, 8-bit RGB followed by an unused padding byte.
    Rgbx8,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 | Self::Bgr8 => 3,
            Self::Rgba8 | Self::Bgra8 | Self::Rgbx8 => 4,
        }
    }

    /// Number of meaningful channels (padding excluded).
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb8 | Self::Bgr8 | Self::Rgbx8 => 3,
            Self::Rgba8 | Self::Bgra8 => 4,
        }
    }

    /// Default layout for a channel count in source order.
    pub fn for_channels(channels: u32) -> Result<Self, Unsupported> {
        match channels {
            1 => Ok(Self::Gray8),
            3 => Ok(Self::Rgb8),
            4 => Ok(Self::Rgba8),
            other => Err(Unsupported::ChannelCount(other)),
        }
    }
}
