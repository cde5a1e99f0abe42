use enough::Stop;

use crate::engine::CodingEngine;
use crate::error::TranscodeError;
use crate::limits::{self, Limits};
use crate::params::{ComponentParameters, EncodingParameters, Precision};
use crate::planar::{ColorSpace, Extents, PlanarImage};
use crate::raster::{BitmapRef, Geometry, RasterBuffer};
use crate::targa::TargaHeader;

/// Bits per sample of every raster this crate ingests.
const SOURCE_BITS: u32 = 8;

/// A populated engine image plus the rate-control settings to compress it with.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub image: PlanarImage,
    pub parameters: EncodingParameters,
}

/// Builder for turning rasters into engine images.
///
/// Lossless by default.
#[derive(Clone, Debug)]
pub struct EncodeRequest<'a> {
    lossless: bool,
    precision: Precision,
    limits: Option<&'a Limits>,
}

impl Default for EncodeRequest<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> EncodeRequest<'a> {
    pub fn new() -> Self {
        Self {
            lossless: true,
            precision: Precision::default(),
            limits: None,
        }
    }

    pub fn lossless(mut self, lossless: bool) -> Self {
        self.lossless = lossless;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Rate-control settings for an image of `channels` components.
    pub fn parameters(&self, channels: u32) -> EncodingParameters {
        EncodingParameters::new(self.lossless, channels)
    }

    /// Convert an owned raster (interleaved or planar). Source channel `i`
    /// becomes component `i`.
    ///
    /// Single-channel rasters are tagged [`ColorSpace::Gray`] rather than
    /// `Srgb`, so engines that key behavior on the color space see them as
    /// gray. Three- and four-channel rasters are tagged `Srgb`.
    pub fn from_raster<E: CodingEngine + ?Sized>(
        &self,
        engine: &E,
        raster: &RasterBuffer,
        stop: impl Stop,
    ) -> Result<PreparedImage, TranscodeError> {
        let channels = raster.channel_count();
        let color_space = if channels == 1 {
            ColorSpace::Gray
        } else {
            ColorSpace::Srgb
        };
        self.build(engine, raster.data(), raster.geometry(), color_space, &stop)
    }

    /// Convert a locked bitmap whose pixel format decides channels and color space.
    ///
    /// See [`SourceFormat::planar_mapping`](crate::SourceFormat::planar_mapping);
    /// `Gray8` bitmaps are tagged [`ColorSpace::Gray`].
    pub fn from_bitmap<E: CodingEngine + ?Sized>(
        &self,
        engine: &E,
        bitmap: BitmapRef<'_>,
        stop: impl Stop,
    ) -> Result<PreparedImage, TranscodeError> {
        if bitmap.data.is_empty() || bitmap.width == 0 || bitmap.height == 0 {
            return Err(TranscodeError::InvalidInput("empty bitmap"));
        }
        let (channels, color_space) = bitmap.format.planar_mapping()?;
        let geometry = bitmap.geometry(channels)?;
        self.build(engine, bitmap.data, &geometry, color_space, &stop)
    }

    /// Ingest an uncompressed 24/32-bit TGA file through the engine.
    pub fn from_targa<E: CodingEngine + ?Sized>(
        &self,
        engine: &E,
        tga: &[u8],
        stop: impl Stop,
    ) -> Result<PreparedImage, TranscodeError> {
        if tga.is_empty() {
            return Err(TranscodeError::InvalidInput("empty TGA buffer"));
        }
        let header = TargaHeader::parse(tga)?;
        let channels = header.channels()?;
        let (width, height) = (u32::from(header.width), u32::from(header.height));
        if width == 0 || height == 0 {
            return Err(TranscodeError::InvalidInput("empty TGA image"));
        }
        header.pixels(tga)?;
        limits::enforce(self.limits, width, height, sample_bytes(width, height, channels)?)?;
        stop.check()?;

        let defaults = engine.default_parameters();
        let image = engine
            .targa_to_image(tga, &defaults)
            .ok_or(TranscodeError::EngineCreateFailed)?;
        tracing::debug!(width, height, channels, "engine image created from TGA");
        Ok(PreparedImage {
            image,
            parameters: self.parameters(channels),
        })
    }

    fn build<E: CodingEngine + ?Sized>(
        &self,
        engine: &E,
        data: &[u8],
        geometry: &Geometry,
        color_space: ColorSpace,
        stop: &dyn Stop,
    ) -> Result<PreparedImage, TranscodeError> {
        let channels = geometry.spp as u32;
        let (width, height) = (geometry.width, geometry.height);
        let precision = self.precision.resolve(channels, SOURCE_BITS)?;
        let defaults = engine.default_parameters();
        let components =
            ComponentParameters::for_channels(channels, precision, width, height, &defaults);
        let parameters = self.parameters(channels);
        let extents = Extents::on_grid(
            defaults.image_offset_x0,
            defaults.image_offset_y0,
            width,
            height,
            defaults.subsampling_dx,
            defaults.subsampling_dy,
        )?;
        limits::enforce(self.limits, width, height, sample_bytes(width, height, channels)?)?;
        stop.check()?;

        let mut image = engine
            .create_image(&components, color_space)
            .ok_or_else(|| {
                tracing::debug!(channels, width, height, "engine refused image creation");
                TranscodeError::EngineCreateFailed
            })?;
        tracing::debug!(channels, width, height, precision, "engine image created");
        image.extents = extents;

        match populate(&mut image, data, geometry, stop) {
            Ok(()) => Ok(PreparedImage { image, parameters }),
            Err(e) => {
                engine.destroy_image(image);
                Err(e)
            }
        }
    }
}

fn sample_bytes(width: u32, height: u32, channels: u32) -> Result<usize, TranscodeError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(channels as usize))
        .and_then(|n| n.checked_mul(core::mem::size_of::<i32>()))
        .ok_or(TranscodeError::DimensionsTooLarge { width, height })
}

/// Copy every source channel into its component, row by row.
fn populate(
    image: &mut PlanarImage,
    data: &[u8],
    geometry: &Geometry,
    stop: &dyn Stop,
) -> Result<(), TranscodeError> {
    let w = geometry.width as usize;
    let h = geometry.height as usize;
    if image.components().len() != geometry.spp {
        return Err(TranscodeError::EngineCreateFailed);
    }
    for (channel, component) in image.components_mut().iter_mut().enumerate() {
        let dst = component.data_mut();
        if dst.len() != w * h {
            return Err(TranscodeError::EngineCreateFailed);
        }
        for (y, row) in dst.chunks_exact_mut(w).enumerate() {
            if y % 16 == 0 {
                stop.check()?;
            }
            for (d, s) in row
                .iter_mut()
                .zip(geometry.channel_row(data, y as u32, channel))
            {
                *d = i32::from(s);
            }
        }
    }
    Ok(())
}
