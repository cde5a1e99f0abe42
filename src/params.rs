//! Image-creation and rate-control parameters derived from a raster.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{TranscodeError, Unsupported};

/// Engine-default encoder settings that feed image creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineDefaults {
    pub subsampling_dx: u32,
    pub subsampling_dy: u32,
    pub image_offset_x0: u32,
    pub image_offset_y0: u32,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            subsampling_dx: 1,
            subsampling_dy: 1,
            image_offset_x0: 0,
            image_offset_y0: 0,
        }
    }
}

/// How component precision is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Precision {
    /// The source's bits per sample (8 for every supported source).
    #[default]
    FromSource,
    /// `24 / channels`: 24, 8 and 6 bits for 1, 3 and 4 channels.
    LegacyPacked,
    Explicit(u32),
}

impl Precision {
    pub fn resolve(self, channels: u32, source_bits: u32) -> Result<u32, TranscodeError> {
        let bits = match self {
            Self::FromSource => source_bits,
            Self::LegacyPacked => 24 / channels,
            Self::Explicit(bits) => bits,
        };
        if bits == 0 || bits > 32 {
            return Err(Unsupported::BitDepth(bits).into());
        }
        Ok(bits)
    }
}

/// Creation request for one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentParameters {
    pub precision: u32,
    pub bpp: u32,
    pub signed: bool,
    pub dx: u32,
    pub dy: u32,
    pub width: u32,
    pub height: u32,
}

impl ComponentParameters {
    /// One unsigned parameter set per channel, all identical.
    pub fn for_channels(
        channels: u32,
        precision: u32,
        width: u32,
        height: u32,
        defaults: &EngineDefaults,
    ) -> Vec<Self> {
        vec![
            Self {
                precision,
                bpp: precision,
                signed: false,
                dx: defaults.subsampling_dx,
                dy: defaults.subsampling_dy,
                width,
                height,
            };
            channels as usize
        ]
    }
}

/// Target rates of the five lossy quality layers.
pub const LOSSY_RATES: [f32; 6] = [1920.0, 480.0, 120.0, 30.0, 10.0, 1.0];

/// Rate-control settings handed to the engine's compressor.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodingParameters {
    pub lossless: bool,
    pub num_layers: u32,
    pub rates: Vec<f32>,
    /// Multi-component (RGB to YCC) transform.
    pub color_transform: bool,
}

impl EncodingParameters {
    pub fn new(lossless: bool, channels: u32) -> Self {
        if lossless {
            Self {
                lossless,
                num_layers: 1,
                rates: vec![0.0],
                color_transform: false,
            }
        } else {
            Self {
                lossless,
                num_layers: 5,
                rates: LOSSY_RATES.to_vec(),
                color_transform: channels >= 3,
            }
        }
    }
}
