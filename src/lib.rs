//! # zenplanar
//!
//! Pixel transcoding at the boundary of a JPEG 2000 coding engine.
//!
//! The engine works on planar images: one full-precision sample buffer per
//! channel. Display code and simple file formats want interleaved 8-bit
//! pixels. This crate converts between the two and derives the engine's
//! image-creation parameters (precision, subsampling, color space,
//! rate-control layers) from the source raster.
//!
//! ## Encode side
//!
//! - [`RasterBuffer`] (interleaved or planar, explicit stride) or a locked
//!   [`BitmapRef`] (pixel format decides channels) → [`PlanarImage`]
//! - uncompressed 24/32-bit TGA → [`PlanarImage`] via the engine
//!
//! ## Decode side
//!
//! - [`PlanarImage`] → display raster: `Gray8`, `Rgbx8` or `Bgra8`
//! - [`PlanarImage`] → raw packed bitmap: gray, `BGR` or `BGRA`
//! - [`PlanarImage`] → TGA file rendered by the engine
//!
//! Buffers the engine allocates during a conversion are held in a
//! [`ScopedBuffer`] and handed back exactly once on every exit path.
//!
//! ## Non-Goals
//!
//! - The compressed bitstream itself (the engine owns it)
//! - Rate-distortion optimization
//! - Multi-threaded decoding
//!
//! ## Usage
//!
//! ```
//! use zenplanar::{DecodeRequest, EncodeRequest, RasterBuffer, ReferenceEngine, Unstoppable};
//!
//! let engine = ReferenceEngine::new();
//! let raster = RasterBuffer::new(vec![10, 20, 30], 1, 1, 3, 3, true)?;
//!
//! let prepared = EncodeRequest::new()
//!     .lossless(true)
//!     .from_raster(&engine, &raster, Unstoppable)?;
//! assert_eq!(prepared.parameters.num_layers, 1);
//!
//! let bitmap = DecodeRequest::new().to_bitmap(&engine, &prepared.image, Unstoppable)?;
//! assert_eq!(&bitmap.data()[..3], &[10, 20, 30]);
//! # Ok::<(), zenplanar::TranscodeError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod error;
mod limits;
mod params;
mod pixel;
mod planar;
mod raster;

pub mod engine;
pub mod targa;

mod decode;
mod encode;

// Re-exports
pub use decode::{DecodeRequest, RawImage, RawKind};
pub use encode::{EncodeRequest, PreparedImage};
pub use engine::{CodingEngine, EngineStatus, ReferenceEngine, ScopedBuffer};
pub use enough::{Stop, Unstoppable};
pub use error::{ErrorKind, TranscodeError, Unsupported};
pub use limits::Limits;
pub use params::{ComponentParameters, EncodingParameters, EngineDefaults, LOSSY_RATES, Precision};
pub use pixel::{PixelLayout, SourceFormat};
pub use planar::{ColorSpace, ComponentBuffer, Extents, PlanarImage};
#[cfg(feature = "rgb")]
pub use raster::RasterPixel;
pub use raster::{BitmapRef, RasterBuffer};
