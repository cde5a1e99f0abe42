//! The coding engine seam.
//!
//! Compression itself lives behind [`CodingEngine`]; this crate only needs
//! image creation and the engine's raw-format conversions. Buffers returned
//! by a conversion belong to the engine until handed back through
//! [`CodingEngine::release_buffer`], which [`ScopedBuffer`] does on drop.

mod reference;

pub use reference::ReferenceEngine;

use crate::params::{ComponentParameters, EngineDefaults};
use crate::planar::{ColorSpace, PlanarImage};

/// Status code reported by an engine conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    Ok,
    Fail,
}

/// Result of [`CodingEngine::convert_to_interleaved_buffer`].
///
/// The buffer holds one `width * height` plane per channel, back to back,
/// each sample `bit_depth / 8` bytes wide.
#[derive(Debug)]
pub struct InterleavedOutput<B> {
    pub status: EngineStatus,
    pub buffer: Option<B>,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub bit_depth: u32,
}

impl<B> InterleavedOutput<B> {
    pub fn failed(buffer: Option<B>) -> Self {
        Self {
            status: EngineStatus::Fail,
            buffer,
            width: 0,
            height: 0,
            channels: 0,
            bit_depth: 0,
        }
    }
}

/// Result of [`CodingEngine::convert_to_targa_buffer`].
#[derive(Debug)]
pub struct TargaOutput<B> {
    pub status: EngineStatus,
    pub buffer: Option<B>,
    /// Bytes of the TGA file in `buffer`.
    pub size: usize,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
}

impl<B> TargaOutput<B> {
    pub fn failed(buffer: Option<B>) -> Self {
        Self {
            status: EngineStatus::Fail,
            buffer,
            size: 0,
            width: 0,
            height: 0,
            channels: 0,
        }
    }
}

/// Image creation and raw-format conversion primitives of a coding engine.
pub trait CodingEngine {
    /// Engine-owned byte buffer.
    type Buffer: AsRef<[u8]>;

    /// Default encoder parameters (subsampling and image offset).
    fn default_parameters(&self) -> EngineDefaults;

    /// Allocate an image with one component per entry of `params`.
    ///
    /// `None` signals an allocation or validation failure.
    fn create_image(
        &self,
        params: &[ComponentParameters],
        color_space: ColorSpace,
    ) -> Option<PlanarImage>;

    /// Flatten `image` to 8- or 16-bit byte planes.
    ///
    /// The buffer may be present even when the status is `Fail`.
    fn convert_to_interleaved_buffer(&self, image: &PlanarImage) -> InterleavedOutput<Self::Buffer>;

    /// Render `image` as a complete TGA file.
    fn convert_to_targa_buffer(&self, image: &PlanarImage) -> TargaOutput<Self::Buffer>;

    /// Build an image from an uncompressed 24/32-bit TGA file.
    fn targa_to_image(&self, tga: &[u8], defaults: &EngineDefaults) -> Option<PlanarImage>;

    /// Hand a conversion buffer back to the engine.
    fn release_buffer(&self, buffer: Self::Buffer);

    /// End the lifetime of an engine image.
    fn destroy_image(&self, image: PlanarImage) {
        drop(image);
    }
}

/// An engine buffer released exactly once, on whichever path drops it.
pub struct ScopedBuffer<'e, E: CodingEngine + ?Sized> {
    engine: &'e E,
    buffer: Option<E::Buffer>,
}

impl<'e, E: CodingEngine + ?Sized> ScopedBuffer<'e, E> {
    pub fn new(engine: &'e E, buffer: Option<E::Buffer>) -> Self {
        if buffer.is_some() {
            tracing::debug!("engine buffer acquired");
        }
        Self { engine, buffer }
    }

    /// Buffer contents, empty when the engine returned none.
    pub fn bytes(&self) -> &[u8] {
        self.buffer.as_ref().map(AsRef::as_ref).unwrap_or(&[])
    }

    pub fn is_present(&self) -> bool {
        self.buffer.is_some()
    }
}

impl<E: CodingEngine + ?Sized> Drop for ScopedBuffer<'_, E> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.engine.release_buffer(buffer);
            tracing::debug!("engine buffer released");
        }
    }
}
