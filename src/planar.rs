//! Engine-side image: one full-precision sample buffer per channel.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::TranscodeError;
use crate::params::ComponentParameters;

/// Color space tag carried by a [`PlanarImage`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    #[default]
    Unknown,
    Gray,
    Srgb,
    Sycc,
}

/// Reference-grid bounding box of the image area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Extents {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Extents {
    /// Extents of a `width` x `height` image placed at `(x0, y0)` with
    /// subsampling `(dx, dy)`.
    pub fn on_grid(
        x0: u32,
        y0: u32,
        width: u32,
        height: u32,
        dx: u32,
        dy: u32,
    ) -> Result<Self, TranscodeError> {
        let too_large = || TranscodeError::DimensionsTooLarge { width, height };
        if width == 0 || height == 0 {
            return Err(TranscodeError::InvalidInput("empty image"));
        }
        let span = |origin: u32, len: u32, step: u32| -> Option<u32> {
            let reach = (len - 1).checked_mul(step)?.checked_add(1)?;
            if origin == 0 {
                Some(reach)
            } else {
                origin.checked_add(reach)
            }
        };
        Ok(Self {
            x0,
            y0,
            x1: span(x0, width, dx).ok_or_else(too_large)?,
            y1: span(y0, height, dy).ok_or_else(too_large)?,
        })
    }
}

/// One channel's samples plus the parameters it was created with.
///
/// The sample buffer always holds exactly `width * height` values; the
/// geometry is fixed at creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentBuffer {
    dx: u32,
    dy: u32,
    width: u32,
    height: u32,
    precision: u32,
    bpp: u32,
    signed: bool,
    data: Vec<i32>,
}

impl ComponentBuffer {
    /// Zero-filled component sized from `params`.
    pub fn zeroed(params: &ComponentParameters) -> Self {
        let len = params.width as usize * params.height as usize;
        Self {
            dx: params.dx,
            dy: params.dy,
            width: params.width,
            height: params.height,
            precision: params.precision,
            bpp: params.bpp,
            signed: params.signed,
            data: vec![0; len],
        }
    }

    pub fn dx(&self) -> u32 {
        self.dx
    }

    pub fn dy(&self) -> u32 {
        self.dy
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Significant bits per sample.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn bpp(&self) -> u32 {
        self.bpp
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Samples in row-major order, `width * height` long.
    pub fn data(&self) -> &[i32] {
        &self.data
    }

    /// Mutable samples; the length cannot change.
    pub fn data_mut(&mut self) -> &mut [i32] {
        &mut self.data
    }

    pub fn sample(&self, x: u32, y: u32) -> Option<i32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y as usize * self.width as usize + x as usize).copied()
    }

    /// Same size, subsampling, precision and signedness as `other`.
    pub(crate) fn matches(&self, other: &ComponentBuffer) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.data.len() == other.data.len()
            && self.dx == other.dx
            && self.dy == other.dy
            && self.precision == other.precision
            && self.signed == other.signed
    }
}

/// The coding engine's image: ordered components, extents, color space and
/// an optional ICC profile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanarImage {
    components: Vec<ComponentBuffer>,
    pub extents: Extents,
    pub color_space: ColorSpace,
    icc_profile: Option<Vec<u8>>,
}

impl PlanarImage {
    pub fn new(components: Vec<ComponentBuffer>, color_space: ColorSpace) -> Self {
        Self {
            components,
            extents: Extents::default(),
            color_space,
            icc_profile: None,
        }
    }

    pub fn components(&self) -> &[ComponentBuffer] {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut [ComponentBuffer] {
        &mut self.components
    }

    pub fn channel_count(&self) -> u32 {
        self.components.len() as u32
    }

    /// The embedded ICC profile, if any bytes are present.
    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.icc_profile.as_deref().filter(|icc| !icc.is_empty())
    }

    pub fn set_icc_profile(&mut self, icc: Option<Vec<u8>>) {
        self.icc_profile = icc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extents_from_origin() {
        let e = Extents::on_grid(0, 0, 640, 480, 1, 1).unwrap();
        assert_eq!((e.x1, e.y1), (640, 480));
        let e = Extents::on_grid(0, 0, 10, 4, 2, 3).unwrap();
        assert_eq!((e.x1, e.y1), (19, 10));
    }

    #[test]
    fn extents_with_offset() {
        for (x0, w, dx) in [(5u32, 7u32, 1u32), (3, 1, 4), (100, 33, 2)] {
            let e = Extents::on_grid(x0, x0, w, w, dx, dx).unwrap();
            assert_eq!(e.x1, x0 + (w - 1) * dx + 1);
            assert_eq!(e.y1, e.x1);
        }
    }

    #[test]
    fn extents_overflow_is_an_error() {
        assert!(matches!(
            Extents::on_grid(u32::MAX, 0, 2, 1, 1, 1),
            Err(TranscodeError::DimensionsTooLarge { .. })
        ));
    }

    #[test]
    fn empty_icc_reads_as_absent() {
        let mut img = PlanarImage::new(Vec::new(), ColorSpace::Srgb);
        assert_eq!(img.icc_profile(), None);
        img.set_icc_profile(Some(Vec::new()));
        assert_eq!(img.icc_profile(), None);
        img.set_icc_profile(Some(alloc::vec![1, 2]));
        assert_eq!(img.icc_profile(), Some(&[1u8, 2][..]));
    }

    #[test]
    fn components_compare_size_and_format() {
        let params = ComponentParameters {
            precision: 8,
            bpp: 8,
            signed: false,
            dx: 1,
            dy: 1,
            width: 2,
            height: 2,
        };
        let a = ComponentBuffer::zeroed(&params);
        assert_eq!(a.data().len(), 4);
        assert_eq!((a.width(), a.height(), a.precision()), (2, 2, 8));
        assert!(a.matches(&ComponentBuffer::zeroed(&params)));

        let wider = ComponentBuffer::zeroed(&ComponentParameters { width: 3, ..params });
        assert!(!a.matches(&wider));
        let signed = ComponentBuffer::zeroed(&ComponentParameters { signed: true, ..params });
        assert!(!a.matches(&signed));
    }
}
