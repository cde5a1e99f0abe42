//! Pure-Rust implementation of the engine's non-compression primitives.

use alloc::vec;
use alloc::vec::Vec;

use super::{CodingEngine, EngineStatus, InterleavedOutput, TargaOutput};
use crate::params::{ComponentParameters, EngineDefaults};
use crate::planar::{ColorSpace, ComponentBuffer, Extents, PlanarImage};
use crate::targa::{self, TargaHeader};

/// Engine without a bitstream codec: creates images and performs the raw
/// bitmap and TGA conversions. Buffers are plain vectors.
#[derive(Clone, Debug, Default)]
pub struct ReferenceEngine {
    defaults: EngineDefaults,
}

impl ReferenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: EngineDefaults) -> Self {
        Self { defaults }
    }
}

/// All components share size, subsampling, precision and signedness.
fn uniform(components: &[ComponentBuffer]) -> bool {
    match components.split_first() {
        Some((first, rest)) => rest.iter().all(|c| c.matches(first)),
        None => false,
    }
}

fn write_plane_u8(component: &ComponentBuffer, out: &mut Vec<u8>) {
    let mask = ((1u32 << component.precision()) - 1) as i32;
    let (lo, hi) = if component.is_signed() { (-128, 127) } else { (0, 255) };
    out.extend(
        component
            .data()
            .iter()
            .map(|&v| (v.clamp(lo, hi) & mask) as u8),
    );
}

fn write_plane_u16(component: &ComponentBuffer, out: &mut Vec<u8>) {
    let mask = ((1u32 << component.precision()) - 1) as i32;
    let (lo, hi) = if component.is_signed() {
        (-32768, 32767)
    } else {
        (0, 65535)
    };
    for &v in component.data() {
        out.extend_from_slice(&((v.clamp(lo, hi) & mask) as u16).to_le_bytes());
    }
}

impl CodingEngine for ReferenceEngine {
    type Buffer = Vec<u8>;

    fn default_parameters(&self) -> EngineDefaults {
        self.defaults
    }

    fn create_image(
        &self,
        params: &[ComponentParameters],
        color_space: ColorSpace,
    ) -> Option<PlanarImage> {
        if params.is_empty() {
            return None;
        }
        let valid = |p: &ComponentParameters| {
            p.width > 0 && p.height > 0 && p.dx > 0 && p.dy > 0 && (1..=32).contains(&p.precision)
        };
        if !params.iter().all(valid) {
            return None;
        }
        let components = params.iter().map(ComponentBuffer::zeroed).collect();
        Some(PlanarImage::new(components, color_space))
    }

    fn convert_to_interleaved_buffer(&self, image: &PlanarImage) -> InterleavedOutput<Vec<u8>> {
        let extents = image.extents;
        if image.channel_count() == 0 || extents.x1 == 0 || extents.y1 == 0 {
            return InterleavedOutput::failed(None);
        }
        let components = &image.components()[..image.components().len().min(4)];
        if !uniform(components) {
            return InterleavedOutput::failed(None);
        }
        let first = &components[0];
        let bit_depth = match first.precision() {
            0 => return InterleavedOutput::failed(None),
            1..=8 => 8,
            9..=16 => 16,
            _ => return InterleavedOutput::failed(None),
        };

        let plane = first.data().len() * (bit_depth / 8);
        let mut buf = Vec::with_capacity(plane * components.len());
        for component in components {
            if bit_depth == 8 {
                write_plane_u8(component, &mut buf);
            } else {
                write_plane_u16(component, &mut buf);
            }
        }

        InterleavedOutput {
            status: EngineStatus::Ok,
            buffer: Some(buf),
            width: first.width(),
            height: first.height(),
            channels: components.len() as u32,
            bit_depth: bit_depth as u32,
        }
    }

    fn convert_to_targa_buffer(&self, image: &PlanarImage) -> TargaOutput<Vec<u8>> {
        let components = image.components();
        if !uniform(components) {
            return TargaOutput::failed(None);
        }
        let first = &components[0];
        let (Ok(w16), Ok(h16)) = (u16::try_from(first.width()), u16::try_from(first.height())) else {
            return TargaOutput::failed(None);
        };
        if first.precision() == 0 || first.precision() > 16 {
            return TargaOutput::failed(None);
        }

        let n = components.len();
        // mono+alpha or RGB+alpha
        let write_alpha = n == 2 || n == 4;
        let bpp: u8 = if write_alpha { 32 } else { 24 };
        let pixels = first.data().len();
        let size = targa::HEADER_SIZE + pixels * usize::from(bpp / 8);

        let mut tga = Vec::with_capacity(size);
        targa::write_header(&mut tga, bpp, w16, h16, true);

        let scale = 255.0f32 / ((1u32 << first.precision()) - 1) as f32;
        let adjust = |c: &ComponentBuffer| {
            if c.is_signed() {
                1i32 << (c.precision() - 1)
            } else {
                0
            }
        };
        let to_byte = |v: f32| (v.clamp(0.0, 255.0) * scale) as u8;

        let red = &components[0];
        let (green, blue) = if n > 2 {
            (&components[1], &components[2])
        } else {
            (red, red)
        };
        let alpha = &components[n - 1];
        let (adj_r, adj_g, adj_b) = (adjust(red), adjust(green), adjust(blue));

        let samples = red
            .data()
            .iter()
            .zip(green.data())
            .zip(blue.data())
            .zip(alpha.data());
        for (((&r, &g), &b), &a) in samples {
            let r = r.saturating_add(adj_r) as f32;
            let g = g.saturating_add(adj_g) as f32;
            let b = b.saturating_add(adj_b) as f32;
            tga.extend_from_slice(&[to_byte(b), to_byte(g), to_byte(r)]);
            if write_alpha {
                tga.push(to_byte(a as f32));
            }
        }
        debug_assert_eq!(tga.len(), size);

        TargaOutput {
            status: EngineStatus::Ok,
            buffer: Some(tga),
            size,
            width: first.width(),
            height: first.height(),
            channels: n as u32,
        }
    }

    fn targa_to_image(&self, tga: &[u8], defaults: &EngineDefaults) -> Option<PlanarImage> {
        let header = TargaHeader::parse(tga).ok()?;
        let channels = header.channels().ok()?;
        let pixels = header.pixels(tga).ok()?;
        let width = u32::from(header.width);
        let height = u32::from(header.height);

        let params = ComponentParameters::for_channels(channels, 8, width, height, defaults);
        let mut image = self.create_image(&params, ColorSpace::Srgb)?;
        image.extents = Extents::on_grid(
            defaults.image_offset_x0,
            defaults.image_offset_y0,
            width,
            height,
            defaults.subsampling_dx,
            defaults.subsampling_dy,
        )
        .ok()?;

        let w = width as usize;
        let c = channels as usize;
        let mut planes: Vec<Vec<i32>> = vec![Vec::with_capacity(w * height as usize); c];
        let rows: Vec<&[u8]> = if header.bottom_up() {
            pixels.chunks_exact(w * c).rev().collect()
        } else {
            pixels.chunks_exact(w * c).collect()
        };
        for row in rows {
            for px in row.chunks_exact(c) {
                // stored B, G, R(, A)
                planes[0].push(i32::from(px[2]));
                planes[1].push(i32::from(px[1]));
                planes[2].push(i32::from(px[0]));
                if c == 4 {
                    planes[3].push(i32::from(px[3]));
                }
            }
        }
        for (component, plane) in image.components_mut().iter_mut().zip(planes) {
            component.data_mut().copy_from_slice(&plane);
        }
        Some(image)
    }

    fn release_buffer(&self, buffer: Vec<u8>) {
        drop(buffer);
    }
}
