#![no_main]
use libfuzzer_sys::fuzz_target;
use zenplanar::*;

fuzz_target!(|data: &[u8]| {
    // First 4 bytes shape the raster, the rest are pixels
    let Some((&[w, h, gap, flags], pixels)) = data.split_first_chunk::<4>() else {
        return;
    };
    let channels = [1u32, 3, 4, 2][(flags & 3) as usize];
    let interleaved = flags & 4 == 0;
    let (w, h) = (u32::from(w % 32) + 1, u32::from(h % 32) + 1);
    let packed = if interleaved { w * channels } else { w };
    let stride = packed + u32::from(gap % 8);

    // Construction must reject bad geometry, never panic
    let Ok(raster) = RasterBuffer::new(pixels.to_vec(), w, h, stride, channels, interleaved) else {
        return;
    };

    let engine = ReferenceEngine::new();
    let prepared = EncodeRequest::new()
        .from_raster(&engine, &raster, enough::Unstoppable)
        .expect("valid raster must encode");
    let decoded = DecodeRequest::new()
        .to_bitmap(&engine, &prepared.image, enough::Unstoppable)
        .expect("encoded image must decode");

    for y in 0..h {
        for x in 0..w {
            let px = &decoded.data()[((y * w + x) * decoded.channel_count()) as usize..];
            for c in 0..channels {
                let got = match decoded.layout() {
                    PixelLayout::Bgra8 => px[[2, 1, 0, 3][c as usize]],
                    _ => px[c as usize],
                };
                assert_eq!(Some(got), raster.sample(x, y, c), "roundtrip sample mismatch");
            }
        }
    }
});
