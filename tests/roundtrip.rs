use enough::Unstoppable;
use zenplanar::*;

fn noise_pattern(len: usize, seed: u32) -> Vec<u8> {
    let mut state: u32 = seed;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

/// Sample `c` of pixel `i` as the display layout stores it.
fn display_sample(bitmap: &RasterBuffer, i: usize, c: usize) -> u8 {
    let px = &bitmap.data()[i * bitmap.channel_count() as usize..];
    match bitmap.layout() {
        PixelLayout::Gray8 | PixelLayout::Rgbx8 => px[c],
        PixelLayout::Bgra8 => px[[2, 1, 0, 3][c]],
        other => panic!("unexpected layout {other:?}"),
    }
}

#[test]
fn gray_2x2_roundtrip() {
    let engine = ReferenceEngine::new();
    let raster = RasterBuffer::new(vec![128; 4], 2, 2, 2, 1, true).unwrap();
    let prepared = EncodeRequest::new()
        .from_raster(&engine, &raster, Unstoppable)
        .unwrap();
    let decoded = DecodeRequest::new()
        .to_bitmap(&engine, &prepared.image, Unstoppable)
        .unwrap();
    assert_eq!(decoded.layout(), PixelLayout::Gray8);
    assert_eq!(decoded.data(), &[128, 128, 128, 128]);
}

#[test]
fn rgb_pixel_keeps_order_with_padding() {
    let engine = ReferenceEngine::new();
    let raster = RasterBuffer::new(vec![10, 20, 30], 1, 1, 3, 3, true).unwrap();
    let prepared = EncodeRequest::new()
        .from_raster(&engine, &raster, Unstoppable)
        .unwrap();
    let decoded = DecodeRequest::new()
        .to_bitmap(&engine, &prepared.image, Unstoppable)
        .unwrap();
    assert_eq!(decoded.layout(), PixelLayout::Rgbx8);
    assert_eq!(decoded.data().len(), 4);
    assert_eq!(&decoded.data()[..3], &[10, 20, 30]);
}

#[test]
fn rgba_pixel_reversed_with_forced_alpha() {
    let engine = ReferenceEngine::new();
    let raster = RasterBuffer::new(vec![10, 20, 30, 0], 1, 1, 4, 4, true).unwrap();
    let prepared = EncodeRequest::new()
        .from_raster(&engine, &raster, Unstoppable)
        .unwrap();
    let decoded = DecodeRequest::new()
        .include_alpha(false)
        .to_bitmap(&engine, &prepared.image, Unstoppable)
        .unwrap();
    assert_eq!(decoded.data(), &[30, 20, 10, 255]);
}

#[test]
fn alpha_is_forced_opaque_everywhere() {
    let engine = ReferenceEngine::new();
    let data = noise_pattern(5 * 3 * 4, 0xA5A5_0001);
    let raster = RasterBuffer::new(data, 5, 3, 20, 4, true).unwrap();
    let prepared = EncodeRequest::new()
        .from_raster(&engine, &raster, Unstoppable)
        .unwrap();
    let decoded = DecodeRequest::new()
        .include_alpha(false)
        .to_bitmap(&engine, &prepared.image, Unstoppable)
        .unwrap();
    assert!(decoded.data().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn lossless_roundtrip_all_channel_counts() {
    let engine = ReferenceEngine::new();
    for channels in [1u32, 3, 4] {
        for (w, h, gap) in [(1u32, 1u32, 0u32), (7, 5, 3), (16, 17, 1), (33, 2, 0)] {
            let stride = w * channels + gap;
            let data = noise_pattern((stride * h) as usize, 0xDEAD_BEEF ^ channels);
            let raster = RasterBuffer::new(data, w, h, stride, channels, true).unwrap();

            let prepared = EncodeRequest::new()
                .from_raster(&engine, &raster, Unstoppable)
                .unwrap();
            let decoded = DecodeRequest::new()
                .to_bitmap(&engine, &prepared.image, Unstoppable)
                .unwrap();

            assert_eq!((decoded.width(), decoded.height()), (w, h));
            for y in 0..h {
                for x in 0..w {
                    let i = (y * w + x) as usize;
                    for c in 0..channels {
                        assert_eq!(
                            display_sample(&decoded, i, c as usize),
                            raster.sample(x, y, c).unwrap(),
                            "channels={channels} {w}x{h} gap={gap} at ({x},{y},{c})"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn planar_source_roundtrip() {
    let engine = ReferenceEngine::new();
    let (w, h, stride) = (3u32, 2u32, 4u32);
    let data = noise_pattern((stride * h * 3) as usize, 7);
    let raster = RasterBuffer::new(data, w, h, stride, 3, false).unwrap();
    let prepared = EncodeRequest::new()
        .from_raster(&engine, &raster, Unstoppable)
        .unwrap();
    let decoded = DecodeRequest::new()
        .to_bitmap(&engine, &prepared.image, Unstoppable)
        .unwrap();
    for y in 0..h {
        for x in 0..w {
            for c in 0..3 {
                let i = (y * w + x) as usize;
                assert_eq!(
                    display_sample(&decoded, i, c as usize),
                    raster.sample(x, y, c).unwrap()
                );
            }
        }
    }
}

#[test]
fn claimed_channel_count_five_is_not_supported() {
    let err = RasterBuffer::new(vec![1, 2, 3], 1, 1, 3, 5, true).unwrap_err();
    assert!(matches!(
        err,
        TranscodeError::NotSupported(Unsupported::ChannelCount(5))
    ));
    assert_eq!(err.kind(), ErrorKind::NotSupported);
}

#[test]
fn sixteen_bit_bitmap_source_is_not_supported() {
    let engine = ReferenceEngine::new();
    let data = [0u8; 8];
    let bmp = BitmapRef::new(&data, 2, 2, 4, SourceFormat::Gray16);
    let err = EncodeRequest::new()
        .from_bitmap(&engine, bmp, Unstoppable)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotSupported);
}

#[test]
fn raw_bitmap_roundtrip_rgb() {
    let engine = ReferenceEngine::new();
    let raster = RasterBuffer::new(vec![1, 2, 3, 4, 5, 6], 2, 1, 6, 3, true).unwrap();
    let prepared = EncodeRequest::new()
        .from_raster(&engine, &raster, Unstoppable)
        .unwrap();
    let raw = DecodeRequest::new()
        .to_raw_bitmap(&engine, &prepared.image, Unstoppable)
        .unwrap();
    assert_eq!(raw.kind, RawKind::Bitmap);
    assert_eq!(raw.data(), &[3, 2, 1, 6, 5, 4]);
}

#[test]
fn lossy_parameters() {
    let engine = ReferenceEngine::new();
    let raster = RasterBuffer::new(vec![0; 12], 2, 2, 6, 3, true).unwrap();
    let prepared = EncodeRequest::new()
        .lossless(false)
        .from_raster(&engine, &raster, Unstoppable)
        .unwrap();
    assert_eq!(prepared.parameters.num_layers, 5);
    assert_eq!(prepared.parameters.rates, LOSSY_RATES.to_vec());
    assert!(prepared.parameters.color_transform);
}

#[test]
fn extents_follow_engine_defaults() {
    let engine = ReferenceEngine::with_defaults(EngineDefaults {
        subsampling_dx: 2,
        subsampling_dy: 3,
        image_offset_x0: 5,
        image_offset_y0: 0,
    });
    let raster = RasterBuffer::new(vec![0; 12], 4, 3, 4, 1, true).unwrap();
    let prepared = EncodeRequest::new()
        .from_raster(&engine, &raster, Unstoppable)
        .unwrap();
    let e = prepared.image.extents;
    assert_eq!((e.x0, e.y0), (5, 0));
    assert_eq!(e.x1, 5 + 3 * 2 + 1);
    assert_eq!(e.y1, 2 * 3 + 1);
    assert!(prepared.image.components().iter().all(|c| c.dx() == 2 && c.dy() == 3));
}

#[test]
fn limits_reject_large_decode() {
    let engine = ReferenceEngine::new();
    let raster = RasterBuffer::new(vec![0; 16], 4, 4, 4, 1, true).unwrap();
    let prepared = EncodeRequest::new()
        .from_raster(&engine, &raster, Unstoppable)
        .unwrap();
    let limits = Limits {
        max_memory_bytes: Some(8),
        ..Default::default()
    };
    let result = DecodeRequest::new()
        .with_limits(&limits)
        .to_bitmap(&engine, &prepared.image, Unstoppable);
    match result.unwrap_err() {
        TranscodeError::LimitExceeded(_) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }
}
