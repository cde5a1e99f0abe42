#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // TGA ingestion must never panic
    let engine = zenplanar::ReferenceEngine::new();
    let _ = zenplanar::EncodeRequest::new().from_targa(&engine, data, enough::Unstoppable);
});
