use std::io::{Read, Write};

use super::*;

fn compress(codec: &dyn Codec, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut w = codec.writer(Box::new(&mut out)).unwrap();
    w.write_all(data).unwrap();
    w.finish().unwrap();
    out
}

fn decompress(codec: &dyn Codec, data: &[u8]) -> Vec<u8> {
    let mut r = codec.reader(Box::new(data)).unwrap();
    let mut out = Vec::new();
    r.read_to_end(&mut out).unwrap();
    out
}

fn codecs() -> Vec<Box<dyn Codec>> {
    vec![
        Box::new(ZstdCodec::new()),
        Box::new(ZstdCodec::best()),
        Box::new(GzipCodec::new()),
        Box::new(NoopCodec),
    ]
}

// -------------------- Round trips --------------------

#[test]
fn round_trip_all_codecs() {
    let payloads: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        b"x".to_vec(),
        b"{\"fen\":\"8/8/8/8/8/8/8/8 w - -\"}\n".to_vec(),
        vec![0u8; 64 * 1024],
        (0..=255u8).cycle().take(100_000).collect(),
    ];

    for codec in codecs() {
        for payload in &payloads {
            let compressed = compress(codec.as_ref(), payload);
            let restored = decompress(codec.as_ref(), &compressed);
            assert_eq!(
                &restored, payload,
                "round trip failed for {:?} ({} bytes)",
                codec.extension(),
                payload.len()
            );
        }
    }
}

#[test]
fn streaming_writes_round_trip() {
    let codec = ZstdCodec::new();
    let mut out = Vec::new();
    {
        let mut w = codec.writer(Box::new(&mut out)).unwrap();
        for i in 0..1000 {
            writeln!(w, "record {i}").unwrap();
        }
        w.finish().unwrap();
    }

    let restored = decompress(&codec, &out);
    let lines: Vec<&str> = std::str::from_utf8(&restored).unwrap().lines().collect();
    assert_eq!(lines.len(), 1000);
    assert_eq!(lines[0], "record 0");
    assert_eq!(lines[999], "record 999");
}

#[test]
fn compression_actually_shrinks() {
    let payload = vec![b'a'; 100_000];
    for codec in [
        Box::new(ZstdCodec::best()) as Box<dyn Codec>,
        Box::new(GzipCodec::new()),
    ] {
        let compressed = compress(codec.as_ref(), &payload);
        assert!(
            compressed.len() < payload.len() / 10,
            "{} did not compress",
            codec.extension()
        );
    }
}

#[test]
fn noop_is_identity() {
    let payload = b"untouched bytes";
    assert_eq!(compress(&NoopCodec, payload), payload);
    assert_eq!(decompress(&NoopCodec, payload), payload);
}

// -------------------- Metadata --------------------

#[test]
fn extensions_and_tokens() {
    assert_eq!(ZstdCodec::new().extension(), "zst");
    assert_eq!(ZstdCodec::new().token(), "zstd");
    assert_eq!(GzipCodec::new().extension(), "gz");
    assert_eq!(GzipCodec::new().token(), "gzip");
    assert_eq!(NoopCodec.extension(), "");
    assert_eq!(NoopCodec.token(), "");
}

#[test]
fn codec_by_token_resolves() {
    assert_eq!(codec_by_token("zstd").unwrap().extension(), "zst");
    assert_eq!(codec_by_token("gzip").unwrap().extension(), "gz");
    assert_eq!(codec_by_token("").unwrap().extension(), "");
    assert!(codec_by_token("lz4").is_none());
}
