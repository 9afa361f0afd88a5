//! # Codecs: Compression and Text Encoding
//!
//! Pure byte-level primitives, no state:
//!
//! | Function            | Direction                         |
//! |---------------------|-----------------------------------|
//! | [`gzip_compress`]   | raw → gzip (best compression)     |
//! | [`gzip_decompress`] | gzip → raw                        |
//! | [`brotli_compress`] | raw → brotli (quality 11)         |
//! | [`brotli_decompress`] | brotli → raw                    |
//! | [`encode_text`]     | bytes → base64 text               |
//! | [`decode_text`]     | base64 text → bytes               |
//! | [`pack`]            | raw → base64(brotli(raw))         |
//! | [`unpack`]          | base64(brotli(raw)) → raw         |
//!
//! The output of [`pack`] is the *canonical encoded payload* embedded in
//! generated bundles. Standard base64 only uses `[A-Za-z0-9+/=]`, so the
//! payload can sit inside a double-quoted string literal without escaping.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::CodecError;

/// Maximum brotli quality.
pub const BROTLI_QUALITY: u32 = 11;

/// Brotli window size (log2), the encoder default.
pub const BROTLI_LGWIN: u32 = 22;

const BROTLI_BUFFER_SIZE: usize = 4096;

/// Compress `input` with gzip at the best compression level.
pub fn gzip_compress(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(input.len() / 2), Compression::best());
    encoder.write_all(input).map_err(CodecError::Gzip)?;
    encoder.finish().map_err(CodecError::Gzip)
}

/// Decompress a complete gzip stream.
pub fn gzip_decompress(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut decoder = GzDecoder::new(input);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(CodecError::Gzip)?;
    Ok(out)
}

/// Compress `input` with brotli at maximum quality.
pub fn brotli_compress(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut writer = brotli::CompressorWriter::new(
        Vec::with_capacity(input.len() / 2),
        BROTLI_BUFFER_SIZE,
        BROTLI_QUALITY,
        BROTLI_LGWIN,
    );
    writer.write_all(input).map_err(CodecError::Brotli)?;
    writer.flush().map_err(CodecError::Brotli)?;
    // into_inner() finishes the stream before handing the buffer back.
    Ok(writer.into_inner())
}

/// Decompress a complete brotli stream.
pub fn brotli_decompress(input: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut reader = brotli::Decompressor::new(input, BROTLI_BUFFER_SIZE);
    let mut out = Vec::new();
    reader.read_to_end(&mut out).map_err(CodecError::Brotli)?;
    Ok(out)
}

/// Encode bytes as text safe for embedding in generated source.
pub fn encode_text(input: &[u8]) -> String {
    STANDARD.encode(input)
}

/// Decode text produced by [`encode_text`].
pub fn decode_text(input: &str) -> Result<Vec<u8>, CodecError> {
    Ok(STANDARD.decode(input.as_bytes())?)
}

/// Produce the canonical encoded payload: brotli, then text encoding.
pub fn pack(raw: &[u8]) -> Result<String, CodecError> {
    Ok(encode_text(&brotli_compress(raw)?))
}

/// Invert [`pack`], returning the original bytes.
pub fn unpack(encoded: &str) -> Result<Vec<u8>, CodecError> {
    brotli_decompress(&decode_text(encoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"<!doctype html><html><body>hello hello hello hello</body></html>";

    #[test]
    fn gzip_roundtrip() {
        let packed = gzip_compress(SAMPLE).unwrap();
        // gzip magic bytes
        assert_eq!(&packed[..2], &[0x1f, 0x8b]);
        assert_eq!(gzip_decompress(&packed).unwrap(), SAMPLE);
    }

    #[test]
    fn brotli_roundtrip() {
        let packed = brotli_compress(SAMPLE).unwrap();
        assert_eq!(brotli_decompress(&packed).unwrap(), SAMPLE);
    }

    #[test]
    fn empty_input_roundtrips() {
        assert!(gzip_decompress(&gzip_compress(b"").unwrap()).unwrap().is_empty());
        assert!(brotli_decompress(&brotli_compress(b"").unwrap())
            .unwrap()
            .is_empty());
        assert!(unpack(&pack(b"").unwrap()).unwrap().is_empty());
    }

    #[test]
    fn repetitive_input_shrinks() {
        let input = vec![b'a'; 64 * 1024];
        assert!(brotli_compress(&input).unwrap().len() < 1024);
        assert!(gzip_compress(&input).unwrap().len() < 1024);
    }

    #[test]
    fn text_encoding_is_literal_safe() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let text = encode_text(&bytes);
        assert!(text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='));
        assert_eq!(decode_text(&text).unwrap(), bytes);
    }

    #[test]
    fn pack_is_brotli_inside_base64() {
        let encoded = pack(SAMPLE).unwrap();
        let compressed = decode_text(&encoded).unwrap();
        assert_eq!(brotli_decompress(&compressed).unwrap(), SAMPLE);
    }

    #[test]
    fn malformed_text_rejected() {
        let err = decode_text("not base64 !!!").unwrap_err();
        assert!(matches!(err, CodecError::TextDecode(_)));
    }

    #[test]
    fn malformed_gzip_rejected() {
        let err = gzip_decompress(b"definitely not gzip").unwrap_err();
        assert!(matches!(err, CodecError::Gzip(_)));
    }

    #[test]
    fn malformed_brotli_rejected() {
        // A valid gzip stream is not a valid brotli stream.
        let gz = gzip_compress(SAMPLE).unwrap();
        assert!(unpack(&encode_text(&gz)).is_err());
    }
}
