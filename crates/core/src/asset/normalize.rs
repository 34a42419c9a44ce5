//! Image normalization to the canonical WebP encoding.
//!
//! Every image upload converges to lossy WebP at a fixed quality, chosen to
//! balance visual fidelity and size for catalog pages. Normalization is
//! best-effort and fail-open: a catalog must be able to accept an upload the
//! decoder chokes on, so any failure passes the original bytes through
//! unchanged instead of failing the upload. The outcome is reported
//! explicitly so operators can watch the rate of skipped conversions.

use tracing::warn;

/// The canonical encoded type all normalized uploads converge to.
pub const CANONICAL_CONTENT_TYPE: &str = "image/webp";

/// Filename extension matching the canonical type.
pub const CANONICAL_EXTENSION: &str = "webp";

/// Lossy WebP quality on a 0-100 scale.
pub const WEBP_QUALITY: f32 = 85.0;

/// What happened during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// Input was decoded and re-encoded to the canonical type.
    Converted,
    /// Input was already canonical; returned unchanged.
    AlreadyCanonical,
    /// Declared content type is not an image; returned unchanged.
    NotAnImage,
    /// Decode or encode failed; original returned unchanged (fail-open).
    Failed,
}

impl NormalizeOutcome {
    /// Whether the original bytes were passed through unchanged.
    #[must_use]
    pub const fn is_passthrough(self) -> bool {
        !matches!(self, Self::Converted)
    }

    /// Stable string form for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Converted => "converted",
            Self::AlreadyCanonical => "already_canonical",
            Self::NotAnImage => "not_an_image",
            Self::Failed => "failed",
        }
    }
}

/// A normalized (or passed-through) image.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Content type of `bytes`. Canonical unless normalization was skipped.
    pub content_type: String,
    /// What happened.
    pub outcome: NormalizeOutcome,
}

impl NormalizedImage {
    fn passthrough(bytes: Vec<u8>, content_type: &str, outcome: NormalizeOutcome) -> Self {
        Self {
            bytes,
            content_type: content_type.to_string(),
            outcome,
        }
    }
}

/// Normalize uploaded bytes to the canonical image encoding.
///
/// - Non-image declared types pass through untouched.
/// - Already-canonical input passes through untouched, which makes the
///   function idempotent.
/// - Everything else is decoded and re-encoded as lossy WebP at
///   [`WEBP_QUALITY`].
/// - Decode/encode failures are logged and pass the original through.
///
/// Pure function over its inputs; CPU-bound, so async callers should run it
/// via `spawn_blocking`.
#[must_use]
pub fn normalize(bytes: Vec<u8>, declared_content_type: &str) -> NormalizedImage {
    if !declared_content_type.starts_with("image/") {
        return NormalizedImage::passthrough(
            bytes,
            declared_content_type,
            NormalizeOutcome::NotAnImage,
        );
    }

    if declared_content_type == CANONICAL_CONTENT_TYPE {
        return NormalizedImage::passthrough(
            bytes,
            declared_content_type,
            NormalizeOutcome::AlreadyCanonical,
        );
    }

    let decoded = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!(
                declared_content_type = %declared_content_type,
                error = %e,
                "image decode failed, storing original bytes"
            );
            return NormalizedImage::passthrough(
                bytes,
                declared_content_type,
                NormalizeOutcome::Failed,
            );
        }
    };

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), width, height);

    match encoder.encode_simple(false, WEBP_QUALITY) {
        Ok(encoded) => NormalizedImage {
            bytes: encoded.to_vec(),
            content_type: CANONICAL_CONTENT_TYPE.to_string(),
            outcome: NormalizeOutcome::Converted,
        },
        Err(e) => {
            warn!(
                declared_content_type = %declared_content_type,
                error = ?e,
                "webp encode failed, storing original bytes"
            );
            NormalizedImage::passthrough(bytes, declared_content_type, NormalizeOutcome::Failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A small solid-red PNG, encoded in memory.
    fn red_png(size: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(size, size, image::Rgb([255, 0, 0]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("png encode");
        bytes
    }

    #[test]
    fn test_png_converts_to_webp() {
        let png = red_png(100);
        let result = normalize(png, "image/png");

        assert_eq!(result.outcome, NormalizeOutcome::Converted);
        assert_eq!(result.content_type, CANONICAL_CONTENT_TYPE);
        // RIFF....WEBP container magic.
        assert_eq!(&result.bytes[..4], b"RIFF");
        assert_eq!(&result.bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let png = red_png(64);
        let once = normalize(png, "image/png");
        let twice = normalize(once.bytes.clone(), &once.content_type);

        assert_eq!(twice.outcome, NormalizeOutcome::AlreadyCanonical);
        assert_eq!(twice.bytes, once.bytes);
        assert_eq!(twice.content_type, once.content_type);
    }

    #[test]
    fn test_non_image_passes_through() {
        let bytes = b"%PDF-1.7 not an image".to_vec();
        let result = normalize(bytes.clone(), "application/pdf");

        assert_eq!(result.outcome, NormalizeOutcome::NotAnImage);
        assert_eq!(result.bytes, bytes);
        assert_eq!(result.content_type, "application/pdf");
    }

    #[test]
    fn test_undecodable_image_fails_open() {
        let bytes = b"definitely not a png".to_vec();
        let result = normalize(bytes.clone(), "image/png");

        assert_eq!(result.outcome, NormalizeOutcome::Failed);
        assert_eq!(result.bytes, bytes);
        assert_eq!(result.content_type, "image/png");
    }

    #[test]
    fn test_empty_bytes_fail_open() {
        let result = normalize(Vec::new(), "image/jpeg");

        assert_eq!(result.outcome, NormalizeOutcome::Failed);
        assert!(result.bytes.is_empty());
        assert_eq!(result.content_type, "image/jpeg");
    }

    #[test]
    fn test_truncated_png_fails_open() {
        let mut png = red_png(32);
        png.truncate(png.len() / 2);
        let result = normalize(png.clone(), "image/png");

        // Truncated data either fails decode or (rarely) decodes a partial
        // frame; either way the call must not panic. When it fails, the
        // original bytes come back untouched.
        if result.outcome == NormalizeOutcome::Failed {
            assert_eq!(result.bytes, png);
        }
    }
}
