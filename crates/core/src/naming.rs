//! Object key naming.
//!
//! Every uploaded asset is keyed `uploads/{millis}-{sanitized_filename}`.
//! The millisecond timestamp gives approximate chronological ordering and
//! makes collisions practically impossible (two uploads of the same
//! sanitized name within the same millisecond are the only risk, which is
//! accepted). Sanitization guarantees the key is safe both as an object
//! store key and as a URL path segment.

/// Fixed prefix under which all uploaded assets live in the bucket.
pub const UPLOAD_PREFIX: &str = "uploads";

/// Replacement for characters outside the safe set.
const FILLER: char = '_';

/// Sanitize a filename for use in an object key.
///
/// Only ASCII alphanumeric characters, dots, hyphens, and underscores are
/// kept; everything else becomes an underscore.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                FILLER
            }
        })
        .collect()
}

/// Rewrite the extension of a filename.
///
/// The final `.ext` segment is replaced; a name without an extension gets
/// one appended. Used after normalization so a `photo.png` upload that was
/// re-encoded to WebP is keyed `photo.webp`, keeping content type and
/// extension consistent for downstream consumers that infer one from the
/// other.
#[must_use]
pub fn rewrite_extension(name: &str, ext: &str) -> String {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    format!("{stem}.{ext}")
}

/// Generate the object key for a new upload.
///
/// Format: `uploads/{millis}-{sanitized_filename}`. Callers pass the
/// post-normalization filename (extension already rewritten if the content
/// type changed).
#[must_use]
pub fn object_key(file_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let sanitized = sanitize_file_name(file_name);
    format!("{UPLOAD_PREFIX}/{millis}-{sanitized}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("logo.png"), "logo.png");
        assert_eq!(sanitize_file_name("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_file_name("loja@#$%.webp"), "loja____.webp");
        assert_eq!(sanitize_file_name("日本語.png"), "___.png");
    }

    #[test]
    fn test_rewrite_extension() {
        assert_eq!(rewrite_extension("logo.png", "webp"), "logo.webp");
        assert_eq!(rewrite_extension("archive.tar.gz", "webp"), "archive.tar.webp");
        assert_eq!(rewrite_extension("logo", "webp"), "logo.webp");
    }

    #[test]
    fn test_object_key_shape() {
        let key = object_key("banner.webp");
        let rest = key
            .strip_prefix("uploads/")
            .expect("key should start with the upload prefix");
        let (millis, name) = rest.split_once('-').expect("timestamp separator");
        assert!(millis.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(name, "banner.webp");
    }

    #[test]
    fn test_object_keys_are_chronologically_ordered() {
        let a = object_key("a.webp");
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = object_key("a.webp");
        assert!(a < b);
        assert_ne!(a, b);
    }
}
