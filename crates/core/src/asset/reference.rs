//! Stored asset references and read-time resolution.
//!
//! Two historical shapes coexist on parent entities (store, product):
//! the canonical object-store key, and fully-qualified absolute URLs
//! captured before the key-based scheme existed. The relational layer
//! persists them as two nullable columns; this module collapses that
//! two-column shape into one tagged value at the read boundary, and turns
//! it back into a usable URL on every render.
//!
//! Resolution is pure string logic: it runs fresh on every read (the
//! public-domain mapping is deployment configuration, not data), performs
//! no I/O, and cannot fail. Whether the URL is actually reachable is the
//! rendering layer's problem.

use crate::storage::ObjectStore;

/// The durable representation of one stored image.
///
/// A reference is in exactly one form, distinguished solely by whether the
/// stored string begins with an HTTP scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetReference {
    /// An opaque object-store key under the fixed upload prefix.
    /// Canonical form going forward.
    Key(String),
    /// A pre-migration absolute URL, already usable as-is.
    LegacyUrl(String),
}

impl AssetReference {
    /// Parse a raw stored string into its reference form.
    ///
    /// Empty input means no asset is configured and yields `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with("http") {
            Some(Self::LegacyUrl(raw.to_string()))
        } else {
            Some(Self::Key(raw.to_string()))
        }
    }

    /// Collapse the two-column schema into one reference.
    ///
    /// The key column wins when present; otherwise the legacy URL column is
    /// parsed (during the transition some rows stored bare keys in the URL
    /// column, so it goes through [`parse`](Self::parse) rather than being
    /// assumed to be a URL).
    #[must_use]
    pub fn from_columns(key: Option<&str>, legacy_url: Option<&str>) -> Option<Self> {
        match key {
            Some(k) if !k.is_empty() => Some(Self::Key(k.to_string())),
            _ => legacy_url.and_then(Self::parse),
        }
    }

    /// Resolve this reference into a URL a client can load immediately.
    ///
    /// Keys are turned into permanent public URLs; legacy URLs are returned
    /// verbatim, byte-for-byte, never re-derived or validated for liveness.
    #[must_use]
    pub fn resolve(&self, store: &ObjectStore) -> String {
        match self {
            Self::Key(key) => store.public_url(key),
            Self::LegacyUrl(url) => url.clone(),
        }
    }
}

/// Resolve an optional reference; `None` means the caller renders a
/// placeholder slot.
#[must_use]
pub fn resolve_reference(reference: Option<&AssetReference>, store: &ObjectStore) -> Option<String> {
    reference.map(|r| r.resolve(store))
}
