//! Content fingerprints for the artifact bundle.
//!
//! The classifier and its category vocabularies only make sense together: an encoder
//! from one training run paired with a forest from another silently corrupts every
//! prediction. The bundle is therefore fingerprinted as one unit and the fingerprint is
//! reported by the config and health endpoints.

use blake3::Hasher;

/// Hashes named artifact contents into a single hex fingerprint.
///
/// Each part is framed by its name and length, so moving bytes from one artifact into
/// another changes the result.
pub fn fingerprint_artifacts<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut hasher = Hasher::new();
    for (name, bytes) in parts {
        hasher.update(name.as_bytes());
        hasher.update(b"|");
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    hasher.finalize().to_hex().to_string()
}

/// Returns the first 12 hex characters, enough to tell bundles apart in logs.
#[inline]
pub fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}
