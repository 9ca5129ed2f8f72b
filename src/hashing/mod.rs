use blake3::Hasher;

/// First 8 bytes of the BLAKE3 digest, little-endian.
///
/// Used for vector point ids and feature hashing. Collisions are possible but
/// negligible at corpus scale (~n² / 2^65); the full segment id is kept in the
/// point payload so a collision is detectable downstream.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Vector index point id for a segment. Stable across re-ingestion.
#[inline]
pub fn segment_point_id(segment_id: &str) -> u64 {
    hash_to_u64(segment_id.as_bytes())
}

/// Hashes a token into a feature slot; `namespace` keeps independent
/// projections from colliding.
#[inline]
pub fn hash_feature(namespace: &str, token: &str) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b"|");
    hasher.update(token.as_bytes());

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Hex BLAKE3 digest of stored content.
#[inline]
pub fn content_digest(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}
