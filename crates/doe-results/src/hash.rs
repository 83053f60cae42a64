//! Content-based hashing for case IDs.

use doe_params::{MeshCounts, MeshSpacingRecord};
use sha2::{Digest, Sha256};

/// Id of a case: identical inputs on the same host give the same id.
pub fn compute_case_id(
    mesh: &MeshCounts,
    spacing: &MeshSpacingRecord,
    iterations: u32,
    host_tag: &str,
) -> String {
    let mut hasher = Sha256::new();

    let mesh_json = serde_json::to_string(mesh).unwrap_or_default();
    hasher.update(mesh_json.as_bytes());

    let spacing_json = serde_json::to_string(spacing).unwrap_or_default();
    hasher.update(spacing_json.as_bytes());

    hasher.update(iterations.to_le_bytes());
    hasher.update(host_tag.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
