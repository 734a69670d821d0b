//! Content fingerprints for change detection.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 over the canonical JSON form of a value.
///
/// Object keys are sorted before hashing, so two outputs that differ only
/// in key order share a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineFingerprint(String);

impl PipelineFingerprint {
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        // Round-tripping through Value sorts object keys
        let canonical = serde_json::to_value(value)?;
        let bytes = serde_json::to_vec(&canonical)?;
        Ok(Self::of_bytes(&bytes))
    }

    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        PipelineFingerprint(format!("{:x}", hasher.finalize()))
    }

    /// Full lowercase hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, for ids and logs.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl std::fmt::Display for PipelineFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_matter() {
        let a: serde_json::Value = serde_json::from_str(r#"{"b": 1, "a": [1, 2]}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"a": [1, 2], "b": 1}"#).unwrap();
        assert_eq!(PipelineFingerprint::of(&a).unwrap(), PipelineFingerprint::of(&b).unwrap());
        assert_ne!(
            PipelineFingerprint::of(&a).unwrap(),
            PipelineFingerprint::of(&json!({"a": [2, 1], "b": 1})).unwrap()
        );
    }

    #[test]
    fn digest_format() {
        let fingerprint = PipelineFingerprint::of_bytes(b"");
        assert_eq!(
            fingerprint.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(fingerprint.short(), "e3b0c44298fc");
        assert_eq!(fingerprint.to_string(), "e3b0c44298fc");
    }
}
