//! API key construction and verification
//!
//! Keys are opaque dotted strings `version.id.metadata.signature` where the
//! id is 64 bytes of OS entropy, metadata is URL-safe base64 JSON, and the
//! signature is HMAC-SHA256 over `id + "." + metadata` keyed by the
//! process API-key secret. Structural verification is independent of
//! whether the key is currently active; liveness is a store concern.

use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::secrets::{SecretPurpose, Secrets};
use crate::error::{GatewayError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Entropy of the random id segment, in bytes.
const KEY_ID_BYTES: usize = 64;

/// Self-describing metadata embedded in the key string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub created_at: i64,
}

/// A freshly issued key: the opaque id and the full handed-out string.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyMaterial {
    pub id: String,
    pub key: String,
}

/// The structurally verified parts of a presented key.
#[derive(Debug, Clone)]
pub struct VerifiedKey {
    pub id: String,
    pub version: String,
    pub metadata: KeyMetadata,
}

/// API key codec bound to the process signing secret.
pub struct ApiKeyCodec {
    secret: Vec<u8>,
    version: String,
}

impl ApiKeyCodec {
    #[must_use]
    pub fn new(secrets: &Secrets) -> Self {
        Self {
            secret: secrets.signing_secret_for(SecretPurpose::ApiKey).to_vec(),
            version: secrets.current_key_version().to_string(),
        }
    }

    /// Issue a new key.
    ///
    /// Uniqueness of the id is not re-checked here; at 512 bits of entropy
    /// a collision is negligible and the storage layer's unique constraint
    /// is the backstop.
    pub fn issue(&self) -> Result<ApiKeyMaterial> {
        let mut raw_id = [0u8; KEY_ID_BYTES];
        OsRng.fill_bytes(&mut raw_id);
        let id = URL_SAFE.encode(raw_id);

        let metadata = KeyMetadata {
            created_at: Utc::now().timestamp(),
        };
        let meta_bytes = serde_json::to_vec(&metadata).map_err(|e| {
            GatewayError::internal_with_source("failed to serialize key metadata", e)
        })?;
        let meta_encoded = URL_SAFE.encode(meta_bytes);

        let signature = self.sign(&id, &meta_encoded);
        let key = format!(
            "{}.{}.{}.{}",
            self.version,
            id,
            meta_encoded,
            URL_SAFE.encode(signature)
        );

        Ok(ApiKeyMaterial { id, key })
    }

    /// Verify a presented key string structurally: four parts, valid
    /// encodings, matching signature. The comparison is constant-time.
    pub fn verify(&self, key: &str) -> Result<VerifiedKey> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(GatewayError::key_malformed(
                "expected four dot-separated segments",
            ));
        }
        let (version, id, meta_encoded, sig_encoded) = (parts[0], parts[1], parts[2], parts[3]);

        let presented_sig = URL_SAFE
            .decode(sig_encoded)
            .map_err(|_| GatewayError::key_malformed("signature segment is not valid base64"))?;

        let expected_sig = self.sign(id, meta_encoded);
        let matches: bool = expected_sig.ct_eq(&presented_sig).into();
        if !matches {
            return Err(GatewayError::SignatureInvalid);
        }

        // only parsed after the signature has proven the bytes are ours
        let meta_bytes = URL_SAFE
            .decode(meta_encoded)
            .map_err(|_| GatewayError::key_malformed("metadata segment is not valid base64"))?;
        let metadata: KeyMetadata = serde_json::from_slice(&meta_bytes)
            .map_err(|_| GatewayError::key_malformed("metadata segment is not valid JSON"))?;

        Ok(VerifiedKey {
            id: id.to_string(),
            version: version.to_string(),
            metadata,
        })
    }

    fn sign(&self, id: &str, meta_encoded: &str) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any size");
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(meta_encoded.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> ApiKeyCodec {
        ApiKeyCodec::new(&Secrets::new("unused", "api-key-test-secret", "v1", "unused"))
    }

    #[test]
    fn issued_key_verifies_and_returns_embedded_id() {
        let codec = test_codec();
        let material = codec.issue().unwrap();

        assert!(material.key.starts_with("v1."));
        let verified = codec.verify(&material.key).unwrap();
        assert_eq!(verified.id, material.id);
        assert_eq!(verified.version, "v1");
        assert!(verified.metadata.created_at > 0);
    }

    #[test]
    fn ids_are_unique_across_issues() {
        let codec = test_codec();
        let a = codec.issue().unwrap();
        let b = codec.issue().unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let codec = test_codec();
        for bad in ["", "v1", "v1.abc", "v1.abc.def", "v1..def.sig", "a.b.c.d.e"] {
            assert!(
                matches!(
                    codec.verify(bad).unwrap_err(),
                    GatewayError::KeyMalformed { .. }
                ),
                "expected KeyMalformed for {bad:?}"
            );
        }
    }

    #[test]
    fn different_secret_fails_signature() {
        let issuer = test_codec();
        let other = ApiKeyCodec::new(&Secrets::new("unused", "other-secret", "v1", "unused"));

        let material = issuer.issue().unwrap();
        assert!(matches!(
            other.verify(&material.key).unwrap_err(),
            GatewayError::SignatureInvalid
        ));
    }

    #[test]
    fn mutating_id_or_metadata_invalidates_signature() {
        let codec = test_codec();
        let material = codec.issue().unwrap();
        let parts: Vec<&str> = material.key.split('.').collect();

        // flip one character at several positions across the id and
        // metadata segments, including both segment boundaries
        for segment in [1, 2] {
            let seg = parts[segment];
            for pos in [0, seg.len() / 2, seg.len() - 1] {
                let mut mutated = seg.to_string();
                let old = mutated.remove(pos);
                let replacement = if old == 'A' { 'B' } else { 'A' };
                mutated.insert(pos, replacement);

                let mut rebuilt = parts.clone();
                rebuilt[segment] = &mutated;
                let tampered = rebuilt.join(".");
                assert!(
                    matches!(
                        codec.verify(&tampered).unwrap_err(),
                        GatewayError::SignatureInvalid | GatewayError::KeyMalformed { .. }
                    ),
                    "tampered key verified: segment {segment} pos {pos}"
                );
            }
        }
    }
}
