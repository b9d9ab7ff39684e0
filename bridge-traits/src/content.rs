//! Remote Content Resolution
//!
//! Trait for the external service that turns a content identifier into a
//! playable asset. The engine never talks to the network directly; the host
//! wires in an implementation (HTTP API client, sync service, fixture set).

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The playable form of a resolved asset.
///
/// Some services hand back the bytes directly, others a URL the renderer
/// streams from. Both shapes flow through the cache unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AssetPayload {
    /// Raw asset bytes, ready to hand to the renderer.
    Blob(#[serde(with = "blob_serde")] Bytes),
    /// A resolved URL the renderer can stream from.
    Url(String),
}

impl AssetPayload {
    /// Size used for cache budget accounting.
    pub fn size_bytes(&self) -> u64 {
        match self {
            AssetPayload::Blob(data) => data.len() as u64,
            AssetPayload::Url(url) => url.len() as u64,
        }
    }

    /// Returns `true` for payloads no renderer could display: an empty blob
    /// or a blank URL.
    pub fn is_empty(&self) -> bool {
        match self {
            AssetPayload::Blob(data) => data.is_empty(),
            AssetPayload::Url(url) => url.trim().is_empty(),
        }
    }
}

/// A successfully resolved asset: payload plus the MIME type the renderer
/// needs to pick a viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAsset {
    pub payload: AssetPayload,
    pub mime_type: String,
}

/// External content-resolution collaborator.
///
/// May fail with [`BridgeError::NotFound`](crate::error::BridgeError::NotFound)
/// when the content record has no asset, or
/// [`BridgeError::Network`](crate::error::BridgeError::Network) when the
/// service is unreachable.
#[cfg_attr(feature = "test-util", mockall::automock)]
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Resolve the primary asset for a content record.
    async fn resolve_asset(&self, content_id: &str) -> Result<ResolvedAsset>;
}

mod blob_serde {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(data)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let raw = Vec::<u8>::deserialize(deserializer)?;
        Ok(Bytes::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_size_accounting() {
        let blob = AssetPayload::Blob(Bytes::from_static(b"abcd"));
        assert_eq!(blob.size_bytes(), 4);

        let url = AssetPayload::Url("https://cdn.example/a.pdf".to_string());
        assert_eq!(url.size_bytes(), 25);
    }

    #[test]
    fn empty_payloads_detected() {
        assert!(AssetPayload::Blob(Bytes::new()).is_empty());
        assert!(AssetPayload::Url("   ".to_string()).is_empty());
        assert!(!AssetPayload::Blob(Bytes::from_static(b"x")).is_empty());
        assert!(!AssetPayload::Url("https://x".to_string()).is_empty());
    }
}
