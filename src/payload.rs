//! Payment payload codec.
//!
//! Payments carry a small fixed-layout binary record in the data output of the
//! funding transaction; the indexer on the receiving side parses it back to
//! credit the right creator. Layout (14-byte header, fixed order):
//!
//! ```text
//! [0]      version          (1 byte, currently 1)
//! [1..9]   creator id       (8 bytes)
//! [9]      payment kind     (1 byte)
//! [10..14] content id       (4 bytes, big-endian)
//! [14..]   metadata         (everything after the header, no length prefix)
//! ```

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use sha2::{Digest, Sha256};

/// Payload format version emitted by this codec.
pub const PAYLOAD_VERSION: u8 = 1;

/// Fixed header length: version + creator id + kind + content id.
pub const PAYLOAD_HEADER_LEN: usize = 14;

/// Length of a creator identifier in bytes (16 hex characters).
pub const CREATOR_ID_LEN: usize = 8;

/// What a payment is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    /// One-off tip to the creator.
    Tip,
    /// Pay-to-unlock of a single piece of content.
    Unlock,
    /// Subscription period payment.
    Subscription,
}

impl PaymentKind {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(PaymentKind::Tip),
            1 => Some(PaymentKind::Unlock),
            2 => Some(PaymentKind::Subscription),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            PaymentKind::Tip => 0,
            PaymentKind::Unlock => 1,
            PaymentKind::Subscription => 2,
        }
    }
}

impl std::str::FromStr for PaymentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tip" => Ok(PaymentKind::Tip),
            "unlock" => Ok(PaymentKind::Unlock),
            "subscription" | "sub" => Ok(PaymentKind::Subscription),
            other => bail!("Unknown payment kind: {other}"),
        }
    }
}

/// A decoded (or to-be-encoded) payment record.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPayload {
    pub version: u8,
    #[serde_as(as = "serde_with::hex::Hex")]
    pub creator_id: [u8; CREATOR_ID_LEN],
    pub kind: PaymentKind,
    pub content_id: u32,
    #[serde_as(as = "serde_with::hex::Hex")]
    pub metadata: Vec<u8>,
}

impl PaymentPayload {
    /// Create a payload for the given creator and kind, with version 1,
    /// content id 0 and empty metadata.
    ///
    /// Fails when `creator_hex` does not decode to exactly 8 bytes.
    pub fn new(creator_hex: &str, kind: PaymentKind) -> Result<Self> {
        let creator_id = parse_creator_id(creator_hex)?;
        Ok(Self {
            version: PAYLOAD_VERSION,
            creator_id,
            kind,
            content_id: 0,
            metadata: Vec::new(),
        })
    }

    pub fn with_content_id(mut self, content_id: u32) -> Self {
        self.content_id = content_id;
        self
    }

    pub fn with_metadata(mut self, metadata: impl Into<Vec<u8>>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Serialize to the fixed wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PAYLOAD_HEADER_LEN + self.metadata.len());
        buf.push(self.version);
        buf.extend_from_slice(&self.creator_id);
        buf.push(self.kind.as_byte());
        buf.extend_from_slice(&self.content_id.to_be_bytes());
        buf.extend_from_slice(&self.metadata);
        buf
    }

    /// Parse a payload from raw bytes.
    ///
    /// Fails closed: returns `None` when the buffer is shorter than the
    /// 14-byte header or the kind byte is not a known payment kind. The
    /// version byte is carried through as-is; there is no per-version layout
    /// dispatch, so callers must not assume layouts beyond version 1.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < PAYLOAD_HEADER_LEN {
            return None;
        }
        let version = bytes[0];
        let mut creator_id = [0u8; CREATOR_ID_LEN];
        creator_id.copy_from_slice(&bytes[1..1 + CREATOR_ID_LEN]);
        let kind = PaymentKind::from_byte(bytes[9])?;
        let content_id = u32::from_be_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);
        let metadata = bytes[PAYLOAD_HEADER_LEN..].to_vec();

        Some(Self {
            version,
            creator_id,
            kind,
            content_id,
            metadata,
        })
    }

    /// The creator id as the 16-char lowercase hex string used across the API.
    pub fn creator_id_hex(&self) -> String {
        hex::encode(self.creator_id)
    }

    /// Metadata reinterpreted as UTF-8, if it is valid UTF-8.
    pub fn metadata_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.metadata).ok()
    }
}

/// Parse a 16-hex-char creator identifier.
pub fn parse_creator_id(creator_hex: &str) -> Result<[u8; CREATOR_ID_LEN]> {
    let decoded = hex::decode(creator_hex.trim_start_matches("0x"))
        .map_err(|e| anyhow::anyhow!("Invalid creator id hex: {e}"))?;
    if decoded.len() != CREATOR_ID_LEN {
        bail!(
            "Creator id must decode to exactly {CREATOR_ID_LEN} bytes, got {}",
            decoded.len()
        );
    }
    let mut id = [0u8; CREATOR_ID_LEN];
    id.copy_from_slice(&decoded);
    Ok(id)
}

/// Derive a stable creator id from a display name (first 8 bytes of SHA-256).
pub fn creator_id_from_name(name: &str) -> [u8; CREATOR_ID_LEN] {
    let digest = Sha256::digest(name.as_bytes());
    let mut id = [0u8; CREATOR_ID_LEN];
    id.copy_from_slice(&digest[..CREATOR_ID_LEN]);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATOR: &str = "00ff12ab34cd56ef";

    #[test]
    fn test_round_trip_full() {
        let payload = PaymentPayload::new(CREATOR, PaymentKind::Unlock)
            .unwrap()
            .with_content_id(0xDEADBEEF)
            .with_metadata("episode-42".as_bytes());

        let bytes = payload.encode();
        assert_eq!(bytes.len(), PAYLOAD_HEADER_LEN + 10);

        let decoded = PaymentPayload::decode(&bytes).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decoded.creator_id_hex(), CREATOR);
        assert_eq!(decoded.metadata_utf8(), Some("episode-42"));
    }

    #[test]
    fn test_round_trip_defaults() {
        let payload = PaymentPayload::new(CREATOR, PaymentKind::Tip).unwrap();
        let bytes = payload.encode();

        // Defaults: version 1, content id 0, no metadata.
        assert_eq!(bytes.len(), PAYLOAD_HEADER_LEN);
        let decoded = PaymentPayload::decode(&bytes).unwrap();
        assert_eq!(decoded.version, PAYLOAD_VERSION);
        assert_eq!(decoded.content_id, 0);
        assert!(decoded.metadata.is_empty());
    }

    #[test]
    fn test_metadata_is_byte_exact() {
        let raw = vec![0u8, 1, 2, 255, 254, 0];
        let payload = PaymentPayload::new(CREATOR, PaymentKind::Subscription)
            .unwrap()
            .with_metadata(raw.clone());

        let decoded = PaymentPayload::decode(&payload.encode()).unwrap();
        assert_eq!(decoded.metadata, raw);
    }

    #[test]
    fn test_layout_is_fixed() {
        let payload = PaymentPayload::new(CREATOR, PaymentKind::Unlock)
            .unwrap()
            .with_content_id(0x01020304);
        let bytes = payload.encode();

        assert_eq!(bytes[0], 1); // version
        assert_eq!(&bytes[1..9], &hex::decode(CREATOR).unwrap()[..]);
        assert_eq!(bytes[9], 1); // unlock
        assert_eq!(&bytes[10..14], &[1, 2, 3, 4]); // big-endian content id
    }

    #[test]
    fn test_decode_short_buffer_is_none() {
        assert_eq!(PaymentPayload::decode(&[1, 2, 3]), None);
        assert_eq!(PaymentPayload::decode(&[]), None);
        // One byte short of the header.
        assert_eq!(PaymentPayload::decode(&[0u8; PAYLOAD_HEADER_LEN - 1]), None);
    }

    #[test]
    fn test_decode_exact_header_len() {
        let mut bytes = vec![0u8; PAYLOAD_HEADER_LEN];
        bytes[0] = 1;
        let decoded = PaymentPayload::decode(&bytes).unwrap();
        assert_eq!(decoded.kind, PaymentKind::Tip);
        assert!(decoded.metadata.is_empty());
    }

    #[test]
    fn test_decode_unknown_kind_is_none() {
        let mut bytes = PaymentPayload::new(CREATOR, PaymentKind::Tip)
            .unwrap()
            .encode();
        bytes[9] = 99;
        assert_eq!(PaymentPayload::decode(&bytes), None);
    }

    #[test]
    fn test_version_byte_carried_through() {
        let mut bytes = PaymentPayload::new(CREATOR, PaymentKind::Tip)
            .unwrap()
            .encode();
        bytes[0] = 7;
        let decoded = PaymentPayload::decode(&bytes).unwrap();
        assert_eq!(decoded.version, 7);
    }

    #[test]
    fn test_creator_id_wrong_length_fails() {
        // 6 bytes
        assert!(PaymentPayload::new("00ff12ab34cd", PaymentKind::Tip).is_err());
        // 9 bytes
        assert!(PaymentPayload::new("00ff12ab34cd56ef99", PaymentKind::Tip).is_err());
        // not hex at all
        assert!(PaymentPayload::new("not-hex-not-hex!", PaymentKind::Tip).is_err());
    }

    #[test]
    fn test_creator_id_accepts_0x_prefix() {
        let payload = PaymentPayload::new("0x00ff12ab34cd56ef", PaymentKind::Tip).unwrap();
        assert_eq!(payload.creator_id_hex(), CREATOR);
    }

    #[test]
    fn test_creator_id_from_name_is_stable() {
        let a = creator_id_from_name("alice");
        let b = creator_id_from_name("alice");
        let c = creator_id_from_name("bob");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("tip".parse::<PaymentKind>().unwrap(), PaymentKind::Tip);
        assert_eq!("SUB".parse::<PaymentKind>().unwrap(), PaymentKind::Subscription);
        assert!("gift".parse::<PaymentKind>().is_err());
    }
}
