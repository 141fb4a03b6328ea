//! Hex rendering and parsing. Hashes render as `0x`-prefixed lowercase hex.

use crate::errors::{Address, BridgeError, Hash};

/// Render bytes as `0x`-prefixed lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Render a 32-byte hash.
pub fn hash_to_hex(hash: &Hash) -> String {
    to_hex(hash)
}

/// Parse a hex string with optional `0x` prefix.
///
/// Odd-length or non-hex input fails with `Decode`, never truncates.
pub fn parse_bytes(s: &str) -> Result<Vec<u8>, BridgeError> {
    let stripped = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(stripped).map_err(|e| BridgeError::Decode(format!("invalid hex {s:?}: {e}")))
}

/// Parse exactly 32 bytes of hex.
pub fn parse_hash(s: &str) -> Result<Hash, BridgeError> {
    parse_fixed::<32>(s)
}

/// Parse exactly 20 bytes of hex.
pub fn parse_address(s: &str) -> Result<Address, BridgeError> {
    parse_fixed::<20>(s)
}

fn parse_fixed<const N: usize>(s: &str) -> Result<[u8; N], BridgeError> {
    let bytes = parse_bytes(s)?;
    bytes.as_slice().try_into().map_err(|_| {
        BridgeError::Decode(format!("expected {} bytes, got {} in {s:?}", N, bytes.len()))
    })
}

/// Right-most 20 bytes of a 32-byte topic (left-padded address).
pub fn topic_to_address(topic: &Hash) -> Address {
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&topic[12..]);
    addr
}

/// Serde adapter rendering fixed-width byte arrays as `0x` hex strings.
///
/// ```rust,ignore
/// #[serde(with = "bridge_types::hex::serde_hex")]
/// pub bridge_core: Address,
/// ```
pub mod serde_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as `0x` hex.
    pub fn serialize<S: Serializer, const N: usize>(bytes: &[u8; N], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::to_hex(bytes))
    }

    /// Deserialize from hex with optional `0x` prefix.
    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(d: D) -> Result<[u8; N], D::Error> {
        let text = String::deserialize(d)?;
        super::parse_fixed::<N>(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ZERO_ROOT;

    #[test]
    fn test_zero_root_rendering() {
        assert_eq!(
            hash_to_hex(&ZERO_ROOT),
            "0x0000000000000000000000000000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn test_parse_hash_roundtrip_with_and_without_prefix() {
        let h = [0x5Au8; 32];
        let s = hash_to_hex(&h);
        assert_eq!(parse_hash(&s).unwrap(), h);
        assert_eq!(parse_hash(&s[2..]).unwrap(), h);
    }

    #[test]
    fn test_parse_rejects_odd_length() {
        assert!(matches!(parse_bytes("0xabc"), Err(BridgeError::Decode(_))));
    }

    #[test]
    fn test_parse_rejects_wrong_width() {
        assert!(parse_hash("0xabcd").is_err());
        assert!(parse_address(&to_hex(&[1u8; 32])).is_err());
    }

    #[test]
    fn test_serde_hex_roundtrip() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Holder {
            #[serde(with = "serde_hex")]
            addr: Address,
        }
        let json = serde_json::to_string(&Holder { addr: [0x11u8; 20] }).unwrap();
        assert_eq!(json, format!("{{\"addr\":\"0x{}\"}}", "11".repeat(20)));
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.addr, [0x11u8; 20]);
        assert!(serde_json::from_str::<Holder>("{\"addr\":\"0x11\"}").is_err());
    }

    #[test]
    fn test_topic_to_address() {
        let mut topic = [0u8; 32];
        topic[12..].copy_from_slice(&[7u8; 20]);
        assert_eq!(topic_to_address(&topic), [7u8; 20]);
    }
}
