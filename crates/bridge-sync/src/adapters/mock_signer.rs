//! Deterministic signer for tests and dev mode.

use bridge_crypto::keccak256;
use bridge_types::{BridgeError, Hash};

use crate::ports::Signer;

/// Signs by hashing `key ‖ digest`. Not a real signature scheme.
pub struct MockSigner {
    key: [u8; 32],
    should_fail: bool,
}

impl MockSigner {
    /// Signer with a fixed key.
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            key,
            should_fail: false,
        }
    }

    /// Signer that always fails.
    pub fn failing() -> Self {
        Self {
            key: [0u8; 32],
            should_fail: true,
        }
    }
}

impl Signer for MockSigner {
    fn sign(&self, digest: &Hash) -> Result<Vec<u8>, BridgeError> {
        if self.should_fail {
            return Err(BridgeError::TransientIo("signer unavailable".into()));
        }
        let mut preimage = self.key.to_vec();
        preimage.extend_from_slice(digest);
        Ok(keccak256(&preimage).to_vec())
    }
}
