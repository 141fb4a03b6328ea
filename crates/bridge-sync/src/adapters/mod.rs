//! # Adapters
//!
//! In-memory implementations of the outbound ports, used by tests and by the
//! runtime's dev mode.

mod memory_ledger;
mod memory_registry;
mod memory_store;
mod mock_signer;

pub use memory_ledger::MemoryLedger;
pub use memory_registry::MemoryRegistry;
pub use memory_store::MemoryStore;
pub use mock_signer::MockSigner;
