//! # Bridge Relayer Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── merkle_benchmarks.rs   # Tree build / proof / verify throughput
//! └── src/integration/
//!     ├── fixtures.rs            # Two in-memory chains, root tables, store
//!     ├── snapshot_flow.rs       # Submit -> build -> commit -> reconcile -> prove
//!     ├── relay_flow.rs          # Relay loops on both sides into one store
//!     └── confirmation_flow.rs   # Approval submission and finality tracking
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bridge-tests
//! cargo bench -p bridge-tests
//! ```

pub mod integration;
