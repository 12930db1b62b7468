//! # etalon-core — Foundational Types for the Etalon Stack
//!
//! This crate is the bedrock of the Etalon stack. It defines the primitives
//! every other crate in the workspace builds on; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `ObservableId`, `SourceId`,
//!    `EndpointId`, `RecordId` — no bare strings crossing crate boundaries.
//!
//! 2. **`CanonicalBytes` newtype.** All record-digest computation flows
//!    through `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for
//!    digests, ever. Verbatim file content is hashed through the separate,
//!    explicitly named raw-content functions in [`digest`].
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type stores UTC instants and
//!    renders `YYYY-MM-DDTHH:MM:SSZ`. Snapshot data arrives in many shapes,
//!    so parsing is lenient (offsets converted, naive datetimes and bare
//!    dates read as UTC) while output stays strict.
//!
//! 4. **SHA-256 only.** The digest algorithm tag exists so every manifest and
//!    status document names its algorithm explicitly; there is exactly one.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `etalon-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize` where they cross a document boundary.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{
    sha256_digest, sha256_digest_file, sha256_hex, sha256_hex_bytes, sha256_hex_file,
    ContentDigest, DigestAlgorithm,
};
pub use error::EtalonError;
pub use identity::{EndpointId, ObservableId, RecordId, SourceId};
pub use temporal::Timestamp;
