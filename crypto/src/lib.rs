//! Content hashing for the notary ledger.
//!
//! - **SHA-256** for file fingerprints and block hashes, streamed in fixed-size
//!   chunks so memory use is bounded regardless of input size
//! - **Blake2b** for snapshot integrity checksums

pub mod error;
pub mod hash;

pub use error::HashError;
pub use hash::{blake2b_256, digest, digest_file, digest_reader, ContentHasher, CHUNK_SIZE};
