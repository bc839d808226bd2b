//! SHA-256 content hashing and Blake2b checksums.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use blake2::digest::consts::U32;
use blake2::Blake2b;
use notary_types::Digest;
use sha2::{Digest as _, Sha256};

use crate::HashError;

type Blake2b256 = Blake2b<U32>;

/// Read size used when streaming input through the hasher.
pub const CHUNK_SIZE: usize = 4096;

/// Incremental SHA-256 hasher producing a [`Digest`].
#[derive(Clone, Default)]
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(self) -> Digest {
        Digest::new(self.inner.finalize().into())
    }
}

/// Compute the SHA-256 digest of a byte slice.
///
/// Large inputs are fed to the hasher in [`CHUNK_SIZE`] pieces.
pub fn digest(bytes: &[u8]) -> Digest {
    let mut hasher = ContentHasher::new();
    for chunk in bytes.chunks(CHUNK_SIZE) {
        hasher.update(chunk);
    }
    hasher.finalize()
}

/// Stream a reader through SHA-256 in [`CHUNK_SIZE`] reads.
pub fn digest_reader<R: Read>(mut reader: R) -> std::io::Result<Digest> {
    let mut hasher = ContentHasher::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// Fingerprint a file on disk.
///
/// Fails with [`HashError::NotFound`] when the path does not exist and with
/// [`HashError::Io`] on any other open or read failure.
pub fn digest_file(path: impl AsRef<Path>) -> Result<Digest, HashError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(HashError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => HashError::NotFound(path.to_path_buf()),
        _ => HashError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let digest = digest_reader(file).map_err(|source| HashError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), %digest, "hashed file");
    Ok(digest)
}

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}
