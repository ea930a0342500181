//! Digest service
//!
//! Hashes payloads into hex content addresses. The algorithm is
//! chosen at store creation and persisted in the manifest so a
//! reloaded store hashes identically. SHA-1 is the default for
//! address compactness, not adversarial resistance.

use std::io::Read;
use std::str::FromStr;

use sha1::{Digest, Sha1};
use sha2::Sha256;

use tessera_errors::{io_error, Result, TessError};

/// Content hash algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// Name persisted in the store manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }

    /// Hex digest of an in-memory buffer
    pub fn hex_digest(&self, bytes: &[u8]) -> String {
        match self {
            DigestAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
            DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
        }
    }

    /// Hex digest of a byte stream, without buffering it whole
    pub fn hex_digest_reader<R: Read>(&self, reader: R, origin: &str) -> Result<String> {
        let raw = match self {
            DigestAlgorithm::Sha1 => hash_reader::<Sha1, R>(reader),
            DigestAlgorithm::Sha256 => hash_reader::<Sha256, R>(reader),
        }
        .map_err(|e| io_error("digest_stream", origin.to_string(), e))?;
        Ok(hex::encode(raw))
    }
}

impl FromStr for DigestAlgorithm {
    type Err = TessError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" => Ok(DigestAlgorithm::Sha256),
            _ => Err(TessError::UnknownAlgorithm {
                name: name.to_string(),
            }),
        }
    }
}

fn hash_reader<D: Digest, R: Read>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_is_default_and_40_hex_chars() {
        let algo = DigestAlgorithm::default();
        assert_eq!(algo, DigestAlgorithm::Sha1);
        assert_eq!(algo.hex_digest(b"abc").len(), 40);
    }

    #[test]
    fn test_known_sha1_vector() {
        // sha1("abc")
        assert_eq!(
            DigestAlgorithm::Sha1.hex_digest(b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_known_sha256_vector() {
        // sha256("abc")
        assert_eq!(
            DigestAlgorithm::Sha256.hex_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_reader_digest_matches_buffer_digest() {
        let payload = vec![7u8; 100_000];
        let from_buf = DigestAlgorithm::Sha1.hex_digest(&payload);
        let from_reader = DigestAlgorithm::Sha1
            .hex_digest_reader(payload.as_slice(), "<mem>")
            .unwrap();
        assert_eq!(from_buf, from_reader);
    }

    #[test]
    fn test_parse_algorithm_names() {
        assert_eq!(
            "sha1".parse::<DigestAlgorithm>().unwrap(),
            DigestAlgorithm::Sha1
        );
        assert_eq!(
            "sha256".parse::<DigestAlgorithm>().unwrap(),
            DigestAlgorithm::Sha256
        );
        let err = "md5".parse::<DigestAlgorithm>().unwrap_err();
        assert_eq!(err.kind(), tessera_errors::TessErrorKind::InvalidInfo);
    }
}
