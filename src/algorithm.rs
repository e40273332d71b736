//! Algorithm registry
//!
//! The closed set of digest algorithms a table can be built with, plus the
//! `all` selector that expands to every one of them.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Selector that expands to every supported algorithm
pub const ALL_SELECTOR: &str = "all";

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Shake128,
    Shake256,
    Blake2b,
    Blake2s,
    Ripemd160,
}

impl Algorithm {
    /// Every algorithm, in the order `all` processes them
    pub const ALL: [Algorithm; 17] = [
        Algorithm::Md5,
        Algorithm::Sha1,
        Algorithm::Sha224,
        Algorithm::Sha256,
        Algorithm::Sha384,
        Algorithm::Sha512,
        Algorithm::Sha512_224,
        Algorithm::Sha512_256,
        Algorithm::Sha3_224,
        Algorithm::Sha3_256,
        Algorithm::Sha3_384,
        Algorithm::Sha3_512,
        Algorithm::Shake128,
        Algorithm::Shake256,
        Algorithm::Blake2b,
        Algorithm::Blake2s,
        Algorithm::Ripemd160,
    ];

    /// Canonical lowercase identifier
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Sha512_224 => "sha512_224",
            Self::Sha512_256 => "sha512_256",
            Self::Sha3_224 => "sha3_224",
            Self::Sha3_256 => "sha3_256",
            Self::Sha3_384 => "sha3_384",
            Self::Sha3_512 => "sha3_512",
            Self::Shake128 => "shake_128",
            Self::Shake256 => "shake_256",
            Self::Blake2b => "blake2b",
            Self::Blake2s => "blake2s",
            Self::Ripemd160 => "ripemd160",
        }
    }

    /// Extendable-output functions have no natural digest size
    pub fn is_xof(self) -> bool {
        matches!(self, Self::Shake128 | Self::Shake256)
    }

    /// Raw digest size in bytes
    pub fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 | Self::Ripemd160 => 20,
            Self::Sha224 | Self::Sha512_224 | Self::Sha3_224 => 28,
            Self::Sha256 | Self::Sha512_256 | Self::Sha3_256 | Self::Blake2s => 32,
            Self::Sha384 | Self::Sha3_384 => 48,
            Self::Sha512 | Self::Sha3_512 | Self::Blake2b => 64,
            Self::Shake128 | Self::Shake256 => crate::hasher::XOF_OUTPUT_LEN,
        }
    }

    /// Length of the hex-encoded digest stored in the table
    pub fn hex_len(self) -> usize {
        self.output_len() * 2
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");

        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == normalized)
            .ok_or_else(|| Error::UnsupportedAlgorithm(s.to_string()))
    }
}

/// Every algorithm this build can digest with
pub fn supported_algorithms() -> &'static [Algorithm] {
    &Algorithm::ALL
}

/// Expand a selector into the algorithms to build with
///
/// `all` yields the whole registry; anything else must name exactly one
/// supported algorithm.
pub fn resolve(selector: &str) -> Result<Vec<Algorithm>> {
    if selector.trim().eq_ignore_ascii_case(ALL_SELECTOR) {
        return Ok(supported_algorithms().to_vec());
    }

    Ok(vec![selector.parse()?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_resolve_all() {
        let algorithms = resolve("all").unwrap();
        assert_eq!(algorithms.len(), Algorithm::ALL.len());
        assert_eq!(algorithms[0], Algorithm::Md5);
        assert!(algorithms.contains(&Algorithm::Ripemd160));
    }

    #[test]
    fn test_resolve_single() {
        assert_eq!(resolve("md5").unwrap(), vec![Algorithm::Md5]);
        assert_eq!(resolve("SHA3-256").unwrap(), vec![Algorithm::Sha3_256]);
        assert_eq!(resolve("shake_128").unwrap(), vec![Algorithm::Shake128]);
        assert_eq!(resolve("RIPEMD160").unwrap(), vec![Algorithm::Ripemd160]);
    }

    #[test]
    fn test_resolve_unknown() {
        let err = resolve("crc32").unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(ref name) if name == "crc32"));
    }

    #[test]
    fn test_names_round_trip() {
        for alg in Algorithm::ALL {
            assert_eq!(alg.name().parse::<Algorithm>().unwrap(), alg);
        }
    }

    #[test]
    fn test_registry_has_no_duplicates() {
        let unique: HashSet<_> = supported_algorithms().iter().collect();
        assert_eq!(unique.len(), supported_algorithms().len());
    }

    #[test]
    fn test_xof_width() {
        assert!(Algorithm::Shake256.is_xof());
        assert!(!Algorithm::Sha256.is_xof());
        assert_eq!(Algorithm::Shake128.hex_len(), 64);
    }
}
