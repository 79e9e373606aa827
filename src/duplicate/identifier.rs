//! UUID-shaped identifiers
//!
//! An [`Identifier`] is 16 bytes taken from an MD5 digest, with the version
//! and variant fields stamped so the rendered form looks like an ordinary
//! version-4 UUID:
//!
//! ```text
//! 3b5d5c37-1a6f-4e1b-9c1f-0b2f6a9d8e11
//! ```
//!
//! Identifiers are built either from content ([`Identifier::from_bytes`]) or,
//! when there is no content to hash, from an explicitly owned
//! [`EntropySource`] ([`Identifier::random`]).
//!
//! # Example
//!
//! ```rust
//! use image_dupe::duplicate::identifier::{EntropySource, Identifier};
//!
//! let a = Identifier::from_bytes(b"000000");
//! let b = Identifier::from_bytes(b"000000");
//! assert_eq!(a, b);
//! assert_eq!(a.to_string().len(), 36);
//!
//! let mut entropy = EntropySource::seeded(7);
//! let run_id = Identifier::random(&mut entropy);
//! assert_eq!(run_id.version(), 4);
//! ```

use md5::{Digest, Md5};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of an identifier in bytes
pub const IDENTIFIER_LEN: usize = 16;

/// Length of the rendered, hyphenated form
pub const RENDERED_LEN: usize = 36;

/// Version stamped into every identifier
const VERSION: u8 = 4;

/// Byte offsets after which a hyphen is rendered (4-2-2-2-6 grouping)
const GROUP_ENDS: [usize; 4] = [4, 6, 8, 10];

/// Variant field values (byte 8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Reserved for NCS compatibility
    Ncs,
    /// The layout specified in RFC 4122
    Rfc4122,
    /// Reserved for Microsoft compatibility
    Microsoft,
    /// Reserved for future definition
    Future,
}

/// A 16-byte identifier rendered as a hyphenated hex string
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; IDENTIFIER_LEN]);

impl Identifier {
    /// Build an identifier from arbitrary content.
    ///
    /// The content is digested with MD5 and stamped as a version-4,
    /// RFC 4122 identifier. Equal input always gives an equal identifier.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut hasher = ContentHasher::new();
        hasher.update(bytes);
        hasher.finish()
    }

    fn from_digest(digest: &[u8]) -> Self {
        let mut raw = [0u8; IDENTIFIER_LEN];
        raw.copy_from_slice(&digest[..IDENTIFIER_LEN]);

        let mut id = Self(raw);
        id.set_variant(Variant::Rfc4122);
        id.set_version(VERSION);
        id
    }

    /// Build an identifier when there is no content to hash.
    ///
    /// Three non-negative 31-bit values are drawn from `entropy` and hashed
    /// exactly like content, so the result has the same shape as any other
    /// identifier.
    pub fn random(entropy: &mut EntropySource) -> Self {
        let mut buf = String::new();
        for _ in 0..3 {
            buf.push_str(&entropy.next_i31().to_string());
        }
        Self::from_bytes(buf.as_bytes())
    }

    /// Raw bytes, after stamping
    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        &self.0
    }

    /// The version nibble (high half of byte 6)
    pub fn version(&self) -> u8 {
        self.0[6] >> 4
    }

    /// Decode the variant field from byte 8
    pub fn variant(&self) -> Variant {
        let b = self.0[8];
        if b & 0x80 == 0 {
            Variant::Ncs
        } else if b & 0x40 == 0 {
            Variant::Rfc4122
        } else if b & 0x20 == 0 {
            Variant::Microsoft
        } else {
            Variant::Future
        }
    }

    fn set_variant(&mut self, variant: Variant) {
        let b = &mut self.0[8];
        match variant {
            Variant::Ncs => *b &= 0x7f,
            Variant::Rfc4122 => *b = (*b & 0x3f) | 0x80,
            Variant::Microsoft => *b = (*b & 0x1f) | 0xc0,
            Variant::Future => *b = (*b & 0x1f) | 0xe0,
        }
    }

    fn set_version(&mut self, version: u8) {
        self.0[6] = (self.0[6] & 0x0f) | (version << 4);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if GROUP_ENDS.contains(&i) {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self)
    }
}

/// Returned when a string is not a rendered identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierParseError(String);

impl fmt::Display for IdentifierParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid identifier: '{}'", self.0)
    }
}

impl std::error::Error for IdentifierParseError {}

impl FromStr for Identifier {
    type Err = IdentifierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || IdentifierParseError(s.to_string());

        if s.len() != RENDERED_LEN {
            return Err(err());
        }

        // Hyphens sit at 8, 13, 18, 23 in the rendered form
        let bytes = s.as_bytes();
        for pos in [8, 13, 18, 23] {
            if bytes[pos] != b'-' {
                return Err(err());
            }
        }

        let hex: Vec<u8> = bytes.iter().copied().filter(|&c| c != b'-').collect();
        // from_str_radix alone would accept a leading '+'
        if hex.len() != IDENTIFIER_LEN * 2 || !hex.iter().all(u8::is_ascii_hexdigit) {
            return Err(err());
        }

        let mut raw = [0u8; IDENTIFIER_LEN];
        for (i, chunk) in hex.chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| err())?;
            raw[i] = u8::from_str_radix(pair, 16).map_err(|_| err())?;
        }

        Ok(Self(raw))
    }
}

impl Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Incremental form of [`Identifier::from_bytes`].
///
/// Feeding the same bytes in any number of `update` calls gives the same
/// identifier as one `from_bytes` call over their concatenation.
#[derive(Clone, Default)]
pub struct ContentHasher {
    digest: Md5,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.digest.update(bytes);
    }

    pub fn finish(self) -> Identifier {
        Identifier::from_digest(&self.digest.finalize())
    }
}

/// Explicitly owned randomness for content-free identifiers.
///
/// Create one at process start and pass it down by reference. Tests use
/// [`EntropySource::seeded`] for reproducible output.
#[derive(Debug)]
pub struct EntropySource {
    rng: StdRng,
}

impl EntropySource {
    /// Seed from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seed with a fixed value
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `0` means "no fixed seed"
    pub fn from_config_seed(seed: u64) -> Self {
        if seed == 0 {
            Self::from_entropy()
        } else {
            Self::seeded(seed)
        }
    }

    /// Next value in `0..2^31`
    fn next_i31(&mut self) -> i32 {
        (self.rng.gen::<u32>() >> 1) as i32
    }
}
