//! Duplicate detection module
//!
//! The core of the tool: turning decoded pixels into fingerprints, and
//! tracking which file first produced each fingerprint.
//!
//! # Submodules
//!
//! - `identifier` - UUID-shaped identifiers and the entropy source
//! - `fingerprint` - Pixel traversal and fingerprint generation
//! - `detector` - The first-wins duplicate index

pub mod detector;
pub mod fingerprint;
pub mod identifier;

pub use detector::{DuplicateIndex, IndexStats, RecordOutcome};
pub use fingerprint::{fingerprint, fingerprint_image, Bounds, Fingerprint, PixelSource, Translated};
pub use identifier::{EntropySource, Identifier};
