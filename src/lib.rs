//! Image Duplicate Finder Library
//!
//! Finds images whose pixel content is identical, even when their filenames
//! or encodings differ. A PNG and a BMP of the same pixels are duplicates;
//! two images that differ in a single RGB value are not. Alpha is ignored.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`duplicate`] - Fingerprints and the first-wins duplicate index
//! - [`core`] - Configuration, error handling, and the folder scanner
//! - [`cli`] - Command-line interface (only used by the binary)
//!
//! # Example Usage
//!
//! ```rust
//! use image::{Rgb, RgbImage, DynamicImage};
//! use image_dupe::duplicate::{fingerprint_image, DuplicateIndex, RecordOutcome};
//!
//! let original = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([0, 0, 0])));
//! let reencoded = original.clone();
//!
//! let mut index = DuplicateIndex::new();
//! index.record(fingerprint_image(&original), "image1.png");
//!
//! match index.record(fingerprint_image(&reencoded), "image2.bmp") {
//!     RecordOutcome::Duplicate { original } => assert_eq!(original.to_str(), Some("image1.png")),
//!     RecordOutcome::New => unreachable!(),
//! }
//! ```
//!
//! # Scanning Folders
//!
//! ```rust,no_run
//! use image_dupe::core::config::ScanConfig;
//! use image_dupe::core::scanner::Scanner;
//! use image_dupe::duplicate::EntropySource;
//! use std::sync::atomic::AtomicBool;
//!
//! let mut entropy = EntropySource::from_entropy();
//! let shutdown = AtomicBool::new(false);
//! let report = Scanner::new(ScanConfig::new().with_folder("./photos"))
//!     .run(&mut entropy, &shutdown, |_| {})
//!     .unwrap();
//! println!("{} duplicate(s)", report.duplicates.len());
//! ```
//!
//! # Features
//!
//! - **Exact pixel matching** - RGB content only, independent of container
//! - **First-wins** - the first file seen with given pixels is the original
//! - **Non-recursive** - only files directly inside each folder are checked
//! - **PNG, JPEG and BMP** - decoders tried in that order

pub mod cli;
pub mod core;
pub mod duplicate;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
