//! Core functionality module
//!
//! This module contains the parts of the duplicate finder that sit around
//! the fingerprinting core: configuration, error handling, and the scanner
//! that walks folders and feeds files to the duplicate index.
//!
//! # Submodules
//!
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types and result aliases
//! - `scanner` - Folder listing, decoding, and the scan loop

pub mod config;
pub mod error;
pub mod scanner;
