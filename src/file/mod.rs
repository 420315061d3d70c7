//! File I/O operations for HCL documents.
//!
//! This module provides functionality to load HCL files from disk or stdin,
//! and to write HCL trees to any sink or back to files with atomic write
//! operations and optional backups.

pub mod loader;
pub mod saver;
