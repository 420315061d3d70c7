//! hclquill reads and rewrites single values in HCL documents.
//!
//! A path such as `job[web].group[app].count` names a scalar inside nested
//! blocks. [`hclpath`] parses paths and walks documents, [`document`] reads
//! and prints HCL, [`file`] handles disk and stdin, and [`config`] holds user
//! settings.

pub mod config;
pub mod document;
pub mod file;
pub mod hclpath;
