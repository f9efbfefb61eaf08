//! Common test utilities for search engine testing.
//!
//! - [`fixtures`] - Landsat and Sentinel catalog fixtures

#![allow(dead_code)]

pub mod fixtures;
