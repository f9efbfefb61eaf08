//! Common test utilities for REST API testing.
//!
//! - [`harness`] - Test server over a catalog loaded from disk
//! - [`fixtures`] - Collection and item documents

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;
