//! Route configuration for the STAC API.
//!
//! This module contains the routing configuration that maps HTTP paths
//! to handlers.

pub mod stac_routes;

pub use stac_routes::create_routes;
