//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the editor core:
//! - Math types (vectors, quaternions, local transforms)
//! - Arena handle types
//! - Logging utilities

pub mod collections;
pub mod logging;
pub mod math;
