//! Utilities shared across formula formats.

pub mod xml;
