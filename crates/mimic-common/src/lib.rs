//! Common utilities for the mimic style engine.
//!
//! This crate provides shared infrastructure used by the DOM and CSS crates:
//! - **Warning System** - deduplicated diagnostics routed through [`log`]

pub mod warning;
