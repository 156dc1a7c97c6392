//! Data model shared by the analyzer and the generator.
//!
//! The template profile is plain owned data with no reference back into the
//! package it was read from, so it can be serialized, cached and handed to a
//! later generation call.

mod content;
mod profile;
mod report;

pub use content::*;
pub use profile::*;
pub use report::*;
