//! Output rendering for reports.
//!
//! Profiles, validation reports, slide structures and previews are all
//! plain serde values; this module renders any of them as JSON.
//!
//! # Example
//!
//! ```no_run
//! use slidecraft::render::{to_json, JsonFormat};
//!
//! let profile = slidecraft::analyze_file("corporate.potx")?;
//! println!("{}", to_json(&profile, JsonFormat::Pretty)?);
//! # Ok::<(), slidecraft::Error>(())
//! ```

mod json;

pub use json::{to_json, to_json_default, JsonFormat};
