//! Deck generation: layout selection, slide population and assembly.
//!
//! # Example
//!
//! ```no_run
//! use slidecraft::generator::{generate_file, GenerationOptions};
//! use slidecraft::model::{SlideContent, SlideType};
//!
//! let records = vec![
//!     SlideContent::new(SlideType::Title, "Quarterly Review"),
//!     SlideContent::new(SlideType::Content, "Highlights").with_content(["Revenue up", "Churn down"]),
//! ];
//! let generated = generate_file("brand.potx", &records, &GenerationOptions::default())?;
//! println!("{} slides, {} styling steps skipped", generated.slide_count, generated.diagnostics.len());
//! # Ok::<(), slidecraft::Error>(())
//! ```

mod assembler;
mod options;
mod populator;
mod preview;
pub mod selector;

pub use assembler::{
    assemble, output_path_for, AssemblyStage, Assembler, GeneratedPresentation,
    DEFAULT_OUTPUT_NAME, OUTPUT_SUFFIX,
};
pub use options::GenerationOptions;
pub use populator::{floating_image_frame, populate, BODY_SIZE, TITLE_SIZE};
pub use preview::preview;
pub use selector::select;

use crate::analyzer::analyze_bytes;
use crate::error::{Error, Result};
use crate::model::SlideContent;
use std::path::Path;

/// Analyze `template`, generate a deck from `records` and save it beside the
/// template under [`output_path_for`].
pub fn generate_file(
    template: impl AsRef<Path>,
    records: &[SlideContent],
    options: &GenerationOptions,
) -> Result<GeneratedPresentation> {
    let template = template.as_ref();
    let data = std::fs::read(template).map_err(|e| Error::from(e).into_unreadable())?;
    let profile = analyze_bytes(&data)?;
    let generated = assemble(Some(data.as_slice()), records, &profile, options)?;

    let output = output_path_for(Some(template));
    generated.save(&output)?;
    tracing::info!(
        template = %template.display(),
        output = %output.display(),
        slides = generated.slide_count,
        "generated from template"
    );
    Ok(generated)
}
