//! Builds the output deck from a template and a list of slide records.

use super::options::GenerationOptions;
use super::populator::populate;
use super::selector;
use crate::error::{Diagnostics, Error, Result};
use crate::model::{SlideContent, TemplateProfile};
use crate::pptx::Deck;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name used when a deck is generated without a template.
pub const DEFAULT_OUTPUT_NAME: &str = "generated_presentation.pptx";

/// Suffix appended to the template's stem for the output file.
pub const OUTPUT_SUFFIX: &str = "_generated";

/// Where a deck generated from `template` is saved.
pub fn output_path_for(template: Option<&Path>) -> PathBuf {
    let Some(template) = template else {
        return PathBuf::from(DEFAULT_OUTPUT_NAME);
    };
    let stem = template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "presentation".to_string());
    template.with_file_name(format!("{}{}.pptx", stem, OUTPUT_SUFFIX))
}

/// Progress of one assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStage {
    Empty,
    TemplateLoaded,
    SlidesStripped,
    Populating,
    Serialized,
}

impl AssemblyStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblyStage::Empty => "empty",
            AssemblyStage::TemplateLoaded => "template-loaded",
            AssemblyStage::SlidesStripped => "slides-stripped",
            AssemblyStage::Populating => "populating",
            AssemblyStage::Serialized => "serialized",
        }
    }
}

impl fmt::Display for AssemblyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated deck and what was skipped while styling it.
#[derive(Debug, Clone)]
pub struct GeneratedPresentation {
    pub bytes: Vec<u8>,
    pub slide_count: usize,
    pub diagnostics: Diagnostics,
}

impl GeneratedPresentation {
    /// Write the deck to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.bytes)
            .map_err(|e| Error::SerializationFailed(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "presentation saved");
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Step-by-step deck assembly.
///
/// The stages run in a fixed order: [`load_template`](Self::load_template),
/// [`strip_slides`](Self::strip_slides), any number of
/// [`add_slide`](Self::add_slide), then [`finish`](Self::finish). Calling a
/// step out of order fails with [`Error::InvalidData`].
pub struct Assembler<'p> {
    stage: AssemblyStage,
    deck: Option<Deck>,
    profile: &'p TemplateProfile,
    options: GenerationOptions,
    diagnostics: Diagnostics,
    slides_added: usize,
}

impl<'p> Assembler<'p> {
    pub fn new(profile: &'p TemplateProfile, options: GenerationOptions) -> Self {
        Self {
            stage: AssemblyStage::Empty,
            deck: None,
            profile,
            options,
            diagnostics: Diagnostics::new(),
            slides_added: 0,
        }
    }

    pub fn stage(&self) -> AssemblyStage {
        self.stage
    }

    fn advance(&mut self, from: &[AssemblyStage], to: AssemblyStage) -> Result<()> {
        if !from.contains(&self.stage) {
            return Err(Error::InvalidData(format!(
                "cannot move from stage '{}' to '{}'",
                self.stage, to
            )));
        }
        if self.stage != to {
            tracing::debug!(from = %self.stage, to = %to, "assembly stage");
        }
        self.stage = to;
        Ok(())
    }

    fn deck_mut(&mut self) -> Result<&mut Deck> {
        self.deck
            .as_mut()
            .ok_or_else(|| Error::InvalidData("no deck loaded".to_string()))
    }

    /// Open the template, or the built-in blank deck when there is none.
    pub fn load_template(&mut self, template: Option<&[u8]>) -> Result<()> {
        self.advance(&[AssemblyStage::Empty], AssemblyStage::TemplateLoaded)?;
        let deck = match template {
            Some(data) => Deck::from_bytes(data.to_vec())?,
            None => Deck::blank()?,
        };
        if deck.layouts().is_empty() {
            return Err(Error::NoUsableLayout);
        }
        self.deck = Some(deck);
        Ok(())
    }

    /// Remove the template's own slides.
    pub fn strip_slides(&mut self) -> Result<usize> {
        self.advance(&[AssemblyStage::TemplateLoaded], AssemblyStage::SlidesStripped)?;
        self.deck_mut()?.strip_slides()
    }

    /// Select a layout for `record`, add a slide on it and fill it.
    pub fn add_slide(&mut self, record: &SlideContent) -> Result<()> {
        self.advance(
            &[AssemblyStage::SlidesStripped, AssemblyStage::Populating],
            AssemblyStage::Populating,
        )?;
        let descriptor =
            selector::select(self.profile, record.slide_type).ok_or(Error::NoUsableLayout)?;
        let slide_index = self.slides_added;

        let profile = self.profile;
        let deck = self
            .deck
            .as_mut()
            .ok_or_else(|| Error::InvalidData("no deck loaded".to_string()))?;

        let layout = match deck.layout(descriptor.index) {
            Some(layout) => layout,
            None => {
                tracing::warn!(
                    layout = descriptor.index,
                    name = %descriptor.name,
                    "profile layout not in deck, using first layout"
                );
                deck.layouts().first().ok_or(Error::NoUsableLayout)?
            }
        };
        tracing::debug!(
            slide = slide_index,
            slide_type = %record.slide_type,
            layout = %layout.name,
            "layout selected"
        );

        let draft = populate(
            layout,
            record,
            profile,
            &self.options,
            slide_index,
            &mut self.diagnostics,
        );
        deck.add_slide(&draft, &mut self.diagnostics, slide_index)?;
        self.slides_added += 1;
        Ok(())
    }

    /// Serialize the deck. The assembler is spent afterwards.
    pub fn finish(&mut self) -> Result<GeneratedPresentation> {
        self.advance(
            &[AssemblyStage::SlidesStripped, AssemblyStage::Populating],
            AssemblyStage::Serialized,
        )?;
        let deck = self
            .deck
            .take()
            .ok_or_else(|| Error::InvalidData("no deck loaded".to_string()))?;
        let bytes = deck.into_bytes()?;
        Ok(GeneratedPresentation {
            bytes,
            slide_count: self.slides_added,
            diagnostics: std::mem::take(&mut self.diagnostics),
        })
    }
}

/// Generate a deck with one slide per record, in record order.
///
/// Fails with [`Error::NoUsableLayout`] when the profile has no layouts,
/// before the template is opened.
pub fn assemble(
    template: Option<&[u8]>,
    records: &[SlideContent],
    profile: &TemplateProfile,
    options: &GenerationOptions,
) -> Result<GeneratedPresentation> {
    if profile.layouts.is_empty() {
        return Err(Error::NoUsableLayout);
    }

    let mut assembler = Assembler::new(profile, options.clone());
    assembler.load_template(template)?;
    let stripped = assembler.strip_slides()?;
    for record in records {
        assembler.add_slide(record)?;
    }
    let generated = assembler.finish()?;

    tracing::info!(
        slides = generated.slide_count,
        stripped,
        skipped = generated.diagnostics.len(),
        "presentation generated"
    );
    Ok(generated)
}
