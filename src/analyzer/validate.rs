//! Template compatibility check.

use super::TemplateAnalyzer;
use crate::error::Result;
use crate::model::{ValidationReport, ValidationSummary};
use std::path::Path;

const SCORE_LAYOUTS: u8 = 30;
const SCORE_MASTER: u8 = 20;
const SCORE_EXAMPLE_SLIDES: u8 = 25;
const SCORE_IMAGES: u8 = 25;

/// Validate a template file. A missing file is reported, not returned as an error.
pub fn validate_file(path: impl AsRef<Path>) -> ValidationReport {
    let path = path.as_ref();
    if !path.exists() {
        return ValidationReport {
            errors: vec!["Template file not found".to_string()],
            ..ValidationReport::default()
        };
    }
    report(TemplateAnalyzer::open(path).and_then(|a| a.summary()))
}

/// Validate a template held in memory.
pub fn validate_bytes(data: &[u8]) -> ValidationReport {
    report(TemplateAnalyzer::from_bytes(data.to_vec()).and_then(|a| a.summary()))
}

fn report(summary: Result<ValidationSummary>) -> ValidationReport {
    match summary {
        Ok(summary) => score(summary),
        Err(e) => {
            tracing::warn!(error = %e, "template validation failed");
            ValidationReport {
                errors: vec![format!("Failed to analyze template: {}", e)],
                ..ValidationReport::default()
            }
        }
    }
}

/// Additive score over the template's census.
pub(crate) fn score(summary: ValidationSummary) -> ValidationReport {
    let mut report = ValidationReport {
        valid: true,
        ..ValidationReport::default()
    };

    if summary.layouts < 2 {
        report.warnings.push("Template has very few layouts".to_string());
    } else {
        report.compatibility_score += SCORE_LAYOUTS;
    }

    if summary.has_master {
        report.compatibility_score += SCORE_MASTER;
    }

    if summary.slides > 0 {
        report.compatibility_score += SCORE_EXAMPLE_SLIDES;
        report
            .recommendations
            .push("Template contains example slides".to_string());
    }

    if summary.images > 0 {
        report.compatibility_score += SCORE_IMAGES;
        report
            .recommendations
            .push(format!("Template contains {} reusable images", summary.images));
    }

    report.summary = Some(summary);
    report
}
