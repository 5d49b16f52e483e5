// Document Composition Engine.
// story (record → blocks) → layout (blocks → pages) → pdf (pages → bytes).
// Pure and synchronous; callers on the async side run it inside spawn_blocking.

pub mod font_metrics;
pub mod labels;
pub mod layout;
pub mod pdf;
pub mod story;
pub mod style;

use std::io::Write;

use thiserror::Error;

use crate::models::submission::SubmissionRecord;

pub use labels::{Labels, Locale};
pub use style::{PageGeometry, StyleSheet};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error while writing document: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF serialization failed: {0}")]
    Pdf(String),
}

/// Everything about the document that is fixed per deployment.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub locale: Locale,
    pub styles: StyleSheet,
    pub page: PageGeometry,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            locale: Locale::default(),
            styles: StyleSheet::default(),
            page: PageGeometry::a4(),
        }
    }
}

impl RenderOptions {
    pub fn with_locale(locale: Locale) -> Self {
        RenderOptions {
            locale,
            ..Default::default()
        }
    }

    pub fn labels(&self) -> &'static Labels {
        Labels::for_locale(self.locale)
    }
}

/// Renders `record` as a paginated PDF into `sink`.
///
/// Deterministic: the same record and options always produce the same bytes.
pub fn compose<W: Write + ?Sized>(
    record: &SubmissionRecord,
    options: &RenderOptions,
    sink: &mut W,
) -> Result<(), RenderError> {
    let blocks = story::build_story(record, options.labels());
    let pages = layout::paginate(&blocks, &options.styles, &options.page);
    tracing::debug!(
        blocks = blocks.len(),
        pages = pages.len(),
        "Composed résumé layout"
    );
    pdf::write_pdf(&pages, &options.page, record.display_name(), sink)?;
    sink.flush()?;
    Ok(())
}

/// Convenience wrapper returning the rendered bytes.
#[cfg(test)]
pub fn compose_to_vec(
    record: &SubmissionRecord,
    options: &RenderOptions,
) -> Result<Vec<u8>, RenderError> {
    let mut out = Vec::new();
    compose(record, options, &mut out)?;
    Ok(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
