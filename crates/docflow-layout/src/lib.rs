#![forbid(unsafe_code)]

//! Text measurement, line wrapping and flow layout for hand-built SVG documentation artifacts.
//!
//! Every entry point is a pure function of its inputs. The only shared state is the static glyph
//! width tables, so one pipeline per request can run on any thread without coordination.

pub mod canvas;
pub mod config;
pub mod flow;
mod generated;
pub mod grid;
pub mod model;
pub mod request;
pub mod text;

use crate::config::LayoutConfig;
use crate::request::{LayoutRequest, LayoutedDocument, SectionLayout};
use crate::text::{GlyphTableTextMeasurer, TextMeasurer, measurer_for};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: `{field}` must be {expected}, got {value}")]
    InvalidConfiguration {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
    #[error("invalid layout request: {message}")]
    InvalidRequest { message: String },
    #[error("layout request JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(GlyphTableTextMeasurer),
        }
    }
}

impl LayoutOptions {
    pub fn with_measurer(measurer: Arc<dyn TextMeasurer + Send + Sync>) -> Self {
        Self {
            text_measurer: measurer,
        }
    }
}

/// Runs the measure, wrap, layout and size pipeline for one request.
///
/// A `measurer` key in the request config takes precedence over `options.text_measurer`.
pub fn layout_document(
    request: &LayoutRequest,
    options: &LayoutOptions,
) -> Result<LayoutedDocument> {
    let cfg: LayoutConfig = request.effective_config()?;
    let measurer = if request.selects_measurer() {
        measurer_for(cfg.measurer_kind()?)
    } else {
        Arc::clone(&options.text_measurer)
    };

    let sections = request
        .sections
        .iter()
        .enumerate()
        .map(|(idx, section)| {
            tracing::debug!(section = idx, kind = section.kind(), "laying out section");
            section.layout(&cfg, measurer.as_ref())
        })
        .collect::<Result<Vec<SectionLayout>>>()?;

    LayoutedDocument::build(sections, &cfg)
}

pub fn layout_document_json(input: &str, options: &LayoutOptions) -> Result<LayoutedDocument> {
    let request = LayoutRequest::from_json(input)?;
    layout_document(&request, options)
}
