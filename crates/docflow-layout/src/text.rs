use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

mod glyphs;
pub mod token;
pub mod wrap;


pub use glyphs::{GlyphWidthTable, lookup_glyph_table};
pub use token::{Token, tokenize};
pub use wrap::wrap_text;

/// Bold text is assumed to run this much wider than regular text when no bold metrics exist.
pub const BOLD_WIDTH_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default)]
    pub family: Option<String>,
    pub size_px: f64,
    #[serde(default)]
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            family: None,
            size_px: 14.0,
            bold: false,
        }
    }
}

impl TextStyle {
    pub fn new(size_px: f64) -> Self {
        Self {
            size_px,
            ..Self::default()
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// The first family of a CSS-like font stack, lowercased and unquoted.
    pub fn primary_family(&self) -> Option<String> {
        let raw = self.family.as_deref()?;
        let first = raw.split(',').next()?.trim();
        let first = first.trim_matches(|c| c == '"' || c == '\'').trim();
        if first.is_empty() {
            None
        } else {
            Some(first.to_ascii_lowercase())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredText {
    pub text: String,
    pub width: f64,
}

/// Estimates the rendered width of a single run of text.
///
/// Implementations must be monotonic: appending characters never makes a string narrower.
/// Whitespace is measured as-is; nothing is collapsed or trimmed.
pub trait TextMeasurer {
    fn measure_width(&self, text: &str, style: &TextStyle) -> f64;

    fn measure(&self, text: &str, style: &TextStyle) -> MeasuredText {
        MeasuredText {
            text: text.to_string(),
            width: self.measure_width(text, style),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurerKind {
    #[default]
    Glyph,
    Heuristic,
}

impl FromStr for MeasurerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "glyph" | "table" => Ok(Self::Glyph),
            "heuristic" | "deterministic" => Ok(Self::Heuristic),
            _ => Err(()),
        }
    }
}

pub fn measurer_for(kind: MeasurerKind) -> Arc<dyn TextMeasurer + Send + Sync> {
    match kind {
        MeasurerKind::Glyph => Arc::new(GlyphTableTextMeasurer::default()),
        MeasurerKind::Heuristic => Arc::new(HeuristicTextMeasurer::default()),
    }
}

pub fn ceil_to_1_64_px(v: f64) -> f64 {
    if !(v.is_finite() && v >= 0.0) {
        return 0.0;
    }
    // Snap values that already sit on the 1/64px lattice (modulo float drift) instead of
    // bumping them to the next step.
    let x = v * 64.0;
    let r = x.round();
    if (x - r).abs() < 1e-4 {
        return r / 64.0;
    }
    (x - 1e-5).ceil() / 64.0
}

fn usable_font_size(style: &TextStyle) -> f64 {
    if style.size_px.is_finite() && style.size_px > 0.0 {
        style.size_px
    } else {
        0.0
    }
}

/// Per-codepoint measurement against the vendored glyph width tables.
///
/// Families with no vendored table are measured with [`HeuristicTextMeasurer`]'s per-family
/// estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphTableTextMeasurer;

impl TextMeasurer for GlyphTableTextMeasurer {
    fn measure_width(&self, text: &str, style: &TextStyle) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let family = style.primary_family();
        let Some(table) = lookup_glyph_table(family.as_deref(), style.bold) else {
            tracing::trace!(family = family.as_deref(), "no glyph table; using heuristic widths");
            return HeuristicTextMeasurer::default().measure_width(text, style);
        };
        let units: f64 = text.chars().map(|ch| table.units(ch)).sum();
        ceil_to_1_64_px(units * usable_font_size(style) / table.units_per_em)
    }
}

/// Flat per-character estimate for renderers that have no glyph table.
///
/// `char_width_factor` is the average character advance in em. `0.0` selects a factor from
/// the style's font family.
#[derive(Debug, Clone, Default)]
pub struct HeuristicTextMeasurer {
    pub char_width_factor: f64,
}

impl HeuristicTextMeasurer {
    pub fn with_char_width_factor(char_width_factor: f64) -> Self {
        Self { char_width_factor }
    }

    pub fn average_char_width_px(&self, style: &TextStyle) -> f64 {
        let factor = if self.char_width_factor > 0.0 && self.char_width_factor.is_finite() {
            self.char_width_factor
        } else {
            family_char_width_em(style.primary_family().as_deref())
        };
        usable_font_size(style) * factor
    }
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure_width(&self, text: &str, style: &TextStyle) -> f64 {
        let bold = if style.bold { BOLD_WIDTH_FACTOR } else { 1.0 };
        text.chars().count() as f64 * self.average_char_width_px(style) * bold
    }
}

fn family_char_width_em(family: Option<&str>) -> f64 {
    let Some(family) = family else {
        return 0.6;
    };
    let has = |needle: &str| family.contains(needle);
    if has("mono") || has("courier") || has("consolas") || has("menlo") {
        0.6
    } else if has("verdana") {
        0.58
    } else if has("trebuchet") {
        0.52
    } else if has("arial") || has("helvetica") || has("sans") {
        // "sans-serif" must win over the plain "serif" check below.
        0.55
    } else if has("georgia") || has("times") || has("serif") {
        0.5
    } else {
        0.6
    }
}
