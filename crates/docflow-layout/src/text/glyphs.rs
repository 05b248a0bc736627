//! Vendored glyph advance tables.
//!
//! Tables are plain `static` data (see `crate::generated::glyph_widths`) and are never mutated,
//! so any number of threads may read them without synchronization.

use crate::generated::glyph_widths::{HELVETICA, HELVETICA_BOLD};

#[derive(Debug, Clone, Copy)]
pub struct GlyphWidthTable {
    pub font_key: &'static str,
    /// Advances are expressed in units of `1 / units_per_em` of the font size.
    pub units_per_em: f64,
    /// Advance used for any codepoint missing from `entries`. Chosen at least as wide as the
    /// widest entry so unknown text is never under-measured.
    pub fallback_units: f64,
    /// Sorted by codepoint.
    pub entries: &'static [(char, u16)],
}

impl GlyphWidthTable {
    pub fn units(&self, ch: char) -> f64 {
        match self.entries.binary_search_by_key(&ch, |&(c, _)| c) {
            Ok(idx) => f64::from(self.entries[idx].1),
            Err(_) => self.fallback_units,
        }
    }

    pub fn contains(&self, ch: char) -> bool {
        self.entries.binary_search_by_key(&ch, |&(c, _)| c).is_ok()
    }
}

/// Families whose advances match the vendored Helvetica metrics.
const HELVETICA_METRIC_FAMILIES: &[&str] = &[
    "helvetica",
    "helvetica neue",
    "arial",
    "liberation sans",
    "nimbus sans",
    "nimbus sans l",
    "sans-serif",
];

/// Picks the table for a lowercased primary family, `bold` selecting the bold cut.
///
/// No family means the default (Helvetica). Families without vendored metrics return `None`.
pub fn lookup_glyph_table(family: Option<&str>, bold: bool) -> Option<&'static GlyphWidthTable> {
    let vendored = match family {
        None => true,
        Some(name) => HELVETICA_METRIC_FAMILIES.contains(&name),
    };
    if !vendored {
        return None;
    }
    Some(if bold { &HELVETICA_BOLD } else { &HELVETICA })
}
