use crate::text::Token;
use serde::Serialize;
use std::fmt;

/// One wrapped line. `width` is the sum of token widths plus one separator between each pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub text: String,
    pub width: f64,
    pub tokens: Vec<Token>,
}

impl Line {
    pub fn new(tokens: Vec<Token>, width: f64) -> Self {
        let text = tokens
            .iter()
            .map(|t| t.source.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            width,
            tokens,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The line as a renderer would draw it (link markup replaced by labels).
    pub fn visible_text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.visible.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowItem {
    pub content: String,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    /// Position of the item in the caller's input sequence.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub item: FlowItem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub items: Vec<PlacedItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub rows: Vec<Row>,
    pub width: f64,
    pub height: f64,
}

impl Block {
    pub fn item_count(&self) -> usize {
        self.rows.iter().map(|r| r.items.len()).sum()
    }

    pub fn items(&self) -> impl Iterator<Item = &PlacedItem> {
        self.rows.iter().flat_map(|r| r.items.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            fmt_number(self.min_x),
            fmt_number(self.min_y),
            fmt_number(self.width),
            fmt_number(self.height)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlockPlacement {
    pub x: f64,
    pub y: f64,
}

/// The sized drawing surface. `width`/`height` are the physical (display) attributes;
/// `view_box` and `placements` stay in unscaled layout units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub view_box: ViewBox,
    pub placements: Vec<BlockPlacement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPosition {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
}

impl GridPosition {
    pub fn cell(&self) -> GridCell {
        GridCell {
            row: self.row,
            col: self.col,
        }
    }
}

/// Formats a coordinate with at most three decimals and no trailing zeros.
pub fn fmt_number(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    if v.abs() < 0.0005 {
        return "0".to_string();
    }
    let mut s = format!("{:.3}", (v * 1000.0).round() / 1000.0);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" { "0".to_string() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_number_trims_trailing_zeros() {
        assert_eq!(fmt_number(800.0), "800");
        assert_eq!(fmt_number(12.5), "12.5");
        assert_eq!(fmt_number(1.0 / 3.0), "0.333");
        assert_eq!(fmt_number(-0.0001), "0");
        assert_eq!(fmt_number(f64::NAN), "0");
    }

    #[test]
    fn view_box_displays_as_svg_attribute() {
        let vb = ViewBox {
            min_x: 0.0,
            min_y: 0.0,
            width: 540.25,
            height: 206.0,
        };
        assert_eq!(vb.to_string(), "0 0 540.25 206");
    }
}
