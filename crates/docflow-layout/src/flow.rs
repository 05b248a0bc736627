//! Row packing for legends, avatar strips, badge cells and similar item lists.
//!
//! Items are packed greedily in input order into rows no wider than `max_row_width`. A single
//! item wider than the budget gets a row to itself. Rows are centered within the block.

use crate::config::{require_non_negative, require_positive};
use crate::model::{Block, FlowItem, Line, PlacedItem, Row};
use crate::text::wrap::max_line_width;
use crate::text::{TextMeasurer, TextStyle, wrap_text};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowOptions {
    pub max_row_width: f64,
    pub item_spacing: f64,
    pub row_spacing: f64,
    /// Even out row lengths (legend style) when that does not add rows.
    #[serde(default)]
    pub balance: bool,
}

impl FlowOptions {
    pub fn new(max_row_width: f64) -> Self {
        Self {
            max_row_width,
            item_spacing: 10.0,
            row_spacing: 8.0,
            balance: false,
        }
    }

    pub fn with_spacing(mut self, item_spacing: f64, row_spacing: f64) -> Self {
        self.item_spacing = item_spacing;
        self.row_spacing = row_spacing;
        self
    }

    pub fn balanced(mut self) -> Self {
        self.balance = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("flow.maxRowWidth", self.max_row_width)?;
        require_positive("flow.itemSpacing", self.item_spacing)?;
        require_positive("flow.rowSpacing", self.row_spacing)?;
        Ok(())
    }
}

/// Sizing rules for an item made of an optional leading mark (a legend swatch) and a
/// wrapped label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelItemOptions {
    pub max_label_width: f64,
    pub line_height: f64,
    /// Width reserved before the label; `0.0` for a bare label.
    pub leading_width: f64,
    /// Space between the leading mark and the label. Ignored without a leading mark.
    pub gap: f64,
}

impl LabelItemOptions {
    pub fn validate(&self) -> Result<()> {
        require_positive("flow.labelMaxWidth", self.max_label_width)?;
        require_positive("text.lineHeight", self.line_height)?;
        require_non_negative("flow.swatchWidth", self.leading_width)?;
        require_non_negative("flow.swatchGap", self.gap)?;
        Ok(())
    }

    fn leading_extent(&self) -> f64 {
        if self.leading_width > 0.0 {
            self.leading_width + self.gap
        } else {
            0.0
        }
    }
}

impl FlowItem {
    /// An item with externally known dimensions (avatar, badge cell, icon).
    pub fn fixed(content: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            content: content.into(),
            width,
            height,
            lines: Vec::new(),
        }
    }

    /// An item sized from its label, wrapped to `options.max_label_width`.
    pub fn label(
        text: &str,
        measurer: &dyn TextMeasurer,
        style: &TextStyle,
        options: &LabelItemOptions,
    ) -> Result<Self> {
        options.validate()?;
        let lines: Vec<Line> = wrap_text(text, measurer, style, options.max_label_width)?;
        let width = options.leading_extent() + max_line_width(&lines);
        let height = lines.len() as f64 * options.line_height;
        Ok(Self {
            content: text.to_string(),
            width,
            height,
            lines,
        })
    }
}

/// Rejects items whose width or height is negative or not finite.
pub(crate) fn validate_item_sizes(items: &[FlowItem]) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        for (dimension, value) in [("width", item.width), ("height", item.height)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidRequest {
                    message: format!(
                        "item {index} {dimension} must be a finite number >= 0, got {value}"
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Packs `items` into a centered block of rows.
pub fn layout_rows(items: Vec<FlowItem>, options: &FlowOptions) -> Result<Block> {
    options.validate()?;
    validate_item_sizes(&items)?;

    let mut groups = pack_rows(&items, options, None);
    if options.balance && groups.len() > 1 {
        let per_row = items.len().div_ceil(groups.len());
        let balanced = pack_rows(&items, options, Some(per_row));
        if balanced.len() == groups.len() {
            groups = balanced;
        }
    }

    let block = assemble(items, &groups, options);
    tracing::debug!(
        items = block.item_count(),
        rows = block.rows.len(),
        width = block.width,
        height = block.height,
        "flow layout"
    );
    Ok(block)
}

/// Width of `items` laid side by side.
pub fn row_width(items: &[FlowItem], item_spacing: f64) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let widths: f64 = items.iter().map(|i| i.width).sum();
    widths + item_spacing * (items.len() - 1) as f64
}

/// Greedy packing into contiguous index ranges, optionally capping the items per row.
fn pack_rows(items: &[FlowItem], options: &FlowOptions, cap: Option<usize>) -> Vec<Range<usize>> {
    let mut rows: Vec<Range<usize>> = Vec::new();
    let mut start = 0usize;
    let mut width = 0.0;

    for (idx, item) in items.iter().enumerate() {
        let count = idx - start;
        if count == 0 {
            if item.width > options.max_row_width {
                tracing::warn!(
                    index = idx,
                    width = item.width,
                    max_row_width = options.max_row_width,
                    "item wider than row budget; placing it on its own row"
                );
            }
            width = item.width;
            continue;
        }

        let candidate = width + options.item_spacing + item.width;
        let full = cap.is_some_and(|c| count >= c);
        if candidate > options.max_row_width || full {
            rows.push(start..idx);
            start = idx;
            if item.width > options.max_row_width {
                tracing::warn!(
                    index = idx,
                    width = item.width,
                    max_row_width = options.max_row_width,
                    "item wider than row budget; placing it on its own row"
                );
            }
            width = item.width;
        } else {
            width = candidate;
        }
    }

    if start < items.len() {
        rows.push(start..items.len());
    }
    rows
}

fn assemble(items: Vec<FlowItem>, groups: &[Range<usize>], options: &FlowOptions) -> Block {
    let widths: Vec<f64> = groups
        .iter()
        .map(|r| row_width(&items[r.clone()], options.item_spacing))
        .collect();
    let block_width = widths.iter().copied().fold(0.0, f64::max);

    let mut items = items.into_iter().enumerate();
    let mut rows: Vec<Row> = Vec::with_capacity(groups.len());
    let mut y = 0.0;
    for (range, width) in groups.iter().zip(widths) {
        let row_x = (block_width - width) / 2.0;
        let mut x = row_x;
        let mut height: f64 = 0.0;
        let mut placed: Vec<PlacedItem> = Vec::with_capacity(range.len());
        for (index, item) in items.by_ref().take(range.len()) {
            height = height.max(item.height);
            let item_width = item.width;
            placed.push(PlacedItem { index, x, y, item });
            x += item_width + options.item_spacing;
        }
        rows.push(Row {
            x: row_x,
            y,
            width,
            height,
            items: placed,
        });
        y += height + options.row_spacing;
    }

    let height = if rows.is_empty() {
        0.0
    } else {
        y - options.row_spacing
    };
    Block {
        rows,
        width: block_width,
        height,
    }
}

/// Stacks wrapped lines into a left-aligned block, one single-item row per line.
pub fn text_block(lines: Vec<Line>, line_height: f64) -> Result<Block> {
    require_positive("text.lineHeight", line_height)?;

    let mut rows: Vec<Row> = Vec::with_capacity(lines.len());
    let mut y = 0.0;
    let mut width: f64 = 0.0;
    for (index, line) in lines.into_iter().enumerate() {
        width = width.max(line.width);
        let item = FlowItem {
            content: line.text.clone(),
            width: line.width,
            height: line_height,
            lines: vec![line],
        };
        rows.push(Row {
            x: 0.0,
            y,
            width: item.width,
            height: line_height,
            items: vec![PlacedItem {
                index,
                x: 0.0,
                y,
                item,
            }],
        });
        y += line_height;
    }
    Ok(Block {
        rows,
        width,
        height: y,
    })
}
