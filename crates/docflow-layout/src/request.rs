//! JSON render requests and their layouted output.
//!
//! A request is a list of sections (free text, a flow of items, a honeycomb grid) plus an
//! optional partial [`LayoutConfig`] object. Section-level fields override the config for that
//! section only.

use crate::canvas::size_canvas;
use crate::config::LayoutConfig;
use crate::flow::{LabelItemOptions, layout_rows, text_block, validate_item_sizes};
use crate::grid::{GridOptions, honeycomb_block, honeycomb_positions};
use crate::model::{Block, Canvas, FlowItem, GridPosition, Line};
use crate::text::{TextMeasurer, TextStyle, wrap_text};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default)]
    pub sections: Vec<SectionRequest>,
}

impl LayoutRequest {
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Defaults merged with the request's own config object.
    pub fn effective_config(&self) -> Result<LayoutConfig> {
        match &self.config {
            None => Ok(LayoutConfig::defaults()),
            Some(overrides @ Value::Object(_)) => Ok(LayoutConfig::with_overrides(overrides)),
            Some(other) => Err(Error::InvalidRequest {
                message: format!("`config` must be an object, got {other}"),
            }),
        }
    }

    /// Whether the request picks its own measurer instead of the caller's.
    pub fn selects_measurer(&self) -> bool {
        self.config
            .as_ref()
            .and_then(|c| c.get("measurer"))
            .is_some()
    }
}

/// Optional font overrides for one section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_px: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
}

/// A flow or grid item: a label to measure, an explicit size, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl ItemRequest {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }
}

/// Turns requested items into flow items. Label sizing settings are resolved only once the first
/// label item needs them, so a flow of fixed-size items never depends on label budgets.
fn resolve_items(
    items: &[ItemRequest],
    measurer: &dyn TextMeasurer,
    label_context: impl Fn() -> Result<(TextStyle, LabelItemOptions)>,
) -> Result<Vec<FlowItem>> {
    let mut context: Option<(TextStyle, LabelItemOptions)> = None;
    let mut resolved = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match (&item.label, item.width, item.height) {
            (label, Some(width), Some(height)) => {
                let content = label.clone().unwrap_or_default();
                resolved.push(FlowItem::fixed(content, width, height));
            }
            (Some(label), None, None) => {
                let (style, options) = match context.take() {
                    Some(ctx) => ctx,
                    None => label_context()?,
                };
                resolved.push(FlowItem::label(label, measurer, &style, &options)?);
                context = Some((style, options));
            }
            _ => {
                return Err(Error::InvalidRequest {
                    message: format!(
                        "item {index} needs a `label`, or both `width` and `height`"
                    ),
                });
            }
        }
    }
    validate_item_sizes(&resolved)?;
    Ok(resolved)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SectionRequest {
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font: Option<FontRequest>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line_height: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Flow {
        #[serde(default)]
        items: Vec<ItemRequest>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_row_width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item_spacing: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        row_spacing: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        balance: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font: Option<FontRequest>,
        /// Width of the legend swatch before each label; `0` for bare labels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        swatch_width: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label_max_width: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Grid {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        items: Vec<ItemRequest>,
        columns: usize,
        cell_width: f64,
        cell_height: f64,
    },
}

impl SectionRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Flow { .. } => "flow",
            Self::Grid { .. } => "grid",
        }
    }

    pub fn layout(&self, base: &LayoutConfig, measurer: &dyn TextMeasurer) -> Result<SectionLayout> {
        match self {
            Self::Text {
                text,
                max_width,
                font,
                line_height,
            } => {
                let mut cfg = base.clone();
                apply_font(&mut cfg, font.as_ref());
                set_opt(&mut cfg, "text.maxWidth", *max_width);
                set_opt(&mut cfg, "text.lineHeight", *line_height);

                let settings = cfg.text()?;
                let lines = wrap_text(text, measurer, &cfg.font()?, settings.max_width)?;
                let block = text_block(lines.clone(), settings.line_height)?;
                Ok(SectionLayout::Text { lines, block })
            }
            Self::Flow {
                items,
                max_row_width,
                item_spacing,
                row_spacing,
                balance,
                font,
                swatch_width,
                label_max_width,
            } => {
                let mut cfg = base.clone();
                apply_font(&mut cfg, font.as_ref());
                set_opt(&mut cfg, "flow.maxRowWidth", *max_row_width);
                set_opt(&mut cfg, "flow.itemSpacing", *item_spacing);
                set_opt(&mut cfg, "flow.rowSpacing", *row_spacing);
                set_opt(&mut cfg, "flow.swatchWidth", *swatch_width);
                set_opt(&mut cfg, "flow.labelMaxWidth", *label_max_width);
                if let Some(balance) = balance {
                    cfg.set_value("flow.balance", json!(balance));
                }

                let options = cfg.flow()?;
                let items =
                    resolve_items(items, measurer, || Ok((cfg.font()?, cfg.label_items()?)))?;
                Ok(SectionLayout::Flow {
                    block: layout_rows(items, &options)?,
                })
            }
            Self::Grid {
                count,
                items,
                columns,
                cell_width,
                cell_height,
            } => {
                let options = GridOptions::new(*columns, *cell_width, *cell_height);
                let count = match (*count, items.len()) {
                    (Some(n), 0) => n,
                    (None, n) => n,
                    (Some(n), m) if n == m => n,
                    (Some(n), m) => {
                        return Err(Error::InvalidRequest {
                            message: format!("grid `count` is {n} but {m} items were given"),
                        });
                    }
                };
                let positions = honeycomb_positions(count, &options)?;

                let items = if items.is_empty() {
                    (0..count)
                        .map(|i| FlowItem::fixed(format!("cell-{i}"), *cell_width, *cell_height))
                        .collect()
                } else {
                    // Grid labels wrap inside their cell.
                    resolve_items(items, measurer, || {
                        let options = LabelItemOptions {
                            max_label_width: *cell_width,
                            line_height: base.text()?.line_height,
                            leading_width: 0.0,
                            gap: 0.0,
                        };
                        Ok((base.font()?, options))
                    })?
                };
                let block = honeycomb_block(items, &options)?;
                Ok(SectionLayout::Grid { positions, block })
            }
        }
    }
}

fn set_opt(cfg: &mut LayoutConfig, dotted_path: &str, value: Option<f64>) {
    if let Some(v) = value {
        cfg.set_value(dotted_path, json!(v));
    }
}

fn apply_font(cfg: &mut LayoutConfig, font: Option<&FontRequest>) {
    let Some(font) = font else {
        return;
    };
    if let Some(family) = &font.family {
        cfg.set_value("font.family", json!(family));
    }
    set_opt(cfg, "font.sizePx", font.size_px);
    if let Some(bold) = font.bold {
        cfg.set_value("font.bold", json!(bold));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SectionLayout {
    Text { lines: Vec<Line>, block: Block },
    Flow { block: Block },
    Grid {
        positions: Vec<GridPosition>,
        block: Block,
    },
}

impl SectionLayout {
    pub fn block(&self) -> &Block {
        match self {
            Self::Text { block, .. } | Self::Flow { block } | Self::Grid { block, .. } => block,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutedDocument {
    pub canvas: Canvas,
    pub sections: Vec<SectionLayout>,
}

impl LayoutedDocument {
    /// Sizes the canvas around the blocks of already laid out sections.
    pub fn build(sections: Vec<SectionLayout>, cfg: &LayoutConfig) -> Result<Self> {
        let blocks: Vec<Block> = sections.iter().map(|s| s.block().clone()).collect();
        let canvas = size_canvas(&blocks, &cfg.canvas()?)?;
        Ok(Self { canvas, sections })
    }
}
