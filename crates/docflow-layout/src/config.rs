//! Layout configuration.
//!
//! Configuration is a JSON object addressed with dotted paths (`"canvas.minWidth"`). Callers
//! supply a partial object which is deep-merged over [`LayoutConfig::defaults`] and then
//! resolved into typed options. Numeric budgets are validated during resolution; a bad value is
//! reported as [`Error::InvalidConfiguration`] and never clamped.

use crate::canvas::{CanvasOptions, Paddings};
use crate::flow::{FlowOptions, LabelItemOptions};
use crate::text::{MeasurerKind, TextStyle};
use crate::{Error, Result};
use serde_json::{Map, Value, json};

/// Line height as a multiple of the font size when none is configured.
pub const DEFAULT_LINE_HEIGHT_FACTOR: f64 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig(Value);

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl LayoutConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn defaults() -> Self {
        Self(json!({
            "font": { "family": "helvetica", "sizePx": 14.0, "bold": false },
            "measurer": "glyph",
            "text": { "maxWidth": 400.0 },
            "flow": {
                "maxRowWidth": 400.0,
                "itemSpacing": 10.0,
                "rowSpacing": 8.0,
                "swatchWidth": 12.0,
                "swatchGap": 6.0,
                "balance": false
            },
            "canvas": {
                "paddingX": 20.0,
                "paddingY": 20.0,
                "blockSpacing": 16.0,
                "minWidth": 0.0,
                "minHeight": 0.0,
                "displayScale": 1.0,
                "aspectDivisor": 1.0
            }
        }))
    }

    /// Defaults with `overrides` deep-merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::defaults();
        cfg.merge(overrides.clone());
        cfg
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.get(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path)?.as_f64()
    }

    /// Writes `value` at `dotted_path`. Missing or non-object parents become empty objects.
    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        let slot = dotted_path.split('.').fold(&mut self.0, |node, key| {
            if !node.is_object() {
                *node = Value::Null;
            }
            &mut node[key]
        });
        *slot = value;
    }

    /// Merges `overrides` into this config. Objects merge key by key; anything else replaces.
    pub fn merge(&mut self, overrides: Value) {
        merge_into(&mut self.0, overrides);
    }

    /// Reads a number that must be present (defaults guarantee it unless a caller removed it).
    fn number(&self, dotted_path: &'static str) -> Result<f64> {
        self.get_f64(dotted_path)
            .ok_or(Error::InvalidConfiguration {
                field: dotted_path,
                expected: "a number",
                value: f64::NAN,
            })
    }

    pub fn font(&self) -> Result<TextStyle> {
        let size_px = require_positive("font.sizePx", self.number("font.sizePx")?)?;
        Ok(TextStyle {
            family: self.get_str("font.family").map(str::to_string),
            size_px,
            bold: self.get_bool("font.bold").unwrap_or(false),
        })
    }

    /// An unrecognized measurer name is a configuration error rather than a silent fallback.
    pub fn measurer_kind(&self) -> Result<MeasurerKind> {
        match self.get_str("measurer") {
            None => Ok(MeasurerKind::default()),
            Some(name) => name.parse().map_err(|_| Error::InvalidRequest {
                message: format!("unknown measurer `{name}` (expected `glyph` or `heuristic`)"),
            }),
        }
    }

    pub fn text(&self) -> Result<TextSettings> {
        let font = self.font()?;
        let line_height = match self.get_f64("text.lineHeight") {
            Some(v) => v,
            None => font.size_px * DEFAULT_LINE_HEIGHT_FACTOR,
        };
        Ok(TextSettings {
            max_width: require_positive("text.maxWidth", self.number("text.maxWidth")?)?,
            line_height: require_positive("text.lineHeight", line_height)?,
        })
    }

    pub fn flow(&self) -> Result<FlowOptions> {
        let options = FlowOptions {
            max_row_width: self.number("flow.maxRowWidth")?,
            item_spacing: self.number("flow.itemSpacing")?,
            row_spacing: self.number("flow.rowSpacing")?,
            balance: self.get_bool("flow.balance").unwrap_or(false),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn label_items(&self) -> Result<LabelItemOptions> {
        let text = self.text()?;
        let leading_width = self.number("flow.swatchWidth")?;
        let gap = self.number("flow.swatchGap")?;
        // By default a label may use whatever a full row leaves next to its swatch.
        let max_label_width = match self.get_f64("flow.labelMaxWidth") {
            Some(v) => v,
            None => self.number("flow.maxRowWidth")? - leading_width - gap,
        };
        let options = LabelItemOptions {
            max_label_width: require_positive("flow.labelMaxWidth", max_label_width)?,
            line_height: text.line_height,
            leading_width,
            gap,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn canvas(&self) -> Result<CanvasOptions> {
        let options = CanvasOptions {
            padding: Paddings {
                horizontal: self.number("canvas.paddingX")?,
                vertical: self.number("canvas.paddingY")?,
            },
            block_spacing: self.number("canvas.blockSpacing")?,
            min_width: self.number("canvas.minWidth")?,
            min_height: self.number("canvas.minHeight")?,
            display_scale: self.number("canvas.displayScale")?,
            aspect_divisor: self.number("canvas.aspectDivisor")?,
        };
        options.validate()?;
        Ok(options)
    }
}

/// Resolved settings for free-text sections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSettings {
    pub max_width: f64,
    pub line_height: f64,
}

fn merge_into(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                merge_into(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Width-like budgets: finite and strictly positive.
pub fn require_positive(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidConfiguration {
            field,
            expected: "a finite number > 0",
            value,
        })
    }
}

/// Paddings, minimums and swatch sizes: finite and not negative.
pub fn require_non_negative(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidConfiguration {
            field,
            expected: "a finite number >= 0",
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_without_errors() {
        let cfg = LayoutConfig::defaults();
        let font = cfg.font().unwrap();
        assert_eq!(font.size_px, 14.0);
        assert_eq!(font.family.as_deref(), Some("helvetica"));
        let text = cfg.text().unwrap();
        assert!((text.line_height - 16.8).abs() < 1e-9);
        assert_eq!(cfg.flow().unwrap().item_spacing, 10.0);
        assert_eq!(cfg.canvas().unwrap().display_scale, 1.0);
        assert_eq!(cfg.measurer_kind().unwrap(), MeasurerKind::Glyph);
    }

    #[test]
    fn overrides_merge_into_nested_objects() {
        let cfg = LayoutConfig::with_overrides(&json!({
            "canvas": { "minWidth": 800 },
            "font": { "sizePx": 10, "bold": true }
        }));
        assert_eq!(cfg.get_f64("canvas.minWidth"), Some(800.0));
        assert_eq!(cfg.get_f64("canvas.paddingX"), Some(20.0));
        assert_eq!(cfg.get_bool("font.bold"), Some(true));
        assert_eq!(cfg.get_str("font.family"), Some("helvetica"));
    }

    #[test]
    fn set_value_creates_intermediate_objects() {
        let mut cfg = LayoutConfig::empty_object();
        cfg.set_value("flow.rowSpacing", json!(4));
        assert_eq!(cfg.get_f64("flow.rowSpacing"), Some(4.0));

        let mut cfg = LayoutConfig::from_value(json!(3));
        cfg.set_value("a.b", json!(true));
        assert_eq!(cfg.get_bool("a.b"), Some(true));

        cfg.set_value("a.b.c", json!("deep"));
        assert_eq!(cfg.get_str("a.b.c"), Some("deep"));
        cfg.set_value("a.d", json!(1));
        assert_eq!(cfg.get_str("a.b.c"), Some("deep"));
    }

    #[test]
    fn non_positive_width_is_rejected_not_clamped() {
        let cfg = LayoutConfig::with_overrides(&json!({ "flow": { "maxRowWidth": 0 } }));
        let err = cfg.flow().unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfiguration { field: "flow.maxRowWidth", .. }),
            "{err:?}"
        );

        let cfg = LayoutConfig::with_overrides(&json!({ "canvas": { "displayScale": -1 } }));
        assert!(cfg.canvas().is_err());

        let cfg = LayoutConfig::with_overrides(&json!({ "font": { "sizePx": 0 } }));
        assert!(cfg.font().is_err());
    }

    #[test]
    fn spacing_must_be_positive_but_padding_may_be_zero() {
        for (section, key) in [
            ("flow", "itemSpacing"),
            ("flow", "rowSpacing"),
            ("canvas", "blockSpacing"),
        ] {
            for bad in [json!(0), json!(-2)] {
                let cfg = LayoutConfig::with_overrides(&json!({ section: { key: bad.clone() } }));
                let result = if section == "flow" {
                    cfg.flow().map(|_| ())
                } else {
                    cfg.canvas().map(|_| ())
                };
                assert!(
                    matches!(result, Err(Error::InvalidConfiguration { .. })),
                    "{section}.{key} = {bad}"
                );
            }
        }

        let cfg = LayoutConfig::with_overrides(&json!({
            "canvas": { "paddingX": 0, "paddingY": 0, "minWidth": 0 },
            "flow": { "swatchWidth": 0, "swatchGap": 0 }
        }));
        assert!(cfg.canvas().is_ok());
        assert!(cfg.label_items().is_ok());
    }

    #[test]
    fn merge_replaces_scalars_and_keeps_sibling_keys() {
        let mut cfg = LayoutConfig::defaults();
        cfg.merge(json!({ "flow": { "balance": true }, "font": "mono", "extra": { "k": 1 } }));
        assert_eq!(cfg.get_bool("flow.balance"), Some(true));
        assert_eq!(cfg.get_f64("flow.itemSpacing"), Some(10.0));
        assert_eq!(cfg.get_str("font"), Some("mono"));
        assert_eq!(cfg.get_f64("extra.k"), Some(1.0));

        cfg.merge(json!({ "font": { "sizePx": 9 } }));
        assert_eq!(cfg.get_f64("font.sizePx"), Some(9.0));
        assert_eq!(cfg.get_str("font.family"), None);
    }

    #[test]
    fn unknown_measurer_is_an_error() {
        let cfg = LayoutConfig::with_overrides(&json!({ "measurer": "ruler" }));
        assert!(matches!(cfg.measurer_kind(), Err(Error::InvalidRequest { .. })));
        let cfg = LayoutConfig::with_overrides(&json!({ "measurer": "heuristic" }));
        assert_eq!(cfg.measurer_kind().unwrap(), MeasurerKind::Heuristic);
    }
}
