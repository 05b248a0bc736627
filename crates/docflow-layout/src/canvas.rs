//! Canvas sizing: stacks section blocks vertically and derives the drawing surface.
//!
//! The viewBox and block placements are always in unscaled layout units. `display_scale` and
//! `aspect_divisor` only affect the physical `width`/`height` attributes, so an embedded
//! diagram can be resized without running layout again.

use crate::config::{require_non_negative, require_positive};
use crate::model::{Block, BlockPlacement, Canvas, ViewBox};
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paddings {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Paddings {
    pub fn uniform(padding: f64) -> Self {
        Self {
            horizontal: padding,
            vertical: padding,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasOptions {
    pub padding: Paddings,
    pub block_spacing: f64,
    pub min_width: f64,
    pub min_height: f64,
    pub display_scale: f64,
    /// Fixed divisor for responsive embedding; `1.0` leaves the physical size alone.
    pub aspect_divisor: f64,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            padding: Paddings::uniform(20.0),
            block_spacing: 16.0,
            min_width: 0.0,
            min_height: 0.0,
            display_scale: 1.0,
            aspect_divisor: 1.0,
        }
    }
}

impl CanvasOptions {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("canvas.paddingX", self.padding.horizontal)?;
        require_non_negative("canvas.paddingY", self.padding.vertical)?;
        require_positive("canvas.blockSpacing", self.block_spacing)?;
        require_non_negative("canvas.minWidth", self.min_width)?;
        require_non_negative("canvas.minHeight", self.min_height)?;
        require_positive("canvas.displayScale", self.display_scale)?;
        require_positive("canvas.aspectDivisor", self.aspect_divisor)?;
        Ok(())
    }
}

pub fn size_canvas(blocks: &[Block], options: &CanvasOptions) -> Result<Canvas> {
    options.validate()?;
    let pad = options.padding;

    let content_width = blocks.iter().map(|b| b.width).fold(0.0, f64::max);
    let stacked_height: f64 = blocks.iter().map(|b| b.height).sum::<f64>()
        + options.block_spacing * blocks.len().saturating_sub(1) as f64;

    let width = (content_width + 2.0 * pad.horizontal).max(options.min_width);
    let height = (stacked_height + 2.0 * pad.vertical).max(options.min_height);

    let inner_width = width - 2.0 * pad.horizontal;
    let mut placements = Vec::with_capacity(blocks.len());
    let mut y = pad.vertical;
    for block in blocks {
        placements.push(BlockPlacement {
            x: pad.horizontal + (inner_width - block.width) / 2.0,
            y,
        });
        y += block.height + options.block_spacing;
    }

    let scale = options.display_scale / options.aspect_divisor;
    let canvas = Canvas {
        width: width * scale,
        height: height * scale,
        view_box: ViewBox {
            min_x: 0.0,
            min_y: 0.0,
            width,
            height,
        },
        placements,
    };
    tracing::debug!(
        blocks = blocks.len(),
        width = canvas.width,
        height = canvas.height,
        view_box = %canvas.view_box,
        "sized canvas"
    );
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(width: f64, height: f64) -> Block {
        Block {
            rows: Vec::new(),
            width,
            height,
        }
    }

    #[test]
    fn width_is_clamped_up_to_the_minimum() {
        let options = CanvasOptions {
            min_width: 800.0,
            ..CanvasOptions::default()
        };
        let canvas = size_canvas(&[block(300.0, 100.0), block(500.0, 50.0)], &options).unwrap();
        assert_eq!(canvas.width, 800.0);
        assert_eq!(canvas.height, 100.0 + 50.0 + 16.0 + 2.0 * 20.0);
        assert_eq!(canvas.view_box.to_string(), "0 0 800 206");
    }

    #[test]
    fn unclamped_size_follows_content() {
        let canvas = size_canvas(
            &[block(300.0, 100.0), block(500.0, 50.0)],
            &CanvasOptions::default(),
        )
        .unwrap();
        assert_eq!(canvas.width, 540.0);
        assert_eq!(canvas.height, 206.0);
    }

    #[test]
    fn blocks_are_stacked_and_centered() {
        let options = CanvasOptions {
            min_width: 800.0,
            ..CanvasOptions::default()
        };
        let canvas = size_canvas(&[block(300.0, 100.0), block(500.0, 50.0)], &options).unwrap();
        assert_eq!(canvas.placements[0], BlockPlacement { x: 250.0, y: 20.0 });
        assert_eq!(canvas.placements[1], BlockPlacement { x: 150.0, y: 136.0 });
    }

    #[test]
    fn display_scale_only_touches_physical_size() {
        let options = CanvasOptions {
            display_scale: 2.0,
            aspect_divisor: 4.0,
            ..CanvasOptions::default()
        };
        let canvas = size_canvas(&[block(160.0, 60.0)], &options).unwrap();
        assert_eq!(canvas.view_box.width, 200.0);
        assert_eq!(canvas.view_box.height, 100.0);
        assert_eq!(canvas.width, 100.0);
        assert_eq!(canvas.height, 50.0);
        assert_eq!(canvas.placements[0], BlockPlacement { x: 20.0, y: 20.0 });
    }

    #[test]
    fn no_blocks_is_just_padding_and_minimums() {
        let canvas = size_canvas(&[], &CanvasOptions::default()).unwrap();
        assert_eq!((canvas.width, canvas.height), (40.0, 40.0));
        assert!(canvas.placements.is_empty());

        let options = CanvasOptions {
            min_width: 100.0,
            min_height: 60.0,
            ..CanvasOptions::default()
        };
        let canvas = size_canvas(&[], &options).unwrap();
        assert_eq!((canvas.width, canvas.height), (100.0, 60.0));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let bad = [
            CanvasOptions {
                display_scale: 0.0,
                ..CanvasOptions::default()
            },
            CanvasOptions {
                aspect_divisor: -1.0,
                ..CanvasOptions::default()
            },
            CanvasOptions {
                padding: Paddings::uniform(-4.0),
                ..CanvasOptions::default()
            },
            CanvasOptions {
                min_height: f64::INFINITY,
                ..CanvasOptions::default()
            },
        ];
        for options in bad {
            assert!(size_canvas(&[block(10.0, 10.0)], &options).is_err(), "{options:?}");
        }
    }

    #[test]
    fn block_spacing_must_be_positive_but_padding_may_be_zero() {
        let options = CanvasOptions {
            block_spacing: 0.0,
            ..CanvasOptions::default()
        };
        assert!(matches!(
            size_canvas(&[block(10.0, 10.0)], &options),
            Err(crate::Error::InvalidConfiguration { field: "canvas.blockSpacing", .. })
        ));

        let options = CanvasOptions {
            padding: Paddings::uniform(0.0),
            ..CanvasOptions::default()
        };
        let canvas = size_canvas(&[block(10.0, 10.0)], &options).unwrap();
        assert_eq!((canvas.width, canvas.height), (10.0, 10.0));
    }
}
